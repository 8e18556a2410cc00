//! Hit rolls - Extra-hit chain and critical strikes

use rand::Rng;

/// Number of hits in one attack
///
/// Each further hit is progressively less likely:
/// `while random() < chance / hit_count { hit_count += 1 }`.
pub fn roll_hit_count<R: Rng>(rng: &mut R, extra_hit_chance: f64) -> u32 {
    let mut hit_count = 1u32;
    while rng.gen::<f64>() < extra_hit_chance / hit_count as f64 {
        hit_count += 1;
    }
    hit_count
}

/// Roll a critical strike; returns the damage multiplier and whether it crit
pub fn roll_crit<R: Rng>(rng: &mut R, chance: f64, multiplier: f64) -> (f64, bool) {
    if rng.gen::<f64>() < chance {
        (multiplier, true)
    } else {
        (1.0, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_zero_chance_single_hit() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            assert_eq!(roll_hit_count(&mut rng, 0.0), 1);
        }
    }

    #[test]
    fn test_chance_one_always_doubles() {
        // chance 1.0 guarantees the second hit, then 1/2, 1/3, ...
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert!(roll_hit_count(&mut rng, 1.0) >= 2);
        }
    }

    #[test]
    fn test_drop_off() {
        let mut rng = StdRng::seed_from_u64(42);
        let rolls: Vec<u32> = (0..10_000).map(|_| roll_hit_count(&mut rng, 0.5)).collect();
        let two = rolls.iter().filter(|&&n| n >= 2).count() as f64 / 10_000.0;
        let three = rolls.iter().filter(|&&n| n >= 3).count() as f64 / 10_000.0;
        // P(>=2) = 0.5, P(>=3) = 0.5 * 0.25
        assert!((two - 0.5).abs() < 0.03);
        assert!((three - 0.125).abs() < 0.02);
    }

    #[test]
    fn test_crit_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(roll_crit(&mut rng, 0.0, 3.0), (1.0, false));
        assert_eq!(roll_crit(&mut rng, 1.0, 3.0), (3.0, true));
    }
}
