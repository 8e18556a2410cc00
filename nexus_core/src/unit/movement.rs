//! Linear movement toward a point

use crate::types::{distance, Circle};

/// Move `circle` up to `step` toward `(x, y)`
///
/// Snaps onto the point when it is closer than one step so the mover
/// never overshoots and oscillates. Returns true once at the point.
pub fn move_towards(circle: &mut Circle, x: f64, y: f64, step: f64) -> bool {
    let d = distance(circle.x, circle.y, x, y);
    if d <= step {
        circle.x = x;
        circle.y = y;
        return true;
    }
    if step > 0.0 {
        circle.x += (x - circle.x) / d * step;
        circle.y += (y - circle.y) / d * step;
    }
    false
}

/// Close the edge-to-edge gap to `target` down to `range`, moving at most
/// `step`; returns true once within range
pub fn approach(circle: &mut Circle, target: &Circle, range: f64, step: f64) -> bool {
    let gap = circle.gap_to(target);
    if gap <= range {
        return true;
    }
    let travel = step.min(gap - range);
    move_towards(circle, target.x, target.y, travel);
    circle.gap_to(target) <= range
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_on_last_step() {
        let mut c = Circle::new(0.0, 0.0, 1.0);
        assert!(!move_towards(&mut c, 10.0, 0.0, 4.0));
        assert!(!move_towards(&mut c, 10.0, 0.0, 4.0));
        assert!((c.x - 8.0).abs() < 1e-9);
        assert!(move_towards(&mut c, 10.0, 0.0, 4.0));
        assert!((c.x - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_step_stays() {
        let mut c = Circle::new(0.0, 0.0, 1.0);
        assert!(!move_towards(&mut c, 10.0, 0.0, 0.0));
        assert!(c.x.abs() < f64::EPSILON);
    }

    #[test]
    fn test_approach_stops_at_range() {
        let mut c = Circle::new(0.0, 0.0, 5.0);
        let target = Circle::new(100.0, 0.0, 5.0);
        // gap 90, range 10: needs 80 of travel
        assert!(!approach(&mut c, &target, 10.0, 50.0));
        assert!(approach(&mut c, &target, 10.0, 50.0));
        assert!((c.gap_to(&target) - 10.0).abs() < 1e-9);
    }
}
