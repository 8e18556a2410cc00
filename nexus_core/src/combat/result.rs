//! DamageOutcome - What one damage application did

use serde::{Deserialize, Serialize};

/// Result of applying a hit to a field object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DamageOutcome {
    /// False when the hit was rejected (non-positive, missing or
    /// unavailable target, undamageable object)
    pub applied: bool,
    /// Health (or wall + essence) actually removed
    pub damage_dealt: f64,

    // === Nexus ===
    /// Damage soaked by the city wall
    pub absorbed_by_wall: f64,
    /// Damage that carried over to the essence pool
    pub essence_lost: f64,
    /// Return damage sent back at the attacker
    pub reflected: f64,

    // === State Changes ===
    /// Health (essence for the nexus) before the hit
    pub health_before: f64,
    pub health_after: f64,

    // === Flags ===
    pub is_killing_blow: bool,
    pub is_critical: bool,
}

impl DamageOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the hit landed on the nexus wall at all
    pub fn hit_wall(&self) -> bool {
        self.absorbed_by_wall > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_rejected() {
        let outcome = DamageOutcome::new();
        assert!(!outcome.applied);
        assert!(!outcome.is_killing_blow);
        assert!(outcome.damage_dealt.abs() < f64::EPSILON);
    }
}
