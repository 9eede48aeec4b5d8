//! Surface materials and how two of them combine on contact

use serde::{Deserialize, Serialize};

/// How a pair of surface values combines. Declared in ascending precedence:
/// when two materials disagree, the later variant wins.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum CombineMode {
    Minimum,
    Harmonic,
    Geometric,
    Average,
    Quadratic,
    #[default]
    Maximum,
}

impl CombineMode {
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            CombineMode::Minimum => a.min(b),
            CombineMode::Harmonic => {
                let sum = a + b;
                if sum == 0.0 { 0.0 } else { 2.0 * a * b / sum }
            }
            CombineMode::Geometric => {
                // Mixed signs have no meaningful mean.
                if a.signum() == b.signum() {
                    (a * b).sqrt()
                } else {
                    0.0
                }
            }
            CombineMode::Average => (a + b) / 2.0,
            CombineMode::Quadratic => ((a * a + b * b) / 2.0).sqrt(),
            CombineMode::Maximum => a.max(b),
        }
    }
}

/// Combine two surface values under the stronger of their two modes.
pub fn blend(left_value: f64, left_mode: CombineMode, right_value: f64, right_mode: CombineMode) -> f64 {
    left_mode.max(right_mode).apply(left_value, right_value)
}

/// Per-collider surface properties
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsMaterial {
    /// Fraction of the approach speed returned on impact
    pub elasticity: f64,
    /// Sliding deceleration per unit of pressing force
    pub friction: f64,
    /// Extra acceleration holding a grounded body against the surface
    pub magnetism: f64,
    pub elasticity_mode: CombineMode,
    pub friction_mode: CombineMode,
    pub magnetism_mode: CombineMode,
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self {
            elasticity: 0.0,
            friction: 0.4,
            magnetism: 0.0,
            elasticity_mode: CombineMode::Average,
            friction_mode: CombineMode::Geometric,
            magnetism_mode: CombineMode::Maximum,
        }
    }
}

/// Properties of one contact after blending both sides
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactMaterial {
    pub elasticity: f64,
    pub friction: f64,
    pub magnetism: f64,
}

impl PhysicsMaterial {
    pub fn combine(&self, other: &PhysicsMaterial) -> ContactMaterial {
        ContactMaterial {
            elasticity: blend(self.elasticity, self.elasticity_mode, other.elasticity, other.elasticity_mode),
            friction: blend(self.friction, self.friction_mode, other.friction, other.friction_mode),
            magnetism: blend(self.magnetism, self.magnetism_mode, other.magnetism, other.magnetism_mode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const MODES: [CombineMode; 6] = [
        CombineMode::Minimum,
        CombineMode::Harmonic,
        CombineMode::Geometric,
        CombineMode::Average,
        CombineMode::Quadratic,
        CombineMode::Maximum,
    ];

    #[test]
    fn test_precedence_order() {
        for pair in MODES.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert_eq!(CombineMode::default(), CombineMode::Maximum);
    }

    #[test]
    fn test_stronger_mode_wins() {
        assert_eq!(blend(0.2, CombineMode::Minimum, 0.8, CombineMode::Average), 0.5);
        assert_eq!(blend(0.2, CombineMode::Maximum, 0.8, CombineMode::Minimum), 0.8);
        assert_eq!(blend(0.2, CombineMode::Minimum, 0.8, CombineMode::Minimum), 0.2);
    }

    #[test]
    fn test_mode_formulas() {
        assert!((CombineMode::Harmonic.apply(1.0, 3.0) - 1.5).abs() < 1e-12);
        assert!((CombineMode::Geometric.apply(2.0, 8.0) - 4.0).abs() < 1e-12);
        assert!((CombineMode::Quadratic.apply(1.0, 7.0) - 5.0).abs() < 1e-12);
        assert_eq!(CombineMode::Harmonic.apply(2.0, -2.0), 0.0);
        assert_eq!(CombineMode::Geometric.apply(2.0, -8.0), 0.0);
        assert!((CombineMode::Geometric.apply(-2.0, -8.0) - 4.0).abs() < 1e-12);
        assert_eq!(CombineMode::Geometric.apply(-3.0, -3.0), 3.0);
    }

    #[test]
    fn test_zero_is_fixed_for_every_mode() {
        for mode in MODES {
            assert_eq!(blend(0.0, mode, 0.0, mode), 0.0, "{mode:?}");
        }
    }

    #[test]
    fn test_material_combine() {
        let rubber = PhysicsMaterial {
            elasticity: 0.9,
            elasticity_mode: CombineMode::Maximum,
            ..Default::default()
        };
        let stone = PhysicsMaterial {
            elasticity: 0.1,
            friction: 0.9,
            ..Default::default()
        };
        let contact = rubber.combine(&stone);
        assert_eq!(contact.elasticity, 0.9);
        assert!((contact.friction - (0.4f64 * 0.9).sqrt()).abs() < 1e-12);
        assert_eq!(contact.magnetism, 0.0);
        assert_eq!(stone.combine(&rubber), contact);
    }

    #[test]
    fn test_material_json_defaults() {
        let material: PhysicsMaterial = serde_json::from_str(r#"{ "friction": 0.1 }"#).unwrap();
        assert_eq!(material.friction, 0.1);
        assert_eq!(material.elasticity_mode, CombineMode::Average);
    }

    proptest! {
        #[test]
        fn prop_blend_is_identity_on_diagonal(x in 0.0f64..1000.0, mode_index in 0usize..6) {
            let mode = MODES[mode_index];
            let blended = blend(x, mode, x, mode);
            prop_assert!((blended - x).abs() <= 1e-12 * x.max(1.0), "{:?}: {} -> {}", mode, x, blended);
        }

        #[test]
        fn prop_blend_is_symmetric(
            a in -10.0f64..10.0,
            b in -10.0f64..10.0,
            left in 0usize..6,
            right in 0usize..6,
        ) {
            let forward = blend(a, MODES[left], b, MODES[right]);
            let backward = blend(b, MODES[right], a, MODES[left]);
            prop_assert!((forward - backward).abs() <= 1e-12 * forward.abs().max(1.0));
        }
    }
}
