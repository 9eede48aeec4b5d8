//! Physics configuration
//!
//! Tunables that content may override, persisted as JSON. Precision constants
//! live in [`crate::consts`] and are not configurable.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::error::PlanetariaError;

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Fixed step length (seconds)
    pub timestep: f64,
    /// Maximum steps run for one frame before dropping time
    pub max_substeps: u32,

    // === Forces ===
    /// World-space gravity; only its tangential part acts on a body
    pub gravity: DVec3,
    /// Vertical speed (away from the surface) above which a grounded body lifts off
    pub lift_off_speed: f64,

    // === Broad phase ===
    /// Layers the overlap query sees
    pub layer_mask: u32,
    /// Caps narrower than this (radians) use the tight "ideal" bounding sphere
    pub ideal_collider_max_angle: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            timestep: SIM_DT,
            max_substeps: MAX_SUBSTEPS,

            gravity: DVec3::new(0.0, -1.0, 0.0),
            lift_off_speed: 0.05,

            layer_mask: u32::MAX,
            ideal_collider_max_angle: std::f64::consts::FRAC_PI_4,
        }
    }
}

impl PhysicsConfig {
    pub fn from_json(json: &str) -> Result<Self, PlanetariaError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, PlanetariaError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PlanetariaError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded physics config from {}", path.display());
        Ok(config)
    }

    /// Save as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PlanetariaError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        log::info!("Physics config saved to {}", path.display());
        Ok(())
    }
}
