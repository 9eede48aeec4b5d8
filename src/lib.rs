//! Planetaria - gameplay on the surface of a unit sphere
//!
//! Core modules:
//! - `geometry`: Spherical arcs, intersections, shapes and shape visitors
//! - `sim`: Deterministic collision pipeline (colliders, contacts, fixed-step tick)
//! - `config`: Data-driven physics settings
//! - `level`: Save/load of blocks in their compact arc form
//! - `error`: Error type for the fallible (content/I-O) operations

pub mod config;
pub mod error;
pub mod geometry;
pub mod level;
pub mod sim;

pub use config::PhysicsConfig;
pub use error::PlanetariaError;

use glam::DVec3;

/// Precision and simulation constants
pub mod consts {
    /// Dot-product slack for "same or opposite direction" decisions
    /// (coincident/antipodal circles, tangent intersections).
    pub const TOLERANCE: f64 = 1e-9;
    /// Angular slack (radians) for classification decisions
    /// (straight corners, great vs. small circles, zero-length arcs).
    pub const THRESHOLD: f64 = 1e-6;
    /// Angular slack (radians) for containment tests.
    pub const DELTA: f64 = 1e-5;

    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f64 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
}

/// Angular distance (radians) between two unit vectors
#[inline]
pub fn angular_distance(from: DVec3, to: DVec3) -> f64 {
    from.dot(to).clamp(-1.0, 1.0).acos()
}

/// Rotate `point` along the great circle towards `direction` by `angle`.
///
/// `direction` must be orthogonal to `point`; both are expected unit length.
#[inline]
pub fn spherical_linear_interpolation(point: DVec3, direction: DVec3, angle: f64) -> DVec3 {
    point * angle.cos() + direction * angle.sin()
}

/// Component of `vector` orthogonal to the unit `normal`, normalized.
///
/// `None` when what is left after the projection is rounding noise, i.e.
/// `vector` is within [`consts::THRESHOLD`] radians of `±normal` (or zero).
#[inline]
pub fn project_onto_plane(vector: DVec3, normal: DVec3) -> Option<DVec3> {
    let rejection = vector - normal * vector.dot(normal);
    let length = rejection.length();
    if length <= consts::THRESHOLD * vector.length() {
        return None;
    }
    Some(rejection / length)
}
