//! Spherical caps
//!
//! A cap is the region `{p : p·normal ≥ offset}` of the unit sphere, i.e. every
//! point within `acos(offset)` of `normal`.

use glam::DVec3;

/// Region of the unit sphere on one side of a plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalCap {
    normal: DVec3,
    offset: f64,
}

impl SphericalCap {
    /// `offset` is clamped to [-1, 1]; a zero `normal` falls back to +Y.
    pub fn new(normal: DVec3, offset: f64) -> Self {
        Self {
            normal: normal.normalize_or(DVec3::Y),
            offset: offset.clamp(-1.0, 1.0),
        }
    }

    /// Cap of all points within `radius` radians of `center`
    pub fn from_angle(center: DVec3, radius: f64) -> Self {
        Self::new(center, radius.clamp(0.0, std::f64::consts::PI).cos())
    }

    #[inline]
    pub fn normal(&self) -> DVec3 {
        self.normal
    }

    #[inline]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Angular radius of the cap
    #[inline]
    pub fn angle(&self) -> f64 {
        self.offset.acos()
    }

    pub fn contains(&self, point: DVec3) -> bool {
        point.dot(self.normal) >= self.offset
    }

    /// The rest of the sphere
    pub fn complement(&self) -> Self {
        Self {
            normal: -self.normal,
            offset: -self.offset,
        }
    }
}
