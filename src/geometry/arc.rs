//! Arc geometry on the unit sphere
//!
//! An arc is a piece of a circle (great or small) on the unit sphere. It is
//! described by a local frame:
//! - `center_axis`: pole of the circle; the exterior side of an edge faces it
//! - `forward_axis`: direction (on the circle's equator) of the arc midpoint
//! - `right_axis`: `center_axis × forward_axis`, the direction of travel at the midpoint
//!
//! plus `half_angle` (half the angular span, measured around the pole) and
//! `arc_latitude` (how far the circle sits above its great circle; 0 for
//! great circles).
//!
//! Angles along the arc run over [-half_angle, +half_angle] with 0 at the
//! midpoint. Extrusion offsets the arc towards its normal (the exterior), which
//! is how a body of finite radius touches a block.
//!
//! Corners are arcs too: a circle of zero radius around the corner vertex
//! (latitude -π/2 around the antipode of the vertex) whose equator sweeps from
//! the normal of the left edge to the normal of the right edge. Extruding a
//! corner inflates it into a small circle around the vertex.

use glam::{DMat3, DQuat, DVec3};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

use super::cap::SphericalCap;
use crate::consts::{DELTA, THRESHOLD};
use crate::error::PlanetariaError;
use crate::spherical_linear_interpolation;

/// Curvature class of an arc
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryType {
    /// Great-circle edge
    StraightEdge,
    /// Small-circle edge bulging away from the exterior
    ConvexEdge,
    /// Small-circle edge hollowed towards the exterior
    ConcaveEdge,
    /// Junction between two edges that continue in the same direction
    StraightCorner,
    /// Junction turning towards the block interior
    ConvexCorner,
    /// Junction turning towards the exterior
    ConcaveCorner,
}

/// Signs applied to extrusion and angle before the shared position/normal formulas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvatureSigns {
    pub extrusion: f64,
    pub angle: f64,
}

impl GeometryType {
    /// Sign table shared by every arc formula.
    ///
    /// Concave corners are the reciprocal of convex ones: their extruded
    /// circle lies on the opposite side of the vertex and their equator is
    /// traversed backwards.
    pub fn signs(self) -> CurvatureSigns {
        match self {
            GeometryType::ConcaveCorner => CurvatureSigns {
                extrusion: -1.0,
                angle: -1.0,
            },
            _ => CurvatureSigns {
                extrusion: 1.0,
                angle: 1.0,
            },
        }
    }

    /// Classify an edge by the latitude of its circle
    pub fn edge(arc_latitude: f64) -> Self {
        if arc_latitude.abs() < THRESHOLD {
            GeometryType::StraightEdge
        } else if arc_latitude < 0.0 {
            GeometryType::ConvexEdge
        } else {
            GeometryType::ConcaveEdge
        }
    }

    pub fn is_edge(self) -> bool {
        matches!(
            self,
            GeometryType::StraightEdge | GeometryType::ConvexEdge | GeometryType::ConcaveEdge
        )
    }

    pub fn is_corner(self) -> bool {
        !self.is_edge()
    }
}

/// An immutable circular arc on the unit sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    center_axis: DVec3,
    forward_axis: DVec3,
    right_axis: DVec3,
    half_angle: f64,
    arc_latitude: f64,
    curvature: GeometryType,
}

/// Compact on-disk form of an arc
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcRecord {
    /// Rotation taking (X, Y, Z) to (right, center, forward)
    pub orientation: DQuat,
    pub half_angle: f64,
    pub arc_latitude: f64,
    pub curvature: GeometryType,
}

impl Arc {
    /// Build an arc from its frame. The frame is re-orthonormalized around
    /// `center_axis` and `forward_axis`; `right_axis` is derived.
    pub(crate) fn from_frame(
        center_axis: DVec3,
        forward_axis: DVec3,
        half_angle: f64,
        arc_latitude: f64,
        curvature: GeometryType,
    ) -> Self {
        let center_axis = center_axis.normalize_or(DVec3::Y);
        let forward_axis = crate::project_onto_plane(forward_axis, center_axis)
            .unwrap_or_else(|| center_axis.any_orthonormal_vector());
        Self {
            center_axis,
            forward_axis,
            right_axis: center_axis.cross(forward_axis),
            half_angle: half_angle.clamp(0.0, PI),
            arc_latitude: arc_latitude.clamp(-FRAC_PI_2, FRAC_PI_2),
            curvature,
        }
    }

    #[inline]
    pub fn center_axis(&self) -> DVec3 {
        self.center_axis
    }

    #[inline]
    pub fn forward_axis(&self) -> DVec3 {
        self.forward_axis
    }

    #[inline]
    pub fn right_axis(&self) -> DVec3 {
        self.right_axis
    }

    #[inline]
    pub fn half_angle(&self) -> f64 {
        self.half_angle
    }

    /// Full angular span around the pole
    #[inline]
    pub fn angle(&self) -> f64 {
        2.0 * self.half_angle
    }

    #[inline]
    pub fn latitude(&self) -> f64 {
        self.arc_latitude
    }

    #[inline]
    pub fn curvature(&self) -> GeometryType {
        self.curvature
    }

    /// Latitude of the arc once extruded (sign table applied)
    #[inline]
    pub fn elevation(&self, extrusion: f64) -> f64 {
        self.arc_latitude + self.curvature.signs().extrusion * extrusion
    }

    /// Point on the arc's equator at `angle` (sign table applied)
    fn equator(&self, angle: f64) -> DVec3 {
        let angle = self.curvature.signs().angle * angle;
        spherical_linear_interpolation(self.forward_axis, self.right_axis, angle)
    }

    /// Point on the (extruded) arc at `angle` ∈ [-half_angle, +half_angle]
    pub fn position(&self, angle: f64, extrusion: f64) -> DVec3 {
        spherical_linear_interpolation(
            self.equator(angle),
            self.center_axis,
            self.elevation(extrusion),
        )
    }

    /// Surface normal (tangent to the sphere, pointing to the exterior)
    pub fn normal(&self, angle: f64, extrusion: f64) -> DVec3 {
        spherical_linear_interpolation(
            self.equator(angle),
            self.center_axis,
            self.elevation(extrusion) + FRAC_PI_2,
        )
    }

    /// Unit tangent pointing in the direction of increasing angle
    pub fn bearing(&self, angle: f64, extrusion: f64) -> DVec3 {
        let signs = self.curvature.signs();
        let direction = if self.elevation(extrusion).cos() < 0.0 {
            -signs.angle
        } else {
            signs.angle
        };
        let angle = signs.angle * angle;
        (self.right_axis * angle.cos() - self.forward_axis * angle.sin()) * direction
    }

    #[inline]
    pub fn begin(&self, extrusion: f64) -> DVec3 {
        self.position(-self.half_angle, extrusion)
    }

    #[inline]
    pub fn end(&self, extrusion: f64) -> DVec3 {
        self.position(self.half_angle, extrusion)
    }

    /// Position measured from `begin` rather than from the midpoint
    #[inline]
    pub fn position_along(&self, angle_from_begin: f64, extrusion: f64) -> DVec3 {
        self.position(angle_from_begin - self.half_angle, extrusion)
    }

    /// Arc length once extruded (foreshortened by the circle's latitude)
    pub fn length(&self, extrusion: f64) -> f64 {
        self.angle() * self.elevation(extrusion).cos().abs()
    }

    /// Angle of `point` around the pole, relative to the arc midpoint.
    ///
    /// Not an exact inverse: `point` need not lie on the arc. Non-finite
    /// results (degenerate projections) read as π, the far side of the circle.
    pub fn position_to_angle(&self, point: DVec3, extrusion: f64) -> f64 {
        // Past a pole the equator projection flips.
        let side = if self.elevation(extrusion).cos() < 0.0 {
            -1.0
        } else {
            1.0
        };
        let x = side * point.dot(self.forward_axis);
        let y = side * point.dot(self.right_axis);
        let angle = y.atan2(x);
        if !angle.is_finite() {
            return PI;
        }
        (self.curvature.signs().angle * angle).clamp(-PI, PI)
    }

    /// Latitude of `point` relative to this arc's pole
    pub fn point_elevation(&self, point: DVec3) -> f64 {
        let height = point.dot(self.center_axis);
        let planar = (point - self.center_axis * height).length();
        height.atan2(planar)
    }

    /// Whether `point` lies within `extrusion` of the arc (latitude band)
    /// and inside its angular span.
    pub fn contains(&self, point: DVec3, extrusion: f64) -> bool {
        // TODO: the band is symmetric, so it also accepts points up to
        // |extrusion| on the interior side; tighten once negative extrusions are pinned down.
        let in_band =
            (self.point_elevation(point) - self.arc_latitude).abs() <= extrusion.abs() + DELTA;
        if !in_band {
            return false;
        }
        // At the pole every angle is the same point (an unextruded corner).
        let planar = point - self.center_axis * point.dot(self.center_axis);
        planar.length() < DELTA
            || self.position_to_angle(point, extrusion).abs() <= self.half_angle + DELTA
    }

    /// Angle of the closest point on the arc to `point`
    pub fn closest_angle(&self, point: DVec3, extrusion: f64) -> f64 {
        let angle = self.position_to_angle(point, extrusion);
        if angle.abs() <= self.half_angle {
            return angle;
        }
        let to_begin = point.dot(self.begin(extrusion));
        let to_end = point.dot(self.end(extrusion));
        if to_begin > to_end {
            -self.half_angle
        } else {
            self.half_angle
        }
    }

    /// Closest point on the (extruded) arc to `point`
    pub fn closest_point(&self, point: DVec3, extrusion: f64) -> DVec3 {
        self.position(self.closest_angle(point, extrusion), extrusion)
    }

    /// Cap bounded by the (extruded) circle, on the side its pole faces
    pub fn floor(&self, extrusion: f64) -> SphericalCap {
        SphericalCap::new(self.center_axis, self.elevation(extrusion).sin())
    }

    /// Evenly spaced points from begin to end (for outlines)
    pub fn sample(&self, resolution: usize, extrusion: f64) -> Vec<DVec3> {
        (0..resolution)
            .map(|i| {
                let t = i as f64 / (resolution - 1).max(1) as f64;
                self.position_along(t * self.angle(), extrusion)
            })
            .collect()
    }

    /// Compact form for persistence
    pub fn to_record(&self) -> ArcRecord {
        let basis = DMat3::from_cols(self.right_axis, self.center_axis, self.forward_axis);
        ArcRecord {
            orientation: DQuat::from_mat3(&basis).normalize(),
            half_angle: self.half_angle,
            arc_latitude: self.arc_latitude,
            curvature: self.curvature,
        }
    }

    /// Rebuild an arc from its compact form.
    ///
    /// A bad record is reported as [`PlanetariaError::InvalidArc`] with index 0;
    /// [`Shape::from_records`](super::Shape::from_records) fills in its position.
    pub fn from_record(record: &ArcRecord) -> Result<Self, PlanetariaError> {
        let invalid = |reason| PlanetariaError::InvalidArc { index: 0, reason };
        if !record.orientation.is_finite() || !record.orientation.is_normalized() {
            return Err(invalid("orientation is not a unit quaternion"));
        }
        if !record.half_angle.is_finite() || !(0.0..=PI).contains(&record.half_angle) {
            return Err(invalid("half_angle outside [0, π]"));
        }
        if !record.arc_latitude.is_finite()
            || !(-FRAC_PI_2..=FRAC_PI_2).contains(&record.arc_latitude)
        {
            return Err(invalid("arc_latitude outside [-π/2, π/2]"));
        }
        let orientation = record.orientation.normalize();
        Ok(Self::from_frame(
            orientation * DVec3::Y,
            orientation * DVec3::Z,
            record.half_angle,
            record.arc_latitude,
            record.curvature,
        ))
    }

    /// The same edge traversed end to begin (its exterior flips sides)
    pub fn reversed(&self) -> Self {
        let arc_latitude = -self.arc_latitude;
        Self {
            center_axis: -self.center_axis,
            forward_axis: self.forward_axis,
            right_axis: -self.right_axis,
            half_angle: self.half_angle,
            arc_latitude,
            curvature: if self.curvature.is_edge() {
                GeometryType::edge(arc_latitude)
            } else {
                self.curvature
            },
        }
    }

    /// The same arc with its frame rotated (block-local to world space)
    pub fn rotated(&self, rotation: DQuat) -> Self {
        Self {
            center_axis: rotation * self.center_axis,
            forward_axis: rotation * self.forward_axis,
            right_axis: rotation * self.right_axis,
            ..*self
        }
    }
}
