//! Arc construction
//!
//! Edges come from two boundary points plus a bending direction; corners are
//! derived from the two edges they join.

use glam::DVec3;
use std::f64::consts::{FRAC_PI_2, TAU};

use super::arc::{Arc, GeometryType};
use crate::consts::{THRESHOLD, TOLERANCE};
use crate::{angular_distance, project_onto_plane};

/// Build an edge from `from` to `to`.
///
/// The circle's pole is the point equidistant from both endpoints that lies
/// closest to `slope`, so a `slope` orthogonal to both endpoints gives a great
/// circle and tilting it bends the edge into a small circle. A clockwise edge
/// keeps the exterior (the pole side) on its left, i.e. it turns
/// counterclockwise about the pole; otherwise the pole is flipped and the
/// complementary (long way round) arc is taken.
pub fn curve(from: DVec3, slope: DVec3, to: DVec3, clockwise: bool) -> Arc {
    let from = from.normalize_or(DVec3::Y);
    let to = to.normalize_or(from);

    let chord = from - to;
    let chord = (chord.length() > THRESHOLD).then(|| chord.normalize());
    let projected = match chord {
        Some(chord) => project_onto_plane(slope, chord),
        None => project_onto_plane(slope, from),
    };
    let mut pole = projected.unwrap_or_else(|| {
        log::warn!("curve: slope {slope:?} is parallel to the chord, falling back to a great circle");
        from.cross(to)
            .try_normalize()
            .unwrap_or_else(|| from.any_orthonormal_vector())
    });
    if !clockwise {
        pole = -pole;
    }

    let arc_latitude = from.dot(pole).clamp(-1.0, 1.0).asin();
    let from_direction = project_onto_plane(from, pole).unwrap_or(DVec3::ZERO);
    let to_direction = project_onto_plane(to, pole).unwrap_or(DVec3::ZERO);

    let angle = if chord.is_none() {
        0.0
    } else {
        pole.dot(from_direction.cross(to_direction))
            .atan2(from_direction.dot(to_direction))
            .rem_euclid(TAU)
    };
    let half_angle = angle / 2.0;
    let forward = from_direction * half_angle.cos() + pole.cross(from_direction) * half_angle.sin();

    Arc::from_frame(
        pole,
        forward,
        half_angle,
        arc_latitude,
        GeometryType::edge(arc_latitude),
    )
}

/// Shortest great-circle edge from `from` to `to`
pub fn great_arc(from: DVec3, to: DVec3) -> Arc {
    curve(from, from.cross(to), to, true)
}

/// The vertex two edges share and the normals on either side of it
struct Junction {
    vertex: DVec3,
    left_normal: DVec3,
    right_normal: DVec3,
}

impl Junction {
    fn new(left: &Arc, right: &Arc) -> Self {
        let vertex = (left.end(0.0) + right.begin(0.0)).normalize_or(left.end(0.0));
        Self {
            vertex,
            left_normal: left.normal(left.half_angle(), 0.0),
            right_normal: right.normal(-right.half_angle(), 0.0),
        }
    }

    fn half_angle(&self) -> f64 {
        angular_distance(self.left_normal, self.right_normal) / 2.0
    }

    /// Corner arc whose equator sweeps from the left normal to the right one,
    /// turning `turn` (±1) about the corner's pole.
    fn sweep(&self, turn: f64, curvature: GeometryType) -> Arc {
        let center = -self.vertex;
        let half_angle = self.half_angle();
        let forward = self.left_normal * half_angle.cos()
            + center.cross(self.left_normal) * (turn * half_angle.sin());
        Arc::from_frame(center, forward, half_angle, -FRAC_PI_2, curvature)
    }
}

/// Classify and build the corner between two consecutive edges.
pub fn corner(left: &Arc, right: &Arc) -> Arc {
    let junction = Junction::new(left, right);
    if junction.half_angle() < THRESHOLD {
        return straight_corner(left, right);
    }
    let right_bearing = right.bearing(-right.half_angle(), 0.0);
    // Hairpins (reversing along the same circle) land on zero: convex.
    if junction.left_normal.dot(right_bearing) <= TOLERANCE {
        convex_corner(left, right)
    } else {
        concave_corner(left, right)
    }
}

/// Corner turning towards the block interior
pub fn convex_corner(left: &Arc, right: &Arc) -> Arc {
    Junction::new(left, right).sweep(1.0, GeometryType::ConvexCorner)
}

/// Corner turning towards the exterior
pub fn concave_corner(left: &Arc, right: &Arc) -> Arc {
    Junction::new(left, right).sweep(-1.0, GeometryType::ConcaveCorner)
}

/// Zero-span corner between edges that continue smoothly
pub fn straight_corner(left: &Arc, right: &Arc) -> Arc {
    let junction = Junction::new(left, right);
    let forward = (junction.left_normal + junction.right_normal).normalize_or(junction.left_normal);
    Arc::from_frame(
        -junction.vertex,
        forward,
        0.0,
        -FRAC_PI_2,
        GeometryType::StraightCorner,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_curve_quarter_turn() {
        let arc = curve(DVec3::Y, DVec3::X, DVec3::Z, true);
        assert_eq!(arc.curvature(), GeometryType::StraightEdge);
        assert!((arc.angle() - FRAC_PI_2).abs() < 1e-9);
        assert!((arc.length(0.0) - FRAC_PI_2).abs() < 1e-9);
        assert!(arc.position_along(0.0, 0.0).abs_diff_eq(DVec3::Y, 1e-9));
        assert!(
            arc.position_along(std::f64::consts::FRAC_PI_4, 0.0)
                .abs_diff_eq((DVec3::Y + DVec3::Z).normalize(), 1e-9)
        );
        assert!(arc.center_axis().abs_diff_eq(DVec3::X, 1e-12));
    }

    #[test]
    fn test_curve_counterclockwise_takes_long_way() {
        let arc = curve(DVec3::Y, DVec3::X, DVec3::Z, false);
        assert!((arc.angle() - 3.0 * FRAC_PI_2).abs() < 1e-9);
        assert!(arc.begin(0.0).abs_diff_eq(DVec3::Y, 1e-9));
        assert!(arc.end(0.0).abs_diff_eq(DVec3::Z, 1e-9));
        // Going the long way passes through -Y.
        assert!(arc.position(0.0, 0.0).abs_diff_eq(-(DVec3::Y + DVec3::Z).normalize(), 1e-9));
    }

    #[test]
    fn test_curve_small_circle_hits_both_endpoints() {
        let arc = curve(DVec3::Y, DVec3::new(1.0, 1.0, 0.0), DVec3::Z, true);
        assert_eq!(arc.curvature(), GeometryType::ConcaveEdge);
        assert!(arc.latitude() > 0.0);
        assert!(arc.begin(0.0).abs_diff_eq(DVec3::Y, 1e-9));
        assert!(arc.end(0.0).abs_diff_eq(DVec3::Z, 1e-9));
        // A small circle is longer in angle than the great circle but
        // foreshortened by its latitude.
        assert!(arc.angle() > FRAC_PI_2);
        assert!(arc.length(0.0) > FRAC_PI_2);

        let flipped = curve(DVec3::Y, DVec3::new(1.0, 1.0, 0.0), DVec3::Z, false);
        assert_eq!(flipped.curvature(), GeometryType::ConvexEdge);
        assert!((arc.angle() + flipped.angle() - TAU).abs() < 1e-9);
    }

    #[test]
    fn test_curve_degenerate_inputs() {
        let point = curve(DVec3::Y, DVec3::X, DVec3::Y, true);
        assert_eq!(point.angle(), 0.0);
        assert!(point.begin(0.0).abs_diff_eq(DVec3::Y, 1e-9));

        let half = great_arc(DVec3::Y, -DVec3::Y);
        assert!((half.angle() - PI).abs() < 1e-9);
        assert!(half.end(0.0).abs_diff_eq(-DVec3::Y, 1e-9));

        // Slope along the chord, exactly or within rounding: falls back to the great circle.
        for slope in [
            DVec3::new(0.0, 1.0, -1.0),
            DVec3::new(1e-12, 1.0, -1.0),
            DVec3::new(0.0, -1.0 + 1e-13, 1.0),
        ] {
            let fallback = curve(DVec3::Y, slope, DVec3::Z, true);
            assert!((fallback.angle() - FRAC_PI_2).abs() < 1e-9, "{slope:?}");
            assert!(fallback.latitude().abs() < 1e-9, "{slope:?}");
            assert!(fallback.begin(0.0).abs_diff_eq(DVec3::Y, 1e-9), "{slope:?}");
            assert!(fallback.end(0.0).abs_diff_eq(DVec3::Z, 1e-9), "{slope:?}");
        }

        // Endpoints a rounding error apart make a point, not a stray arc.
        let nudged = curve(DVec3::Y, DVec3::X, DVec3::new(1e-15, 1.0, 0.0), true);
        assert_eq!(nudged.angle(), 0.0);
    }

    fn edges(turn_towards: DVec3) -> (Arc, Arc) {
        let start = DVec3::new(-1.0, 1.0, 0.0).normalize();
        let finish = (DVec3::Y + turn_towards).normalize();
        (great_arc(start, DVec3::Y), great_arc(DVec3::Y, finish))
    }

    #[test]
    fn test_corner_classification() {
        let (left, right) = edges(DVec3::Z);
        assert_eq!(corner(&left, &right).curvature(), GeometryType::ConvexCorner);

        let (left, right) = edges(-DVec3::Z);
        assert_eq!(corner(&left, &right).curvature(), GeometryType::ConcaveCorner);

        let (left, right) = edges(DVec3::X);
        let straight = corner(&left, &right);
        assert_eq!(straight.curvature(), GeometryType::StraightCorner);
        assert_eq!(straight.angle(), 0.0);
    }

    #[test]
    fn test_corner_near_straight_threshold() {
        let start = DVec3::new(-1.0, 1.0, 0.0).normalize();
        let left = great_arc(start, DVec3::Y);
        // Bend by well under THRESHOLD: still straight.
        let slight = DVec3::new(1.0, 1.0, 1e-8).normalize();
        assert_eq!(
            corner(&left, &great_arc(DVec3::Y, slight)).curvature(),
            GeometryType::StraightCorner
        );
        // Bend by well over THRESHOLD: a real corner.
        let bent = DVec3::new(1.0, 1.0, 1e-4).normalize();
        assert_eq!(
            corner(&left, &great_arc(DVec3::Y, bent)).curvature(),
            GeometryType::ConvexCorner
        );
    }

    #[test]
    fn test_corner_sits_at_south_pole() {
        let (left, right) = edges(DVec3::Z);
        let joint = corner(&left, &right);
        assert_eq!(joint.latitude(), -FRAC_PI_2);
        assert!(joint.center_axis().abs_diff_eq(-DVec3::Y, 1e-9));
        assert!(joint.position(0.3, 0.0).abs_diff_eq(DVec3::Y, 1e-9));
    }

    #[test]
    fn test_hairpin_corner() {
        // Out along +X and straight back: normals are antiparallel.
        let out = DVec3::new(1.0, 1.0, 0.0).normalize();
        let left = great_arc(DVec3::Y, out);
        let right = great_arc(out, DVec3::Y);
        let joint = corner(&left, &right);
        assert_eq!(joint.curvature(), GeometryType::ConvexCorner);
        assert!((joint.angle() - PI).abs() < 1e-9);
        assert!(joint.end(0.1).abs_diff_eq(right.begin(0.1), 1e-9));
    }
}
