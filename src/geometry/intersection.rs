//! Intersections on the unit sphere
//!
//! Everything reduces to intersecting two circles: a circle is a center axis
//! plus an angular radius, a great circle being the special case radius = π/2.
//! "No intersection" is an ordinary outcome and comes back as an empty result.

use glam::DVec3;
use std::f64::consts::{FRAC_PI_2, PI};

use super::arc::Arc;
use crate::consts::{DELTA, THRESHOLD, TOLERANCE};

/// Radii past a hemisphere describe the same circle around the antipode.
fn canonical_circle(center: DVec3, radius: f64) -> (DVec3, f64) {
    let radius = radius.clamp(0.0, PI);
    if radius > FRAC_PI_2 {
        (-center, PI - radius)
    } else {
        (center, radius)
    }
}

/// Intersection points of two circles on the unit sphere.
///
/// Returns no points for coincident or antipodal centers, for circles too far
/// apart to touch, and for circles nested inside one another; one point for
/// tangent circles; otherwise two points, ordered along `center_a × center_b`.
pub fn circle_circle_intersections(
    center_a: DVec3,
    center_b: DVec3,
    radius_a: f64,
    radius_b: f64,
) -> Vec<DVec3> {
    if !(radius_a.is_finite() && radius_b.is_finite()) {
        return Vec::new();
    }
    let (center_a, radius_a) = canonical_circle(center_a, radius_a);
    let (center_b, radius_b) = canonical_circle(center_b, radius_b);

    let similarity = center_a.dot(center_b);
    if !similarity.is_finite() || similarity.abs() > 1.0 - TOLERANCE {
        return Vec::new();
    }
    let distance = similarity.acos();
    if distance > radius_a + radius_b + THRESHOLD {
        return Vec::new(); // disjoint
    }
    if distance < (radius_a - radius_b).abs() - THRESHOLD {
        return Vec::new(); // one circle engulfs the other
    }

    // Solve p = x·a + y·b + z·(a × b) with p·a = cos(ra), p·b = cos(rb), |p| = 1.
    let (height_a, height_b) = (radius_a.cos(), radius_b.cos());
    let determinant = 1.0 - similarity * similarity;
    let x = (height_a - height_b * similarity) / determinant;
    let y = (height_b - height_a * similarity) / determinant;
    let base = center_a * x + center_b * y;
    let binormal = center_a.cross(center_b);
    let z_squared = (1.0 - base.length_squared()) / determinant;

    if z_squared <= TOLERANCE {
        return vec![base.normalize_or_zero()];
    }
    let z = z_squared.sqrt();
    vec![
        (base + binormal * z).normalize(),
        (base - binormal * z).normalize(),
    ]
}

/// Angular radius of an (extruded) arc's circle around its center axis
pub fn arc_radius(arc: &Arc, extrusion: f64) -> f64 {
    arc.elevation(extrusion).sin().clamp(-1.0, 1.0).acos()
}

fn within_span(arc: &Arc, point: DVec3, extrusion: f64) -> bool {
    arc.position_to_angle(point, extrusion).abs() <= arc.half_angle() + DELTA
}

/// Points where the great circle through `begin` and `end` crosses the
/// (extruded) arc. Empty for a zero-length path.
pub fn arc_path_intersections(arc: &Arc, begin: DVec3, end: DVec3, extrusion: f64) -> Vec<DVec3> {
    let Some(path_normal) = begin.cross(end).try_normalize() else {
        return Vec::new();
    };
    circle_circle_intersections(
        arc.center_axis(),
        path_normal,
        arc_radius(arc, extrusion),
        FRAC_PI_2,
    )
    .into_iter()
    .filter(|point| within_span(arc, *point, extrusion))
    .collect()
}

/// The crossing a body travelling from `begin` to `end` meets first.
///
/// Picks the candidate most similar in direction to `begin`. This is only the
/// nearest hit while a single step covers well under half a great circle.
pub fn arc_path_intersection(arc: &Arc, begin: DVec3, end: DVec3, extrusion: f64) -> Option<DVec3> {
    arc_path_intersections(arc, begin, end, extrusion)
        .into_iter()
        .max_by(|a, b| a.dot(begin).total_cmp(&b.dot(begin)))
}

/// Every point where two (extruded) arcs cross within both spans
pub fn arc_arc_intersections(a: &Arc, b: &Arc, extrusion: f64) -> Vec<DVec3> {
    circle_circle_intersections(
        a.center_axis(),
        b.center_axis(),
        arc_radius(a, extrusion),
        arc_radius(b, extrusion),
    )
    .into_iter()
    .filter(|point| within_span(a, *point, extrusion) && within_span(b, *point, extrusion))
    .collect()
}

/// Where two (extruded) arcs cross, if they do within both spans.
///
/// When both crossings qualify, the one nearest an endpoint of `a` wins.
pub fn arc_arc_intersection(a: &Arc, b: &Arc, extrusion: f64) -> Option<DVec3> {
    let (begin, end) = (a.begin(extrusion), a.end(extrusion));
    arc_arc_intersections(a, b, extrusion)
        .into_iter()
        .max_by(|p, q| {
            let p_score = p.dot(begin).max(p.dot(end));
            let q_score = q.dot(begin).max(q.dot(end));
            p_score.total_cmp(&q_score)
        })
}
