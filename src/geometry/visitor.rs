//! Contact point walking along a shape
//!
//! A `ShapeVisitor` remembers which arc a body is touching and where along it.
//! Moving it by a length carries the excess over to the neighboring arcs, so a
//! body sliding along a block rounds corners without ever leaving the
//! boundary. Corners the body cannot reach (a concave corner under positive
//! extrusion) are skipped: the two edges beside them are cut short where their
//! extruded circles cross.

use glam::DVec3;
use std::rc::Rc;

use super::arc::{Arc, GeometryType};
use super::intersection::arc_arc_intersections;
use super::shape::{ArcVisitor, Shape};

/// Whether `arc` is hidden from a body extruded by `extrusion`.
pub fn concave(arc: &Arc, extrusion: f64) -> bool {
    match arc.curvature() {
        GeometryType::ConcaveCorner => extrusion > 0.0,
        GeometryType::ConvexCorner => extrusion < 0.0,
        _ => false,
    }
}

fn step(visitor: ArcVisitor<'_>, forward: bool) -> ArcVisitor<'_> {
    if forward { visitor.right() } else { visitor.left() }
}

/// Mutable cursor tracking a contact along a shape's boundary
#[derive(Debug, Clone)]
pub struct ShapeVisitor {
    shape: Rc<Shape>,
    index: usize,
    angular_position: f64,
    offset: f64,
    left_angle_boundary: f64,
    right_angle_boundary: f64,
}

impl ShapeVisitor {
    /// Start on arc `index` at `angle`, clamped into the usable range.
    pub fn new(shape: Rc<Shape>, index: usize, angle: f64, offset: f64) -> Self {
        let index = index % shape.len();
        let mut visitor = Self {
            shape,
            index,
            angular_position: 0.0,
            offset,
            left_angle_boundary: 0.0,
            right_angle_boundary: 0.0,
        };
        visitor.initialize();
        visitor.angular_position = visitor.clamp(angle);
        visitor
    }

    #[inline]
    pub fn shape(&self) -> &Rc<Shape> {
        &self.shape
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn angular_position(&self) -> f64 {
        self.angular_position
    }

    #[inline]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Usable angle range on the current arc
    #[inline]
    pub fn boundaries(&self) -> (f64, f64) {
        (self.left_angle_boundary, self.right_angle_boundary)
    }

    #[inline]
    pub fn arc(&self) -> &Arc {
        self.shape.arc(self.index)
    }

    pub fn arc_visitor(&self) -> ArcVisitor<'_> {
        ArcVisitor::new(&self.shape, self.index)
    }

    pub fn position(&self) -> DVec3 {
        self.arc().position(self.angular_position, self.offset)
    }

    pub fn normal(&self) -> DVec3 {
        self.arc().normal(self.angular_position, self.offset)
    }

    /// Direction of increasing length along the boundary
    pub fn bearing(&self) -> DVec3 {
        self.arc().bearing(self.angular_position, self.offset)
    }

    /// True if the current arc or either neighbor holds `point`.
    pub fn contains(&self, point: DVec3) -> bool {
        let visitor = self.arc_visitor();
        [visitor.left(), visitor, visitor.right()]
            .iter()
            .any(|neighbor| neighbor.arc().contains(point, self.offset))
    }

    /// Change the extrusion (body radius); boundaries move with it.
    pub fn set_offset(&mut self, offset: f64) {
        self.offset = offset;
        self.initialize();
        self.angular_position = self.clamp(self.angular_position);
    }

    /// Jump to `angle` on the current arc. Past a boundary, the overshoot is
    /// converted to length and walked onto the neighbors.
    pub fn set_position(&mut self, angle: f64) {
        let scale = self.length_per_angle();
        if angle > self.right_angle_boundary {
            let overshoot = (angle - self.right_angle_boundary) * scale;
            self.angular_position = self.right_angle_boundary;
            self.move_position(overshoot);
        } else if angle < self.left_angle_boundary {
            let overshoot = (angle - self.left_angle_boundary) * scale;
            self.angular_position = self.left_angle_boundary;
            self.move_position(overshoot);
        } else {
            self.angular_position = angle;
        }
    }

    /// Slide by `delta_length` along the boundary (positive is towards
    /// `end`), crossing onto neighbors as often as needed.
    pub fn move_position(&mut self, delta_length: f64) {
        let mut remaining = delta_length;
        let limit = self.crossing_limit(delta_length);
        for _ in 0..limit {
            if remaining == 0.0 {
                return;
            }
            let scale = self.length_per_angle();
            if remaining > 0.0 {
                let available = ((self.right_angle_boundary - self.angular_position) * scale).max(0.0);
                if scale > 0.0 && remaining <= available {
                    self.angular_position += remaining / scale;
                    return;
                }
                remaining -= available;
                self.cross(true);
            } else {
                let available = ((self.angular_position - self.left_angle_boundary) * scale).max(0.0);
                if scale > 0.0 && -remaining <= available {
                    self.angular_position += remaining / scale;
                    return;
                }
                remaining += available;
                self.cross(false);
            }
        }
        log::warn!(
            "shape visitor gave up after {limit} crossings with {remaining} length left (arc {})",
            self.index
        );
    }

    /// Length travelled per radian around the current arc's pole
    fn length_per_angle(&self) -> f64 {
        self.arc().elevation(self.offset).cos().abs()
    }

    /// Enough crossings for the requested distance plus a spare lap.
    fn crossing_limit(&self, delta_length: f64) -> usize {
        let perimeter = self.shape.perimeter(self.offset);
        let laps = if perimeter > 0.0 {
            (delta_length.abs() / perimeter).ceil().min(1024.0) as usize
        } else {
            1
        };
        (laps + 1) * self.shape.len() + 1
    }

    fn clamp(&self, angle: f64) -> f64 {
        angle.clamp(self.left_angle_boundary, self.right_angle_boundary)
    }

    /// Step onto the next usable arc and stand at its near boundary.
    fn cross(&mut self, forward: bool) {
        let index = {
            let next = step(self.arc_visitor(), forward);
            if concave(next.arc(), self.offset) {
                step(next, forward).index()
            } else {
                next.index()
            }
        };
        self.index = index;
        self.initialize();
        self.angular_position = if forward {
            self.left_angle_boundary
        } else {
            self.right_angle_boundary
        };
        log::trace!("shape visitor crossed onto arc {index}");
    }

    /// Recompute the usable range of the current arc.
    fn initialize(&mut self) {
        let (left, right) = {
            let visitor = self.arc_visitor();
            let arc = visitor.arc();
            let half_angle = arc.half_angle();
            let left = self
                .capped_boundary(visitor.left(), visitor.left().left(), false)
                .unwrap_or(-half_angle);
            let right = self
                .capped_boundary(visitor.right(), visitor.right().right(), true)
                .unwrap_or(half_angle);
            (left, right)
        };
        if left > right {
            // Both neighbors' crossings overlap: the arc is out of reach.
            let middle = (left + right) / 2.0;
            log::debug!("arc {} is hidden at offset {}", self.index, self.offset);
            self.left_angle_boundary = middle;
            self.right_angle_boundary = middle;
        } else {
            self.left_angle_boundary = left;
            self.right_angle_boundary = right;
        }
    }

    /// Angle where the current arc meets `far` when `neighbor` is hidden.
    fn capped_boundary(&self, neighbor: ArcVisitor<'_>, far: ArcVisitor<'_>, right: bool) -> Option<f64> {
        if !concave(neighbor.arc(), self.offset) {
            return None;
        }
        let arc = self.arc();
        let half_angle = arc.half_angle();
        let angles = arc_arc_intersections(arc, far.arc(), self.offset)
            .into_iter()
            .map(|point| arc.position_to_angle(point, self.offset).clamp(-half_angle, half_angle));
        let angle = if right {
            angles.max_by(f64::total_cmp)
        } else {
            angles.min_by(f64::total_cmp)
        };
        if angle.is_none() {
            log::debug!(
                "no crossing between arcs {} and {} at offset {}",
                self.index,
                far.index(),
                self.offset
            );
        }
        angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angular_distance;
    use crate::geometry::intersection::arc_arc_intersection;
    use crate::geometry::shape::tests::{arrow, square};
    use proptest::prelude::*;

    #[test]
    fn test_concave_predicate() {
        let shape = arrow();
        let notch = shape.arc(5);
        assert!(concave(notch, 0.01));
        assert!(!concave(notch, 0.0));
        assert!(concave(shape.arc(1), -0.01));
        assert!(!concave(shape.arc(1), 0.01));
        assert!(!concave(shape.arc(0), 0.5));
    }

    #[test]
    fn test_full_perimeter_returns_to_start() {
        for e in [0.0, 0.05] {
            let shape = Rc::new(square(0.3));
            let perimeter = shape.perimeter(e);
            let mut visitor = ShapeVisitor::new(shape, 0, 0.0, e);
            visitor.move_position(perimeter);
            assert_eq!(visitor.index(), 0, "e={e}");
            assert!(visitor.angular_position().abs() < 1e-9, "e={e}");

            visitor.move_position(-perimeter);
            assert_eq!(visitor.index(), 0, "e={e}");
            assert!(visitor.angular_position().abs() < 1e-9, "e={e}");
        }
    }

    #[test]
    fn test_unextruded_corner_is_passed_through() {
        let shape = Rc::new(square(0.3));
        let half_angle = shape.arc(0).half_angle();
        let mut visitor = ShapeVisitor::new(shape.clone(), 0, half_angle, 0.0);
        visitor.move_position(0.01);
        assert_eq!(visitor.index(), 2);
        let expected = shape.arc(2).position(-shape.arc(2).half_angle() + 0.01, 0.0);
        assert!(visitor.position().abs_diff_eq(expected, 1e-9));
    }

    #[test]
    fn test_extruded_convex_corner_rounds_the_vertex() {
        let shape = Rc::new(square(0.3));
        let e = 0.05;
        let vertex = shape.arc(0).end(0.0);
        let mut visitor = ShapeVisitor::new(shape.clone(), 0, shape.arc(0).half_angle(), e);
        visitor.move_position(0.01);
        assert_eq!(visitor.index(), 1);
        assert!((angular_distance(visitor.position(), vertex) - e).abs() < 1e-9);
        // The normal keeps pointing away from the vertex.
        assert!(visitor.normal().dot(visitor.position() - vertex) > 0.0);
    }

    #[test]
    fn test_concave_notch_caps_and_skips() {
        let shape = Rc::new(arrow());
        let e = 0.02;
        let mut visitor = ShapeVisitor::new(shape.clone(), 4, 0.0, e);
        let (left, right) = visitor.boundaries();
        assert_eq!(left, -shape.arc(4).half_angle());
        assert!(right < shape.arc(4).half_angle());

        let crossing = arc_arc_intersection(shape.arc(4), shape.arc(6), e).unwrap();
        visitor.set_position(right);
        assert!(visitor.position().abs_diff_eq(crossing, 1e-9));

        visitor.move_position(1e-4);
        assert_eq!(visitor.index(), 6);
        assert!(angular_distance(visitor.position(), crossing) < 2e-4);

        visitor.move_position(-2e-4);
        assert_eq!(visitor.index(), 4);
    }

    #[test]
    fn test_set_offset_moves_boundaries() {
        let shape = Rc::new(arrow());
        let mut visitor = ShapeVisitor::new(shape.clone(), 4, shape.arc(4).half_angle(), 0.0);
        assert_eq!(visitor.boundaries().1, shape.arc(4).half_angle());
        visitor.set_offset(0.02);
        let capped = visitor.boundaries().1;
        assert!(capped < shape.arc(4).half_angle());
        assert_eq!(visitor.angular_position(), capped);
    }

    #[test]
    fn test_set_position_overflows_onto_neighbor() {
        let shape = Rc::new(square(0.3));
        let half_angle = shape.arc(0).half_angle();
        let mut visitor = ShapeVisitor::new(shape.clone(), 0, 0.0, 0.0);
        visitor.set_position(half_angle + 0.02);
        assert_eq!(visitor.index(), 2);
        let expected = shape.arc(2).position(-shape.arc(2).half_angle() + 0.02, 0.0);
        assert!(visitor.position().abs_diff_eq(expected, 1e-9));
    }

    #[test]
    fn test_contains_checks_neighbors() {
        let shape = Rc::new(square(0.3));
        let visitor = ShapeVisitor::new(shape.clone(), 2, 0.0, 0.03);
        assert!(visitor.contains(shape.arc(1).position(0.0, 0.03)));
        assert!(visitor.contains(shape.arc(3).position(0.0, 0.03)));
        assert!(!visitor.contains(shape.arc(6).position(0.0, 0.03)));
    }

    proptest! {
        #[test]
        fn prop_move_position_is_additive(
            t in -1.0f64..1.0,
            d1 in -0.5f64..0.5,
            d2 in -0.5f64..0.5,
            e in 0.0f64..0.05,
        ) {
            let shape = Rc::new(square(0.3));
            let start = ShapeVisitor::new(shape.clone(), 0, t * shape.arc(0).half_angle(), e);

            let mut stepped = start.clone();
            stepped.move_position(d1);
            stepped.move_position(d2);

            let mut direct = start;
            direct.move_position(d1 + d2);

            prop_assert!(
                stepped.position().abs_diff_eq(direct.position(), 1e-9),
                "{:?} vs {:?}", stepped.position(), direct.position()
            );
        }
    }
}
