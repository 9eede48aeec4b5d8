//! Narrow phase: where a moving body meets a block's arc
//!
//! The body's last step is a short great-circle path. Against an arc extruded
//! by the body's radius, the first crossing of that path is the contact. A
//! body that ended the step inside the band without a clean crossing (it
//! started there, or the step was too coarse) is projected onto the arc
//! instead.

use glam::DVec3;

use super::material::ContactMaterial;
use super::state::{Block, BlockId, BodyId, Rigidbody};
use crate::angular_distance;
use crate::consts::DELTA;
use crate::geometry::{ShapeVisitor, arc_path_intersections};

/// One contact between a body and a block
#[derive(Debug, Clone)]
pub struct BlockCollision {
    pub body: BodyId,
    pub block: BlockId,
    /// Arc first touched
    pub arc: usize,
    /// Tracks the contact point as the body slides
    pub visitor: ShapeVisitor,
    /// Angle travelled this step before touching
    pub distance: f64,
    /// Angle travelled past the surface
    pub overshoot: f64,
    pub material: ContactMaterial,
}

/// Whether `point` lies on the short great-circle path between the two ends.
fn on_path(begin: DVec3, end: DVec3, point: DVec3) -> bool {
    angular_distance(begin, point) + angular_distance(point, end) <= angular_distance(begin, end) + DELTA
}

impl BlockCollision {
    /// Test `body`'s last step against arc `arc_index` of `block`.
    ///
    /// `None` unless the body crossed into the arc's band while moving
    /// against its normal.
    pub fn block_collision(body: &Rigidbody, block: &Block, arc_index: usize) -> Option<Self> {
        let begin = block.to_local(body.previous_position);
        let end = block.to_local(body.position);
        let extrusion = body.radius;
        let arc = block.shape.arc(arc_index);

        let crossing = arc_path_intersections(arc, begin, end, extrusion)
            .into_iter()
            .filter(|point| on_path(begin, end, *point))
            .max_by(|a, b| a.dot(begin).total_cmp(&b.dot(begin)));
        let point = match crossing {
            Some(point) => point,
            None if arc.contains(end, extrusion) => arc.closest_point(end, extrusion),
            None => return None,
        };

        let angle = arc.closest_angle(point, extrusion);
        if arc.normal(angle, extrusion).dot(end - begin) >= 0.0 {
            return None;
        }

        Some(Self {
            body: body.id,
            block: block.id,
            arc: arc_index % block.shape.len(),
            visitor: ShapeVisitor::new(block.shape.clone(), arc_index, angle, extrusion),
            distance: angular_distance(begin, point),
            overshoot: angular_distance(point, end),
            material: body.material.combine(&block.material),
        })
    }
}
