//! Shapes: cyclic sequences of arcs
//!
//! A shape is the boundary of one block. Edges and corners alternate; index
//! arithmetic wraps around, so the arc after the last is the first.

use glam::DVec3;

use super::arc::{Arc, ArcRecord};
use super::factory::{corner, great_arc};
use crate::error::PlanetariaError;

/// Ordered, cyclic boundary of a block
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    arcs: Vec<Arc>,
}

impl Shape {
    /// Wrap arcs that already include their corners.
    pub fn new(arcs: Vec<Arc>) -> Result<Self, PlanetariaError> {
        if arcs.is_empty() {
            return Err(PlanetariaError::EmptyShape);
        }
        Ok(Self { arcs })
    }

    /// Close a loop of edges, inserting the corner between each consecutive
    /// pair (including last → first).
    pub fn from_edges(edges: &[Arc]) -> Result<Self, PlanetariaError> {
        if edges.is_empty() {
            return Err(PlanetariaError::EmptyShape);
        }
        let mut arcs = Vec::with_capacity(edges.len() * 2);
        for (index, edge) in edges.iter().enumerate() {
            let next = &edges[(index + 1) % edges.len()];
            arcs.push(*edge);
            arcs.push(corner(edge, next));
        }
        Self::new(arcs)
    }

    /// Great-circle polygon. Vertices go clockwise seen from outside the
    /// sphere, so the block lies to the right of each edge.
    pub fn polygon(vertices: &[DVec3]) -> Result<Self, PlanetariaError> {
        if vertices.len() < 2 {
            return Err(PlanetariaError::EmptyShape);
        }
        let edges: Vec<Arc> = vertices
            .iter()
            .zip(vertices.iter().cycle().skip(1))
            .map(|(from, to)| great_arc(from.normalize(), to.normalize()))
            .collect();
        Self::from_edges(&edges)
    }

    /// An open path: walked out along its edges and back along their
    /// reverses, so both sides collide and the ends are rounded.
    pub fn path(edges: &[Arc]) -> Result<Self, PlanetariaError> {
        let mut loop_edges: Vec<Arc> = edges.to_vec();
        loop_edges.extend(edges.iter().rev().map(Arc::reversed));
        Self::from_edges(&loop_edges)
    }

    /// Rebuild from compact records (corners included).
    pub fn from_records(records: &[ArcRecord]) -> Result<Self, PlanetariaError> {
        let arcs = records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                Arc::from_record(record).map_err(|error| match error {
                    PlanetariaError::InvalidArc { reason, .. } => PlanetariaError::InvalidArc { index, reason },
                    other => other,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(arcs)
    }

    pub fn to_records(&self) -> Vec<ArcRecord> {
        self.arcs.iter().map(Arc::to_record).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    /// Always false: construction rejects empty shapes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    pub fn arcs(&self) -> &[Arc] {
        &self.arcs
    }

    /// Arc at `index`, wrapping around
    #[inline]
    pub fn arc(&self, index: usize) -> &Arc {
        &self.arcs[index % self.arcs.len()]
    }

    pub fn visitor(&self, index: usize) -> ArcVisitor<'_> {
        ArcVisitor::new(self, index)
    }

    /// Total boundary length once extruded
    pub fn perimeter(&self, extrusion: f64) -> f64 {
        self.arcs.iter().map(|arc| arc.length(extrusion)).sum()
    }

    /// Index and angle of the nearest point on the extruded boundary.
    /// Ties go to the lower index.
    pub fn closest(&self, point: DVec3, extrusion: f64) -> (usize, f64) {
        let mut best = (0, 0.0);
        let mut best_similarity = f64::NEG_INFINITY;
        for (index, arc) in self.arcs.iter().enumerate() {
            let angle = arc.closest_angle(point, extrusion);
            let similarity = arc.position(angle, extrusion).dot(point);
            if similarity > best_similarity {
                best = (index, angle);
                best_similarity = similarity;
            }
        }
        best
    }

    /// The same shape with every arc rotated
    pub fn rotated(&self, rotation: glam::DQuat) -> Self {
        Self {
            arcs: self.arcs.iter().map(|arc| arc.rotated(rotation)).collect(),
        }
    }
}

/// Read-only cyclic cursor into a shape
#[derive(Debug, Clone, Copy)]
pub struct ArcVisitor<'a> {
    shape: &'a Shape,
    index: usize,
}

impl<'a> ArcVisitor<'a> {
    pub fn new(shape: &'a Shape, index: usize) -> Self {
        Self {
            shape,
            index: index % shape.len(),
        }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn arc(&self) -> &'a Arc {
        &self.shape.arcs[self.index]
    }

    /// Previous arc (wrapping)
    pub fn left(&self) -> Self {
        let len = self.shape.len();
        Self {
            shape: self.shape,
            index: (self.index + len - 1) % len,
        }
    }

    /// Next arc (wrapping)
    pub fn right(&self) -> Self {
        Self {
            shape: self.shape,
            index: (self.index + 1) % self.shape.len(),
        }
    }
}
