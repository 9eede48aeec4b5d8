//! Spherical geometry
//!
//! Pure functions and immutable values only: nothing in here keeps state
//! between calls except `ShapeVisitor`, which belongs to a single contact.

pub mod arc;
pub mod cap;
pub mod coordinates;
pub mod factory;
pub mod intersection;
pub mod shape;
pub mod visitor;

pub use arc::{Arc, ArcRecord, CurvatureSigns, GeometryType};
pub use cap::SphericalCap;
pub use coordinates::{
    NormalizedCartesianCoordinates, NormalizedSphericalCoordinates, OctahedralCoordinates,
    OctahedralUvCoordinates, UvCoordinates,
};
pub use factory::{concave_corner, convex_corner, corner, curve, great_arc, straight_corner};
pub use intersection::{
    arc_arc_intersection, arc_arc_intersections, arc_path_intersection, arc_path_intersections,
    circle_circle_intersections,
};
pub use shape::{ArcVisitor, Shape};
pub use visitor::{ShapeVisitor, concave};
