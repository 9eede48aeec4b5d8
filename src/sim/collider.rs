//! Broad phase: arcs as Euclidean bounding spheres
//!
//! Every arc is bounded by three caps of the unit sphere: the two sides of its
//! circle (floor and ceiling, which only share the circle itself) and a cap
//! around its midpoint wide enough to reach both ends. Each cap becomes a 3D
//! sphere whose intersection with the unit sphere is exactly the cap, so a
//! body whose query sphere touches all three may be touching the arc.
//!
//! The overlap test itself is an external concern behind [`OverlapQuery`];
//! [`ColliderRegistry`] is the built-in brute-force implementation.

use glam::{DQuat, DVec3};
use std::collections::HashMap;

use super::state::{Block, BlockId};
use crate::angular_distance;
use crate::consts::TOLERANCE;
use crate::geometry::{Arc, GeometryType, SphericalCap};

/// A 3D sphere standing in for a spherical cap
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundingSphere {
    /// Apex of the cone tangent to the unit sphere along the cap's rim.
    /// Tight, but only usable for caps well under a hemisphere.
    Ideal { center: DVec3, radius: f64 },
    /// Radius-2 sphere crossing the unit sphere along the cap's rim
    Uniform { center: DVec3 },
    /// Overlaps nothing
    Never,
}

impl BoundingSphere {
    pub const UNIFORM_RADIUS: f64 = 2.0;

    /// Cone-apex sphere: centre `n / cos θ`, radius `tan θ`.
    pub fn ideal(cap: &SphericalCap) -> Self {
        let cos = cap.offset().max(TOLERANCE);
        let sin = (1.0 - cos * cos).max(0.0).sqrt();
        BoundingSphere::Ideal {
            center: cap.normal() / cos,
            radius: sin / cos,
        }
    }

    /// Radius-2 sphere at distance `c` along the cap normal, where
    /// `1 + c² - 2c·cos θ = 4` gives `c = cos θ + sqrt(cos² θ + 3)`.
    pub fn uniform(cap: &SphericalCap) -> Self {
        let offset = cap.offset();
        let axial_distance = offset + (offset * offset + 3.0).sqrt();
        BoundingSphere::Uniform {
            center: cap.normal() * axial_distance,
        }
    }

    /// Tightest proxy for the cap: ideal under `ideal_max_angle`, uniform otherwise.
    pub fn from_cap(cap: &SphericalCap, ideal_max_angle: f64) -> Self {
        if cap.angle() < ideal_max_angle && cap.offset() > TOLERANCE {
            Self::ideal(cap)
        } else {
            Self::uniform(cap)
        }
    }

    pub fn center(&self) -> Option<DVec3> {
        match *self {
            BoundingSphere::Ideal { center, .. } | BoundingSphere::Uniform { center } => Some(center),
            BoundingSphere::Never => None,
        }
    }

    pub fn radius(&self) -> Option<f64> {
        match *self {
            BoundingSphere::Ideal { radius, .. } => Some(radius),
            BoundingSphere::Uniform { .. } => Some(Self::UNIFORM_RADIUS),
            BoundingSphere::Never => None,
        }
    }

    /// Euclidean sphere-sphere overlap (touching counts)
    pub fn overlaps(&self, center: DVec3, radius: f64) -> bool {
        match (self.center(), self.radius()) {
            (Some(own_center), Some(own_radius)) => {
                own_center.distance(center) <= own_radius + radius
            }
            _ => false,
        }
    }

    pub fn rotated(&self, rotation: DQuat) -> Self {
        match *self {
            BoundingSphere::Ideal { center, radius } => BoundingSphere::Ideal {
                center: rotation * center,
                radius,
            },
            BoundingSphere::Uniform { center } => BoundingSphere::Uniform {
                center: rotation * center,
            },
            BoundingSphere::Never => BoundingSphere::Never,
        }
    }
}

/// Which of an arc's three bounds a collider stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColliderSlot {
    /// Pole side of the arc's circle
    Floor,
    /// Far side of the arc's circle
    Ceiling,
    /// Cap around the arc's angular span
    Boundary,
}

impl ColliderSlot {
    pub const ALL: [ColliderSlot; 3] = [ColliderSlot::Floor, ColliderSlot::Ceiling, ColliderSlot::Boundary];

    fn bit(self) -> u8 {
        match self {
            ColliderSlot::Floor => 1,
            ColliderSlot::Ceiling => 2,
            ColliderSlot::Boundary => 4,
        }
    }
}

/// The three bounding spheres of one arc
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcColliders {
    pub floor: BoundingSphere,
    pub ceiling: BoundingSphere,
    pub boundary: BoundingSphere,
}

impl ArcColliders {
    pub fn new(arc: &Arc, ideal_max_angle: f64) -> Self {
        // Concave corners are resolved by the shape visitor, never by contact.
        if arc.curvature() == GeometryType::ConcaveCorner {
            return Self {
                floor: BoundingSphere::Never,
                ceiling: BoundingSphere::Never,
                boundary: BoundingSphere::Never,
            };
        }
        let floor = arc.floor(0.0);
        let middle = arc.position(0.0, 0.0);
        let reach = angular_distance(middle, arc.begin(0.0)).max(angular_distance(middle, arc.end(0.0)));
        Self {
            floor: BoundingSphere::from_cap(&floor, ideal_max_angle),
            ceiling: BoundingSphere::from_cap(&floor.complement(), ideal_max_angle),
            boundary: BoundingSphere::from_cap(&SphericalCap::from_angle(middle, reach), ideal_max_angle),
        }
    }

    pub fn slot(&self, slot: ColliderSlot) -> BoundingSphere {
        match slot {
            ColliderSlot::Floor => self.floor,
            ColliderSlot::Ceiling => self.ceiling,
            ColliderSlot::Boundary => self.boundary,
        }
    }
}

/// Opaque handle the overlap query hands back
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColliderHandle(pub u32);

/// What a collider handle belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderOwner {
    pub block: BlockId,
    pub arc: usize,
    pub slot: ColliderSlot,
}

/// The physics engine's sphere overlap primitive
pub trait OverlapQuery {
    /// Handles of every collider on a layer in `layer_mask` whose sphere
    /// overlaps the query sphere.
    fn overlap_sphere(&self, center: DVec3, radius: f64, layer_mask: u32) -> Vec<ColliderHandle>;
}

#[derive(Debug, Clone)]
struct Entry {
    handle: ColliderHandle,
    owner: ColliderOwner,
    /// Block-local sphere; `sphere` is this rotated into the world.
    local: BoundingSphere,
    sphere: BoundingSphere,
    layer: u32,
}

/// Collider handle → owning arc lookup plus a brute-force overlap query
#[derive(Debug, Clone, Default)]
pub struct ColliderRegistry {
    entries: Vec<Entry>,
    owners: HashMap<ColliderHandle, ColliderOwner>,
    next_handle: u32,
}

impl ColliderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register three colliders for every arc of `block`.
    pub fn register_block(&mut self, block: &Block, ideal_max_angle: f64) {
        for (arc_index, arc) in block.shape.arcs().iter().enumerate() {
            let colliders = ArcColliders::new(arc, ideal_max_angle);
            for slot in ColliderSlot::ALL {
                let handle = ColliderHandle(self.next_handle);
                self.next_handle += 1;
                let owner = ColliderOwner {
                    block: block.id,
                    arc: arc_index,
                    slot,
                };
                let local = colliders.slot(slot);
                self.entries.push(Entry {
                    handle,
                    owner,
                    local,
                    sphere: local.rotated(block.rotation),
                    layer: block.layer,
                });
                self.owners.insert(handle, owner);
            }
        }
        log::debug!("registered {} colliders for block {:?}", block.shape.len() * 3, block.id);
    }

    pub fn unregister_block(&mut self, id: BlockId) {
        let owners = &mut self.owners;
        self.entries.retain(|entry| {
            let keep = entry.owner.block != id;
            if !keep {
                owners.remove(&entry.handle);
            }
            keep
        });
        log::debug!("unregistered colliders of block {id:?}");
    }

    /// Follow a block's new rotation (handles stay valid).
    pub fn update_rotation(&mut self, id: BlockId, rotation: DQuat) {
        for entry in self.entries.iter_mut().filter(|entry| entry.owner.block == id) {
            entry.sphere = entry.local.rotated(rotation);
        }
    }

    pub fn owner(&self, handle: ColliderHandle) -> Option<ColliderOwner> {
        self.owners.get(&handle).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl OverlapQuery for ColliderRegistry {
    fn overlap_sphere(&self, center: DVec3, radius: f64, layer_mask: u32) -> Vec<ColliderHandle> {
        self.entries
            .iter()
            .filter(|entry| entry.layer & layer_mask != 0 && entry.sphere.overlaps(center, radius))
            .map(|entry| entry.handle)
            .collect()
    }
}

/// Arcs whose three colliders all showed up among `handles`, in
/// (block, arc) order. Handles the registry does not know are reported and
/// dropped.
pub fn candidate_arcs(registry: &ColliderRegistry, handles: &[ColliderHandle]) -> Vec<(BlockId, usize)> {
    let mut hits: std::collections::BTreeMap<(BlockId, usize), u8> = std::collections::BTreeMap::new();
    for &handle in handles {
        match registry.owner(handle) {
            Some(owner) => *hits.entry((owner.block, owner.arc)).or_default() |= owner.slot.bit(),
            None => log::warn!("broad phase returned collider {handle:?} with no arc behind it"),
        }
    }
    hits.into_iter()
        .filter(|&(_, mask)| mask == 0b111)
        .map(|(key, _)| key)
        .collect()
}

/// Query sphere covering a body of angular `radius` anywhere on the great
/// circle step from `previous` to `current`.
pub fn swept_query(previous: DVec3, current: DVec3, radius: f64) -> (DVec3, f64) {
    let center = (previous + current).normalize_or(current);
    let reach = (angular_distance(previous, current) / 2.0 + radius).min(std::f64::consts::PI);
    (center, 2.0 * (reach / 2.0).sin())
}
