//! Deterministic simulation module
//!
//! Bodies moving over blocks on the unit sphere. This module must stay
//! deterministic:
//! - Fixed timestep only
//! - Stable iteration order (by entity ID)
//! - No platform dependencies

pub mod collider;
pub mod collision;
pub mod material;
pub mod state;
pub mod tick;

pub use collider::{
    ArcColliders, BoundingSphere, ColliderHandle, ColliderOwner, ColliderRegistry, ColliderSlot,
    OverlapQuery, candidate_arcs, swept_query,
};
pub use collision::BlockCollision;
pub use material::{CombineMode, ContactMaterial, PhysicsMaterial, blend};
pub use state::{Block, BlockId, BodyId, CollisionEvent, CollisionObserver, Rigidbody, World};
pub use tick::{tick, tick_with};
