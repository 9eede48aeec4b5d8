//! World state and core simulation types
//!
//! Blocks and bodies live in one `World`, keyed by id so iteration order is
//! stable. The collider lookup that maps broad-phase handles back to arcs is
//! owned by the world too, populated on spawn and cleared on despawn.

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::rc::Rc;

use super::collider::ColliderRegistry;
use super::collision::BlockCollision;
use super::material::PhysicsMaterial;
use crate::config::PhysicsConfig;
use crate::error::PlanetariaError;
use crate::geometry::Shape;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// A polygon on the sphere that bodies collide with
#[derive(Debug, Clone)]
pub struct Block {
    pub id: BlockId,
    /// Boundary in block-local space
    pub shape: Rc<Shape>,
    /// Block-local to world
    pub rotation: DQuat,
    /// Spin (axis scaled by radians per second), 0 = stationary
    pub angular_velocity: DVec3,
    pub material: PhysicsMaterial,
    /// Layer bits matched against the overlap query's mask
    pub layer: u32,
}

impl Block {
    pub fn new(id: BlockId, shape: Rc<Shape>, rotation: DQuat, material: PhysicsMaterial) -> Self {
        Self {
            id,
            shape,
            rotation: rotation.normalize(),
            angular_velocity: DVec3::ZERO,
            material,
            layer: 1,
        }
    }

    #[inline]
    pub fn to_local(&self, world: DVec3) -> DVec3 {
        self.rotation.inverse() * world
    }

    #[inline]
    pub fn to_world(&self, local: DVec3) -> DVec3 {
        self.rotation * local
    }

    /// Spin by `angular_velocity * dt`. Returns whether the block moved.
    pub fn rotate(&mut self, dt: f64) -> bool {
        let Some(axis) = self.angular_velocity.try_normalize() else {
            return false;
        };
        let angle = self.angular_velocity.length() * dt;
        self.rotation = (DQuat::from_axis_angle(axis, angle) * self.rotation).normalize();
        true
    }
}

/// Contact bookkeeping for one body: at most one block at a time.
#[derive(Debug, Clone, Default)]
pub struct CollisionObserver {
    contact: Option<BlockCollision>,
    /// Speed along the surface (positive follows the boundary's bearing)
    pub horizontal_velocity: f64,
    /// Speed away from the surface
    pub vertical_velocity: f64,
}

impl CollisionObserver {
    #[inline]
    pub fn contact(&self) -> Option<&BlockCollision> {
        self.contact.as_ref()
    }

    #[inline]
    pub fn contact_mut(&mut self) -> Option<&mut BlockCollision> {
        self.contact.as_mut()
    }

    #[inline]
    pub fn grounded(&self) -> bool {
        self.contact.is_some()
    }

    /// Start a contact; `velocity` is the body's velocity in the block's frame.
    pub fn enter(&mut self, collision: BlockCollision, velocity: DVec3) {
        let normal = collision.visitor.normal();
        let bearing = collision.visitor.bearing();
        self.horizontal_velocity = velocity.dot(bearing);
        self.vertical_velocity = (-velocity.dot(normal)).max(0.0) * collision.material.elasticity;
        self.contact = Some(collision);
    }

    pub fn exit(&mut self) -> Option<BlockCollision> {
        self.horizontal_velocity = 0.0;
        self.vertical_velocity = 0.0;
        self.contact.take()
    }
}

/// A moving body of finite angular radius
#[derive(Debug, Clone)]
pub struct Rigidbody {
    pub id: BodyId,
    /// Unit vector (world)
    pub position: DVec3,
    /// Where the last step started
    pub previous_position: DVec3,
    /// Tangential velocity while airborne (world, radians per second)
    pub velocity: DVec3,
    /// Angular radius; arcs are extruded by this much when it touches them
    pub radius: f64,
    pub material: PhysicsMaterial,
    pub observer: CollisionObserver,
}

impl Rigidbody {
    pub fn new(id: BodyId, position: DVec3, velocity: DVec3, radius: f64, material: PhysicsMaterial) -> Self {
        let position = position.normalize_or(DVec3::Y);
        Self {
            id,
            position,
            previous_position: position,
            velocity: velocity - position * velocity.dot(position),
            radius: radius.max(0.0),
            material,
            observer: CollisionObserver::default(),
        }
    }

    #[inline]
    pub fn grounded(&self) -> bool {
        self.observer.grounded()
    }

    /// One airborne step: tangential gravity, then travel along the great
    /// circle of the velocity, carrying the velocity with it.
    pub fn integrate_airborne(&mut self, gravity: DVec3, dt: f64) {
        let position = self.position;
        self.previous_position = position;
        self.velocity += (gravity - position * gravity.dot(position)) * dt;

        let speed = self.velocity.length();
        let Some(direction) = self.velocity.try_normalize() else {
            return;
        };
        let (sin, cos) = (speed * dt).sin_cos();
        self.position = (position * cos + direction * sin).normalize();
        self.velocity = (direction * cos - position * sin) * speed;
    }

    /// End the current contact, turning the surface velocity back into a
    /// world-space velocity. `rotation` is the contact block's.
    pub fn leave(&mut self, rotation: DQuat) -> Option<BlockCollision> {
        let horizontal = self.observer.horizontal_velocity;
        let vertical = self.observer.vertical_velocity;
        let contact = self.observer.exit()?;
        let local = contact.visitor.bearing() * horizontal + contact.visitor.normal() * vertical;
        self.velocity = rotation * local;
        self.previous_position = self.position;
        Some(contact)
    }
}

/// Contact notifications, in the order a tick produced them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionEvent {
    Enter { body: BodyId, block: BlockId, arc: usize },
    Exit { body: BodyId, block: BlockId },
}

/// Everything the simulation owns
#[derive(Debug)]
pub struct World {
    pub config: PhysicsConfig,
    pub(crate) blocks: BTreeMap<BlockId, Block>,
    pub(crate) bodies: BTreeMap<BodyId, Rigidbody>,
    pub(crate) registry: ColliderRegistry,
    /// Exits caused outside a tick (despawns), reported by the next tick
    pub(crate) pending: Vec<CollisionEvent>,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub(crate) accumulator: f64,
    next_id: u32,
}

impl World {
    pub fn new(config: PhysicsConfig) -> Self {
        Self {
            config,
            blocks: BTreeMap::new(),
            bodies: BTreeMap::new(),
            registry: ColliderRegistry::new(),
            pending: Vec::new(),
            time_ticks: 0,
            accumulator: 0.0,
            next_id: 1,
        }
    }

    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn spawn_block(&mut self, shape: Shape, rotation: DQuat, material: PhysicsMaterial) -> BlockId {
        let id = BlockId(self.next_entity_id());
        self.insert_block(Block::new(id, Rc::new(shape), rotation, material));
        id
    }

    /// Add a prepared block, keeping its id unless that is 0 or taken.
    pub fn insert_block(&mut self, mut block: Block) -> BlockId {
        if self.blocks.contains_key(&block.id) || block.id.0 == 0 {
            block.id = BlockId(self.next_entity_id());
        } else {
            self.next_id = self.next_id.max(block.id.0 + 1);
        }
        let id = block.id;
        self.registry.register_block(&block, self.config.ideal_collider_max_angle);
        self.blocks.insert(id, block);
        id
    }

    /// Remove a block. Bodies resting on it fall off; their exits are
    /// reported by the next tick.
    pub fn despawn_block(&mut self, id: BlockId) -> Result<Block, PlanetariaError> {
        let block = self.blocks.remove(&id).ok_or(PlanetariaError::UnknownBlock(id))?;
        self.registry.unregister_block(id);
        for body in self.bodies.values_mut() {
            if body.observer.contact().is_some_and(|contact| contact.block == id) {
                body.leave(block.rotation);
                self.pending.push(CollisionEvent::Exit { body: body.id, block: id });
            }
        }
        log::debug!("despawned block {id:?}");
        Ok(block)
    }

    pub fn spawn_body(&mut self, position: DVec3, velocity: DVec3, radius: f64, material: PhysicsMaterial) -> BodyId {
        let id = BodyId(self.next_entity_id());
        self.bodies.insert(id, Rigidbody::new(id, position, velocity, radius, material));
        id
    }

    pub fn despawn_body(&mut self, id: BodyId) -> Result<Rigidbody, PlanetariaError> {
        let body = self.bodies.remove(&id).ok_or(PlanetariaError::UnknownBody(id))?;
        if let Some(contact) = body.observer.contact() {
            self.pending.push(CollisionEvent::Exit { body: id, block: contact.block });
        }
        Ok(body)
    }

    /// Turn a block. Colliders follow, and so do bodies resting on it.
    pub fn set_block_rotation(&mut self, id: BlockId, rotation: DQuat) -> Result<(), PlanetariaError> {
        let block = self.blocks.get_mut(&id).ok_or(PlanetariaError::UnknownBlock(id))?;
        block.rotation = rotation.normalize();
        self.registry.update_rotation(id, block.rotation);
        let rotation = block.rotation;
        for body in self.bodies.values_mut() {
            if let Some(contact) = body.observer.contact().filter(|contact| contact.block == id) {
                body.position = rotation * contact.visitor.position();
            }
        }
        Ok(())
    }

    pub fn set_block_angular_velocity(&mut self, id: BlockId, angular_velocity: DVec3) -> Result<(), PlanetariaError> {
        let block = self.blocks.get_mut(&id).ok_or(PlanetariaError::UnknownBlock(id))?;
        block.angular_velocity = angular_velocity;
        Ok(())
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    pub fn body(&self, id: BodyId) -> Option<&Rigidbody> {
        self.bodies.get(&id)
    }

    /// Blocks in id order
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    /// Bodies in id order
    pub fn bodies(&self) -> impl Iterator<Item = &Rigidbody> {
        self.bodies.values()
    }

    pub fn registry(&self) -> &ColliderRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::shape::tests::square;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_spawn_and_despawn_block() {
        let mut world = World::new(PhysicsConfig::default());
        let id = world.spawn_block(square(0.3), DQuat::IDENTITY, PhysicsMaterial::default());
        assert_eq!(world.registry().len(), 24);
        assert!(world.block(id).is_some());

        world.despawn_block(id).unwrap();
        assert!(world.registry().is_empty());
        assert!(matches!(world.despawn_block(id), Err(PlanetariaError::UnknownBlock(b)) if b == id));
    }

    #[test]
    fn test_unknown_handles_are_errors() {
        let mut world = World::new(PhysicsConfig::default());
        assert!(matches!(world.despawn_body(BodyId(9)), Err(PlanetariaError::UnknownBody(_))));
        assert!(world.set_block_rotation(BlockId(9), DQuat::IDENTITY).is_err());
        assert!(world.set_block_angular_velocity(BlockId(9), DVec3::X).is_err());
    }

    #[test]
    fn test_ids_are_unique_across_kinds() {
        let mut world = World::new(PhysicsConfig::default());
        let block = world.spawn_block(square(0.3), DQuat::IDENTITY, PhysicsMaterial::default());
        let body = world.spawn_body(DVec3::X, DVec3::ZERO, 0.01, PhysicsMaterial::default());
        assert_ne!(block.0, body.0);

        // A clashing id on insert is replaced.
        let clash = Block::new(block, Rc::new(square(0.2)), DQuat::IDENTITY, PhysicsMaterial::default());
        let inserted = world.insert_block(clash);
        assert_ne!(inserted, block);
        assert_eq!(world.blocks().count(), 2);
    }

    #[test]
    fn test_body_velocity_is_tangential() {
        let body = Rigidbody::new(BodyId(1), DVec3::Y * 2.0, DVec3::new(1.0, 5.0, 0.0), 0.01, PhysicsMaterial::default());
        assert!(body.position.abs_diff_eq(DVec3::Y, 1e-12));
        assert!(body.velocity.abs_diff_eq(DVec3::X, 1e-12));
    }

    #[test]
    fn test_airborne_follows_great_circle() {
        let mut body = Rigidbody::new(BodyId(1), DVec3::Y, DVec3::Z * FRAC_PI_2, 0.01, PhysicsMaterial::default());
        for _ in 0..60 {
            body.integrate_airborne(DVec3::ZERO, 1.0 / 60.0);
        }
        assert!(body.position.abs_diff_eq(DVec3::Z, 1e-9));
        assert!(body.velocity.abs_diff_eq(-DVec3::Y * FRAC_PI_2, 1e-9));
    }

    #[test]
    fn test_airborne_falls_towards_gravity() {
        let start = DVec3::new(0.0, 0.5f64.cos(), 0.5f64.sin());
        let mut body = Rigidbody::new(BodyId(1), start, DVec3::ZERO, 0.01, PhysicsMaterial::default());
        for _ in 0..30 {
            body.integrate_airborne(DVec3::new(0.0, 1.0, 0.0), 1.0 / 60.0);
        }
        assert!(body.position.y > start.y);
        assert!((body.position.length() - 1.0).abs() < 1e-12);
        assert!(body.velocity.dot(body.position).abs() < 1e-12);
    }

    #[test]
    fn test_block_rotate() {
        let mut block = Block::new(BlockId(1), Rc::new(square(0.3)), DQuat::IDENTITY, PhysicsMaterial::default());
        assert!(!block.rotate(1.0));
        block.angular_velocity = DVec3::Z * PI;
        assert!(block.rotate(0.5));
        assert!(block.to_world(DVec3::X).abs_diff_eq(DVec3::Y, 1e-12));
        assert!(block.to_local(DVec3::Y).abs_diff_eq(DVec3::X, 1e-12));
    }
}
