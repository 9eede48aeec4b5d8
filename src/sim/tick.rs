//! Fixed timestep simulation tick
//!
//! One tick spins blocks, moves bodies (sliding along their contact or flying
//! freely), then runs the broad phase and narrow phase for every body and
//! reports contact changes. Bodies and blocks are visited in id order, so two
//! worlds fed the same calls stay identical.

use super::collider::{OverlapQuery, candidate_arcs, swept_query};
use super::collision::BlockCollision;
use super::state::{Block, CollisionEvent, Rigidbody, World};
use crate::config::PhysicsConfig;

/// Advance the world by one fixed timestep, querying the world's own colliders.
pub fn tick(world: &mut World, dt: f64) -> Vec<CollisionEvent> {
    tick_with(world, None, dt)
}

/// Advance the world by one fixed timestep.
///
/// `query` stands in for the world's collider registry in the broad phase;
/// the handles it returns are still resolved through the registry. Exits are
/// returned before enters.
pub fn tick_with(world: &mut World, query: Option<&dyn OverlapQuery>, dt: f64) -> Vec<CollisionEvent> {
    let World {
        config,
        blocks,
        bodies,
        registry,
        pending,
        time_ticks,
        ..
    } = world;

    let mut exits = std::mem::take(pending);
    let mut enters = Vec::new();

    for block in blocks.values_mut() {
        if block.rotate(dt) {
            registry.update_rotation(block.id, block.rotation);
        }
    }

    let registry = &*registry;
    let query = query.unwrap_or(registry);

    for body in bodies.values_mut() {
        // === Integrate ===
        let current = body.observer.contact().map(|contact| contact.block);
        match current {
            Some(id) => match blocks.get(&id) {
                Some(block) => {
                    if !slide(body, block, config, dt) {
                        log::debug!("body {:?} lifted off block {:?}", body.id, id);
                        exits.push(CollisionEvent::Exit { body: body.id, block: id });
                    }
                }
                None => {
                    log::warn!("body {:?} was resting on missing block {id:?}", body.id);
                    body.observer.exit();
                    exits.push(CollisionEvent::Exit { body: body.id, block: id });
                }
            },
            None => body.integrate_airborne(config.gravity, dt),
        }

        // === Broad phase ===
        let current = body.observer.contact().map(|contact| contact.block);
        let (center, radius) = swept_query(body.previous_position, body.position, body.radius);
        let handles = query.overlap_sphere(center, radius, config.layer_mask);
        let candidates = candidate_arcs(registry, &handles);

        // === Narrow phase ===
        let moving = &*body;
        let nearest = candidates
            .into_iter()
            .filter(|&(id, _)| Some(id) != current)
            .filter_map(|(id, arc)| {
                let Some(block) = blocks.get(&id) else {
                    log::warn!("collider of block {id:?} outlived the block");
                    return None;
                };
                let collision = BlockCollision::block_collision(moving, block, arc);
                if collision.is_none() {
                    log::debug!("body {:?} near miss on block {id:?} arc {arc}", moving.id);
                }
                collision
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance));

        let Some(collision) = nearest else {
            continue;
        };
        if let Some(previous) = current {
            if let Some(block) = blocks.get(&previous) {
                body.leave(block.rotation);
            }
            exits.push(CollisionEvent::Exit { body: body.id, block: previous });
        }
        let Some(block) = blocks.get(&collision.block) else {
            continue;
        };
        enters.push(enter(body, block, collision));
    }

    *time_ticks += 1;
    exits.extend(enters);
    exits
}

/// One grounded step. Returns false if the body lifted off instead.
fn slide(body: &mut Rigidbody, block: &Block, config: &PhysicsConfig, dt: f64) -> bool {
    body.previous_position = body.position;
    if body.observer.vertical_velocity > config.lift_off_speed {
        body.leave(block.rotation);
        return false;
    }

    let Some(contact) = body.observer.contact() else {
        return false;
    };
    let gravity = block.to_local(config.gravity);
    let along = gravity.dot(contact.visitor.bearing());
    let away = gravity.dot(contact.visitor.normal()) - contact.material.magnetism;
    let braking = contact.material.friction * (-away).max(0.0) * dt;

    let observer = &mut body.observer;
    let mut horizontal = observer.horizontal_velocity + along * dt;
    horizontal = if horizontal.abs() <= braking {
        0.0
    } else {
        horizontal - braking * horizontal.signum()
    };
    observer.horizontal_velocity = horizontal;
    observer.vertical_velocity = (observer.vertical_velocity + away * dt).max(0.0);

    let Some(contact) = observer.contact_mut() else {
        return false;
    };
    contact.visitor.move_position(horizontal * dt);
    body.position = block.to_world(contact.visitor.position());
    true
}

/// Attach `body` to the contact, carry the overshoot along the surface and
/// snap it onto the boundary.
fn enter(body: &mut Rigidbody, block: &Block, mut collision: BlockCollision) -> CollisionEvent {
    let velocity = block.to_local(body.velocity);
    let speed = velocity.length();
    if speed > 0.0 {
        let along = velocity.dot(collision.visitor.bearing());
        collision.visitor.move_position(collision.overshoot * along / speed);
    }
    let event = CollisionEvent::Enter {
        body: body.id,
        block: collision.block,
        arc: collision.arc,
    };
    log::debug!("body {:?} entered block {:?} at arc {}", body.id, collision.block, collision.arc);

    body.position = block.to_world(collision.visitor.position());
    body.observer.enter(collision, velocity);
    event
}

impl World {
    /// Run as many fixed steps as `frame_dt` covers, at most `max_substeps`.
    /// Remaining time carries over to the next call; time beyond the cap is
    /// dropped.
    pub fn step(&mut self, frame_dt: f64) -> Vec<CollisionEvent> {
        let dt = self.config.timestep;
        let mut events = Vec::new();
        if dt <= 0.0 || !dt.is_finite() {
            log::warn!("refusing to step with timestep {dt}");
            return events;
        }

        self.accumulator += frame_dt.max(0.0);
        let mut substeps = 0;
        while self.accumulator >= dt && substeps < self.config.max_substeps {
            events.extend(tick(self, dt));
            self.accumulator -= dt;
            substeps += 1;
        }
        if self.accumulator >= dt {
            log::debug!("dropping {:.3}s of simulation time", self.accumulator - self.accumulator % dt);
            self.accumulator %= dt;
        }
        events
    }
}
