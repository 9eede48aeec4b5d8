//! Planetaria demo runner
//!
//! Drops a handful of bodies onto a level and logs every contact change.
//!
//! Usage: `planetaria [level.json] [physics.json]`. Without a level, a square
//! block is placed around the south pole.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Planetaria (native) starting...");

    let mut args = std::env::args().skip(1);
    let level_path = args.next();
    let config_path = args.next();

    if let Err(e) = demo::run(level_path.as_deref(), config_path.as_deref()) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is the wasm surface; there is no demo in the browser.
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use glam::{DQuat, DVec3};
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use planetaria::consts::SIM_DT;
    use planetaria::geometry::Shape;
    use planetaria::level::LevelData;
    use planetaria::sim::{CollisionEvent, PhysicsMaterial, World};
    use planetaria::{PhysicsConfig, PlanetariaError};

    const SEED: u64 = 12345;
    const BODIES: usize = 6;
    const SECONDS: f64 = 10.0;

    fn default_level(config: PhysicsConfig) -> Result<World, PlanetariaError> {
        let a = 0.3;
        let square = Shape::polygon(&[
            DVec3::new(a, 1.0, a),
            DVec3::new(-a, 1.0, a),
            DVec3::new(-a, 1.0, -a),
            DVec3::new(a, 1.0, -a),
        ])?;
        let mut world = World::new(config);
        world.spawn_block(square, DQuat::from_rotation_x(std::f64::consts::PI), PhysicsMaterial::default());
        Ok(world)
    }

    pub fn run(level_path: Option<&str>, config_path: Option<&str>) -> Result<(), PlanetariaError> {
        let config = match config_path {
            Some(path) => PhysicsConfig::load(path)?,
            None => PhysicsConfig::default(),
        };
        let mut world = match level_path {
            Some(path) => LevelData::load(path)?.build(config)?,
            None => default_level(config)?,
        };
        log::info!("World has {} blocks", world.blocks().count());

        let mut rng = Pcg32::seed_from_u64(SEED);
        for _ in 0..BODIES {
            let position = DVec3::new(rng.random_range(-0.8..0.8), -1.0, rng.random_range(-0.8..0.8));
            let material = PhysicsMaterial {
                elasticity: rng.random_range(0.0..0.9),
                ..Default::default()
            };
            let id = world.spawn_body(position, DVec3::ZERO, rng.random_range(0.01..0.04), material);
            log::debug!("spawned body {id:?} at {position:?}");
        }
        log::info!("Simulating {} bodies for {SECONDS}s (seed {SEED})", BODIES);

        let frames = (SECONDS / SIM_DT).round() as usize;
        let (mut enters, mut exits) = (0, 0);
        for _ in 0..frames {
            for event in world.step(SIM_DT) {
                match event {
                    CollisionEvent::Enter { body, block, arc } => {
                        enters += 1;
                        log::info!("t={:.2}s {body:?} landed on {block:?} (arc {arc})", world.time_ticks as f64 * SIM_DT);
                    }
                    CollisionEvent::Exit { body, block } => {
                        exits += 1;
                        log::info!("t={:.2}s {body:?} left {block:?}", world.time_ticks as f64 * SIM_DT);
                    }
                }
            }
        }

        let grounded = world.bodies().filter(|body| body.grounded()).count();
        log::info!("Done: {enters} enters, {exits} exits, {grounded}/{BODIES} bodies resting");
        Ok(())
    }
}
