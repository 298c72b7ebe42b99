//! Sandbox demo application
//!
//! External tick driver for the simulation core: registers component
//! factories, prototypes, and entity configurations, builds an arena level
//! with a couple of world systems, then runs a bounded tick loop. Run with
//! `RUST_LOG=debug` to watch the world transitions.

use sim_engine::foundation::logging;
use sim_engine::prelude::*;

/// Pushes every entity along +x each tick, clamped by the level boundary.
struct DriftSystem {
    speed: f32,
}

impl WorldSystem for DriftSystem {
    fn name(&self) -> &str {
        "drift"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn start(&mut self) {
        log::info!("drift system started");
    }

    fn stop(&mut self) {
        log::info!("drift system stopped");
    }

    fn update(&mut self, director: &mut LevelDirector<'_>, delta_time: f32) {
        // The sandbox ticks as fast as it can, so give the drift a floor.
        let step = self.speed * delta_time.max(1.0 / 60.0);
        let targets: Vec<(EntityId, Vec3)> = director
            .entities()
            .alive_entities()
            .filter_map(|entity| {
                let position = entity
                    .component::<TransformComponent>()?
                    .with::<TransformComponent, _>(|t| t.position)?;
                Some((entity.id(), position))
            })
            .collect();
        for (id, position) in targets {
            if let Err(error) =
                director.move_entity(id, position.x + step, position.y, position.z)
            {
                log::warn!("drift failed for entity {id}: {error}");
            }
        }
    }

    fn on_pause(&mut self) {
        log::info!("drift system paused");
    }

    fn on_resume(&mut self) {
        log::info!("drift system resumed");
    }
}

/// Drains every health pool and despawns depleted entities.
struct AttritionSystem {
    damage_per_tick: f32,
}

impl WorldSystem for AttritionSystem {
    fn name(&self) -> &str {
        "attrition"
    }

    fn priority(&self) -> i32 {
        20
    }

    fn update(&mut self, director: &mut LevelDirector<'_>, _delta_time: f32) {
        let expired: Vec<EntityId> = director
            .entities()
            .alive_entities()
            .filter_map(|entity| {
                let health = entity.component::<HealthComponent>()?;
                health.with_mut::<HealthComponent, _>(|h| {
                    h.apply_damage(self.damage_per_tick);
                });
                let depleted = health.with::<HealthComponent, _>(HealthComponent::is_depleted)?;
                depleted.then(|| entity.id())
            })
            .collect();
        for id in expired {
            log::info!("entity {id} expired");
            director.despawn(id);
        }
    }
}

/// Populates the arena when it loads.
struct ArenaBehavior {
    grunt_count: u32,
}

impl LevelBehavior for ArenaBehavior {
    fn on_load(&mut self, director: &mut LevelDirector<'_>) {
        for i in 0..self.grunt_count {
            // Deliberately overshoot the boundary for some spawns; the
            // director clamps them onto the arena edge.
            let x = i as f32 * 40.0 - 60.0;
            match director.spawn("grunt", x, 0.0, 0.0) {
                Ok(id) => log::info!("spawned grunt {id} near x = {x}"),
                Err(error) => log::error!("failed to spawn grunt: {error}"),
            }
        }
    }
}

fn register_world_data(manager: &mut LevelManager) -> Result<(), Box<dyn std::error::Error>> {
    let components = manager.entities_mut().components_mut();
    components.register_factory(TransformComponent::default);
    components.register_factory(HealthComponent::default);
    components.register_prototype(
        "grunt_transform",
        ComponentHandle::new(TransformComponent::default()),
    )?;
    components.register_prototype(
        "grunt_health",
        ComponentHandle::new(HealthComponent::new(30.0)),
    )?;

    let mut configs = EntityConfigSet::default();
    configs.configurations.insert(
        "grunt".to_string(),
        vec!["grunt_transform".to_string(), "grunt_health".to_string()],
    );
    configs.apply(manager.entities_mut())?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    log::info!("sandbox starting");

    let mut manager = LevelManager::new();
    register_world_data(&mut manager)?;

    let mut arena = Level::new("arena", 100.0, 100.0, 10.0)?
        .with_behavior(Box::new(ArenaBehavior { grunt_count: 4 }));
    arena.add_system(Box::new(DriftSystem { speed: 4.0 }))?;
    arena.add_system(Box::new(AttritionSystem {
        damage_per_tick: 1.0,
    }))?;
    manager.register_level(arena)?;

    manager.load_level("arena")?;
    for frame in 0..60_u32 {
        manager.tick();

        if let Some(arena) = manager.level_mut("arena") {
            match frame {
                20 => arena.pause_system("drift")?,
                40 => arena.resume_system("drift")?,
                _ => {}
            }
        }

        // Reaping destroyed entities is infrastructure work, so the driver
        // does it between frames rather than any gameplay system.
        let reaped = manager.entities_mut().reap_destroyed();
        if reaped > 0 {
            log::info!(
                "frame {frame}: reaped {reaped}, {} entities alive",
                manager.entities().alive_count()
            );
        }
    }

    manager.unload_level("arena")?;
    manager.tick();

    log::info!(
        "sandbox done: {} entities alive, {} slots, {} ids left",
        manager.entities().alive_count(),
        manager.entities().capacity(),
        manager.entities().available_ids()
    );
    Ok(())
}
