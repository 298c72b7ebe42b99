//! # Sim Engine
//!
//! The object/simulation core of a small game engine: a generational
//! entity-component registry plus a level/system scheduler that drives
//! per-tick simulation over a bounded world.
//!
//! ## Features
//!
//! - **Generational entities**: packed (index, version) identifiers over a
//!   contiguous arena; stale handles never resolve to a newer entity
//! - **Shared components**: reference-counted instances with attach/detach
//!   hooks, built from type factories or named prototypes
//! - **Two-phase destruction**: destroying only marks; an explicit reap pass
//!   releases slots, so update passes never observe mid-tick removal
//! - **Levels**: bounded regions owning priority-ordered, pausable systems
//! - **Deferred transitions**: level load/unload resolve at tick boundaries
//!
//! ## Quick Start
//!
//! ```rust
//! use sim_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut manager = LevelManager::new();
//!
//!     // Register component factories and a prototype, then a configuration
//!     // naming that prototype.
//!     let components = manager.entities_mut().components_mut();
//!     components.register_factory(TransformComponent::default);
//!     components.register_prototype(
//!         "spawn_point",
//!         ComponentHandle::new(TransformComponent::default()),
//!     )?;
//!     manager
//!         .entities_mut()
//!         .register_configuration("marker", vec!["spawn_point".into()])?;
//!
//!     // Levels load at the next tick boundary, not inline.
//!     manager.register_level(Level::new("arena", 100.0, 100.0, 10.0)?)?;
//!     manager.load_level("arena")?;
//!     manager.tick();
//!     assert_eq!(manager.active_level(), Some("arena"));
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod ecs;
pub mod foundation;
pub mod level;

/// Common imports for engine users
pub mod prelude {
    pub use crate::config::{ConfigFile, EntityConfigSet};
    pub use crate::ecs::components::{HealthComponent, TransformComponent};
    pub use crate::ecs::{
        Component, ComponentError, ComponentHandle, ComponentManager, Entity, EntityError,
        EntityId, EntityManager,
    };
    pub use crate::foundation::math::{Aabb, Vec3};
    pub use crate::level::{
        Level, LevelBehavior, LevelDirector, LevelError, LevelManager, LevelManagerError,
        SystemState, WorldSystem,
    };
}
