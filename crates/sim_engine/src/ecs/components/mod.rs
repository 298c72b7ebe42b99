//! Sample gameplay components
//!
//! These are payloads that exercise the registry, not core logic. New
//! component types follow the same shape: embed a [`ComponentCore`], forward
//! the accessor methods, and copy only externally-visible state in
//! `clone_state_from`.
//!
//! [`ComponentCore`]: crate::ecs::component::ComponentCore

mod health;
mod transform;

pub use health::HealthComponent;
pub use transform::TransformComponent;
