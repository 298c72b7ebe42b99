//! Transform component
//!
//! Pure data component holding an entity's placement in world space. This is
//! the component the level director writes when an entity is spawned or
//! moved.

use std::any::Any;

use crate::ecs::component::{Component, ComponentCore, ComponentError};
use crate::foundation::math::Vec3;

/// Spatial placement of an entity
#[derive(Debug)]
pub struct TransformComponent {
    core: ComponentCore,

    /// World space position
    pub position: Vec3,
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self::at(Vec3::zeros())
    }
}

impl TransformComponent {
    /// Create a transform at the given position
    #[must_use]
    pub fn at(position: Vec3) -> Self {
        Self {
            core: ComponentCore::default(),
            position,
        }
    }
}

impl Component for TransformComponent {
    fn type_name(&self) -> &'static str {
        "TransformComponent"
    }

    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn clone_state_from(&mut self, source: &dyn Component) -> Result<(), ComponentError> {
        let source = source
            .as_any()
            .downcast_ref::<Self>()
            .ok_or(ComponentError::TypeMismatch {
                expected: "TransformComponent",
                actual: source.type_name(),
            })?;
        self.position = source.position;
        Ok(())
    }
}
