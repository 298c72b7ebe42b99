//! Health component
//!
//! Hit point pool. Because component instances are shared, a single pool can
//! be attached to several entities at once to model linked health.

use std::any::Any;

use crate::ecs::component::{Component, ComponentCore, ComponentError};

/// Hit point pool, optionally shared between entities
#[derive(Debug, Default)]
pub struct HealthComponent {
    core: ComponentCore,
    current: f32,
    maximum: f32,
}

impl HealthComponent {
    /// Create a full pool with the given maximum
    #[must_use]
    pub fn new(maximum: f32) -> Self {
        Self {
            core: ComponentCore::default(),
            current: maximum,
            maximum,
        }
    }

    /// Current hit points
    #[must_use]
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Maximum hit points
    #[must_use]
    pub fn maximum(&self) -> f32 {
        self.maximum
    }

    /// Remove hit points, clamping at zero
    pub fn apply_damage(&mut self, amount: f32) {
        self.current = (self.current - amount).max(0.0);
    }

    /// Restore hit points, clamping at the maximum
    pub fn heal(&mut self, amount: f32) {
        self.current = (self.current + amount).min(self.maximum);
    }

    /// Whether the pool is empty
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.current <= 0.0
    }
}

impl Component for HealthComponent {
    fn type_name(&self) -> &'static str {
        "HealthComponent"
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
                expected: "HealthComponent",
                actual: source.type_name(),
            })?;
        self.current = source.current;
        self.maximum = source.maximum;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_and_heal_clamp_to_the_pool_bounds() {
        let mut health = HealthComponent::new(100.0);
        health.apply_damage(150.0);
        assert!(health.is_depleted());
        assert_eq!(health.current(), 0.0);

        health.heal(500.0);
        assert_eq!(health.current(), 100.0);
    }
}
