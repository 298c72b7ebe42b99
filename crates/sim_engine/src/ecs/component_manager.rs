//! Component factory registry and prototype store
//!
//! Two independent maps: component type → factory, and prototype name →
//! template instance. Prototype-based creation never hands out the template
//! itself; it builds a fresh instance through the factory registered for the
//! template's runtime type and copies the template's state onto it.

use std::any::TypeId;
use std::collections::HashMap;

use crate::ecs::component::{Component, ComponentError, ComponentHandle};

struct FactoryEntry {
    type_name: &'static str,
    build: Box<dyn Fn() -> ComponentHandle>,
}

/// Type-keyed factory registry plus named prototype store
#[derive(Default)]
pub struct ComponentManager {
    factories: HashMap<TypeId, FactoryEntry>,
    prototypes: HashMap<String, ComponentHandle>,
}

impl ComponentManager {
    /// Create an empty manager
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for component type `T`.
    ///
    /// Re-registering a type replaces the previous factory.
    pub fn register_factory<T, F>(&mut self, build: F)
    where
        T: Component,
        F: Fn() -> T + 'static,
    {
        let type_name = std::any::type_name::<T>();
        let entry = FactoryEntry {
            type_name,
            build: Box::new(move || ComponentHandle::new(build())),
        };
        if self.factories.insert(TypeId::of::<T>(), entry).is_some() {
            log::warn!("replacing component factory for `{type_name}`");
        }
    }

    /// Whether a factory is registered for component type `T`.
    #[must_use]
    pub fn has_factory<T: Component>(&self) -> bool {
        self.factories.contains_key(&TypeId::of::<T>())
    }

    /// Build a fresh component of type `T` through its registered factory.
    pub fn create<T: Component>(&self) -> Result<ComponentHandle, ComponentError> {
        self.factories
            .get(&TypeId::of::<T>())
            .map(|entry| (entry.build)())
            .ok_or_else(|| ComponentError::MissingFactory(std::any::type_name::<T>()))
    }

    /// Register a named prototype.
    ///
    /// The prototype's runtime type must already have a factory, so that
    /// `create_from_prototype` can always build fresh instances from it.
    /// Re-registering a name replaces the previous template.
    pub fn register_prototype(
        &mut self,
        name: &str,
        prototype: ComponentHandle,
    ) -> Result<(), ComponentError> {
        if name.trim().is_empty() {
            return Err(ComponentError::BlankName);
        }
        if !self.factories.contains_key(&prototype.type_id()) {
            return Err(ComponentError::MissingFactory(prototype.type_name()));
        }
        if self.prototypes.insert(name.to_string(), prototype).is_some() {
            log::warn!("replacing prototype `{name}`");
        }
        Ok(())
    }

    /// Remove a prototype, returning its template if it was registered.
    pub fn unregister_prototype(&mut self, name: &str) -> Option<ComponentHandle> {
        self.prototypes.remove(name)
    }

    /// Whether a prototype is registered under `name`.
    #[must_use]
    pub fn has_prototype(&self, name: &str) -> bool {
        self.prototypes.contains_key(name)
    }

    /// Iterate the registered prototype names.
    pub fn prototype_names(&self) -> impl Iterator<Item = &str> {
        self.prototypes.keys().map(String::as_str)
    }

    /// Build a fresh component initialized from the named prototype.
    ///
    /// Fails if the name is unregistered or the prototype's runtime type has
    /// lost its factory since registration. The returned instance is always
    /// new; callers never receive the template.
    pub fn create_from_prototype(&self, name: &str) -> Result<ComponentHandle, ComponentError> {
        let prototype = self
            .prototypes
            .get(name)
            .ok_or_else(|| ComponentError::UnknownPrototype(name.to_string()))?;
        let entry = self
            .factories
            .get(&prototype.type_id())
            .ok_or_else(|| ComponentError::MissingFactory(prototype.type_name()))?;

        let fresh = (entry.build)();
        fresh.borrow_mut().clone_state_from(&*prototype.borrow())?;
        Ok(fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{HealthComponent, TransformComponent};
    use crate::foundation::math::Vec3;

    fn manager_with_health_factory() -> ComponentManager {
        let mut manager = ComponentManager::new();
        manager.register_factory(HealthComponent::default);
        manager
    }

    #[test]
    fn create_fails_without_a_factory() {
        let manager = ComponentManager::new();
        let result = manager.create::<HealthComponent>();
        assert!(matches!(result, Err(ComponentError::MissingFactory(_))));
    }

    #[test]
    fn prototype_registration_requires_a_factory_for_its_type() {
        let mut manager = manager_with_health_factory();

        let orphan = ComponentHandle::new(TransformComponent::default());
        let result = manager.register_prototype("spawn_point", orphan);
        assert!(matches!(result, Err(ComponentError::MissingFactory(_))));

        let template = ComponentHandle::new(HealthComponent::new(250.0));
        manager.register_prototype("boss_health", template).unwrap();
        assert!(manager.has_prototype("boss_health"));
        assert_eq!(manager.prototype_names().collect::<Vec<_>>(), vec!["boss_health"]);
    }

    #[test]
    fn prototype_names_must_not_be_blank() {
        let mut manager = manager_with_health_factory();
        let template = ComponentHandle::new(HealthComponent::new(1.0));
        let result = manager.register_prototype("   ", template);
        assert!(matches!(result, Err(ComponentError::BlankName)));
    }

    #[test]
    fn create_from_prototype_returns_a_fresh_instance_with_copied_state() {
        let mut manager = manager_with_health_factory();
        let template = ComponentHandle::new(HealthComponent::new(250.0));
        manager
            .register_prototype("boss_health", template.clone())
            .unwrap();

        let built = manager.create_from_prototype("boss_health").unwrap();
        assert_eq!(
            built.with::<HealthComponent, _>(HealthComponent::maximum),
            Some(250.0)
        );

        // Damaging the built instance must not touch the template.
        built.with_mut::<HealthComponent, _>(|h| h.apply_damage(100.0));
        assert_eq!(
            template.with::<HealthComponent, _>(HealthComponent::current),
            Some(250.0)
        );
    }

    #[test]
    fn create_from_prototype_fails_for_unknown_names() {
        let manager = manager_with_health_factory();
        let result = manager.create_from_prototype("ghost");
        assert!(matches!(result, Err(ComponentError::UnknownPrototype(_))));
    }

    #[test]
    fn transform_prototypes_copy_their_position() {
        let mut manager = ComponentManager::new();
        manager.register_factory(TransformComponent::default);
        manager
            .register_prototype(
                "spawn_point",
                ComponentHandle::new(TransformComponent::at(Vec3::new(4.0, 5.0, 6.0))),
            )
            .unwrap();

        let built = manager.create_from_prototype("spawn_point").unwrap();
        let position = built.with::<TransformComponent, _>(|t| t.position).unwrap();
        assert_eq!(position, Vec3::new(4.0, 5.0, 6.0));
    }
}
