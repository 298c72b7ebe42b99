//! Component trait and shared component handles
//!
//! Components are typed, attachable units of behavior and data. A single
//! component instance may be attached to several entities at once (for
//! example a health pool shared by a squad), so instances are reference
//! counted: attach increments the use count and detach decrements it, each
//! running a lifecycle hook.

use std::any::{Any, TypeId};
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use thiserror::Error;

/// Errors raised by component and prototype operations
#[derive(Error, Debug)]
pub enum ComponentError {
    /// No factory is registered for the requested component type
    #[error("no factory registered for component type `{0}`")]
    MissingFactory(&'static str),

    /// The prototype name is not registered
    #[error("unknown prototype `{0}`")]
    UnknownPrototype(String),

    /// Prototype state was copied across different concrete types
    #[error("component type mismatch: expected `{expected}`, got `{actual}`")]
    TypeMismatch {
        /// Concrete type of the destination component
        expected: &'static str,
        /// Concrete type of the source component
        actual: &'static str,
    },

    /// A blank or whitespace-only name was passed at a registration boundary
    #[error("name must not be blank")]
    BlankName,

    /// The entity already owns a component of this concrete type
    #[error("entity already has a component of type `{0}`")]
    DuplicateComponent(&'static str),
}

/// Bookkeeping embedded by every component implementation.
///
/// Tracks how many entities currently own the component. Implementors hold
/// one of these and hand it back through [`Component::core`].
#[derive(Debug, Default)]
pub struct ComponentCore {
    use_count: u32,
}

impl ComponentCore {
    /// Number of entities the component is currently attached to.
    #[must_use]
    pub fn use_count(&self) -> u32 {
        self.use_count
    }
}

/// A typed, attachable behavior/data unit.
///
/// Implementors embed a [`ComponentCore`] for use counting and expose their
/// concrete type through the `as_any` accessors so callers can downcast
/// through a [`ComponentHandle`].
pub trait Component: Any {
    /// Short human-readable type name used in diagnostics.
    fn type_name(&self) -> &'static str;

    /// Shared bookkeeping state.
    fn core(&self) -> &ComponentCore;

    /// Shared bookkeeping state, mutable.
    fn core_mut(&mut self) -> &mut ComponentCore;

    /// Upcast for downcasting to the concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Upcast for downcasting to the concrete type, mutable.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Copy the externally-visible state of `source` into `self`.
    ///
    /// Used by prototype-based creation: a fresh factory-built instance takes
    /// on the template's state without ever sharing the template itself. Must
    /// reject a source of a different concrete type, and must not copy the
    /// use count.
    fn clone_state_from(&mut self, source: &dyn Component) -> Result<(), ComponentError>;

    /// Hook invoked after the component is attached to an entity.
    fn on_attached(&mut self) {}

    /// Hook invoked after the component is detached from an entity.
    fn on_detached(&mut self) {}

    /// Record attachment to one more entity and run the attach hook.
    fn attach(&mut self) {
        self.core_mut().use_count += 1;
        self.on_attached();
    }

    /// Record detachment from one entity and run the detach hook.
    ///
    /// # Panics
    ///
    /// Panics if the component is not attached to anything: detaching below
    /// zero is a programming error, not a recoverable condition.
    fn detach(&mut self) {
        let core = self.core_mut();
        assert!(
            core.use_count > 0,
            "component detached more times than it was attached"
        );
        core.use_count -= 1;
        self.on_detached();
    }

    /// Number of entities the component is currently attached to.
    fn use_count(&self) -> u32 {
        self.core().use_count()
    }

    /// Whether the component is attached to at least one entity.
    fn is_attached(&self) -> bool {
        self.use_count() > 0
    }
}

/// Shared handle to a component instance.
///
/// Components live behind shared ownership so one instance can be attached
/// to several entities; the instance is dropped when the last handle goes
/// away. The handle's lifetime is independent of the attach count, which
/// only tracks owning entities.
pub struct ComponentHandle(Rc<RefCell<dyn Component>>);

impl Clone for ComponentHandle {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl ComponentHandle {
    /// Wrap a component instance in a shared handle.
    #[must_use]
    pub fn new<T: Component>(component: T) -> Self {
        Self(Rc::new(RefCell::new(component)))
    }

    /// `TypeId` of the wrapped concrete type.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.0.borrow().as_any().type_id()
    }

    /// Diagnostic name of the wrapped concrete type.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.0.borrow().type_name()
    }

    /// Whether the wrapped component is of concrete type `T`.
    #[must_use]
    pub fn is<T: Component>(&self) -> bool {
        self.type_id() == TypeId::of::<T>()
    }

    /// Borrow the component as its trait object.
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, dyn Component> {
        self.0.borrow()
    }

    /// Mutably borrow the component as its trait object.
    #[must_use]
    pub fn borrow_mut(&self) -> RefMut<'_, dyn Component> {
        self.0.borrow_mut()
    }

    /// Run a closure against the component downcast to `T`.
    ///
    /// Returns `None` if the wrapped component is not a `T`.
    pub fn with<T: Component, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let guard = self.0.borrow();
        guard.as_any().downcast_ref::<T>().map(f)
    }

    /// Run a closure against the component downcast to `T`, mutably.
    ///
    /// Returns `None` if the wrapped component is not a `T`.
    pub fn with_mut<T: Component, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut guard = self.0.borrow_mut();
        guard.as_any_mut().downcast_mut::<T>().map(f)
    }

    pub(crate) fn attach(&self) {
        self.0.borrow_mut().attach();
    }

    pub(crate) fn detach(&self) {
        self.0.borrow_mut().detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::HealthComponent;

    #[test]
    fn use_count_follows_attach_and_detach() {
        let handle = ComponentHandle::new(HealthComponent::new(100.0));
        assert_eq!(handle.borrow().use_count(), 0);
        assert!(!handle.borrow().is_attached());

        handle.attach();
        handle.attach();
        assert_eq!(handle.borrow().use_count(), 2);
        assert!(handle.borrow().is_attached());

        handle.detach();
        handle.detach();
        assert_eq!(handle.borrow().use_count(), 0);
        assert!(!handle.borrow().is_attached());
    }

    #[test]
    #[should_panic(expected = "detached more times")]
    fn detaching_an_unattached_component_panics() {
        let handle = ComponentHandle::new(HealthComponent::new(10.0));
        handle.detach();
    }

    #[test]
    fn downcast_access_sees_the_concrete_type() {
        let handle = ComponentHandle::new(HealthComponent::new(50.0));
        assert!(handle.is::<HealthComponent>());

        handle.with_mut::<HealthComponent, _>(|health| health.apply_damage(20.0));
        let remaining = handle.with::<HealthComponent, _>(HealthComponent::current);
        assert_eq!(remaining, Some(30.0));
    }

    #[test]
    fn clone_state_rejects_a_different_concrete_type() {
        use crate::ecs::components::TransformComponent;

        let mut health = HealthComponent::new(10.0);
        let transform = TransformComponent::default();
        let result = health.clone_state_from(&transform);
        assert!(matches!(result, Err(ComponentError::TypeMismatch { .. })));
    }
}
