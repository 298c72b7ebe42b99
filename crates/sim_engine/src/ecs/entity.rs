//! Entity identifiers and the entity record
//!
//! Identifiers are packed (index, version) pairs. The index addresses the
//! storage arena; the version counts how many times that slot has been
//! reissued, which is what makes stale handles detectable: a handle only
//! resolves while the slot still carries the same version.

use std::any::TypeId;
use std::fmt;

use crate::ecs::component::{ComponentError, ComponentHandle};

/// Number of bits addressing the entity storage arena.
pub const INDEX_BITS: u32 = 20;

/// Number of bits counting reuses of a storage index.
pub const VERSION_BITS: u32 = 12;

/// Maximum number of entities addressable at once.
pub const MAX_ENTITY_COUNT: usize = 1 << INDEX_BITS;

/// Highest version an index can reach before it is permanently retired.
pub const MAX_VERSION: u32 = (1 << VERSION_BITS) - 1;

const INDEX_MASK: u32 = (1 << INDEX_BITS) - 1;

/// Packed entity identifier.
///
/// The low 20 bits address the storage arena and the high 12 bits carry the
/// slot's reuse count. Two identifiers are equal only if both fields match.
/// Identifiers are plain integers: cheap to copy, hash, and store without
/// aliasing hazards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(u32);

impl EntityId {
    /// Pack an identifier from its index and version fields.
    #[must_use]
    pub fn new(index: u32, version: u32) -> Self {
        debug_assert!(index <= INDEX_MASK, "entity index out of range");
        debug_assert!(version <= MAX_VERSION, "entity version out of range");
        Self((version << INDEX_BITS) | (index & INDEX_MASK))
    }

    /// Slot position in the entity storage arena.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 & INDEX_MASK
    }

    /// Reuse counter for the slot this identifier addresses.
    #[must_use]
    pub const fn version(self) -> u32 {
        self.0 >> INDEX_BITS
    }

    /// Raw packed value, suitable for compact storage or serialization.
    #[must_use]
    pub const fn to_bits(self) -> u32 {
        self.0
    }

    /// Reconstruct an identifier from its raw packed value.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index(), self.version())
    }
}

/// An identity plus its attached components.
///
/// Entities are created by the allocator and mutated through attach/detach
/// calls. Destruction only clears the alive flag; physical removal happens
/// later in an explicit reap pass, so iteration over live entities is never
/// invalidated mid-tick.
pub struct Entity {
    id: EntityId,
    alive: bool,
    components: Vec<(TypeId, ComponentHandle)>,
}

impl Entity {
    pub(crate) fn new(id: EntityId) -> Self {
        Self {
            id,
            alive: true,
            components: Vec::new(),
        }
    }

    /// The identifier this entity was created with.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Whether the entity is still alive.
    ///
    /// A destroyed entity keeps its slot (and remains retrievable) until the
    /// next reap pass; only this flag flips immediately.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub(crate) fn kill(&mut self) {
        self.alive = false;
    }

    /// Attach a component instance to this entity.
    ///
    /// At most one component per concrete type may be attached. The
    /// component's use count is incremented and its attach hook runs.
    pub fn attach(&mut self, component: ComponentHandle) -> Result<(), ComponentError> {
        let key = component.type_id();
        if self.components.iter().any(|(id, _)| *id == key) {
            return Err(ComponentError::DuplicateComponent(component.type_name()));
        }
        component.attach();
        self.components.push((key, component));
        Ok(())
    }

    /// Detach the component of the given type, if present.
    ///
    /// The component's use count is decremented and its detach hook runs.
    /// Returns the detached handle so shared instances can be re-attached
    /// elsewhere.
    pub fn detach<T: 'static>(&mut self) -> Option<ComponentHandle> {
        let key = TypeId::of::<T>();
        let position = self.components.iter().position(|(id, _)| *id == key)?;
        let (_, handle) = self.components.remove(position);
        handle.detach();
        Some(handle)
    }

    /// Look up the component of the given type.
    #[must_use]
    pub fn component<T: 'static>(&self) -> Option<ComponentHandle> {
        let key = TypeId::of::<T>();
        self.components
            .iter()
            .find(|(id, _)| *id == key)
            .map(|(_, handle)| handle.clone())
    }

    /// Whether a component of the given type is attached.
    #[must_use]
    pub fn has_component<T: 'static>(&self) -> bool {
        let key = TypeId::of::<T>();
        self.components.iter().any(|(id, _)| *id == key)
    }

    /// Iterate the attached components in insertion order.
    pub fn components(&self) -> impl Iterator<Item = &ComponentHandle> {
        self.components.iter().map(|(_, handle)| handle)
    }

    /// Number of attached components.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Detach everything, running each component's detach hook.
    pub(crate) fn detach_all(&mut self) {
        for (_, handle) in self.components.drain(..) {
            handle.detach();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::TransformComponent;

    #[test]
    fn identifier_packing_round_trips() {
        let id = EntityId::new(123_456, 4_095);
        assert_eq!(id.index(), 123_456);
        assert_eq!(id.version(), 4_095);
        assert_eq!(EntityId::from_bits(id.to_bits()), id);
    }

    #[test]
    fn identifiers_with_different_versions_are_not_equal() {
        let a = EntityId::new(7, 0);
        let b = EntityId::new(7, 1);
        assert_ne!(a, b);
        assert_eq!(a.index(), b.index());
    }

    #[test]
    fn attach_rejects_a_second_component_of_the_same_type() {
        let mut entity = Entity::new(EntityId::new(0, 0));
        entity
            .attach(ComponentHandle::new(TransformComponent::default()))
            .unwrap();

        let result = entity.attach(ComponentHandle::new(TransformComponent::default()));
        assert!(matches!(result, Err(ComponentError::DuplicateComponent(_))));
        assert_eq!(entity.component_count(), 1);
    }

    #[test]
    fn detach_returns_the_handle_and_clears_the_slot() {
        let mut entity = Entity::new(EntityId::new(0, 0));
        entity
            .attach(ComponentHandle::new(TransformComponent::default()))
            .unwrap();
        assert!(entity.has_component::<TransformComponent>());

        let handle = entity.detach::<TransformComponent>().unwrap();
        assert!(!handle.borrow().is_attached());
        assert!(!entity.has_component::<TransformComponent>());
        assert!(entity.detach::<TransformComponent>().is_none());
        assert_eq!(entity.components().count(), 0);
    }
}
