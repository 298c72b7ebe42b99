//! Generational entity allocator
//!
//! Owns the canonical arena of entities and assigns packed (index, version)
//! identifiers. Freed indices are recycled through a LIFO stack with a
//! version bump; an index whose version counter saturates is permanently
//! retired. Destruction is two-phase: `destroy_entity` only clears the alive
//! flag and enqueues the entity, and the slot is not released until an
//! explicit reap pass runs.

use std::collections::{HashMap, VecDeque};

use thiserror::Error;

use crate::ecs::component::ComponentError;
use crate::ecs::component_manager::ComponentManager;
use crate::ecs::entity::{Entity, EntityId, MAX_ENTITY_COUNT, MAX_VERSION, VERSION_BITS};

/// Initial slot capacity of a freshly created manager.
pub const INITIAL_CAPACITY: usize = 128;

/// Geometric growth factor applied when the arena runs out of fresh slots.
pub const GROWTH_FACTOR: f32 = 1.2;

/// Total identifier space: every index times every version.
const MAX_ISSUED_IDS: u64 = (MAX_ENTITY_COUNT as u64) << VERSION_BITS;

/// Errors raised by entity allocation and configuration handling
#[derive(Error, Debug)]
pub enum EntityError {
    /// Every storage index is in service; no entity slot remains
    #[error("entity capacity exhausted: no storage index available")]
    CapacityExhausted,

    /// The global identifier budget has been spent
    #[error("entity identifier space exhausted")]
    IdsExhausted,

    /// The entity configuration name is not registered
    #[error("unknown entity configuration `{0}`")]
    UnknownConfiguration(String),

    /// A configuration must name at least one prototype
    #[error("entity configuration must name at least one prototype")]
    EmptyConfiguration,

    /// A blank or whitespace-only name was passed at a registration boundary
    #[error("name must not be blank")]
    BlankName,

    /// A requested capacity exceeds the entity limit
    #[error("capacity {requested} exceeds the entity limit {limit}")]
    InvalidCapacity {
        /// Capacity asked for
        requested: usize,
        /// Hard entity limit
        limit: usize,
    },

    /// A component or prototype operation failed
    #[error(transparent)]
    Component(#[from] ComponentError),
}

enum Slot {
    /// Never used, or reaped and awaiting reuse through the recycle stack.
    Vacant,
    /// Version counter saturated; the index is permanently out of service.
    Retired,
    /// Holds an entity: live, or destroyed and awaiting reap.
    Occupied(Entity),
}

/// The generational-index allocator owning the canonical entity arena
pub struct EntityManager {
    slots: Vec<Slot>,
    /// Freed identifiers, most recently freed on top.
    recycle: Vec<EntityId>,
    /// Destroyed entities awaiting the next reap pass, oldest first.
    reap_queue: VecDeque<EntityId>,
    next_index: u32,
    alive: usize,
    issued: u64,
    components: ComponentManager,
    configurations: HashMap<String, Vec<String>>,
}

impl Default for EntityManager {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityManager {
    /// Create a manager with the default initial capacity
    #[must_use]
    pub fn new() -> Self {
        let mut slots = Vec::new();
        slots.resize_with(INITIAL_CAPACITY, || Slot::Vacant);
        Self {
            slots,
            recycle: Vec::new(),
            reap_queue: VecDeque::new(),
            next_index: 0,
            alive: 0,
            issued: 0,
            components: ComponentManager::new(),
            configurations: HashMap::new(),
        }
    }

    /// The component factory registry and prototype store
    #[must_use]
    pub fn components(&self) -> &ComponentManager {
        &self.components
    }

    /// The component factory registry and prototype store, mutable
    pub fn components_mut(&mut self) -> &mut ComponentManager {
        &mut self.components
    }

    /// Allocate a fresh identifier and store a new empty entity under it.
    ///
    /// Recycled indices are preferred over never-used ones; the arena grows
    /// geometrically when a fresh index lands beyond the current capacity.
    pub fn create_entity(&mut self) -> Result<EntityId, EntityError> {
        let id = self.allocate_id()?;
        let index = id.index() as usize;
        if index >= self.slots.len() {
            self.grow_to_cover(index);
        }
        self.slots[index] = Slot::Occupied(Entity::new(id));
        self.alive += 1;
        self.issued += 1;
        Ok(id)
    }

    /// Create an entity and attach the components named by a configuration.
    ///
    /// The configuration is re-validated against the live prototype set
    /// before any allocation happens, so a failure never leaves a partially
    /// built entity behind.
    pub fn create_entity_from_config(&mut self, config: &str) -> Result<EntityId, EntityError> {
        let prototypes = self
            .configurations
            .get(config)
            .ok_or_else(|| EntityError::UnknownConfiguration(config.to_string()))?
            .clone();

        let mut built = Vec::with_capacity(prototypes.len());
        for prototype in &prototypes {
            built.push(self.components.create_from_prototype(prototype)?);
        }
        for (position, component) in built.iter().enumerate() {
            let duplicate = built[..position]
                .iter()
                .any(|other| other.type_id() == component.type_id());
            if duplicate {
                return Err(ComponentError::DuplicateComponent(component.type_name()).into());
            }
        }

        let id = self.create_entity()?;
        if let Some(Slot::Occupied(entity)) = self.slots.get_mut(id.index() as usize) {
            for component in built {
                entity.attach(component).map_err(EntityError::from)?;
            }
        }
        Ok(id)
    }

    /// Mark an entity destroyed and enqueue it for reaping.
    ///
    /// A no-op for stale, already-destroyed, or never-assigned identifiers.
    /// The entity stays retrievable and keeps counting toward the alive
    /// count until the next reap pass.
    pub fn destroy_entity(&mut self, id: EntityId) {
        let Some(Slot::Occupied(entity)) = self.slots.get_mut(id.index() as usize) else {
            return;
        };
        if entity.id() != id || !entity.is_alive() {
            return;
        }
        entity.kill();
        self.reap_queue.push_back(id);
    }

    /// Look up an entity by identifier.
    ///
    /// Returns `None` when the identifier's version no longer matches the
    /// slot's occupant or the slot has been retired, so stale handles never
    /// resolve to a newer entity.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        match self.slots.get(id.index() as usize)? {
            Slot::Occupied(entity) if entity.id() == id => Some(entity),
            _ => None,
        }
    }

    /// Look up an entity by identifier, mutable.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        match self.slots.get_mut(id.index() as usize)? {
            Slot::Occupied(entity) if entity.id() == id => Some(entity),
            _ => None,
        }
    }

    /// Iterate the entities that are still alive.
    pub fn alive_entities(&self) -> impl Iterator<Item = &Entity> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Occupied(entity) if entity.is_alive() => Some(entity),
            _ => None,
        })
    }

    /// Register a named entity configuration: an ordered list of prototype
    /// names to attach at creation time.
    ///
    /// Validated eagerly: the name must not be blank, the list must not be
    /// empty, and every prototype must currently be registered. The list is
    /// re-validated whenever an entity is created from it.
    pub fn register_configuration(
        &mut self,
        name: &str,
        prototypes: Vec<String>,
    ) -> Result<(), EntityError> {
        if name.trim().is_empty() {
            return Err(EntityError::BlankName);
        }
        if prototypes.is_empty() {
            return Err(EntityError::EmptyConfiguration);
        }
        for prototype in &prototypes {
            if !self.components.has_prototype(prototype) {
                return Err(ComponentError::UnknownPrototype(prototype.clone()).into());
            }
        }
        self.configurations.insert(name.to_string(), prototypes);
        Ok(())
    }

    /// Whether a configuration is registered under `name`.
    #[must_use]
    pub fn has_configuration(&self, name: &str) -> bool {
        self.configurations.contains_key(name)
    }

    /// Release every destroyed entity: detach its components, free its slot,
    /// and push its identifier onto the recycle stack.
    ///
    /// Privileged tuning interface, intended for infrastructure code driving
    /// the world (not gameplay logic). Entities are processed in destruction
    /// order. Returns the number of entities reaped.
    pub fn reap_destroyed(&mut self) -> usize {
        let mut reaped = 0;
        while let Some(id) = self.reap_queue.pop_front() {
            let index = id.index() as usize;
            let matches_queue_entry = matches!(
                self.slots.get(index),
                Some(Slot::Occupied(entity)) if entity.id() == id && !entity.is_alive()
            );
            if !matches_queue_entry {
                continue;
            }
            if let Slot::Occupied(mut entity) = std::mem::replace(&mut self.slots[index], Slot::Vacant)
            {
                entity.detach_all();
            }
            self.recycle.push(id);
            self.alive -= 1;
            reaped += 1;
        }
        if reaped > 0 {
            log::debug!("reaped {reaped} destroyed entities");
        }
        reaped
    }

    /// Grow the arena so it can hold at least `target` entities without
    /// further allocation.
    ///
    /// Privileged tuning interface. A target at or below the current
    /// capacity is a no-op.
    pub fn grow_capacity(&mut self, target: usize) -> Result<usize, EntityError> {
        if target > MAX_ENTITY_COUNT {
            return Err(EntityError::InvalidCapacity {
                requested: target,
                limit: MAX_ENTITY_COUNT,
            });
        }
        if target > self.slots.len() {
            self.slots.resize_with(target, || Slot::Vacant);
        }
        Ok(self.slots.len())
    }

    /// Shrink the arena toward `target` slots.
    ///
    /// Privileged tuning interface. Never truncates below the highest index
    /// still holding a live or pending-reap entity; the effective new
    /// capacity is returned. Recycled identifiers above the cut stay usable,
    /// their slots are recreated on demand.
    pub fn shrink_capacity(&mut self, target: usize) -> usize {
        let floor = self
            .slots
            .iter()
            .rposition(|slot| matches!(slot, Slot::Occupied(_)))
            .map_or(0, |index| index + 1);
        let effective = target.max(floor);
        if effective < self.slots.len() {
            self.slots.truncate(effective);
        }
        self.slots.len()
    }

    /// Current slot capacity of the arena
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of entities created and not yet reaped.
    ///
    /// Destroyed entities keep counting until the reap pass releases them.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.alive
    }

    /// Number of destroyed entities waiting for the next reap pass
    #[must_use]
    pub fn pending_reap_count(&self) -> usize {
        self.reap_queue.len()
    }

    /// Identifiers that can still be handed out before the global budget
    /// (every index times every version) is spent
    #[must_use]
    pub fn available_ids(&self) -> u64 {
        MAX_ISSUED_IDS - self.issued
    }

    fn allocate_id(&mut self) -> Result<EntityId, EntityError> {
        if self.issued >= MAX_ISSUED_IDS {
            return Err(EntityError::IdsExhausted);
        }
        while let Some(freed) = self.recycle.pop() {
            if freed.version() >= MAX_VERSION {
                // The slot may have been truncated by a shrink; a missing
                // slot already behaves like a retired one.
                if let Some(slot) = self.slots.get_mut(freed.index() as usize) {
                    *slot = Slot::Retired;
                }
                log::debug!(
                    "retiring entity index {} after {} reuses",
                    freed.index(),
                    MAX_VERSION
                );
                continue;
            }
            return Ok(EntityId::new(freed.index(), freed.version() + 1));
        }

        let index = self.next_index;
        if index as usize >= MAX_ENTITY_COUNT {
            return Err(EntityError::CapacityExhausted);
        }
        self.next_index += 1;
        Ok(EntityId::new(index, 0))
    }

    fn grow_to_cover(&mut self, index: usize) {
        let mut target = self.slots.len().max(1);
        while target <= index {
            let grown = (target as f32 * GROWTH_FACTOR) as usize;
            target = grown.max(target + 1);
        }
        let target = target.min(MAX_ENTITY_COUNT);
        log::debug!(
            "growing entity arena from {} to {} slots",
            self.slots.len(),
            target
        );
        self.slots.resize_with(target, || Slot::Vacant);
    }
}
