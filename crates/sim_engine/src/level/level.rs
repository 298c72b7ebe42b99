//! Level: a bounded spatial region owning world systems

use thiserror::Error;

use crate::ecs::entity::EntityId;
use crate::ecs::entity_manager::{EntityError, EntityManager};
use crate::foundation::math::{Aabb, Vec3};
use crate::level::director::LevelDirector;
use crate::level::scheduler::SystemDomain;
use crate::level::system::{SystemState, WorldSystem};

/// Maximum extent of a level along any axis.
pub const MAX_LEVEL_DIMENSION: f32 = 10_000.0;

/// Errors raised by level operations
#[derive(Error, Debug)]
pub enum LevelError {
    /// A blank or whitespace-only name was passed at a registration boundary
    #[error("name must not be blank")]
    BlankName,

    /// A level dimension must be finite and in (0, `MAX_LEVEL_DIMENSION`]
    #[error("level dimension {0} must be finite, positive, and at most the maximum level dimension")]
    InvalidDimension(f32),

    /// Systems can only be added or removed while the level is unloaded
    #[error("level `{0}` is loaded; systems can only be changed while it is unloaded")]
    LevelLoaded(String),

    /// No system is registered under the given name
    #[error("unknown system `{0}`")]
    UnknownSystem(String),

    /// A system with the same name is already registered
    #[error("system `{0}` is already registered")]
    DuplicateSystem(String),

    /// The system has not been started
    #[error("system `{0}` is not running")]
    SystemNotRunning(String),

    /// A coordinate was NaN or infinite
    #[error("coordinate is not finite")]
    NonFiniteCoordinate,

    /// The identifier does not resolve to an entity
    #[error("entity {0} does not exist")]
    UnknownEntity(EntityId),

    /// The entity has no transform component to place
    #[error("entity {0} has no transform component")]
    MissingTransform(EntityId),

    /// An entity operation failed
    #[error(transparent)]
    Entity(#[from] EntityError),
}

/// Level-specific lifecycle hooks.
///
/// Implement this to populate a level when it loads and clean up when it
/// unloads; both hooks run before the level's systems are started or
/// stopped.
pub trait LevelBehavior {
    /// Called while the level is loading, before its systems start.
    fn on_load(&mut self, _director: &mut LevelDirector<'_>) {}

    /// Called while the level is unloading, before its systems stop.
    fn on_unload(&mut self, _director: &mut LevelDirector<'_>) {}
}

/// Hook object for levels without custom setup or teardown.
struct InertBehavior;

impl LevelBehavior for InertBehavior {}

/// A bounded spatial region owning a priority-ordered set of world systems
pub struct Level {
    name: String,
    boundary: Aabb,
    loaded: bool,
    systems: SystemDomain,
    behavior: Box<dyn LevelBehavior>,
}

impl Level {
    /// Create an unloaded level with the given boundary dimensions.
    ///
    /// The boundary box is centered on the origin; each dimension must be
    /// finite, positive, and at most [`MAX_LEVEL_DIMENSION`].
    pub fn new(name: &str, width: f32, height: f32, depth: f32) -> Result<Self, LevelError> {
        if name.trim().is_empty() {
            return Err(LevelError::BlankName);
        }
        for dimension in [width, height, depth] {
            if !dimension.is_finite() || dimension <= 0.0 || dimension > MAX_LEVEL_DIMENSION {
                return Err(LevelError::InvalidDimension(dimension));
            }
        }
        let extents = Vec3::new(width, height, depth) * 0.5;
        Ok(Self {
            name: name.to_string(),
            boundary: Aabb::from_center_extents(Vec3::zeros(), extents),
            loaded: false,
            systems: SystemDomain::new(),
            behavior: Box::new(InertBehavior),
        })
    }

    /// Attach level-specific load/unload hooks (builder style).
    #[must_use]
    pub fn with_behavior(mut self, behavior: Box<dyn LevelBehavior>) -> Self {
        self.behavior = behavior;
        self
    }

    /// Name of the level
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Boundary box of the level, centered on the origin
    #[must_use]
    pub fn boundary(&self) -> &Aabb {
        &self.boundary
    }

    /// Whether the level is currently loaded
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Add a world system.
    ///
    /// Only allowed while the level is unloaded, which protects systems from
    /// structural changes mid-update.
    pub fn add_system(&mut self, system: Box<dyn WorldSystem>) -> Result<(), LevelError> {
        if self.loaded {
            return Err(LevelError::LevelLoaded(self.name.clone()));
        }
        self.systems.add(system)
    }

    /// Remove a world system by name. Only allowed while the level is
    /// unloaded.
    pub fn remove_system(&mut self, name: &str) -> Result<Box<dyn WorldSystem>, LevelError> {
        if self.loaded {
            return Err(LevelError::LevelLoaded(self.name.clone()));
        }
        self.systems.remove(name)
    }

    /// Pause the named system; it keeps its place in the update order but
    /// receives no updates until resumed.
    pub fn pause_system(&mut self, name: &str) -> Result<(), LevelError> {
        self.systems.pause(name)
    }

    /// Resume the named system.
    pub fn resume_system(&mut self, name: &str) -> Result<(), LevelError> {
        self.systems.resume(name)
    }

    /// Run state of the named system, if present
    #[must_use]
    pub fn system_state(&self, name: &str) -> Option<SystemState> {
        self.systems.state(name)
    }

    /// Number of systems owned by the level
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    pub(crate) fn load(&mut self, entities: &mut EntityManager) {
        log::info!("loading level `{}`", self.name);
        let mut director = LevelDirector::new(entities, self.boundary);
        self.behavior.on_load(&mut director);
        self.systems.start_all();
        self.loaded = true;
    }

    pub(crate) fn unload(&mut self, entities: &mut EntityManager) {
        log::info!("unloading level `{}`", self.name);
        let mut director = LevelDirector::new(entities, self.boundary);
        self.behavior.on_unload(&mut director);
        self.systems.stop_all();
        self.loaded = false;
    }

    pub(crate) fn update(&mut self, entities: &mut EntityManager, delta_time: f32) {
        let mut director = LevelDirector::new(entities, self.boundary);
        self.systems.update_all(&mut director, delta_time);
    }
}
