//! Level manager: single-active-level state machine
//!
//! Load and unload requests are never serviced inline; they arm a deferred
//! action that the next `tick` call resolves. This keeps structural level
//! changes off the update path: an in-progress system pass always observes a
//! stable world. The manager itself is never pausable, so transitions can
//! proceed regardless of any per-system pause state.

use std::collections::HashMap;

use thiserror::Error;

use crate::ecs::entity_manager::EntityManager;
use crate::foundation::time::Timer;
use crate::level::level::Level;

/// Errors raised by the level state machine
#[derive(Error, Debug)]
pub enum LevelManagerError {
    /// No level is registered under the given name
    #[error("unknown level `{0}`")]
    UnknownLevel(String),

    /// The level is already loaded
    #[error("level `{0}` is already loaded")]
    AlreadyLoaded(String),

    /// The level is neither loaded nor pending, so there is nothing to unload
    #[error("level `{0}` is neither loaded nor pending")]
    NotLoaded(String),

    /// A level with the same name is already registered
    #[error("level `{0}` is already registered")]
    DuplicateLevel(String),
}

/// Deferred work executed at the next tick boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickAction {
    /// Nothing scheduled.
    Idle,
    /// Swap in the pending level, unloading the current one first.
    Load,
    /// Unload the current level and go idle.
    Unload,
    /// Advance the active level's systems; the standing action while a level
    /// is loaded.
    Update,
}

/// Owns the level registry and drives the active level once per tick
pub struct LevelManager {
    levels: HashMap<String, Level>,
    entities: EntityManager,
    timer: Timer,
    active: Option<String>,
    pending: Option<String>,
    action: TickAction,
}

impl Default for LevelManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelManager {
    /// Create a manager with an empty level registry and a fresh entity
    /// manager
    #[must_use]
    pub fn new() -> Self {
        Self {
            levels: HashMap::new(),
            entities: EntityManager::new(),
            timer: Timer::new(),
            active: None,
            pending: None,
            action: TickAction::Idle,
        }
    }

    /// The entity manager shared by every level
    #[must_use]
    pub fn entities(&self) -> &EntityManager {
        &self.entities
    }

    /// The entity manager shared by every level, mutable
    pub fn entities_mut(&mut self) -> &mut EntityManager {
        &mut self.entities
    }

    /// Add a level to the registry. Names must be unique.
    pub fn register_level(&mut self, level: Level) -> Result<(), LevelManagerError> {
        if self.levels.contains_key(level.name()) {
            return Err(LevelManagerError::DuplicateLevel(level.name().to_string()));
        }
        self.levels.insert(level.name().to_string(), level);
        Ok(())
    }

    /// Look up a registered level
    #[must_use]
    pub fn level(&self, name: &str) -> Option<&Level> {
        self.levels.get(name)
    }

    /// Look up a registered level, mutable.
    ///
    /// Useful for adding systems to a level after registration (which is
    /// only allowed while it is unloaded).
    pub fn level_mut(&mut self, name: &str) -> Option<&mut Level> {
        self.levels.get_mut(name)
    }

    /// Name of the currently loaded level, if any
    #[must_use]
    pub fn active_level(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Request that a level be loaded at the next tick boundary.
    ///
    /// The current level (if any) is unloaded first, on that same tick. A
    /// newer request replaces a still-pending one: only the last requested
    /// level is ever loaded.
    pub fn load_level(&mut self, name: &str) -> Result<(), LevelManagerError> {
        if !self.levels.contains_key(name) {
            return Err(LevelManagerError::UnknownLevel(name.to_string()));
        }
        if self.active.as_deref() == Some(name) {
            return Err(LevelManagerError::AlreadyLoaded(name.to_string()));
        }
        if let Some(previous) = self.pending.replace(name.to_string()) {
            if previous != name {
                log::debug!("pending load of `{previous}` superseded by `{name}`");
            }
        }
        self.action = TickAction::Load;
        Ok(())
    }

    /// Request that a level be unloaded.
    ///
    /// Cancels a matching pending load outright (the load never happened).
    /// For the currently loaded level the unload is armed for the next tick,
    /// unless a pending load is in flight: the load will unload this level
    /// first anyway, so the request is dropped.
    pub fn unload_level(&mut self, name: &str) -> Result<(), LevelManagerError> {
        if self.pending.as_deref() == Some(name) {
            self.pending = None;
            self.action = if self.active.is_some() {
                TickAction::Update
            } else {
                TickAction::Idle
            };
            return Ok(());
        }
        if self.active.as_deref() == Some(name) {
            if self.pending.is_some() {
                log::debug!("unload of `{name}` skipped: a pending load will replace it");
            } else {
                self.action = TickAction::Unload;
            }
            return Ok(());
        }
        if self.levels.contains_key(name) {
            Err(LevelManagerError::NotLoaded(name.to_string()))
        } else {
            Err(LevelManagerError::UnknownLevel(name.to_string()))
        }
    }

    /// Advance the world by one tick.
    ///
    /// Resolves exactly one deferred action: a pending load (which unloads
    /// the current level, swaps the new one in, and runs one immediate
    /// update pass so its systems see input-complete state on the tick they
    /// become active), an armed unload, the standing system update, or
    /// nothing.
    pub fn tick(&mut self) {
        self.timer.update();
        let delta_time = self.timer.delta_time();

        match self.action {
            TickAction::Idle => {}
            TickAction::Update => {
                if let Some(name) = self.active.as_ref() {
                    if let Some(level) = self.levels.get_mut(name) {
                        level.update(&mut self.entities, delta_time);
                    }
                }
            }
            TickAction::Unload => {
                if let Some(name) = self.active.take() {
                    if let Some(level) = self.levels.get_mut(&name) {
                        level.unload(&mut self.entities);
                    }
                }
                self.action = TickAction::Idle;
            }
            TickAction::Load => {
                if let Some(name) = self.active.take() {
                    if let Some(level) = self.levels.get_mut(&name) {
                        level.unload(&mut self.entities);
                    }
                }
                if let Some(name) = self.pending.take() {
                    if let Some(level) = self.levels.get_mut(&name) {
                        level.load(&mut self.entities);
                        level.update(&mut self.entities, delta_time);
                        self.active = Some(name);
                        self.action = TickAction::Update;
                        return;
                    }
                }
                self.action = TickAction::Idle;
            }
        }
    }
}
