//! Priority-ordered system domain
//!
//! Owns a level's world systems as trait objects, kept sorted by ascending
//! priority (ties keep insertion order). The domain also owns each system's
//! run state; update passes skip everything that is not running.

use crate::level::director::LevelDirector;
use crate::level::level::LevelError;
use crate::level::system::{SystemState, WorldSystem};

struct SystemEntry {
    system: Box<dyn WorldSystem>,
    state: SystemState,
}

/// Priority-ordered collection of world systems with per-system run state
#[derive(Default)]
pub struct SystemDomain {
    entries: Vec<SystemEntry>,
}

impl SystemDomain {
    /// Create an empty domain
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of systems in the domain
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the domain holds no systems
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run state of the named system, if present
    #[must_use]
    pub fn state(&self, name: &str) -> Option<SystemState> {
        self.entries
            .iter()
            .find(|entry| entry.system.name() == name)
            .map(|entry| entry.state)
    }

    pub(crate) fn add(&mut self, system: Box<dyn WorldSystem>) -> Result<(), LevelError> {
        if system.name().trim().is_empty() {
            return Err(LevelError::BlankName);
        }
        if self.entries.iter().any(|e| e.system.name() == system.name()) {
            return Err(LevelError::DuplicateSystem(system.name().to_string()));
        }
        // Insert after any entry of equal priority to keep ordering stable.
        let priority = system.priority();
        let position = self
            .entries
            .iter()
            .position(|e| e.system.priority() > priority)
            .unwrap_or(self.entries.len());
        self.entries.insert(
            position,
            SystemEntry {
                system,
                state: SystemState::Stopped,
            },
        );
        Ok(())
    }

    pub(crate) fn remove(&mut self, name: &str) -> Result<Box<dyn WorldSystem>, LevelError> {
        let position = self
            .entries
            .iter()
            .position(|e| e.system.name() == name)
            .ok_or_else(|| LevelError::UnknownSystem(name.to_string()))?;
        Ok(self.entries.remove(position).system)
    }

    pub(crate) fn start_all(&mut self) {
        for entry in &mut self.entries {
            entry.system.start();
            entry.state = SystemState::Running;
        }
    }

    pub(crate) fn stop_all(&mut self) {
        for entry in &mut self.entries {
            if entry.state != SystemState::Stopped {
                entry.system.stop();
                entry.state = SystemState::Stopped;
            }
        }
    }

    /// Pause the named system.
    ///
    /// Pausing an already-paused system is a no-op; pausing a stopped system
    /// is an error.
    pub fn pause(&mut self, name: &str) -> Result<(), LevelError> {
        let entry = self.entry_mut(name)?;
        match entry.state {
            SystemState::Running => {
                entry.state = SystemState::Paused;
                entry.system.on_pause();
                Ok(())
            }
            SystemState::Paused => Ok(()),
            SystemState::Stopped => Err(LevelError::SystemNotRunning(name.to_string())),
        }
    }

    /// Resume the named system.
    ///
    /// Resuming a system that is already running is a no-op; resuming a
    /// stopped system is an error.
    pub fn resume(&mut self, name: &str) -> Result<(), LevelError> {
        let entry = self.entry_mut(name)?;
        match entry.state {
            SystemState::Paused => {
                entry.state = SystemState::Running;
                entry.system.on_resume();
                Ok(())
            }
            SystemState::Running => Ok(()),
            SystemState::Stopped => Err(LevelError::SystemNotRunning(name.to_string())),
        }
    }

    pub(crate) fn update_all(&mut self, director: &mut LevelDirector<'_>, delta_time: f32) {
        for entry in &mut self.entries {
            if entry.state == SystemState::Running {
                entry.system.update(director, delta_time);
            }
        }
    }

    fn entry_mut(&mut self, name: &str) -> Result<&mut SystemEntry, LevelError> {
        self.entries
            .iter_mut()
            .find(|entry| entry.system.name() == name)
            .ok_or_else(|| LevelError::UnknownSystem(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::EntityManager;
    use crate::foundation::math::{Aabb, Vec3};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records update order into a shared trace.
    struct TraceSystem {
        name: String,
        priority: i32,
        trace: Rc<RefCell<Vec<String>>>,
    }

    impl WorldSystem for TraceSystem {
        fn name(&self) -> &str {
            &self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn update(&mut self, _director: &mut LevelDirector<'_>, _delta_time: f32) {
            self.trace.borrow_mut().push(self.name.clone());
        }
    }

    fn trace_system(
        name: &str,
        priority: i32,
        trace: &Rc<RefCell<Vec<String>>>,
    ) -> Box<dyn WorldSystem> {
        Box::new(TraceSystem {
            name: name.to_string(),
            priority,
            trace: Rc::clone(trace),
        })
    }

    fn run_update(domain: &mut SystemDomain) {
        let mut entities = EntityManager::new();
        let boundary = Aabb::from_center_extents(Vec3::zeros(), Vec3::new(10.0, 10.0, 10.0));
        let mut director = LevelDirector::new(&mut entities, boundary);
        domain.update_all(&mut director, 0.016);
    }

    #[test]
    fn update_runs_in_ascending_priority_order() {
        let trace = Rc::new(RefCell::new(Vec::new()));
        let mut domain = SystemDomain::new();
        domain.add(trace_system("late", 50, &trace)).unwrap();
        domain.add(trace_system("early", -10, &trace)).unwrap();
        domain.add(trace_system("middle", 0, &trace)).unwrap();
        domain.start_all();

        run_update(&mut domain);
        assert_eq!(*trace.borrow(), vec!["early", "middle", "late"]);
    }

    #[test]
    fn equal_priorities_keep_insertion_order() {
        let trace = Rc::new(RefCell::new(Vec::new()));
        let mut domain = SystemDomain::new();
        domain.add(trace_system("first", 5, &trace)).unwrap();
        domain.add(trace_system("second", 5, &trace)).unwrap();
        domain.start_all();

        run_update(&mut domain);
        assert_eq!(*trace.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn paused_systems_are_skipped_until_resumed() {
        let trace = Rc::new(RefCell::new(Vec::new()));
        let mut domain = SystemDomain::new();
        domain.add(trace_system("a", 0, &trace)).unwrap();
        domain.add(trace_system("b", 1, &trace)).unwrap();
        domain.start_all();

        domain.pause("a").unwrap();
        assert_eq!(domain.state("a"), Some(SystemState::Paused));
        run_update(&mut domain);
        assert_eq!(*trace.borrow(), vec!["b"]);

        domain.resume("a").unwrap();
        run_update(&mut domain);
        assert_eq!(*trace.borrow(), vec!["b", "a", "b"]);
    }

    #[test]
    fn pause_and_resume_require_a_started_system() {
        let trace = Rc::new(RefCell::new(Vec::new()));
        let mut domain = SystemDomain::new();
        domain.add(trace_system("a", 0, &trace)).unwrap();

        assert!(matches!(
            domain.pause("a"),
            Err(LevelError::SystemNotRunning(_))
        ));
        assert!(matches!(
            domain.resume("a"),
            Err(LevelError::SystemNotRunning(_))
        ));
        assert!(matches!(
            domain.pause("ghost"),
            Err(LevelError::UnknownSystem(_))
        ));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let trace = Rc::new(RefCell::new(Vec::new()));
        let mut domain = SystemDomain::new();
        domain.add(trace_system("a", 0, &trace)).unwrap();
        let result = domain.add(trace_system("a", 1, &trace));
        assert!(matches!(result, Err(LevelError::DuplicateSystem(_))));
        assert_eq!(domain.len(), 1);
    }
}
