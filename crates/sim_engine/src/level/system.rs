//! World system trait and run state

use crate::level::director::LevelDirector;

/// Execution state of a system within its domain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemState {
    /// Not started; the system receives no callbacks
    Stopped,
    /// Started and receiving per-tick updates
    Running,
    /// Started but temporarily excluded from update passes
    Paused,
}

/// A per-tick simulation unit scoped to a level.
///
/// Systems are held in a priority-ordered collection and updated in
/// ascending priority order each tick. Pause state lives in the owning
/// domain, not in the system itself; the hooks below let a system react to
/// the transitions.
pub trait WorldSystem {
    /// Name of the system, unique within its level. Used for pause/resume
    /// and removal lookups.
    fn name(&self) -> &str;

    /// Execution priority; lower values run earlier in the tick.
    fn priority(&self) -> i32;

    /// Called when the owning level loads.
    fn start(&mut self) {}

    /// Called when the owning level unloads.
    fn stop(&mut self) {}

    /// Advance the system by one tick.
    fn update(&mut self, director: &mut LevelDirector<'_>, delta_time: f32);

    /// Called when the system is paused.
    fn on_pause(&mut self) {}

    /// Called when the system resumes from pause.
    fn on_resume(&mut self) {}
}
