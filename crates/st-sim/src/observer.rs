//! World observer trait for movement sinks and instrumentation.

use glam::Vec3;

use st_core::{EntityId, SimTime};
use st_schedule::PumpReport;

/// Callbacks invoked by [`World::pump`][crate::World::pump] and
/// [`World::frame`][crate::World::frame].
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.  A host engine typically implements
/// `on_agent_moved` to push the new transform onto its own scene objects.
///
/// # Example: trail recorder
///
/// ```rust,ignore
/// struct Trails(Vec<(EntityId, Vec3)>);
///
/// impl WorldObserver for Trails {
///     fn on_agent_moved(&mut self, id: EntityId, _delta: Vec3, position: Vec3, _forward: Vec3) {
///         self.0.push((id, position));
///     }
/// }
/// ```
pub trait WorldObserver {
    /// An agent moved during [`World::frame`][crate::World::frame].
    ///
    /// `delta` is the masked displacement just applied; `position` and
    /// `forward` are the state after the move.
    fn on_agent_moved(&mut self, _id: EntityId, _delta: Vec3, _position: Vec3, _forward: Vec3) {}

    /// A radar refresh task ran.
    fn on_radar_refreshed(&mut self, _id: EntityId, _agents: usize, _obstacles: usize) {}

    /// A steering tick committed `velocity` as the agent's new target
    /// velocity.  `failed` counts behaviors whose output was discarded.
    fn on_steering_composed(&mut self, _id: EntityId, _velocity: Vec3, _failed: u32) {}

    /// Called once after every queue has been updated.
    fn on_pump_end(&mut self, _now: SimTime, _report: &PumpReport) {}
}

/// A [`WorldObserver`] that does nothing.
pub struct NoopObserver;

impl WorldObserver for NoopObserver {}
