//! The `Steering` trait: the main extension point for user code.

use glam::Vec3;

use st_core::{AgentRng, EntityId};

use crate::{BehaviorResult, FormationRegistry, SteerContext};

/// A pluggable force-calculation strategy.
///
/// Implement this trait to add a steering behavior.  Behaviors live in an
/// agent's [`SteeringSet`][crate::SteeringSet], which owns the weight and the
/// enabled flag; the behavior itself only computes a force.
///
/// # Passes
///
/// Primary behaviors (the default) are summed, divided by mass and clamped
/// to `max_force`.  Behaviors reporting [`is_post_process`] run in a second
/// pass whose non-zero sum replaces the primary result, clamped to
/// `max_speed` instead.
///
/// # Errors
///
/// A returned error is logged and counts as a zero force; it never aborts
/// the agent's tick.  Missing targets are not errors: return `Vec3::ZERO`.
///
/// # Example
///
/// ```rust
/// use glam::Vec3;
/// use st_behavior::{BehaviorResult, SteerContext, Steering};
/// use st_core::AgentRng;
///
/// /// Always push along +X.
/// struct Drift;
///
/// impl Steering for Drift {
///     fn name(&self) -> &'static str {
///         "drift"
///     }
///
///     fn calculate_force(&mut self, ctx: &SteerContext<'_>, _rng: &mut AgentRng) -> BehaviorResult<Vec3> {
///         Ok(Vec3::X * ctx.me.max_speed())
///     }
/// }
/// ```
///
/// [`is_post_process`]: Steering::is_post_process
pub trait Steering: 'static {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn is_post_process(&self) -> bool {
        false
    }

    /// Compute this tick's force.  `&mut self` lets stateful behaviors
    /// (wander) keep their state between ticks.
    fn calculate_force(&mut self, ctx: &SteerContext<'_>, rng: &mut AgentRng) -> BehaviorResult<Vec3>;

    /// Called when the behavior is attached to `owner` in a world.
    fn on_attach(&mut self, _owner: EntityId, _formations: &mut FormationRegistry) {}

    /// Called when the behavior (or its owner) leaves the world.
    fn on_detach(&mut self, _owner: EntityId, _formations: &mut FormationRegistry) {}
}
