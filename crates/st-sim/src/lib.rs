//! `st-sim`: the world root of the steering framework.
//!
//! # Pump and frame
//!
//! ```text
//! host frame (dt):
//!   now = clock.advance(dt)
//!   pump(now):
//!     ① Index   rebuild the R-tree from current entity positions.
//!     ② Radar   refresh each due radar's agent and obstacle lists.
//!     ③ Steer   steering queue, then any custom queues in creation
//!               order: begin_tick → SteeringSet::compose →
//!               commit_forces for each due agent.
//!   frame(dt):
//!     ④ Move    every enabled agent integrates its velocity and turns
//!               toward its orientation target; the observer hears about
//!               each move.
//! ```
//!
//! Queues run in creation order.  The builder creates the radar queue
//! first, so steering always reads lists refreshed in the same pump.  A
//! queue named only by a later agent or radar config is appended after
//! both.
//!
//! # Cargo features
//!
//! | Feature   | Effect                                                  |
//! |-----------|---------------------------------------------------------|
//! | `serde`   | Derives `Serialize`/`Deserialize` on every config type. |
//! | `fx-hash` | FxHash for the scheduler, detectable and roster maps.   |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use st_agent::AgentBuilder;
//! use st_behavior::Seek;
//! use st_sim::{NoopObserver, WorldBuilder};
//!
//! let mut world = WorldBuilder::new().seed(7).build()?;
//! let id = world.spawn_agent(AgentBuilder::new().max_speed(2.0))?;
//! world.attach_steering(id, Seek::new(Vec3::new(5.0, 0.0, 0.0)))?;
//! for _ in 0..600 {
//!     world.step(1.0 / 60.0, &mut NoopObserver);
//! }
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod observer;
pub mod world;

#[cfg(test)]
mod tests;

pub use builder::WorldBuilder;
pub use config::WorldConfig;
pub use error::{WorldError, WorldResult};
pub use observer::{NoopObserver, WorldObserver};
pub use world::{TickTarget, World};
