//! `st-behavior`: steering behaviors and force composition.
//!
//! # Crate layout
//!
//! | Module            | Contents                                                    |
//! |-------------------|-------------------------------------------------------------|
//! | [`steering`]      | `Steering` trait                                            |
//! | [`context`]       | `SteerContext<'a>` (read-only tick snapshot), `Target`      |
//! | [`set`]           | `SteeringSet`, `SteeringHandle`, `Composition`              |
//! | [`seek`]          | `Seek` (with arrival), `Flee`                               |
//! | [`pursuit`]       | `Pursuit`, `Evasion`, `time_factor`                         |
//! | [`flocking`]      | `Separation`, `Cohesion`, `Alignment`, `Neighborhood`       |
//! | [`wander`]        | `Wander`                                                    |
//! | [`path_follow`]   | `StayOnPath`, `FollowPath`                                  |
//! | [`avoidance`]     | `ObstacleAvoidance`, `NeighborAvoidance`                    |
//! | [`tether`]        | `Tether`, `GoUpToSpeed`                                     |
//! | [`formation`]     | `FormationRegistry`, `Formation`                            |
//! | [`leader`]        | `LeaderFollow`                                              |
//! | [`error`]         | `BehaviorError`, `BehaviorResult<T>`                        |
//!
//! # Composition
//!
//! For each steering tick the world calls [`Agent::begin_tick`], builds a
//! [`SteerContext`], runs [`SteeringSet::compose`] and hands the two sums to
//! [`Agent::commit_forces`]:
//!
//! ```text
//! raw       = Σ weight · force   (enabled primary behaviors)
//! adjusted  = Σ weight · force   (enabled post-process behaviors)
//! velocity  = clamp(raw / mass, max_force)
//! adjusted ≠ 0 → velocity = clamp(adjusted / mass, max_speed)
//! ```
//!
//! Behaviors only read the world.  The one exception is per-behavior state
//! such as wander's current point, which lives in the behavior itself.
//!
//! [`Agent::begin_tick`]: st_agent::Agent::begin_tick
//! [`Agent::commit_forces`]: st_agent::Agent::commit_forces

pub mod avoidance;
pub mod context;
pub mod error;
pub mod flocking;
pub mod formation;
pub mod leader;
pub mod path_follow;
pub mod pursuit;
pub mod seek;
pub mod set;
pub mod steering;
pub mod tether;
pub mod wander;


pub use avoidance::{find_next_intersection, NeighborAvoidance, ObstacleAvoidance};
pub use context::{SteerContext, Target};
pub use error::{BehaviorError, BehaviorResult};
pub use flocking::{Alignment, Cohesion, Neighborhood, Separation};
pub use formation::{Formation, FormationRegistry};
pub use leader::LeaderFollow;
pub use path_follow::{FollowPath, StayOnPath};
pub use pursuit::{time_factor, Evasion, Pursuit};
pub use seek::{Flee, Seek};
pub use set::{Composition, SteeringHandle, SteeringSet};
pub use steering::Steering;
pub use tether::{GoUpToSpeed, Tether};
pub use wander::Wander;
