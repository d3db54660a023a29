//! `st-core`: foundational types for the steering framework.
//!
//! This crate is a dependency of every other `st-*` crate.  It has no `st-*`
//! dependencies and keeps external ones minimal (`glam`, `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `EntityId`, `ShapeId`                                 |
//! | [`time`]        | `SimTime`, `FrameClock`                               |
//! | [`math`]        | `clamp_magnitude`, `slerp_direction`, `AxisMask`      |
//! | [`kind`]        | `EntityKind`, `LayerMask`                             |
//! | [`rng`]         | `AgentRng` (per-agent), `SimRng` (global)             |
//! | [`error`]       | `SteerError`, `SteerResult`                           |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod ids;
pub mod kind;
pub mod math;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{SteerError, SteerResult};
pub use glam::Vec3;
pub use ids::{EntityId, ShapeId};
pub use kind::{EntityKind, LayerMask};
pub use math::{AxisMask, EPSILON};
pub use rng::{AgentRng, SimRng};
pub use time::{FrameClock, SimTime};
