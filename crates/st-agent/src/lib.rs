//! `st-agent`: entity and agent state for the steering framework.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`entity`]    | `Entity` (position, centre offset, radius, forward)       |
//! | [`agent`]     | `Agent` (vehicle physics), `Locomotion`                   |
//! | [`config`]    | `AgentConfig` (defaults for every tunable)                |
//! | [`builder`]   | `AgentBuilder` (fluent construction)                      |
//! | [`store`]     | `EntityStore`, `Body`, `AgentRngs`                        |
//!
//! # Tick vs frame
//!
//! An agent's steering runs on its own ticked task: [`Agent::begin_tick`]
//! then [`Agent::commit_forces`] with the summed behavior forces.  Movement
//! runs every host frame: [`Agent::frame`] integrates the last committed
//! velocity into position and turns the forward vector.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `AgentConfig`.          |

pub mod agent;
pub mod builder;
pub mod config;
pub mod entity;
pub mod store;

#[cfg(test)]
mod tests;

pub use agent::{Agent, Locomotion};
pub use builder::AgentBuilder;
pub use config::AgentConfig;
pub use entity::Entity;
pub use store::{AgentRngs, Body, EntityStore};
