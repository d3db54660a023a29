//! `AgentConfig`: every per-agent tunable with its default.

use st_core::{AxisMask, LayerMask};

use crate::Locomotion;

/// Agent settings.
///
/// Typically loaded from a TOML/JSON file by the application crate and
/// handed to [`AgentBuilder::from_config`](crate::AgentBuilder::from_config).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AgentConfig {
    pub radius:                   f32,
    pub mass:                     f32,
    pub max_speed:                f32,
    pub max_force:                f32,
    /// Seconds to turn fully toward the steering direction.  `0` is instant.
    pub turn_time:                f32,
    /// Below this target speed the agent does not turn.
    pub min_speed_for_turning:    f32,
    pub arrival_radius:           f32,
    pub allowed_axes:             AxisMask,
    pub layer:                    LayerMask,
    pub can_move:                 bool,
    /// Priority of the steering task.  `0` means "use the entity id".
    pub movement_priority:        i32,
    pub locomotion:               Locomotion,

    // ── Steering task ─────────────────────────────────────────────────────
    /// Queue for the steering task.  `None` means the world's steering queue.
    pub queue_name:               Option<String>,
    /// Seconds between steering ticks.
    pub tick_length:              f32,
    /// Cap for the steering queue.  Shared by every agent on it; the last
    /// agent configured wins.
    pub max_processed_per_update: i32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            radius:                   0.5,
            mass:                     1.0,
            max_speed:                1.0,
            max_force:                10.0,
            turn_time:                0.25,
            min_speed_for_turning:    0.1,
            arrival_radius:           0.25,
            allowed_axes:             AxisMask::ALL,
            layer:                    LayerMask::default(),
            can_move:                 true,
            movement_priority:        0,
            locomotion:               Locomotion::default(),
            queue_name:               None,
            tick_length:              0.01,
            max_processed_per_update: 20,
        }
    }
}
