//! `WorldConfig`: world-level settings.

/// World settings.
///
/// Per-agent and per-radar settings live in `AgentConfig` and
/// `RadarConfig`; this only covers what the world itself owns.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WorldConfig {
    /// Global seed mixed into every agent's RNG.
    pub seed:           u64,
    /// Queue created first, so radars refresh before steering reads them.
    pub radar_queue:    String,
    /// Queue created second.
    pub steering_queue: String,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed:           0,
            radar_queue:    "radar".to_owned(),
            steering_queue: "steering".to_owned(),
        }
    }
}
