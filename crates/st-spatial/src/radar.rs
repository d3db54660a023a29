//! `Radar`: periodic per-agent proximity snapshot.
//!
//! The radar itself is passive: the world schedules one task per radar on the
//! radar queue and calls [`Radar::refresh`] when it fires.  Steering
//! behaviors then read [`Radar::agents`] and [`Radar::obstacles`] until the
//! next refresh.

use glam::Vec3;

use st_core::{EntityId, EntityKind, LayerMask, ShapeId, SimTime};

use crate::{DetectableIndex, SpatialQuery};

// ── Configuration ─────────────────────────────────────────────────────────────

/// Radar settings.
///
/// Typically loaded from a TOML/JSON file by the application crate.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RadarConfig {
    pub detection_radius:         f32,
    /// Seconds between refreshes.
    pub tick_length:              f32,
    /// Initial capacity of the agent and obstacle lists.
    pub preallocate:              usize,
    pub layers:                   LayerMask,
    /// Report disabled agents as agents rather than obstacles.
    pub detect_disabled:          bool,
    /// Queue the refresh task runs on.  `None` means the world's radar queue.
    pub queue_name:               Option<String>,
    /// Cap applied to that queue.  Shared by every radar on it; the last
    /// radar configured wins.
    pub max_processed_per_update: i32,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            detection_radius:         5.0,
            tick_length:              0.5,
            preallocate:              30,
            layers:                   LayerMask::ALL,
            detect_disabled:          false,
            queue_name:               None,
            max_processed_per_update: 20,
        }
    }
}

// ── Radar ─────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Radar {
    config:       RadarConfig,
    agents:       Vec<EntityId>,
    obstacles:    Vec<EntityId>,
    scratch:      Vec<ShapeId>,
    last_refresh: Option<SimTime>,
}

impl Radar {
    pub fn new(mut config: RadarConfig) -> Self {
        config.detection_radius = config.detection_radius.max(0.0);
        let cap = config.preallocate;
        Self {
            config,
            agents:       Vec::with_capacity(cap),
            obstacles:    Vec::with_capacity(cap),
            scratch:      Vec::with_capacity(cap * 3),
            last_refresh: None,
        }
    }

    pub fn config(&self) -> &RadarConfig {
        &self.config
    }

    pub fn detection_radius(&self) -> f32 {
        self.config.detection_radius
    }

    pub fn set_detection_radius(&mut self, radius: f32) {
        self.config.detection_radius = radius.max(0.0);
    }

    pub fn set_detect_disabled(&mut self, detect: bool) {
        self.config.detect_disabled = detect;
    }

    /// Agents seen by the last refresh, excluding the owner.
    pub fn agents(&self) -> &[EntityId] {
        &self.agents
    }

    /// Obstacles (and, unless `detect_disabled`, disabled agents) seen by the
    /// last refresh.
    pub fn obstacles(&self) -> &[EntityId] {
        &self.obstacles
    }

    pub fn last_refresh(&self) -> Option<SimTime> {
        self.last_refresh
    }

    /// Rebuild both lists from a sphere query around `center`.
    ///
    /// Unknown shapes (destroyed since the query structure was built) and the
    /// owner's own shape are skipped.  Returns the number of entities kept.
    pub fn refresh(
        &mut self,
        now: SimTime,
        owner: EntityId,
        center: Vec3,
        query: &dyn SpatialQuery,
        index: &DetectableIndex,
    ) -> usize {
        self.agents.clear();
        self.obstacles.clear();
        self.scratch.clear();
        self.last_refresh = Some(now);

        query.query_sphere(
            center,
            self.config.detection_radius,
            self.config.layers,
            &mut self.scratch,
        );

        for &shape in &self.scratch {
            let Some(record) = index.lookup(shape) else { continue };
            if record.entity == owner {
                continue;
            }
            let counts_as_agent = record.kind == EntityKind::Agent
                && (record.enabled || self.config.detect_disabled);
            if counts_as_agent {
                self.agents.push(record.entity);
            } else {
                self.obstacles.push(record.entity);
            }
        }

        tracing::trace!(
            %owner,
            agents = self.agents.len(),
            obstacles = self.obstacles.len(),
            "radar refreshed"
        );
        self.agents.len() + self.obstacles.len()
    }
}

impl Default for Radar {
    fn default() -> Self {
        Radar::new(RadarConfig::default())
    }
}
