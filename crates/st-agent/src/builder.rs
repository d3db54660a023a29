//! Fluent builder for agents.
//!
//! # Usage
//!
//! ```rust
//! use glam::Vec3;
//! use st_agent::{AgentBuilder, EntityStore};
//!
//! let mut store = EntityStore::new();
//! let id = store.insert_agent(
//!     AgentBuilder::new()
//!         .position(Vec3::new(0.0, 0.0, 5.0))
//!         .forward(Vec3::X)
//!         .max_speed(4.0)
//!         .arrival_radius(0.5),
//! );
//! assert_eq!(store.agent(id).map(|a| a.max_speed()), Some(4.0));
//! ```

use glam::Vec3;

use st_core::{AxisMask, EntityId, EntityKind, LayerMask, ShapeId};

use crate::{Agent, AgentConfig, Entity, Locomotion};

/// Fluent builder for [`Agent`].
///
/// Holds an [`AgentConfig`] plus the initial pose.  Ids are assigned by the
/// store when the agent is inserted.
#[derive(Clone, Debug, Default)]
pub struct AgentBuilder {
    config:   AgentConfig,
    position: Vec3,
    center:   Vec3,
    forward:  Option<Vec3>,
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: AgentConfig) -> Self {
        Self { config, ..Self::default() }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Local offset of the bounding sphere from the transform position.
    pub fn center(mut self, center: Vec3) -> Self {
        self.center = center;
        self
    }

    pub fn forward(mut self, forward: Vec3) -> Self {
        self.forward = Some(forward);
        self
    }

    pub fn radius(mut self, radius: f32) -> Self {
        self.config.radius = radius;
        self
    }

    pub fn mass(mut self, mass: f32) -> Self {
        self.config.mass = mass;
        self
    }

    pub fn max_speed(mut self, max_speed: f32) -> Self {
        self.config.max_speed = max_speed;
        self
    }

    pub fn max_force(mut self, max_force: f32) -> Self {
        self.config.max_force = max_force;
        self
    }

    pub fn turn_time(mut self, turn_time: f32) -> Self {
        self.config.turn_time = turn_time;
        self
    }

    pub fn arrival_radius(mut self, radius: f32) -> Self {
        self.config.arrival_radius = radius;
        self
    }

    pub fn allowed_axes(mut self, axes: AxisMask) -> Self {
        self.config.allowed_axes = axes;
        self
    }

    pub fn layer(mut self, layer: LayerMask) -> Self {
        self.config.layer = layer;
        self
    }

    pub fn locomotion(mut self, locomotion: Locomotion) -> Self {
        self.config.locomotion = locomotion;
        self
    }

    pub fn movement_priority(mut self, priority: i32) -> Self {
        self.config.movement_priority = priority;
        self
    }

    pub fn tick_length(mut self, secs: f32) -> Self {
        self.config.tick_length = secs;
        self
    }

    pub fn queue_name(mut self, name: impl Into<String>) -> Self {
        self.config.queue_name = Some(name.into());
        self
    }

    /// Construct the agent.  All setters clamp, so out-of-range config values
    /// end up at their nearest valid value.
    pub fn build(&self, id: EntityId, shape: ShapeId) -> Agent {
        let cfg = &self.config;
        let mut entity = Entity::new(id, shape, EntityKind::Agent, self.position, cfg.radius);
        entity.set_center(self.center);
        entity.layer = cfg.layer;
        if let Some(forward) = self.forward {
            entity.set_forward(forward);
        }

        let mut agent = Agent::new(entity);
        agent.locomotion = cfg.locomotion;
        agent.allowed_axes = cfg.allowed_axes;
        agent.can_move = cfg.can_move;
        agent.movement_priority = if cfg.movement_priority == 0 {
            i32::try_from(id.0).unwrap_or(i32::MAX)
        } else {
            cfg.movement_priority
        };
        agent.set_mass(cfg.mass);
        agent.set_max_speed(cfg.max_speed);
        agent.set_max_force(cfg.max_force);
        agent.set_turn_time(cfg.turn_time);
        agent.set_min_speed_for_turning(cfg.min_speed_for_turning);
        agent.set_arrival_radius(cfg.arrival_radius);
        agent
    }
}
