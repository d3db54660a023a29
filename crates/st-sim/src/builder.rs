//! Fluent builder for constructing a [`World`].

use st_schedule::SchedulerRegistry;

use crate::{TickTarget, World, WorldConfig, WorldError, WorldResult};

/// Fluent builder for [`World`].
///
/// | Method                  | Default            |
/// |-------------------------|--------------------|
/// | `.seed(s)`              | `0`                |
/// | `.radar_queue(name)`    | `"radar"`          |
/// | `.steering_queue(name)` | `"steering"`       |
/// | `.config(c)`            | all of the above   |
///
/// # Example
///
/// ```rust,ignore
/// let mut world = WorldBuilder::new().seed(42).build()?;
/// let id = world.spawn_agent(AgentBuilder::new().max_speed(3.0))?;
/// world.attach_steering(id, Seek::new(Vec3::new(10.0, 0.0, 0.0)))?;
/// world.step(1.0 / 60.0, &mut NoopObserver);
/// ```
#[derive(Clone, Debug, Default)]
pub struct WorldBuilder {
    config: WorldConfig,
}

impl WorldBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: WorldConfig) -> Self {
        self.config = config;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn radar_queue(mut self, name: impl Into<String>) -> Self {
        self.config.radar_queue = name.into();
        self
    }

    pub fn steering_queue(mut self, name: impl Into<String>) -> Self {
        self.config.steering_queue = name.into();
        self
    }

    /// Validate the configuration and return an empty world with both
    /// queues created.
    pub fn build(self) -> WorldResult<World> {
        let radar = SchedulerRegistry::<TickTarget>::normalize_name(&self.config.radar_queue);
        let steering = SchedulerRegistry::<TickTarget>::normalize_name(&self.config.steering_queue);
        if radar == steering {
            return Err(WorldError::Config(format!(
                "radar and steering queues must differ (both resolve to '{radar}')"
            )));
        }
        Ok(World::new(self.config))
    }
}
