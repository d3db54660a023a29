//! Tether and cruise-speed behaviors.

use glam::Vec3;

use st_core::AgentRng;

use crate::{BehaviorResult, SteerContext, Steering};

/// Post-process: once farther than `maximum_distance` from the tether
/// point, steer back, averaged with the desired velocity.
#[derive(Clone, Debug)]
pub struct Tether {
    pub position:         Vec3,
    pub maximum_distance: f32,
}

impl Tether {
    pub fn new(position: Vec3) -> Self {
        Self { position, maximum_distance: 30.0 }
    }

    pub fn maximum_distance(mut self, distance: f32) -> Self {
        self.maximum_distance = distance.max(0.0);
        self
    }
}

impl Steering for Tether {
    fn name(&self) -> &'static str {
        "tether"
    }

    fn is_post_process(&self) -> bool {
        true
    }

    fn calculate_force(&mut self, ctx: &SteerContext<'_>, _rng: &mut AgentRng) -> BehaviorResult<Vec3> {
        let difference = self.position - ctx.me.position();
        if difference.length() > self.maximum_distance {
            Ok((difference + ctx.me.desired_velocity()) * 0.5)
        } else {
            Ok(Vec3::ZERO)
        }
    }
}

/// Hold a constant speed along the current heading.
#[derive(Clone, Debug)]
pub struct GoUpToSpeed {
    pub target_speed: f32,
}

impl Default for GoUpToSpeed {
    fn default() -> Self {
        Self { target_speed: 5.0 }
    }
}

impl Steering for GoUpToSpeed {
    fn name(&self) -> &'static str {
        "go-up-to-speed"
    }

    fn calculate_force(&mut self, ctx: &SteerContext<'_>, _rng: &mut AgentRng) -> BehaviorResult<Vec3> {
        Ok(ctx.me.target_speed_vector(self.target_speed))
    }
}
