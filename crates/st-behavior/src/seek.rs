//! Seek and flee.

use glam::Vec3;

use st_core::AgentRng;

use crate::{BehaviorResult, SteerContext, Steering, Target};

/// Head for a target at full speed, or (with `arrival`) close the remaining
/// offset until inside the agent's arrival radius.
#[derive(Clone, Debug, Default)]
pub struct Seek {
    pub target:  Option<Target>,
    pub arrival: bool,
}

impl Seek {
    pub fn new(target: impl Into<Target>) -> Self {
        Self { target: Some(target.into()), arrival: false }
    }

    pub fn arriving(target: impl Into<Target>) -> Self {
        Self { target: Some(target.into()), arrival: true }
    }
}

impl Steering for Seek {
    fn name(&self) -> &'static str {
        "seek"
    }

    fn calculate_force(&mut self, ctx: &SteerContext<'_>, _rng: &mut AgentRng) -> BehaviorResult<Vec3> {
        let Some(target) = self.target.and_then(|t| ctx.resolve(t)) else {
            return Ok(Vec3::ZERO);
        };
        let me = ctx.me;
        let difference = target - me.position();
        if self.arrival {
            if difference.length_squared() > me.squared_arrival_radius() {
                Ok(difference - me.velocity())
            } else {
                Ok(Vec3::ZERO)
            }
        } else {
            Ok(difference.normalize_or_zero() * me.max_speed())
        }
    }
}

/// Run directly away from a target.
#[derive(Clone, Debug, Default)]
pub struct Flee {
    pub target: Option<Target>,
}

impl Flee {
    pub fn new(target: impl Into<Target>) -> Self {
        Self { target: Some(target.into()) }
    }
}

impl Steering for Flee {
    fn name(&self) -> &'static str {
        "flee"
    }

    fn calculate_force(&mut self, ctx: &SteerContext<'_>, _rng: &mut AgentRng) -> BehaviorResult<Vec3> {
        let Some(threat) = self.target.and_then(|t| ctx.resolve(t)) else {
            return Ok(Vec3::ZERO);
        };
        let me = ctx.me;
        let desired = (me.position() - threat).normalize_or_zero() * me.max_speed();
        Ok(desired - me.velocity())
    }
}
