//! Leader following.

use glam::Vec3;

use st_core::math::approx_zero;
use st_core::{AgentRng, EntityId};

use crate::{BehaviorResult, SteerContext, Steering};

/// Trail a leader, arriving at a point `arrive_distance` behind it.  When
/// standing in front of the leader within `distance`, first get out of its
/// way by fleeing a point `flee_distance` ahead of it.
#[derive(Clone, Debug)]
pub struct LeaderFollow {
    pub leader:          EntityId,
    pub distance:        f32,
    pub flee_distance:   f32,
    pub arrive_distance: f32,
}

impl LeaderFollow {
    pub fn new(leader: EntityId) -> Self {
        Self { leader, distance: 6.0, flee_distance: 3.0, arrive_distance: 1.0 }
    }
}

impl Steering for LeaderFollow {
    fn name(&self) -> &'static str {
        "leader-follow"
    }

    fn calculate_force(&mut self, ctx: &SteerContext<'_>, _rng: &mut AgentRng) -> BehaviorResult<Vec3> {
        let Some(leader) = ctx.agent(self.leader) else { return Ok(Vec3::ZERO) };
        let me = ctx.me;
        let to_leader = leader.position() - me.position();
        let heading = leader.forward();

        if heading.dot(to_leader) < 0.0 && to_leader.length() < self.distance {
            let in_front = leader.position() + heading * self.flee_distance;
            return Ok((me.position() - in_front) - me.velocity());
        }

        let behind = leader.position() - heading * self.arrive_distance;
        let offset = behind - me.position();
        let dist = offset.length();
        if approx_zero(dist) {
            return Ok(-me.velocity());
        }
        let slowing = if approx_zero(me.max_force()) || approx_zero(me.mass()) {
            0.0
        } else {
            me.velocity().length() / me.max_force() / me.mass()
        };
        let speed = if approx_zero(slowing) {
            me.max_speed()
        } else {
            (me.max_speed() * dist / slowing).min(me.max_speed())
        };
        Ok(offset * (speed / dist) - me.velocity())
    }
}
