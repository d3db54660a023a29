//! Path-constrained steering over a [`PathWay`].
//!
//! Pathways are shared: several agents can follow the same `Arc<PathWay>`.
//! Both behaviors ignore paths shorter than [`MIN_PATH_LENGTH`].

use std::sync::Arc;

use glam::Vec3;

use st_agent::Agent;
use st_core::AgentRng;
use st_spatial::PathWay;

use crate::{BehaviorResult, SteerContext, Steering};

pub const MIN_PATH_LENGTH: f32 = 2.0;

// ── StayOnPath ────────────────────────────────────────────────────────────────

/// Only correct course when the predicted position leaves the path's tube.
#[derive(Clone, Debug)]
pub struct StayOnPath {
    pub path:            Arc<PathWay>,
    pub prediction_time: f32,
}

impl StayOnPath {
    pub fn new(path: impl Into<Arc<PathWay>>) -> Self {
        Self { path: path.into(), prediction_time: 2.0 }
    }
}

impl Steering for StayOnPath {
    fn name(&self) -> &'static str {
        "stay-on-path"
    }

    fn calculate_force(&mut self, ctx: &SteerContext<'_>, _rng: &mut AgentRng) -> BehaviorResult<Vec3> {
        if self.path.total_length() < MIN_PATH_LENGTH {
            return Ok(Vec3::ZERO);
        }
        let me = ctx.me;
        let future = me.predict_future_position(self.prediction_time);
        let projection = self.path.map_point_to_path(future);
        if projection.outside < 0.0 {
            return Ok(Vec3::ZERO);
        }
        Ok((projection.point - me.position()) - me.velocity())
    }
}

// ── FollowPath ────────────────────────────────────────────────────────────────

/// Seek a point a speed-scaled distance further along the path.
#[derive(Clone, Debug)]
pub struct FollowPath {
    pub path:                   Arc<PathWay>,
    pub prediction_time:        f32,
    /// Floor for the speed used in the look-ahead, so a stopped agent still
    /// looks somewhere ahead.
    pub min_speed_to_consider:  f32,
}

impl FollowPath {
    pub fn new(path: impl Into<Arc<PathWay>>) -> Self {
        Self { path: path.into(), prediction_time: 2.0, min_speed_to_consider: 0.25 }
    }
}

/// Offset to `target` unless already within the arrival radius.
fn seek_with_arrival(me: &Agent, target: Vec3) -> Vec3 {
    let difference = target - me.position();
    if difference.length_squared() > me.squared_arrival_radius() {
        difference
    } else {
        Vec3::ZERO
    }
}

impl Steering for FollowPath {
    fn name(&self) -> &'static str {
        "follow-path"
    }

    fn calculate_force(&mut self, ctx: &SteerContext<'_>, _rng: &mut AgentRng) -> BehaviorResult<Vec3> {
        let path = &self.path;
        if path.total_length() < MIN_PATH_LENGTH {
            return Ok(Vec3::ZERO);
        }
        let me = ctx.me;
        let speed = me.speed().max(self.min_speed_to_consider);
        let along = path.map_point_to_path_distance(me.position()) + self.prediction_time * speed;

        let force = seek_with_arrival(me, path.map_path_distance_to_point(along));
        if force == Vec3::ZERO && along <= path.total_length() {
            // Look-ahead landed inside the arrival radius; look further.
            let further = along + 2.0 * me.arrival_radius();
            return Ok(seek_with_arrival(me, path.map_path_distance_to_point(further)));
        }
        Ok(force)
    }
}
