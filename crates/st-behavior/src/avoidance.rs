//! Obstacle and neighbor avoidance.

use glam::Vec3;

use st_agent::{Agent, Entity};
use st_core::math::{approx_zero, is_zero_vec};
use st_core::AgentRng;

use crate::{BehaviorResult, SteerContext, Steering};

// ── Ray / sphere test ─────────────────────────────────────────────────────────

/// Distance from `position` along the segment to `future_position` at which
/// a sphere of `radius` moving along it first touches `obstacle`, if it
/// does.
///
/// The obstacle is inflated by `radius` (Minkowski sum) and the segment is
/// treated as a ray clipped at its end.  An obstacle behind the start only
/// counts if the two already overlap.
pub fn find_next_intersection(position: Vec3, radius: f32, future_position: Vec3, obstacle: &Entity) -> Option<f32> {
    let combined = radius + obstacle.radius();
    let movement = future_position - position;
    let length = movement.length();
    if approx_zero(length) {
        return None;
    }
    let direction = movement / length;
    let to_obstacle = obstacle.position() - position;

    let projection = direction.dot(to_obstacle);
    if projection > length + combined {
        return None;
    }
    let closest = position + direction * projection;
    let miss = (obstacle.position() - closest).length();
    if miss > combined {
        return None;
    }
    let half_chord = (combined * combined - miss * miss).max(0.0).sqrt();

    if projection < 0.0 {
        if to_obstacle.length() > combined {
            return None;
        }
        return Some((closest - direction * half_chord - position).length());
    }

    let near = (closest - direction * half_chord - position).length();
    let far = (closest + direction * half_chord - position).length();
    Some(near.min(far))
}

// ── ObstacleAvoidance ─────────────────────────────────────────────────────────

/// Post-process: when the predicted path hits an obstacle, steer sideways
/// away from the nearest one at full force, with a forward bias so the
/// agent keeps moving.
#[derive(Clone, Debug)]
pub struct ObstacleAvoidance {
    /// Seconds of desired velocity to look ahead.
    pub estimation_time: f32,
    /// Forward component, as a fraction of `max_force`.
    pub forward_bias:    f32,
}

impl Default for ObstacleAvoidance {
    fn default() -> Self {
        Self { estimation_time: 2.0, forward_bias: 0.75 }
    }
}

impl Steering for ObstacleAvoidance {
    fn name(&self) -> &'static str {
        "obstacle-avoidance"
    }

    fn is_post_process(&self) -> bool {
        true
    }

    fn calculate_force(&mut self, ctx: &SteerContext<'_>, _rng: &mut AgentRng) -> BehaviorResult<Vec3> {
        let me = ctx.me;
        let position = me.position();
        let future = me.predict_future_desired_position(self.estimation_time);

        let nearest = ctx
            .obstacles()
            .filter_map(|obstacle| {
                find_next_intersection(position, me.radius(), future, obstacle).map(|d| (d, obstacle))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0));
        let Some((_, obstacle)) = nearest else { return Ok(Vec3::ZERO) };

        let forward = me.forward();
        let away = position - obstacle.position();
        let mut lateral = away - forward * away.dot(forward);
        if is_zero_vec(lateral) {
            // Dead ahead: either side will do.
            let up = if forward.y.abs() < 0.9 { Vec3::Y } else { Vec3::X };
            lateral = up.cross(forward);
        }
        let max_force = me.max_force();
        Ok(lateral.normalize_or_zero() * max_force + forward * max_force * self.forward_bias)
    }
}

// ── NeighborAvoidance ─────────────────────────────────────────────────────────

/// Unaligned collision avoidance between agents.
///
/// First pushes out of any neighbor already overlapping; otherwise finds
/// the neighbor whose nearest approach within `prediction_time` comes
/// closer than two radii and sidesteps it.  Returns a unit sideways vector
/// in the second case.
#[derive(Clone, Debug)]
pub struct NeighborAvoidance {
    pub prediction_time: f32,
}

impl Default for NeighborAvoidance {
    fn default() -> Self {
        Self { prediction_time: 1.0 }
    }
}

/// Perpendicular push out of the first overlapping neighbor.
fn avoid_close_neighbors<'a>(me: &Agent, mut neighbors: impl Iterator<Item = &'a Agent>) -> Option<Vec3> {
    let forward = me.forward();
    neighbors.find_map(|other| {
        let offset = other.position() - me.position();
        if offset.length() < me.radius() + other.radius() {
            Some(-offset - forward * offset.dot(forward))
        } else {
            None
        }
    })
}

impl Steering for NeighborAvoidance {
    fn name(&self) -> &'static str {
        "neighbor-avoidance"
    }

    fn calculate_force(&mut self, ctx: &SteerContext<'_>, _rng: &mut AgentRng) -> BehaviorResult<Vec3> {
        let me = ctx.me;
        if let Some(push) = avoid_close_neighbors(me, ctx.neighbors()) {
            if !is_zero_vec(push) {
                return Ok(push);
            }
        }

        let danger = me.radius() * 2.0;
        let mut min_time = self.prediction_time;
        let mut threat: Option<(&Agent, Vec3)> = None;
        for other in ctx.neighbors() {
            let time = me.predict_nearest_approach_time(other);
            if time >= 0.0 && time < min_time {
                let (_, theirs, gap) = me.nearest_approach_positions(other, time);
                if gap < danger {
                    min_time = time;
                    threat = Some((other, theirs));
                }
            }
        }
        let Some((other, theirs)) = threat else { return Ok(Vec3::ZERO) };

        let forward = me.forward();
        let side = Vec3::Y.cross(forward).normalize_or_zero();
        let parallelness = forward.dot(other.forward());
        let steer = if parallelness < -0.707 {
            // Head-on: step aside from where it will be.
            away_from(side, theirs - me.position())
        } else if parallelness > 0.707 {
            // Same heading: step aside from where it is.
            away_from(side, other.position() - me.position())
        } else if other.speed() <= me.speed() {
            // Crossing and we are faster: pass behind it.
            away_from(side, other.velocity())
        } else {
            0.0
        };
        Ok(side * steer)
    }
}

fn away_from(side: Vec3, offset: Vec3) -> f32 {
    if offset.dot(side) > 0.0 { -1.0 } else { 1.0 }
}
