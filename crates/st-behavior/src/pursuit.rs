//! Predictive chase (pursuit) and escape (evasion).

use glam::Vec3;

use st_core::math::approx_zero;
use st_core::{AgentRng, EntityId};

use crate::{BehaviorResult, SteerContext, Steering};

/// Above this cosine a direction counts as "ahead" / "parallel", below its
/// negation as "behind" / "anti-parallel".
const COS_45: f32 = 0.707;

/// Multiplier applied to the direct travel time to estimate the interception
/// time.
///
/// `forwardness` is `dot(our forward, unit offset to the quarry)` and
/// `parallelness` is `dot(our forward, quarry forward)`.  Each is sorted into
/// one of three bands, giving nine cases:
///
/// | quarry  | parallel | perpendicular | anti-parallel |
/// |---------|----------|---------------|---------------|
/// | ahead   | 4        | 1.8           | 0.85          |
/// | aside   | 1        | 0.8           | 4             |
/// | behind  | 0.5      | 2             | 2             |
pub fn time_factor(forwardness: f32, parallelness: f32) -> f32 {
    match (band(forwardness), band(parallelness)) {
        (1, 1) => 4.0,
        (1, 0) => 1.8,
        (1, _) => 0.85,
        (0, 1) => 1.0,
        (0, 0) => 0.8,
        (0, _) => 4.0,
        (_, 1) => 0.5,
        (_, _) => 2.0,
    }
}

fn band(x: f32) -> i8 {
    if x < -COS_45 {
        -1
    } else if x > COS_45 {
        1
    } else {
        0
    }
}

// ── Pursuit ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Pursuit {
    pub target:              Option<EntityId>,
    /// Extra gap kept on top of both radii when `arrival` is set.
    pub acceptable_distance: f32,
    /// Cap on how far ahead the quarry's position is predicted.
    pub max_prediction_time: f32,
    /// Stop pushing once touching the quarry.
    pub arrival:             bool,
}

impl Pursuit {
    pub fn new(target: EntityId) -> Self {
        Self {
            target:              Some(target),
            acceptable_distance: 0.0,
            max_prediction_time: 2.0,
            arrival:             false,
        }
    }

    pub fn arriving(mut self, acceptable_distance: f32) -> Self {
        self.arrival = true;
        self.acceptable_distance = acceptable_distance;
        self
    }
}

impl Steering for Pursuit {
    fn name(&self) -> &'static str {
        "pursuit"
    }

    fn calculate_force(&mut self, ctx: &SteerContext<'_>, _rng: &mut AgentRng) -> BehaviorResult<Vec3> {
        let Some(quarry) = self.target.and_then(|id| ctx.agent(id)) else {
            return Ok(Vec3::ZERO);
        };
        let me = ctx.me;
        let offset = quarry.position() - me.position();
        let distance = offset.length();
        if approx_zero(distance) {
            return Ok(Vec3::ZERO);
        }
        let contact = me.radius() + quarry.radius() + self.acceptable_distance;
        if self.arrival && distance < contact {
            return Ok(Vec3::ZERO);
        }

        let unit_offset = offset / distance;
        let parallelness = me.forward().dot(quarry.forward());
        let forwardness = me.forward().dot(unit_offset);

        // A stationary pursuer would take forever; use the cap.
        let estimate = if approx_zero(me.speed()) {
            self.max_prediction_time
        } else {
            distance / me.speed() * time_factor(forwardness, parallelness)
        };
        let horizon = estimate.min(self.max_prediction_time);

        let desired = quarry.predict_future_position(horizon) - me.position();
        Ok(desired - me.velocity())
    }
}

// ── Evasion ───────────────────────────────────────────────────────────────────

/// Steer away from where a threat will be, once it comes within
/// `safety_distance`.
#[derive(Clone, Debug)]
pub struct Evasion {
    pub threat:          Option<EntityId>,
    pub prediction_time: f32,
    pub safety_distance: f32,
}

impl Evasion {
    pub fn new(threat: EntityId) -> Self {
        Self { threat: Some(threat), prediction_time: 1.0, safety_distance: 2.0 }
    }

    pub fn safety_distance(mut self, distance: f32) -> Self {
        self.safety_distance = distance.max(0.0);
        self
    }
}

impl Steering for Evasion {
    fn name(&self) -> &'static str {
        "evasion"
    }

    fn calculate_force(&mut self, ctx: &SteerContext<'_>, _rng: &mut AgentRng) -> BehaviorResult<Vec3> {
        let Some(threat) = self.threat.and_then(|id| ctx.agent(id)) else {
            return Ok(Vec3::ZERO);
        };
        let me = ctx.me;
        let offset = threat.position() - me.position();
        if offset.length_squared() > self.safety_distance * self.safety_distance {
            return Ok(Vec3::ZERO);
        }

        let ours = me.predict_future_desired_position(self.prediction_time);
        let rough_time = if approx_zero(threat.speed()) {
            self.prediction_time
        } else {
            offset.length() / threat.speed()
        };
        let theirs = threat.predict_future_position(rough_time.min(self.prediction_time));
        Ok((ours - theirs) - me.desired_velocity())
    }
}
