//! Separation, cohesion and alignment over the radar's neighbors.

use glam::Vec3;

use st_agent::Agent;
use st_core::AgentRng;

use crate::{BehaviorResult, SteerContext, Steering};

/// Which radar agents count as neighbors.  See
/// [`Agent::is_in_neighborhood`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Neighborhood {
    pub min_distance:  f32,
    pub max_distance:  f32,
    pub cos_max_angle: f32,
}

impl Default for Neighborhood {
    fn default() -> Self {
        Self { min_distance: 1.0, max_distance: 5.0, cos_max_angle: 0.7 }
    }
}

impl Neighborhood {
    pub fn new(min_distance: f32, max_distance: f32) -> Self {
        Self { min_distance, max_distance, ..Self::default() }
    }

    pub fn contains(&self, me: &Agent, other: &Agent) -> bool {
        me.is_in_neighborhood(other, self.min_distance, self.max_distance, self.cos_max_angle)
    }

    fn members<'a>(&self, ctx: &SteerContext<'a>) -> impl Iterator<Item = &'a Agent> + use<'a> {
        let me = ctx.me;
        let hood = *self;
        ctx.neighbors().filter(move |other| hood.contains(me, other))
    }
}

// ── Separation ────────────────────────────────────────────────────────────────

/// Push away from neighbors, closer ones harder (inverse square).  Unit
/// length, or zero without neighbors.
#[derive(Clone, Debug, Default)]
pub struct Separation {
    pub neighborhood: Neighborhood,
}

impl Steering for Separation {
    fn name(&self) -> &'static str {
        "separation"
    }

    fn calculate_force(&mut self, ctx: &SteerContext<'_>, _rng: &mut AgentRng) -> BehaviorResult<Vec3> {
        let position = ctx.me.position();
        let mut sum = Vec3::ZERO;
        let mut count = 0u32;
        for other in self.neighborhood.members(ctx) {
            let offset = other.position() - position;
            let dist_sq = offset.length_squared();
            if dist_sq > 0.0 {
                sum -= offset / dist_sq;
            }
            count += 1;
        }
        if count == 0 {
            return Ok(Vec3::ZERO);
        }
        Ok((sum / count as f32).normalize_or_zero())
    }
}

// ── Cohesion ──────────────────────────────────────────────────────────────────

/// Steer toward the neighbors' centroid.
#[derive(Clone, Debug, Default)]
pub struct Cohesion {
    pub neighborhood: Neighborhood,
}

impl Steering for Cohesion {
    fn name(&self) -> &'static str {
        "cohesion"
    }

    fn calculate_force(&mut self, ctx: &SteerContext<'_>, _rng: &mut AgentRng) -> BehaviorResult<Vec3> {
        let mut sum = Vec3::ZERO;
        let mut count = 0u32;
        for other in self.neighborhood.members(ctx) {
            sum += other.position();
            count += 1;
        }
        if count == 0 {
            return Ok(Vec3::ZERO);
        }
        Ok(sum / count as f32 - ctx.me.position())
    }
}

// ── Alignment ─────────────────────────────────────────────────────────────────

/// Turn toward the neighbors' average heading.  Unit length.
#[derive(Clone, Debug, Default)]
pub struct Alignment {
    pub neighborhood: Neighborhood,
}

impl Steering for Alignment {
    fn name(&self) -> &'static str {
        "alignment"
    }

    fn calculate_force(&mut self, ctx: &SteerContext<'_>, _rng: &mut AgentRng) -> BehaviorResult<Vec3> {
        let mut sum = Vec3::ZERO;
        let mut count = 0u32;
        for other in self.neighborhood.members(ctx) {
            sum += other.forward();
            count += 1;
        }
        if count == 0 {
            return Ok(Vec3::ZERO);
        }
        Ok((sum / count as f32 - ctx.me.forward()).normalize_or_zero())
    }
}
