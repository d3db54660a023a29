//! `Agent`: a steerable vehicle.
//!
//! # Force composition (per steering tick)
//!
//! ```text
//! begin_tick(now)            previous = current; current = now
//!                            → false if can't move / max_force ≈ 0 / max_speed ≈ 0
//! commit_forces(raw, post):
//!   v = clamp(raw / mass, max_force)
//!   v == 0 → zero_velocity(), desired = 0     else desired = v
//!   post != 0 → v = clamp(post / mass, max_speed)
//!   set_calculated_velocity(v)
//! ```
//!
//! The post-process pass clamps against `max_speed` rather than `max_force`
//! so avoidance and tethering can override the primary force limit.
//!
//! # Movement (per host frame)
//!
//! [`Agent::frame`] asks the locomotion model for a position delta, masks it
//! by the allowed axes and moves the entity, then turns the forward vector
//! toward the orientation target.

use glam::Vec3;

use st_core::math::{approx_zero, clamp_magnitude, is_zero_vec, slerp_direction};
use st_core::{AxisMask, SimTime};

use crate::entity::MIN_RADIUS;
use crate::Entity;

// ── Locomotion ────────────────────────────────────────────────────────────────

/// How a committed velocity turns into movement.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Locomotion {
    /// Forward-locked: always moves along its forward vector.  Speed eases
    /// toward the target speed at `acceleration_rate` / `deceleration_rate`
    /// (per second, as a lerp factor).  Velocity cannot be set directly.
    Autonomous {
        acceleration_rate: f32,
        deceleration_rate: f32,
    },
    /// Moves with the committed velocity as-is (clamped to `max_speed`).
    Direct,
}

impl Default for Locomotion {
    fn default() -> Self {
        Locomotion::Autonomous { acceleration_rate: 5.0, deceleration_rate: 8.0 }
    }
}

// ── Agent ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Agent {
    pub entity:            Entity,
    pub locomotion:        Locomotion,
    pub allowed_axes:      AxisMask,
    pub can_move:          bool,
    pub movement_priority: i32,

    mass:                  f32,
    max_speed:             f32,
    max_force:             f32,
    turn_time:             f32,
    min_speed_for_turning: f32,
    arrival_radius:        f32,
    sq_arrival_radius:     f32,

    /// Current scalar speed (autonomous locomotion).
    speed:                 f32,
    /// Current velocity (direct locomotion).
    velocity:              Vec3,
    desired_velocity:      Vec3,
    target_speed:          f32,
    orientation_velocity:  Vec3,
    last_raw_force:        Vec3,

    previous_tick_time:    SimTime,
    current_tick_time:     SimTime,
}

impl Agent {
    /// An agent at rest with default limits.  Prefer
    /// [`AgentBuilder`](crate::AgentBuilder) for anything non-trivial.
    pub fn new(entity: Entity) -> Self {
        let forward = entity.forward();
        let mut agent = Self {
            entity,
            locomotion:            Locomotion::default(),
            allowed_axes:          AxisMask::ALL,
            can_move:              true,
            movement_priority:     0,
            mass:                  1.0,
            max_speed:             1.0,
            max_force:             10.0,
            turn_time:             0.25,
            min_speed_for_turning: 0.1,
            arrival_radius:        0.25,
            sq_arrival_radius:     0.0,
            speed:                 0.0,
            velocity:              Vec3::ZERO,
            desired_velocity:      Vec3::ZERO,
            target_speed:          0.0,
            orientation_velocity:  forward,
            last_raw_force:        Vec3::ZERO,
            previous_tick_time:    SimTime::ZERO,
            current_tick_time:     SimTime::ZERO,
        };
        agent.set_arrival_radius(0.25);
        agent
    }

    // ── Shortcuts into the entity ─────────────────────────────────────────

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.entity.position()
    }

    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.entity.forward()
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.entity.radius()
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.entity.is_enabled()
    }

    // ── Limits ────────────────────────────────────────────────────────────

    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Clamped to `>= 0`.  A zero mass is kept, but composition treats it
    /// as "no steering" rather than dividing by it.
    pub fn set_mass(&mut self, mass: f32) {
        self.mass = non_negative(mass);
    }

    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    pub fn set_max_speed(&mut self, max_speed: f32) {
        self.max_speed = non_negative(max_speed);
    }

    pub fn max_force(&self) -> f32 {
        self.max_force
    }

    pub fn set_max_force(&mut self, max_force: f32) {
        self.max_force = non_negative(max_force);
    }

    pub fn turn_time(&self) -> f32 {
        self.turn_time
    }

    pub fn set_turn_time(&mut self, turn_time: f32) {
        self.turn_time = non_negative(turn_time);
    }

    pub fn min_speed_for_turning(&self) -> f32 {
        self.min_speed_for_turning
    }

    pub fn set_min_speed_for_turning(&mut self, speed: f32) {
        self.min_speed_for_turning = non_negative(speed);
    }

    pub fn arrival_radius(&self) -> f32 {
        self.arrival_radius
    }

    #[inline]
    pub fn squared_arrival_radius(&self) -> f32 {
        self.sq_arrival_radius
    }

    /// Clamped to at least `0.01`; the squared value is cached alongside.
    pub fn set_arrival_radius(&mut self, radius: f32) {
        self.arrival_radius = if radius.is_nan() { MIN_RADIUS } else { radius.max(MIN_RADIUS) };
        self.sq_arrival_radius = self.arrival_radius * self.arrival_radius;
    }

    // ── Kinematic state ───────────────────────────────────────────────────

    /// Current scalar speed.
    pub fn speed(&self) -> f32 {
        match self.locomotion {
            Locomotion::Autonomous { .. } => self.speed,
            Locomotion::Direct => self.velocity.length(),
        }
    }

    /// Current velocity.  Autonomous agents always move along `forward`.
    pub fn velocity(&self) -> Vec3 {
        match self.locomotion {
            Locomotion::Autonomous { .. } => self.forward() * self.speed,
            Locomotion::Direct => self.velocity,
        }
    }

    /// Overwrite the current velocity of a direct-locomotion agent.
    ///
    /// # Panics
    ///
    /// Panics for autonomous agents: their velocity is derived from forward
    /// and speed and cannot be set.
    pub fn set_velocity(&mut self, velocity: Vec3) {
        match self.locomotion {
            Locomotion::Autonomous { .. } => {
                panic!("cannot set the velocity directly on an autonomous agent ({})", self.entity.id)
            }
            Locomotion::Direct => self.velocity = clamp_magnitude(velocity, self.max_speed),
        }
    }

    /// Velocity produced by the primary steering pass of the last tick.
    pub fn desired_velocity(&self) -> Vec3 {
        self.desired_velocity
    }

    pub fn target_speed(&self) -> f32 {
        self.target_speed
    }

    pub fn orientation_velocity(&self) -> Vec3 {
        self.orientation_velocity
    }

    /// Unclamped primary force sum of the last tick.
    pub fn last_raw_force(&self) -> Vec3 {
        self.last_raw_force
    }

    // ── Tick timing ───────────────────────────────────────────────────────

    pub fn previous_tick_time(&self) -> SimTime {
        self.previous_tick_time
    }

    pub fn current_tick_time(&self) -> SimTime {
        self.current_tick_time
    }

    /// Seconds between the last two steering ticks.
    pub fn delta_time(&self) -> f32 {
        self.current_tick_time - self.previous_tick_time
    }

    /// Reset both tick stamps, e.g. when the agent is (re-)enabled, so the
    /// first delta is measured from `at`.
    pub fn reset_tick_clock(&mut self, at: SimTime) {
        self.previous_tick_time = at;
        self.current_tick_time = at;
    }

    // ── Composition ───────────────────────────────────────────────────────

    /// Advance the tick clock to `now` and report whether steering should
    /// run at all this tick.
    pub fn begin_tick(&mut self, now: SimTime) -> bool {
        self.previous_tick_time = self.current_tick_time;
        self.current_tick_time = now;
        self.can_move && !approx_zero(self.max_force) && !approx_zero(self.max_speed)
    }

    /// Turn the summed primary (`raw_force`) and post-process (`adjusted`)
    /// forces into the agent's new target velocity, which is returned.
    pub fn commit_forces(&mut self, raw_force: Vec3, adjusted: Vec3) -> Vec3 {
        self.last_raw_force = raw_force;
        if approx_zero(self.mass) {
            self.zero_velocity();
            self.desired_velocity = Vec3::ZERO;
            return Vec3::ZERO;
        }

        let mut new_velocity = clamp_magnitude(raw_force / self.mass, self.max_force);
        if is_zero_vec(new_velocity) {
            self.zero_velocity();
            self.desired_velocity = Vec3::ZERO;
            new_velocity = Vec3::ZERO;
        } else {
            self.desired_velocity = new_velocity;
        }

        if !is_zero_vec(adjusted) {
            new_velocity = clamp_magnitude(adjusted / self.mass, self.max_speed);
        }

        self.set_calculated_velocity(new_velocity);
        new_velocity
    }

    /// Record a freshly computed velocity: target speed and the direction the
    /// agent should turn toward.
    pub fn set_calculated_velocity(&mut self, velocity: Vec3) {
        self.target_speed = velocity.length();
        match self.locomotion {
            Locomotion::Autonomous { .. } => {
                // A stationary autonomous agent pulls away along its current
                // heading and only turns once it has speed.
                self.orientation_velocity = if approx_zero(self.speed) || approx_zero(self.target_speed) {
                    self.forward()
                } else {
                    velocity / self.target_speed
                };
            }
            Locomotion::Direct => {
                self.velocity = clamp_magnitude(velocity, self.max_speed);
                if !approx_zero(self.target_speed) {
                    self.orientation_velocity = velocity / self.target_speed;
                }
            }
        }
    }

    /// Drop the target speed to zero.  Direct agents also stop immediately.
    pub fn zero_velocity(&mut self) {
        self.target_speed = 0.0;
        if let Locomotion::Direct = self.locomotion {
            self.velocity = Vec3::ZERO;
        }
    }

    /// Halt: movement disabled and target speed zeroed.
    pub fn stop(&mut self) {
        self.can_move = false;
        self.zero_velocity();
    }

    // ── Movement ──────────────────────────────────────────────────────────

    /// Unmasked displacement for a frame of `dt` seconds.  Updates the
    /// autonomous speed as a side effect.
    pub fn position_delta(&mut self, dt: f32) -> Vec3 {
        match self.locomotion {
            Locomotion::Autonomous { acceleration_rate, deceleration_rate } => {
                let target = self.target_speed.clamp(0.0, self.max_speed);
                if approx_zero(self.speed - target) {
                    self.speed = target;
                } else {
                    let rate = if self.target_speed > self.speed {
                        acceleration_rate
                    } else {
                        deceleration_rate
                    };
                    let t = (dt * rate).clamp(0.0, 1.0);
                    self.speed += (target - self.speed) * t;
                }
                self.velocity() * dt
            }
            Locomotion::Direct => self.velocity * dt,
        }
    }

    /// Move by this frame's masked delta and return it.
    pub fn apply_steering_force(&mut self, dt: f32) -> Vec3 {
        let delta = self.allowed_axes.apply(self.position_delta(dt));
        self.entity.translate(delta);
        delta
    }

    /// Turn toward the orientation target.  Skipped below
    /// `min_speed_for_turning` or when not moving.
    pub fn adjust_orientation(&mut self, dt: f32) {
        if self.target_speed <= self.min_speed_for_turning || is_zero_vec(self.velocity()) {
            return;
        }
        let target = self.allowed_axes.apply(self.orientation_velocity).normalize_or_zero();
        if target == Vec3::ZERO {
            return;
        }
        let new_forward = if self.turn_time > 0.0 {
            slerp_direction(self.forward(), target, dt / self.turn_time)
        } else {
            target
        };
        self.entity.set_forward(new_forward);
    }

    /// One host frame: move and turn if the agent can move.  Returns the
    /// applied delta, or `None` if the agent is disabled or stopped.
    pub fn frame(&mut self, dt: f32) -> Option<Vec3> {
        if !self.can_move || !self.is_enabled() {
            return None;
        }
        let delta = self.apply_steering_force(dt);
        self.adjust_orientation(dt);
        Some(delta)
    }

    // ── Prediction and neighborhood queries ───────────────────────────────

    pub fn predict_future_position(&self, time: f32) -> Vec3 {
        self.position() + self.velocity() * time
    }

    pub fn predict_future_desired_position(&self, time: f32) -> Vec3 {
        self.position() + self.desired_velocity * time
    }

    /// Whether `other` is a neighbor: always inside `min_distance`, never
    /// beyond `max_distance`, otherwise only if it lies within the cone
    /// `dot(forward, unit_offset) > cos_max_angle`.  An agent is never its
    /// own neighbor.
    pub fn is_in_neighborhood(&self, other: &Agent, min_distance: f32, max_distance: f32, cos_max_angle: f32) -> bool {
        if other.entity.id == self.entity.id {
            return false;
        }
        let offset = other.position() - self.position();
        let dist_sq = offset.length_squared();
        if dist_sq < min_distance * min_distance {
            return true;
        }
        if dist_sq > max_distance * max_distance || dist_sq == 0.0 {
            return false;
        }
        let unit_offset = offset / dist_sq.sqrt();
        self.forward().dot(unit_offset) > cos_max_angle
    }

    /// Force along forward that closes the gap to `target_speed`, limited
    /// to `max_force`.
    pub fn target_speed_vector(&self, target_speed: f32) -> Vec3 {
        let error = target_speed - self.speed();
        self.forward() * error.clamp(-self.max_force, self.max_force)
    }

    /// Gap between the two bounding spheres.  Negative when they overlap.
    pub fn distance_from_perimeter(&self, other: &Entity) -> f32 {
        (self.position() - other.position()).length() - self.radius() - other.radius()
    }

    /// Face +Z again.
    pub fn reset_orientation(&mut self) {
        self.entity.set_forward(Vec3::Z);
    }

    /// Time until `other` is nearest, assuming both keep their velocities.
    /// `0` for parallel paths.
    pub fn predict_nearest_approach_time(&self, other: &Agent) -> f32 {
        let rel_velocity = other.velocity() - self.velocity();
        let rel_speed = rel_velocity.length();
        if approx_zero(rel_speed) {
            return 0.0;
        }
        let rel_tangent = rel_velocity / rel_speed;
        let rel_position = self.position() - other.position();
        rel_tangent.dot(rel_position) / rel_speed
    }

    /// Both positions after `time` seconds along current headings and
    /// speeds, plus the distance between them.
    pub fn nearest_approach_positions(&self, other: &Agent, time: f32) -> (Vec3, Vec3, f32) {
        let ours = self.position() + self.forward() * self.speed() * time;
        let theirs = other.position() + other.forward() * other.speed() * time;
        (ours, theirs, ours.distance(theirs))
    }
}

#[inline]
fn non_negative(x: f32) -> f32 {
    if x.is_nan() { 0.0 } else { x.max(0.0) }
}
