//! Wander: aimless but smooth motion.

use glam::Vec3;

use st_core::AgentRng;

use crate::{BehaviorResult, SteerContext, Steering};

/// Distance at which the current wander point counts as reached.
const REACHED: f32 = 0.5;

/// Seek a random point inside a sphere of `radius` centred `distance` ahead
/// of the agent.  The point is redrawn when reached or every
/// `refresh_interval` seconds.
///
/// With a non-zero `area`, the agent is confined to an axis-aligned box of
/// that size centred on where it first wandered: leaving the box along any
/// axis with a non-zero extent turns the wander point into the start
/// position.
#[derive(Clone, Debug)]
pub struct Wander {
    pub radius:           f32,
    pub distance:         f32,
    pub refresh_interval: f32,
    pub area:             Vec3,

    start: Option<Vec3>,
    point: Option<Vec3>,
    timer: f32,
}

impl Default for Wander {
    fn default() -> Self {
        Self {
            radius:           5.0,
            distance:         8.0,
            refresh_interval: 1.0,
            area:             Vec3::ZERO,
            start:            None,
            point:            None,
            timer:            0.0,
        }
    }
}

impl Wander {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn within(mut self, area: Vec3) -> Self {
        self.area = area.abs();
        self
    }

    /// The point currently sought, once the first tick has drawn one.
    pub fn current_point(&self) -> Option<Vec3> {
        self.point
    }

    pub fn start_position(&self) -> Option<Vec3> {
        self.start
    }

    fn outside_area(&self, start: Vec3, position: Vec3) -> bool {
        let half = self.area * 0.5;
        let offset = (position - start).abs();
        (half.x > 0.0 && offset.x >= half.x)
            || (half.y > 0.0 && offset.y >= half.y)
            || (half.z > 0.0 && offset.z >= half.z)
    }
}

impl Steering for Wander {
    fn name(&self) -> &'static str {
        "wander"
    }

    fn calculate_force(&mut self, ctx: &SteerContext<'_>, rng: &mut AgentRng) -> BehaviorResult<Vec3> {
        let me = ctx.me;
        let position = me.position();
        let start = *self.start.get_or_insert(position);
        let circle = position + me.forward() * self.distance;

        self.timer += ctx.delta_time;
        let redraw = match self.point {
            None => true,
            Some(point) => point.distance(position) < REACHED || self.timer > self.refresh_interval,
        };
        if redraw {
            self.point = Some(circle + rng.point_in_unit_sphere() * self.radius);
            self.timer = 0.0;
        }

        if self.area != Vec3::ZERO && self.outside_area(start, position) {
            self.point = Some(start);
        }

        let point = self.point.unwrap_or(start);
        Ok((point - position).normalize_or_zero() * me.max_speed())
    }
}
