//! Formation rosters and the formation-keeping behavior.
//!
//! A [`FormationRegistry`] maps each leader to its followers in join order.
//! A follower's slot is its index in that roster; the slot becomes a
//! row/column offset behind the leader:
//!
//! ```text
//! n       = min(odd(line_size), roster_len)
//! column  = slot % n - n / 2          (centred on the leader)
//! row     = slot / n + 1
//! side    = column * spacing
//! back    = |side| * tan(angle) + row * spacing
//! target  = leader + right * side - forward * back
//! ```
//!
//! `right` and `forward` are the leader's heading flattened onto the XZ
//! plane, so the formation turns with its leader.

use glam::Vec3;

use st_core::math::approx_zero;
use st_core::{AgentRng, EntityId};

use crate::{BehaviorError, BehaviorResult, SteerContext, Steering};

#[cfg(feature = "fx-hash")]
type Map<K, V> = rustc_hash::FxHashMap<K, V>;
#[cfg(not(feature = "fx-hash"))]
type Map<K, V> = std::collections::HashMap<K, V>;

// ── FormationRegistry ─────────────────────────────────────────────────────────

/// Leader → followers, in join order.
#[derive(Default, Debug)]
pub struct FormationRegistry {
    rosters: Map<EntityId, Vec<EntityId>>,
}

impl FormationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `follower` to `leader`'s roster and return its slot.  Joining
    /// twice keeps the original slot.
    pub fn join(&mut self, leader: EntityId, follower: EntityId) -> usize {
        let roster = self.rosters.entry(leader).or_default();
        match roster.iter().position(|&id| id == follower) {
            Some(slot) => slot,
            None => {
                roster.push(follower);
                roster.len() - 1
            }
        }
    }

    /// Remove `follower`; later followers move up one slot.
    pub fn leave(&mut self, leader: EntityId, follower: EntityId) -> bool {
        let Some(roster) = self.rosters.get_mut(&leader) else { return false };
        let Some(slot) = roster.iter().position(|&id| id == follower) else { return false };
        roster.remove(slot);
        if roster.is_empty() {
            self.rosters.remove(&leader);
        }
        true
    }

    pub fn slot(&self, leader: EntityId, follower: EntityId) -> Option<usize> {
        self.roster(leader).iter().position(|&id| id == follower)
    }

    pub fn roster(&self, leader: EntityId) -> &[EntityId] {
        self.rosters.get(&leader).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of leaders with at least one follower.
    pub fn len(&self) -> usize {
        self.rosters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rosters.is_empty()
    }
}

// ── Formation ─────────────────────────────────────────────────────────────────

/// Keep a slot in a leader's formation, slowing down on arrival.
#[derive(Clone, Debug)]
pub struct Formation {
    pub leader:           EntityId,
    /// Followers per row.  Even values are bumped to the next odd one.
    pub line_size:        usize,
    /// Distance between neighbouring slots, sideways and between rows.
    pub spacing:          f32,
    /// Within this distance of the slot the speed ramps down linearly.
    pub slowing_distance: f32,
    /// Sweep of the rows, in degrees.  `0` gives straight lines, larger
    /// values a V opening backwards.
    pub angle_degrees:    f32,
}

impl Formation {
    pub fn new(leader: EntityId) -> Self {
        Self {
            leader,
            line_size:        10,
            spacing:          2.0,
            slowing_distance: 3.0,
            angle_degrees:    0.0,
        }
    }

    pub fn line_size(mut self, n: usize) -> Self {
        self.line_size = n;
        self
    }

    pub fn spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn slowing_distance(mut self, distance: f32) -> Self {
        self.slowing_distance = distance;
        self
    }

    pub fn angle_degrees(mut self, angle: f32) -> Self {
        self.angle_degrees = angle;
        self
    }

    /// Offset of `slot` from the leader, in the leader's frame: `x` to the
    /// right, `y` backwards.
    pub fn slot_offset(&self, slot: usize, roster_len: usize) -> (f32, f32) {
        let mut n = self.line_size.max(1);
        if n % 2 == 0 {
            n += 1;
        }
        let n = n.min(roster_len.max(1));
        let column = (slot % n) as f32 - (n / 2) as f32;
        let row = (slot / n + 1) as f32;
        let side = column * self.spacing;
        let back = side.abs() * self.angle_degrees.to_radians().tan() + row * self.spacing;
        (side, back)
    }
}

impl Steering for Formation {
    fn name(&self) -> &'static str {
        "formation"
    }

    fn calculate_force(&mut self, ctx: &SteerContext<'_>, _rng: &mut AgentRng) -> BehaviorResult<Vec3> {
        let Some(leader) = ctx.agent(self.leader) else { return Ok(Vec3::ZERO) };
        let me = ctx.me;
        let follower = me.entity.id;
        let slot = ctx
            .formations
            .slot(self.leader, follower)
            .ok_or(BehaviorError::NotInFormation { leader: self.leader, follower })?;
        let roster_len = ctx.formations.roster(self.leader).len();

        let forward = {
            let flat = Vec3::new(leader.forward().x, 0.0, leader.forward().z);
            flat.try_normalize().unwrap_or(Vec3::Z)
        };
        let right = forward.cross(Vec3::Y);
        let (side, back) = self.slot_offset(slot, roster_len);
        let target = leader.position() + right * side - forward * back;

        let offset = target - me.position();
        let distance = offset.length();
        if approx_zero(distance) {
            return Ok(-me.velocity());
        }
        let ramped = if self.slowing_distance > 0.0 {
            me.max_speed() * distance / self.slowing_distance
        } else {
            me.max_speed()
        };
        let clipped = ramped.min(me.max_speed());
        Ok(offset * (clipped / distance) - me.velocity())
    }

    fn on_attach(&mut self, owner: EntityId, formations: &mut FormationRegistry) {
        formations.join(self.leader, owner);
    }

    fn on_detach(&mut self, owner: EntityId, formations: &mut FormationRegistry) {
        formations.leave(self.leader, owner);
    }
}
