//! Read-only world state passed to every steering callback.

use glam::Vec3;

use st_agent::{Agent, Entity, EntityStore};
use st_core::{EntityId, SimTime};
use st_spatial::Radar;

use crate::FormationRegistry;

/// What a behavior steers toward (or away from).
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Target {
    /// A fixed point in world space.
    Point(Vec3),
    /// The current position of another entity.  Resolves to nothing once
    /// the entity is despawned.
    Entity(EntityId),
}

impl From<Vec3> for Target {
    fn from(point: Vec3) -> Self {
        Target::Point(point)
    }
}

impl From<EntityId> for Target {
    fn from(id: EntityId) -> Self {
        Target::Entity(id)
    }
}

/// A read-only snapshot handed to [`Steering`][crate::Steering] callbacks
/// for one agent's tick.
///
/// Built by the world right after [`Agent::begin_tick`], so `me` already
/// carries this tick's timestamps.  Radar lists hold ids, not references;
/// the iterators below resolve them against `store` and silently skip
/// entities despawned since the last refresh.
pub struct SteerContext<'a> {
    pub now:        SimTime,
    /// Seconds since this agent's previous steering tick.
    pub delta_time: f32,
    pub me:         &'a Agent,
    pub store:      &'a EntityStore,
    /// `None` when the agent has no radar attached.
    pub radar:      Option<&'a Radar>,
    pub formations: &'a FormationRegistry,
}

impl<'a> SteerContext<'a> {
    #[inline]
    pub fn new(
        me:         &'a Agent,
        store:      &'a EntityStore,
        radar:      Option<&'a Radar>,
        formations: &'a FormationRegistry,
    ) -> Self {
        Self {
            now: me.current_tick_time(),
            delta_time: me.delta_time(),
            me,
            store,
            radar,
            formations,
        }
    }

    /// Agents on the radar that still exist.
    pub fn neighbors(&self) -> impl Iterator<Item = &'a Agent> + use<'a> {
        let store = self.store;
        self.radar
            .map(Radar::agents)
            .unwrap_or_default()
            .iter()
            .filter_map(move |&id| store.agent(id))
    }

    /// Obstacles on the radar that still exist.
    pub fn obstacles(&self) -> impl Iterator<Item = &'a Entity> + use<'a> {
        let store = self.store;
        self.radar
            .map(Radar::obstacles)
            .unwrap_or_default()
            .iter()
            .filter_map(move |&id| store.entity(id))
    }

    pub fn has_neighbors(&self) -> bool {
        self.neighbors().next().is_some()
    }

    pub fn agent(&self, id: EntityId) -> Option<&'a Agent> {
        self.store.agent(id)
    }

    /// World position of `target`, or `None` if it no longer exists.
    pub fn resolve(&self, target: Target) -> Option<Vec3> {
        match target {
            Target::Point(p) => Some(p),
            Target::Entity(id) => self.store.entity(id).map(Entity::position),
        }
    }
}
