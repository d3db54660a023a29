//! Entity storage: `EntityStore` (agents and obstacles) and `AgentRngs`.
//!
//! # Why two structs?
//!
//! Steering behaviors read every other agent through `&EntityStore` while
//! drawing random numbers from their own agent's RNG.  Keeping the RNGs in a
//! separate `AgentRngs` lets the world hand out `&EntityStore` and
//! `&mut AgentRng` at the same time.
//!
//! # Ids
//!
//! `EntityId`s index a `Vec<Option<Body>>` and are never reused: a despawned
//! slot stays `None` forever, so an id captured before the despawn resolves
//! to `None` instead of to some newer entity.

use glam::Vec3;
use tracing::trace;

use st_core::{AgentRng, EntityId, EntityKind, LayerMask, ShapeId, SteerError, SteerResult};

use crate::{Agent, AgentBuilder, Entity};

/// What lives in an entity slot.
#[derive(Clone, Debug)]
pub enum Body {
    Obstacle(Entity),
    Agent(Agent),
}

impl Body {
    pub fn entity(&self) -> &Entity {
        match self {
            Body::Obstacle(entity) => entity,
            Body::Agent(agent) => &agent.entity,
        }
    }

    pub fn entity_mut(&mut self) -> &mut Entity {
        match self {
            Body::Obstacle(entity) => entity,
            Body::Agent(agent) => &mut agent.entity,
        }
    }
}

// ── EntityStore ───────────────────────────────────────────────────────────────

#[derive(Default, Debug)]
pub struct EntityStore {
    slots: Vec<Option<Body>>,
    live:  usize,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_ids(&self) -> (EntityId, ShapeId) {
        let n = self.slots.len() as u32;
        (EntityId(n), ShapeId(n))
    }

    /// Insert a new agent built from `builder`.  The shape id mirrors the
    /// entity id.
    pub fn insert_agent(&mut self, builder: AgentBuilder) -> EntityId {
        let (id, shape) = self.next_ids();
        self.slots.push(Some(Body::Agent(builder.build(id, shape))));
        self.live += 1;
        trace!(entity = %id, "agent inserted");
        id
    }

    /// Insert a static obstacle.
    pub fn insert_obstacle(&mut self, position: Vec3, radius: f32, layer: LayerMask) -> EntityId {
        let (id, shape) = self.next_ids();
        let mut entity = Entity::new(id, shape, EntityKind::Obstacle, position, radius);
        entity.layer = layer;
        self.slots.push(Some(Body::Obstacle(entity)));
        self.live += 1;
        trace!(entity = %id, radius, "obstacle inserted");
        id
    }

    /// Remove and return an entity.  `None` if it was already gone.
    pub fn remove(&mut self, id: EntityId) -> Option<Body> {
        let body = self.slots.get_mut(id.index())?.take();
        if body.is_some() {
            self.live -= 1;
            trace!(entity = %id, "entity removed");
        }
        body
    }

    pub fn body(&self, id: EntityId) -> Option<&Body> {
        self.slots.get(id.index())?.as_ref()
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.body(id).map(Body::entity)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slots.get_mut(id.index())?.as_mut().map(Body::entity_mut)
    }

    pub fn agent(&self, id: EntityId) -> Option<&Agent> {
        match self.body(id)? {
            Body::Agent(agent) => Some(agent),
            Body::Obstacle(_) => None,
        }
    }

    pub fn agent_mut(&mut self, id: EntityId) -> Option<&mut Agent> {
        match self.slots.get_mut(id.index())?.as_mut()? {
            Body::Agent(agent) => Some(agent),
            Body::Obstacle(_) => None,
        }
    }

    /// Like [`agent`](Self::agent) but says why the lookup failed.
    pub fn require_agent(&self, id: EntityId) -> SteerResult<&Agent> {
        match self.body(id) {
            Some(Body::Agent(agent)) => Ok(agent),
            Some(Body::Obstacle(_)) => Err(SteerError::NotAnAgent(id)),
            None => Err(SteerError::EntityNotFound(id)),
        }
    }

    pub fn require_agent_mut(&mut self, id: EntityId) -> SteerResult<&mut Agent> {
        match self.slots.get_mut(id.index()).and_then(Option::as_mut) {
            Some(Body::Agent(agent)) => Ok(agent),
            Some(Body::Obstacle(_)) => Err(SteerError::NotAnAgent(id)),
            None => Err(SteerError::EntityNotFound(id)),
        }
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.body(id).is_some()
    }

    /// Live entities.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Iterator over live entities in ascending id order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.slots.iter().flatten().map(Body::entity)
    }

    /// Iterator over live agents in ascending id order.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.slots.iter().flatten().filter_map(|body| match body {
            Body::Agent(agent) => Some(agent),
            Body::Obstacle(_) => None,
        })
    }

    pub fn agent_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.agents().map(|agent| agent.entity.id)
    }

    pub fn agents_mut(&mut self) -> impl Iterator<Item = &mut Agent> + '_ {
        self.slots.iter_mut().flatten().filter_map(|body| match body {
            Body::Agent(agent) => Some(agent),
            Body::Obstacle(_) => None,
        })
    }
}

// ── AgentRngs ─────────────────────────────────────────────────────────────────

/// Per-agent deterministic RNG state, indexed by `EntityId`.
pub struct AgentRngs {
    seed:  u64,
    inner: Vec<Option<AgentRng>>,
}

impl AgentRngs {
    pub fn new(seed: u64) -> Self {
        Self { seed, inner: Vec::new() }
    }

    /// Seed the RNG for `id`.  Re-seeding an existing slot is a no-op.
    pub fn ensure(&mut self, id: EntityId) {
        let i = id.index();
        if self.inner.len() <= i {
            self.inner.resize_with(i + 1, || None);
        }
        if self.inner[i].is_none() {
            self.inner[i] = Some(AgentRng::new(self.seed, id));
        }
    }

    pub fn release(&mut self, id: EntityId) {
        if let Some(slot) = self.inner.get_mut(id.index()) {
            *slot = None;
        }
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut AgentRng> {
        self.inner.get_mut(id.index())?.as_mut()
    }
}
