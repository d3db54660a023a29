//! `SteeringSet`: an agent's behaviors and the force sums they produce.

use glam::Vec3;
use tracing::warn;

use st_core::{AgentRng, EntityId};

use crate::{FormationRegistry, SteerContext, Steering};

/// Refers to one behavior inside a [`SteeringSet`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SteeringHandle {
    post:  bool,
    index: usize,
}

impl SteeringHandle {
    pub fn is_post_process(self) -> bool {
        self.post
    }
}

struct Slot {
    behavior: Box<dyn Steering>,
    weight:   f32,
    enabled:  bool,
}

/// The two force sums of one steering tick.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Composition {
    /// Weighted sum of the enabled primary behaviors.
    pub raw:      Vec3,
    /// Weighted sum of the enabled post-process behaviors.
    pub adjusted: Vec3,
    /// Behaviors that failed or produced a non-finite force.
    pub failed:   u32,
}

/// Primary and post-process behaviors of one agent.
///
/// Each slot carries a weight (default `1`) and an enabled flag.  Slots are
/// never removed, so handles stay valid for the life of the set.
#[derive(Default)]
pub struct SteeringSet {
    primary: Vec<Slot>,
    post:    Vec<Slot>,
}

impl SteeringSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `behavior` with weight 1.  The pass is chosen by
    /// [`Steering::is_post_process`].
    pub fn add(&mut self, behavior: impl Steering) -> SteeringHandle {
        self.add_weighted(behavior, 1.0)
    }

    pub fn add_weighted(&mut self, behavior: impl Steering, weight: f32) -> SteeringHandle {
        self.add_boxed(Box::new(behavior), weight)
    }

    pub fn add_boxed(&mut self, behavior: Box<dyn Steering>, weight: f32) -> SteeringHandle {
        let post = behavior.is_post_process();
        let slots = if post { &mut self.post } else { &mut self.primary };
        slots.push(Slot { behavior, weight, enabled: true });
        SteeringHandle { post, index: slots.len() - 1 }
    }

    /// Builder-style [`add_weighted`](Self::add_weighted).
    pub fn with(mut self, behavior: impl Steering, weight: f32) -> Self {
        self.add_weighted(behavior, weight);
        self
    }

    fn slot(&self, handle: SteeringHandle) -> Option<&Slot> {
        if handle.post { self.post.get(handle.index) } else { self.primary.get(handle.index) }
    }

    fn slot_mut(&mut self, handle: SteeringHandle) -> Option<&mut Slot> {
        if handle.post { self.post.get_mut(handle.index) } else { self.primary.get_mut(handle.index) }
    }

    pub fn behavior(&self, handle: SteeringHandle) -> Option<&dyn Steering> {
        self.slot(handle).map(|slot| slot.behavior.as_ref())
    }

    pub fn weight(&self, handle: SteeringHandle) -> Option<f32> {
        self.slot(handle).map(|slot| slot.weight)
    }

    /// Returns `false` for an unknown handle.
    pub fn set_weight(&mut self, handle: SteeringHandle, weight: f32) -> bool {
        self.slot_mut(handle).map(|slot| slot.weight = weight).is_some()
    }

    pub fn is_enabled(&self, handle: SteeringHandle) -> bool {
        self.slot(handle).is_some_and(|slot| slot.enabled)
    }

    /// Returns `false` for an unknown handle.
    pub fn set_enabled(&mut self, handle: SteeringHandle, enabled: bool) -> bool {
        self.slot_mut(handle).map(|slot| slot.enabled = enabled).is_some()
    }

    pub fn len(&self) -> usize {
        self.primary.len() + self.post.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn primary_len(&self) -> usize {
        self.primary.len()
    }

    pub fn post_process_len(&self) -> usize {
        self.post.len()
    }

    /// Names of all behaviors, primary first.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.primary.iter().chain(&self.post).map(|slot| slot.behavior.name())
    }

    pub fn attach_all(&mut self, owner: EntityId, formations: &mut FormationRegistry) {
        for slot in self.primary.iter_mut().chain(&mut self.post) {
            slot.behavior.on_attach(owner, formations);
        }
    }

    pub fn detach_all(&mut self, owner: EntityId, formations: &mut FormationRegistry) {
        for slot in self.primary.iter_mut().chain(&mut self.post) {
            slot.behavior.on_detach(owner, formations);
        }
    }

    /// Evaluate every enabled behavior once and return both weighted sums.
    ///
    /// A behavior that errors or returns a non-finite vector is logged and
    /// contributes zero.
    pub fn compose(&mut self, ctx: &SteerContext<'_>, rng: &mut AgentRng) -> Composition {
        let mut failed = 0;
        let raw = sum_pass(&mut self.primary, ctx, rng, &mut failed);
        let adjusted = sum_pass(&mut self.post, ctx, rng, &mut failed);
        Composition { raw, adjusted, failed }
    }
}

fn sum_pass(slots: &mut [Slot], ctx: &SteerContext<'_>, rng: &mut AgentRng, failed: &mut u32) -> Vec3 {
    let mut total = Vec3::ZERO;
    for slot in slots.iter_mut().filter(|slot| slot.enabled) {
        match slot.behavior.calculate_force(ctx, rng) {
            Ok(force) if force.is_finite() => total += force * slot.weight,
            Ok(force) => {
                *failed += 1;
                warn!(
                    entity = %ctx.me.entity.id,
                    behavior = slot.behavior.name(),
                    ?force,
                    "non-finite steering force ignored"
                );
            }
            Err(error) => {
                *failed += 1;
                warn!(
                    entity = %ctx.me.entity.id,
                    behavior = slot.behavior.name(),
                    %error,
                    "steering behavior failed"
                );
            }
        }
    }
    total
}

impl std::fmt::Debug for SteeringSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SteeringSet")
            .field("primary", &self.primary.iter().map(|s| s.behavior.name()).collect::<Vec<_>>())
            .field("post", &self.post.iter().map(|s| s.behavior.name()).collect::<Vec<_>>())
            .finish()
    }
}
