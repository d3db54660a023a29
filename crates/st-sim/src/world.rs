//! `World`: owns every registry and drives pump and frame.

use glam::Vec3;
use tracing::{debug, trace};

use st_agent::{Agent, AgentBuilder, AgentRngs, Body, Entity, EntityStore};
use st_behavior::{Composition, FormationRegistry, SteerContext, Steering, SteeringHandle, SteeringSet};
use st_core::{EntityId, EntityKind, FrameClock, LayerMask, SimTime, SteerError};
use st_schedule::{BoxError, PumpReport, SchedulerId, SchedulerRegistry, TickedTask};
use st_spatial::{Detectable, DetectableIndex, Radar, RadarConfig, ShapeEntry, ShapeIndex};

use crate::{WorldConfig, WorldObserver, WorldResult};

// ── Task keys ─────────────────────────────────────────────────────────────────

/// What a scheduled task does when it fires.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TickTarget {
    /// Refresh the entity's radar.
    Radar(EntityId),
    /// Run the entity's steering behaviors and commit the result.
    Steering(EntityId),
}

/// Where one of an agent's tasks lives, kept so disable/enable can take it
/// off its queue and put it back.
#[derive(Copy, Clone, Debug)]
struct TaskSlot {
    queue:       SchedulerId,
    tick_length: f32,
}

#[derive(Copy, Clone, Debug, Default)]
struct AgentTasks {
    steering: Option<TaskSlot>,
    radar:    Option<TaskSlot>,
}

// ── World ─────────────────────────────────────────────────────────────────────

/// The application root.
///
/// Every registry the framework needs is a field here: the scheduler
/// registry, the detectable index, the entity store, formation rosters and
/// the per-agent steering sets and radars.  Per-agent side tables are
/// indexed by `EntityId`, which the store never reuses.
///
/// Construct with [`WorldBuilder`](crate::WorldBuilder).
pub struct World {
    pub(crate) config:      WorldConfig,
    pub(crate) clock:       FrameClock,
    pub(crate) schedulers:  SchedulerRegistry<TickTarget>,
    pub(crate) detectables: DetectableIndex,
    pub(crate) shapes:      ShapeIndex,
    pub(crate) store:       EntityStore,
    pub(crate) rngs:        AgentRngs,
    pub(crate) formations:  FormationRegistry,
    pub(crate) steering:    Vec<Option<SteeringSet>>,
    pub(crate) radars:      Vec<Option<Radar>>,
    tasks:                  Vec<AgentTasks>,
}

impl World {
    /// Create the radar queue, then the steering queue, so every pump
    /// refreshes radars before steering reads them.
    pub(crate) fn new(config: WorldConfig) -> Self {
        let mut schedulers = SchedulerRegistry::new();
        schedulers.get_or_create(&config.radar_queue);
        schedulers.get_or_create(&config.steering_queue);
        let rngs = AgentRngs::new(config.seed);
        Self {
            config,
            clock: FrameClock::new(),
            schedulers,
            detectables: DetectableIndex::new(),
            shapes: ShapeIndex::new(),
            store: EntityStore::new(),
            rngs,
            formations: FormationRegistry::new(),
            steering: Vec::new(),
            radars: Vec::new(),
            tasks: Vec::new(),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Time of the latest pump or step.
    pub fn now(&self) -> SimTime {
        self.clock.now
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.store.entity(id)
    }

    pub fn agent(&self, id: EntityId) -> Option<&Agent> {
        self.store.agent(id)
    }

    /// Mutable access for tuning (speed limits, locomotion, ...).  Use
    /// [`disable_agent`](Self::disable_agent) rather than toggling the
    /// entity's enabled flag here, or its tasks keep running.
    pub fn agent_mut(&mut self, id: EntityId) -> Option<&mut Agent> {
        self.store.agent_mut(id)
    }

    pub fn schedulers(&self) -> &SchedulerRegistry<TickTarget> {
        &self.schedulers
    }

    /// For pausing queues and installing fault handlers.
    pub fn schedulers_mut(&mut self) -> &mut SchedulerRegistry<TickTarget> {
        &mut self.schedulers
    }

    pub fn detectables(&self) -> &DetectableIndex {
        &self.detectables
    }

    pub fn formations(&self) -> &FormationRegistry {
        &self.formations
    }

    pub fn radar(&self, id: EntityId) -> Option<&Radar> {
        self.radars.get(id.index())?.as_ref()
    }

    pub fn steering(&self, id: EntityId) -> Option<&SteeringSet> {
        self.steering.get(id.index())?.as_ref()
    }

    /// For changing weights or enabling/disabling individual behaviors.
    pub fn steering_mut(&mut self, id: EntityId) -> Option<&mut SteeringSet> {
        self.steering.get_mut(id.index())?.as_mut()
    }

    // ── Spawning ──────────────────────────────────────────────────────────

    /// Add an agent and schedule its steering task on the queue named in
    /// its config, or the world's steering queue when it names none.  The
    /// queue's per-update cap is set from the same config.
    pub fn spawn_agent(&mut self, builder: AgentBuilder) -> WorldResult<EntityId> {
        let cfg = builder.config().clone();
        let name = cfg.queue_name.as_deref().unwrap_or(self.config.steering_queue.as_str());
        let queue = self.schedulers.get_or_create(name);
        self.schedulers
            .get_mut(queue)?
            .set_max_processed_per_update(cfg.max_processed_per_update);

        let id = self.store.insert_agent(builder);
        let now = self.clock.now;
        let agent = self.store.require_agent_mut(id)?;
        agent.reset_tick_clock(now);
        let shape = agent.entity.shape;
        let priority = agent.movement_priority;

        self.detectables.register(
            shape,
            Detectable { entity: id, kind: EntityKind::Agent, enabled: true },
        );
        self.rngs.ensure(id);

        let slot = TaskSlot { queue, tick_length: cfg.tick_length };
        slot_mut(&mut self.tasks, id).steering = Some(slot);
        self.schedulers
            .get_mut(queue)?
            .add(ticked(TickTarget::Steering(id), slot, priority, now));

        debug!(entity = %id, queue = %queue, priority, "agent spawned");
        Ok(id)
    }

    /// Add a static obstacle.
    pub fn spawn_obstacle(&mut self, position: Vec3, radius: f32, layer: LayerMask) -> EntityId {
        let id = self.store.insert_obstacle(position, radius, layer);
        if let Some(entity) = self.store.entity(id) {
            self.detectables.register(
                entity.shape,
                Detectable { entity: id, kind: EntityKind::Obstacle, enabled: true },
            );
        }
        debug!(entity = %id, radius, "obstacle spawned");
        id
    }

    /// Remove an entity with everything attached to it.  Its id is never
    /// handed out again.
    pub fn despawn(&mut self, id: EntityId) -> WorldResult<Body> {
        let shape = self.store.entity(id).ok_or(SteerError::EntityNotFound(id))?.shape;

        self.unschedule(id);
        if let Some(mut set) = self.steering.get_mut(id.index()).and_then(Option::take) {
            set.detach_all(id, &mut self.formations);
        }
        if let Some(radar) = self.radars.get_mut(id.index()) {
            *radar = None;
        }
        if let Some(tasks) = self.tasks.get_mut(id.index()) {
            *tasks = AgentTasks::default();
        }
        self.detectables.unregister(shape);
        self.rngs.release(id);

        let body = self.store.remove(id).ok_or(SteerError::EntityNotFound(id))?;
        debug!(entity = %id, "entity despawned");
        Ok(body)
    }

    // ── Steering ──────────────────────────────────────────────────────────

    pub fn attach_steering(&mut self, id: EntityId, behavior: impl Steering) -> WorldResult<SteeringHandle> {
        self.attach_steering_weighted(id, behavior, 1.0)
    }

    pub fn attach_steering_weighted(
        &mut self,
        id: EntityId,
        behavior: impl Steering,
        weight: f32,
    ) -> WorldResult<SteeringHandle> {
        self.store.require_agent(id)?;
        let mut boxed: Box<dyn Steering> = Box::new(behavior);
        boxed.on_attach(id, &mut self.formations);
        let set = slot_mut(&mut self.steering, id).get_or_insert_with(SteeringSet::new);
        Ok(set.add_boxed(boxed, weight))
    }

    /// Replace the agent's whole behavior set.  The previous set, if any,
    /// is detached and returned.
    pub fn set_steering(&mut self, id: EntityId, mut set: SteeringSet) -> WorldResult<Option<SteeringSet>> {
        self.store.require_agent(id)?;
        set.attach_all(id, &mut self.formations);
        let previous = slot_mut(&mut self.steering, id).replace(set);
        Ok(previous.map(|mut old| {
            old.detach_all(id, &mut self.formations);
            old
        }))
    }

    // ── Radar ─────────────────────────────────────────────────────────────

    /// Give the agent a radar refreshed on `config.queue_name`, or on the
    /// world's radar queue when it names none.  An existing radar is replaced
    /// along with its task.
    pub fn attach_radar(&mut self, id: EntityId, config: RadarConfig) -> WorldResult<()> {
        let agent = self.store.require_agent(id)?;
        let priority = agent.movement_priority;
        let enabled = agent.is_enabled();

        let name = config.queue_name.as_deref().unwrap_or(self.config.radar_queue.as_str());
        let queue = self.schedulers.get_or_create(name);
        self.schedulers
            .get_mut(queue)?
            .set_max_processed_per_update(config.max_processed_per_update);

        let slot = TaskSlot { queue, tick_length: config.tick_length };
        if let Some(old) = slot_mut(&mut self.tasks, id).radar.replace(slot) {
            self.schedulers.get_mut(old.queue)?.remove(&TickTarget::Radar(id));
        }
        if enabled {
            let now = self.clock.now;
            self.schedulers
                .get_mut(queue)?
                .add(ticked(TickTarget::Radar(id), slot, priority, now));
        }
        *slot_mut(&mut self.radars, id) = Some(Radar::new(config));
        debug!(entity = %id, queue = %queue, "radar attached");
        Ok(())
    }

    /// Drop the agent's radar and its task.
    pub fn detach_radar(&mut self, id: EntityId) -> Option<Radar> {
        let slot = self.tasks.get_mut(id.index())?.radar.take();
        if let Some(slot) = slot {
            if let Ok(scheduler) = self.schedulers.get_mut(slot.queue) {
                scheduler.remove(&TickTarget::Radar(id));
            }
        }
        self.radars.get_mut(id.index())?.take()
    }

    // ── Enable / disable ──────────────────────────────────────────────────

    /// Stop ticking the agent.  Radars keep detecting it, as an obstacle
    /// unless they are configured to detect disabled agents.
    pub fn disable_agent(&mut self, id: EntityId) -> WorldResult<()> {
        let agent = self.store.require_agent_mut(id)?;
        if !agent.is_enabled() {
            return Ok(());
        }
        agent.entity.set_enabled(false);
        let shape = agent.entity.shape;
        self.detectables.set_enabled(shape, false);
        self.unschedule(id);
        debug!(entity = %id, "agent disabled");
        Ok(())
    }

    /// Resume ticking.  The first steering delta is measured from now.
    pub fn enable_agent(&mut self, id: EntityId) -> WorldResult<()> {
        let now = self.clock.now;
        let agent = self.store.require_agent_mut(id)?;
        if agent.is_enabled() {
            return Ok(());
        }
        agent.entity.set_enabled(true);
        agent.reset_tick_clock(now);
        let shape = agent.entity.shape;
        let priority = agent.movement_priority;
        self.detectables.set_enabled(shape, true);

        let tasks = self.tasks.get(id.index()).copied().unwrap_or_default();
        if let Some(slot) = tasks.steering {
            self.schedulers
                .get_mut(slot.queue)?
                .add(ticked(TickTarget::Steering(id), slot, priority, now));
        }
        if let Some(slot) = tasks.radar {
            self.schedulers
                .get_mut(slot.queue)?
                .add(ticked(TickTarget::Radar(id), slot, priority, now));
        }
        debug!(entity = %id, "agent enabled");
        Ok(())
    }

    fn unschedule(&mut self, id: EntityId) {
        let Some(tasks) = self.tasks.get(id.index()).copied() else { return };
        let keyed = [
            (tasks.steering, TickTarget::Steering(id)),
            (tasks.radar, TickTarget::Radar(id)),
        ];
        for (slot, key) in keyed {
            let Some(slot) = slot else { continue };
            if let Ok(scheduler) = self.schedulers.get_mut(slot.queue) {
                scheduler.remove(&key);
            }
        }
    }

    // ── Pump ──────────────────────────────────────────────────────────────

    /// Update every queue once at `now`, in creation order.
    ///
    /// The spatial index is rebuilt from current positions first, so radar
    /// refreshes see where entities are after the last frame.  A task whose
    /// entity no longer exists faults with `EntityNotFound`.
    pub fn pump<O: WorldObserver>(&mut self, now: SimTime, observer: &mut O) -> PumpReport {
        if now > self.clock.now {
            self.clock.now = now;
        }

        let entries = self
            .store
            .entities()
            .map(|e| ShapeEntry::new(e.shape, e.position(), e.radius(), e.layer))
            .collect();
        self.shapes.rebuild(entries);

        let World {
            schedulers,
            detectables,
            shapes,
            store,
            rngs,
            formations,
            steering,
            radars,
            ..
        } = self;
        let (shapes, detectables, formations) = (&*shapes, &*detectables, &*formations);

        let report = schedulers.pump(now, |_, _, task| match task.key {
            TickTarget::Radar(id) => {
                let center = store.entity(id).ok_or(SteerError::EntityNotFound(id))?.position();
                let Some(radar) = radars.get_mut(id.index()).and_then(Option::as_mut) else {
                    return Ok(());
                };
                radar.refresh(now, id, center, shapes, detectables);
                observer.on_radar_refreshed(id, radar.agents().len(), radar.obstacles().len());
                Ok(())
            }
            TickTarget::Steering(id) => {
                if let Some((velocity, failed)) = run_steering(id, now, store, rngs, steering, radars, formations)? {
                    observer.on_steering_composed(id, velocity, failed);
                }
                Ok(())
            }
        });

        trace!(%now, processed = report.total.processed, faulted = report.total.faulted, "world pumped");
        observer.on_pump_end(now, &report);
        report
    }

    // ── Frame ─────────────────────────────────────────────────────────────

    /// Move every enabled agent by one host frame of `dt` seconds.  Returns
    /// how many agents were moved.
    pub fn frame<O: WorldObserver>(&mut self, dt: f32, observer: &mut O) -> usize {
        if dt.is_nan() || dt <= 0.0 {
            return 0;
        }
        let mut moved = 0;
        for agent in self.store.agents_mut() {
            if let Some(delta) = agent.frame(dt) {
                moved += 1;
                observer.on_agent_moved(agent.entity.id, delta, agent.position(), agent.forward());
            }
        }
        moved
    }

    /// Advance the frame clock by `dt`, pump at the new time, then move.
    pub fn step<O: WorldObserver>(&mut self, dt: f32, observer: &mut O) -> PumpReport {
        let now = self.clock.advance(dt);
        let report = self.pump(now, observer);
        self.frame(dt, observer);
        report
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("clock", &self.clock)
            .field("entities", &self.store.len())
            .field("schedulers", &self.schedulers.len())
            .field("formations", &self.formations.len())
            .finish()
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// One steering tick.  `Ok(None)` when the agent cannot move this tick,
/// otherwise the committed velocity and the failed-behavior count.
fn run_steering(
    id:         EntityId,
    now:        SimTime,
    store:      &mut EntityStore,
    rngs:       &mut AgentRngs,
    steering:   &mut [Option<SteeringSet>],
    radars:     &[Option<Radar>],
    formations: &FormationRegistry,
) -> Result<Option<(Vec3, u32)>, BoxError> {
    if !store.require_agent_mut(id)?.begin_tick(now) {
        return Ok(None);
    }

    let composition = match steering.get_mut(id.index()).and_then(Option::as_mut) {
        Some(set) if !set.is_empty() => {
            let rng = rngs.get_mut(id).ok_or(SteerError::EntityNotFound(id))?;
            let me = store.require_agent(id)?;
            let radar = radars.get(id.index()).and_then(Option::as_ref);
            let ctx = SteerContext::new(me, store, radar, formations);
            set.compose(&ctx, rng)
        }
        _ => Composition::default(),
    };

    let velocity = store
        .require_agent_mut(id)?
        .commit_forces(composition.raw, composition.adjusted);
    Ok(Some((velocity, composition.failed)))
}

fn ticked(key: TickTarget, slot: TaskSlot, priority: i32, now: SimTime) -> TickedTask<TickTarget> {
    TickedTask::new(key)
        .with_tick_length(slot.tick_length)
        .with_priority(priority)
        .starting_at(now)
}

/// The side-table entry for `id`, growing the table as needed.
fn slot_mut<T: Default>(table: &mut Vec<T>, id: EntityId) -> &mut T {
    let index = id.index();
    if table.len() <= index {
        table.resize_with(index + 1, T::default);
    }
    &mut table[index]
}
