//! `SchedulerRegistry`: named tick schedulers pumped in creation order.
//!
//! The registry is an ordinary value owned by the application root (the
//! `World` in `st-sim`), not global state.  Names are normalised (trimmed,
//! lower-cased, empty → [`DEFAULT_SCHEDULER`]) so `"Radar"`, `" radar "` and
//! `"RADAR"` all resolve to the same scheduler.

use std::fmt;

use st_core::SimTime;

use crate::fault::BoxError;
use crate::scheduler::{TaskKey, TickScheduler, UpdateReport};
use crate::task::TickedTask;
use crate::{Map, ScheduleError, ScheduleResult};

/// Name used when a caller asks for the empty name.
pub const DEFAULT_SCHEDULER: &str = "default";

/// Handle to a scheduler inside a [`SchedulerRegistry`].  Stable for the
/// registry's lifetime; the same name always yields the same id.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct SchedulerId(pub u32);

impl SchedulerId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SchedulerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SchedulerId({})", self.0)
    }
}

/// Totals from one [`SchedulerRegistry::pump`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PumpReport {
    pub total:         UpdateReport,
    /// Per scheduler, in pump order.
    pub per_scheduler: Vec<(SchedulerId, UpdateReport)>,
}

pub struct SchedulerRegistry<K: TaskKey> {
    schedulers: Vec<TickScheduler<K>>,
    by_name:    Map<String, SchedulerId>,
}

impl<K: TaskKey> Default for SchedulerRegistry<K> {
    fn default() -> Self {
        Self {
            schedulers: Vec::new(),
            by_name:    Map::default(),
        }
    }
}

impl<K: TaskKey> SchedulerRegistry<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical form of a scheduler name.
    pub fn normalize_name(name: &str) -> String {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            DEFAULT_SCHEDULER.to_owned()
        } else {
            trimmed.to_lowercase()
        }
    }

    /// The scheduler registered under `name`, created on first access.
    ///
    /// New schedulers are appended to the pump order.
    pub fn get_or_create(&mut self, name: &str) -> SchedulerId {
        let name = Self::normalize_name(name);
        if let Some(&id) = self.by_name.get(&name) {
            return id;
        }
        let id = SchedulerId(self.schedulers.len() as u32);
        tracing::debug!(scheduler = %name, %id, "scheduler created");
        self.schedulers.push(TickScheduler::new(name.clone()));
        self.by_name.insert(name, id);
        id
    }

    pub fn by_name(&self, name: &str) -> Option<SchedulerId> {
        self.by_name.get(&Self::normalize_name(name)).copied()
    }

    pub fn get(&self, id: SchedulerId) -> ScheduleResult<&TickScheduler<K>> {
        self.schedulers
            .get(id.index())
            .ok_or(ScheduleError::UnknownScheduler(id.0))
    }

    pub fn get_mut(&mut self, id: SchedulerId) -> ScheduleResult<&mut TickScheduler<K>> {
        self.schedulers
            .get_mut(id.index())
            .ok_or(ScheduleError::UnknownScheduler(id.0))
    }

    /// Scheduler names in pump order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.schedulers.iter().map(|s| s.name())
    }

    pub fn len(&self) -> usize {
        self.schedulers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schedulers.is_empty()
    }

    /// Update every scheduler once at `now`, in creation order.
    ///
    /// `handler` also receives the id of the scheduler being updated, so one
    /// closure can serve all of them.
    pub fn pump<F>(&mut self, now: SimTime, mut handler: F) -> PumpReport
    where
        F: FnMut(SchedulerId, &mut TickScheduler<K>, &TickedTask<K>) -> Result<(), BoxError>,
    {
        let mut report = PumpReport::default();
        for (i, scheduler) in self.schedulers.iter_mut().enumerate() {
            let id = SchedulerId(i as u32);
            let update = scheduler.update(now, |s, task| handler(id, s, task));
            report.total.merge(update);
            report.per_scheduler.push((id, update));
        }
        report
    }
}
