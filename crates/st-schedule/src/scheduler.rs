//! `TickScheduler`: priority-ordered, time-sliced queue of periodic tasks.
//!
//! # Ordering
//!
//! Tasks are popped in ascending `(next_tick_time, priority, seq)` order,
//! where `seq` is a monotonically increasing enqueue counter.  Equal due
//! times therefore run lowest priority value first and FIFO after that.
//!
//! # Mutation during `update`
//!
//! The handler receives `&mut TickScheduler` and may add or remove any task,
//! including the one currently running.  Removal is immediate: the task's
//! slot is dropped and its heap entry goes stale.  Every slot carries a
//! generation number and every heap entry records the generation it was
//! pushed with, so a stale entry (removed, or removed and re-added) is
//! recognised and discarded when it reaches the top.  Fired tasks and tasks
//! added mid-update are parked in a deferred list and only pushed back onto
//! the heap once the loop ends.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::hash::Hash;
use std::panic::{self, AssertUnwindSafe};

use st_core::SimTime;

use crate::fault::{BoxError, FaultHandler, LogFaults, TaskFault};
use crate::task::{sanitize_tick_length, TickedTask};
use crate::{Map, ScheduleError, ScheduleResult};

/// Bound required of task keys.
pub trait TaskKey: Copy + Eq + Hash + fmt::Debug + 'static {}

impl<T> TaskKey for T where T: Copy + Eq + Hash + fmt::Debug + 'static {}

// ── Heap entry ────────────────────────────────────────────────────────────────

struct HeapEntry<K> {
    due:        SimTime,
    priority:   i32,
    seq:        u64,
    generation: u64,
    key:        K,
}

impl<K> HeapEntry<K> {
    #[inline]
    fn rank(&self) -> (SimTime, i32, u64) {
        (self.due, self.priority, self.seq)
    }
}

impl<K> PartialEq for HeapEntry<K> {
    fn eq(&self, other: &Self) -> bool {
        self.rank() == other.rank()
    }
}

impl<K> Eq for HeapEntry<K> {}

impl<K> PartialOrd for HeapEntry<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for HeapEntry<K> {
    // Reversed: `BinaryHeap` is a max-heap and we want the earliest on top.
    fn cmp(&self, other: &Self) -> Ordering {
        other.rank().cmp(&self.rank())
    }
}

struct Slot<K> {
    task:       TickedTask<K>,
    generation: u64,
    seq:        u64,
}

// ── UpdateReport ──────────────────────────────────────────────────────────────

/// What one `update` call did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Handler invocations, faulted ones included.
    pub processed:     usize,
    pub faulted:       usize,
    /// Heap entries discarded because their task was removed or re-added.
    pub stale_dropped: usize,
}

impl UpdateReport {
    pub fn merge(&mut self, other: UpdateReport) {
        self.processed += other.processed;
        self.faulted += other.faulted;
        self.stale_dropped += other.stale_dropped;
    }
}

// ── TickScheduler ─────────────────────────────────────────────────────────────

pub struct TickScheduler<K: TaskKey> {
    name:                     String,
    tasks:                    Map<K, Slot<K>>,
    heap:                     BinaryHeap<HeapEntry<K>>,
    deferred:                 Vec<(K, u64)>,
    updating:                 bool,
    next_seq:                 u64,
    next_generation:          u64,
    max_processed_per_update: i32,
    paused:                   bool,
    faults:                   Box<dyn FaultHandler<K>>,
}

impl<K: TaskKey> TickScheduler<K> {
    /// An empty, unpaused scheduler with no per-update cap that logs faults.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name:                     name.into(),
            tasks:                    Map::default(),
            heap:                     BinaryHeap::new(),
            deferred:                 Vec::new(),
            updating:                 false,
            next_seq:                 0,
            next_generation:          0,
            max_processed_per_update: 0,
            paused:                   false,
            faults:                   Box::new(LogFaults),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // ── Configuration ─────────────────────────────────────────────────────

    pub fn max_processed_per_update(&self) -> i32 {
        self.max_processed_per_update
    }

    /// Cap on handler invocations per `update`.  `<= 0` means unlimited.
    pub fn set_max_processed_per_update(&mut self, max: i32) {
        self.max_processed_per_update = max;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// While paused, `update` does nothing; tasks keep their due times.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn set_fault_handler(&mut self, handler: impl FaultHandler<K>) {
        self.faults = Box::new(handler);
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.tasks.contains_key(key)
    }

    pub fn task(&self, key: &K) -> Option<&TickedTask<K>> {
        self.tasks.get(key).map(|slot| &slot.task)
    }

    /// Earliest due time among scheduled tasks.
    pub fn next_due_time(&self) -> Option<SimTime> {
        self.tasks.values().map(|slot| slot.task.next_tick_time).min()
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Schedule `task`.  Returns `false` (and changes nothing) if a task with
    /// the same key is already scheduled.
    pub fn add(&mut self, mut task: TickedTask<K>) -> bool {
        if self.tasks.contains_key(&task.key) {
            return false;
        }
        let key = task.key;
        task.tick_length = sanitize_tick_length(task.tick_length);
        let generation = self.next_generation;
        self.next_generation += 1;
        self.tasks.insert(key, Slot { task, generation, seq: 0 });
        if self.updating {
            self.deferred.push((key, generation));
        } else {
            self.enqueue(key);
        }
        tracing::trace!(scheduler = %self.name, task = ?key, "task added");
        true
    }

    /// Unschedule the task with `key`.  Effective immediately, even from
    /// inside a handler.  Returns whether a task was removed.
    pub fn remove(&mut self, key: &K) -> bool {
        let removed = self.tasks.remove(key).is_some();
        if removed {
            tracing::trace!(scheduler = %self.name, task = ?key, "task removed");
        }
        removed
    }

    /// Change a scheduled task's tick length.  Takes effect from its next
    /// firing; the current due time is left alone.
    pub fn set_tick_length(&mut self, key: &K, secs: f32) -> ScheduleResult<()> {
        match self.tasks.get_mut(key) {
            Some(slot) => {
                slot.task.tick_length = sanitize_tick_length(secs);
                Ok(())
            }
            None => Err(ScheduleError::UnknownTask(format!("{key:?}"), self.name.clone())),
        }
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
        self.heap.clear();
        self.deferred.clear();
    }

    // ── Update ────────────────────────────────────────────────────────────

    /// Run every task due at `now`, in order, up to the per-update cap.
    ///
    /// Each task fires at most once per call.  A handler error is reported
    /// to the fault handler; the task still counts as processed and is
    /// rescheduled normally.  Calling `update` from inside a handler is a
    /// no-op.  A panicking handler is rethrown after the scheduler has been
    /// restored, so a host that catches the unwind can keep updating; the
    /// panicking task counts as fired.
    pub fn update<F>(&mut self, now: SimTime, mut handler: F) -> UpdateReport
    where
        F: FnMut(&mut TickScheduler<K>, &TickedTask<K>) -> Result<(), BoxError>,
    {
        let mut report = UpdateReport::default();
        if self.paused || self.updating {
            return report;
        }

        let cap = if self.max_processed_per_update <= 0 {
            usize::MAX
        } else {
            self.max_processed_per_update as usize
        };

        self.updating = true;
        let mut in_flight = None;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.drain(now, cap, &mut handler, &mut report, &mut in_flight)
        }));
        self.updating = false;
        if let Err(payload) = outcome {
            if let Some((key, generation)) = in_flight {
                self.reschedule_if_live(key, generation, now);
            }
            self.flush_deferred();
            tracing::warn!(scheduler = %self.name, now = now.as_secs(), "task handler panicked");
            panic::resume_unwind(payload);
        }
        self.flush_deferred();

        if report.processed > 0 {
            tracing::trace!(
                scheduler = %self.name,
                now = now.as_secs(),
                processed = report.processed,
                faulted = report.faulted,
                "scheduler updated"
            );
        }
        report
    }

    // ── Internals ─────────────────────────────────────────────────────────

    /// The update loop proper.  `in_flight` holds the entry whose handler is
    /// running so a panic can still reschedule it.
    fn drain<F>(
        &mut self,
        now: SimTime,
        cap: usize,
        handler: &mut F,
        report: &mut UpdateReport,
        in_flight: &mut Option<(K, u64)>,
    ) where
        F: FnMut(&mut TickScheduler<K>, &TickedTask<K>) -> Result<(), BoxError>,
    {
        while report.processed < cap {
            match self.heap.peek() {
                Some(top) if top.due <= now => {}
                _ => break,
            }
            let Some(entry) = self.heap.pop() else { break };
            let Some(task) = self.live_task(&entry) else {
                report.stale_dropped += 1;
                continue;
            };

            *in_flight = Some((entry.key, entry.generation));
            let result = handler(self, &task);
            *in_flight = None;
            if let Err(source) = result {
                report.faulted += 1;
                self.faults.on_fault(TaskFault {
                    scheduler: self.name.clone(),
                    key: task.key,
                    at: now,
                    source,
                });
            }
            report.processed += 1;
            self.reschedule_if_live(entry.key, entry.generation, now);
        }
    }

    /// Park a fired task for re-pushing, unless the handler removed or
    /// replaced it.
    fn reschedule_if_live(&mut self, key: K, generation: u64, now: SimTime) {
        if let Some(slot) = self.tasks.get_mut(&key) {
            if slot.generation == generation {
                slot.task.mark_fired(now);
                self.deferred.push((key, generation));
            }
        }
    }

    fn live_task(&self, entry: &HeapEntry<K>) -> Option<TickedTask<K>> {
        self.tasks
            .get(&entry.key)
            .filter(|slot| slot.generation == entry.generation)
            .map(|slot| slot.task)
    }

    fn enqueue(&mut self, key: K) {
        if let Some(slot) = self.tasks.get_mut(&key) {
            slot.seq = self.next_seq;
            self.next_seq += 1;
            self.heap.push(HeapEntry {
                due:        slot.task.next_tick_time,
                priority:   slot.task.priority,
                seq:        slot.seq,
                generation: slot.generation,
                key,
            });
        }
    }

    fn flush_deferred(&mut self) {
        let deferred = std::mem::take(&mut self.deferred);
        for (key, generation) in deferred {
            let live = self.tasks.get(&key).is_some_and(|slot| slot.generation == generation);
            if live {
                self.enqueue(key);
            }
        }
        self.compact_if_needed();
    }

    /// Rebuild the heap from live slots once stale entries dominate it.
    fn compact_if_needed(&mut self) {
        if self.heap.len() <= 2 * self.tasks.len() + 32 {
            return;
        }
        let before = self.heap.len();
        self.heap = self
            .tasks
            .iter()
            .map(|(key, slot)| HeapEntry {
                due:        slot.task.next_tick_time,
                priority:   slot.task.priority,
                seq:        slot.seq,
                generation: slot.generation,
                key:        *key,
            })
            .collect();
        tracing::trace!(scheduler = %self.name, before, after = self.heap.len(), "heap compacted");
    }
}

impl<K: TaskKey> fmt::Debug for TickScheduler<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickScheduler")
            .field("name", &self.name)
            .field("tasks", &self.tasks.len())
            .field("max_processed_per_update", &self.max_processed_per_update)
            .field("paused", &self.paused)
            .finish()
    }
}
