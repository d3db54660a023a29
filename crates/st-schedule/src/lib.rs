//! `st-schedule`: periodic tasks, the tick scheduler, and named registries.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`task`]      | `TickedTask` (tick length, priority, due times)           |
//! | [`scheduler`] | `TickScheduler` (min-heap, per-update cap, lazy deletion) |
//! | [`registry`]  | `SchedulerRegistry`, `SchedulerId`                        |
//! | [`fault`]     | `TaskFault`, `FaultHandler`, `LogFaults`                  |
//! | [`error`]     | `ScheduleError`, `ScheduleResult<T>`                      |
//!
//! # Update model (summary)
//!
//! ```text
//! update(now):
//!   while heap.top.due <= now and processed < cap:
//!       pop; drop if stale (removed / re-added since the push)
//!       handler(scheduler, task)         // may add/remove any task
//!       task.previous = now
//!       task.next     = now + tick_length
//!       defer the re-push until the loop ends
//! ```
//!
//! Deferring re-pushes is what guarantees a task fires at most once per
//! `update`, even with `tick_length == 0`.

pub mod error;
pub mod fault;
pub mod registry;
pub mod scheduler;
pub mod task;


pub use error::{ScheduleError, ScheduleResult};
pub use fault::{BoxError, FaultHandler, LogFaults, TaskFault};
pub use registry::{PumpReport, SchedulerId, SchedulerRegistry, DEFAULT_SCHEDULER};
pub use scheduler::{TaskKey, TickScheduler, UpdateReport};
pub use task::TickedTask;

#[cfg(feature = "fx-hash")]
pub(crate) type Map<K, V> = rustc_hash::FxHashMap<K, V>;
#[cfg(not(feature = "fx-hash"))]
pub(crate) type Map<K, V> = std::collections::HashMap<K, V>;
