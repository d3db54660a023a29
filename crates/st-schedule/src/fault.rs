//! Task fault reporting.
//!
//! A handler that returns `Err` does not stop the update: the scheduler wraps
//! the error in a [`TaskFault`] and hands it to the scheduler's
//! [`FaultHandler`], then carries on with the next due task.

use std::fmt;

use st_core::SimTime;

/// Error type task handlers may return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A failed task invocation.
#[derive(Debug)]
pub struct TaskFault<K> {
    pub scheduler: String,
    pub key:       K,
    pub at:        SimTime,
    pub source:    BoxError,
}

impl<K: fmt::Debug> fmt::Display for TaskFault<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "task {:?} on scheduler '{}' failed at {}: {}",
            self.key, self.scheduler, self.at, self.source
        )
    }
}

impl<K: fmt::Debug> std::error::Error for TaskFault<K> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

// ── Trait ─────────────────────────────────────────────────────────────────────

/// Receives every task fault raised during `update`.
///
/// Any `FnMut(TaskFault<K>)` closure is a handler, which keeps tests short:
///
/// ```ignore
/// scheduler.set_fault_handler(move |fault| seen.borrow_mut().push(fault.key));
/// ```
pub trait FaultHandler<K>: 'static {
    fn on_fault(&mut self, fault: TaskFault<K>);
}

impl<K, F> FaultHandler<K> for F
where
    F: FnMut(TaskFault<K>) + 'static,
{
    fn on_fault(&mut self, fault: TaskFault<K>) {
        self(fault)
    }
}

// ── Default ───────────────────────────────────────────────────────────────────

/// Logs each fault at `warn` level and continues.
#[derive(Copy, Clone, Debug, Default)]
pub struct LogFaults;

impl<K: fmt::Debug> FaultHandler<K> for LogFaults {
    fn on_fault(&mut self, fault: TaskFault<K>) {
        tracing::warn!(
            scheduler = %fault.scheduler,
            task = ?fault.key,
            at = fault.at.as_secs(),
            error = %fault.source,
            "ticked task failed"
        );
    }
}
