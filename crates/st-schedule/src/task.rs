//! `TickedTask`: one periodic unit of work.

use st_core::SimTime;

/// A periodic task identified by `key`.
///
/// The scheduler never stores a callback: the pump's handler receives the
/// task and dispatches on `key` (e.g. "refresh radar of entity 4").
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TickedTask<K> {
    pub key:                K,
    /// Seconds between firings.  `0.0` fires on every pump.
    pub tick_length:        f32,
    /// Tie-breaker among tasks due at the same time; lower runs first.
    pub priority:           i32,
    pub next_tick_time:     SimTime,
    pub previous_tick_time: SimTime,
}

impl<K> TickedTask<K> {
    /// A task due immediately, firing every pump.
    pub fn new(key: K) -> Self {
        Self {
            key,
            tick_length:        0.0,
            priority:           0,
            next_tick_time:     SimTime::ZERO,
            previous_tick_time: SimTime::ZERO,
        }
    }

    /// Negative and NaN lengths are clamped to `0.0`.
    pub fn with_tick_length(mut self, secs: f32) -> Self {
        self.tick_length = sanitize_tick_length(secs);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// First eligible time.  Also used as the initial `previous_tick_time` so
    /// the first delta measured by the owner starts from here.
    pub fn starting_at(mut self, at: SimTime) -> Self {
        self.next_tick_time = at;
        self.previous_tick_time = at;
        self
    }

    #[inline]
    pub fn is_due(&self, now: SimTime) -> bool {
        now >= self.next_tick_time
    }

    /// Record a firing at `now`; the next one is `tick_length` after it.
    pub(crate) fn mark_fired(&mut self, now: SimTime) {
        self.previous_tick_time = now;
        self.next_tick_time = now + self.tick_length;
    }
}

pub(crate) fn sanitize_tick_length(secs: f32) -> f32 {
    if secs.is_nan() { 0.0 } else { secs.max(0.0) }
}
