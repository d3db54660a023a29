//! Simulation time model.
//!
//! # Design
//!
//! Ticked tasks run on an absolute clock measured in seconds, independent of
//! the host's frame rate.  `SimTime` wraps that clock as an `f64` so it can
//! grow for hours without losing the millisecond resolution tick lengths
//! need, while per-frame deltas and tick lengths stay `f32` to match the
//! vector math.
//!
//! `SimTime` is totally ordered (via `f64::total_cmp`) so it can key a
//! binary heap directly.

use std::cmp::Ordering;
use std::fmt;

// ── SimTime ───────────────────────────────────────────────────────────────────

/// An absolute point on the simulation clock, in seconds.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(pub f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);

    #[inline]
    pub fn from_secs(secs: f64) -> SimTime {
        SimTime(secs)
    }

    #[inline]
    pub fn as_secs(self) -> f64 {
        self.0
    }

    /// The time `secs` seconds after `self`.
    #[inline]
    pub fn offset(self, secs: f32) -> SimTime {
        SimTime(self.0 + secs as f64)
    }

    /// Seconds elapsed from `earlier` to `self`.  Negative if `earlier` is
    /// actually later.
    #[inline]
    pub fn since(self, earlier: SimTime) -> f32 {
        (self.0 - earlier.0) as f32
    }
}

impl PartialEq for SimTime {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::ops::Add<f32> for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, rhs: f32) -> SimTime {
        self.offset(rhs)
    }
}

impl std::ops::Sub for SimTime {
    type Output = f32;
    #[inline]
    fn sub(self, rhs: SimTime) -> f32 {
        self.since(rhs)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={:.3}s", self.0)
    }
}

// ── FrameClock ────────────────────────────────────────────────────────────────

/// Accumulates host frame deltas into an absolute `SimTime`.
///
/// The host calls [`FrameClock::advance`] once per frame and feeds the
/// returned time to the scheduler pump, which requires `now` to be
/// monotonically non-decreasing.  Negative deltas are ignored for that reason.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameClock {
    pub now:   SimTime,
    pub frame: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one frame of `dt` seconds and return the new time.
    #[inline]
    pub fn advance(&mut self, dt: f32) -> SimTime {
        self.now = self.now.offset(dt.max(0.0));
        self.frame += 1;
        self.now
    }
}

impl fmt::Display for FrameClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame {} ({})", self.frame, self.now)
    }
}
