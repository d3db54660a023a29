//! Entity classification recorded at registration time.

use std::fmt;

/// What an entity is, as far as detection is concerned.
///
/// Radars use this tag instead of inspecting the entity: an `Agent` lands in
/// the neighbor list, an `Obstacle` in the obstacle list.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntityKind {
    /// A steerable, moving agent.
    Agent,
    /// A static obstacle with a bounding sphere.
    Obstacle,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Agent => write!(f, "agent"),
            EntityKind::Obstacle => write!(f, "obstacle"),
        }
    }
}

// ── LayerMask ─────────────────────────────────────────────────────────────────

/// Bitmask of detection layers (up to 32).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    /// Mask containing only layer `n` (0..32).  Out-of-range layers map to
    /// the empty mask.
    #[inline]
    pub fn layer(n: u32) -> LayerMask {
        LayerMask(1u32.checked_shl(n).unwrap_or(0))
    }

    #[inline]
    pub fn intersects(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub fn with(self, other: LayerMask) -> LayerMask {
        LayerMask(self.0 | other.0)
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        // Everything sits on layer 0 unless told otherwise.
        LayerMask::layer(0)
    }
}
