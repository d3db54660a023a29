//! `DetectableIndex`: what a detected shape belongs to.
//!
//! Keyed by the stable [`ShapeId`] the spatial query hands back.  Each record
//! carries the entity's [`EntityKind`] tag, fixed at registration, and an
//! `enabled` flag that disable/enable toggles without unregistering.

use st_core::{EntityId, EntityKind, ShapeId};

use crate::Map;

/// Registration record for one detectable shape.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Detectable {
    pub entity:  EntityId,
    pub kind:    EntityKind,
    pub enabled: bool,
}

#[derive(Default, Debug)]
pub struct DetectableIndex {
    entries: Map<ShapeId, Detectable>,
}

impl DetectableIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `record` under `shape`.  Last writer wins: a previous record
    /// for the same shape is replaced and returned.
    pub fn register(&mut self, shape: ShapeId, record: Detectable) -> Option<Detectable> {
        let displaced = self.entries.insert(shape, record);
        if let Some(old) = displaced {
            if old.entity != record.entity {
                tracing::debug!(%shape, old = %old.entity, new = %record.entity, "detectable shape re-registered");
            }
        }
        displaced
    }

    /// Remove `shape`.  No-op (returns `false`) if it is not registered.
    pub fn unregister(&mut self, shape: ShapeId) -> bool {
        self.entries.remove(&shape).is_some()
    }

    pub fn lookup(&self, shape: ShapeId) -> Option<&Detectable> {
        self.entries.get(&shape)
    }

    /// Flip the enabled flag of a registered shape.  Returns `false` if the
    /// shape is unknown.
    pub fn set_enabled(&mut self, shape: ShapeId, enabled: bool) -> bool {
        match self.entries.get_mut(&shape) {
            Some(record) => {
                record.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
