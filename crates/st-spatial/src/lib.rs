//! `st-spatial`: detection, proximity queries, and pathways.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                  |
//! |----------------|-----------------------------------------------------------|
//! | [`detectable`] | `DetectableIndex` (shape id → entity, kind, enabled)      |
//! | [`query`]      | `SpatialQuery` trait, `ShapeIndex` (R-tree of spheres)    |
//! | [`radar`]      | `Radar`, `RadarConfig`                                    |
//! | [`path`]       | `PathWay`, `PathProjection`                               |
//! | [`loader`]     | `load_paths_csv`, `load_paths_reader`                     |
//! | [`error`]      | `SpatialError`, `SpatialResult<T>`                        |
//!
//! # Detection model (summary)
//!
//! ```text
//! radar.refresh(center):
//!   shapes   = query.query_sphere(center, radius, layers)
//!   for shape in shapes:
//!       d = index.lookup(shape)      // unknown → skip
//!       d.entity == owner            → skip
//!       d.kind == Agent and (d.enabled or detect_disabled) → agents
//!       otherwise                                          → obstacles
//! ```
//!
//! Both output lists are cleared first, so nothing survives from the previous
//! refresh.

pub mod detectable;
pub mod error;
pub mod loader;
pub mod path;
pub mod query;
pub mod radar;

#[cfg(test)]
mod tests;

pub use detectable::{Detectable, DetectableIndex};
pub use error::{SpatialError, SpatialResult};
pub use loader::{load_paths_csv, load_paths_reader};
pub use path::{PathProjection, PathWay};
pub use query::{ShapeEntry, ShapeIndex, SpatialQuery};
pub use radar::{Radar, RadarConfig};

#[cfg(feature = "fx-hash")]
pub(crate) type Map<K, V> = rustc_hash::FxHashMap<K, V>;
#[cfg(not(feature = "fx-hash"))]
pub(crate) type Map<K, V> = std::collections::HashMap<K, V>;
