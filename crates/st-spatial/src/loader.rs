//! CSV pathway loader.
//!
//! # CSV format
//!
//! One row per waypoint, in path order.  All rows of the same path should
//! share `radius` and `cyclic`; the first row's values are used.
//!
//! ```csv
//! path,x,y,z,radius,cyclic
//! patrol,0,0,0,1,true
//! patrol,10,0,0,1,true
//! patrol,10,0,10,1,true
//! road,0,0,0,2,false
//! road,50,0,0,2,false
//! ```
//!
//! Paths with fewer than two rows are rejected with the path's name in the
//! error.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use glam::Vec3;
use serde::Deserialize;

use crate::{PathWay, SpatialError};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct WaypointRecord {
    path:   String,
    x:      f32,
    y:      f32,
    z:      f32,
    radius: f32,
    cyclic: bool,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load named pathways from a CSV file, keyed by path name.
pub fn load_paths_csv(path: &Path) -> Result<BTreeMap<String, PathWay>, SpatialError> {
    let file = std::fs::File::open(path).map_err(SpatialError::Io)?;
    load_paths_reader(file)
}

/// Like [`load_paths_csv`] but accepts any `Read` source.
pub fn load_paths_reader<R: Read>(reader: R) -> Result<BTreeMap<String, PathWay>, SpatialError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut by_path: BTreeMap<String, Vec<WaypointRecord>> = BTreeMap::new();

    for result in csv_reader.deserialize::<WaypointRecord>() {
        let row = result.map_err(|e| SpatialError::Parse(e.to_string()))?;
        by_path.entry(row.path.trim().to_owned()).or_default().push(row);
    }

    let mut paths = BTreeMap::new();
    for (name, rows) in by_path {
        let radius = rows[0].radius;
        let cyclic = rows[0].cyclic;
        let points: Vec<Vec3> = rows.iter().map(|r| Vec3::new(r.x, r.y, r.z)).collect();
        let pathway = PathWay::new(points, radius, cyclic)
            .map_err(|e| SpatialError::InvalidPath(name.clone(), Box::new(e)))?;
        tracing::debug!(path = %name, points = pathway.waypoints().len(), length = pathway.total_length(), "pathway loaded");
        paths.insert(name, pathway);
    }
    Ok(paths)
}
