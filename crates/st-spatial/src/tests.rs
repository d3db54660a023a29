//! Unit tests for st-spatial.

use glam::Vec3;

use st_core::{EntityId, EntityKind, LayerMask, ShapeId, SimTime};

use crate::{Detectable, DetectableIndex, PathWay, ShapeEntry, ShapeIndex};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn agent(id: u32) -> Detectable {
    Detectable { entity: EntityId(id), kind: EntityKind::Agent, enabled: true }
}

fn obstacle(id: u32) -> Detectable {
    Detectable { entity: EntityId(id), kind: EntityKind::Obstacle, enabled: true }
}

fn sphere(shape: u32, x: f32, radius: f32) -> ShapeEntry {
    ShapeEntry::new(ShapeId(shape), Vec3::new(x, 0.0, 0.0), radius, LayerMask::default())
}

fn line_path() -> PathWay {
    PathWay::new(
        vec![Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), Vec3::new(20.0, 0.0, 0.0)],
        1.0,
        false,
    )
    .unwrap()
}

fn square_loop() -> PathWay {
    PathWay::new(
        vec![
            Vec3::ZERO,
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 10.0),
            Vec3::new(0.0, 0.0, 10.0),
        ],
        1.0,
        true,
    )
    .unwrap()
}

fn close(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-3
}

// ── DetectableIndex ───────────────────────────────────────────────────────────

#[cfg(test)]
mod detectable {
    use super::*;

    #[test]
    fn last_writer_wins() {
        let mut index = DetectableIndex::new();
        assert!(index.register(ShapeId(1), agent(1)).is_none());
        let displaced = index.register(ShapeId(1), obstacle(9));
        assert_eq!(displaced, Some(agent(1)));
        assert_eq!(index.lookup(ShapeId(1)).map(|d| d.entity), Some(EntityId(9)));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn unregister_absent_is_noop() {
        let mut index = DetectableIndex::new();
        assert!(!index.unregister(ShapeId(5)));
        index.register(ShapeId(5), agent(5));
        assert!(index.unregister(ShapeId(5)));
        assert!(index.is_empty());
    }

    #[test]
    fn set_enabled_toggles_flag() {
        let mut index = DetectableIndex::new();
        index.register(ShapeId(2), agent(2));
        assert!(index.set_enabled(ShapeId(2), false));
        assert_eq!(index.lookup(ShapeId(2)).map(|d| d.enabled), Some(false));
        assert!(!index.set_enabled(ShapeId(3), false));
    }
}

// ── ShapeIndex ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod query {
    use super::*;
    use crate::SpatialQuery;

    #[test]
    fn sphere_query_counts_surface_overlap() {
        let index = ShapeIndex::bulk_load(vec![
            sphere(1, 3.0, 0.5),
            // Centre at 6 is outside radius 5, but its surface reaches 4.
            sphere(2, 6.0, 2.0),
            sphere(3, 9.0, 1.0),
        ]);
        let mut out = Vec::new();
        index.query_sphere(Vec3::ZERO, 5.0, LayerMask::ALL, &mut out);
        out.sort();
        assert_eq!(out, vec![ShapeId(1), ShapeId(2)]);
    }

    #[test]
    fn layer_mask_filters() {
        let mut index = ShapeIndex::new();
        index.insert(ShapeEntry::new(ShapeId(1), Vec3::ZERO, 1.0, LayerMask::layer(1)));
        index.insert(ShapeEntry::new(ShapeId(2), Vec3::ZERO, 1.0, LayerMask::layer(2)));
        let mut out = Vec::new();
        index.query_sphere(Vec3::ZERO, 1.0, LayerMask::layer(2), &mut out);
        assert_eq!(out, vec![ShapeId(2)]);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn rebuild_replaces_contents() {
        let mut index = ShapeIndex::bulk_load(vec![sphere(1, 0.0, 1.0)]);
        index.rebuild(vec![sphere(7, 100.0, 1.0)]);
        let mut out = Vec::new();
        index.query_sphere(Vec3::ZERO, 5.0, LayerMask::ALL, &mut out);
        assert!(out.is_empty());
        assert_eq!(index.len(), 1);
    }
}

// ── Radar ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod radar {
    use super::*;
    use crate::{Radar, RadarConfig};

    /// Owner (shape 0) at the origin with two agents, an obstacle, a disabled
    /// agent and an unregistered shape around it.
    fn scene() -> (ShapeIndex, DetectableIndex) {
        let shapes = ShapeIndex::bulk_load(vec![
            sphere(0, 0.0, 0.5),
            sphere(1, 1.0, 0.5),
            sphere(2, 2.0, 0.5),
            sphere(3, 3.0, 0.5),
            sphere(4, 4.0, 0.5),
            sphere(5, 4.5, 0.5),
            sphere(6, 50.0, 0.5),
        ]);
        let mut index = DetectableIndex::new();
        index.register(ShapeId(0), agent(0));
        index.register(ShapeId(1), agent(1));
        index.register(ShapeId(2), agent(2));
        index.register(ShapeId(3), obstacle(3));
        index.register(ShapeId(4), Detectable { enabled: false, ..agent(4) });
        // shape 5 was destroyed: present in the query structure, absent here
        index.register(ShapeId(6), agent(6));
        (shapes, index)
    }

    fn sorted(ids: &[EntityId]) -> Vec<u32> {
        let mut v: Vec<u32> = ids.iter().map(|id| id.0).collect();
        v.sort();
        v
    }

    #[test]
    fn classifies_and_skips_self_and_unknown() {
        let (shapes, index) = scene();
        let mut radar = Radar::default();
        let kept = radar.refresh(SimTime(1.0), EntityId(0), Vec3::ZERO, &shapes, &index);
        assert_eq!(sorted(radar.agents()), vec![1, 2]);
        assert_eq!(sorted(radar.obstacles()), vec![3, 4]);
        assert_eq!(kept, 4);
        assert_eq!(radar.last_refresh(), Some(SimTime(1.0)));
    }

    #[test]
    fn detect_disabled_reports_disabled_agents_as_agents() {
        let (shapes, index) = scene();
        let mut radar = Radar::new(RadarConfig { detect_disabled: true, ..RadarConfig::default() });
        radar.refresh(SimTime(0.0), EntityId(0), Vec3::ZERO, &shapes, &index);
        assert_eq!(sorted(radar.agents()), vec![1, 2, 4]);
        assert_eq!(sorted(radar.obstacles()), vec![3]);
    }

    #[test]
    fn refresh_overwrites_previous_lists() {
        let (shapes, mut index) = scene();
        let mut radar = Radar::default();
        radar.refresh(SimTime(0.0), EntityId(0), Vec3::ZERO, &shapes, &index);
        index.unregister(ShapeId(1));
        index.unregister(ShapeId(3));
        radar.refresh(SimTime(0.5), EntityId(0), Vec3::ZERO, &shapes, &index);
        assert_eq!(sorted(radar.agents()), vec![2]);
        assert_eq!(sorted(radar.obstacles()), vec![4]);
    }

    #[test]
    fn radius_limits_detection() {
        let (shapes, index) = scene();
        let mut radar = Radar::default();
        radar.set_detection_radius(1.6);
        radar.refresh(SimTime(0.0), EntityId(0), Vec3::ZERO, &shapes, &index);
        assert_eq!(sorted(radar.agents()), vec![1, 2]);
        assert!(radar.obstacles().is_empty());
    }

    #[test]
    fn defaults() {
        let cfg = RadarConfig::default();
        assert_eq!(cfg.detection_radius, 5.0);
        assert_eq!(cfg.tick_length, 0.5);
        assert_eq!(cfg.max_processed_per_update, 20);
        assert_eq!(cfg.preallocate, 30);
        assert!(!cfg.detect_disabled);
    }
}

// ── PathWay ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod path {
    use super::*;
    use crate::SpatialError;

    #[test]
    fn needs_two_points() {
        assert!(matches!(
            PathWay::new(vec![Vec3::ZERO], 1.0, false),
            Err(SpatialError::TooFewPoints(1))
        ));
    }

    #[test]
    fn derived_lengths() {
        let path = line_path();
        assert_eq!(path.total_length(), 20.0);
        assert_eq!(path.segment_count(), 2);
        let looped = square_loop();
        assert_eq!(looped.total_length(), 40.0);
        assert_eq!(looped.points().len(), 5);
        assert_eq!(looped.waypoints().len(), 4);
    }

    #[test]
    fn map_point_to_path_on_colinear_line() {
        let proj = line_path().map_point_to_path(Vec3::new(5.0, 2.0, 0.0));
        assert!(close(proj.point, Vec3::new(5.0, 0.0, 0.0)));
        assert!((proj.outside - 1.0).abs() < 1e-5);
        assert!(close(proj.tangent, Vec3::X));
        assert!((proj.distance - 5.0).abs() < 1e-5);
    }

    #[test]
    fn inside_the_tube_is_negative() {
        let proj = line_path().map_point_to_path(Vec3::new(12.0, 0.25, 0.0));
        assert!(proj.outside < 0.0);
    }

    #[test]
    fn beyond_the_ends_snaps_to_endpoints() {
        let path = line_path();
        assert!(close(path.map_point_to_path(Vec3::new(-5.0, 0.0, 0.0)).point, Vec3::ZERO));
        assert!(close(
            path.map_point_to_path(Vec3::new(25.0, 1.0, 0.0)).point,
            Vec3::new(20.0, 0.0, 0.0)
        ));
    }

    #[test]
    fn open_path_clamps_distance() {
        let path = line_path();
        assert!(close(path.map_path_distance_to_point(-3.0), Vec3::ZERO));
        assert!(close(path.map_path_distance_to_point(99.0), Vec3::new(20.0, 0.0, 0.0)));
        assert!(close(path.map_path_distance_to_point(15.0), Vec3::new(15.0, 0.0, 0.0)));
    }

    #[test]
    fn cyclic_wrap_is_periodic() {
        let path = square_loop();
        let total = path.total_length();
        for step in 0..40 {
            let d = step as f32 * 1.7 - 20.0;
            assert!(
                close(path.map_path_distance_to_point(d), path.map_path_distance_to_point(d + total)),
                "d = {d}"
            );
        }
        // Closing segment runs from the last waypoint back to the first.
        assert!(close(path.map_path_distance_to_point(35.0), Vec3::new(0.0, 0.0, 5.0)));
    }

    #[test]
    fn distance_round_trip_stays_in_tube() {
        let path = square_loop();
        let probes = [
            Vec3::new(3.0, 0.4, 0.2),
            Vec3::new(9.5, 0.0, 4.0),
            Vec3::new(6.0, -0.3, 10.6),
            Vec3::new(0.2, 0.0, 7.0),
        ];
        for p in probes {
            let d = path.map_point_to_path_distance(p);
            let back = path.map_path_distance_to_point(d);
            assert!(path.map_point_to_path(back).outside <= 0.0, "probe {p:?}");
            assert!(back.distance(p) <= path.radius() + 1e-4, "probe {p:?}");
        }
    }

    #[test]
    fn changing_cyclic_rebuilds() {
        let mut path = line_path();
        path.set_cyclic(true);
        assert_eq!(path.total_length(), 40.0);
        assert_eq!(path.points().len(), 4);
        path.set_cyclic(false);
        assert_eq!(path.total_length(), 20.0);
    }

    #[test]
    fn set_waypoints_rejects_short_lists_and_keeps_state() {
        let mut path = line_path();
        assert!(path.set_waypoints(vec![Vec3::ONE]).is_err());
        assert_eq!(path.total_length(), 20.0);
        path.set_waypoints(vec![Vec3::ZERO, Vec3::new(0.0, 3.0, 4.0)]).unwrap();
        assert_eq!(path.total_length(), 5.0);
    }

    #[test]
    fn duplicate_waypoints_do_not_produce_nan() {
        let path = PathWay::new(vec![Vec3::ZERO, Vec3::ZERO, Vec3::X * 4.0], 1.0, false).unwrap();
        let p = path.map_path_distance_to_point(2.0);
        assert!(p.is_finite());
        assert!(close(p, Vec3::X * 2.0));
        assert!(path.map_point_to_path(Vec3::Y).point.is_finite());
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use std::io::{Cursor, Write};

    use super::*;
    use crate::{load_paths_csv, load_paths_reader, SpatialError};

    const CSV: &str = "\
path,x,y,z,radius,cyclic
patrol,0,0,0,1,true
patrol,10,0,0,1,true
patrol,10,0,10,1,true
road,0,0,0,2,false
road,50,0,0,2,false
";

    #[test]
    fn groups_rows_by_path_in_order() {
        let paths = load_paths_reader(Cursor::new(CSV)).unwrap();
        assert_eq!(paths.keys().collect::<Vec<_>>(), vec!["patrol", "road"]);
        let patrol = &paths["patrol"];
        assert!(patrol.is_cyclic());
        assert_eq!(patrol.waypoints()[1], Vec3::new(10.0, 0.0, 0.0));
        let road = &paths["road"];
        assert_eq!(road.radius(), 2.0);
        assert_eq!(road.total_length(), 50.0);
    }

    #[test]
    fn single_row_path_is_rejected_by_name() {
        let csv = "path,x,y,z,radius,cyclic\nlonely,1,2,3,1,false\n";
        match load_paths_reader(Cursor::new(csv)) {
            Err(SpatialError::InvalidPath(name, _)) => assert_eq!(name, "lonely"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn bad_number_is_a_parse_error() {
        let csv = "path,x,y,z,radius,cyclic\na,one,0,0,1,false\n";
        assert!(matches!(load_paths_reader(Cursor::new(csv)), Err(SpatialError::Parse(_))));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CSV.as_bytes()).unwrap();
        let paths = load_paths_csv(file.path()).unwrap();
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_paths_csv(&dir.path().join("absent.csv"));
        assert!(matches!(result, Err(SpatialError::Io(_))));
    }
}
