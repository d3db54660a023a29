//! Static scenery: a ring of rocks and the named patrol routes.

use std::collections::BTreeMap;
use std::io::Cursor;

use glam::Vec3;

use st_core::{EntityId, LayerMask, SimRng};
use st_sim::World;
use st_spatial::{PathWay, SpatialResult, load_paths_reader};

/// Half-size of the arena on X and Z.
pub const ARENA_HALF: f32 = 40.0;

// One row per waypoint; see `st_spatial::loader` for the format.
const ROUTES_CSV: &str = "\
path,x,y,z,radius,cyclic\n\
perimeter,-30,0,-30,2,true\n\
perimeter,30,0,-30,2,true\n\
perimeter,30,0,30,2,true\n\
perimeter,-30,0,30,2,true\n\
crossing,-35,0,0,1.5,false\n\
crossing,0,0,5,1.5,false\n\
crossing,35,0,0,1.5,false\n\
";

/// Scatter `count` rocks across the arena, keeping the centre clear so the
/// flock does not spawn inside one.
pub fn place_rocks(world: &mut World, rng: &mut SimRng, count: usize) -> Vec<EntityId> {
    let mut rocks = Vec::with_capacity(count);
    while rocks.len() < count {
        let at = rng.point_in_box(Vec3::new(ARENA_HALF * 0.8, 0.0, ARENA_HALF * 0.8));
        if at.length() < 10.0 {
            continue;
        }
        let radius = rng.gen_range(1.0..3.0);
        rocks.push(world.spawn_obstacle(at, radius, LayerMask::default()));
    }
    rocks
}

/// Patrol routes keyed by name.
pub fn routes() -> SpatialResult<BTreeMap<String, PathWay>> {
    load_paths_reader(Cursor::new(ROUTES_CSV))
}
