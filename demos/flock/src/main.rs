//! flock: smallest end-to-end example for the steering framework.
//!
//! A wandering flock shares an arena with scattered rocks, two patrols
//! following named routes, a leader dragging a wedge formation across the
//! map and a hunter chasing one of the patrols.  Run with
//! `RUST_LOG=debug` to see lifecycle events, `RUST_LOG=trace` for every
//! radar refresh.

mod scene;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use glam::Vec3;
use tracing::info;
use tracing_subscriber::EnvFilter;

use st_agent::{AgentBuilder, Locomotion};
use st_behavior::{
    Alignment, Cohesion, FollowPath, Formation, NeighborAvoidance, ObstacleAvoidance, Pursuit, Seek,
    Separation, SteeringSet, Tether, Wander,
};
use st_core::{AxisMask, EntityId, SimRng, SimTime};
use st_schedule::PumpReport;
use st_sim::{World, WorldBuilder, WorldObserver};
use st_spatial::RadarConfig;

use scene::ARENA_HALF;

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:           u64   = 42;
const FLOCK_SIZE:     usize = 24;
const FOLLOWERS:      usize = 6;
const ROCKS:          usize = 8;
const FRAME_DT:       f32   = 1.0 / 60.0;
const SIM_SECONDS:    f32   = 60.0;
const REPORT_EVERY_S: f32   = 10.0;

// ── Roles ─────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug)]
enum Role {
    Flock,
    Patrol,
    Leader,
    Follower,
    Hunter,
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Stats {
    moves:           u64,
    distance:        f64,
    radar_refreshes: u64,
    steering_ticks:  u64,
    failed:          u64,
    faults:          u64,
}

impl WorldObserver for Stats {
    fn on_agent_moved(&mut self, _id: EntityId, delta: Vec3, _position: Vec3, _forward: Vec3) {
        self.moves += 1;
        self.distance += delta.length() as f64;
    }

    fn on_radar_refreshed(&mut self, _id: EntityId, _agents: usize, _obstacles: usize) {
        self.radar_refreshes += 1;
    }

    fn on_steering_composed(&mut self, _id: EntityId, _velocity: Vec3, failed: u32) {
        self.steering_ticks += 1;
        self.failed += failed as u64;
    }

    fn on_pump_end(&mut self, _now: SimTime, report: &PumpReport) {
        self.faults += report.total.faulted as u64;
    }
}

// ── Spawning ──────────────────────────────────────────────────────────────────

fn planar(position: Vec3) -> AgentBuilder {
    AgentBuilder::new()
        .position(position)
        .allowed_axes(AxisMask::PLANAR)
        .radius(0.6)
}

fn spawn_flock(world: &mut World, rng: &mut SimRng) -> Result<Vec<EntityId>> {
    let mut flock = Vec::with_capacity(FLOCK_SIZE);
    for _ in 0..FLOCK_SIZE {
        let at = rng.point_in_box(Vec3::new(6.0, 0.0, 6.0));
        let heading = rng.point_in_box(Vec3::new(1.0, 0.0, 1.0));
        let id = world.spawn_agent(
            planar(at)
                .forward(if heading.length() > 0.1 { heading } else { Vec3::Z })
                .max_speed(4.0)
                .max_force(8.0)
                .tick_length(0.05),
        )?;
        world.attach_radar(id, RadarConfig { detection_radius: 6.0, ..RadarConfig::default() })?;
        let set = SteeringSet::new()
            .with(Separation::default(), 2.0)
            .with(Alignment::default(), 1.0)
            .with(Cohesion::default(), 0.8)
            .with(Wander::new().within(Vec3::new(50.0, 0.0, 50.0)), 0.5)
            .with(ObstacleAvoidance::default(), 1.0)
            .with(Tether::new(Vec3::ZERO).maximum_distance(ARENA_HALF), 1.0);
        world.set_steering(id, set)?;
        flock.push(id);
    }
    Ok(flock)
}

fn spawn_patrols(world: &mut World) -> Result<Vec<EntityId>> {
    let routes = scene::routes().context("loading patrol routes")?;
    let mut patrols = Vec::new();
    for (name, route) in routes {
        let route = Arc::new(route);
        let start = route.waypoints()[0];
        let id = world.spawn_agent(
            planar(start)
                .locomotion(Locomotion::Direct)
                .max_speed(3.0)
                .movement_priority(-1),
        )?;
        world.attach_radar(id, RadarConfig { detection_radius: 4.0, ..RadarConfig::default() })?;
        world.attach_steering(id, FollowPath::new(Arc::clone(&route)))?;
        world.attach_steering_weighted(id, NeighborAvoidance::default(), 2.0)?;
        world.attach_steering(id, ObstacleAvoidance::default())?;
        info!(patrol = %id, route = %name, length = route.total_length(), "patrol on route");
        patrols.push(id);
    }
    Ok(patrols)
}

fn spawn_formation(world: &mut World) -> Result<(EntityId, Vec<EntityId>)> {
    let leader = world.spawn_agent(
        planar(Vec3::new(-ARENA_HALF * 0.7, 0.0, -ARENA_HALF * 0.7))
            .forward(Vec3::new(1.0, 0.0, 1.0))
            .max_speed(2.0),
    )?;
    world.attach_steering(leader, Seek::arriving(Vec3::new(ARENA_HALF * 0.7, 0.0, ARENA_HALF * 0.7)))?;

    let mut followers = Vec::with_capacity(FOLLOWERS);
    for i in 0..FOLLOWERS {
        let at = Vec3::new(-ARENA_HALF * 0.7 - 1.0 - i as f32, 0.0, -ARENA_HALF * 0.7 - 2.0);
        let id = world.spawn_agent(planar(at).locomotion(Locomotion::Direct).max_speed(3.0))?;
        world.attach_steering(id, Formation::new(leader).line_size(3).angle_degrees(30.0))?;
        followers.push(id);
    }
    Ok((leader, followers))
}

fn spawn_hunter(world: &mut World, prey: EntityId) -> Result<EntityId> {
    let id = world.spawn_agent(planar(Vec3::new(0.0, 0.0, -ARENA_HALF * 0.9)).max_speed(3.5))?;
    world.attach_steering(id, Pursuit::new(prey).arriving(1.5))?;
    Ok(id)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== flock: steering framework demo ===");
    println!("Flock: {FLOCK_SIZE}  |  Followers: {FOLLOWERS}  |  Rocks: {ROCKS}  |  Seed: {SEED}");
    println!();

    // 1. World and scenery.
    let mut world = WorldBuilder::new().seed(SEED).build()?;
    let mut rng = SimRng::new(SEED);
    let mut scatter = rng.child(1);
    let rocks = scene::place_rocks(&mut world, &mut scatter, ROCKS);

    // 2. Agents.
    let mut roles: Vec<(EntityId, Role)> = Vec::new();
    let flock = spawn_flock(&mut world, &mut rng)?;
    roles.extend(flock.iter().map(|&id| (id, Role::Flock)));
    let patrols = spawn_patrols(&mut world)?;
    roles.extend(patrols.iter().map(|&id| (id, Role::Patrol)));
    let (leader, followers) = spawn_formation(&mut world)?;
    roles.push((leader, Role::Leader));
    roles.extend(followers.iter().map(|&id| (id, Role::Follower)));
    if let Some(&prey) = patrols.first() {
        roles.push((spawn_hunter(&mut world, prey)?, Role::Hunter));
    }
    info!(
        agents = roles.len(),
        rocks = rocks.len(),
        queues = ?world.schedulers().names().collect::<Vec<_>>(),
        "world ready"
    );

    // 3. Run.
    let frames = (SIM_SECONDS / FRAME_DT).round() as u64;
    let report_every = (REPORT_EVERY_S / FRAME_DT).round() as u64;
    let mut stats = Stats::default();
    let t0 = Instant::now();
    for frame in 1..=frames {
        world.step(FRAME_DT, &mut stats);
        if frame % report_every == 0 {
            let spread = flock_spread(&world, &flock);
            info!(
                t = %world.now(),
                steering_ticks = stats.steering_ticks,
                radar_refreshes = stats.radar_refreshes,
                flock_spread = spread,
                "progress"
            );
        }
    }
    let elapsed = t0.elapsed();

    // 4. Summary.
    println!("Simulated {SIM_SECONDS} s ({frames} frames) in {:.3} s", elapsed.as_secs_f64());
    println!("  steering ticks  : {}", stats.steering_ticks);
    println!("  radar refreshes : {}", stats.radar_refreshes);
    println!("  moves           : {} ({:.1} m total)", stats.moves, stats.distance);
    println!("  failed forces   : {}", stats.failed);
    println!("  task faults     : {}", stats.faults);
    println!(
        "  formation       : {} of {FOLLOWERS} followers in roster",
        world.formations().roster(leader).len()
    );
    println!();

    // 5. Final positions table.
    println!("{:<8} {:<9} {:>8} {:>8} {:>7}", "Agent", "Role", "x", "z", "speed");
    println!("{}", "-".repeat(44));
    for (id, role) in &roles {
        let Some(agent) = world.agent(*id) else { continue };
        let p = agent.position();
        println!(
            "{:<8} {:<9} {:>8.2} {:>8.2} {:>7.2}",
            id.0,
            format!("{role:?}"),
            p.x,
            p.z,
            agent.speed()
        );
    }

    Ok(())
}

/// Mean distance of flock members from their centroid.
fn flock_spread(world: &World, flock: &[EntityId]) -> f32 {
    let positions: Vec<Vec3> = flock.iter().filter_map(|&id| world.agent(id)).map(|a| a.position()).collect();
    if positions.is_empty() {
        return 0.0;
    }
    let centroid = positions.iter().copied().sum::<Vec3>() / positions.len() as f32;
    positions.iter().map(|p| p.distance(centroid)).sum::<f32>() / positions.len() as f32
}
