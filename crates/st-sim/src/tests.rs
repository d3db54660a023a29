//! Integration tests for st-sim.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;

use st_agent::{AgentBuilder, AgentConfig, Locomotion};
use st_behavior::{Cohesion, Formation, Seek, SteeringSet};
use st_core::{EntityId, LayerMask, SimTime, SteerError};
use st_schedule::{PumpReport, SchedulerId, TaskFault, TickedTask};
use st_spatial::RadarConfig;

use crate::{NoopObserver, TickTarget, World, WorldBuilder, WorldError, WorldObserver};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn world() -> World {
    WorldBuilder::new().seed(42).build().unwrap()
}

/// Direct-locomotion agent: velocity follows the committed force at once.
fn direct(position: Vec3) -> AgentBuilder {
    AgentBuilder::new()
        .position(position)
        .forward(Vec3::Z)
        .locomotion(Locomotion::Direct)
        .max_speed(2.0)
}

fn queue(world: &World, name: &str) -> SchedulerId {
    world.schedulers().by_name(name).unwrap()
}

fn has_task(world: &World, name: &str, key: TickTarget) -> bool {
    world.schedulers().get(queue(world, name)).unwrap().contains(&key)
}

fn run(world: &mut World, frames: usize, dt: f32) {
    for _ in 0..frames {
        world.step(dt, &mut NoopObserver);
    }
}

#[derive(Debug, PartialEq)]
enum Event {
    Radar(EntityId),
    Steered(EntityId),
    Moved(EntityId, Vec3),
    PumpEnd,
}

#[derive(Default)]
struct Recorder {
    events: Vec<Event>,
}

impl WorldObserver for Recorder {
    fn on_agent_moved(&mut self, id: EntityId, _delta: Vec3, position: Vec3, _forward: Vec3) {
        self.events.push(Event::Moved(id, position));
    }

    fn on_radar_refreshed(&mut self, id: EntityId, _agents: usize, _obstacles: usize) {
        self.events.push(Event::Radar(id));
    }

    fn on_steering_composed(&mut self, id: EntityId, _velocity: Vec3, _failed: u32) {
        self.events.push(Event::Steered(id));
    }

    fn on_pump_end(&mut self, _now: SimTime, _report: &PumpReport) {
        self.events.push(Event::PumpEnd);
    }
}

// ── WorldBuilder ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn radar_queue_is_created_before_steering() {
        let world = world();
        let names: Vec<&str> = world.schedulers().names().collect();
        assert_eq!(names, vec!["radar", "steering"]);
        assert_eq!(world.config().seed, 42);
    }

    #[test]
    fn queues_resolving_to_one_name_are_rejected() {
        let result = WorldBuilder::new()
            .radar_queue("Steering")
            .steering_queue("  steering ")
            .build();
        assert!(matches!(result, Err(WorldError::Config(_))));
    }

    #[test]
    fn renamed_world_queues_carry_default_tasks_in_order() {
        let mut world = WorldBuilder::new()
            .radar_queue("Sensors")
            .steering_queue("motion")
            .build()
            .unwrap();
        let id = world.spawn_agent(direct(Vec3::ZERO)).unwrap();
        world.attach_radar(id, RadarConfig::default()).unwrap();

        let names: Vec<&str> = world.schedulers().names().collect();
        assert_eq!(names, vec!["sensors", "motion"]);
        assert!(has_task(&world, "sensors", TickTarget::Radar(id)));
        assert!(has_task(&world, "motion", TickTarget::Steering(id)));

        let mut recorder = Recorder::default();
        world.pump(SimTime::from_secs(0.1), &mut recorder);
        assert_eq!(recorder.events, vec![Event::Radar(id), Event::Steered(id), Event::PumpEnd]);
    }

    #[test]
    fn custom_queues_are_appended_after_the_defaults() {
        let mut world = world();
        world.spawn_agent(AgentBuilder::new().queue_name("Crowd")).unwrap();
        let names: Vec<&str> = world.schedulers().names().collect();
        assert_eq!(names, vec!["radar", "steering", "crowd"]);
    }
}

// ── Spawning and lifecycle ────────────────────────────────────────────────────

#[cfg(test)]
mod lifecycle {
    use super::*;
    use st_core::EntityKind;

    #[test]
    fn spawned_agent_is_detectable_and_scheduled() {
        let mut world = world();
        let id = world.spawn_agent(direct(Vec3::ZERO)).unwrap();
        let shape = world.entity(id).unwrap().shape;

        let record = world.detectables().lookup(shape).unwrap();
        assert_eq!(record.entity, id);
        assert_eq!(record.kind, EntityKind::Agent);
        assert!(record.enabled);
        assert!(has_task(&world, "steering", TickTarget::Steering(id)));
        assert!(!has_task(&world, "radar", TickTarget::Radar(id)));
    }

    #[test]
    fn steering_task_uses_movement_priority_and_tick_length() {
        let mut world = world();
        world.spawn_agent(direct(Vec3::ZERO)).unwrap();
        let second = world.spawn_agent(direct(Vec3::X).tick_length(0.5)).unwrap();
        let third = world.spawn_agent(direct(Vec3::Y).movement_priority(-3)).unwrap();

        let steering = world.schedulers().get(queue(&world, "steering")).unwrap();
        let task = steering.task(&TickTarget::Steering(second)).unwrap();
        assert_eq!(task.priority, 1);
        assert_eq!(task.tick_length, 0.5);
        assert_eq!(steering.task(&TickTarget::Steering(third)).unwrap().priority, -3);
    }

    #[test]
    fn last_configured_cap_wins() {
        let mut world = world();
        let config = AgentConfig { max_processed_per_update: 3, ..AgentConfig::default() };
        world.spawn_agent(AgentBuilder::from_config(config)).unwrap();
        let steering = world.schedulers().get(queue(&world, "steering")).unwrap();
        assert_eq!(steering.max_processed_per_update(), 3);
    }

    #[test]
    fn obstacles_register_without_tasks() {
        let mut world = world();
        let id = world.spawn_obstacle(Vec3::new(1.0, 0.0, 1.0), 2.0, LayerMask::default());
        let shape = world.entity(id).unwrap().shape;
        assert_eq!(world.detectables().lookup(shape).unwrap().kind, EntityKind::Obstacle);
        assert!(world.agent(id).is_none());
        assert!(!has_task(&world, "steering", TickTarget::Steering(id)));
    }

    #[test]
    fn steering_cannot_attach_to_an_obstacle() {
        let mut world = world();
        let id = world.spawn_obstacle(Vec3::ZERO, 1.0, LayerMask::default());
        let result = world.attach_steering(id, Seek::new(Vec3::X));
        assert!(matches!(result, Err(WorldError::Core(SteerError::NotAnAgent(_)))));
        let result = world.attach_radar(EntityId(99), RadarConfig::default());
        assert!(matches!(result, Err(WorldError::Core(SteerError::EntityNotFound(_)))));
    }

    #[test]
    fn disable_removes_tasks_and_enable_restores_them() {
        let mut world = world();
        let id = world.spawn_agent(direct(Vec3::ZERO)).unwrap();
        world.attach_radar(id, RadarConfig::default()).unwrap();
        let shape = world.entity(id).unwrap().shape;

        world.disable_agent(id).unwrap();
        assert!(!world.agent(id).unwrap().is_enabled());
        assert!(!world.detectables().lookup(shape).unwrap().enabled);
        assert!(!has_task(&world, "steering", TickTarget::Steering(id)));
        assert!(!has_task(&world, "radar", TickTarget::Radar(id)));

        world.enable_agent(id).unwrap();
        assert!(world.detectables().lookup(shape).unwrap().enabled);
        assert!(has_task(&world, "steering", TickTarget::Steering(id)));
        assert!(has_task(&world, "radar", TickTarget::Radar(id)));
    }

    #[test]
    fn enabling_measures_the_first_delta_from_the_enable_time() {
        let mut world = world();
        let id = world.spawn_agent(direct(Vec3::ZERO)).unwrap();
        world.disable_agent(id).unwrap();
        run(&mut world, 10, 0.1);
        world.enable_agent(id).unwrap();
        run(&mut world, 1, 0.1);
        assert!((world.agent(id).unwrap().delta_time() - 0.1).abs() < 1e-4);
    }

    #[test]
    fn despawn_frees_everything_and_ids_are_not_reused() {
        let mut world = world();
        let id = world.spawn_agent(direct(Vec3::ZERO)).unwrap();
        world.attach_radar(id, RadarConfig::default()).unwrap();
        world.attach_steering(id, Seek::new(Vec3::X)).unwrap();
        let shape = world.entity(id).unwrap().shape;

        world.despawn(id).unwrap();
        assert!(world.entity(id).is_none());
        assert!(world.detectables().lookup(shape).is_none());
        assert!(world.radar(id).is_none());
        assert!(world.steering(id).is_none());
        assert!(!has_task(&world, "steering", TickTarget::Steering(id)));
        assert!(!has_task(&world, "radar", TickTarget::Radar(id)));

        let next = world.spawn_agent(direct(Vec3::ZERO)).unwrap();
        assert_ne!(next, id);
        assert!(matches!(world.despawn(id), Err(WorldError::Core(SteerError::EntityNotFound(_)))));
    }

    #[test]
    fn reattaching_a_radar_replaces_its_task() {
        let mut world = world();
        let id = world.spawn_agent(direct(Vec3::ZERO)).unwrap();
        world.attach_radar(id, RadarConfig::default()).unwrap();
        world
            .attach_radar(id, RadarConfig { detection_radius: 9.0, ..RadarConfig::default() })
            .unwrap();
        let radar = world.schedulers().get(queue(&world, "radar")).unwrap();
        assert_eq!(radar.len(), 1);
        assert_eq!(world.radar(id).unwrap().detection_radius(), 9.0);

        assert!(world.detach_radar(id).is_some());
        assert!(!has_task(&world, "radar", TickTarget::Radar(id)));
        assert!(world.detach_radar(id).is_none());
    }
}

// ── Pump and frame ────────────────────────────────────────────────────────────

#[cfg(test)]
mod pump {
    use super::*;

    #[test]
    fn seek_moves_the_agent_toward_its_target() {
        let mut world = world();
        let id = world.spawn_agent(direct(Vec3::ZERO)).unwrap();
        world.attach_steering(id, Seek::new(Vec3::new(10.0, 0.0, 0.0))).unwrap();

        run(&mut world, 1, 0.1);
        assert!((world.agent(id).unwrap().position().x - 0.2).abs() < 1e-4);

        run(&mut world, 9, 0.1);
        let agent = world.agent(id).unwrap();
        assert!((agent.position().x - 2.0).abs() < 1e-3);
        assert!(agent.forward().x > 0.9, "forward = {:?}", agent.forward());
    }

    #[test]
    fn agent_without_behaviors_stays_put() {
        let mut world = world();
        let id = world.spawn_agent(direct(Vec3::ONE)).unwrap();
        run(&mut world, 5, 0.1);
        assert_eq!(world.agent(id).unwrap().position(), Vec3::ONE);
    }

    #[test]
    fn radars_refresh_before_steering_in_the_same_pump() {
        let mut world = world();
        let id = world.spawn_agent(direct(Vec3::ZERO)).unwrap();
        world.attach_radar(id, RadarConfig::default()).unwrap();

        let mut recorder = Recorder::default();
        world.pump(SimTime::from_secs(0.1), &mut recorder);
        assert_eq!(
            recorder.events,
            vec![Event::Radar(id), Event::Steered(id), Event::PumpEnd]
        );
    }

    #[test]
    fn steering_reads_neighbors_found_by_this_pump() {
        let mut world = world();
        let me = world.spawn_agent(direct(Vec3::ZERO)).unwrap();
        let other = world.spawn_agent(direct(Vec3::new(0.0, 0.0, 3.0))).unwrap();
        world.attach_radar(me, RadarConfig::default()).unwrap();
        world.attach_steering(me, Cohesion::default()).unwrap();

        run(&mut world, 1, 0.1);
        assert_eq!(world.radar(me).unwrap().agents(), &[other]);
        assert!(world.agent(me).unwrap().position().z > 0.0);
    }

    #[test]
    fn disabled_agent_is_not_steered_but_still_detected() {
        let mut world = world();
        let watcher = world.spawn_agent(direct(Vec3::ZERO)).unwrap();
        let sleeper = world.spawn_agent(direct(Vec3::new(2.0, 0.0, 0.0))).unwrap();
        world.attach_radar(watcher, RadarConfig::default()).unwrap();
        world.attach_steering(sleeper, Seek::new(Vec3::new(20.0, 0.0, 0.0))).unwrap();
        world.disable_agent(sleeper).unwrap();

        let mut recorder = Recorder::default();
        for _ in 0..5 {
            world.step(0.1, &mut recorder);
        }
        assert_eq!(world.agent(sleeper).unwrap().position(), Vec3::new(2.0, 0.0, 0.0));
        assert!(!recorder.events.contains(&Event::Steered(sleeper)));

        let radar = world.radar(watcher).unwrap();
        assert!(radar.agents().is_empty());
        assert_eq!(radar.obstacles(), &[sleeper]);
    }

    #[test]
    fn per_update_cap_limits_steering_ticks() {
        let mut world = world();
        let config = AgentConfig {
            max_processed_per_update: 2,
            tick_length: 0.0,
            ..AgentConfig::default()
        };
        for i in 0..3 {
            let builder = AgentBuilder::from_config(config.clone()).position(Vec3::X * i as f32);
            world.spawn_agent(builder).unwrap();
        }
        let report = world.pump(SimTime::from_secs(0.1), &mut NoopObserver);
        let steering = queue(&world, "steering");
        let (_, update) = report
            .per_scheduler
            .iter()
            .find(|(id, _)| *id == steering)
            .unwrap();
        assert_eq!(update.processed, 2);
    }

    #[test]
    fn missing_entity_faults_without_stopping_the_pump() {
        let mut world = world();
        let id = world.spawn_agent(direct(Vec3::ZERO)).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let steering = queue(&world, "steering");
        let scheduler = world.schedulers_mut().get_mut(steering).unwrap();
        scheduler.set_fault_handler(move |fault: TaskFault<TickTarget>| sink.borrow_mut().push(fault.key));
        scheduler.add(TickedTask::new(TickTarget::Steering(EntityId(77))));

        let mut recorder = Recorder::default();
        let report = world.pump(SimTime::from_secs(0.1), &mut recorder);
        assert_eq!(report.total.faulted, 1);
        assert_eq!(*seen.borrow(), vec![TickTarget::Steering(EntityId(77))]);
        assert!(recorder.events.contains(&Event::Steered(id)));
    }

    #[test]
    fn stale_radar_entries_are_skipped_after_despawn() {
        let mut world = world();
        let me = world.spawn_agent(direct(Vec3::ZERO)).unwrap();
        let other = world.spawn_agent(direct(Vec3::new(0.0, 0.0, 3.0))).unwrap();
        world
            .attach_radar(me, RadarConfig { tick_length: 100.0, ..RadarConfig::default() })
            .unwrap();
        world.attach_steering(me, Cohesion::default()).unwrap();
        run(&mut world, 1, 0.1);

        world.despawn(other).unwrap();
        let before = world.agent(me).unwrap().position();
        let report = world.step(0.1, &mut NoopObserver);
        assert_eq!(report.total.faulted, 0);
        assert_eq!(world.radar(me).unwrap().agents(), &[other]);
        assert_eq!(world.agent(me).unwrap().position(), before);
    }

    #[test]
    fn frame_reports_every_move() {
        let mut world = world();
        let id = world.spawn_agent(direct(Vec3::ZERO)).unwrap();
        world.attach_steering(id, Seek::new(Vec3::new(0.0, 0.0, 10.0))).unwrap();
        world.pump(SimTime::from_secs(0.1), &mut NoopObserver);

        let mut recorder = Recorder::default();
        assert_eq!(world.frame(0.5, &mut recorder), 1);
        let position = world.agent(id).unwrap().position();
        assert_eq!(recorder.events, vec![Event::Moved(id, position)]);
        assert!((position.z - 1.0).abs() < 1e-4);

        assert_eq!(world.frame(0.0, &mut recorder), 0);
        assert_eq!(world.frame(f32::NAN, &mut recorder), 0);
    }

    #[test]
    fn step_advances_the_clock() {
        let mut world = world();
        run(&mut world, 4, 0.25);
        assert_eq!(world.clock().frame, 4);
        assert!((world.now().as_secs() - 1.0).abs() < 1e-9);
    }
}

// ── Formations ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod formations {
    use super::*;

    #[test]
    fn attaching_and_despawning_maintains_the_roster() {
        let mut world = world();
        let leader = world.spawn_agent(direct(Vec3::ZERO)).unwrap();
        let first = world.spawn_agent(direct(Vec3::new(0.0, 0.0, -2.0))).unwrap();
        let second = world.spawn_agent(direct(Vec3::new(2.0, 0.0, -2.0))).unwrap();
        world.attach_steering(first, Formation::new(leader)).unwrap();
        world.attach_steering(second, Formation::new(leader)).unwrap();
        assert_eq!(world.formations().roster(leader), &[first, second]);

        world.despawn(first).unwrap();
        assert_eq!(world.formations().roster(leader), &[second]);
        assert_eq!(world.formations().slot(leader, second), Some(0));
    }

    #[test]
    fn replacing_a_steering_set_detaches_the_old_one() {
        let mut world = world();
        let leader = world.spawn_agent(direct(Vec3::ZERO)).unwrap();
        let follower = world.spawn_agent(direct(Vec3::new(0.0, 0.0, -2.0))).unwrap();
        world.attach_steering(follower, Formation::new(leader)).unwrap();

        let previous = world.set_steering(follower, SteeringSet::new()).unwrap();
        assert_eq!(previous.map(|set| set.len()), Some(1));
        assert!(world.formations().roster(leader).is_empty());

        let set = SteeringSet::new().with(Formation::new(leader), 1.0);
        assert!(world.set_steering(follower, set).unwrap().is_some());
        assert_eq!(world.formations().roster(leader), &[follower]);
    }

    #[test]
    fn followers_move_toward_their_slot() {
        let mut world = world();
        let leader = world.spawn_agent(direct(Vec3::ZERO)).unwrap();
        let follower = world.spawn_agent(direct(Vec3::new(5.0, 0.0, -8.0))).unwrap();
        world.attach_steering(follower, Formation::new(leader)).unwrap();

        let start = world.agent(follower).unwrap().position();
        run(&mut world, 10, 0.1);
        let end = world.agent(follower).unwrap().position();
        let slot = Vec3::new(0.0, 0.0, -2.0);
        assert!((end - slot).length() < (start - slot).length());
    }
}
