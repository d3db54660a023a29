//! Unit tests for st-agent.

use glam::Vec3;

use st_core::{EntityId, SimTime};

use crate::{Agent, AgentBuilder, EntityStore, Locomotion};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

fn approx_v(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-4
}

fn direct_agent(store: &mut EntityStore, position: Vec3) -> EntityId {
    store.insert_agent(
        AgentBuilder::new()
            .position(position)
            .locomotion(Locomotion::Direct)
            .max_speed(10.0)
            .turn_time(0.0),
    )
}

fn agent_at(position: Vec3) -> Agent {
    AgentBuilder::new().position(position).build(EntityId(0), st_core::ShapeId(0))
}

// ── Entity ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod entity {
    use super::*;

    #[test]
    fn position_includes_center_offset() {
        let agent = AgentBuilder::new()
            .position(Vec3::new(1.0, 0.0, 0.0))
            .center(Vec3::new(0.0, 0.5, 0.0))
            .build(EntityId(0), st_core::ShapeId(0));
        assert_eq!(agent.position(), Vec3::new(1.0, 0.5, 0.0));
        assert_eq!(agent.entity.transform_position(), Vec3::X);
    }

    #[test]
    fn radius_clamps_and_caches_square() {
        let mut agent = agent_at(Vec3::ZERO);
        agent.entity.set_radius(2.0);
        assert_eq!(agent.entity.squared_radius(), 4.0);
        agent.entity.set_radius(-1.0);
        assert_eq!(agent.radius(), 0.01);
        assert!(approx(agent.entity.squared_radius(), 0.0001));
    }

    #[test]
    fn zero_forward_is_ignored() {
        let mut agent = agent_at(Vec3::ZERO);
        agent.entity.set_forward(Vec3::X * 3.0);
        agent.entity.set_forward(Vec3::ZERO);
        assert_eq!(agent.forward(), Vec3::X);
    }
}

// ── Agent ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod agent {
    use super::*;

    #[test]
    fn defaults() {
        let agent = agent_at(Vec3::ZERO);
        assert_eq!(agent.mass(), 1.0);
        assert_eq!(agent.max_speed(), 1.0);
        assert_eq!(agent.max_force(), 10.0);
        assert_eq!(agent.turn_time(), 0.25);
        assert_eq!(agent.min_speed_for_turning(), 0.1);
        assert_eq!(agent.arrival_radius(), 0.25);
        assert!(approx(agent.squared_arrival_radius(), 0.0625));
        assert!(agent.can_move);
        assert_eq!(
            agent.locomotion,
            Locomotion::Autonomous { acceleration_rate: 5.0, deceleration_rate: 8.0 }
        );
    }

    #[test]
    fn setters_clamp() {
        let mut agent = agent_at(Vec3::ZERO);
        agent.set_mass(-3.0);
        agent.set_max_speed(-1.0);
        agent.set_max_force(f32::NAN);
        agent.set_turn_time(-0.5);
        agent.set_arrival_radius(0.0);
        assert_eq!(agent.mass(), 0.0);
        assert_eq!(agent.max_speed(), 0.0);
        assert_eq!(agent.max_force(), 0.0);
        assert_eq!(agent.turn_time(), 0.0);
        assert_eq!(agent.arrival_radius(), 0.01);
        assert!(approx(agent.squared_arrival_radius(), 0.0001));
    }

    #[test]
    fn begin_tick_tracks_delta_and_gates() {
        let mut agent = agent_at(Vec3::ZERO);
        agent.reset_tick_clock(SimTime(1.0));
        assert!(agent.begin_tick(SimTime(1.25)));
        assert!(approx(agent.delta_time(), 0.25));

        agent.set_max_force(0.0);
        assert!(!agent.begin_tick(SimTime(1.5)));
        // The clock still advances.
        assert_eq!(agent.current_tick_time(), SimTime(1.5));

        agent.set_max_force(1.0);
        agent.stop();
        assert!(!agent.begin_tick(SimTime(2.0)));
    }

    #[test]
    fn primary_force_is_clamped_by_max_force() {
        let mut agent = agent_at(Vec3::ZERO);
        agent.set_max_force(2.0);
        agent.set_max_speed(100.0);
        agent.set_mass(0.5);
        let v = agent.commit_forces(Vec3::new(30.0, 40.0, 0.0), Vec3::ZERO);
        assert!(approx(v.length(), 2.0));
        assert!(approx_v(agent.desired_velocity(), v));
        assert_eq!(agent.last_raw_force(), Vec3::new(30.0, 40.0, 0.0));
        assert!(approx(agent.target_speed(), 2.0));
    }

    #[test]
    fn post_process_overrides_and_clamps_by_max_speed() {
        let mut agent = agent_at(Vec3::ZERO);
        agent.set_max_force(2.0);
        agent.set_max_speed(5.0);
        let v = agent.commit_forces(Vec3::X * 1.0, Vec3::Z * 50.0);
        assert!(approx_v(v, Vec3::Z * 5.0));
        // Desired velocity still reflects the primary pass.
        assert!(approx_v(agent.desired_velocity(), Vec3::X));
    }

    #[test]
    fn zero_force_zeroes_target_speed() {
        let mut agent = agent_at(Vec3::ZERO);
        agent.commit_forces(Vec3::X * 5.0, Vec3::ZERO);
        assert!(agent.target_speed() > 0.0);
        agent.commit_forces(Vec3::ZERO, Vec3::ZERO);
        assert_eq!(agent.target_speed(), 0.0);
        assert_eq!(agent.desired_velocity(), Vec3::ZERO);
    }

    #[test]
    fn zero_mass_does_not_divide() {
        let mut agent = agent_at(Vec3::ZERO);
        agent.set_mass(0.0);
        let v = agent.commit_forces(Vec3::X, Vec3::X);
        assert_eq!(v, Vec3::ZERO);
        assert!(v.is_finite());
    }

    #[test]
    fn autonomous_agent_accelerates_along_forward() {
        let mut agent = agent_at(Vec3::ZERO);
        agent.set_max_speed(2.0);
        agent.commit_forces(Vec3::X * 10.0, Vec3::ZERO);
        // At rest, the orientation target is the current forward (+Z).
        assert_eq!(agent.orientation_velocity(), Vec3::Z);

        let delta = agent.apply_steering_force(0.1);
        // speed lerps 0 → 2 by 0.1 * 5 = 50 %
        assert!(approx(agent.speed(), 1.0));
        assert!(approx_v(delta, Vec3::Z * 0.1));
        assert!(approx_v(agent.position(), Vec3::Z * 0.1));
    }

    #[test]
    fn autonomous_agent_decelerates_faster() {
        let mut agent = agent_at(Vec3::ZERO);
        agent.set_max_speed(2.0);
        agent.commit_forces(Vec3::X * 10.0, Vec3::ZERO);
        for _ in 0..50 {
            agent.apply_steering_force(0.1);
        }
        assert!(approx(agent.speed(), 2.0));
        agent.zero_velocity();
        agent.apply_steering_force(0.1);
        // 2 → 0 by 0.1 * 8 = 80 %
        assert!(approx(agent.speed(), 0.4));
    }

    #[test]
    #[should_panic(expected = "cannot set the velocity directly")]
    fn setting_velocity_on_autonomous_agent_panics() {
        let mut agent = agent_at(Vec3::ZERO);
        agent.set_velocity(Vec3::X);
    }

    #[test]
    fn direct_agent_moves_with_committed_velocity() {
        let mut store = EntityStore::new();
        let id = direct_agent(&mut store, Vec3::ZERO);
        let agent = store.agent_mut(id).unwrap();
        agent.commit_forces(Vec3::X * 3.0, Vec3::ZERO);
        let delta = agent.frame(0.5).unwrap();
        assert!(approx_v(delta, Vec3::X * 1.5));
        // turn_time 0 → instant turn
        assert!(approx_v(agent.forward(), Vec3::X));
    }

    #[test]
    fn direct_agent_velocity_can_be_set() {
        let mut store = EntityStore::new();
        let id = direct_agent(&mut store, Vec3::ZERO);
        let agent = store.agent_mut(id).unwrap();
        agent.set_velocity(Vec3::Y * 50.0);
        assert!(approx_v(agent.velocity(), Vec3::Y * 10.0));
    }

    #[test]
    fn allowed_axes_mask_movement() {
        let mut store = EntityStore::new();
        let id = store.insert_agent(
            AgentBuilder::new()
                .locomotion(Locomotion::Direct)
                .allowed_axes(st_core::AxisMask::PLANAR)
                .max_speed(10.0),
        );
        let agent = store.agent_mut(id).unwrap();
        agent.commit_forces(Vec3::new(1.0, 1.0, 0.0), Vec3::ZERO);
        let delta = agent.apply_steering_force(1.0);
        assert_eq!(delta.y, 0.0);
        assert!(delta.x > 0.0);
    }

    #[test]
    fn orientation_turns_gradually() {
        let mut store = EntityStore::new();
        let id = store.insert_agent(
            AgentBuilder::new()
                .locomotion(Locomotion::Direct)
                .forward(Vec3::Z)
                .turn_time(1.0)
                .max_speed(10.0),
        );
        let agent = store.agent_mut(id).unwrap();
        agent.commit_forces(Vec3::X * 2.0, Vec3::ZERO);
        agent.adjust_orientation(0.5);
        let f = agent.forward();
        assert!(f.x > 0.0 && f.z > 0.0, "half-turned, got {f:?}");
        assert!(approx(f.length(), 1.0));
    }

    #[test]
    fn no_turning_below_min_speed() {
        let mut store = EntityStore::new();
        let id = direct_agent(&mut store, Vec3::ZERO);
        let agent = store.agent_mut(id).unwrap();
        agent.commit_forces(Vec3::X * 0.05, Vec3::ZERO);
        agent.adjust_orientation(1.0);
        assert_eq!(agent.forward(), Vec3::Z);
    }

    #[test]
    fn stopped_agent_does_not_move() {
        let mut agent = agent_at(Vec3::ZERO);
        agent.stop();
        assert!(agent.frame(1.0).is_none());
        assert_eq!(agent.target_speed(), 0.0);
    }

    #[test]
    fn neighborhood_rules() {
        // facing +Z, id outside the store's range
        let me = AgentBuilder::new().build(EntityId(100), st_core::ShapeId(100));
        let mut store = EntityStore::new();
        let close_behind = store.insert_agent(AgentBuilder::new().position(Vec3::new(0.0, 0.0, -0.5)));
        let ahead = store.insert_agent(AgentBuilder::new().position(Vec3::new(0.0, 0.0, 3.0)));
        let behind = store.insert_agent(AgentBuilder::new().position(Vec3::new(0.0, 0.0, -3.0)));
        let far = store.insert_agent(AgentBuilder::new().position(Vec3::new(0.0, 0.0, 30.0)));
        let check = |id| me.is_in_neighborhood(store.agent(id).unwrap(), 1.0, 5.0, 0.7);
        assert!(check(close_behind));
        assert!(check(ahead));
        assert!(!check(behind));
        assert!(!check(far));
        assert!(!me.is_in_neighborhood(&me, 1.0, 5.0, 0.7));
    }

    #[test]
    fn predictions() {
        let mut store = EntityStore::new();
        let a = direct_agent(&mut store, Vec3::ZERO);
        let b = direct_agent(&mut store, Vec3::new(10.0, 0.0, 0.0));
        store.agent_mut(a).unwrap().set_velocity(Vec3::X);
        store.agent_mut(b).unwrap().set_velocity(-Vec3::X);
        let (a, b) = (store.agent(a).unwrap(), store.agent(b).unwrap());

        assert!(approx_v(a.predict_future_position(2.0), Vec3::X * 2.0));
        // Closing at 2 m/s over 10 m.
        assert!(approx(a.predict_nearest_approach_time(b), 5.0));
        assert!(approx(a.distance_from_perimeter(&b.entity), 9.0));
    }

    #[test]
    fn parallel_paths_approach_now() {
        let mut store = EntityStore::new();
        let a = direct_agent(&mut store, Vec3::ZERO);
        let b = direct_agent(&mut store, Vec3::X);
        store.agent_mut(a).unwrap().set_velocity(Vec3::Z);
        store.agent_mut(b).unwrap().set_velocity(Vec3::Z);
        let (a, b) = (store.agent(a).unwrap(), store.agent(b).unwrap());
        assert_eq!(a.predict_nearest_approach_time(b), 0.0);
    }

    #[test]
    fn target_speed_vector_is_limited() {
        let mut agent = agent_at(Vec3::ZERO);
        agent.set_max_force(1.0);
        assert!(approx_v(agent.target_speed_vector(5.0), Vec3::Z));
        assert!(approx_v(agent.target_speed_vector(0.5), Vec3::Z * 0.5));
    }

    #[test]
    fn reset_orientation_faces_z() {
        let mut agent = agent_at(Vec3::ZERO);
        agent.entity.set_forward(Vec3::X);
        agent.reset_orientation();
        assert_eq!(agent.forward(), Vec3::Z);
    }
}

// ── EntityStore ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod store {
    use super::*;
    use crate::AgentRngs;
    use st_core::{LayerMask, SteerError};

    #[test]
    fn ids_are_never_reused() {
        let mut store = EntityStore::new();
        let a = store.insert_agent(AgentBuilder::new());
        let o = store.insert_obstacle(Vec3::ONE, 2.0, LayerMask::default());
        assert_eq!(store.len(), 2);
        assert!(store.remove(a).is_some());
        assert!(store.remove(a).is_none());
        let c = store.insert_agent(AgentBuilder::new());
        assert_ne!(a, c);
        assert!(store.agent(a).is_none());
        assert!(store.entity(o).is_some());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn obstacle_is_not_an_agent() {
        let mut store = EntityStore::new();
        let o = store.insert_obstacle(Vec3::ZERO, 1.0, LayerMask::default());
        assert!(store.agent(o).is_none());
        assert!(matches!(store.require_agent(o), Err(SteerError::NotAnAgent(_))));
        assert!(matches!(store.require_agent(EntityId(99)), Err(SteerError::EntityNotFound(_))));
    }

    #[test]
    fn iterators_skip_despawned() {
        let mut store = EntityStore::new();
        let a = store.insert_agent(AgentBuilder::new());
        let b = store.insert_agent(AgentBuilder::new());
        store.insert_obstacle(Vec3::ZERO, 1.0, LayerMask::default());
        store.remove(a);
        assert_eq!(store.agent_ids().collect::<Vec<_>>(), vec![b]);
        assert_eq!(store.entities().count(), 2);
    }

    #[test]
    fn movement_priority_defaults_to_id() {
        let mut store = EntityStore::new();
        store.insert_agent(AgentBuilder::new());
        let b = store.insert_agent(AgentBuilder::new());
        let c = store.insert_agent(AgentBuilder::new().movement_priority(-4));
        assert_eq!(store.agent(b).unwrap().movement_priority, 1);
        assert_eq!(store.agent(c).unwrap().movement_priority, -4);
    }

    #[test]
    fn rngs_seed_lazily_and_release() {
        let mut rngs = AgentRngs::new(42);
        assert!(rngs.get_mut(EntityId(3)).is_none());
        rngs.ensure(EntityId(3));
        let first = rngs.get_mut(EntityId(3)).unwrap().point_in_unit_sphere();
        let mut again = AgentRngs::new(42);
        again.ensure(EntityId(3));
        assert_eq!(again.get_mut(EntityId(3)).unwrap().point_in_unit_sphere(), first);
        rngs.release(EntityId(3));
        assert!(rngs.get_mut(EntityId(3)).is_none());
    }
}
