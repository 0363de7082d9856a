use drift_physics::drift::frame::{bearing, delta_angle, yaw_pitch_roll};
use drift_physics::{
    ChassisBody, DriftConfig, DriftController, DriftWorld, Faction, KinematicChassis, SlipState, SpawnPose,
};
use rapier3d::na as nalgebra; // point!/vector! expand to nalgebra:: paths
use rapier3d::prelude::{Point, Real, Vector, point, vector};

const DT: Real = 1.0 / 50.0;

fn flat_ground(_: Point<Real>, _: Vector<Real>, _: Real) -> bool {
    true
}

#[test]
fn chase_ai_turns_toward_target_then_straightens() {
    let tuning = DriftConfig::default().into_tuning().unwrap();
    let target = point![10.0, 0.0, 10.0];
    let mut ctl = DriftController::builder(tuning, Faction::Enemy)
        .chase_target(target)
        .build()
        .unwrap();
    let mut body = KinematicChassis::at(Vector::zeros(), 0.0);

    assert!((bearing(&point![0.0, 0.0, 0.0], &target) - 45.0).abs() < 1e-4);

    let first = ctl.on_fixed_tick(&mut body, &flat_ground, DT);
    assert_eq!(first.intent.turn, 1.0);
    assert_eq!(first.intent.throttle, 1.0);
    body.advance(DT);

    let mut converged = false;
    for _ in 0..200 {
        let here = Point::from(body.translation());
        let (yaw, _, _) = yaw_pitch_roll(&body.rotation());
        let delta = delta_angle(yaw, bearing(&here, &target));

        let report = ctl.on_fixed_tick(&mut body, &flat_ground, DT);
        body.advance(DT);

        if delta.abs() <= 10.0 {
            assert_eq!(report.intent.turn, 0.0, "delta {delta}");
            assert!(!report.rotating);
            converged = true;
            break;
        }
        assert_eq!(report.intent.turn, delta.signum());
    }
    assert!(converged, "yaw never came within 10 degrees of the target bearing");
}

#[test]
fn neutral_vehicle_approaches_top_speed_without_lateral_drift() {
    let tuning = DriftConfig::default().into_tuning().unwrap();
    let top = tuning.params().top_speed;
    let mut ctl = DriftController::builder(tuning, Faction::Neutral).build().unwrap();
    let mut body = KinematicChassis::at(Vector::zeros(), 30.0);

    let mut last = 0.0;
    for _ in 0..250 {
        let report = ctl.on_fixed_tick(&mut body, &flat_ground, DT);
        body.advance(DT);

        let t = ctl.telemetry();
        assert!(report.grounded);
        assert!(t.lateral_velocity.abs() < 1e-4, "lateral {}", t.lateral_velocity);
        assert!(t.forward_velocity <= top + 1e-4);
        assert!(t.forward_velocity >= last - 1e-4, "forward speed dropped");
        assert_eq!(t.slip_state, SlipState::Normal);
        last = t.forward_velocity;
    }
    assert!(last > top - 0.1, "forward {last} never approached {top}");
}

#[test]
fn enemy_closes_on_a_target_in_the_rapier_world() {
    let tuning = DriftConfig::default().into_tuning().unwrap();
    let mut world = DriftWorld::new();
    let target = point![0.0, 0.0, 60.0];
    let enemy = world
        .spawn_vehicle(
            DriftController::builder(tuning, Faction::Enemy)
                .spawn(SpawnPose::new([0.0, 1.0, 0.0], 90.0))
                .chase_target(target),
        )
        .unwrap();

    let mut closest = Real::MAX;
    for _ in 0..600 {
        world.step(1.0 / 60.0);
        let p = world.body(enemy).unwrap().translation();
        let d = ((p.x - target.x).powi(2) + (p.z - target.z).powi(2)).sqrt();
        closest = closest.min(d);
    }
    assert!(closest < 6.0, "closest approach {closest}");
}

#[test]
fn enemy_follows_a_moving_beacon() {
    let tuning = DriftConfig::default().into_tuning().unwrap();
    let mut world = DriftWorld::new();
    let lead = world
        .spawn_vehicle(DriftController::builder(tuning.clone(), Faction::Neutral).spawn(SpawnPose::new([0.0, 1.0, 30.0], 0.0)))
        .unwrap();
    let beacon = world.beacon(lead).unwrap();
    let chaser = world
        .spawn_vehicle(
            DriftController::builder(tuning, Faction::Enemy)
                .spawn(SpawnPose::new([-15.0, 1.0, 0.0], 90.0))
                .chase_target(beacon),
        )
        .unwrap();

    for _ in 0..240 {
        world.step(1.0 / 60.0);
    }

    // the lead drives along +z; the chaser should have swung round to follow it
    let rb = world.body(chaser).unwrap();
    let (yaw, _, _) = yaw_pitch_roll(rb.rotation());
    assert!(yaw.abs() < 45.0, "chaser heading {yaw}");
    let fwd = rb.rotation() * vector![0.0, 0.0, 1.0];
    assert!(fwd.z > 0.5);
}
