// ==============================================================================
// world.rs — HOST WORLD: RAPIER SETS + DRIFT VEHICLES
// ------------------------------------------------------------------------------
// DriftWorld owns the rapier pipeline, a flat ground slab and every vehicle.
// step(dt):
//   1) refresh the query pipeline (ground probes read it)
//   2) per vehicle: capture body -> controller tick -> commit body
//   3) rapier step (gravity, contacts)
//   4) out-of-bounds supervisor (fell off / blew up -> spawn + reset)
//   5) publish positions into each vehicle's beacon
// ==============================================================================

use std::collections::BTreeMap;
use std::fmt;

use log::{debug, info, warn};
use rapier3d::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::body::KinematicChassis;
use crate::controller::{DriftController, DriftControllerBuilder, VehicleTelemetry};
use crate::drift::{Faction, frame};
use crate::error::ConfigError;
use crate::ground::RapierGroundProbe;
use crate::input::TargetBeacon;

const GROUP_GROUND: Group = Group::from_bits_truncate(0b0001);
const GROUP_CHASSIS: Group = Group::from_bits_truncate(0b0010);

/// Below this height a vehicle is considered lost and sent back to spawn.
pub const DEFAULT_BOUNDS_FLOOR: Real = -10.0;
/// Any coordinate past this is treated as a blown-up body.
pub const WORLD_LIMIT: Real = 1_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VehicleId(Uuid);

impl VehicleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for VehicleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub struct Vehicle {
    pub body: RigidBodyHandle,
    pub controller: DriftController,
    pub beacon: TargetBeacon, // this vehicle's position, for chasers
}

#[derive(Debug, Clone, Serialize)]
pub struct VehicleSnapshot {
    pub id: VehicleId,
    pub faction: Faction,
    pub position: [f32; 3],
    pub yaw: f32, // deg
    pub telemetry: VehicleTelemetry,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub vehicles: Vec<VehicleSnapshot>,
}

pub struct DriftWorld {
    pub gravity: Vector<Real>,
    pub pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub joints: ImpulseJointSet,
    pub multibody_joints: MultibodyJointSet,
    pub ccd: CCDSolver,
    pub query_pipeline: QueryPipeline,
    pub vehicles: BTreeMap<VehicleId, Vehicle>, // ordered: deterministic tick order
    pub bounds_floor: Real,
    tick: u64,
}

impl Default for DriftWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl DriftWorld {
    pub fn new() -> Self {
        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        // Ground slab, top surface at y = 0.
        let ground = bodies.insert(RigidBodyBuilder::fixed().translation(vector![0.0, -0.5, 0.0]));
        let ground_collider = ColliderBuilder::cuboid(500.0, 0.5, 500.0)
            .collision_groups(InteractionGroups::new(GROUP_GROUND, GROUP_CHASSIS))
            .friction(1.2)
            .restitution(0.0)
            .build();
        colliders.insert_with_parent(ground_collider, ground, &mut bodies);

        info!("🌎 ground inserted. bodies = {}, colliders = {}", bodies.len(), colliders.len());

        Self {
            gravity: vector![0.0, -9.81, 0.0],
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies,
            colliders,
            joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            vehicles: BTreeMap::new(),
            bounds_floor: DEFAULT_BOUNDS_FLOOR,
            tick: 0,
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Builds the controller and its chassis. Nothing is inserted when the
    /// builder is missing a collaborator.
    pub fn spawn_vehicle(&mut self, builder: DriftControllerBuilder) -> Result<VehicleId, ConfigError> {
        let controller = builder.build()?;
        let tuning = controller.tuning();
        let params = tuning.params();
        let chassis = tuning.chassis();
        let spawn = controller.spawn_pose();

        let rb = RigidBodyBuilder::dynamic()
            .translation(spawn.translation())
            .rotation(spawn.rotation().scaled_axis())
            .angular_damping(params.angular_drag_grounded)
            .ccd_enabled(true)
            .build();

        let [hx, hy, hz] = chassis.half_extents;
        let [cx, cy, cz] = chassis.center_of_mass(params.center_of_mass_fraction);
        let volume = 8.0 * hx * hy * hz;
        let base = MassProperties::from_cuboid(chassis.mass / volume, vector![hx, hy, hz]);
        let mass = MassProperties::new(point![cx, cy, cz], base.mass(), base.principal_inertia());

        let collider = ColliderBuilder::cuboid(hx, hy, hz)
            .collision_groups(InteractionGroups::new(GROUP_CHASSIS, GROUP_GROUND | GROUP_CHASSIS))
            .mass_properties(mass)
            .friction(0.0) // the controller owns all traction
            .friction_combine_rule(CoefficientCombineRule::Min)
            .restitution(0.0)
            .build();

        let handle = self.bodies.insert(rb);
        self.colliders.insert_with_parent(collider, handle, &mut self.bodies);

        let id = VehicleId::new();
        let beacon = TargetBeacon::new(point![spawn.position[0], spawn.position[1], spawn.position[2]]);
        info!(
            "🚗 spawned {} vehicle {} at {:?} (body = {:?})",
            controller.faction(),
            id,
            spawn.position,
            handle
        );

        self.vehicles.insert(id, Vehicle { body: handle, controller, beacon });
        Ok(id)
    }

    pub fn remove_vehicle(&mut self, id: VehicleId) -> bool {
        let Some(vehicle) = self.vehicles.remove(&id) else {
            return false;
        };
        self.bodies.remove(
            vehicle.body,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.joints,
            &mut self.multibody_joints,
            true,
        );
        debug!("removed vehicle {id}");
        true
    }

    pub fn step(&mut self, dt: Real) {
        // 1) probes see this tick's collider poses. Refreshed once, so a probe
        // does not see chassis moved by earlier commits; probes only look for ground.
        self.query_pipeline.update(&self.colliders);

        // 2) drift controllers
        for vehicle in self.vehicles.values_mut() {
            let Some(rb) = self.bodies.get(vehicle.body) else {
                continue;
            };
            let mut chassis = KinematicChassis::capture(rb);
            let probe = RapierGroundProbe {
                query: &self.query_pipeline,
                bodies: &self.bodies,
                colliders: &self.colliders,
                exclude: vehicle.body,
            };

            vehicle.controller.on_fixed_tick(&mut chassis, &probe, dt);

            if let Some(rb) = self.bodies.get_mut(vehicle.body) {
                chassis.commit(rb);
            }
        }

        // 3) rigid-body step
        self.pipeline.step(
            &self.gravity,
            &IntegrationParameters {
                dt,
                ..IntegrationParameters::default()
            },
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );

        // 4) + 5)
        self.supervise_bounds();
        self.publish_beacons();

        self.tick += 1;
    }

    fn supervise_bounds(&mut self) {
        for (id, vehicle) in self.vehicles.iter_mut() {
            let Some(rb) = self.bodies.get_mut(vehicle.body) else {
                continue;
            };
            let pos = *rb.translation();

            let lost = pos.y < self.bounds_floor
                || pos.iter().any(|c| !c.is_finite() || c.abs() > WORLD_LIMIT);
            if !lost {
                continue;
            }

            let spawn = vehicle.controller.spawn_pose();
            rb.set_translation(spawn.translation(), true);
            rb.set_rotation(spawn.rotation(), true);
            rb.set_linvel(Vector::zeros(), true);
            rb.set_angvel(Vector::zeros(), true);
            vehicle.controller.request_reset();

            warn!("⚠️ vehicle {id} out of bounds at {pos:?}, back to spawn {:?}", spawn.position);
        }
    }

    fn publish_beacons(&self) {
        for vehicle in self.vehicles.values() {
            if let Some(rb) = self.bodies.get(vehicle.body) {
                vehicle.beacon.publish(Point::from(*rb.translation()));
            }
        }
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(&id)
    }

    pub fn body(&self, id: VehicleId) -> Option<&RigidBody> {
        self.vehicles.get(&id).and_then(|v| self.bodies.get(v.body))
    }

    pub fn body_mut(&mut self, id: VehicleId) -> Option<&mut RigidBody> {
        let handle = self.vehicles.get(&id)?.body;
        self.bodies.get_mut(handle)
    }

    /// Live position feed for a chase target.
    pub fn beacon(&self, id: VehicleId) -> Option<TargetBeacon> {
        self.vehicles.get(&id).map(|v| v.beacon.clone())
    }

    pub fn telemetry(&self, id: VehicleId) -> Option<VehicleTelemetry> {
        self.vehicles.get(&id).map(|v| v.controller.telemetry())
    }

    pub fn request_reset(&mut self, id: VehicleId) -> bool {
        match self.vehicles.get_mut(&id) {
            Some(v) => {
                v.controller.request_reset();
                true
            }
            None => false,
        }
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        let vehicles = self
            .vehicles
            .iter()
            .filter_map(|(id, v)| {
                let rb = self.bodies.get(v.body)?;
                let t = rb.translation();
                let (yaw, _, _) = frame::yaw_pitch_roll(rb.rotation());
                Some(VehicleSnapshot {
                    id: *id,
                    faction: v.controller.faction(),
                    position: [t.x, t.y, t.z],
                    yaw,
                    telemetry: v.controller.telemetry(),
                })
            })
            .collect();

        WorldSnapshot { tick: self.tick, vehicles }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::SpawnPose;
    use crate::input::TargetProvider;
    use crate::params::DriftConfig;

    const DT: Real = 1.0 / 60.0;

    fn neutral_world(spawn: SpawnPose) -> (DriftWorld, VehicleId) {
        let tuning = DriftConfig::default().into_tuning().unwrap();
        let mut world = DriftWorld::new();
        let id = world
            .spawn_vehicle(DriftController::builder(tuning, Faction::Neutral).spawn(spawn))
            .unwrap();
        (world, id)
    }

    #[test]
    fn missing_collaborator_inserts_nothing() {
        let tuning = DriftConfig::default().into_tuning().unwrap();
        let mut world = DriftWorld::new();
        let bodies = world.bodies.len();

        let err = world.spawn_vehicle(DriftController::builder(tuning, Faction::Enemy));
        assert!(matches!(err, Err(ConfigError::MissingCollaborator(_))));
        assert_eq!(world.bodies.len(), bodies);
        assert!(world.vehicles.is_empty());
    }

    #[test]
    fn neutral_vehicle_lands_and_reaches_top_speed() {
        let (mut world, id) = neutral_world(SpawnPose::new([0.0, 1.0, 0.0], 0.0));

        for _ in 0..300 {
            world.step(DT);
        }

        let t = world.telemetry(id).unwrap();
        assert!(t.grounded, "{t:?}");
        assert!(t.forward_velocity > 25.0 && t.forward_velocity <= 30.0 + 1e-3, "{t:?}");
        assert!(t.lateral_velocity.abs() < 0.5);

        let z = world.body(id).unwrap().translation().z;
        assert!(z > 20.0, "moved forward along +z: {z}");
    }

    #[test]
    fn fallen_vehicle_returns_to_spawn_then_resets() {
        let spawn = SpawnPose::new([5.0, 1.0, -3.0], 90.0);
        let (mut world, id) = neutral_world(spawn);

        world.body_mut(id).unwrap().set_translation(vector![40.0, -20.0, 40.0], true);
        world.step(DT);

        let t = *world.body(id).unwrap().translation();
        assert_eq!(t, spawn.translation());
        assert!(world.vehicle(id).unwrap().controller.state().reset_requested);

        world.step(DT);
        let y = world.body(id).unwrap().translation().y;
        assert!(y > 2.5, "reset lifted the chassis: {y}");
        assert!(!world.vehicle(id).unwrap().controller.state().reset_requested);
    }

    #[test]
    fn beacons_follow_their_vehicle() {
        let (mut world, id) = neutral_world(SpawnPose::default());
        let beacon = world.beacon(id).unwrap();
        for _ in 0..30 {
            world.step(DT);
        }
        let body_pos = *world.body(id).unwrap().translation();
        assert_eq!(beacon.position().coords, body_pos);
    }

    #[test]
    fn snapshot_serializes() {
        let (mut world, id) = neutral_world(SpawnPose::default());
        world.step(DT);

        let snap = world.snapshot();
        assert_eq!(snap.tick, 1);
        assert_eq!(snap.vehicles.len(), 1);
        assert_eq!(snap.vehicles[0].id, id);

        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"faction\":\"neutral\""), "{json}");
        assert!(world.remove_vehicle(id));
        assert!(world.snapshot().vehicles.is_empty());
    }
}
