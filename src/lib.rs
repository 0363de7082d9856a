//! Arcade drift controller: a fixed-tick, per-vehicle pass that turns control
//! intent into velocity and yaw changes on a rigid body, plus a rapier host
//! world to run it in.

pub mod body;
pub mod controller;
pub mod drift;
pub mod error;
pub mod ground;
pub mod input;
pub mod params;
pub mod wheel;
pub mod world;

pub use body::{ChassisBody, KinematicChassis};
pub use controller::{DriftController, DriftControllerBuilder, SpawnPose, TickReport, VehicleState, VehicleTelemetry};
pub use drift::{ControlIntent, Curve, Faction, KeyframeCurve, SlipCurves, SlipState};
pub use error::ConfigError;
pub use ground::{GroundProbe, GroundSensor, RapierGroundProbe};
pub use input::{AxisPoller, AxisSample, ChaseAi, InputSource, TargetBeacon, TargetProvider};
pub use params::{ARCADE, ChassisConfig, DriftConfig, DriftTuning, PhysicsParams};
pub use wheel::WheelVisual;
pub use world::{DriftWorld, VehicleId, WorldSnapshot};
