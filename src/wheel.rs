// ==============================================================================
// wheel.rs — COSMETIC STEERING ANGLE
// ------------------------------------------------------------------------------
// A wheel visual is bound to its vehicle when it is created (no scene lookup).
// It only reads telemetry; it never feeds back into the simulation.
//
//   local yaw = rest yaw + turn * rotation_rate * modifier
// ==============================================================================

use crate::controller::VehicleTelemetry;
use crate::world::{DriftWorld, VehicleId};

pub const DEFAULT_STEER_MODIFIER: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelVisual {
    pub vehicle: VehicleId,
    pub rest_yaw_deg: f32,
    pub modifier: f32,
    pub steers: bool, // rear wheels stay at rest
}

impl WheelVisual {
    pub fn front(vehicle: VehicleId, rest_yaw_deg: f32) -> Self {
        Self {
            vehicle,
            rest_yaw_deg,
            modifier: DEFAULT_STEER_MODIFIER,
            steers: true,
        }
    }

    pub fn rear(vehicle: VehicleId, rest_yaw_deg: f32) -> Self {
        Self {
            steers: false,
            ..Self::front(vehicle, rest_yaw_deg)
        }
    }

    pub fn steer_angle(&self, telemetry: &VehicleTelemetry) -> f32 {
        if !self.steers {
            return 0.0;
        }
        telemetry.turn * telemetry.rotation_rate * self.modifier
    }

    pub fn local_yaw_from(&self, telemetry: &VehicleTelemetry) -> f32 {
        self.rest_yaw_deg + self.steer_angle(telemetry)
    }

    /// None once the owning vehicle has been removed.
    pub fn local_yaw(&self, world: &DriftWorld) -> Option<f32> {
        world.telemetry(self.vehicle).map(|t| self.local_yaw_from(&t))
    }
}
