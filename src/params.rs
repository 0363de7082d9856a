// ==============================================================================
// params.rs — TUNING: PHYSICS PARAMS, CHASSIS, SLIP CURVES
// ------------------------------------------------------------------------------
// DriftConfig is the on-disk shape (JSON, every field optional and defaulting to
// ARCADE). into_tuning() validates it once and freezes it into an
// Arc<DriftTuning> that every controller built from it shares read-only.
// ==============================================================================

use std::fs;
use std::path::Path;
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::drift::curve::KeyframeCurve;
use crate::drift::slip::SlipCurves;
use crate::error::{ConfigError, invalid};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsParams {
    pub accel: f32,                      // m/s^2
    pub boost_ratio: f32,                // accel multiplier while boosting
    pub top_speed: f32,                  // m/s (forward, local)
    pub grip_x: f32,                     // m/s^2 lateral decel
    pub grip_z: f32,                     // m/s^2 forward decel
    pub rotation_rate: f32,              // deg/s
    pub rotation_velocity_transfer: f32, // 0..1 velocity carried into a turn

    // fraction of chassis half extents; 0 = center, +/-1 = edge
    pub center_of_mass_fraction: [f32; 3],

    pub angular_drag_grounded: f32,      // keeps ground stumbles short
    pub angular_drag_airborne: f32,      // near free tumbling
    pub min_rotation_speed: f32,         // m/s before turning starts
    pub max_rotation_speed: f32,         // m/s for the full rate
    pub slip_modifier: f32,              // m/s lateral that maps to x = 1
}

pub const ARCADE: PhysicsParams = PhysicsParams {
    accel: 15.0,
    boost_ratio: 4.0 / 3.0,
    top_speed: 30.0,
    grip_x: 12.0,
    grip_z: 3.0,
    rotation_rate: 190.0,
    rotation_velocity_transfer: 0.8,

    center_of_mass_fraction: [0.0, 0.5, 0.0],

    angular_drag_grounded: 5.0,
    angular_drag_airborne: 0.05,
    min_rotation_speed: 1.0,
    max_rotation_speed: 4.0,
    slip_modifier: 20.0,
};

impl Default for PhysicsParams {
    fn default() -> Self {
        ARCADE
    }
}

impl PhysicsParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scalars = [
            ("accel", self.accel),
            ("boost_ratio", self.boost_ratio),
            ("top_speed", self.top_speed),
            ("grip_x", self.grip_x),
            ("grip_z", self.grip_z),
            ("rotation_rate", self.rotation_rate),
            ("rotation_velocity_transfer", self.rotation_velocity_transfer),
            ("angular_drag_grounded", self.angular_drag_grounded),
            ("angular_drag_airborne", self.angular_drag_airborne),
            ("min_rotation_speed", self.min_rotation_speed),
            ("max_rotation_speed", self.max_rotation_speed),
            ("slip_modifier", self.slip_modifier),
        ];
        for (name, value) in scalars {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!("params.{name} must be finite and >= 0 (got {value})")));
            }
        }

        if self.top_speed <= 0.0 {
            return Err(invalid("params.top_speed must be > 0"));
        }
        if self.slip_modifier <= 0.0 {
            return Err(invalid("params.slip_modifier must be > 0"));
        }
        if self.max_rotation_speed <= self.min_rotation_speed {
            return Err(invalid(format!(
                "params.max_rotation_speed ({}) must exceed min_rotation_speed ({})",
                self.max_rotation_speed, self.min_rotation_speed
            )));
        }
        if self.rotation_velocity_transfer > 1.0 {
            return Err(invalid("params.rotation_velocity_transfer must be within [0, 1]"));
        }
        if self
            .center_of_mass_fraction
            .iter()
            .any(|f| !f.is_finite() || !(-1.0..=1.0).contains(f))
        {
            return Err(invalid("params.center_of_mass_fraction entries must be within [-1, 1]"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChassisConfig {
    pub half_extents: [f32; 3], // [hx, hy, hz] meters
    pub mass: f32,              // kg
}

impl Default for ChassisConfig {
    fn default() -> Self {
        Self {
            half_extents: [1.0, 0.35, 2.1],
            mass: 1350.0,
        }
    }
}

impl ChassisConfig {
    pub fn half_height(&self) -> f32 {
        self.half_extents[1]
    }

    /// Local center of mass: half extents scaled by the CoM fraction.
    pub fn center_of_mass(&self, fraction: [f32; 3]) -> [f32; 3] {
        [
            self.half_extents[0] * fraction[0],
            self.half_extents[1] * fraction[1],
            self.half_extents[2] * fraction[2],
        ]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.half_extents.iter().any(|e| !e.is_finite() || *e <= 0.0) {
            return Err(invalid("chassis.half_extents must all be > 0"));
        }
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(invalid("chassis.mass must be > 0"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    pub params: PhysicsParams,
    pub chassis: ChassisConfig,
    pub slip_loading: KeyframeCurve,
    pub slip_unloading: KeyframeCurve,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            params: ARCADE,
            chassis: ChassisConfig::default(),
            slip_loading: KeyframeCurve::slip_loading_default(),
            slip_unloading: KeyframeCurve::slip_unloading_default(),
        }
    }
}

impl DriftConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|source| ConfigError::Parse { path: None, source })
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: Some(path.to_path_buf()),
            source,
        })?;
        debug!("loaded drift config from `{}`", path.display());
        Ok(config)
    }

    pub fn into_tuning(self) -> Result<Arc<DriftTuning>, ConfigError> {
        let curves = SlipCurves::new(self.slip_loading, self.slip_unloading);
        DriftTuning::new(self.params, self.chassis, curves).map(Arc::new)
    }
}

/// Validated, immutable tuning shared by every vehicle built from it.
#[derive(Debug, Clone)]
pub struct DriftTuning {
    params: PhysicsParams,
    chassis: ChassisConfig,
    curves: SlipCurves,
}

impl DriftTuning {
    pub fn new(params: PhysicsParams, chassis: ChassisConfig, curves: SlipCurves) -> Result<Self, ConfigError> {
        params.validate()?;
        chassis.validate()?;
        curves.validate()?;
        Ok(Self { params, chassis, curves })
    }

    pub fn params(&self) -> &PhysicsParams {
        &self.params
    }

    pub fn chassis(&self) -> &ChassisConfig {
        &self.chassis
    }

    pub fn curves(&self) -> &SlipCurves {
        &self.curves
    }
}
