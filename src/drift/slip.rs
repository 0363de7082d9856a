// ==============================================================================
// slip.rs — SLIP HYSTERESIS (SCHMITT TRIGGER OVER TWO CURVES)
// ------------------------------------------------------------------------------
// Input: x = |previous-tick local lateral velocity| / slip_modifier
//
//   Normal   : slip = loading(x);   slip == 1.0 -> Slipping
//   Slipping : slip = unloading(x); slip == 0.0 -> Normal
//
// Two curves with different crossing points give gradual grip loss and a snappy
// recovery without chattering around a single threshold.
//
// The curves are shared and pure; the only state is the SlipState flag, which
// lives in VehicleState and is passed in by the controller.
// ==============================================================================

use std::fmt;
use std::sync::Arc;

use crate::drift::curve::{Curve, Monotonic, curve_reaches, validate_curve};
use crate::drift::types::SlipState;
use crate::error::{ConfigError, invalid};

/// rotation *= 1 - SLIP_ROTATION_SCALE * slip
pub const SLIP_ROTATION_SCALE: f32 = 0.3;

pub type SharedCurve = Arc<dyn Curve + Send + Sync>;

#[derive(Clone)]
pub struct SlipCurves {
    pub loading: SharedCurve,   // Normal -> Slipping
    pub unloading: SharedCurve, // Slipping -> Normal
}

impl fmt::Debug for SlipCurves {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlipCurves").finish_non_exhaustive()
    }
}

impl SlipCurves {
    pub fn new<L, U>(loading: L, unloading: U) -> Self
    where
        L: Curve + Send + Sync + 'static,
        U: Curve + Send + Sync + 'static,
    {
        Self {
            loading: Arc::new(loading),
            unloading: Arc::new(unloading),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let loading = validate_curve("slip loading", self.loading.as_ref())?;
        if loading == Monotonic::NonIncreasing {
            return Err(invalid("slip loading curve must be non-decreasing"));
        }
        if !curve_reaches(self.loading.as_ref(), 1.0) {
            return Err(invalid("slip loading curve never reaches 1.0, so slipping can never start"));
        }

        validate_curve("slip unloading", self.unloading.as_ref())?;
        if !curve_reaches(self.unloading.as_ref(), 0.0) {
            return Err(invalid("slip unloading curve never reaches 0.0, so grip can never recover"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SlipModel {
    curves: SlipCurves,
}

impl SlipModel {
    pub fn new(curves: SlipCurves) -> Self {
        Self { curves }
    }

    /// Advances the hysteresis flag and returns slip in [0, 1].
    pub fn advance(&self, state: &mut SlipState, lateral_speed: f32, slip_modifier: f32) -> f32 {
        let x = lateral_speed.abs() / slip_modifier;

        match *state {
            SlipState::Normal => {
                let slip = clamp_unit(self.curves.loading.evaluate(x));
                if slip == 1.0 {
                    *state = SlipState::Slipping;
                }
                slip
            }
            SlipState::Slipping => {
                let slip = clamp_unit(self.curves.unloading.evaluate(x));
                if slip == 0.0 {
                    *state = SlipState::Normal;
                }
                slip
            }
        }
    }
}

#[inline]
fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

#[inline]
pub fn slip_scaled_rotation(rotation: f32, slip: f32) -> f32 {
    rotation * (1.0 - SLIP_ROTATION_SCALE * slip)
}

#[inline]
pub fn slip_scaled_transfer(transfer: f32, slip: f32) -> f32 {
    transfer * (1.0 - slip)
}
