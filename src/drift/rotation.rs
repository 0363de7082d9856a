// ==============================================================================
// rotation.rs — ROTATION-RATE SHAPING + CONSTANT-RATE YAW
// ------------------------------------------------------------------------------
// effective_rate(...):
// - 0 below min_speed (no spinning in place)
// - linear ramp from 0 at min_speed to the full rate at max_speed
// - never above the configured base rate
//
// yaw_delta(...):
//   sign(turn) * sign(v_forward) * rate * dt    (degrees)
//   The forward-velocity sign keeps steering intuitive in reverse.
// ==============================================================================

use crate::params::PhysicsParams;

/// Angular speed above STUMBLE_RATIO * rotation_rate * dt counts as stumbling.
pub const STUMBLE_RATIO: f32 = 0.1;

#[derive(Debug, Clone, Copy)]
pub struct RotationModel {
    pub base_rate: f32, // deg/s
    pub min_speed: f32, // m/s
    pub max_speed: f32, // m/s
}

impl RotationModel {
    pub fn from_params(params: &PhysicsParams) -> Self {
        Self {
            base_rate: params.rotation_rate,
            min_speed: params.min_rotation_speed,
            max_speed: params.max_rotation_speed,
        }
    }

    /// Shapes the active rate by the previous tick's local speed.
    pub fn effective_rate(&self, active_rate: f32, prev_speed: f32) -> f32 {
        if prev_speed < self.min_speed {
            return 0.0;
        }
        let span = (self.max_speed - self.min_speed).max(f32::EPSILON);
        let ramp = ((prev_speed - self.min_speed) / span).clamp(0.0, 1.0);

        (active_rate * ramp).clamp(0.0, self.base_rate)
    }

    pub fn yaw_delta(&self, rate: f32, turn: f32, forward_speed: f32, dt: f32) -> f32 {
        let dir = if forward_speed < 0.0 { -1.0 } else { 1.0 };
        turn.signum() * dir * rate * dt
    }

    /// Informational only; nothing gates on it yet.
    pub fn is_stumbling(&self, angular_speed: f32, dt: f32) -> bool {
        angular_speed > STUMBLE_RATIO * self.base_rate * dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> RotationModel {
        RotationModel::from_params(&PhysicsParams::default())
    }

    #[test]
    fn no_rotation_below_min_speed() {
        let m = model();
        assert_eq!(m.effective_rate(190.0, 0.0), 0.0);
        assert_eq!(m.effective_rate(190.0, 0.99), 0.0);
        assert_eq!(m.effective_rate(190.0, 1.0), 0.0);
    }

    #[test]
    fn ramps_up_to_base_rate() {
        let m = model();
        let half = m.effective_rate(190.0, 2.5);
        assert!((half - 95.0).abs() < 1e-3);
        assert_eq!(m.effective_rate(190.0, 4.0), 190.0);
        assert_eq!(m.effective_rate(190.0, 40.0), 190.0);
        // an already-reduced rate is never raised
        assert_eq!(m.effective_rate(0.0, 40.0), 0.0);
    }

    #[test]
    fn reverse_flips_turn_direction() {
        let m = model();
        let dt = 0.02;
        assert!((m.yaw_delta(190.0, 1.0, 5.0, dt) - 3.8).abs() < 1e-4);
        assert!((m.yaw_delta(190.0, 1.0, -5.0, dt) + 3.8).abs() < 1e-4);
        assert!((m.yaw_delta(190.0, -0.7, 0.0, dt) + 3.8).abs() < 1e-4);
    }

    #[test]
    fn stumbling_threshold_scales_with_dt() {
        let m = model();
        // 0.1 * 190 * 0.02 = 0.38 rad/s
        assert!(!m.is_stumbling(0.3, 0.02));
        assert!(m.is_stumbling(0.5, 0.02));
    }
}
