// ==============================================================================
// traction.rs — ACTIVE PER-TICK VALUES + GRIP INTEGRATION
// ------------------------------------------------------------------------------
// ActiveParams is rebuilt from PhysicsParams at the top of every tick, then
// narrowed stage by stage (slope, grounding, rotation shaping, slip, boost,
// throttle). Nothing in it survives to the next tick.
//
// Grip is a constant deceleration toward zero per local axis. It stops exactly
// at zero and never pushes a component through to the opposite sign.
// ==============================================================================

use rapier3d::prelude::{Real, Vector};
use serde::Serialize;

use crate::params::PhysicsParams;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActiveParams {
    pub accel: f32,        // m/s^2
    pub grip_x: f32,       // m/s^2 lateral
    pub grip_z: f32,       // m/s^2 forward
    pub rotation: f32,     // deg/s
    pub transfer: f32,     // 0..1
    pub angular_drag: f32,
}

impl ActiveParams {
    pub fn from_params(p: &PhysicsParams) -> Self {
        Self {
            accel: p.accel,
            grip_x: p.grip_x,
            grip_z: p.grip_z,
            rotation: p.rotation_rate,
            transfer: p.rotation_velocity_transfer,
            angular_drag: p.angular_drag_grounded,
        }
    }

    /// Climbing or banking costs traction. cos() is clamped so a body past
    /// 90 degrees gets zero, not a negative pull.
    pub fn attenuate_for_slope(&mut self, pitch_deg: f32, roll_deg: f32) {
        let cp = pitch_deg.to_radians().cos();
        let cr = roll_deg.to_radians().cos();

        self.accel = (self.accel * cp).max(0.0);
        self.grip_z = (self.grip_z * cp).max(0.0);
        self.grip_x = (self.grip_x * cr).max(0.0);
    }

    pub fn apply_grounding(&mut self, grounded: bool, p: &PhysicsParams) {
        if grounded {
            self.angular_drag = p.angular_drag_grounded;
        } else {
            self.rotation = 0.0;
            self.accel = 0.0;
            self.grip_x = 0.0;
            self.grip_z = 0.0;
            self.angular_drag = p.angular_drag_airborne;
        }
    }
}

/// Decelerates `v` toward zero by `decel`, stopping at zero.
#[inline]
pub fn apply_grip(v: Real, decel: Real) -> Real {
    if v > 0.0 {
        (v - decel).max(0.0)
    } else if v < 0.0 {
        (v + decel).min(0.0)
    } else {
        0.0
    }
}

#[inline]
pub fn clamp_top_speed(v_forward: Real, top_speed: Real) -> Real {
    v_forward.clamp(-top_speed, top_speed)
}

/// transfer = 1: velocity follows the new heading.
/// transfer = 0: velocity keeps its world direction (drift).
#[inline]
pub fn blend_transfer(post: Vector<Real>, pre: Vector<Real>, transfer: Real) -> Vector<Real> {
    post * (1.0 - transfer) + pre * transfer
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn grip_never_reverses_sign() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..10_000 {
            let v: f32 = rng.gen_range(-60.0..60.0);
            let g: f32 = rng.gen_range(0.0..30.0);
            let out = apply_grip(v, g);

            assert!(out.abs() <= v.abs(), "v={v} g={g} out={out}");
            assert!(out == 0.0 || out.signum() == v.signum(), "v={v} g={g} out={out}");
        }
        assert_eq!(apply_grip(0.1, 0.24), 0.0);
        assert_eq!(apply_grip(-0.1, 0.24), 0.0);
        assert_eq!(apply_grip(0.0, 0.24), 0.0);
    }

    #[test]
    fn slope_at_ninety_degrees_is_zero_not_negative() {
        let p = PhysicsParams::default();

        let mut pitched = ActiveParams::from_params(&p);
        pitched.attenuate_for_slope(90.0, 0.0);
        assert_eq!(pitched.accel, 0.0);
        assert_eq!(pitched.grip_z, 0.0);
        assert_eq!(pitched.grip_x, p.grip_x);

        let mut rolled = ActiveParams::from_params(&p);
        rolled.attenuate_for_slope(0.0, 90.0);
        assert_eq!(rolled.grip_x, 0.0);

        let mut flipped = ActiveParams::from_params(&p);
        flipped.attenuate_for_slope(0.0, 180.0);
        assert_eq!(flipped.grip_x, 0.0);
    }

    #[test]
    fn airborne_zeroes_traction() {
        let p = PhysicsParams::default();
        let mut a = ActiveParams::from_params(&p);
        a.apply_grounding(false, &p);

        assert_eq!((a.accel, a.grip_x, a.grip_z, a.rotation), (0.0, 0.0, 0.0, 0.0));
        assert_eq!(a.angular_drag, p.angular_drag_airborne);
    }

    #[test]
    fn transfer_blends_between_headings() {
        let post = Vector::new(1.0, 0.0, 0.0);
        let pre = Vector::new(0.0, 0.0, 1.0);
        assert_eq!(blend_transfer(post, pre, 1.0), pre);
        assert_eq!(blend_transfer(post, pre, 0.0), post);
        assert_eq!(clamp_top_speed(-45.0, 30.0), -30.0);
    }
}
