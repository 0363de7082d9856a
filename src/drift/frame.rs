//! Orientation helpers. Local frame: +X right, +Y up, +Z forward.
//! Euler angles are degrees and compose as yaw(Y) · pitch(X) · roll(Z).

use rapier3d::na::UnitQuaternion;
use rapier3d::prelude::{Point, Real, Vector};

/// (yaw, pitch, roll) in degrees. Pitch is in [-90, 90].
pub fn yaw_pitch_roll(rot: &UnitQuaternion<Real>) -> (Real, Real, Real) {
    let r = rot.to_rotation_matrix();
    let m = r.matrix();

    let pitch = (-m[(1, 2)]).clamp(-1.0, 1.0).asin();
    let yaw = m[(0, 2)].atan2(m[(2, 2)]);
    let roll = m[(1, 0)].atan2(m[(1, 1)]);

    (yaw.to_degrees(), pitch.to_degrees(), roll.to_degrees())
}

pub fn from_yaw_pitch_roll(yaw: Real, pitch: Real, roll: Real) -> UnitQuaternion<Real> {
    let y = UnitQuaternion::from_axis_angle(&Vector::y_axis(), yaw.to_radians());
    let x = UnitQuaternion::from_axis_angle(&Vector::x_axis(), pitch.to_radians());
    let z = UnitQuaternion::from_axis_angle(&Vector::z_axis(), roll.to_radians());
    y * x * z
}

#[inline]
pub fn from_yaw(yaw: Real) -> UnitQuaternion<Real> {
    UnitQuaternion::from_axis_angle(&Vector::y_axis(), yaw.to_radians())
}

#[inline]
pub fn forward(rot: &UnitQuaternion<Real>) -> Vector<Real> {
    rot * Vector::z()
}

#[inline]
pub fn up(rot: &UnitQuaternion<Real>) -> Vector<Real> {
    rot * Vector::y()
}

#[inline]
pub fn down(rot: &UnitQuaternion<Real>) -> Vector<Real> {
    -up(rot)
}

/// Wraps to (-180, 180].
pub fn wrap_degrees(raw: Real) -> Real {
    let a = raw.rem_euclid(360.0);
    if a > 180.0 { a - 360.0 } else { a }
}

/// Signed shortest rotation from `current` to `target`, degrees in (-180, 180].
pub fn delta_angle(current: Real, target: Real) -> Real {
    wrap_degrees(target - current)
}

/// Heading from `from` to `to` on the ground plane, measured like yaw.
pub fn bearing(from: &Point<Real>, to: &Point<Real>) -> Real {
    (to.x - from.x).atan2(to.z - from.z).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rapier3d::na as nalgebra; // point! expands to nalgebra:: paths
    use rapier3d::prelude::point;

    fn close(a: Real, b: Real) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn euler_round_trip_keeps_each_axis() {
        let q = from_yaw_pitch_roll(30.0, -20.0, 15.0);
        let (yaw, pitch, roll) = yaw_pitch_roll(&q);
        assert!(close(yaw, 30.0), "yaw {yaw}");
        assert!(close(pitch, -20.0), "pitch {pitch}");
        assert!(close(roll, 15.0), "roll {roll}");
    }

    #[test]
    fn positive_yaw_turns_forward_toward_plus_x() {
        let f = forward(&from_yaw(90.0));
        assert!(close(f.x, 1.0) && close(f.z, 0.0));
    }

    #[test]
    fn deltas_take_the_short_way_round() {
        assert!(close(delta_angle(170.0, -170.0), 20.0));
        assert!(close(delta_angle(-170.0, 170.0), -20.0));
        assert!(close(delta_angle(0.0, 45.0), 45.0));
        assert!(close(wrap_degrees(540.0), 180.0));
    }

    #[test]
    fn bearing_matches_yaw_convention() {
        let b = bearing(&point![0.0, 0.0, 0.0], &point![10.0, 0.0, 10.0]);
        assert!(close(b, 45.0));
        let yaw_toward = forward(&from_yaw(b));
        assert!(close(yaw_toward.x, yaw_toward.z));
    }
}
