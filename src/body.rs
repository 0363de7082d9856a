// ==============================================================================
// body.rs — RIGID-BODY HANDLE SEAM
// ------------------------------------------------------------------------------
// The controller only needs a handful of rigid-body operations, so it talks to
// `ChassisBody` instead of rapier directly:
// - pose (translation + rotation) get/set
// - linear velocity get/set, angular velocity get
// - angular damping set
// - local <-> world direction transforms and a yaw about world up (provided)
//
// Implemented for rapier's `RigidBody` and for `KinematicChassis`, a detached
// copy of the same state. The world captures a body into a KinematicChassis,
// runs the tick against it (the ground probe still borrows the body set), then
// commits it back.
// ==============================================================================

use rapier3d::na::UnitQuaternion;
use rapier3d::prelude::{Real, RigidBody, Vector};

use crate::drift::frame;

pub trait ChassisBody {
    fn translation(&self) -> Vector<Real>;
    fn set_translation(&mut self, translation: Vector<Real>);
    fn rotation(&self) -> UnitQuaternion<Real>;
    fn set_rotation(&mut self, rotation: UnitQuaternion<Real>);
    fn linvel(&self) -> Vector<Real>;
    fn set_linvel(&mut self, linvel: Vector<Real>);
    fn angvel(&self) -> Vector<Real>;
    fn set_angular_damping(&mut self, damping: Real);

    #[inline]
    fn to_local(&self, v: &Vector<Real>) -> Vector<Real> {
        self.rotation().inverse_transform_vector(v)
    }

    #[inline]
    fn to_world(&self, v: &Vector<Real>) -> Vector<Real> {
        self.rotation().transform_vector(v)
    }

    /// Composes a yaw of `delta_deg` about world up onto the current rotation.
    fn rotate_about_up(&mut self, delta_deg: Real) {
        let rotation = frame::from_yaw(delta_deg) * self.rotation();
        self.set_rotation(rotation);
    }
}

impl ChassisBody for RigidBody {
    fn translation(&self) -> Vector<Real> {
        *RigidBody::translation(self)
    }

    fn set_translation(&mut self, translation: Vector<Real>) {
        RigidBody::set_translation(self, translation, true);
    }

    fn rotation(&self) -> UnitQuaternion<Real> {
        *RigidBody::rotation(self)
    }

    fn set_rotation(&mut self, rotation: UnitQuaternion<Real>) {
        RigidBody::set_rotation(self, rotation, true);
    }

    fn linvel(&self) -> Vector<Real> {
        *RigidBody::linvel(self)
    }

    fn set_linvel(&mut self, linvel: Vector<Real>) {
        RigidBody::set_linvel(self, linvel, true);
    }

    fn angvel(&self) -> Vector<Real> {
        *RigidBody::angvel(self)
    }

    fn set_angular_damping(&mut self, damping: Real) {
        RigidBody::set_angular_damping(self, damping);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicChassis {
    pub translation: Vector<Real>,
    pub rotation: UnitQuaternion<Real>,
    pub linvel: Vector<Real>,
    pub angvel: Vector<Real>,
    pub angular_damping: Real,
}

impl KinematicChassis {
    pub fn at(translation: Vector<Real>, yaw_deg: Real) -> Self {
        Self {
            translation,
            rotation: frame::from_yaw(yaw_deg),
            linvel: Vector::zeros(),
            angvel: Vector::zeros(),
            angular_damping: 0.0,
        }
    }

    pub fn capture(body: &RigidBody) -> Self {
        Self {
            translation: *body.translation(),
            rotation: *body.rotation(),
            linvel: *body.linvel(),
            angvel: *body.angvel(),
            angular_damping: body.angular_damping(),
        }
    }

    /// Writes the pose, velocity and damping back onto `body`.
    pub fn commit(&self, body: &mut RigidBody) {
        body.set_translation(self.translation, true);
        body.set_rotation(self.rotation, true);
        body.set_linvel(self.linvel, true);
        body.set_angular_damping(self.angular_damping);
    }

    /// Moves the pose along the current velocities. Stand-in for a physics
    /// step when running a controller without a world.
    pub fn advance(&mut self, dt: Real) {
        self.translation += self.linvel * dt;
        let spin = UnitQuaternion::from_scaled_axis(self.angvel * dt);
        self.rotation = spin * self.rotation;
    }
}

impl ChassisBody for KinematicChassis {
    fn translation(&self) -> Vector<Real> {
        self.translation
    }

    fn set_translation(&mut self, translation: Vector<Real>) {
        self.translation = translation;
    }

    fn rotation(&self) -> UnitQuaternion<Real> {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: UnitQuaternion<Real>) {
        self.rotation = rotation;
    }

    fn linvel(&self) -> Vector<Real> {
        self.linvel
    }

    fn set_linvel(&mut self, linvel: Vector<Real>) {
        self.linvel = linvel;
    }

    fn angvel(&self) -> Vector<Real> {
        self.angvel
    }

    fn set_angular_damping(&mut self, damping: Real) {
        self.angular_damping = damping;
    }
}
