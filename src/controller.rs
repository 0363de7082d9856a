// ==============================================================================
// controller.rs — FIXED-TICK DRIFT CONTROLLER
// ------------------------------------------------------------------------------
// DriftController::on_fixed_tick(body, ground, dt) runs one tick, strictly:
//
//   1) active values := PhysicsParams
//   2) slope:    accel, grip_z *= cos(pitch); grip_x *= cos(roll); >= 0
//   3) ground:   airborne -> no accel / grip / rotation, airborne ang. drag
//   4) stumbling flag (read-only)
//   5) rotation shaped by previous-tick local speed, capped at base
//   6) slip hysteresis on previous-tick lateral speed -> rotation, transfer
//   7) intent from the InputSource (reset edge latched)
//   8) boost:    accel *= boost_ratio (this tick only)
//   9) throttle: world impulse along forward, forward grip off this tick
//  10) watchdog (AI factions) -> reset request
//  11) reset:    level pitch/roll, keep yaw, drop speed, lift, clear request
//  12) pre-rotation local velocity (also next tick's "previous")
//  13) turn:     yaw about world up
//  14) passive:  transfer blend, lateral + forward grip, top speed, commit
//
// The order is load-bearing. Nothing in here can fail; setup problems are
// rejected by DriftControllerBuilder::build.
// ==============================================================================

use std::sync::Arc;

use log::{debug, info, trace, warn};
use rapier3d::na::UnitQuaternion;
use rapier3d::prelude::{Point, Real, Vector};
use serde::Serialize;

use crate::body::ChassisBody;
use crate::drift::frame;
use crate::drift::slip::{SlipModel, slip_scaled_rotation, slip_scaled_transfer};
use crate::drift::traction::{ActiveParams, apply_grip, blend_transfer, clamp_top_speed};
use crate::drift::{ControlIntent, Faction, ResetWatchdog, RotationModel, SlipState};
use crate::error::ConfigError;
use crate::ground::{GroundProbe, GroundSensor};
use crate::input::{AxisPoller, ChaseAi, InputSource, TargetProvider};
use crate::params::DriftTuning;

/// Upward nudge applied by a reset (m).
pub const RESET_LIFT: Real = 2.0;
/// Vertical speed right after a reset (m/s, downward).
pub const RESET_DROP_SPEED: Real = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpawnPose {
    pub position: [f32; 3],
    pub yaw_deg: f32,
}

impl SpawnPose {
    pub fn new(position: [f32; 3], yaw_deg: f32) -> Self {
        Self { position, yaw_deg }
    }

    pub fn translation(&self) -> Vector<Real> {
        Vector::new(self.position[0], self.position[1], self.position[2])
    }

    pub fn rotation(&self) -> UnitQuaternion<Real> {
        frame::from_yaw(self.yaw_deg)
    }
}

impl Default for SpawnPose {
    fn default() -> Self {
        Self::new([0.0, 1.0, 0.0], 0.0)
    }
}

/// Everything that survives between ticks. Only the controller writes it.
#[derive(Debug, Clone)]
pub struct VehicleState {
    pub position: Point<Real>,
    pub yaw_deg: Real,
    pub pitch_deg: Real,
    pub roll_deg: Real,
    pub linvel: Vector<Real>,
    pub prev_local_velocity: Vector<Real>, // pre-rotation local velocity of the last tick
    pub local_velocity: Vector<Real>,      // committed local velocity of the last tick
    pub angvel: Vector<Real>,
    pub grounded: bool,
    pub slip_state: SlipState,
    pub slip: f32,
    pub watchdog: ResetWatchdog,
    pub reset_requested: bool,
    pub is_rotating: bool,
    pub is_stumbling: bool,
    pub turn: f32,
    pub spawn: SpawnPose,
}

impl VehicleState {
    fn spawned(spawn: SpawnPose) -> Self {
        let t = spawn.translation();
        Self {
            position: Point::from(t),
            yaw_deg: spawn.yaw_deg,
            pitch_deg: 0.0,
            roll_deg: 0.0,
            linvel: Vector::zeros(),
            prev_local_velocity: Vector::zeros(),
            local_velocity: Vector::zeros(),
            angvel: Vector::zeros(),
            grounded: false,
            slip_state: SlipState::Normal,
            slip: 0.0,
            watchdog: ResetWatchdog::default(),
            reset_requested: false,
            is_rotating: false,
            is_stumbling: false,
            turn: 0.0,
            spawn,
        }
    }
}

/// What a tick actually used; handy for assertions and debug overlays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TickReport {
    pub active: ActiveParams,
    pub intent: ControlIntent,
    pub grounded: bool,
    pub slip: f32,
    pub stumbling: bool,
    pub rotating: bool,
    pub reset_applied: bool,
}

/// Per-tick outputs for cosmetic collaborators (wheel visuals, HUD, camera).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VehicleTelemetry {
    pub lateral_velocity: f32,
    pub forward_velocity: f32,
    pub turn: f32,
    pub rotation_rate: f32, // configured base, deg/s
    pub grounded: bool,
    pub slip: f32,
    pub slip_state: SlipState,
    pub stumbling: bool,
    pub rotating: bool,
}

pub struct DriftController {
    tuning: Arc<DriftTuning>,
    faction: Faction,
    input: InputSource,
    sensor: GroundSensor,
    rotation: RotationModel,
    slip: SlipModel,
    state: VehicleState,
}

impl DriftController {
    pub fn builder(tuning: Arc<DriftTuning>, faction: Faction) -> DriftControllerBuilder {
        DriftControllerBuilder {
            tuning,
            faction,
            spawn: SpawnPose::default(),
            poller: None,
            target: None,
        }
    }

    pub fn faction(&self) -> Faction {
        self.faction
    }

    pub fn tuning(&self) -> &Arc<DriftTuning> {
        &self.tuning
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    pub fn spawn_pose(&self) -> SpawnPose {
        self.state.spawn
    }

    pub fn ground_sensor(&self) -> &GroundSensor {
        &self.sensor
    }

    /// Latches a reset for the next tick. Safe to call between ticks only.
    pub fn request_reset(&mut self) {
        self.state.reset_requested = true;
    }

    pub fn telemetry(&self) -> VehicleTelemetry {
        let s = &self.state;
        VehicleTelemetry {
            lateral_velocity: s.local_velocity.x,
            forward_velocity: s.local_velocity.z,
            turn: s.turn,
            rotation_rate: self.tuning.params().rotation_rate,
            grounded: s.grounded,
            slip: s.slip,
            slip_state: s.slip_state,
            stumbling: s.is_stumbling,
            rotating: s.is_rotating,
        }
    }

    pub fn on_fixed_tick<B, P>(&mut self, body: &mut B, ground: &P, dt: Real) -> TickReport
    where
        B: ChassisBody + ?Sized,
        P: GroundProbe + ?Sized,
    {
        let tuning = Arc::clone(&self.tuning);
        let params = tuning.params();

        let rotation = body.rotation();
        let (yaw, pitch, roll) = frame::yaw_pitch_roll(&rotation);
        let origin = Point::from(body.translation());

        // 1) + 2) base values, slope attenuation
        let mut active = ActiveParams::from_params(params);
        active.attenuate_for_slope(pitch, roll);

        // 3) grounding gates traction and picks angular drag
        let grounded = self.sensor.sense(ground, origin, frame::down(&rotation));
        active.apply_grounding(grounded, params);
        body.set_angular_damping(active.angular_drag);

        // 4) informational
        let stumbling = self.rotation.is_stumbling(body.angvel().norm(), dt);

        // 5) + 6) previous-tick velocity shapes rotation and slip
        let prev = self.state.prev_local_velocity;
        active.rotation = self.rotation.effective_rate(active.rotation, prev.norm());

        let slip = self.slip.advance(&mut self.state.slip_state, prev.x, params.slip_modifier);
        active.rotation = slip_scaled_rotation(active.rotation, slip);
        active.transfer = slip_scaled_transfer(active.transfer, slip);

        // 7) intent
        let intent = self.input.next_intent(&origin, yaw);
        self.state.reset_requested |= intent.reset;

        // 8) boost
        if intent.boost {
            active.accel *= params.boost_ratio;
        }

        // 9) throttle; spinning wheels have no forward grip
        if intent.wants_throttle() {
            let push = frame::forward(&rotation) * (intent.throttle * active.accel * dt);
            body.set_linvel(body.linvel() + push);
            active.grip_z = 0.0;
        }

        // 10) stuck watchdog (AI only)
        if self.faction.auto_resets() && self.state.watchdog.observe(prev.norm()) {
            debug!("{} vehicle stuck for two ticks, requesting reset", self.faction);
            self.state.reset_requested = true;
        }

        // 11) reset, applied exactly once per request
        let reset_applied = self.state.reset_requested;
        if reset_applied {
            apply_reset(body);
            self.state.reset_requested = false;
            debug!("{} vehicle reset at {:?}", self.faction, body.translation());
        }

        // 12) local velocity before turning
        let pre = body.to_local(&body.linvel());
        self.state.prev_local_velocity = pre;

        // 13) constant-rate yaw
        let rotating = intent.wants_turn();
        if rotating {
            let delta = self.rotation.yaw_delta(active.rotation, intent.turn, pre.z, dt);
            body.rotate_about_up(delta);
        }

        // 14) passive integration in the (possibly new) local frame
        let mut local = body.to_local(&body.linvel());
        if rotating {
            local = blend_transfer(local, pre, active.transfer);
        }
        local.x = apply_grip(local.x, active.grip_x * dt);
        local.z = apply_grip(local.z, active.grip_z * dt);
        local.z = clamp_top_speed(local.z, params.top_speed);
        body.set_linvel(body.to_world(&local));

        self.commit(body, local, grounded, slip, stumbling, rotating, intent.turn);

        trace!(
            "{} tick: grounded={} slip={:.3} v_local=[{:.2}, {:.2}, {:.2}]",
            self.faction, grounded, slip, local.x, local.y, local.z
        );

        TickReport {
            active,
            intent,
            grounded,
            slip,
            stumbling,
            rotating,
            reset_applied,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn commit<B>(
        &mut self,
        body: &B,
        local: Vector<Real>,
        grounded: bool,
        slip: f32,
        stumbling: bool,
        rotating: bool,
        turn: f32,
    ) where
        B: ChassisBody + ?Sized,
    {
        let (yaw, pitch, roll) = frame::yaw_pitch_roll(&body.rotation());
        let s = &mut self.state;

        s.position = Point::from(body.translation());
        s.yaw_deg = yaw;
        s.pitch_deg = pitch;
        s.roll_deg = roll;
        s.linvel = body.linvel();
        s.local_velocity = local;
        s.angvel = body.angvel();
        s.grounded = grounded;
        s.slip = slip;
        s.is_stumbling = stumbling;
        s.is_rotating = rotating;
        s.turn = turn;
    }
}

fn apply_reset<B>(body: &mut B)
where
    B: ChassisBody + ?Sized,
{
    let (yaw, _, _) = frame::yaw_pitch_roll(&body.rotation());
    body.set_rotation(frame::from_yaw(yaw));
    body.set_linvel(Vector::new(0.0, -RESET_DROP_SPEED, 0.0));
    body.set_translation(body.translation() + Vector::y() * RESET_LIFT);
}

// ============================================
// ----- builder ------------------------------
// ============================================

pub struct DriftControllerBuilder {
    tuning: Arc<DriftTuning>,
    faction: Faction,
    spawn: SpawnPose,
    poller: Option<Box<dyn AxisPoller>>,
    target: Option<Arc<dyn TargetProvider>>,
}

impl DriftControllerBuilder {
    pub fn spawn(mut self, spawn: SpawnPose) -> Self {
        self.spawn = spawn;
        self
    }

    /// Device polling for the player faction.
    pub fn keyboard<A>(mut self, poller: A) -> Self
    where
        A: AxisPoller + 'static,
    {
        self.poller = Some(Box::new(poller));
        self
    }

    /// What the enemy faction chases.
    pub fn chase_target<T>(mut self, target: T) -> Self
    where
        T: TargetProvider + 'static,
    {
        self.target = Some(Arc::new(target));
        self
    }

    pub fn faction(&self) -> Faction {
        self.faction
    }

    pub fn spawn_pose(&self) -> SpawnPose {
        self.spawn
    }

    pub fn tuning(&self) -> &Arc<DriftTuning> {
        &self.tuning
    }

    pub fn build(self) -> Result<DriftController, ConfigError> {
        let Self { tuning, faction, spawn, poller, target } = self;

        if spawn.position.iter().any(|v| !v.is_finite()) || !spawn.yaw_deg.is_finite() {
            return Err(ConfigError::Validation(format!("spawn pose must be finite (got {spawn:?})")));
        }

        let input = match faction {
            Faction::Player => {
                if target.is_some() {
                    warn!("chase target ignored for a player vehicle");
                }
                let poller = poller.ok_or(ConfigError::MissingCollaborator("axis poller for the player faction"))?;
                InputSource::Keyboard(poller)
            }
            Faction::Enemy => {
                if poller.is_some() {
                    warn!("axis poller ignored for an enemy vehicle");
                }
                let target = target.ok_or(ConfigError::MissingCollaborator("chase target for the enemy faction"))?;
                InputSource::Chase(ChaseAi::new(target))
            }
            Faction::Neutral => {
                if poller.is_some() || target.is_some() {
                    warn!("collaborators ignored for a neutral vehicle");
                }
                InputSource::Neutral
            }
        };

        let params = tuning.params();
        let sensor = GroundSensor::new(tuning.chassis().half_height());
        let rotation = RotationModel::from_params(params);
        let slip = SlipModel::new(tuning.curves().clone());

        info!(
            "built {} drift controller ({}), spawn {:?} yaw {:.1}",
            faction,
            input.kind(),
            spawn.position,
            spawn.yaw_deg
        );

        Ok(DriftController {
            tuning,
            faction,
            input,
            sensor,
            rotation,
            slip,
            state: VehicleState::spawned(spawn),
        })
    }
}
