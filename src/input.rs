// ==============================================================================
// input.rs — CONTROL INTENT SOURCES
// ------------------------------------------------------------------------------
// One InputSource per vehicle, chosen once from its Faction:
// - Keyboard : polls an AxisPoller (device polling lives outside this crate)
// - Chase    : full throttle, steers toward a TargetProvider with a 10° deadband
// - Neutral  : full throttle, straight ahead (traffic / filler)
// ==============================================================================

use std::fmt;
use std::sync::{Arc, RwLock};

use rapier3d::prelude::{Point, Real};

use crate::drift::frame::{bearing, delta_angle};
use crate::drift::types::{ControlIntent, Faction};

/// |bearing delta| the chase AI tolerates before it steers.
pub const CHASE_TURN_THRESHOLD_DEG: f32 = 10.0;

// ============================================
// ----- collaborator seams -------------------
// ============================================

/// Raw axis state for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisSample {
    pub throttle: f32,      // -1..1
    pub turn: f32,          // -1..1
    pub boost: bool,
    pub reset_pressed: bool, // key-down edge, not held state
}

pub trait AxisPoller: Send {
    fn poll(&mut self) -> AxisSample;
}

impl<F> AxisPoller for F
where
    F: FnMut() -> AxisSample + Send,
{
    fn poll(&mut self) -> AxisSample {
        self()
    }
}

pub trait TargetProvider: Send + Sync {
    fn position(&self) -> Point<Real>;
}

impl TargetProvider for Point<Real> {
    fn position(&self) -> Point<Real> {
        *self
    }
}

/// Shared, updatable position. The world publishes each vehicle's position
/// into its beacon after every step so chasers can follow it.
#[derive(Debug, Clone)]
pub struct TargetBeacon(Arc<RwLock<Point<Real>>>);

impl TargetBeacon {
    pub fn new(position: Point<Real>) -> Self {
        Self(Arc::new(RwLock::new(position)))
    }

    pub fn publish(&self, position: Point<Real>) {
        match self.0.write() {
            Ok(mut p) => *p = position,
            Err(poisoned) => *poisoned.into_inner() = position,
        }
    }
}

impl TargetProvider for TargetBeacon {
    fn position(&self) -> Point<Real> {
        match self.0.read() {
            Ok(p) => *p,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

// ============================================
// ----- sources ------------------------------
// ============================================

pub struct ChaseAi {
    target: Arc<dyn TargetProvider>,
    threshold: f32, // deg
}

impl ChaseAi {
    pub fn new(target: Arc<dyn TargetProvider>) -> Self {
        Self {
            target,
            threshold: CHASE_TURN_THRESHOLD_DEG,
        }
    }

    pub fn intent(&self, position: &Point<Real>, yaw_deg: f32) -> ControlIntent {
        let goal = bearing(position, &self.target.position());
        let delta = delta_angle(yaw_deg, goal);

        let turn = if delta > self.threshold {
            1.0
        } else if delta < -self.threshold {
            -1.0
        } else {
            0.0
        };

        ControlIntent::new(1.0, turn, false, false)
    }
}

pub enum InputSource {
    Keyboard(Box<dyn AxisPoller>),
    Chase(ChaseAi),
    Neutral,
}

impl fmt::Debug for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

impl InputSource {
    pub fn kind(&self) -> &'static str {
        match self {
            InputSource::Keyboard(_) => "keyboard",
            InputSource::Chase(_) => "chase-ai",
            InputSource::Neutral => "neutral-ai",
        }
    }

    pub fn faction(&self) -> Faction {
        match self {
            InputSource::Keyboard(_) => Faction::Player,
            InputSource::Chase(_) => Faction::Enemy,
            InputSource::Neutral => Faction::Neutral,
        }
    }

    /// Fresh intent for this tick.
    pub fn next_intent(&mut self, position: &Point<Real>, yaw_deg: f32) -> ControlIntent {
        match self {
            InputSource::Keyboard(poller) => {
                let s = poller.poll();
                ControlIntent::new(s.throttle, s.turn, s.boost, s.reset_pressed)
            }
            InputSource::Chase(ai) => ai.intent(position, yaw_deg),
            InputSource::Neutral => ControlIntent::new(1.0, 0.0, false, false),
        }
    }
}
