//! Core shared types for `drift` (engine-agnostic).
// drift/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// |throttle| and |turn| must exceed this before they act.
pub const INTENT_DEADZONE: f32 = 0.5;

// ============================================
// Faction
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Faction {
    Player,
    Enemy,
    Neutral,
}

impl Faction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Faction::Player => "player",
            Faction::Enemy => "enemy",
            Faction::Neutral => "neutral",
        }
    }

    /// AI factions watch for getting stuck; the player resets by key only.
    pub fn auto_resets(&self) -> bool {
        !matches!(self, Faction::Player)
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================
// ----- per-tick control ---------------------
// ============================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ControlIntent {
    pub throttle: f32, // -1..1
    pub turn: f32,     // -1..1 (+ = yaw increases)
    pub boost: bool,
    pub reset: bool,   // edge, latched by the controller until applied
}

impl ControlIntent {
    pub fn new(throttle: f32, turn: f32, boost: bool, reset: bool) -> Self {
        Self {
            throttle: throttle.clamp(-1.0, 1.0),
            turn: turn.clamp(-1.0, 1.0),
            boost,
            reset,
        }
    }

    #[inline]
    pub fn wants_throttle(&self) -> bool {
        self.throttle.abs() > INTENT_DEADZONE
    }

    #[inline]
    pub fn wants_turn(&self) -> bool {
        self.turn.abs() > INTENT_DEADZONE
    }
}

/// Hysteresis flag carried between ticks by the slip model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlipState {
    #[default]
    Normal,
    Slipping,
}
