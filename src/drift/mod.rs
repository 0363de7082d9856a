//! drift - engine-agnostic drift helpers (pure types + per-tick stages)

pub mod types;
pub mod curve;
pub mod frame;
pub mod slip;
pub mod rotation;
pub mod traction;
pub mod watchdog;

pub use types::*;
pub use curve::{Curve, KeyframeCurve};
pub use slip::{SlipCurves, SlipModel};
pub use rotation::RotationModel;
pub use traction::ActiveParams;
pub use watchdog::{ResetWatchdog, WatchdogState};
