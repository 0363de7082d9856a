use serde::Serialize;

/// Previous-tick local speed at or below this counts as stuck.
pub const STUCK_EPSILON: f32 = 0.01;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchdogState {
    #[default]
    Idle,
    PendingStuck,
}

/// Auto-reset for AI vehicles: fires on the second consecutive stuck
/// observation, then re-arms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResetWatchdog {
    state: WatchdogState,
    stuck_ticks: u32,
}

impl ResetWatchdog {
    /// Returns true when a reset should be requested this tick.
    pub fn observe(&mut self, speed: f32) -> bool {
        if speed > STUCK_EPSILON {
            self.state = WatchdogState::Idle;
            self.stuck_ticks = 0;
            return false;
        }

        self.stuck_ticks = self.stuck_ticks.saturating_add(1);
        match self.state {
            WatchdogState::Idle => {
                self.state = WatchdogState::PendingStuck;
                false
            }
            WatchdogState::PendingStuck => {
                self.state = WatchdogState::Idle;
                true
            }
        }
    }

    pub fn state(&self) -> WatchdogState {
        self.state
    }

    /// Consecutive stuck observations, kept across re-arms.
    pub fn stuck_ticks(&self) -> u32 {
        self.stuck_ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_on_second_consecutive_stuck_tick() {
        let mut w = ResetWatchdog::default();
        assert!(!w.observe(0.0));
        assert_eq!(w.state(), WatchdogState::PendingStuck);
        assert!(w.observe(0.005));
        assert_eq!(w.stuck_ticks(), 2);
    }

    #[test]
    fn movement_clears_pending() {
        let mut w = ResetWatchdog::default();
        assert!(!w.observe(0.0));
        assert!(!w.observe(0.5));
        assert_eq!(w.state(), WatchdogState::Idle);
        assert!(!w.observe(0.0));
        assert!(w.observe(0.0));
    }

    #[test]
    fn one_trigger_one_reset() {
        let mut w = ResetWatchdog::default();
        let fired: Vec<bool> = (0..6).map(|_| w.observe(0.0)).collect();
        assert_eq!(fired, vec![false, true, false, true, false, true]);
        assert_eq!(w.stuck_ticks(), 6);
    }
}
