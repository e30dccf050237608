//! Simulation mode selection and focus tracking.
//!
//! The mode is a pure function of the current warp rate and the threshold,
//! re-evaluated every tick with no hysteresis. Focus (whether the vessel is
//! the host's active one) is tracked separately so the controller can
//! refresh its data when a vessel comes back into focus.

use warpbuffer_core::fixed::Fixed64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SimulationMode {
    /// Host physics balances power; the buffer stays at nominal capacity.
    #[default]
    LowFidelity,
    /// Sparse ticks; the buffer is resized analytically.
    Analytic,
}

/// Analytic at or above the threshold, low fidelity below it.
pub fn select_mode(rate: Fixed64, threshold: Fixed64) -> SimulationMode {
    if rate < threshold {
        SimulationMode::LowFidelity
    } else {
        SimulationMode::Analytic
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTransition {
    Gained,
    Lost,
    Unchanged,
}

/// Result of one selector update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeUpdate {
    pub mode: SimulationMode,
    pub mode_changed: bool,
    pub focus: FocusTransition,
}

#[derive(Debug, Clone, Default)]
pub struct ModeSelector {
    mode: SimulationMode,
    focused: bool,
}

impl ModeSelector {
    /// Low fidelity and unfocused.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> SimulationMode {
        self.mode
    }

    pub fn is_analytic(&self) -> bool {
        self.mode == SimulationMode::Analytic
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Record the current focus state and report the transition.
    pub fn update_focus(&mut self, is_active: bool) -> FocusTransition {
        let transition = match (self.focused, is_active) {
            (false, true) => FocusTransition::Gained,
            (true, false) => FocusTransition::Lost,
            _ => FocusTransition::Unchanged,
        };
        self.focused = is_active;
        transition
    }

    /// Re-evaluate the mode for this tick.
    pub fn update_mode(&mut self, rate: Fixed64, threshold: Fixed64) -> (SimulationMode, bool) {
        let mode = select_mode(rate, threshold);
        let changed = mode != self.mode;
        self.mode = mode;
        (mode, changed)
    }

    /// Focus first, then mode, as one tick sees them.
    pub fn update(&mut self, rate: Fixed64, threshold: Fixed64, is_active: bool) -> ModeUpdate {
        let focus = self.update_focus(is_active);
        let (mode, mode_changed) = self.update_mode(rate, threshold);
        ModeUpdate {
            mode,
            mode_changed,
            focus,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f(v: i32) -> Fixed64 {
        Fixed64::from_num(v)
    }

    #[test]
    fn threshold_is_inclusive_for_analytic() {
        assert_eq!(select_mode(f(99), f(100)), SimulationMode::LowFidelity);
        assert_eq!(select_mode(f(100), f(100)), SimulationMode::Analytic);
        assert_eq!(select_mode(f(1000), f(100)), SimulationMode::Analytic);
    }

    #[test]
    fn starts_low_fidelity_and_unfocused() {
        let selector = ModeSelector::new();
        assert_eq!(selector.mode(), SimulationMode::LowFidelity);
        assert!(!selector.is_focused());
    }

    #[test]
    fn no_hysteresis_across_consecutive_ticks() {
        let mut selector = ModeSelector::new();
        let up = selector.update(f(100), f(100), false);
        assert_eq!(up.mode, SimulationMode::Analytic);
        assert!(up.mode_changed);

        let down = selector.update(f(50), f(100), false);
        assert_eq!(down.mode, SimulationMode::LowFidelity);
        assert!(down.mode_changed);

        let again = selector.update(f(1000), f(100), false);
        assert!(again.mode_changed);
        assert!(selector.is_analytic());
    }

    #[test]
    fn steady_rate_reports_no_change() {
        let mut selector = ModeSelector::new();
        selector.update(f(1000), f(100), false);
        let next = selector.update(f(1000), f(100), false);
        assert!(!next.mode_changed);
    }

    #[test]
    fn focus_transitions() {
        let mut selector = ModeSelector::new();
        assert_eq!(selector.update_focus(false), FocusTransition::Unchanged);
        assert_eq!(selector.update_focus(true), FocusTransition::Gained);
        assert_eq!(selector.update_focus(true), FocusTransition::Unchanged);
        assert_eq!(selector.update_focus(false), FocusTransition::Lost);
        assert_eq!(selector.update_focus(true), FocusTransition::Gained);
    }
}
