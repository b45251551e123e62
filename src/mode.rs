//! # Control Mode
//!
//! Two-state machine selecting what the sticks drive.
//!
//! | Mode | Sticks and triggers drive |
//! |------|---------------------------|
//! | `View` (initial) | the camera |
//! | `Model` | the selected top-level models |
//!
//! The only transition is [`ModeState::toggle`], fired once per discrete
//! press of the mode button.

use std::fmt;

use tracing::info;

/// What the analog inputs currently control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlMode {
    #[default]
    View,
    Model,
}

impl ControlMode {
    /// The other mode.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            ControlMode::View => ControlMode::Model,
            ControlMode::Model => ControlMode::View,
        }
    }

    /// Title-case label for host UIs.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ControlMode::View => "View",
            ControlMode::Model => "Model",
        }
    }
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlMode::View => f.write_str("VIEW"),
            ControlMode::Model => f.write_str("MODEL"),
        }
    }
}

/// Mode cell owned by the running dispatcher.
#[derive(Debug, Default)]
pub struct ModeState {
    current: ControlMode,
}

impl ModeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> ControlMode {
        self.current
    }

    /// Flips between `View` and `Model` and returns the new mode.
    pub fn toggle(&mut self) -> ControlMode {
        self.current = self.current.toggled();
        info!("Mode set to {}", self.current);
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_mode_is_view() {
        assert_eq!(ModeState::new().current(), ControlMode::View);
    }

    #[test]
    fn test_toggle_flips_both_ways() {
        let mut state = ModeState::new();
        assert_eq!(state.toggle(), ControlMode::Model);
        assert_eq!(state.current(), ControlMode::Model);
        assert_eq!(state.toggle(), ControlMode::View);
    }

    #[test]
    fn test_labels() {
        assert_eq!(ControlMode::View.to_string(), "VIEW");
        assert_eq!(ControlMode::Model.label(), "Model");
    }
}
