//! # Controller Buttons
//!
//! The fixed game-controller button set and its stable string names.
//!
//! Names are what users type when binding commands and what the settings
//! document stores as `button_mappings` keys.
//!
//! | Button | Name | gilrs |
//! |--------|------|-------|
//! | A | `A` | South |
//! | B | `B` | East |
//! | X | `X` | West |
//! | Y | `Y` | North |
//! | Back | `BACK` | Select |
//! | Guide | `GUIDE` | Mode |
//! | Start | `START` | Start |
//! | L3 | `LEFTSTICK` | LeftThumb |
//! | R3 | `RIGHTSTICK` | RightThumb |
//! | LB | `LEFTSHOULDER` | LeftTrigger |
//! | RB | `RIGHTSHOULDER` | RightTrigger |
//! | D-Pad | `DPAD_UP` / `DPAD_DOWN` / `DPAD_LEFT` / `DPAD_RIGHT` | DPad* |

use std::fmt;
use std::str::FromStr;

use gilrs::Button as GilrsButton;

/// A digital controller button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Button {
    A,
    B,
    X,
    Y,
    Back,
    Guide,
    Start,
    LeftStick,
    RightStick,
    LeftShoulder,
    RightShoulder,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
}

impl Button {
    /// Every button, in controller-layout order.
    pub const ALL: [Button; 15] = [
        Button::A,
        Button::B,
        Button::X,
        Button::Y,
        Button::Back,
        Button::Guide,
        Button::Start,
        Button::LeftStick,
        Button::RightStick,
        Button::LeftShoulder,
        Button::RightShoulder,
        Button::DPadUp,
        Button::DPadDown,
        Button::DPadLeft,
        Button::DPadRight,
    ];

    /// Returns the stable name used in button mappings.
    ///
    /// # Examples
    ///
    /// ```
    /// use padview::controller::Button;
    ///
    /// assert_eq!(Button::LeftShoulder.name(), "LEFTSHOULDER");
    /// ```
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Button::A => "A",
            Button::B => "B",
            Button::X => "X",
            Button::Y => "Y",
            Button::Back => "BACK",
            Button::Guide => "GUIDE",
            Button::Start => "START",
            Button::LeftStick => "LEFTSTICK",
            Button::RightStick => "RIGHTSTICK",
            Button::LeftShoulder => "LEFTSHOULDER",
            Button::RightShoulder => "RIGHTSHOULDER",
            Button::DPadUp => "DPAD_UP",
            Button::DPadDown => "DPAD_DOWN",
            Button::DPadLeft => "DPAD_LEFT",
            Button::DPadRight => "DPAD_RIGHT",
        }
    }

    /// Maps a gilrs button onto the game-controller set.
    ///
    /// Analog trigger buttons (`LeftTrigger2`/`RightTrigger2`) and anything
    /// outside the standard layout have no counterpart.
    #[must_use]
    pub fn from_gilrs(button: GilrsButton) -> Option<Self> {
        let mapped = match button {
            GilrsButton::South => Button::A,
            GilrsButton::East => Button::B,
            GilrsButton::West => Button::X,
            GilrsButton::North => Button::Y,
            GilrsButton::Select => Button::Back,
            GilrsButton::Mode => Button::Guide,
            GilrsButton::Start => Button::Start,
            GilrsButton::LeftThumb => Button::LeftStick,
            GilrsButton::RightThumb => Button::RightStick,
            GilrsButton::LeftTrigger => Button::LeftShoulder,
            GilrsButton::RightTrigger => Button::RightShoulder,
            GilrsButton::DPadUp => Button::DPadUp,
            GilrsButton::DPadDown => Button::DPadDown,
            GilrsButton::DPadLeft => Button::DPadLeft,
            GilrsButton::DPadRight => Button::DPadRight,
            _ => return None,
        };
        Some(mapped)
    }

    /// The gilrs button this maps to.
    #[must_use]
    pub fn to_gilrs(self) -> GilrsButton {
        match self {
            Button::A => GilrsButton::South,
            Button::B => GilrsButton::East,
            Button::X => GilrsButton::West,
            Button::Y => GilrsButton::North,
            Button::Back => GilrsButton::Select,
            Button::Guide => GilrsButton::Mode,
            Button::Start => GilrsButton::Start,
            Button::LeftStick => GilrsButton::LeftThumb,
            Button::RightStick => GilrsButton::RightThumb,
            Button::LeftShoulder => GilrsButton::LeftTrigger,
            Button::RightShoulder => GilrsButton::RightTrigger,
            Button::DPadUp => GilrsButton::DPadUp,
            Button::DPadDown => GilrsButton::DPadDown,
            Button::DPadLeft => GilrsButton::DPadLeft,
            Button::DPadRight => GilrsButton::DPadRight,
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown button name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown button name: {0}")]
pub struct UnknownButton(pub String);

impl FromStr for Button {
    type Err = UnknownButton;

    /// Parses a button name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Button::ALL
            .iter()
            .copied()
            .find(|button| button.name() == upper)
            .ok_or_else(|| UnknownButton(s.to_string()))
    }
}
