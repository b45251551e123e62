//! # Normalization Module
//!
//! Converts raw signed axis readings into normalized stick and trigger values.
//!
//! ## Dead Zone
//!
//! A dead zone absorbs sensor noise and drift near the rest position. Values
//! whose magnitude is below the dead zone map to exactly `0.0`; values above
//! it are rescaled so the remaining travel covers the full `0.0..=1.0` range:
//!
//! `output = sign(input) * (|input| - dead_zone) / (1 - dead_zone)`
//!
//! The output is continuous at the threshold (no jump from `0.0` to
//! `dead_zone`) and full deflection still reaches exactly `±1.0`.
//!
//! ## Usage
//!
//! ```
//! use padview::controller::normalize::{normalize_stick_axis, AXIS_MAX};
//!
//! // Resting stick
//! assert_eq!(normalize_stick_axis(0, 0.15), 0.0);
//!
//! // Full deflection
//! assert_eq!(normalize_stick_axis(AXIS_MAX, 0.15), 1.0);
//! ```

/// Magnitude of the raw signed axis range.
pub const AXIS_MAX: i16 = 32767;

/// Largest dead zone a stick can be configured with.
pub const DEAD_ZONE_MAX: f64 = 0.5;

/// Applies a dead zone to a normalized stick axis.
///
/// The dead zone fraction is held in `0.0..=0.5`, so the rescaling divisor
/// never gets smaller than `0.5`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeadZone {
    fraction: f64,
}

impl Default for DeadZone {
    fn default() -> Self {
        Self { fraction: 0.15 }
    }
}

impl DeadZone {
    /// Creates a dead zone, clamping the fraction to `0.0..=0.5`.
    ///
    /// # Examples
    ///
    /// ```
    /// use padview::controller::normalize::DeadZone;
    ///
    /// assert_eq!(DeadZone::new(0.9).fraction(), 0.5);
    /// assert_eq!(DeadZone::new(-1.0).fraction(), 0.0);
    /// ```
    #[must_use]
    pub fn new(fraction: f64) -> Self {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, DEAD_ZONE_MAX)
        };
        Self { fraction }
    }

    /// Returns the configured fraction.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// Applies the dead zone to a value in `-1.0..=1.0`.
    ///
    /// # Examples
    ///
    /// ```
    /// use padview::controller::normalize::DeadZone;
    ///
    /// let dz = DeadZone::new(0.1);
    /// assert_eq!(dz.apply(0.05), 0.0);
    /// assert!((dz.apply(0.55) - 0.5).abs() < 1e-9);
    /// assert_eq!(dz.apply(-1.0), -1.0);
    /// ```
    #[must_use]
    pub fn apply(&self, input: f64) -> f64 {
        let magnitude = input.abs();
        if magnitude < self.fraction {
            return 0.0;
        }
        input.signum() * (magnitude - self.fraction) / (1.0 - self.fraction)
    }
}

/// Converts a raw signed axis value to `-1.0..=1.0`.
///
/// `i16::MIN` is one step beyond `-AXIS_MAX` and is clamped to `-1.0`.
#[must_use]
pub fn normalize_axis(raw: i16) -> f64 {
    (f64::from(raw) / f64::from(AXIS_MAX)).clamp(-1.0, 1.0)
}

/// Normalizes a raw stick axis and applies the dead zone.
///
/// # Examples
///
/// ```
/// use padview::controller::normalize::normalize_stick_axis;
///
/// // Half deflection with a 15% dead zone
/// let value = normalize_stick_axis(16384, 0.15);
/// assert!((value - 0.4118).abs() < 1e-3);
/// ```
#[must_use]
pub fn normalize_stick_axis(raw: i16, dead_zone: f64) -> f64 {
    DeadZone::new(dead_zone).apply(normalize_axis(raw))
}

/// Converts a raw trigger value to `0.0..=1.0`.
///
/// Negative readings are treated as released. Triggers rest at exactly zero,
/// so no dead zone is applied.
///
/// # Examples
///
/// ```
/// use padview::controller::normalize::{normalize_trigger, AXIS_MAX};
///
/// assert_eq!(normalize_trigger(-500), 0.0);
/// assert_eq!(normalize_trigger(AXIS_MAX), 1.0);
/// ```
#[must_use]
pub fn normalize_trigger(raw: i16) -> f64 {
    f64::from(raw.max(0)) / f64::from(AXIS_MAX)
}

/// Converts a float axis in `-1.0..=1.0` (as reported by gilrs) back to the
/// raw signed range.
#[must_use]
pub fn to_raw_axis(value: f32) -> i16 {
    let scaled = f64::from(value).clamp(-1.0, 1.0) * f64::from(AXIS_MAX);
    scaled.round() as i16
}
