//! # Controller Module
//!
//! Game controller input handling.
//!
//! This module handles:
//! - Controller discovery and hot-plug via gilrs
//! - Reading analog sticks, triggers and buttons
//! - Applying Y inversion and dead zones
//! - Producing the per-frame [`FrameSample`](crate::actions::FrameSample)

pub mod backend;
pub mod buttons;
pub mod normalize;
pub mod registry;

pub use backend::{DeviceEvent, GilrsBackend, InputBackend, InstanceId, RawAxis};
pub use buttons::Button;
pub use registry::{DeviceInstance, DeviceRegistry, RegistryStatus};

use crate::actions::FrameSample;
use crate::config::GamepadConfig;
use crate::error::DeviceError;
use normalize::{normalize_stick_axis, normalize_trigger};

/// Analog stick selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stick {
    Left,
    Right,
}

/// Analog trigger selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Left,
    Right,
}

/// Read-only view of one open controller.
///
/// Borrows the device from the registry and the configuration for dead zone
/// and Y inversion, so it cannot outlive either.
pub struct Controller<'a, B: InputBackend> {
    backend: &'a B,
    device: &'a DeviceInstance<B::Handle>,
    config: &'a GamepadConfig,
}

impl<'a, B: InputBackend> Controller<'a, B> {
    pub fn new(backend: &'a B, device: &'a DeviceInstance<B::Handle>, config: &'a GamepadConfig) -> Self {
        Self {
            backend,
            device,
            config,
        }
    }

    pub fn instance_id(&self) -> InstanceId {
        self.device.instance_id()
    }

    pub fn name(&self) -> &str {
        self.device.name()
    }

    fn handle(&self) -> Result<&'a B::Handle, DeviceError> {
        self.device.handle().ok_or(DeviceError::Disconnected {
            instance_id: self.device.instance_id(),
        })
    }

    /// Reads a stick as `(x, y)` in `-1.0..=1.0` with the dead zone applied.
    ///
    /// Y is down-positive unless `invert_y` is set. Each axis gets the dead
    /// zone independently.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the device cannot be read.
    pub fn read_stick(&self, stick: Stick) -> Result<(f64, f64), DeviceError> {
        let handle = self.handle()?;
        let (axis_x, axis_y) = match stick {
            Stick::Left => (RawAxis::LeftX, RawAxis::LeftY),
            Stick::Right => (RawAxis::RightX, RawAxis::RightY),
        };

        let raw_x = self.backend.read_axis(handle, axis_x)?;
        let mut raw_y = self.backend.read_axis(handle, axis_y)?;
        if self.config.invert_y() {
            raw_y = raw_y.saturating_neg();
        }

        let dead_zone = self.config.dead_zone();
        Ok((
            normalize_stick_axis(raw_x, dead_zone),
            normalize_stick_axis(raw_y, dead_zone),
        ))
    }

    /// Reads a trigger in `0.0..=1.0`.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the device cannot be read.
    pub fn read_trigger(&self, trigger: Trigger) -> Result<f64, DeviceError> {
        let handle = self.handle()?;
        let axis = match trigger {
            Trigger::Left => RawAxis::TriggerLeft,
            Trigger::Right => RawAxis::TriggerRight,
        };
        Ok(normalize_trigger(self.backend.read_axis(handle, axis)?))
    }

    /// Current (held) state of a button.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the device cannot be read.
    pub fn read_button(&self, button: Button) -> Result<bool, DeviceError> {
        let handle = self.handle()?;
        self.backend.read_button(handle, button)
    }

    /// Reads both sticks and triggers into one frame sample.
    ///
    /// `zoom` is the right trigger minus the left trigger.
    ///
    /// # Errors
    ///
    /// Fails if any of the four reads fails; nothing partial is returned.
    pub fn sample(&self) -> Result<FrameSample, DeviceError> {
        let (left_x, left_y) = self.read_stick(Stick::Left)?;
        let (right_x, right_y) = self.read_stick(Stick::Right)?;
        let left_trigger = self.read_trigger(Trigger::Left)?;
        let right_trigger = self.read_trigger(Trigger::Right)?;

        Ok(FrameSample {
            left_x,
            left_y,
            right_x,
            right_y,
            zoom: right_trigger - left_trigger,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::backend::mocks::{MockBackend, MockDevice};
    use super::normalize::AXIS_MAX;
    use super::*;

    fn registry_with_pad() -> (DeviceRegistry<MockBackend>, InstanceId) {
        let mut backend = MockBackend::new();
        backend.attach(0, MockDevice::new("Pad"));
        let mut registry = DeviceRegistry::new(backend);
        let id = registry.on_device_added(0).unwrap();
        (registry, id)
    }

    fn controller<'a>(
        registry: &'a DeviceRegistry<MockBackend>,
        id: InstanceId,
        config: &'a GamepadConfig,
    ) -> Controller<'a, MockBackend> {
        Controller::new(registry.backend(), registry.get(id).unwrap(), config)
    }

    #[test]
    fn test_resting_controller_reads_zero() {
        let (registry, id) = registry_with_pad();
        let config = GamepadConfig::default();

        let sample = controller(&registry, id, &config).sample().unwrap();
        assert_eq!(sample, FrameSample::default());
        assert!(sample.is_idle());
    }

    #[test]
    fn test_stick_applies_dead_zone_per_axis() {
        let (mut registry, id) = registry_with_pad();
        registry.backend_mut().set_axis(0, RawAxis::LeftX, 16384);
        registry.backend_mut().set_axis(0, RawAxis::LeftY, 3000); // ~0.09, inside 0.15
        let config = GamepadConfig::default();

        let (x, y) = controller(&registry, id, &config).read_stick(Stick::Left).unwrap();
        assert!((x - 0.4118).abs() < 1e-4);
        assert_eq!(y, 0.0);
    }

    #[test]
    fn test_invert_y_negates_before_dead_zone() {
        let (mut registry, id) = registry_with_pad();
        registry.backend_mut().set_axis(0, RawAxis::RightY, AXIS_MAX);
        registry.backend_mut().set_axis(0, RawAxis::RightX, -AXIS_MAX);
        let mut config = GamepadConfig::default();

        let (_, y) = controller(&registry, id, &config).read_stick(Stick::Right).unwrap();
        assert_eq!(y, 1.0);

        config.set_invert_y(true);
        let (x, y) = controller(&registry, id, &config).read_stick(Stick::Right).unwrap();
        assert_eq!(y, -1.0);
        assert_eq!(x, -1.0, "X is never inverted");
    }

    #[test]
    fn test_invert_y_handles_axis_minimum() {
        let (mut registry, id) = registry_with_pad();
        registry.backend_mut().set_axis(0, RawAxis::LeftY, i16::MIN);
        let mut config = GamepadConfig::default();
        config.set_invert_y(true);

        let (_, y) = controller(&registry, id, &config).read_stick(Stick::Left).unwrap();
        assert_eq!(y, 1.0);
    }

    #[test]
    fn test_triggers_ignore_dead_zone_and_inversion() {
        let (mut registry, id) = registry_with_pad();
        registry.backend_mut().set_axis(0, RawAxis::TriggerLeft, 1000);
        registry.backend_mut().set_axis(0, RawAxis::TriggerRight, AXIS_MAX);
        let mut config = GamepadConfig::default();
        config.set_invert_y(true);
        config.set_dead_zone(0.5);

        let view = controller(&registry, id, &config);
        let left = view.read_trigger(Trigger::Left).unwrap();
        assert!((left - 1000.0 / 32767.0).abs() < 1e-12);
        assert_eq!(view.read_trigger(Trigger::Right).unwrap(), 1.0);
    }

    #[test]
    fn test_zoom_is_right_minus_left() {
        let (mut registry, id) = registry_with_pad();
        registry.backend_mut().set_axis(0, RawAxis::TriggerLeft, AXIS_MAX);
        let config = GamepadConfig::default();

        let sample = controller(&registry, id, &config).sample().unwrap();
        assert_eq!(sample.zoom, -1.0);
    }

    #[test]
    fn test_read_button() {
        let (mut registry, id) = registry_with_pad();
        registry
            .backend_mut()
            .device_mut(0)
            .unwrap()
            .pressed
            .insert(Button::X);
        let config = GamepadConfig::default();

        let view = controller(&registry, id, &config);
        assert!(view.read_button(Button::X).unwrap());
        assert!(!view.read_button(Button::Y).unwrap());
    }

    #[test]
    fn test_read_failure_is_reported() {
        let (mut registry, id) = registry_with_pad();
        registry.backend_mut().device_mut(0).unwrap().fail_reads = true;
        let config = GamepadConfig::default();

        let result = controller(&registry, id, &config).sample();
        assert!(matches!(result, Err(DeviceError::Read(_))));
    }
}
