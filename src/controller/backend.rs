//! Input subsystem abstraction so the registry and dispatch loop can be
//! driven by gilrs in production and by a scripted backend in tests.

use std::collections::HashMap;
use std::fmt;

use gilrs::{Axis, Event, EventType, GamepadId, Gilrs};
use tracing::{debug, info};

use super::buttons::Button;
use super::normalize::to_raw_axis;
use crate::error::{DeviceError, PadviewError, Result};

/// Identifier of one physical connection session.
///
/// A controller that is unplugged and plugged back in gets a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub u32);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Raw analog axes of a game controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawAxis {
    LeftX,
    LeftY,
    RightX,
    RightY,
    TriggerLeft,
    TriggerRight,
}

/// Discrete events reported by the input subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceEvent {
    /// A controller appeared at the given platform index
    Added { device_index: usize },
    /// A previously opened controller went away
    Removed { instance_id: InstanceId },
    /// A button went down (press edge, never repeated while held)
    ButtonPressed { instance_id: InstanceId, button: Button },
}

/// Trait for the platform game-controller layer
///
/// Stick axes follow the down-positive convention for Y and use the signed
/// range `-32768..=32767`; triggers report `0..=32767`.
pub trait InputBackend {
    /// Opaque native handle, owned by whoever opened it
    type Handle;

    /// Platform indices of every attached game controller
    fn attached_devices(&self) -> Vec<usize>;

    /// Open the controller at a platform index
    fn open(&mut self, device_index: usize) -> std::result::Result<Self::Handle, DeviceError>;

    /// Connection-session id of an open handle
    fn instance_id(&self, handle: &Self::Handle) -> InstanceId;

    /// Human-readable device name, when the platform reports one
    fn name(&self, handle: &Self::Handle) -> Option<String>;

    /// Next pending event, without blocking
    fn poll_event(&mut self) -> Option<DeviceEvent>;

    /// Immediate raw axis reading
    fn read_axis(&self, handle: &Self::Handle, axis: RawAxis) -> std::result::Result<i16, DeviceError>;

    /// Immediate button state
    fn read_button(&self, handle: &Self::Handle, button: Button) -> std::result::Result<bool, DeviceError>;

    /// Release a handle
    fn close(&mut self, handle: Self::Handle);
}

/// Native handle for a gilrs gamepad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GilrsHandle {
    gamepad: GamepadId,
    instance_id: InstanceId,
}

/// [`InputBackend`] implementation backed by gilrs.
pub struct GilrsBackend {
    gilrs: Gilrs,
    /// Gamepads with an open handle and the session id minted for them
    open: HashMap<GamepadId, InstanceId>,
    next_instance: u32,
}

impl fmt::Debug for GilrsBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GilrsBackend")
            .field("open", &self.open.len())
            .field("next_instance", &self.next_instance)
            .finish_non_exhaustive()
    }
}

impl GilrsBackend {
    /// Initialize gilrs
    ///
    /// # Errors
    ///
    /// Returns `InputInit` if the platform input layer cannot be started.
    /// Without it no controller can ever be read.
    pub fn new() -> Result<Self> {
        let gilrs = Gilrs::new().map_err(|e| PadviewError::InputInit(e.to_string()))?;
        info!("GilRs initialized");

        Ok(Self {
            gilrs,
            open: HashMap::new(),
            next_instance: 0,
        })
    }

    fn gamepad_at(&self, device_index: usize) -> Option<GamepadId> {
        self.gilrs
            .gamepads()
            .map(|(id, _)| id)
            .find(|id| usize::from(*id) == device_index)
    }

    fn trigger_value(gamepad: &gilrs::Gamepad<'_>, button: gilrs::Button) -> f32 {
        gamepad.button_data(button).map_or(0.0, |data| data.value())
    }
}

impl InputBackend for GilrsBackend {
    type Handle = GilrsHandle;

    fn attached_devices(&self) -> Vec<usize> {
        self.gilrs
            .gamepads()
            .filter(|(_, gamepad)| gamepad.is_connected())
            .map(|(id, _)| usize::from(id))
            .collect()
    }

    fn open(&mut self, device_index: usize) -> std::result::Result<GilrsHandle, DeviceError> {
        let gamepad = self
            .gamepad_at(device_index)
            .ok_or(DeviceError::NotOpenable { device_index })?;

        if self.open.contains_key(&gamepad) {
            return Err(DeviceError::AlreadyOpen { device_index });
        }

        let instance_id = InstanceId(self.next_instance);
        self.next_instance = self.next_instance.wrapping_add(1);
        self.open.insert(gamepad, instance_id);

        Ok(GilrsHandle {
            gamepad,
            instance_id,
        })
    }

    fn instance_id(&self, handle: &GilrsHandle) -> InstanceId {
        handle.instance_id
    }

    fn name(&self, handle: &GilrsHandle) -> Option<String> {
        self.gilrs
            .connected_gamepad(handle.gamepad)
            .map(|gamepad| gamepad.name().to_string())
            .filter(|name| !name.is_empty())
    }

    fn poll_event(&mut self) -> Option<DeviceEvent> {
        // Skip events that have no game-controller meaning (axis motion,
        // releases, unmapped buttons) until one does or the queue is empty.
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            match event {
                EventType::Connected => {
                    return Some(DeviceEvent::Added {
                        device_index: usize::from(id),
                    });
                }
                EventType::Disconnected => {
                    if let Some(&instance_id) = self.open.get(&id) {
                        return Some(DeviceEvent::Removed { instance_id });
                    }
                    debug!("Ignoring disconnect of unopened gamepad {:?}", id);
                }
                EventType::ButtonPressed(button, _) => {
                    let instance_id = self.open.get(&id).copied();
                    if let (Some(instance_id), Some(button)) = (instance_id, Button::from_gilrs(button)) {
                        return Some(DeviceEvent::ButtonPressed { instance_id, button });
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn read_axis(&self, handle: &GilrsHandle, axis: RawAxis) -> std::result::Result<i16, DeviceError> {
        let gamepad = self
            .gilrs
            .connected_gamepad(handle.gamepad)
            .ok_or(DeviceError::Disconnected {
                instance_id: handle.instance_id,
            })?;

        // gilrs reports stick Y as up-positive
        let value = match axis {
            RawAxis::LeftX => gamepad.value(Axis::LeftStickX),
            RawAxis::LeftY => -gamepad.value(Axis::LeftStickY),
            RawAxis::RightX => gamepad.value(Axis::RightStickX),
            RawAxis::RightY => -gamepad.value(Axis::RightStickY),
            RawAxis::TriggerLeft => Self::trigger_value(&gamepad, gilrs::Button::LeftTrigger2),
            RawAxis::TriggerRight => Self::trigger_value(&gamepad, gilrs::Button::RightTrigger2),
        };

        Ok(to_raw_axis(value))
    }

    fn read_button(&self, handle: &GilrsHandle, button: Button) -> std::result::Result<bool, DeviceError> {
        let gamepad = self
            .gilrs
            .connected_gamepad(handle.gamepad)
            .ok_or(DeviceError::Disconnected {
                instance_id: handle.instance_id,
            })?;
        Ok(gamepad.is_pressed(button.to_gilrs()))
    }

    fn close(&mut self, handle: GilrsHandle) {
        self.open.remove(&handle.gamepad);
    }
}


#[cfg(test)]
mod tests {
    use super::mocks::*;
    use super::*;

    #[test]
    fn test_instance_id_display() {
        assert_eq!(InstanceId(7).to_string(), "#7");
    }

    #[test]
    fn test_mock_open_mints_fresh_ids() {
        let mut backend = MockBackend::new();
        backend.attach(0, MockDevice::new("Pad"));

        let first = backend.open(0).unwrap();
        backend.close(first);
        let second = backend.open(0).unwrap();

        assert_ne!(first.instance_id, second.instance_id);
        assert_eq!(backend.closed, vec![first.instance_id]);
    }

    #[test]
    fn test_mock_open_twice_is_rejected() {
        let mut backend = MockBackend::new();
        backend.attach(3, MockDevice::new("Pad"));
        let _handle = backend.open(3).unwrap();

        assert_eq!(backend.open(3), Err(DeviceError::AlreadyOpen { device_index: 3 }));
    }

    #[test]
    fn test_mock_read_after_close_is_disconnected() {
        let mut backend = MockBackend::new();
        backend.attach(0, MockDevice::new("Pad"));
        let handle = backend.open(0).unwrap();
        backend.close(handle);

        assert_eq!(
            backend.read_axis(&handle, RawAxis::LeftX),
            Err(DeviceError::Disconnected {
                instance_id: handle.instance_id
            })
        );
    }

    // Integration test - only runs with real hardware
    #[test]
    #[ignore]
    fn test_gilrs_backend_with_real_hardware() {
        let mut backend = GilrsBackend::new().expect("gilrs should initialize");
        let devices = backend.attached_devices();
        assert!(!devices.is_empty(), "Connect a controller to run this test");

        let handle = backend.open(devices[0]).expect("controller should open");
        println!("Opened {:?} as {}", backend.name(&handle), backend.instance_id(&handle));
        assert!(backend.read_axis(&handle, RawAxis::LeftX).is_ok());
        backend.close(handle);
    }
}
