//! # Device Registry
//!
//! Owns every open controller, keyed by its connection-session id.
//!
//! The registry is the only owner of native handles. A handle is released
//! exactly once, either when its device is removed or when the registry is
//! closed or dropped, so no entry ever outlives its handle.
//!
//! ## Hot-plug
//!
//! - [`DeviceRegistry::discover_all`] opens everything attached at startup.
//! - [`DeviceRegistry::on_device_added`] opens one device by platform index.
//!   A device that cannot be opened is skipped and never retried; the next
//!   connect event from the platform is the retry.
//! - [`DeviceRegistry::on_device_removed`] releases one device. Unknown ids
//!   are ignored so duplicate removal events are harmless.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, info};

use super::backend::{InputBackend, InstanceId};
use super::Controller;
use crate::config::GamepadConfig;

/// Name used when the platform does not report one.
pub const UNKNOWN_CONTROLLER_NAME: &str = "Unknown Controller";

/// One open controller.
#[derive(Debug)]
pub struct DeviceInstance<H> {
    instance_id: InstanceId,
    name: String,
    handle: Option<H>,
}

impl<H> DeviceInstance<H> {
    pub fn new(instance_id: InstanceId, name: String, handle: H) -> Self {
        Self {
            instance_id,
            name,
            handle: Some(handle),
        }
    }

    pub fn instance_id(&self) -> InstanceId {
        self.instance_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The native handle, or `None` once closed.
    pub fn handle(&self) -> Option<&H> {
        self.handle.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Release the native handle. Calling this again is a no-op.
    pub fn close<B>(&mut self, backend: &mut B)
    where
        B: InputBackend<Handle = H>,
    {
        if let Some(handle) = self.handle.take() {
            backend.close(handle);
        }
    }
}

/// Summary passed to status listeners after a connect or disconnect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryStatus {
    /// Number of connected controllers
    pub connected: usize,
    /// Name of the controller when exactly one is connected
    pub single_name: Option<String>,
}

impl fmt::Display for RegistryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.connected, &self.single_name) {
            (0, _) => f.write_str("No controller connected"),
            (1, Some(name)) => f.write_str(name),
            (count, _) => write!(f, "{} controllers connected", count),
        }
    }
}

/// Callback invoked whenever the set of connected controllers changes.
pub type StatusListener = Box<dyn FnMut(&RegistryStatus)>;

/// Arena of open controllers keyed by instance id.
pub struct DeviceRegistry<B: InputBackend> {
    backend: B,
    devices: HashMap<InstanceId, DeviceInstance<B::Handle>>,
    listener: Option<StatusListener>,
}

impl<B: InputBackend> fmt::Debug for DeviceRegistry<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceRegistry")
            .field("devices", &self.devices.len())
            .field("listener", &self.listener.is_some())
            .finish_non_exhaustive()
    }
}

impl<B: InputBackend> DeviceRegistry<B> {
    /// Creates an empty registry over an initialized backend.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            devices: HashMap::new(),
            listener: None,
        }
    }

    /// Installs the status-changed listener, replacing any previous one.
    pub fn set_status_listener(&mut self, listener: impl FnMut(&RegistryStatus) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_status_listener(&mut self) {
        self.listener = None;
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Opens every attached controller.
    ///
    /// # Returns
    ///
    /// Number of controllers in the registry afterwards.
    pub fn discover_all(&mut self) -> usize {
        for device_index in self.backend.attached_devices() {
            self.on_device_added(device_index);
        }
        self.devices.len()
    }

    /// Opens the controller at a platform index and registers it.
    ///
    /// # Returns
    ///
    /// The new instance id, or `None` if the device could not be opened.
    pub fn on_device_added(&mut self, device_index: usize) -> Option<InstanceId> {
        let handle = match self.backend.open(device_index) {
            Ok(handle) => handle,
            Err(e) => {
                info!("Skipping controller at index {}: {}", device_index, e);
                return None;
            }
        };

        let instance_id = self.backend.instance_id(&handle);
        let name = self
            .backend
            .name(&handle)
            .unwrap_or_else(|| UNKNOWN_CONTROLLER_NAME.to_string());

        info!("Connected - {} ({})", name, instance_id);
        let previous = self
            .devices
            .insert(instance_id, DeviceInstance::new(instance_id, name, handle));
        if let Some(mut stale) = previous {
            debug!("Replacing stale entry for {}", instance_id);
            stale.close(&mut self.backend);
        }

        self.notify_status_change();
        Some(instance_id)
    }

    /// Releases and forgets a controller.
    ///
    /// # Returns
    ///
    /// `true` if the id was present.
    pub fn on_device_removed(&mut self, instance_id: InstanceId) -> bool {
        let Some(mut device) = self.devices.remove(&instance_id) else {
            debug!("Ignoring removal of unknown controller {}", instance_id);
            return false;
        };

        info!("Disconnected - {} ({})", device.name(), instance_id);
        device.close(&mut self.backend);
        self.notify_status_change();
        true
    }

    /// Releases every controller and empties the registry.
    pub fn close_all(&mut self) {
        for (_, mut device) in self.devices.drain() {
            device.close(&mut self.backend);
        }
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn contains(&self, instance_id: InstanceId) -> bool {
        self.devices.contains_key(&instance_id)
    }

    pub fn get(&self, instance_id: InstanceId) -> Option<&DeviceInstance<B::Handle>> {
        self.devices.get(&instance_id)
    }

    /// Ids of every connected controller, in no particular order.
    pub fn instance_ids(&self) -> Vec<InstanceId> {
        self.devices.keys().copied().collect()
    }

    /// Borrowed controller views over every connected device.
    pub fn controllers<'a>(
        &'a self,
        config: &'a GamepadConfig,
    ) -> impl Iterator<Item = Controller<'a, B>> + 'a {
        self.devices
            .values()
            .filter(|device| device.is_open())
            .map(move |device| Controller::new(&self.backend, device, config))
    }

    pub fn status(&self) -> RegistryStatus {
        let single_name = match self.devices.len() {
            1 => self.devices.values().next().map(|d| d.name().to_string()),
            _ => None,
        };
        RegistryStatus {
            connected: self.devices.len(),
            single_name,
        }
    }

    /// Host status line for the current set of controllers.
    pub fn status_text(&self) -> String {
        self.status().to_string()
    }

    fn notify_status_change(&mut self) {
        let status = self.status();
        if let Some(listener) = self.listener.as_mut() {
            listener(&status);
        }
    }
}

impl<B: InputBackend> Drop for DeviceRegistry<B> {
    fn drop(&mut self) {
        self.close_all();
    }
}
