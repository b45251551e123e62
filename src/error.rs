//! # Error Types
//!
//! Custom error types for Padview using `thiserror`.

use thiserror::Error;

use crate::controller::backend::InstanceId;

/// Main error type for Padview
#[derive(Debug, Error)]
pub enum PadviewError {
    /// The underlying input subsystem could not be started
    #[error("Input subsystem initialization failed: {0}")]
    InputInit(String),

    /// Device errors
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    /// Configuration (de)serialization errors
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// A configuration document that is valid JSON but not a settings object
    #[error("Invalid configuration document: {0}")]
    InvalidDocument(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by a single controller device.
///
/// These never abort a frame: open failures are skipped and read failures
/// only drop the affected controller for the current tick.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// The platform refused to open the device at this index
    #[error("device at index {device_index} is not openable")]
    NotOpenable { device_index: usize },

    /// The device at this index already has an open handle
    #[error("device at index {device_index} is already open")]
    AlreadyOpen { device_index: usize },

    /// The handle was closed or the device vanished
    #[error("controller {instance_id} is disconnected")]
    Disconnected { instance_id: InstanceId },

    /// Any other read failure reported by the backend
    #[error("read failed: {0}")]
    Read(String),
}

/// Failure reported by the host when running a bound command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CommandError {
    message: String,
}

impl CommandError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result type alias for Padview
pub type Result<T> = std::result::Result<T, PadviewError>;
