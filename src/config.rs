//! # Configuration Module
//!
//! Persistent gamepad settings stored as a JSON document.
//!
//! Every numeric field is clamped on write, so the in-memory value is
//! always inside its legal range:
//!
//! | Field | Range | Default |
//! |-------|-------|---------|
//! | `dead_zone` | `0.0..=0.5` | `0.15` |
//! | `translation_sensitivity` | `0.1..=5.0` | `1.0` |
//! | `rotation_sensitivity` | `0.1..=5.0` | `1.0` |
//! | `zoom_sensitivity` | `0.1..=5.0` | `1.0` |
//!
//! Loading merges the stored document over the defaults. Keys this version
//! does not know about are kept and written back on save.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::controller::normalize::DEAD_ZONE_MAX;
use crate::controller::Button;
use crate::error::{PadviewError, Result};

/// Lower bound for every sensitivity
pub const SENSITIVITY_MIN: f64 = 0.1;

/// Upper bound for every sensitivity
pub const SENSITIVITY_MAX: f64 = 5.0;

/// Directory name used under the platform config dir
const APP_DIR: &str = "padview";

/// Document file name
const CONFIG_FILE: &str = "config.json";

fn default_dead_zone() -> f64 { 0.15 }
fn default_sensitivity() -> f64 { 1.0 }

/// Gamepad settings shared by the controller readers and the action appliers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamepadConfig {
    #[serde(default = "default_dead_zone")]
    dead_zone: f64,

    #[serde(default = "default_sensitivity")]
    translation_sensitivity: f64,

    #[serde(default = "default_sensitivity")]
    rotation_sensitivity: f64,

    #[serde(default = "default_sensitivity")]
    zoom_sensitivity: f64,

    #[serde(default)]
    invert_y: bool,

    /// Button name to host command string
    #[serde(default)]
    button_mappings: BTreeMap<String, String>,

    /// Keys written by other versions, preserved on save
    #[serde(flatten)]
    extra: Map<String, Value>,

    #[serde(skip)]
    path: Option<PathBuf>,
}

impl Default for GamepadConfig {
    fn default() -> Self {
        Self {
            dead_zone: default_dead_zone(),
            translation_sensitivity: default_sensitivity(),
            rotation_sensitivity: default_sensitivity(),
            zoom_sensitivity: default_sensitivity(),
            invert_y: false,
            button_mappings: BTreeMap::new(),
            extra: Map::new(),
            path: None,
        }
    }
}

/// Clamp into `[min, max]`, mapping NaN to `min`.
fn clamp_or_min(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

impl GamepadConfig {
    /// Defaults, persisted at [`GamepadConfig::default_path`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, persisted at an explicit path.
    ///
    /// # Examples
    ///
    /// ```
    /// use padview::config::GamepadConfig;
    ///
    /// let config = GamepadConfig::with_path("/tmp/padview-test.json");
    /// assert_eq!(config.dead_zone(), 0.15);
    /// ```
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Creates a configuration for `path` (or the default location) and
    /// loads whatever is stored there.
    pub fn load_from(path: Option<PathBuf>) -> Self {
        let mut config = match path {
            Some(path) => Self::with_path(path),
            None => Self::new(),
        };
        config.load();
        config
    }

    /// Platform location of the settings document.
    ///
    /// `<config_dir>/padview/config.json`, or `~/.padview/config.json` when
    /// the platform has no config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
            .or_else(|| dirs::home_dir().map(|home| home.join(".padview").join(CONFIG_FILE)))
    }

    /// Where [`load`](Self::load) and [`save`](Self::save) go.
    pub fn path(&self) -> Option<PathBuf> {
        self.path.clone().or_else(Self::default_path)
    }

    // ==== Scalar settings ====

    pub fn dead_zone(&self) -> f64 {
        self.dead_zone
    }

    /// Sets the dead zone, clamped to `0.0..=0.5`.
    ///
    /// # Returns
    ///
    /// The value actually stored.
    pub fn set_dead_zone(&mut self, value: f64) -> f64 {
        self.dead_zone = clamp_or_min(value, 0.0, DEAD_ZONE_MAX);
        self.dead_zone
    }

    pub fn translation_sensitivity(&self) -> f64 {
        self.translation_sensitivity
    }

    /// Sets the pan / model XY sensitivity, clamped to `0.1..=5.0`.
    pub fn set_translation_sensitivity(&mut self, value: f64) -> f64 {
        self.translation_sensitivity = clamp_or_min(value, SENSITIVITY_MIN, SENSITIVITY_MAX);
        self.translation_sensitivity
    }

    pub fn rotation_sensitivity(&self) -> f64 {
        self.rotation_sensitivity
    }

    /// Sets the rotation sensitivity, clamped to `0.1..=5.0`.
    pub fn set_rotation_sensitivity(&mut self, value: f64) -> f64 {
        self.rotation_sensitivity = clamp_or_min(value, SENSITIVITY_MIN, SENSITIVITY_MAX);
        self.rotation_sensitivity
    }

    pub fn zoom_sensitivity(&self) -> f64 {
        self.zoom_sensitivity
    }

    /// Sets the zoom / model Z sensitivity, clamped to `0.1..=5.0`.
    pub fn set_zoom_sensitivity(&mut self, value: f64) -> f64 {
        self.zoom_sensitivity = clamp_or_min(value, SENSITIVITY_MIN, SENSITIVITY_MAX);
        self.zoom_sensitivity
    }

    pub fn invert_y(&self) -> bool {
        self.invert_y
    }

    pub fn set_invert_y(&mut self, invert: bool) {
        self.invert_y = invert;
    }

    // ==== Button mappings ====

    /// Command bound to a button, if any.
    pub fn get_button_command(&self, button: Button) -> Option<&str> {
        self.command_for_name(button.name())
    }

    /// Command bound to a button name, matched case-insensitively.
    pub fn command_for_name(&self, name: &str) -> Option<&str> {
        self.button_mappings
            .get(&name.trim().to_uppercase())
            .map(String::as_str)
    }

    /// Binds or unbinds a button.
    ///
    /// The name is upper-cased. `None` or an empty command removes the
    /// binding.
    pub fn set_button_command(&mut self, name: &str, command: Option<&str>) {
        let key = name.trim().to_uppercase();
        match command.filter(|c| !c.is_empty()) {
            Some(command) => {
                self.button_mappings.insert(key, command.to_string());
            }
            None => {
                self.button_mappings.remove(&key);
            }
        }
    }

    pub fn button_mappings(&self) -> &BTreeMap<String, String> {
        &self.button_mappings
    }

    // ==== Persistence ====

    /// Merges the stored document over the current values.
    ///
    /// A missing file, unreadable file or malformed document leaves every
    /// value untouched; only a warning is logged.
    pub fn load(&mut self) {
        let Some(path) = self.path() else {
            warn!("No configuration directory available, using defaults");
            return;
        };

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No configuration at {}, using defaults", path.display());
                return;
            }
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                return;
            }
        };

        let merged = serde_json::from_str::<Value>(&contents)
            .map_err(PadviewError::from)
            .and_then(|document| self.from_snapshot(&document));
        match merged {
            Ok(()) => info!("Loaded configuration from {}", path.display()),
            Err(e) => warn!("Ignoring configuration at {}: {}", path.display(), e),
        }
    }

    /// Writes the configuration as pretty JSON, creating the directory.
    ///
    /// # Errors
    ///
    /// Returns an error if no location is known or the file cannot be
    /// written. Callers log it; input processing never stops for it.
    pub fn save(&self) -> Result<()> {
        let path = self.path().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "no configuration directory available")
        })?;
        self.save_to(&path)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        debug!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// The whole configuration as a JSON value.
    pub fn to_snapshot(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }

    /// Merges a JSON object over the current values, then re-clamps.
    ///
    /// Keys absent from `snapshot` keep their current value. On error
    /// nothing changes.
    ///
    /// # Errors
    ///
    /// Fails if `snapshot` is not an object or a known key has the wrong
    /// type.
    pub fn from_snapshot(&mut self, snapshot: &Value) -> Result<()> {
        let Value::Object(incoming) = snapshot else {
            return Err(PadviewError::InvalidDocument(format!(
                "expected an object, found {}",
                json_kind(snapshot)
            )));
        };

        let mut document = match self.to_snapshot() {
            Value::Object(current) => current,
            _ => Map::new(),
        };
        for (key, value) in incoming {
            document.insert(key.clone(), value.clone());
        }

        let mut merged: GamepadConfig = serde_json::from_value(Value::Object(document))?;
        merged.path = self.path.take();
        merged.sanitize();
        *self = merged;
        Ok(())
    }

    /// Re-applies every clamp and normalizes mapping keys.
    fn sanitize(&mut self) {
        self.set_dead_zone(self.dead_zone);
        self.set_translation_sensitivity(self.translation_sensitivity);
        self.set_rotation_sensitivity(self.rotation_sensitivity);
        self.set_zoom_sensitivity(self.zoom_sensitivity);

        let mappings = std::mem::take(&mut self.button_mappings);
        for (name, command) in mappings {
            self.set_button_command(&name, Some(&command));
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
