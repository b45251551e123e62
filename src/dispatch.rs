//! # Input Dispatch
//!
//! The running core: one [`InputDispatcher`] per host session, ticked once
//! per rendered frame.
//!
//! Each [`InputDispatcher::update`] call runs two phases in order:
//!
//! 1. **Events** - drain every pending connect, disconnect and button press.
//!    The mode button toggles the mode; other buttons run their bound
//!    command.
//! 2. **Analog** - sample every connected controller and hand the result to
//!    the view or model action, depending on the mode.
//!
//! Because events are drained first, a controller plugged in this frame is
//! sampled this frame, and one unplugged this frame is not.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::actions::{ModelAction, ViewAction};
use crate::config::GamepadConfig;
use crate::controller::{Button, DeviceEvent, DeviceRegistry, InputBackend, RegistryStatus};
use crate::error::Result;
use crate::mode::{ControlMode, ModeState};
use crate::scene::HostContext;

/// Button that flips between view and model mode unless reconfigured.
pub const DEFAULT_TOGGLE_BUTTON: Button = Button::Start;

/// Current session state format
pub const SESSION_VERSION: u32 = 1;

/// Diagnostics for one frame tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Discrete events drained
    pub events: usize,
    /// Controllers sampled successfully
    pub controllers: usize,
    /// Controllers whose read failed this frame
    pub failed: usize,
    /// Controllers whose input moved the camera or a model
    pub moved: usize,
}

/// Data a host stores with its saved session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub version: u32,
    pub config: Value,
}

/// Gamepad-driven motion core.
///
/// Owns the configuration, the device registry (and through it the input
/// backend), the mode and both action appliers. Host collaborators are
/// passed in per frame.
///
/// # Examples
///
/// ```no_run
/// use padview::config::GamepadConfig;
/// use padview::controller::GilrsBackend;
/// use padview::dispatch::InputDispatcher;
/// use padview::sim::{SimHost, SimView};
///
/// let backend = GilrsBackend::new()?;
/// let mut dispatcher = InputDispatcher::new(backend, GamepadConfig::load_from(None));
/// dispatcher.start();
///
/// let mut host = SimHost::new(SimView::perspective(None));
/// let report = dispatcher.update(&mut host.context());
/// println!("{} controller(s) sampled", report.controllers);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct InputDispatcher<B: InputBackend> {
    config: GamepadConfig,
    registry: DeviceRegistry<B>,
    mode: ModeState,
    view_action: ViewAction,
    model_action: ModelAction,
    toggle_button: Button,
    running: bool,
}

impl<B: InputBackend> std::fmt::Debug for InputDispatcher<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputDispatcher")
            .field("mode", &self.mode.current())
            .field("toggle_button", &self.toggle_button)
            .field("running", &self.running)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl<B: InputBackend> InputDispatcher<B> {
    /// Builds every component; no device is opened until [`start`](Self::start).
    pub fn new(backend: B, config: GamepadConfig) -> Self {
        Self {
            config,
            registry: DeviceRegistry::new(backend),
            mode: ModeState::new(),
            view_action: ViewAction::new(),
            model_action: ModelAction::new(),
            toggle_button: DEFAULT_TOGGLE_BUTTON,
            running: false,
        }
    }

    /// Replaces both action appliers, e.g. to use custom motion scales.
    pub fn with_actions(mut self, view_action: ViewAction, model_action: ModelAction) -> Self {
        self.view_action = view_action;
        self.model_action = model_action;
        self
    }

    /// Opens every attached controller and starts processing frames.
    ///
    /// Calling this while running does nothing.
    ///
    /// # Returns
    ///
    /// Number of connected controllers.
    pub fn start(&mut self) -> usize {
        if self.running {
            return self.registry.len();
        }
        self.running = true;
        let count = self.registry.discover_all();
        info!("Gamepad input started with {} controller(s)", count);
        count
    }

    /// Releases every controller. Frames are ignored until the next start.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.registry.close_all();
        self.running = false;
        info!("Gamepad input stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frame tick: drains events, then moves the scene.
    ///
    /// Never blocks. Command and device failures are logged and do not end
    /// the frame early.
    pub fn update(&mut self, ctx: &mut HostContext<'_>) -> FrameReport {
        let mut report = FrameReport::default();
        if !self.running {
            return report;
        }

        while let Some(event) = self.registry.backend_mut().poll_event() {
            report.events += 1;
            self.handle_event(event, ctx);
        }

        let mode = self.mode.current();
        for controller in self.registry.controllers(&self.config) {
            let sample = match controller.sample() {
                Ok(sample) => sample,
                Err(e) => {
                    warn!("Skipping {} ({}) this frame: {}", controller.name(), controller.instance_id(), e);
                    report.failed += 1;
                    continue;
                }
            };
            report.controllers += 1;

            let moved = match mode {
                ControlMode::View => self.view_action.apply(&sample, &self.config, &mut *ctx.view),
                ControlMode::Model => {
                    self.model_action
                        .apply(&sample, &self.config, &*ctx.view, &mut *ctx.selection)
                }
            };
            if moved {
                report.moved += 1;
            }
        }

        report
    }

    fn handle_event(&mut self, event: DeviceEvent, ctx: &mut HostContext<'_>) {
        match event {
            DeviceEvent::Added { device_index } => {
                self.registry.on_device_added(device_index);
            }
            DeviceEvent::Removed { instance_id } => {
                self.registry.on_device_removed(instance_id);
            }
            DeviceEvent::ButtonPressed { instance_id, button } => {
                if button == self.toggle_button {
                    self.mode.toggle();
                    return;
                }
                let Some(command) = self.config.get_button_command(button) else {
                    debug!("No command bound to {} on {}", button, instance_id);
                    return;
                };
                debug!("{} on {} runs '{}'", button, instance_id, command);
                if let Err(e) = ctx.commands.run(command) {
                    warn!("Command '{}' bound to {} failed: {}", command, button, e);
                }
            }
        }
    }

    // ==== Mode ====

    pub fn mode(&self) -> ControlMode {
        self.mode.current()
    }

    /// Flips the mode, as the toggle button would.
    pub fn toggle_mode(&mut self) -> ControlMode {
        self.mode.toggle()
    }

    pub fn toggle_button(&self) -> Button {
        self.toggle_button
    }

    pub fn set_toggle_button(&mut self, button: Button) {
        self.toggle_button = button;
    }

    // ==== Configuration ====

    pub fn config(&self) -> &GamepadConfig {
        &self.config
    }

    /// Settings are read fresh each frame, so edits apply on the next tick.
    pub fn config_mut(&mut self) -> &mut GamepadConfig {
        &mut self.config
    }

    /// Saves the configuration, logging rather than returning failures.
    ///
    /// # Returns
    ///
    /// `true` if the document was written.
    pub fn save_config(&self) -> bool {
        match self.config.save() {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to save gamepad configuration: {}", e);
                false
            }
        }
    }

    /// State to embed in a host session file.
    pub fn session_state(&self) -> SessionState {
        SessionState {
            version: SESSION_VERSION,
            config: self.config.to_snapshot(),
        }
    }

    /// Applies a stored session's configuration.
    ///
    /// # Errors
    ///
    /// Fails if the stored configuration is not a valid settings object;
    /// the current configuration is left unchanged.
    pub fn restore_session(&mut self, state: &SessionState) -> Result<()> {
        if state.version != SESSION_VERSION {
            warn!("Restoring session state version {} as version {}", state.version, SESSION_VERSION);
        }
        self.config.from_snapshot(&state.config)
    }

    // ==== Devices ====

    pub fn registry(&self) -> &DeviceRegistry<B> {
        &self.registry
    }

    pub fn backend_mut(&mut self) -> &mut B {
        self.registry.backend_mut()
    }

    /// Installs the host's connected-controllers listener.
    pub fn set_status_listener(&mut self, listener: impl FnMut(&RegistryStatus) + 'static) {
        self.registry.set_status_listener(listener);
    }

    pub fn status_text(&self) -> String {
        self.registry.status_text()
    }
}
