//! # Padview
//!
//! Drive a 3D view and the selected models with a game controller.
//!
//! The `run` subcommand ticks the input core against a headless scene so a
//! controller can be tried without a host application; the other
//! subcommands edit the stored settings.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use glam::DVec3;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use padview::config::GamepadConfig;
use padview::controller::{Button, GilrsBackend};
use padview::dispatch::InputDispatcher;
use padview::scene::SceneView;
use padview::sim::{SimHost, SimModel, SimView};

/// Number of frames between status log messages
const LOG_INTERVAL_FRAMES: u64 = 600;

/// Game controller navigation for 3D views
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file (defaults to the per-user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Also write logs to daily files in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Drive a headless scene from connected controllers
    Run {
        /// Frame ticks per second
        #[arg(long, default_value_t = 60)]
        fps: u32,

        /// Stop after this many frames
        #[arg(long)]
        frames: Option<u64>,

        /// Button that switches between view and model mode
        #[arg(long, default_value = "START")]
        toggle: Button,
    },
    /// Print the effective settings
    Show,
    /// Set the stick dead zone (0.0 - 0.5)
    Deadzone { value: f64 },
    /// Set one sensitivity (0.1 - 5.0)
    Sensitivity { kind: SensitivityKind, value: f64 },
    /// Enable or disable Y-axis inversion
    InvertY {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
    /// Bind a button to a host command
    Bind { button: Button, command: String },
    /// Remove a button binding
    Unbind { button: Button },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SensitivityKind {
    Rotation,
    Translation,
    Zoom,
}

fn init_logging(log_dir: Option<&PathBuf>) -> Option<WorkerGuard> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "padview.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = init_logging(args.log_dir.as_ref());

    let mut config = GamepadConfig::load_from(args.config.clone());

    match args.command {
        Command::Run { fps, frames, toggle } => run(config, fps, frames, toggle).await,
        Command::Show => {
            let json = serde_json::to_string_pretty(&config.to_snapshot())?;
            println!("{}", json);
            if let Some(path) = config.path() {
                println!("# {}", path.display());
            }
            Ok(())
        }
        Command::Deadzone { value } => {
            let stored = config.set_dead_zone(value);
            save(&config)?;
            info!("Dead zone set to {:.2}", stored);
            Ok(())
        }
        Command::Sensitivity { kind, value } => {
            let stored = match kind {
                SensitivityKind::Rotation => config.set_rotation_sensitivity(value),
                SensitivityKind::Translation => config.set_translation_sensitivity(value),
                SensitivityKind::Zoom => config.set_zoom_sensitivity(value),
            };
            save(&config)?;
            info!("{:?} sensitivity set to {:.2}", kind, stored);
            Ok(())
        }
        Command::InvertY { enabled } => {
            config.set_invert_y(enabled);
            save(&config)?;
            info!("Y-axis inversion {}", if enabled { "enabled" } else { "disabled" });
            Ok(())
        }
        Command::Bind { button, command } => {
            if command.trim().is_empty() {
                bail!("command for {} must not be empty", button);
            }
            config.set_button_command(button.name(), Some(&command));
            save(&config)?;
            info!("{} bound to '{}'", button, command);
            Ok(())
        }
        Command::Unbind { button } => {
            config.set_button_command(button.name(), None);
            save(&config)?;
            info!("{} unbound", button);
            Ok(())
        }
    }
}

fn save(config: &GamepadConfig) -> Result<()> {
    config
        .save()
        .with_context(|| format!("failed to save settings to {:?}", config.path()))
}

/// Scene used when no host application is attached.
fn demo_host() -> SimHost {
    let mut host = SimHost::new(SimView::orthographic(10.0, Some(0.01)));
    let first = host.selection.add(SimModel::new("model #1", DVec3::ZERO));
    host.selection.add(SimModel::new("model #2", DVec3::new(5.0, 0.0, 0.0)));
    host.selection.select(first);
    host
}

/// Ticks the dispatcher at `fps` until Ctrl+C or the frame limit.
async fn run(config: GamepadConfig, fps: u32, frames: Option<u64>, toggle: Button) -> Result<()> {
    if fps == 0 {
        bail!("--fps must be at least 1");
    }

    info!("Padview v{} starting...", env!("CARGO_PKG_VERSION"));

    let backend = GilrsBackend::new().context("game controller support is unavailable")?;
    let mut dispatcher = InputDispatcher::new(backend, config);
    dispatcher.set_toggle_button(toggle);
    dispatcher.set_status_listener(|status| info!("Status: {}", status));
    dispatcher.start();

    let mut host = demo_host();
    let mut ticker = interval(Duration::from_micros(1_000_000 / u64::from(fps)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!("Ticking at {}Hz in {} mode, press {} to switch", fps, dispatcher.mode(), toggle);
    info!("Press Ctrl+C to exit");

    let mut frame: u64 = 0;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = dispatcher.update(&mut host.context());
                frame += 1;

                if report.failed > 0 {
                    debug!("Frame {}: {} controller read(s) failed", frame, report.failed);
                }
                if frame % LOG_INTERVAL_FRAMES == 0 {
                    info!("Frame {}: {} in {} mode", frame, dispatcher.status_text(), dispatcher.mode());
                }
                if frames.is_some_and(|limit| frame >= limit) {
                    info!("Frame limit reached");
                    break;
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    dispatcher.stop();

    let camera = host.view.camera_pose();
    info!(
        "Camera at {:?}, field width {:.3}",
        camera.translation,
        host.view.field_width()
    );
    for model in host.selection.models() {
        info!("{} at {:?}", model.name, model.position());
    }
    info!("Total frames: {}", frame);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use padview::scene::SelectionProvider;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_run_defaults() {
        let args = Args::parse_from(["padview", "run"]);
        match args.command {
            Command::Run { fps, frames, toggle } => {
                assert_eq!(fps, 60);
                assert_eq!(frames, None);
                assert_eq!(toggle, Button::Start);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_bind_accepts_any_case() {
        let args = Args::parse_from(["padview", "--config", "/tmp/p.json", "bind", "dpad_up", "view top"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/p.json")));
        match args.command {
            Command::Bind { button, command } => {
                assert_eq!(button, Button::DPadUp);
                assert_eq!(command, "view top");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_invert_y_value() {
        let args = Args::parse_from(["padview", "invert-y", "true"]);
        assert!(matches!(args.command, Command::InvertY { enabled: true }));
    }

    #[test]
    fn test_unknown_button_is_rejected() {
        assert!(Args::try_parse_from(["padview", "unbind", "TURBO"]).is_err());
    }

    #[test]
    fn test_demo_host_selects_first_model() {
        let mut host = demo_host();
        assert_eq!(host.selection.selected_models().len(), 1);
        assert_eq!(host.selection.models().len(), 2);
    }
}
