//! Entry point for the **hintgrd** daemon.
//!
//! Background threads produce [`Event`]s (toggle edges from the CapsLock
//! LED, commands from the Unix socket) and the main thread feeds them to
//! the [`Controller`].
//!
//! When the `overlay-gtk` feature is enabled the main thread runs the GLib
//! main loop (GTK4 requires it), owns the overlay window, and polls the
//! event channel from there.  Without the feature, a blocking loop drives
//! the controller and the overlay is described in the log.

use hintgrd::codes::Alphabet;
use hintgrd::command::{Command, Event};
use hintgrd::config::{Config, ToggleConfig};
use hintgrd::hyprland::HyprlandDesktop;
use hintgrd::ipc::listener::UnixSocketListener;
use hintgrd::toggle::{LedToggle, ToggleHandle, ToggleMonitor, LEDS_DIR};
use hintgrd::traits::CommandSource;
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::mpsc;

/// Resolve the config directory (`$XDG_CONFIG_HOME/hintgrd`).
fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("hintgrd")
}

/// Load `$XDG_CONFIG_HOME/hintgrd/config.json`.  A missing file means
/// defaults; a broken one is fatal.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    if !path.exists() {
        info!("no config at {}, using defaults", path.display());
        return Config::default();
    }
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

//  Main

fn main() {
    env_logger::init();

    let config = load_config();
    let alphabet = match config.hints.alphabet() {
        Ok(alphabet) => alphabet,
        Err(e) => {
            error!("hints: {}", e);
            std::process::exit(1);
        }
    };

    let desktop = HyprlandDesktop::new(&config.detector);

    let (event_tx, event_rx) = mpsc::channel::<Event>();
    let _toggle = spawn_toggle(&config.toggle, event_tx.clone());
    spawn_command_sources(event_tx.clone());

    start_event_loop(desktop, alphabet, event_tx, event_rx, config);
}

//  Event loops

#[cfg(feature = "overlay-gtk")]
fn start_event_loop(
    desktop: HyprlandDesktop,
    alphabet: Alphabet,
    event_tx: mpsc::Sender<Event>,
    event_rx: mpsc::Receiver<Event>,
    config: Config,
) {
    use hintgrd::command::Rect;
    use hintgrd::traits::CursorMover;

    let screen = match desktop.bounds() {
        Ok(bounds) => bounds,
        Err(e) => {
            warn!("display bounds unavailable ({}), anchoring overlay at 0,0", e);
            Rect::new(0, 0, 0, 0)
        }
    };
    let css = Some(config_dir().join("style.css"));
    if let Err(e) = hintgrd::visualizer::gtk::run_main_loop(
        desktop, alphabet, &config, event_rx, event_tx, screen, css,
    ) {
        error!("failed to initialise GTK4: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "overlay-gtk"))]
fn start_event_loop(
    desktop: HyprlandDesktop,
    alphabet: Alphabet,
    event_tx: mpsc::Sender<Event>,
    event_rx: mpsc::Receiver<Event>,
    config: Config,
) {
    use hintgrd::controller::Controller;
    use hintgrd::visualizer::logging::LogVisualizer;
    use hintgrd::visualizer::ChannelOverlay;

    drop(event_tx);
    let (overlay, overlay_rx) = ChannelOverlay::channel();
    let mut controller = Controller::new(desktop, overlay, alphabet, &config.grid);
    let mut visualizer = LogVisualizer::new();
    info!("hintgrd running (log overlay)");
    for event in event_rx {
        if let Err(e) = controller.handle(event) {
            error!("{}", e);
        }
        visualizer.drain(&overlay_rx);
    }
    if let Err(e) = controller.shutdown() {
        warn!("shutdown: {}", e);
    }
    visualizer.drain(&overlay_rx);
    info!("all event sources closed, exiting");
}

//  Helpers

fn spawn_toggle(config: &ToggleConfig, tx: mpsc::Sender<Event>) -> Option<ToggleHandle> {
    let led = match &config.led {
        Some(name) => LedToggle::named(name),
        None => match LedToggle::discover(LEDS_DIR) {
            Ok(led) => led,
            Err(e) => {
                warn!("{}; only \"Activate\" on the socket enters hint mode", e);
                return None;
            }
        },
    };
    Some(ToggleMonitor::spawn(led, config.poll_interval(), tx))
}

fn spawn_command_sources(tx: mpsc::Sender<Event>) {
    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
    let path = UnixSocketListener::default_path();
    std::thread::spawn(move || {
        let mut source = UnixSocketListener::new(&path);
        if let Err(e) = source.run(cmd_tx) {
            error!("socket listener error: {}", e);
        }
    });

    std::thread::spawn(move || {
        for cmd in cmd_rx {
            if tx.send(Event::Command(cmd)).is_err() {
                break;
            }
        }
    });
}
