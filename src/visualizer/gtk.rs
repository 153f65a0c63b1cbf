//! GTK4 + layer-shell overlay that runs on the **main thread**.
//!
//! # Widget tree
//!
//! ```text
//! window                    (layer-shell, anchored to every edge, transparent)
//! └ gtk4::Fixed
//!     ├ .hint-label         (one per target, absolutely positioned)
//!     ├ .hint-label.match   (code still matches the typed prefix)
//!     └ .grid-cell          (one per grid cell, sized to the cell)
//! ```
//!
//! # CSS selectors
//!
//! | Selector            | Targets                                   |
//! |---------------------|-------------------------------------------|
//! | `window`            | The overlay window (keep transparent)     |
//! | `.hint-label`       | Every hint label                          |
//! | `.hint-label.match` | Labels still matching the typed prefix    |
//! | `.grid-cell`        | Every numbered grid cell                  |
//!
//! [`GtkOverlay`] is the controller's renderer in this build.  While
//! anything is shown the window takes the keyboard exclusively and turns
//! key presses into [`Command`]s on the event channel.

use super::label_rect;
use crate::codes::{Alphabet, Code};
use crate::command::{Command, Event, Rect, Target};
use crate::config::{Config, OverlayConfig};
use crate::controller::Controller;
use crate::grid;
use crate::traits::{ClickDispatcher, CursorMover, ElementDetector, Feedback, OverlayRenderer};
use gtk4::prelude::*;
use gtk4::{gdk, glib};
use gtk4_layer_shell::{Edge, KeyboardMode, LayerShell};
use log::{debug, error, info, warn};
use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

//  Default CSS

const DEFAULT_CSS: &str = r#"
window,
window.background {
    background-color: transparent;
    background: none;
}

.hint-label {
    background-color: #f5d90a;
    color: black;
    border: 2px solid black;
    border-radius: 4px;
    font-family: sans-serif;
    font-weight: bold;
    font-size: 14px;
}

.hint-label.match {
    background-color: #46c35a;
}

.grid-cell {
    border: 1px solid rgba(255, 255, 255, 0.6);
    background-color: rgba(0, 0, 0, 0.25);
    color: white;
    font-size: 28px;
    font-weight: bold;
}
"#;

//  Overlay renderer

/// The layer-shell window, driven directly by the controller.
///
/// Both live on the main thread, so every call takes effect before it
/// returns.  In particular [`clear`](OverlayRenderer::clear) has hidden
/// the window and released the keyboard by the time a click or pointer
/// move is sent to the compositor.
pub struct GtkOverlay {
    window: gtk4::Window,
    canvas: gtk4::Fixed,
    /// Hint labels by code, in the order they were shown.
    labels: Vec<(String, gtk4::Label)>,
    cells: Vec<gtk4::Label>,
    screen: Rect,
    config: OverlayConfig,
}

impl GtkOverlay {
    /// Build the (hidden) overlay over `screen`.  Key presses on it are
    /// sent into `events`.  GTK must already be initialised.
    pub fn new(screen: Rect, config: OverlayConfig, events: mpsc::Sender<Event>) -> Self {
        let window = gtk4::Window::new();
        window.init_layer_shell();
        window.set_layer(gtk4_layer_shell::Layer::Overlay);
        window.set_namespace("hintgrd");
        window.set_keyboard_mode(KeyboardMode::None);
        for edge in [Edge::Left, Edge::Right, Edge::Top, Edge::Bottom] {
            window.set_anchor(edge, true);
        }
        window.set_exclusive_zone(-1);
        window.set_decorated(false);
        window.remove_css_class("background");

        let canvas = gtk4::Fixed::new();
        window.set_child(Some(&canvas));

        let keys = gtk4::EventControllerKey::new();
        keys.connect_key_pressed(move |_, keyval, _, _| {
            let Some(name) = keyval.name() else {
                return glib::Propagation::Proceed;
            };
            match Command::from_key_name(&name) {
                Some(cmd) => {
                    debug!("key {} -> {:?}", name, cmd);
                    if events.send(Event::Command(cmd)).is_err() {
                        warn!("event channel closed, dropping key {}", name);
                    }
                    glib::Propagation::Stop
                }
                None => glib::Propagation::Proceed,
            }
        });
        window.add_controller(keys);

        window.present();
        window.set_visible(false);
        info!("overlay mapped (hidden) over {}", screen);

        Self {
            window,
            canvas,
            labels: Vec::new(),
            cells: Vec::new(),
            screen,
            config,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.window.is_visible()
    }

    fn put_label(&mut self, code: &str, target: Rect) {
        let rect = label_rect(target, self.screen, &self.config);
        let widget = gtk4::Label::new(Some(&code.to_uppercase()));
        widget.add_css_class("hint-label");
        widget.set_size_request(rect.width as i32, rect.height as i32);
        let (x, y) = self.local(rect);
        self.canvas.put(&widget, x, y);
        self.labels.push((code.to_string(), widget));
    }

    fn put_cell(&mut self, number: usize, cell: Rect) {
        let widget = gtk4::Label::new(Some(&number.to_string()));
        widget.add_css_class("grid-cell");
        widget.set_size_request(cell.width as i32, cell.height as i32);
        let (x, y) = self.local(cell);
        self.canvas.put(&widget, x, y);
        self.cells.push(widget);
    }

    /// Screen coordinates to canvas coordinates.
    fn local(&self, rect: Rect) -> (f64, f64) {
        ((rect.x - self.screen.x) as f64, (rect.y - self.screen.y) as f64)
    }

    fn remove_all(&mut self) {
        for (_, widget) in self.labels.drain(..) {
            self.canvas.remove(&widget);
        }
        for widget in self.cells.drain(..) {
            self.canvas.remove(&widget);
        }
    }

    fn present(&self) {
        self.window.set_keyboard_mode(KeyboardMode::Exclusive);
        self.window.set_visible(true);
        self.window.present();
    }
}

impl OverlayRenderer for GtkOverlay {
    type Error = Infallible;

    fn render_labels(&mut self, labels: &[(Code, Target)]) -> Result<(), Infallible> {
        self.remove_all();
        for (code, target) in labels {
            self.put_label(code.as_str(), target.rect);
        }
        debug!("showing {} label(s)", labels.len());
        self.present();
        Ok(())
    }

    fn highlight(&mut self, codes: &[Code]) -> Result<(), Infallible> {
        for (code, widget) in &self.labels {
            if codes.iter().any(|c| c.as_str() == code) {
                widget.add_css_class("match");
            } else {
                widget.remove_css_class("match");
            }
        }
        Ok(())
    }

    fn render_grid(&mut self, region: Rect, arity: u32) -> Result<(), Infallible> {
        self.remove_all();
        for (i, cell) in grid::partition(region, arity).into_iter().enumerate() {
            self.put_cell(i + 1, cell);
        }
        debug!("showing {}x{} grid over {}", arity, arity, region);
        self.present();
        Ok(())
    }

    fn feedback(&mut self, feedback: Feedback) -> Result<(), Infallible> {
        debug!("feedback: {:?}", feedback);
        self.window.display().beep();
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Infallible> {
        self.remove_all();
        self.window.set_keyboard_mode(KeyboardMode::None);
        self.window.set_visible(false);
        // Push the unmap out now; the caller may click right after.
        self.window.display().flush();
        Ok(())
    }
}

//  Public API

/// Run the GTK4 main loop on the **current** (main) thread.
///
/// The overlay is created here, after GTK is initialised, and handed to
/// a [`Controller`] over `desktop`.  `events` is drained into the
/// controller every frame; key presses on the overlay are sent back into
/// it through `key_sink`.  `screen` is the area the overlay window
/// covers, in the same coordinates as targets.  The overlay itself holds
/// a sender, so this blocks for the life of the daemon.
pub fn run_main_loop<B>(
    desktop: B,
    alphabet: Alphabet,
    config: &Config,
    events: mpsc::Receiver<Event>,
    key_sink: mpsc::Sender<Event>,
    screen: Rect,
    css_path: Option<PathBuf>,
) -> Result<(), glib::BoolError>
where
    B: ElementDetector + ClickDispatcher + CursorMover + 'static,
{
    gtk4::init()?;
    info!("GTK4 initialised on main thread");
    load_css(&css_path);

    let overlay = GtkOverlay::new(screen, config.overlay.clone(), key_sink);
    let mut controller = Controller::new(desktop, overlay, alphabet, &config.grid);

    glib::timeout_add_local(Duration::from_millis(16), move || {
        while let Ok(event) = events.try_recv() {
            debug!("event: {:?}", event);
            if let Err(e) = controller.handle(event) {
                error!("{}", e);
            }
        }
        glib::ControlFlow::Continue
    });

    info!("entering GLib main loop");
    glib::MainLoop::new(None, false).run();
    info!("GLib main loop exited");
    Ok(())
}

//  CSS loading

fn load_css(css_path: &Option<PathBuf>) {
    let provider = gtk4::CssProvider::new();

    let css = match css_path.as_ref().filter(|p| p.exists()) {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(content) => {
                info!("user CSS: {} ({} bytes)", p.display(), content.len());
                content
            }
            Err(e) => {
                warn!("CSS read failed ({}): {}, using built-in", p.display(), e);
                DEFAULT_CSS.to_string()
            }
        },
        None => DEFAULT_CSS.to_string(),
    };

    #[allow(deprecated)]
    provider.load_from_data(&css);

    match gdk::Display::default() {
        Some(display) => gtk4::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
        ),
        None => warn!("no GDK display, CSS will not be applied"),
    }
}
