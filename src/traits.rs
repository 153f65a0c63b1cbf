//! Core traits that decouple hintgrd from any specific desktop, overlay,
//! or transport.
//!
//! Every concrete backend (Hyprland, the CapsLock LED, a GTK overlay, a
//! Unix-socket listener, a test harness, …) implements one of these
//! traits.  The sessions and the [`Controller`](crate::controller::Controller)
//! only depend on these abstractions.

use crate::codes::Code;
use crate::command::{Command, Rect, Target};
use std::sync::mpsc;

/// Enumerates the clickable surfaces currently on screen.
pub trait ElementDetector {
    /// Return the targets in the order they should receive codes.
    ///
    /// # Contract
    ///
    /// * Must be time-bounded: return a partial result rather than block.
    /// * Failure or an empty screen is reported as an empty list, never as
    ///   an error.  Implementations log what went wrong.
    fn detect(&self) -> Vec<Target>;
}

/// Negative or informational feedback the overlay should give the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    /// Hint mode found nothing to label.
    NoTargets,
    /// The typed input matches no code.
    NoMatch,
}

/// Draws the hint labels and the grid.
///
/// All methods are side effects; the core only cares whether they
/// succeeded.
pub trait OverlayRenderer {
    /// The error type produced by this renderer.
    type Error: std::error::Error + Send + 'static;

    /// Show one label per `(code, target)` pair, replacing whatever was
    /// shown before.
    fn render_labels(&mut self, labels: &[(Code, Target)]) -> Result<(), Self::Error>;

    /// Emphasise `codes`; every other label returns to normal.
    fn highlight(&mut self, codes: &[Code]) -> Result<(), Self::Error>;

    /// Show a numbered `arity × arity` grid over `region`.
    fn render_grid(&mut self, region: Rect, arity: u32) -> Result<(), Self::Error>;

    /// Give audible or visual feedback.
    fn feedback(&mut self, feedback: Feedback) -> Result<(), Self::Error>;

    /// Remove everything and give input focus back.
    fn clear(&mut self) -> Result<(), Self::Error>;
}

/// Activates a detected target (click, focus, …).
pub trait ClickDispatcher {
    /// The error type produced by this dispatcher.
    type Error: std::error::Error + Send + 'static;

    fn activate(&self, target: &Target) -> Result<(), Self::Error>;
}

/// Moves the pointer.
pub trait CursorMover {
    /// The error type produced by this mover.
    type Error: std::error::Error + Send + 'static;

    /// Warp the pointer to absolute screen coordinates.
    fn move_to(&self, x: i32, y: i32) -> Result<(), Self::Error>;

    /// The full virtual display area the pointer can reach.  Used as the
    /// top-level grid region.
    fn bounds(&self) -> Result<Rect, Self::Error>;
}

/// A binary signal that turns hint mode on and off.
pub trait ToggleSignal {
    /// The error type produced by this signal.
    type Error: std::error::Error + Send + 'static;

    /// Current state of the signal.
    fn read(&mut self) -> Result<bool, Self::Error>;
}

//  Command Source

/// A source of [`Command`]s.
///
/// Implementations listen on some transport (a Unix socket, an overlay
/// window's key events, an in-memory channel) and forward parsed
/// commands into the provided [`mpsc::Sender`].
///
/// # Contract
///
/// * [`run`](CommandSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received command must be sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait CommandSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`Command`] into `sink`.
    ///
    /// This method blocks the calling thread.  To run multiple sources
    /// concurrently, spawn each one on its own thread.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error>;
}
