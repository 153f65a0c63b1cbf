//! The two interactive sessions: labelled hints and the grid fallback.
//!
//! A session owns everything it works on (targets, codes, region history)
//! and borrows its collaborators per call.  At most one session exists at a
//! time; the [`Controller`](crate::controller::Controller) holds it as a
//! [`Session`].

pub mod grid;
pub mod hint;

pub use grid::{GridOutcome, GridSession};
pub use hint::{HintOutcome, HintSession};

use crate::traits::OverlayRenderer;
use log::warn;

/// A collaborator failed while a session was running.
///
/// The session has already torn down its overlay (best-effort) when one of
/// these is returned; the caller only has to go back to idle.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("overlay error: {0}")]
    Overlay(String),
    #[error("click failed: {0}")]
    Click(String),
    #[error("cursor move failed: {0}")]
    Cursor(String),
}

/// The single live session.
#[derive(Debug)]
pub enum Session {
    Hint(HintSession),
    Grid(GridSession),
}

/// Clear the overlay, logging instead of failing.  Used on paths that are
/// already reporting a more important error.
pub(crate) fn clear_quietly<O: OverlayRenderer>(overlay: &mut O) {
    if let Err(e) = overlay.clear() {
        warn!("overlay clear failed: {}", e);
    }
}
