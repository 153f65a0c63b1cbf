//! The process-wide mode state machine.
//!
//! ```text
//!          toggle-on             fallback
//!   Idle ────────────▶ Hint ────────────▶ Grid
//!    ▲                  │                  │
//!    └──────────────────┴──────────────────┘
//!      toggle-off / resolved / cancel   resolved / cancel
//! ```
//!
//! Every transition runs the exit hook of the old mode, stores the new
//! mode, then runs the enter hook of the new mode.  Hooks are isolated:
//! an `Err` or a panic inside a hook is logged and the transition still
//! completes.

use log::{info, warn};
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

/// Exactly one of these is active at any instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Idle,
    Hint,
    Grid,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Idle => write!(f, "idle"),
            Mode::Hint => write!(f, "hint"),
            Mode::Grid => write!(f, "grid"),
        }
    }
}

/// When a hook runs relative to its mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookEvent {
    Enter,
    Exit,
}

/// Error type hooks may return.
pub type HookError = Box<dyn std::error::Error>;

/// A transition callback.
pub type Hook = Box<dyn FnMut() -> Result<(), HookError>>;

/// Errors from [`ModeManager::switch_mode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModeError {
    #[error("invalid mode transition {from} -> {to}")]
    InvalidTransition { from: Mode, to: Mode },
}

/// Owns the current [`Mode`] and the registered transition hooks.
pub struct ModeManager {
    current: Mode,
    hooks: HashMap<(HookEvent, Mode), Hook>,
}

impl Default for ModeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ModeManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModeManager")
            .field("current", &self.current)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

impl ModeManager {
    /// Start in [`Mode::Idle`] with no hooks.
    pub fn new() -> Self {
        Self {
            current: Mode::Idle,
            hooks: HashMap::new(),
        }
    }

    pub fn current_mode(&self) -> Mode {
        self.current
    }

    /// Register `hook` to run on `event` for `mode`, replacing any hook
    /// previously registered for the same pair.
    pub fn register_hook<F>(&mut self, event: HookEvent, mode: Mode, hook: F)
    where
        F: FnMut() -> Result<(), HookError> + 'static,
    {
        self.hooks.insert((event, mode), Box::new(hook));
    }

    /// Whether `from -> to` is an edge of the state machine.
    pub fn is_valid_transition(from: Mode, to: Mode) -> bool {
        matches!(
            (from, to),
            (Mode::Idle, Mode::Hint)
                | (Mode::Hint, Mode::Idle)
                | (Mode::Hint, Mode::Grid)
                | (Mode::Grid, Mode::Idle)
        )
    }

    /// Transition to `to`.
    ///
    /// Switching to the current mode does nothing and runs no hooks.  A
    /// transition that is not an edge of the state machine is rejected and
    /// leaves the mode untouched.
    pub fn switch_mode(&mut self, to: Mode) -> Result<(), ModeError> {
        let from = self.current;
        if from == to {
            return Ok(());
        }
        if !Self::is_valid_transition(from, to) {
            return Err(ModeError::InvalidTransition { from, to });
        }

        self.run_hook(HookEvent::Exit, from);
        self.current = to;
        info!("mode {} -> {}", from, to);
        self.run_hook(HookEvent::Enter, to);
        Ok(())
    }

    fn run_hook(&mut self, event: HookEvent, mode: Mode) {
        let Some(hook) = self.hooks.get_mut(&(event, mode)) else {
            return;
        };
        match panic::catch_unwind(AssertUnwindSafe(|| hook())) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("{:?} hook for {} failed: {}", event, mode, e),
            Err(_) => warn!("{:?} hook for {} panicked", event, mode),
        }
    }
}
