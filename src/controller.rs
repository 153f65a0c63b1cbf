//! The orchestrator that ties the mode state machine, the sessions, and the
//! collaborators together.
//!
//! [`Controller`] owns the [`ModeManager`] and the single live [`Session`]
//! and reacts to [`Event`]s: toggle edges from the
//! [`ToggleMonitor`](crate::toggle::ToggleMonitor) and user [`Command`]s.
//! Every path that ends a session goes through the mode manager, so the
//! mode and the session can never disagree.

use crate::codes::Alphabet;
use crate::command::{Command, Event, ToggleEdge};
use crate::config::GridConfig;
use crate::mode::{HookError, HookEvent, Mode, ModeError, ModeManager};
use crate::session::{
    GridOutcome, GridSession, HintOutcome, HintSession, Session, SessionError,
};
use crate::traits::{ClickDispatcher, CursorMover, ElementDetector, OverlayRenderer};
use log::{debug, info, warn};

/// Possible errors from the controller.
///
/// Whatever the error, the controller is back in [`Mode::Idle`] with no
/// overlay on screen by the time it is returned.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// A collaborator failed mid-session.
    #[error("session failed: {0}")]
    Session(#[from] SessionError),
    /// The display bounds for the grid could not be queried.
    #[error("display bounds unavailable: {0}")]
    Bounds(String),
    /// A transition the state machine does not allow was requested.
    #[error(transparent)]
    Mode(#[from] ModeError),
}

/// Routes events to the active session.
///
/// Generic over the desktop backend (`B`, which detects, clicks, and moves
/// the pointer) and the overlay (`O`), so it has no knowledge of Hyprland
/// or GTK.
///
/// # Typical usage
///
/// ```ignore
/// let mut controller = Controller::new(desktop, overlay, Alphabet::default(), &GridConfig::default());
/// controller.handle(Event::Toggle(ToggleEdge::On))?;
/// controller.handle(Event::Command(Command::Key('a')))?;
/// ```
pub struct Controller<B, O> {
    desktop: B,
    overlay: O,
    modes: ModeManager,
    session: Option<Session>,
    alphabet: Alphabet,
    grid: GridConfig,
}

impl<B, O> Controller<B, O>
where
    B: ElementDetector + ClickDispatcher + CursorMover,
    O: OverlayRenderer,
{
    /// Create an idle controller.
    pub fn new(desktop: B, overlay: O, alphabet: Alphabet, grid: &GridConfig) -> Self {
        Self {
            desktop,
            overlay,
            modes: ModeManager::new(),
            session: None,
            alphabet,
            grid: grid.clone(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.modes.current_mode()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn desktop(&self) -> &B {
        &self.desktop
    }

    pub fn overlay(&self) -> &O {
        &self.overlay
    }

    /// Register a mode transition hook.  See
    /// [`ModeManager::register_hook`].
    pub fn register_hook<F>(&mut self, event: HookEvent, mode: Mode, hook: F)
    where
        F: FnMut() -> Result<(), HookError> + 'static,
    {
        self.modes.register_hook(event, mode, hook);
    }

    /// Process a single [`Event`].
    pub fn handle(&mut self, event: Event) -> Result<(), ControllerError> {
        match event {
            Event::Toggle(ToggleEdge::On) => {
                if self.mode() != Mode::Idle {
                    debug!("toggle-on ignored in {} mode", self.mode());
                    return Ok(());
                }
                self.modes.switch_mode(Mode::Hint)?;
                self.start_hint()
            }

            Event::Toggle(ToggleEdge::Off) => {
                if self.mode() != Mode::Hint {
                    debug!("toggle-off ignored in {} mode", self.mode());
                    return Ok(());
                }
                self.cancel()
            }

            Event::Command(cmd) => self.command(cmd),
        }
    }

    /// Tear down whatever is active and return to idle.
    pub fn shutdown(&mut self) -> Result<(), ControllerError> {
        self.cancel()
    }

    fn command(&mut self, cmd: Command) -> Result<(), ControllerError> {
        match (&mut self.session, cmd) {
            (None, Command::Activate) => self.handle(Event::Toggle(ToggleEdge::On)),
            (None, cmd) => {
                debug!("{:?} ignored while idle", cmd);
                Ok(())
            }

            (_, Command::Cancel) => {
                info!("cancel");
                self.cancel()
            }

            (Some(Session::Hint(hint)), Command::Key(ch)) => {
                let result = hint.handle_key(ch, &self.desktop, &mut self.overlay);
                self.after_hint(result)
            }
            (Some(_), Command::Activate) => {
                debug!("already active");
                Ok(())
            }

            (Some(Session::Hint(_)), Command::Fallback) => self.fallback(),
            (Some(Session::Hint(_)), cmd) => {
                debug!("{:?} ignored in hint mode", cmd);
                Ok(())
            }

            (Some(Session::Grid(grid)), Command::Key(ch)) => match ch.to_digit(10) {
                Some(n) => {
                    let result = grid.select(n, &self.desktop, &mut self.overlay);
                    self.after_grid(result)
                }
                None => {
                    debug!("{:?} is not a cell number", ch);
                    Ok(())
                }
            },
            (Some(Session::Grid(grid)), Command::Cell(n)) => {
                let result = grid.select(n, &self.desktop, &mut self.overlay);
                self.after_grid(result)
            }
            (Some(Session::Grid(grid)), Command::Back) => match grid.back(&mut self.overlay) {
                Ok(_) => Ok(()),
                Err(e) => self.fail(e),
            },
            (Some(Session::Grid(_)), Command::Fallback) => {
                debug!("already in grid mode");
                Ok(())
            }
        }
    }

    fn start_hint(&mut self) -> Result<(), ControllerError> {
        let mut hint = HintSession::new();
        let result = hint.activate(&self.alphabet, &self.desktop, &mut self.overlay);
        if let Ok(HintOutcome::Active) = result {
            self.session = Some(Session::Hint(hint));
        }
        self.after_hint(result)
    }

    /// Hint → Grid.  The hint overlay is gone before the grid appears.
    fn fallback(&mut self) -> Result<(), ControllerError> {
        info!("switching to grid fallback");
        if let Some(Session::Hint(mut hint)) = self.session.take() {
            if let Err(e) = hint.deactivate(&mut self.overlay) {
                return self.fail(e);
            }
        }
        self.modes.switch_mode(Mode::Grid)?;

        let bounds = match self.desktop.bounds() {
            Ok(bounds) => bounds,
            Err(e) => {
                self.to_idle()?;
                return Err(ControllerError::Bounds(e.to_string()));
            }
        };
        let mut grid = GridSession::new(self.grid.arity, self.grid.min_cell_size);
        match grid.activate(bounds, &mut self.overlay) {
            Ok(_) => {
                self.session = Some(Session::Grid(grid));
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    fn after_hint(&mut self, result: Result<HintOutcome, SessionError>) -> Result<(), ControllerError> {
        match result {
            Ok(HintOutcome::Active) => Ok(()),
            Ok(HintOutcome::NoTargets) | Ok(HintOutcome::Cancelled) => self.to_idle(),
            Ok(HintOutcome::Activated(target)) => {
                info!("activated {:?}", target.name);
                self.to_idle()
            }
            Err(e) => self.fail(e),
        }
    }

    fn after_grid(&mut self, result: Result<GridOutcome, SessionError>) -> Result<(), ControllerError> {
        match result {
            Ok(GridOutcome::Active) => Ok(()),
            Ok(GridOutcome::Moved { .. }) | Ok(GridOutcome::Cancelled) => self.to_idle(),
            Err(e) => self.fail(e),
        }
    }

    /// Synchronously tear down the active session, then go idle.
    fn cancel(&mut self) -> Result<(), ControllerError> {
        let result = match self.session.take() {
            Some(Session::Hint(mut hint)) => hint.deactivate(&mut self.overlay).map(|_| ()),
            Some(Session::Grid(mut grid)) => grid.deactivate(&mut self.overlay).map(|_| ()),
            None => Ok(()),
        };
        match result {
            Ok(()) => self.to_idle(),
            Err(e) => self.fail(e),
        }
    }

    fn fail(&mut self, error: SessionError) -> Result<(), ControllerError> {
        warn!("{}; returning to idle", error);
        self.to_idle()?;
        Err(error.into())
    }

    fn to_idle(&mut self) -> Result<(), ControllerError> {
        self.session = None;
        self.modes.switch_mode(Mode::Idle)?;
        Ok(())
    }
}

//  Tests
