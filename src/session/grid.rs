//! Grid fallback: narrow a screen region cell by cell until it is small
//! enough to place the pointer.
//!
//! The session keeps the region it currently shows plus a stack of the
//! regions it descended from, so `Back` can climb out again.  Recursing
//! and climbing only swap the current region; the session itself lives on
//! until the pointer is placed or the user cancels.

use super::{clear_quietly, SessionError};
use crate::command::Rect;
use crate::grid;
use crate::traits::{CursorMover, OverlayRenderer};
use log::{debug, info};

/// Default pixel size below which a cell is placed rather than subdivided.
pub const DEFAULT_MIN_CELL_SIZE: u32 = 150;

/// What a grid session call left behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridOutcome {
    /// Still waiting for input (possibly one level deeper or higher).
    Active,
    /// The pointer was moved to `(x, y)` and the session is over.
    Moved { x: i32, y: i32 },
    /// The session was torn down without moving the pointer.
    Cancelled,
}

/// One activation of grid mode.
#[derive(Debug, Clone)]
pub struct GridSession {
    arity: u32,
    min_cell_size: u32,
    region: Option<Rect>,
    history: Vec<Rect>,
}

impl GridSession {
    /// `arity` cells per side; a cell whose width **and** height are both
    /// below `min_cell_size` pixels resolves to a pointer move.
    pub fn new(arity: u32, min_cell_size: u32) -> Self {
        Self {
            arity,
            min_cell_size,
            region: None,
            history: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.region.is_some()
    }

    /// The region currently subdivided on screen.
    pub fn region(&self) -> Option<Rect> {
        self.region
    }

    /// Regions above the current one, outermost first.
    pub fn history(&self) -> &[Rect] {
        &self.history
    }

    pub fn depth(&self) -> usize {
        self.history.len()
    }

    pub fn arity(&self) -> u32 {
        self.arity
    }

    /// Show the grid over `region`, starting a fresh history.
    pub fn activate<O: OverlayRenderer>(
        &mut self,
        region: Rect,
        overlay: &mut O,
    ) -> Result<GridOutcome, SessionError> {
        info!("grid over {}", region);
        self.history.clear();
        self.show(region, overlay)?;
        Ok(GridOutcome::Active)
    }

    /// Select cell `n` (1-based).  Out-of-range numbers are ignored.
    pub fn select<C, O>(
        &mut self,
        n: u32,
        cursor: &C,
        overlay: &mut O,
    ) -> Result<GridOutcome, SessionError>
    where
        C: CursorMover,
        O: OverlayRenderer,
    {
        let Some(region) = self.region else {
            return Ok(GridOutcome::Cancelled);
        };
        let Some(cell) = grid::cell(region, self.arity, n) else {
            debug!("cell {} outside 1..={}", n, self.arity * self.arity);
            return Ok(GridOutcome::Active);
        };

        // A region too small to split hands the whole of itself to one cell.
        let exhausted = cell == region;
        if exhausted || (cell.width < self.min_cell_size && cell.height < self.min_cell_size) {
            let (x, y) = cell.center();
            self.reset();
            clear_quietly(overlay);
            info!("pointer to ({}, {})", x, y);
            cursor
                .move_to(x, y)
                .map_err(|e| SessionError::Cursor(e.to_string()))?;
            return Ok(GridOutcome::Moved { x, y });
        }

        debug!("cell {} is {}, subdividing", n, cell);
        self.history.push(region);
        self.show(cell, overlay)?;
        Ok(GridOutcome::Active)
    }

    /// Return to the previous level.  Returns `false` (and changes
    /// nothing) at the top level.
    pub fn back<O: OverlayRenderer>(&mut self, overlay: &mut O) -> Result<bool, SessionError> {
        if !self.is_active() {
            return Ok(false);
        }
        let Some(previous) = self.history.pop() else {
            debug!("already at top level");
            return Ok(false);
        };
        self.show(previous, overlay)?;
        Ok(true)
    }

    /// Tear the session down and forget all history.
    pub fn deactivate<O: OverlayRenderer>(
        &mut self,
        overlay: &mut O,
    ) -> Result<GridOutcome, SessionError> {
        if !self.is_active() {
            return Ok(GridOutcome::Cancelled);
        }
        self.reset();
        overlay
            .clear()
            .map_err(|e| SessionError::Overlay(e.to_string()))?;
        Ok(GridOutcome::Cancelled)
    }

    fn show<O: OverlayRenderer>(&mut self, region: Rect, overlay: &mut O) -> Result<(), SessionError> {
        if let Err(e) = overlay.render_grid(region, self.arity) {
            self.reset();
            clear_quietly(overlay);
            return Err(SessionError::Overlay(e.to_string()));
        }
        self.region = Some(region);
        Ok(())
    }

    fn reset(&mut self) {
        self.region = None;
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::mock::{MockDesktop, MockOverlay, OverlayCall};

    const SCREEN: Rect = Rect {
        x: 0,
        y: 0,
        width: 1920,
        height: 1080,
    };

    fn started() -> (GridSession, MockDesktop, MockOverlay) {
        let mut overlay = MockOverlay::default();
        let mut session = GridSession::new(3, DEFAULT_MIN_CELL_SIZE);
        session.activate(SCREEN, &mut overlay).unwrap();
        (session, MockDesktop::with_targets(0), overlay)
    }

    #[test]
    fn activation_draws_top_level_grid() {
        let (session, _, overlay) = started();
        assert_eq!(overlay.calls, vec![OverlayCall::Grid(SCREEN, 3)]);
        assert_eq!(session.region(), Some(SCREEN));
        assert_eq!(session.depth(), 0);
    }

    #[test]
    fn large_cell_recurses_and_pushes_history() {
        let (mut session, desktop, mut overlay) = started();
        let outcome = session.select(5, &desktop, &mut overlay).unwrap();
        assert_eq!(outcome, GridOutcome::Active);
        let center = Rect::new(640, 360, 640, 360);
        assert_eq!(session.region(), Some(center));
        assert_eq!(session.history(), &[SCREEN]);
        assert_eq!(overlay.last(), Some(&OverlayCall::Grid(center, 3)));
        assert!(desktop.moves.borrow().is_empty());
    }

    #[test]
    fn small_cell_moves_pointer_to_its_center() {
        let (mut session, desktop, mut overlay) = started();
        // 1920x1080 → 640x360 → 213x120 → 71x40
        session.select(1, &desktop, &mut overlay).unwrap();
        session.select(1, &desktop, &mut overlay).unwrap();
        assert_eq!(session.region(), Some(Rect::new(0, 0, 213, 120)));
        let outcome = session.select(9, &desktop, &mut overlay).unwrap();
        // Cell 9 of 213x120: x 142..213 (71 wide), y 80..120 (40 high).
        assert_eq!(outcome, GridOutcome::Moved { x: 177, y: 100 });
        assert_eq!(*desktop.moves.borrow(), vec![(177, 100)]);
        assert_eq!(overlay.last(), Some(&OverlayCall::Clear));
        assert!(!session.is_active());
        assert_eq!(session.depth(), 0);
    }

    #[test]
    fn one_small_dimension_still_recurses() {
        let mut overlay = MockOverlay::default();
        let desktop = MockDesktop::with_targets(0);
        let mut session = GridSession::new(3, 150);
        // Cells will be 100 wide but 600 high.
        session
            .activate(Rect::new(0, 0, 300, 1800), &mut overlay)
            .unwrap();
        let outcome = session.select(1, &desktop, &mut overlay).unwrap();
        assert_eq!(outcome, GridOutcome::Active);
        assert_eq!(session.depth(), 1);
    }

    #[test]
    fn cell_covering_whole_region_resolves() {
        let mut overlay = MockOverlay::default();
        let desktop = MockDesktop::with_targets(0);
        let mut session = GridSession::new(3, 1);
        session
            .activate(Rect::new(0, 0, 2, 2), &mut overlay)
            .unwrap();
        // 2 px split three ways: cell 9 absorbs the whole region.
        let outcome = session.select(9, &desktop, &mut overlay).unwrap();
        assert_eq!(outcome, GridOutcome::Moved { x: 1, y: 1 });
        assert_eq!(*desktop.moves.borrow(), vec![(1, 1)]);
        assert!(!session.is_active());
        assert_eq!(session.depth(), 0);
    }

    #[test]
    fn back_restores_prior_region_and_depth() {
        let (mut session, desktop, mut overlay) = started();
        session.select(3, &desktop, &mut overlay).unwrap();
        assert_eq!(session.depth(), 1);
        assert!(session.back(&mut overlay).unwrap());
        assert_eq!(session.region(), Some(SCREEN));
        assert_eq!(session.depth(), 0);
        assert_eq!(overlay.last(), Some(&OverlayCall::Grid(SCREEN, 3)));
    }

    #[test]
    fn back_after_two_levels_keeps_remaining_history() {
        let (mut session, desktop, mut overlay) = started();
        session.select(5, &desktop, &mut overlay).unwrap();
        let first = session.region().unwrap();
        session.select(5, &desktop, &mut overlay).unwrap();
        assert_eq!(session.depth(), 2);
        session.back(&mut overlay).unwrap();
        assert_eq!(session.region(), Some(first));
        assert_eq!(session.history(), &[SCREEN]);
    }

    #[test]
    fn back_at_top_level_is_noop() {
        let (mut session, _, mut overlay) = started();
        let calls = overlay.calls.len();
        assert!(!session.back(&mut overlay).unwrap());
        assert_eq!(overlay.calls.len(), calls);
        assert_eq!(session.region(), Some(SCREEN));
    }

    #[test]
    fn invalid_cell_numbers_are_ignored() {
        let (mut session, desktop, mut overlay) = started();
        assert_eq!(
            session.select(0, &desktop, &mut overlay).unwrap(),
            GridOutcome::Active
        );
        assert_eq!(
            session.select(10, &desktop, &mut overlay).unwrap(),
            GridOutcome::Active
        );
        assert_eq!(session.region(), Some(SCREEN));
    }

    #[test]
    fn cancel_clears_history() {
        let (mut session, desktop, mut overlay) = started();
        session.select(1, &desktop, &mut overlay).unwrap();
        assert_eq!(
            session.deactivate(&mut overlay).unwrap(),
            GridOutcome::Cancelled
        );
        assert_eq!(session.depth(), 0);
        assert!(!session.is_active());
        assert_eq!(overlay.last(), Some(&OverlayCall::Clear));
    }

    #[test]
    fn cursor_failure_is_reported() {
        let mut overlay = MockOverlay::default();
        let mut desktop = MockDesktop::with_targets(0);
        desktop.fail_move = true;
        let mut session = GridSession::new(3, 10_000);
        session.activate(SCREEN, &mut overlay).unwrap();
        let err = session.select(1, &desktop, &mut overlay);
        assert!(matches!(err, Err(SessionError::Cursor(_))));
        assert!(!session.is_active());
    }

    #[test]
    fn render_failure_ends_session() {
        let mut overlay = MockOverlay::failing();
        let mut session = GridSession::new(3, 150);
        let err = session.activate(SCREEN, &mut overlay);
        assert!(matches!(err, Err(SessionError::Overlay(_))));
        assert!(!session.is_active());
    }
}
