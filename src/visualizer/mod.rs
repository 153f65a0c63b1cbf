//! Overlay visualizers.
//!
//! * [`logging`] (the default build) describes the overlay in the log.
//!   The controller renders into a [`ChannelOverlay`], which forwards
//!   [`OverlayEvent`]s to it over an mpsc channel, and it keeps an
//!   [`OverlayState`] as its model of the screen.
//! * `gtk` (feature `overlay-gtk`) is itself the controller's renderer:
//!   it draws labels and grid cells in a GTK4 layer-shell window on the
//!   main thread and turns its key presses back into commands.

pub mod logging;

#[cfg(feature = "overlay-gtk")]
pub mod gtk;

use crate::codes::Code;
use crate::command::{Rect, Target};
use crate::config::OverlayConfig;
use crate::grid;
use crate::traits::{Feedback, OverlayRenderer};
use std::sync::mpsc;

/// A single label as the visualizer needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub code: Code,
    /// Bounds of the labelled target.
    pub target: Rect,
}

/// What the visualizer is asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayEvent {
    /// Replace the screen contents with these labels.
    ShowLabels(Vec<Label>),
    /// Emphasise these codes.  Empty means none.
    Highlight(Vec<Code>),
    /// Replace the screen contents with a numbered grid.  `cells` come from
    /// [`grid::partition`], in cell-number order.
    ShowGrid { region: Rect, cells: Vec<Rect> },
    /// Tell the user something went nowhere.
    Feedback(Feedback),
    /// Hide everything and release the keyboard.
    Clear,
}

//  Channel renderer

/// The visualizer hung up.
#[derive(Debug, thiserror::Error)]
#[error("overlay channel closed")]
pub struct OverlayClosed;

/// An [`OverlayRenderer`] that forwards every call to a visualizer.
#[derive(Debug, Clone)]
pub struct ChannelOverlay {
    tx: mpsc::Sender<OverlayEvent>,
}

impl ChannelOverlay {
    pub fn new(tx: mpsc::Sender<OverlayEvent>) -> Self {
        Self { tx }
    }

    /// Create a renderer together with the receiving end for the
    /// visualizer.
    pub fn channel() -> (Self, mpsc::Receiver<OverlayEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self::new(tx), rx)
    }

    fn send(&self, event: OverlayEvent) -> Result<(), OverlayClosed> {
        self.tx.send(event).map_err(|_| OverlayClosed)
    }
}

impl OverlayRenderer for ChannelOverlay {
    type Error = OverlayClosed;

    fn render_labels(&mut self, labels: &[(Code, Target)]) -> Result<(), OverlayClosed> {
        self.send(OverlayEvent::ShowLabels(
            labels
                .iter()
                .map(|(code, target)| Label {
                    code: code.clone(),
                    target: target.rect,
                })
                .collect(),
        ))
    }

    fn highlight(&mut self, codes: &[Code]) -> Result<(), OverlayClosed> {
        self.send(OverlayEvent::Highlight(codes.to_vec()))
    }

    fn render_grid(&mut self, region: Rect, arity: u32) -> Result<(), OverlayClosed> {
        self.send(OverlayEvent::ShowGrid {
            region,
            cells: grid::partition(region, arity),
        })
    }

    fn feedback(&mut self, feedback: Feedback) -> Result<(), OverlayClosed> {
        self.send(OverlayEvent::Feedback(feedback))
    }

    fn clear(&mut self) -> Result<(), OverlayClosed> {
        self.send(OverlayEvent::Clear)
    }
}

//  Screen model

/// What is currently on screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OverlayState {
    #[default]
    Hidden,
    Labels {
        labels: Vec<Label>,
        highlighted: Vec<Code>,
    },
    Grid {
        region: Rect,
        cells: Vec<Rect>,
    },
}

impl OverlayState {
    pub fn is_visible(&self) -> bool {
        !matches!(self, OverlayState::Hidden)
    }

    /// Apply one event.  Feedback leaves the state alone; a highlight with
    /// no labels on screen is dropped.
    pub fn apply(&mut self, event: OverlayEvent) {
        match event {
            OverlayEvent::ShowLabels(labels) => {
                *self = OverlayState::Labels {
                    labels,
                    highlighted: Vec::new(),
                };
            }
            OverlayEvent::Highlight(codes) => {
                if let OverlayState::Labels { highlighted, .. } = self {
                    *highlighted = codes;
                }
            }
            OverlayEvent::ShowGrid { region, cells } => {
                *self = OverlayState::Grid { region, cells };
            }
            OverlayEvent::Feedback(_) => {}
            OverlayEvent::Clear => *self = OverlayState::Hidden,
        }
    }
}

/// Where to draw the label for `target` on `screen`.
///
/// Labels sit `gap` pixels to the left of their target, flip to the right
/// when that would leave the screen, and never start above its top edge.
pub fn label_rect(target: Rect, screen: Rect, config: &OverlayConfig) -> Rect {
    let width = config.label_width;
    let height = config.label_height;
    let gap = config.label_gap as i32;

    let mut x = target.x - width as i32 - gap;
    if x < screen.x {
        x = target.right() + gap;
    }
    let y = target.y.max(screen.y);
    Rect::new(x, y, width, height)
}
