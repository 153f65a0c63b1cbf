//! Headless visualizer: describes the overlay in the log.
//!
//! Used when hintgrd is built without `overlay-gtk`, or for debugging a
//! session without a compositor.  Keys then arrive over the command
//! socket.

use super::{OverlayEvent, OverlayState};
use crate::traits::Feedback;
use log::{debug, info};
use std::sync::mpsc;

#[derive(Debug, Default)]
pub struct LogVisualizer {
    state: OverlayState,
}

impl LogVisualizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    /// Handle everything queued on `rx` without blocking.
    pub fn drain(&mut self, rx: &mpsc::Receiver<OverlayEvent>) {
        while let Ok(event) = rx.try_recv() {
            self.handle(event);
        }
    }

    pub fn handle(&mut self, event: OverlayEvent) {
        match &event {
            OverlayEvent::ShowLabels(labels) => {
                info!("overlay: {} label(s)", labels.len());
                for label in labels {
                    debug!("  {} -> {}", label.code, label.target);
                }
            }
            OverlayEvent::Highlight(codes) => {
                let codes: Vec<&str> = codes.iter().map(|c| c.as_str()).collect();
                info!("overlay: candidates [{}]", codes.join(" "));
            }
            OverlayEvent::ShowGrid { region, cells } => {
                info!("overlay: {} cells over {}", cells.len(), region);
            }
            OverlayEvent::Feedback(Feedback::NoTargets) => info!("overlay: nothing to label"),
            OverlayEvent::Feedback(Feedback::NoMatch) => info!("overlay: no match"),
            OverlayEvent::Clear => {
                if self.state.is_visible() {
                    info!("overlay: hidden");
                }
            }
        }
        self.state.apply(event);
    }
}
