//! Commands and types used throughout hintgrd.
//!
//! This module defines the vocabulary that all components share:
//! [`Command`] describes every user action a session can consume,
//! [`Event`] is what travels over the daemon's channel, and [`Rect`] /
//! [`Target`] describe the on-screen surfaces being selected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An axis-aligned rectangle in absolute screen pixels.
///
/// Used both for detected targets and for the regions of the grid
/// fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Center point, rounded down.
    pub fn center(&self) -> (i32, i32) {
        (
            self.x + (self.width / 2) as i32,
            self.y + (self.height / 2) as i32,
        )
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, (right - x) as u32, (bottom - y) as u32)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// How important a detected surface is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    /// Buttons, links, menu items, windows: high-priority interactive
    /// controls.
    Control,
    /// Text inputs, list and tree items: medium priority.
    ///
    /// Only detectors that see inside windows produce this; the Hyprland
    /// backend works at window granularity and reports every window as
    /// [`Control`](TargetKind::Control).
    Input,
}

/// Opaque handle that identifies a target to the detector that produced it.
///
/// hintgrd never interprets it; it is only handed back to the
/// [`ClickDispatcher`](crate::traits::ClickDispatcher).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetHandle(pub String);

/// One selectable on-screen surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub rect: Rect,
    pub kind: TargetKind,
    /// Human-readable name, possibly empty.
    pub name: String,
    pub handle: TargetHandle,
}

/// Every user action an active session can consume.
///
/// Commands are produced by [`CommandSource`](crate::traits::CommandSource)
/// implementations (the Unix socket, the GTK overlay's key handler) and
/// consumed by the [`Controller`](crate::controller::Controller).
///
/// On the wire these are externally tagged JSON values:
///
/// ```json
/// {"Key":"a"}
/// {"Cell":5}
/// "Back"
/// "Cancel"
/// "Fallback"
/// "Activate"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// A typed character.  Letters feed the hint matcher, digits select a
    /// grid cell.
    Key(char),

    /// Select grid cell `n` (1-based, row-major).  Needed for grids with
    /// more than nine cells.
    Cell(u32),

    /// Return to the previous grid level.
    Back,

    /// Abort the active session.
    Cancel,

    /// Leave hint mode for the grid fallback.
    Fallback,

    /// Enter hint mode as a toggle-on edge would.  Lets a compositor key
    /// binding drive hintgrd without the CapsLock LED.
    Activate,
}

impl Command {
    /// Map a key name as reported by a toolkit (`"Escape"`, `"BackSpace"`,
    /// `"space"`, `"a"`, `"5"`, …) to a command.
    ///
    /// Names are matched case-insensitively for the special keys; a single
    /// character becomes [`Command::Key`].
    pub fn from_key_name(name: &str) -> Option<Command> {
        let normalized: String = name
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(|c| c.to_lowercase())
            .collect();
        match normalized.as_str() {
            "escape" | "esc" => return Some(Command::Cancel),
            "backspace" => return Some(Command::Back),
            "space" => return Some(Command::Fallback),
            _ => {}
        }
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(' '), None) => Some(Command::Fallback),
            (Some(c), None) => Some(Command::Key(c)),
            _ => None,
        }
    }
}

/// A rising or falling edge of the toggle signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleEdge {
    On,
    Off,
}

impl fmt::Display for ToggleEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToggleEdge::On => write!(f, "toggle-on"),
            ToggleEdge::Off => write!(f, "toggle-off"),
        }
    }
}

/// Everything that reaches the controller's event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Toggle(ToggleEdge),
    Command(Command),
}

impl From<ToggleEdge> for Event {
    fn from(edge: ToggleEdge) -> Self {
        Event::Toggle(edge)
    }
}

impl From<Command> for Event {
    fn from(cmd: Command) -> Self {
        Event::Command(cmd)
    }
}
