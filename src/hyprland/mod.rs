//! Hyprland-specific implementations.
//!
//! [`HyprlandDesktop`] provides the detector, click dispatcher, and cursor
//! mover through Hyprland's IPC socket.  Nothing outside this module
//! should reference Hyprland directly.

pub mod desktop;

pub use desktop::{HyprlandDesktop, HyprlandError};
