//! **hintgrd** — keyboard-driven pointer control.
//!
//! A toggle signal (the CapsLock LED) puts hintgrd into *hint mode*: every
//! clickable surface on screen gets a short home-row code, and typing a
//! code activates that surface.  When there is nothing suitable to click,
//! the *grid fallback* splits the screen into numbered cells that narrow
//! down recursively until the pointer can be placed.
//!
//! # Architecture
//!
//! The engine ([`codes`], [`matcher`], [`grid`], [`mode`], [`session`],
//! [`toggle`]) knows nothing about any desktop.  Its collaborators are the
//! traits in [`traits`]:
//!
//! * [`traits::ElementDetector`], [`traits::ClickDispatcher`] and
//!   [`traits::CursorMover`], implemented for Hyprland in [`hyprland`].
//! * [`traits::OverlayRenderer`], implemented by
//!   [`visualizer::ChannelOverlay`] for the log visualizer and by the GTK
//!   overlay window when built with `overlay-gtk`.
//! * [`traits::ToggleSignal`], implemented by [`toggle::LedToggle`].
//! * [`traits::CommandSource`], implemented by the Unix-socket listener
//!   in [`ipc`].
//!
//! [`controller::Controller`] ties them together on the main thread.

pub mod codes;
pub mod command;
pub mod config;
pub mod controller;
pub mod grid;
pub mod hyprland;
pub mod ipc;
pub mod matcher;
pub mod mode;
pub mod session;
pub mod toggle;
pub mod traits;
pub mod visualizer;
