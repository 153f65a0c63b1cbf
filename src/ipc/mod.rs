//! Command transport for clients that do not go through the overlay.
//!
//! Key-bind helpers and scripts connect to a Unix socket and send the same
//! [`Command`](crate::command::Command)s the overlay's key handler
//! produces.  This is also how keys reach hintgrd when it runs without the
//! GTK overlay.

pub mod listener;
