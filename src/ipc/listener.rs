//! Unix-socket [`CommandSource`] implementation.
//!
//! # Wire format
//!
//! One JSON-encoded [`Command`] per line:
//!
//! ```json
//! {"Key":"j"}
//! {"Cell":5}
//! "Back"
//! "Fallback"
//! "Cancel"
//! ```
//!
//! A bare key name is accepted too (`escape`, `backspace`, `space`, or a
//! single character), so `echo j | socat - UNIX-CONNECT:…` works.

use crate::command::Command;
use crate::traits::CommandSource;
use log::{debug, info, warn};
use std::io::{BufRead, BufReader};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

/// Socket file name under `$XDG_RUNTIME_DIR`.
pub const SOCKET_NAME: &str = "hintgrd.sock";

/// Listens on a Unix stream socket for commands.
///
/// Connections are served one after another; each may send any number of
/// lines.
pub struct UnixSocketListener {
    path: PathBuf,
}

/// Errors produced by the Unix socket listener.
#[derive(Debug, thiserror::Error)]
pub enum UnixSocketError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl UnixSocketListener {
    /// The socket is created by [`run`](CommandSource::run), replacing any
    /// stale file at `path`, and removed again when `run` returns.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// `$XDG_RUNTIME_DIR/hintgrd.sock`, or under `/tmp` when unset.
    pub fn default_path() -> PathBuf {
        let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
        PathBuf::from(runtime).join(SOCKET_NAME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Forward every command from one connection.  Returns `false` once
    /// the sink is gone.
    fn serve(&self, stream: UnixStream, sink: &mpsc::Sender<Command>) -> bool {
        for line in BufReader::new(stream).lines() {
            let text = match line {
                Ok(text) => text,
                Err(e) => {
                    warn!("read error: {}", e);
                    break;
                }
            };
            if text.trim().is_empty() {
                continue;
            }
            match parse_line(&text) {
                Ok(cmd) => {
                    debug!("received {:?}", cmd);
                    if sink.send(cmd).is_err() {
                        return false;
                    }
                }
                Err(e) => warn!("ignoring {:?}: {}", text, e),
            }
        }
        true
    }
}

/// Parse one line as JSON, falling back to a bare key name.
pub fn parse_line(line: &str) -> Result<Command, UnixSocketError> {
    let trimmed = line.trim();
    match serde_json::from_str::<Command>(trimmed) {
        Ok(cmd) => Ok(cmd),
        Err(e) => Command::from_key_name(trimmed).ok_or(UnixSocketError::Json(e)),
    }
}

impl CommandSource for UnixSocketListener {
    type Error = UnixSocketError;

    /// Blocks until the sink is dropped.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error> {
        let _ = std::fs::remove_file(&self.path);
        let listener = UnixListener::bind(&self.path)?;
        info!("listening on {}", self.path.display());

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    if !self.serve(stream, &sink) {
                        info!("command sink closed, shutting down");
                        break;
                    }
                }
                Err(e) => warn!("accept error: {}", e),
            }
        }

        let _ = std::fs::remove_file(&self.path);
        Ok(())
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    static TEST_ID: AtomicU32 = AtomicU32::new(0);

    fn tmp_socket_path() -> PathBuf {
        let id = TEST_ID.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!("hintgrd-test-{}-{}.sock", std::process::id(), id))
    }

    /// Start a listener, send `lines` over one connection, and collect
    /// what arrives.
    fn send_lines(lines: &[&str]) -> Vec<Command> {
        let path = tmp_socket_path();
        let listener_path = path.clone();
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || {
            let mut listener = UnixSocketListener::new(&listener_path);
            let _ = listener.run(tx);
        });
        std::thread::sleep(Duration::from_millis(150));

        {
            let mut stream = UnixStream::connect(&path).expect("connect");
            for line in lines {
                writeln!(stream, "{}", line).unwrap();
            }
            stream.shutdown(std::net::Shutdown::Write).unwrap();
        }

        std::thread::sleep(Duration::from_millis(150));
        let _ = std::fs::remove_file(&path);
        rx.try_iter().collect()
    }

    #[test]
    fn round_trip_commands_over_socket() {
        let cmds = send_lines(&[r#"{"Key":"j"}"#, r#"{"Cell":7}"#, r#""Back""#, "", r#""Cancel""#]);
        assert_eq!(
            cmds,
            vec![
                Command::Key('j'),
                Command::Cell(7),
                Command::Back,
                Command::Cancel
            ]
        );
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let cmds = send_lines(&["not json at all", r#"{"Cell":"x"}"#, r#""Fallback""#]);
        assert_eq!(cmds, vec![Command::Fallback]);
    }

    #[test]
    fn bare_key_names_are_accepted() {
        assert_eq!(parse_line("k\n").unwrap(), Command::Key('k'));
        assert_eq!(parse_line("escape").unwrap(), Command::Cancel);
        assert_eq!(parse_line("backspace").unwrap(), Command::Back);
        assert_eq!(parse_line(r#"{"Key":"5"}"#).unwrap(), Command::Key('5'));
        assert!(parse_line("shift").is_err());
    }
}
