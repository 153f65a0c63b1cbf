//! Toggle-signal edge detection.
//!
//! [`ToggleMonitor`] polls a [`ToggleSignal`] on a dedicated thread and
//! sends one [`ToggleEdge`] per observed change.  Changes that happen and
//! revert within one poll interval are never seen; with the default 15 ms
//! interval that is well below human key-repeat speed.
//!
//! [`LedToggle`] is the Linux signal source: the CapsLock LED exposed by
//! the kernel under `/sys/class/leds`.

use crate::command::ToggleEdge;
use crate::traits::ToggleSignal;
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Default polling interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(15);

/// Remembers the last observed state of a toggle signal.
#[derive(Debug, Clone)]
pub struct ToggleMonitor {
    previous: bool,
}

impl ToggleMonitor {
    /// Start from a known state, usually the signal's value at startup so
    /// an already-lit CapsLock does not fire an edge.
    pub fn new(initial: bool) -> Self {
        Self { previous: initial }
    }

    pub fn state(&self) -> bool {
        self.previous
    }

    /// Record `current` and report the edge it forms with the previous
    /// observation, if any.
    pub fn observe(&mut self, current: bool) -> Option<ToggleEdge> {
        if current == self.previous {
            return None;
        }
        let edge = if current {
            ToggleEdge::On
        } else {
            ToggleEdge::Off
        };
        self.previous = current;
        Some(edge)
    }

    /// Poll `signal` every `interval` on a new thread, sending edges into
    /// `sink`.
    ///
    /// The initial state is read on the calling thread before the poller
    /// starts, so a key already held down does not fire `On`.  Read errors
    /// are logged and polling continues.  The thread exits when the handle
    /// is stopped or the receiving end of `sink` is dropped.
    pub fn spawn<S, E>(
        mut signal: S,
        interval: Duration,
        sink: mpsc::Sender<E>,
    ) -> ToggleHandle
    where
        S: ToggleSignal + Send + 'static,
        E: From<ToggleEdge> + Send + 'static,
    {
        let initial = match signal.read() {
            Ok(state) => state,
            Err(e) => {
                warn!("toggle read failed at startup ({}), assuming off", e);
                false
            }
        };
        info!("toggle monitoring started (initially {})", if initial { "on" } else { "off" });

        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();
        let monitor = Self::new(initial);
        let thread = thread::spawn(move || poll_loop(monitor, signal, interval, sink, flag));
        ToggleHandle {
            running,
            thread: Some(thread),
        }
    }
}

fn poll_loop<S, E>(
    mut monitor: ToggleMonitor,
    mut signal: S,
    interval: Duration,
    sink: mpsc::Sender<E>,
    running: Arc<AtomicBool>,
) where
    S: ToggleSignal,
    E: From<ToggleEdge>,
{
    while running.load(Ordering::Relaxed) {
        match signal.read() {
            Ok(state) => {
                if let Some(edge) = monitor.observe(state) {
                    debug!("{}", edge);
                    if sink.send(edge.into()).is_err() {
                        info!("toggle sink closed, stopping");
                        break;
                    }
                }
            }
            Err(e) => error!("toggle read failed: {}", e),
        }
        thread::sleep(interval);
    }
    running.store(false, Ordering::Relaxed);
    info!("toggle monitoring stopped");
}

/// Owns the polling thread started by [`ToggleMonitor::spawn`].
///
/// Dropping the handle stops the thread too.
#[derive(Debug)]
pub struct ToggleHandle {
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl ToggleHandle {
    /// Stop polling and wait for the thread to finish.
    pub fn stop(mut self) {
        self.shutdown();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    fn shutdown(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("toggle thread panicked");
            }
        }
    }
}

impl Drop for ToggleHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

//  CapsLock LED

/// Errors from reading the LED state.
#[derive(Debug, thiserror::Error)]
pub enum LedToggleError {
    #[error("no CapsLock LED found under {0}")]
    NotFound(String),
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unexpected brightness value {0:?}")]
    Parse(String),
}

/// Directory the kernel exposes LED class devices in.
pub const LEDS_DIR: &str = "/sys/class/leds";

/// A [`ToggleSignal`] backed by the CapsLock LED's `brightness` file.
///
/// The LED mirrors the lock state of whichever keyboard toggled it, so this
/// works without grabbing any input device.
#[derive(Debug, Clone)]
pub struct LedToggle {
    brightness: PathBuf,
}

impl LedToggle {
    /// Use the LED directory `led` (e.g. `input3::capslock`) under
    /// [`LEDS_DIR`].
    pub fn named(led: &str) -> Self {
        Self::at(Path::new(LEDS_DIR).join(led))
    }

    /// Use the LED class device at `dir`.
    pub fn at(dir: impl AsRef<Path>) -> Self {
        Self {
            brightness: dir.as_ref().join("brightness"),
        }
    }

    /// Find the first `*::capslock` LED under `leds_dir`, in name order.
    pub fn discover(leds_dir: impl AsRef<Path>) -> Result<Self, LedToggleError> {
        let leds_dir = leds_dir.as_ref();
        let not_found = || LedToggleError::NotFound(leds_dir.display().to_string());
        let entries = std::fs::read_dir(leds_dir).map_err(|_| not_found())?;

        let mut candidates: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.ends_with("::capslock"))
                    .unwrap_or(false)
            })
            .collect();
        candidates.sort();

        let dir = candidates.into_iter().next().ok_or_else(not_found)?;
        info!("using CapsLock LED {}", dir.display());
        Ok(Self::at(dir))
    }

    pub fn brightness_path(&self) -> &Path {
        &self.brightness
    }
}

impl ToggleSignal for LedToggle {
    type Error = LedToggleError;

    fn read(&mut self) -> Result<bool, LedToggleError> {
        let raw = std::fs::read_to_string(&self.brightness).map_err(|source| LedToggleError::Read {
            path: self.brightness.display().to_string(),
            source,
        })?;
        let value: u32 = raw
            .trim()
            .parse()
            .map_err(|_| LedToggleError::Parse(raw.trim().to_string()))?;
        Ok(value > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Event;
    use std::sync::atomic::AtomicU32;
    use std::sync::Mutex;

    #[test]
    fn no_edge_without_change() {
        let mut m = ToggleMonitor::new(false);
        assert_eq!(m.observe(false), None);
        assert_eq!(m.observe(false), None);
    }

    #[test]
    fn rising_and_falling_edges_fire_once_each() {
        let mut m = ToggleMonitor::new(false);
        assert_eq!(m.observe(true), Some(ToggleEdge::On));
        assert_eq!(m.observe(true), None);
        assert!(m.state());
        assert_eq!(m.observe(false), Some(ToggleEdge::Off));
        assert_eq!(m.observe(false), None);
    }

    #[test]
    fn initially_on_only_fires_on_release() {
        let mut m = ToggleMonitor::new(true);
        assert_eq!(m.observe(true), None);
        assert_eq!(m.observe(false), Some(ToggleEdge::Off));
    }

    #[derive(Debug, thiserror::Error)]
    #[error("scripted signal exhausted")]
    struct Exhausted;

    /// Replays states, then keeps returning the last one.
    struct Scripted(Arc<Mutex<Vec<bool>>>);

    impl ToggleSignal for Scripted {
        type Error = Exhausted;

        fn read(&mut self) -> Result<bool, Exhausted> {
            let mut states = self.0.lock().map_err(|_| Exhausted)?;
            match states.len() {
                0 => Err(Exhausted),
                1 => Ok(states[0]),
                _ => Ok(states.remove(0)),
            }
        }
    }

    #[test]
    fn spawned_monitor_sends_edges_then_stops() {
        let states = Arc::new(Mutex::new(vec![false, false, true, true, false]));
        let (tx, rx) = mpsc::channel::<Event>();
        let handle = ToggleMonitor::spawn(Scripted(states), Duration::from_millis(1), tx);
        std::thread::sleep(Duration::from_millis(100));
        assert!(handle.is_running());
        handle.stop();

        let events: Vec<Event> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![Event::Toggle(ToggleEdge::On), Event::Toggle(ToggleEdge::Off)]
        );
    }

    #[test]
    fn initial_state_is_read_before_spawn_returns() {
        // Held from the start, then released: only the release is an edge.
        let states = Arc::new(Mutex::new(vec![true, true]));
        let (tx, rx) = mpsc::channel::<Event>();
        let handle = ToggleMonitor::spawn(Scripted(states.clone()), Duration::from_millis(1), tx);
        assert_eq!(*states.lock().unwrap(), vec![true]);
        *states.lock().unwrap() = vec![false];
        std::thread::sleep(Duration::from_millis(100));
        handle.stop();

        let events: Vec<Event> = rx.try_iter().collect();
        assert_eq!(events, vec![Event::Toggle(ToggleEdge::Off)]);
    }

    #[test]
    fn closed_sink_clears_running_flag() {
        let states = Arc::new(Mutex::new(vec![false]));
        let (tx, rx) = mpsc::channel::<Event>();
        let handle = ToggleMonitor::spawn(Scripted(states.clone()), Duration::from_millis(1), tx);
        drop(rx);
        *states.lock().unwrap() = vec![true];
        std::thread::sleep(Duration::from_millis(100));
        assert!(!handle.is_running());
        handle.stop();
    }

    static TEST_ID: AtomicU32 = AtomicU32::new(0);

    fn tmp_leds_dir() -> PathBuf {
        let id = TEST_ID.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!("hintgrd-leds-{}-{}", std::process::id(), id));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn fake_led(leds: &Path, name: &str, value: &str) {
        let dir = leds.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("brightness"), value).unwrap();
    }

    #[test]
    fn led_discovery_and_reading() {
        let leds = tmp_leds_dir();
        fake_led(&leds, "input7::numlock", "1\n");
        fake_led(&leds, "input7::capslock", "0\n");
        fake_led(&leds, "input9::capslock", "1\n");

        let mut led = LedToggle::discover(&leds).unwrap();
        assert!(led.brightness_path().ends_with("input7::capslock/brightness"));
        assert!(!led.read().unwrap());

        std::fs::write(leds.join("input7::capslock/brightness"), "1\n").unwrap();
        assert!(led.read().unwrap());

        let _ = std::fs::remove_dir_all(&leds);
    }

    #[test]
    fn missing_led_is_reported() {
        let leds = tmp_leds_dir();
        fake_led(&leds, "input7::scrolllock", "0");
        assert!(matches!(
            LedToggle::discover(&leds),
            Err(LedToggleError::NotFound(_))
        ));
        let _ = std::fs::remove_dir_all(&leds);
    }

    #[test]
    fn garbage_brightness_is_a_parse_error() {
        let leds = tmp_leds_dir();
        fake_led(&leds, "kbd::capslock", "bright");
        let mut led = LedToggle::at(leds.join("kbd::capslock"));
        assert!(matches!(led.read(), Err(LedToggleError::Parse(_))));
        let _ = std::fs::remove_dir_all(&leds);
    }
}
