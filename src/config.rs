//! Application configuration.
//!
//! The configuration is loaded from `$XDG_CONFIG_HOME/hintgrd/config.json`.
//! Every section is optional: a minimal `{}` file is valid and all
//! sections fall back to their compiled-in defaults.
//!
//! # Example
//!
//! ```json
//! {
//!   "hints": { "alphabet": "asdfghjkl", "left_hand": "asdf", "right_hand": "jkl" },
//!   "grid": { "arity": 3, "min_cell_size": 150 },
//!   "toggle": { "poll_interval_ms": 15, "led": "input3::capslock" },
//!   "detector": { "timeout_ms": 500, "include_floating": true },
//!   "overlay": { "label_width": 35, "label_height": 26 }
//! }
//! ```

use crate::codes::{Alphabet, AlphabetError, DEFAULT_LEFT_HAND, DEFAULT_RIGHT_HAND, DEFAULT_SYMBOLS};
use crate::grid::DEFAULT_ARITY;
use crate::session::grid::DEFAULT_MIN_CELL_SIZE;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Hint code alphabet.
    #[serde(default)]
    pub hints: HintConfig,

    /// Grid fallback settings.
    #[serde(default)]
    pub grid: GridConfig,

    /// Toggle signal polling.
    #[serde(default)]
    pub toggle: ToggleConfig,

    /// Element detection.
    #[serde(default)]
    pub detector: DetectorConfig,

    /// Overlay label geometry.
    #[serde(default)]
    pub overlay: OverlayConfig,
}

/// Symbols hint codes are made of.
///
/// `left_hand` and `right_hand` decide which two-symbol codes count as
/// hand-alternating; those are handed out first.  Symbols in neither set
/// are still used, just never preferred.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HintConfig {
    pub alphabet: String,
    pub left_hand: String,
    pub right_hand: String,
}

impl Default for HintConfig {
    fn default() -> Self {
        Self {
            alphabet: DEFAULT_SYMBOLS.into(),
            left_hand: DEFAULT_LEFT_HAND.into(),
            right_hand: DEFAULT_RIGHT_HAND.into(),
        }
    }
}

impl HintConfig {
    /// Build the validated [`Alphabet`].
    pub fn alphabet(&self) -> Result<Alphabet, AlphabetError> {
        Alphabet::new(&self.alphabet, &self.left_hand, &self.right_hand)
    }
}

/// Grid fallback settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Cells per side (2–9).  Default: `3`.
    pub arity: u32,
    /// A cell narrower **and** shorter than this many pixels places the
    /// pointer instead of opening another level.  Default: `150`.
    pub min_cell_size: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            arity: DEFAULT_ARITY,
            min_cell_size: DEFAULT_MIN_CELL_SIZE,
        }
    }
}

/// Toggle signal polling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToggleConfig {
    /// Poll interval in milliseconds.  Default: `15`.
    pub poll_interval_ms: u64,
    /// LED directory name under `/sys/class/leds`.  `None` picks the first
    /// `*::capslock` LED.
    pub led: Option<String>,
}

impl Default for ToggleConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 15,
            led: None,
        }
    }
}

impl ToggleConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Element detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Upper bound on one detection round trip (ms).  Default: `500`.
    pub timeout_ms: u64,
    /// Label floating windows as well as tiled ones.  Default: `true`.
    pub include_floating: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 500,
            include_floating: true,
        }
    }
}

impl DetectorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Overlay label geometry, in pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub label_width: u32,
    pub label_height: u32,
    /// Gap between a label and the edge of its target.
    pub label_gap: u32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            label_width: 35,
            label_height: 26,
            label_gap: 5,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.hints
            .alphabet()
            .map_err(|e| ConfigError(format!("hints: {}", e)))?;
        if !(2..=9).contains(&self.grid.arity) {
            return Err(ConfigError(format!(
                "grid: arity must be between 2 and 9, got {}",
                self.grid.arity
            )));
        }
        if self.grid.min_cell_size == 0 {
            return Err(ConfigError("grid: min_cell_size must be positive".into()));
        }
        if self.grid.min_cell_size < self.grid.arity {
            return Err(ConfigError(format!(
                "grid: min_cell_size ({}) must be at least arity ({})",
                self.grid.min_cell_size, self.grid.arity
            )));
        }
        if self.toggle.poll_interval_ms == 0 {
            return Err(ConfigError("toggle: poll_interval_ms must be positive".into()));
        }
        Ok(())
    }
}

/// Error from loading or validating a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
