//! Viewer configuration loaded from a TOML file.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! usable configuration:
//!
//! ```toml
//! anim_time_ms = 4000
//! graph_count = 2
//! graph_names = ["RTT", "Throughput"]
//!
//! [zoom.x]
//! min = 10.0
//! max = 90.0
//!
//! [window]
//! width = 1600
//! height = 900
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Shortest reveal animation the viewer accepts, in milliseconds.
pub const MIN_ANIM_TIME_MS: u32 = 50;
/// Longest reveal animation the viewer accepts, in milliseconds.
pub const MAX_ANIM_TIME_MS: u32 = 30_000;
/// Upper bound on stacked graphs.
pub const MAX_GRAPH_COUNT: usize = 16;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Duration of one full reveal sweep.
    pub anim_time_ms: u32,
    /// Number of stacked graphs to create at startup.
    pub graph_count: usize,
    /// Optional titles, applied to graphs in order.
    pub graph_names: Vec<String>,
    /// Start of the visible time window in data units. Zero means unset.
    pub start_time: f64,
    /// End of the visible time window in data units. Zero means unset.
    pub end_time: f64,
    pub show_grid: bool,
    /// Start in perspective (3D) mode.
    pub perspective: bool,
    pub zoom: ZoomConfig,
    pub window: WindowConfig,
    pub controls: ControlsConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            anim_time_ms: 4000,
            graph_count: 1,
            graph_names: Vec::new(),
            start_time: 0.0,
            end_time: 0.0,
            show_grid: true,
            perspective: false,
            zoom: ZoomConfig::default(),
            window: WindowConfig::default(),
            controls: ControlsConfig::default(),
        }
    }
}

/// A `min..max` pair of percentages of an axis span.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PercentRange {
    pub min: f64,
    pub max: f64,
}

impl Default for PercentRange {
    fn default() -> Self {
        Self { min: 0.0, max: 100.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub x: PercentRange,
    pub y: PercentRange,
    pub z: PercentRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "TEACUP Animator".to_string(),
            width: 1280,
            height: 800,
        }
    }
}

/// Camera control speeds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            rotate_speed: 1.0,
            zoom_speed: 1.2,
            pan_speed: 0.8,
        }
    }
}

/// Errors produced while loading a configuration file.
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read.
    Io { path: PathBuf, source: std::io::Error },
    /// The file is not valid TOML or has mistyped fields.
    Parse { path: Option<PathBuf>, message: String },
    /// A field holds a value outside its accepted range.
    Invalid { field: &'static str, reason: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "Failed to read config {}: {}", path.display(), source)
            }
            ConfigError::Parse {
                path: Some(path),
                message,
            } => write!(f, "Failed to parse config {}: {}", path.display(), message),
            ConfigError::Parse { path: None, message } => {
                write!(f, "Failed to parse config: {}", message)
            }
            ConfigError::Invalid { field, reason } => {
                write!(f, "Invalid config value for `{}`: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl ViewerConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: None,
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate the file at `path`.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: Some(path.to_path_buf()),
                message,
            },
            other => other,
        })?;

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `path` when given, otherwise fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !(MIN_ANIM_TIME_MS..=MAX_ANIM_TIME_MS).contains(&self.anim_time_ms) {
            return Err(ConfigError::Invalid {
                field: "anim_time_ms",
                reason: format!(
                    "{} is outside {}..={}",
                    self.anim_time_ms, MIN_ANIM_TIME_MS, MAX_ANIM_TIME_MS
                ),
            });
        }

        if self.graph_count == 0 || self.graph_count > MAX_GRAPH_COUNT {
            return Err(ConfigError::Invalid {
                field: "graph_count",
                reason: format!("{} is outside 1..={}", self.graph_count, MAX_GRAPH_COUNT),
            });
        }

        if self.start_time < 0.0 || self.end_time < 0.0 {
            return Err(ConfigError::Invalid {
                field: "start_time",
                reason: "times must not be negative".to_string(),
            });
        }

        if self.end_time > 0.0 && self.end_time <= self.start_time {
            return Err(ConfigError::Invalid {
                field: "end_time",
                reason: format!(
                    "end {} must be greater than start {}",
                    self.end_time, self.start_time
                ),
            });
        }

        for (field, range) in [
            ("zoom.x", self.zoom.x),
            ("zoom.y", self.zoom.y),
            ("zoom.z", self.zoom.z),
        ] {
            if !(0.0..=100.0).contains(&range.min)
                || !(0.0..=100.0).contains(&range.max)
                || range.min >= range.max
            {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{}..{} is not an increasing range inside 0..=100", range.min, range.max),
                });
            }
        }

        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid {
                field: "window",
                reason: "window size must be non-zero".to_string(),
            });
        }

        Ok(())
    }
}
