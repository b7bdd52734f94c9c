//! User configuration loaded from `config.toml`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Smallest and largest Simpson interval counts accepted from configuration.
const MIN_INTERVALS: usize = 2;
const MAX_INTERVALS: usize = 1_000_000;

/// How trigonometric arguments and inverse-trig results are interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleMode {
    #[default]
    Deg,
    Rad,
}

impl AngleMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            Self::Deg => Self::Rad,
            Self::Rad => Self::Deg,
        }
    }
}

impl fmt::Display for AngleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deg => write!(f, "DEG"),
            Self::Rad => write!(f, "RAD"),
        }
    }
}

impl FromStr for AngleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "deg" | "degrees" => Ok(Self::Deg),
            "rad" | "radians" => Ok(Self::Rad),
            other => Err(format!("unknown angle mode '{}'", other)),
        }
    }
}

/// Calculator settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Angle mode used when evaluating trig functions.
    pub angle_mode: AngleMode,
    /// Number of Simpson intervals for numerical integration.
    pub integration_intervals: usize,
    /// Maximum number of history entries kept.
    pub history_limit: usize,
    /// Whether evaluated expressions are recorded in the history file.
    pub record_history: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            angle_mode: AngleMode::Deg,
            integration_intervals: 1000,
            history_limit: 50,
            record_history: true,
        }
    }
}

impl Config {
    /// Default location of the configuration file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("calcpad").join("config.toml"))
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<Config>(text).map(Self::sanitized)
    }

    /// Load the configuration from an explicit path.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Load the configuration from the default location.
    ///
    /// A missing file yields the defaults. A file that cannot be read or parsed
    /// is logged and also yields the defaults.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{:#}; using defaults", e);
                Self::default()
            }
        }
    }

    /// Clamp numeric settings into their supported ranges.
    fn sanitized(mut self) -> Self {
        let mut intervals = self.integration_intervals.clamp(MIN_INTERVALS, MAX_INTERVALS);
        if intervals % 2 != 0 {
            intervals += 1;
        }
        self.integration_intervals = intervals;
        self
    }
}
