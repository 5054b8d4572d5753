//! Configuration for the observing utilities.
//!
//! Read from `$OBSERVING_CONFIG` when set, otherwise
//! `~/.observing/config.toml`. Every section and every key is optional.
//!
//! ```toml
//! [poll]
//! timeout_seconds = 30.0
//! poll_interval_ms = 100
//!
//! [log]
//! use_colors = true
//! filter = "debug"
//!
//! [repository]
//! root = "${OBSERVING_DATA}/repo"
//!
//! [instrument]
//! name = "LATISS"
//! detector = 0
//! pixel_scale = 0.1
//! ```

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use observing_types::Instrument;
use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "OBSERVING_CONFIG";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_LOG_FILTER: &str = "debug";

const fn default_true() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObservingConfig {
    pub poll: Option<PollConfig>,
    pub log: Option<LogConfig>,
    pub repository: Option<RepositoryConfig>,
    pub instrument: Option<InstrumentConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Image polling.
#[derive(Debug, Default, Deserialize)]
pub struct PollConfig {
    /// Total time to wait for an image. Default: 30.
    pub timeout_seconds: Option<f64>,
    /// Wait between attempts. Default: 100.
    pub poll_interval_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_true")]
    pub use_colors: bool,
    /// `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            use_colors: true,
            filter: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RepositoryConfig {
    /// Root of the image repository. `${VAR}` references are expanded.
    pub root: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InstrumentConfig {
    pub name: Option<String>,
    pub detector: Option<u32>,
    /// Arcseconds per pixel; overrides the instrument's plate scale.
    pub pixel_scale: Option<f64>,
}

/// Validated polling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl ObservingConfig {
    /// Load the config file, if there is one.
    ///
    /// A missing file is not an error: callers fall back to defaults.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(None);
        };
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file");
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| {
            tracing::warn!("Failed to read config at {}: {source}", path.display());
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;

        toml::from_str(&content).map_err(|source| {
            tracing::warn!("Failed to parse config at {}: {source}", path.display());
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    pub fn poll_settings(&self) -> Result<PollSettings, ConfigError> {
        let mut settings = PollSettings::default();
        let Some(poll) = &self.poll else {
            return Ok(settings);
        };

        if let Some(seconds) = poll.timeout_seconds {
            settings.timeout = Duration::try_from_secs_f64(seconds).map_err(|_| {
                ConfigError::Invalid {
                    field: "poll.timeout_seconds",
                    reason: format!("{seconds} is not a non-negative number of seconds"),
                }
            })?;
        }

        if let Some(ms) = poll.poll_interval_ms {
            if ms == 0 {
                return Err(ConfigError::Invalid {
                    field: "poll.poll_interval_ms",
                    reason: "must be greater than zero".to_string(),
                });
            }
            settings.poll_interval = Duration::from_millis(ms);
        }

        Ok(settings)
    }

    #[must_use]
    pub fn use_colors(&self) -> bool {
        self.log.as_ref().is_none_or(|log| log.use_colors)
    }

    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log
            .as_ref()
            .and_then(|log| log.filter.as_deref())
            .unwrap_or(DEFAULT_LOG_FILTER)
    }

    #[must_use]
    pub fn repository_root(&self) -> Option<PathBuf> {
        self.repository
            .as_ref()
            .and_then(|repo| repo.root.as_deref())
            .map(|root| PathBuf::from(expand_env_vars(root)))
    }

    pub fn instrument(&self) -> Result<Instrument, ConfigError> {
        match self.instrument.as_ref().and_then(|cfg| cfg.name.as_deref()) {
            Some(name) => name.parse().map_err(|err| ConfigError::Invalid {
                field: "instrument.name",
                reason: format!("{err}"),
            }),
            None => Ok(Instrument::default()),
        }
    }

    pub fn detector(&self) -> Result<u32, ConfigError> {
        match self.instrument.as_ref().and_then(|cfg| cfg.detector) {
            Some(detector) => Ok(detector),
            None => Ok(self.instrument()?.default_detector()),
        }
    }

    pub fn pixel_scale(&self) -> Result<f64, ConfigError> {
        match self.instrument.as_ref().and_then(|cfg| cfg.pixel_scale) {
            Some(scale) if scale.is_finite() && scale > 0.0 => Ok(scale),
            Some(scale) => Err(ConfigError::Invalid {
                field: "instrument.pixel_scale",
                reason: format!("{scale} is not a positive number"),
            }),
            None => Ok(self.instrument()?.pixel_scale()),
        }
    }
}

/// Expand `${VAR}` references; unset variables expand to nothing.
///
/// An unterminated `${` is kept verbatim, as is the empty reference `${}`.
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(0) => {
                out.push_str("${}");
                rest = &after[1..];
            }
            Some(end) => {
                out.push_str(&env::var(&after[..end]).unwrap_or_default());
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    if let Some(explicit) = env::var_os(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(explicit));
    }
    dirs::home_dir().map(|home| home.join(".observing").join("config.toml"))
}
