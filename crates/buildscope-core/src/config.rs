//! Configuration loading and typed config structures for the viewer.
//!
//! The configuration lives in `buildscope.yaml` (or the file named by
//! `BUILDSCOPE_CONFIG`). Every field has a default, so an empty or missing
//! file yields a working viewer that serves the producer endpoint locally
//! and tails it.
//!
//! Environment variables override the file:
//!
//! | Variable | Field |
//! |---|---|
//! | `BUILDSCOPE_FEED_URL` | `feed.url` |
//! | `BUILDSCOPE_LOG_FILE` | `feed.log_file` |
//! | `BUILDSCOPE_OBSERVER_PORT` | `observer.port` |
//! | `BUILDSCOPE_DETAILS_DIR` | `producer.respire_details_dir` |

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "BUILDSCOPE_CONFIG";

/// Configuration file used when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "buildscope.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is unusable.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level viewer configuration, mirroring `buildscope.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ViewerConfig {
    /// Where events come from.
    #[serde(default)]
    pub feed: FeedConfig,

    /// Frame pacing.
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub observer: ObserverConfig,

    /// Settings of the `/log_stream` producer queue.
    #[serde(default)]
    pub producer: ProducerConfig,
}

impl ViewerConfig {
    /// Load configuration from a YAML file, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Like [`from_file`](Self::from_file), but a missing file yields the
    /// defaults (still subject to environment overrides).
    ///
    /// # Errors
    ///
    /// Same as [`from_file`](Self::from_file), except for a missing file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::from_file(path);
        }
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// The configuration file path: `BUILDSCOPE_CONFIG`, or the default.
    pub fn path_from_env() -> PathBuf {
        std::env::var(CONFIG_PATH_ENV)
            .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Override fields from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if an override or the resulting
    /// configuration is unusable.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Override fields from `lookup`, which maps variable names to values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if an override or the resulting
    /// configuration is unusable.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("BUILDSCOPE_FEED_URL") {
            self.feed.url = Some(val);
        }
        if let Some(val) = lookup("BUILDSCOPE_LOG_FILE") {
            self.feed.log_file = Some(PathBuf::from(val));
        }
        if let Some(val) = lookup("BUILDSCOPE_OBSERVER_PORT") {
            self.observer.port = val.trim().parse().map_err(|err| ConfigError::Invalid {
                reason: format!("BUILDSCOPE_OBSERVER_PORT={val:?} is not a port number: {err}"),
            })?;
        }
        if let Some(val) = lookup("BUILDSCOPE_DETAILS_DIR") {
            self.producer.respire_details_dir = Some(val);
        }
        self.validate()
    }

    /// Check values that parse but cannot work.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.playback.frame_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                reason: "playback.frame_interval_ms must be at least 1".to_owned(),
            });
        }
        if self.feed.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                reason: "feed.request_timeout_ms must be at least 1".to_owned(),
            });
        }
        if self.feed.url.is_none() && self.feed.log_file.is_none() && !self.observer.enabled {
            return Err(ConfigError::Invalid {
                reason: "no event source: set feed.url or feed.log_file, or enable the observer"
                    .to_owned(),
            });
        }
        Ok(())
    }

    /// The `/log_stream` base URL to poll, if events come over HTTP.
    ///
    /// A log file takes precedence over any URL. Otherwise an explicit
    /// `feed.url` is used, and without one the viewer tails its own
    /// observer.
    pub fn feed_url(&self) -> Option<String> {
        if self.feed.log_file.is_some() {
            return None;
        }
        if let Some(url) = &self.feed.url {
            return Some(url.trim_end_matches('/').to_owned());
        }
        if !self.observer.enabled {
            return None;
        }
        let host = match self.observer.host.as_str() {
            "0.0.0.0" => "127.0.0.1",
            "::" => "[::1]",
            other => other,
        };
        Some(format!("http://{host}:{}", self.observer.port))
    }
}

/// Event source configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedConfig {
    /// Base URL of a server exposing `/log_stream`.
    #[serde(default)]
    pub url: Option<String>,

    /// Recorded activity log to replay instead of polling.
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Delay before restarting the poller after a transport error.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Timeout of a single long-poll request.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl FeedConfig {
    /// [`retry_delay_ms`](Self::retry_delay_ms) as a [`Duration`].
    pub const fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// [`request_timeout_ms`](Self::request_timeout_ms) as a [`Duration`].
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: None,
            log_file: None,
            retry_delay_ms: default_retry_delay_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Frame pacing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlaybackConfig {
    /// Milliseconds between frames while playing.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
}

impl PlaybackConfig {
    /// [`frame_interval_ms`](Self::frame_interval_ms) as a [`Duration`].
    pub const fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObserverConfig {
    /// Bind address.
    #[serde(default = "default_observer_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_observer_port")]
    pub port: u16,

    /// Whether to run the server at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            host: default_observer_host(),
            port: default_observer_port(),
            enabled: true,
        }
    }
}

/// Producer queue configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProducerConfig {
    /// Sent in the opening `StartupParams` event to hide bookkeeping tasks.
    #[serde(default)]
    pub respire_details_dir: Option<String>,
}

const fn default_retry_delay_ms() -> u64 {
    1000
}

const fn default_request_timeout_ms() -> u64 {
    60_000
}

const fn default_frame_interval_ms() -> u64 {
    16
}

fn default_observer_host() -> String {
    "127.0.0.1".to_owned()
}

const fn default_observer_port() -> u16 {
    8000
}

const fn default_true() -> bool {
    true
}
