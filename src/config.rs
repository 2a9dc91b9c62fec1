//! Trampoline configuration.
//!
//! Configuration can come from a TOML file, from environment variables, or
//! both (environment wins):
//!
//! ```toml
//! memoize = true
//! max_frames = 1000000
//! debug_every = 1000
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Environment variable that disables/enables per-context memoization
pub const MEMOIZE_ENV: &str = "ITEREC_MEMOIZE";
/// Environment variable that sets the frame limit (0 = unlimited)
pub const MAX_FRAMES_ENV: &str = "ITEREC_MAX_FRAMES";
/// Environment variable that turns on the driver's progress lines on stderr
pub const DEBUG_EVAL_ENV: &str = "ITEREC_DEBUG_EVAL";

/// Settings applied to every context a `Trampoline` creates
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrampolineConfig {
    /// Reuse the frame of an equal call (same function, equal arguments)
    /// within one invocation
    pub memoize: bool,
    /// Maximum frames per invocation (0 = unlimited)
    pub max_frames: usize,
    /// Period of the progress line printed when `ITEREC_DEBUG_EVAL` is set
    pub debug_every: u64,
}

impl Default for TrampolineConfig {
    fn default() -> Self {
        TrampolineConfig {
            memoize: true,
            max_frames: 0,
            debug_every: 1000,
        }
    }
}

/// Errors loading a configuration
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read
    Io { path: PathBuf, source: std::io::Error },
    /// The TOML did not parse or had unknown keys
    Parse(toml::de::Error),
    /// A field or environment variable held an unusable value
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "cannot read config {}: {}", path.display(), source)
            }
            ConfigError::Parse(e) => write!(f, "invalid config: {}", e),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl TrampolineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: TrampolineConfig = toml::from_str(text)?;
        config.validate()
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Apply `ITEREC_MEMOIZE` and `ITEREC_MAX_FRAMES` on top of this config
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(raw) = lookup(MEMOIZE_ENV) {
            self.memoize = parse_flag(&raw).ok_or_else(|| {
                ConfigError::Invalid(format!("{} must be a boolean, got '{}'", MEMOIZE_ENV, raw))
            })?;
        }
        if let Some(raw) = lookup(MAX_FRAMES_ENV) {
            self.max_frames = raw.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!(
                    "{} must be a non-negative integer, got '{}'",
                    MAX_FRAMES_ENV, raw
                ))
            })?;
        }
        self.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.debug_every == 0 {
            return Err(ConfigError::Invalid("debug_every must be at least 1".to_string()));
        }
        Ok(self)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Whether the driver should print progress lines (`ITEREC_DEBUG_EVAL` set)
pub fn debug_eval_enabled() -> bool {
    std::env::var(DEBUG_EVAL_ENV).is_ok()
}
