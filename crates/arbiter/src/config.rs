//! Arbiter configuration, read from TOML. Every key is optional.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// Longest duration any setting may ask for: one year.
pub const MAX_CONFIG_SECONDS: u64 = 365 * 24 * 60 * 60;

/// How many requests fit in one rolling window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowLimit {
    pub max_requests: u32,
    pub window_seconds: u64,
}

impl WindowLimit {
    pub fn new(max_requests: u32, window_seconds: u64) -> Self {
        Self {
            max_requests,
            window_seconds,
        }
    }

    /// Window length, clamped to [`MAX_CONFIG_SECONDS`].
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds.min(MAX_CONFIG_SECONDS))
    }
}

/// Whether both agents draw on one request budget or each has its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitScope {
    #[default]
    Shared,
    PerAgent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArbiterConfig {
    /// Plies after which the game ends as `MoveLimitReached`
    pub max_moves: u32,
    /// Consecutive agent failures tolerated; one more aborts the game
    pub max_consecutive_errors: u32,
    pub request_timeout_seconds: f64,
    pub retry_backoff_base_seconds: f64,
    pub retry_backoff_max_seconds: f64,
    pub short_window_limit: WindowLimit,
    pub long_window_limit: WindowLimit,
    pub rate_limit_scope: RateLimitScope,
    /// Pause after every applied agent move
    pub agent_move_delay_seconds: f64,
    /// Legal moves listed in an agent prompt
    pub prompt_legal_move_limit: usize,
    pub fen_output: PathBuf,
    /// JSON game summary, written only when set
    pub record_output: Option<PathBuf>,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            max_moves: 150,
            max_consecutive_errors: 3,
            request_timeout_seconds: 30.0,
            retry_backoff_base_seconds: 1.0,
            retry_backoff_max_seconds: 30.0,
            short_window_limit: WindowLimit::new(6, 60),
            long_window_limit: WindowLimit::new(800, 86_400),
            rate_limit_scope: RateLimitScope::Shared,
            agent_move_delay_seconds: 0.0,
            prompt_legal_move_limit: 15,
            fen_output: PathBuf::from("final_position.fen"),
            record_output: None,
        }
    }
}

impl ArbiterConfig {
    /// Read and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let seconds = [
            ("request_timeout_seconds", self.request_timeout_seconds),
            ("retry_backoff_base_seconds", self.retry_backoff_base_seconds),
            ("retry_backoff_max_seconds", self.retry_backoff_max_seconds),
            ("agent_move_delay_seconds", self.agent_move_delay_seconds),
        ];
        for (key, value) in seconds {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{key} must be a non-negative number of seconds, got {value}"
                )));
            }
            if value > MAX_CONFIG_SECONDS as f64 {
                return Err(ConfigError::Invalid(format!(
                    "{key} must be at most {MAX_CONFIG_SECONDS} seconds, got {value}"
                )));
            }
        }
        if self.request_timeout_seconds == 0.0 {
            return Err(ConfigError::Invalid(
                "request_timeout_seconds must be positive".to_string(),
            ));
        }
        if self.retry_backoff_max_seconds < self.retry_backoff_base_seconds {
            return Err(ConfigError::Invalid(
                "retry_backoff_max_seconds is below retry_backoff_base_seconds".to_string(),
            ));
        }
        if self.max_moves == 0 {
            return Err(ConfigError::Invalid("max_moves must be at least 1".to_string()));
        }
        for (key, limit) in [
            ("short_window_limit", self.short_window_limit),
            ("long_window_limit", self.long_window_limit),
        ] {
            if limit.max_requests == 0 || limit.window_seconds == 0 {
                return Err(ConfigError::Invalid(format!(
                    "{key} needs a positive request count and window"
                )));
            }
            if limit.window_seconds > MAX_CONFIG_SECONDS {
                return Err(ConfigError::Invalid(format!(
                    "{key} window must be at most {MAX_CONFIG_SECONDS} seconds, got {}",
                    limit.window_seconds
                )));
            }
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        seconds(self.request_timeout_seconds)
    }

    pub fn backoff_base(&self) -> Duration {
        seconds(self.retry_backoff_base_seconds)
    }

    pub fn backoff_cap(&self) -> Duration {
        seconds(self.retry_backoff_max_seconds)
    }

    pub fn agent_move_delay(&self) -> Duration {
        seconds(self.agent_move_delay_seconds)
    }
}

/// Unvalidated values saturate instead of panicking; NaN reads as zero.
fn seconds(value: f64) -> Duration {
    if value.is_nan() || value <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(value.min(MAX_CONFIG_SECONDS as f64))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
