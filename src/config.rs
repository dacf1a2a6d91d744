// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the admission gate.
//!
//! Values are fixed at startup; the limiter cannot be reconfigured while the
//! process is running.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Configuration for the admission gate service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:7070)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Token bucket configuration
    #[serde(default)]
    pub limiter: LimiterConfig,
}

/// Token bucket configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimiterConfig {
    /// Maximum tokens the bucket can hold (default: 10)
    #[serde(default = "default_capacity")]
    pub capacity: u64,

    /// Time needed to generate one token in milliseconds (default: 5000)
    #[serde(default = "default_refill_interval_ms")]
    pub refill_interval_ms: u64,

    /// What happens to elapsed time smaller than one interval (default: carry)
    #[serde(default)]
    pub refill_mode: RefillMode,
}

/// How the refill timestamp moves after tokens are generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefillMode {
    /// Advance by whole intervals only, keeping the sub-interval remainder.
    #[default]
    Carry,
    /// Jump to the refill time, dropping the sub-interval remainder.
    Truncate,
}

impl FromStr for RefillMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "carry" => Ok(Self::Carry),
            "truncate" => Ok(Self::Truncate),
            other => Err(format!("unknown refill mode {other:?}, expected carry or truncate")),
        }
    }
}

impl std::fmt::Display for RefillMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Carry => write!(f, "carry"),
            Self::Truncate => write!(f, "truncate"),
        }
    }
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:7070".to_string()
}

fn default_capacity() -> u64 {
    10
}

fn default_refill_interval_ms() -> u64 {
    5000 // one token every 5 seconds
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            limiter: LimiterConfig::default(),
        }
    }
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            refill_interval_ms: default_refill_interval_ms(),
            refill_mode: RefillMode::default(),
        }
    }
}

impl LimiterConfig {
    /// Get the refill interval duration
    pub fn refill_interval(&self) -> Duration {
        Duration::from_millis(self.refill_interval_ms)
    }

    /// Reject settings that would give the bucket no tokens or a zero-length interval.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.refill_interval_ms == 0 {
            return Err(ConfigError::ZeroRefillInterval);
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// - `BIND_ADDR`: Server bind address
    /// - `BUCKET_CAPACITY`: Maximum tokens in the bucket
    /// - `REFILL_INTERVAL_MS`: Milliseconds needed to generate one token
    /// - `REFILL_MODE`: `carry` or `truncate`
    ///
    /// Unset variables keep their defaults; set but malformed ones are errors.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = LimiterConfig::default();
        let config = Config {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(default_bind_addr),
            limiter: LimiterConfig {
                capacity: parse_var(&lookup, "BUCKET_CAPACITY")?.unwrap_or(defaults.capacity),
                refill_interval_ms: parse_var(&lookup, "REFILL_INTERVAL_MS")?
                    .unwrap_or(defaults.refill_interval_ms),
                refill_mode: parse_var(&lookup, "REFILL_MODE")?.unwrap_or(defaults.refill_mode),
            },
        };
        config.limiter.validate()?;
        Ok(config)
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidEnv {
                var,
                reason: e.to_string(),
                value,
            }),
    }
}
