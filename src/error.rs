// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for limiter construction and configuration loading.

use thiserror::Error;

/// Configuration error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Bucket capacity must be greater than zero")]
    ZeroCapacity,

    #[error("Refill interval must be greater than zero")]
    ZeroRefillInterval,

    #[error("Invalid value for {var}: {value:?} ({reason})")]
    InvalidEnv {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ConfigError>;
