// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Token Gate
//!
//! Admission control for a single HTTP endpoint, backed by one shared token
//! bucket:
//!
//! - Bucket starts full and holds at most `capacity` tokens
//! - One token is generated per refill interval
//! - Each request takes one token or is rejected, never waits

pub mod clock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod limiter;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, LimiterConfig, RefillMode};
pub use error::ConfigError;
pub use limiter::{BucketSnapshot, TokenBucketLimiter};
