// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Token bucket admission limiter.
//!
//! One bucket gates every request the process sees. Each call to
//! [`TokenBucketLimiter::try_acquire`] refills the bucket from elapsed time and
//! then takes a single token, all under one lock, so concurrent callers can
//! never admit more requests than there are tokens.

use crate::clock::{Clock, SystemClock};
use crate::config::{LimiterConfig, RefillMode};
use crate::error::{ConfigError, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Mutable bucket state.
#[derive(Debug)]
struct TokenBucket {
    /// Available tokens, never above capacity
    tokens: u64,
    /// Last time tokens were refilled
    last_refill: Instant,
}

/// Point-in-time view of the bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketSnapshot {
    pub tokens: u64,
    pub capacity: u64,
    pub last_refill: Instant,
}

/// Thread-safe token bucket limiter.
pub struct TokenBucketLimiter {
    /// Maximum tokens (bucket capacity)
    capacity: u64,
    /// Time needed to generate one token
    refill_interval: Duration,
    refill_mode: RefillMode,
    clock: Arc<dyn Clock>,
    bucket: Mutex<TokenBucket>,
}

impl TokenBucketLimiter {
    /// Create a full bucket driven by the system clock.
    pub fn new(capacity: u64, refill_interval: Duration) -> Result<Self> {
        Self::with_clock(capacity, refill_interval, SystemClock)
    }

    /// Create a full bucket driven by the given clock.
    pub fn with_clock<C>(capacity: u64, refill_interval: Duration, clock: C) -> Result<Self>
    where
        C: Clock + 'static,
    {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if refill_interval.is_zero() {
            return Err(ConfigError::ZeroRefillInterval);
        }

        let clock: Arc<dyn Clock> = Arc::new(clock);
        let bucket = TokenBucket {
            tokens: capacity,
            last_refill: clock.now(),
        };

        Ok(Self {
            capacity,
            refill_interval,
            refill_mode: RefillMode::default(),
            clock,
            bucket: Mutex::new(bucket),
        })
    }

    /// Create a limiter from loaded configuration.
    pub fn from_config(config: &LimiterConfig) -> Result<Self> {
        let limiter = Self::new(config.capacity, config.refill_interval())?;
        Ok(limiter.with_refill_mode(config.refill_mode))
    }

    /// Set how sub-interval remainders are treated on refill.
    pub fn with_refill_mode(mut self, mode: RefillMode) -> Self {
        self.refill_mode = mode;
        self
    }

    /// Try to take one token. Returns true if the request is admitted.
    ///
    /// Never blocks waiting for a token.
    pub fn try_acquire(&self) -> bool {
        let mut bucket = self.bucket.lock();
        let now = self.clock.now();
        self.refill(&mut bucket, now);

        if bucket.tokens > 0 {
            bucket.tokens -= 1;
            true
        } else {
            false
        }
    }

    /// Add the tokens generated since the last refill.
    fn refill(&self, bucket: &mut TokenBucket, now: Instant) {
        let since = now.saturating_duration_since(bucket.last_refill);
        if since < self.refill_interval {
            return;
        }

        let interval_nanos = self.refill_interval.as_nanos();
        let generated = since.as_nanos() / interval_nanos;
        let room = u128::from(self.capacity - bucket.tokens);

        if generated >= room {
            bucket.tokens = self.capacity;
            bucket.last_refill = now;
        } else {
            // generated < room <= capacity, so it fits in u64
            bucket.tokens += generated as u64;
            bucket.last_refill = match self.refill_mode {
                RefillMode::Truncate => now,
                RefillMode::Carry => {
                    let remainder = since.as_nanos() % interval_nanos;
                    // remainder < since, so this never moves before the previous refill
                    now - Duration::new(
                        (remainder / NANOS_PER_SEC) as u64,
                        (remainder % NANOS_PER_SEC) as u32,
                    )
                }
            };
        }

        info!(tokens = bucket.tokens, generated = %generated, "Tokens refilled");
    }

    /// Current state without refilling or consuming.
    pub fn snapshot(&self) -> BucketSnapshot {
        let bucket = self.bucket.lock();
        BucketSnapshot {
            tokens: bucket.tokens,
            capacity: self.capacity,
            last_refill: bucket.last_refill,
        }
    }

    /// Time until the next token can be taken. Zero if one is available now.
    pub fn retry_after(&self) -> Duration {
        let bucket = self.bucket.lock();
        if bucket.tokens > 0 {
            return Duration::ZERO;
        }
        let since = self.clock.now().saturating_duration_since(bucket.last_refill);
        self.refill_interval.saturating_sub(since)
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn refill_interval(&self) -> Duration {
        self.refill_interval
    }

    pub fn refill_mode(&self) -> RefillMode {
        self.refill_mode
    }
}
