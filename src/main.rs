// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Token Gate Service
//!
//! Puts a token bucket in front of a catch-all HTTP route. Admitted requests
//! get `200 OK`; the rest get `429 Too Many Requests` with `Retry-After`.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables:
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:7070)
//! - `BUCKET_CAPACITY`: Maximum tokens in the bucket (default: 10)
//! - `REFILL_INTERVAL_MS`: Milliseconds per generated token (default: 5000)
//! - `REFILL_MODE`: `carry` or `truncate` (default: carry)

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use token_gate::{
    config::Config,
    handlers::{router, AppState},
    limiter::TokenBucketLimiter,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = Config::from_env()?;
    info!(
        bind_addr = %config.bind_addr,
        capacity = config.limiter.capacity,
        refill_interval_ms = config.limiter.refill_interval_ms,
        refill_mode = %config.limiter.refill_mode,
        "Starting token gate"
    );

    let limiter = TokenBucketLimiter::from_config(&config.limiter)?;
    let app = router(Arc::new(AppState { limiter }));

    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
