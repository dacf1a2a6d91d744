// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the admission gate.
//!
//! Every request, whatever its method or path, lands on [`admit`] and is
//! either let through or turned away with `429 Too Many Requests`.

use crate::limiter::TokenBucketLimiter;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared application state.
pub struct AppState {
    pub limiter: TokenBucketLimiter,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

/// Build the router: a single catch-all route.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .fallback(admit)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Admit or reject one inbound request.
pub async fn admit(State(state): State<Arc<AppState>>, request: Request<Body>) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    if state.limiter.try_acquire() {
        let remaining = state.limiter.snapshot().tokens;
        info!(%method, %path, remaining, "Request success");
        (
            StatusCode::OK,
            [("X-RateLimit-Remaining", remaining.to_string())],
            "Request success",
        )
            .into_response()
    } else {
        let retry_secs = retry_after_secs(state.limiter.retry_after());
        warn!(%method, %path, retry_after_secs = retry_secs, "Rate limit exceeded");
        (
            StatusCode::TOO_MANY_REQUESTS,
            [("Retry-After", retry_secs.to_string())],
            Json(ErrorResponse {
                error: "Rate limit exceeded".to_string(),
                code: "RATE_LIMITED",
                retry_after_secs: Some(retry_secs),
            }),
        )
            .into_response()
    }
}

/// Whole seconds for the `Retry-After` header, rounded up and never zero.
fn retry_after_secs(wait: Duration) -> u64 {
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    secs.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_after_rounds_up() {
        assert_eq!(retry_after_secs(Duration::ZERO), 1);
        assert_eq!(retry_after_secs(Duration::from_millis(200)), 1);
        assert_eq!(retry_after_secs(Duration::from_secs(3)), 3);
        assert_eq!(retry_after_secs(Duration::from_millis(3001)), 4);
    }
}
