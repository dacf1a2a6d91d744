// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP surface tests: the catch-all route admits or rejects per the bucket.

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use token_gate::{
    handlers::{router, AppState},
    ManualClock, TokenBucketLimiter,
};
use tower::ServiceExt;

fn app(capacity: u64) -> (Router, ManualClock) {
    let clock = ManualClock::new();
    let limiter =
        TokenBucketLimiter::with_clock(capacity, Duration::from_secs(5), clock.clone()).unwrap();
    (router(Arc::new(AppState { limiter })), clock)
}

fn request(method: Method, path: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_admitted_request_reports_remaining() {
    let (app, _clock) = app(3);

    let response = app.oneshot(request(Method::GET, "/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["X-RateLimit-Remaining"], "2");
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"Request success");
}

#[tokio::test]
async fn test_any_path_and_method_hits_the_bucket() {
    let (app, _clock) = app(2);

    let first = app
        .clone()
        .oneshot(request(Method::POST, "/some/deep/path"))
        .await
        .unwrap();
    let second = app
        .clone()
        .oneshot(request(Method::DELETE, "/other"))
        .await
        .unwrap();
    let third = app.oneshot(request(Method::GET, "/")).await.unwrap();

    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(third.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_rejected_request_gets_429_with_retry_after() {
    let (app, clock) = app(1);

    let response = app.clone().oneshot(request(Method::GET, "/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    clock.advance(Duration::from_secs(2));
    let response = app.clone().oneshot(request(Method::GET, "/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()["Retry-After"], "3");

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["code"], "RATE_LIMITED");
    assert_eq!(json["retry_after_secs"], 3);

    clock.advance(Duration::from_secs(3));
    let response = app.oneshot(request(Method::GET, "/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
