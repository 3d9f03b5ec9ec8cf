//! Per-client request limits backed by Redis window counters.
//!
//! Requests are refused while the limiter is unreachable.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::api::AppState;
use crate::config::{
    RATE_LIMIT_AUTH_REQUESTS, RATE_LIMIT_AUTH_WINDOW_SECONDS, RATE_LIMIT_REQUESTS,
    RATE_LIMIT_WINDOW_SECONDS,
};

#[derive(Debug, Clone, Copy)]
struct Limit {
    scope: &'static str,
    requests: u64,
    window_seconds: u64,
}

const GENERAL: Limit = Limit {
    scope: "general",
    requests: RATE_LIMIT_REQUESTS,
    window_seconds: RATE_LIMIT_WINDOW_SECONDS,
};

/// Login, registration, phone login and password reset.
const AUTH: Limit = Limit {
    scope: "auth",
    requests: RATE_LIMIT_AUTH_REQUESTS,
    window_seconds: RATE_LIMIT_AUTH_WINDOW_SECONDS,
};

/// 429 with a `Retry-After` of one full window.
#[derive(Debug)]
pub struct RateLimitError {
    pub retry_after: u64,
}

impl IntoResponse for RateLimitError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "message": "Too many requests. Please try again later.",
            "code": "RATE_LIMITED",
        }));
        let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
        let headers = response.headers_mut();
        headers.insert("Retry-After", HeaderValue::from(self.retry_after));
        headers.insert("X-RateLimit-Remaining", HeaderValue::from(0u64));
        response
    }
}

/// First `X-Forwarded-For` hop, then `X-Real-IP`, then the socket peer.
fn client_address(request: &Request) -> String {
    let header = |name: &str| {
        request
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    header("X-Forwarded-For")
        .or_else(|| header("X-Real-IP"))
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(peer)| peer.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

async fn check(
    state: &AppState,
    limit: Limit,
    request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    let client = client_address(&request);
    let refused = RateLimitError {
        retry_after: limit.window_seconds,
    };

    let count = match state
        .limiter
        .hit(&format!("{}:{}", limit.scope, client), limit.requests, limit.window_seconds)
        .await
    {
        Ok((count, true)) => count,
        Ok((count, false)) => {
            tracing::warn!(%client, count, scope = limit.scope, "Rate limit exceeded");
            return Err(refused);
        }
        Err(e) => {
            tracing::error!(error = %e, scope = limit.scope, "Rate limiter unavailable");
            return Err(refused);
        }
    };

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert("X-RateLimit-Limit", HeaderValue::from(limit.requests));
    headers.insert(
        "X-RateLimit-Remaining",
        HeaderValue::from(limit.requests.saturating_sub(count)),
    );
    Ok(response)
}

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    check(&state, GENERAL, request, next).await
}

pub async fn rate_limit_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    check(&state, AUTH, request, next).await
}
