// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the contact relay.
//!
//! `POST /contact` runs the submission pipeline: resolve client key, rate
//! limit, content type, bounded body read, JSON parse, object check, field validation,
//! provider configuration, sanitize, render, dispatch. The first step that
//! fails ends the request with its own status and message.

use crate::config::Config;
use crate::dispatch::EmailDispatcher;
use crate::email;
use crate::error::{ContactError, ErrorResponse, Result, METHOD_NOT_ALLOWED_MESSAGE};
use crate::identity::resolve_client_key;
use crate::limiter::{RateLimitResult, RateLimitStore, RateLimiter};
use crate::metrics::ContactMetrics;
use crate::validator::ContactValidator;
use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::info;

pub const SUCCESS_MESSAGE: &str = "Message sent successfully";
pub const NO_CACHE: &str = "no-cache, no-store, must-revalidate";

/// Shared application state.
pub struct AppState {
    pub limiter: RateLimiter<Arc<dyn RateLimitStore>>,
    pub validator: ContactValidator,
    pub dispatcher: Arc<dyn EmailDispatcher>,
    pub metrics: ContactMetrics,
    pub config: Config,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn RateLimitStore>,
        dispatcher: Arc<dyn EmailDispatcher>,
    ) -> prometheus::Result<Self> {
        Ok(Self {
            limiter: RateLimiter::with_store(config.rate_limit.clone(), store),
            validator: ContactValidator::new(config.validation.clone()),
            dispatcher,
            metrics: ContactMetrics::new()?,
            config,
        })
    }
}

/// Success response body.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: &'static str,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/contact", post(submit).fallback(method_not_allowed));

    if state.config.metrics.enabled {
        let path = state.config.metrics.path.clone();
        router = router.route(&path, get(metrics));
    }

    let panic_metrics = state.metrics.clone();
    router
        .layer(CatchPanicLayer::custom(move |payload| {
            panic_metrics.record("unexpected");
            handle_panic(payload)
        }))
        .with_state(state)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "contact-relay",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Prometheus metrics endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.render() {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(err) => {
            state.metrics.record("unexpected");
            ContactError::Unexpected(err.to_string()).into_response()
        }
    }
}

/// Anything but POST on the contact route. Skips the pipeline entirely.
pub async fn method_not_allowed(State(state): State<Arc<AppState>>) -> Response {
    state.metrics.record("method_not_allowed");
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        Json(ErrorResponse {
            error: METHOD_NOT_ALLOWED_MESSAGE.to_string(),
        }),
    )
        .into_response()
}

/// Accept a contact form submission.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Body,
) -> Response {
    match process(&state, &headers, body, Utc::now()).await {
        Ok(()) => {
            state.metrics.record("sent");
            (
                StatusCode::OK,
                [(header::CACHE_CONTROL, NO_CACHE)],
                Json(SuccessResponse {
                    success: true,
                    message: SUCCESS_MESSAGE,
                }),
            )
                .into_response()
        }
        Err(err) => {
            state.metrics.record(err.outcome());
            err.into_response()
        }
    }
}

/// Run the submission pipeline at time `now`.
///
/// The body is only read once the request has passed the rate limit and
/// content-type checks, and never beyond `validation.max_body_bytes`.
pub async fn process(
    state: &AppState,
    headers: &HeaderMap,
    body: Body,
    now: DateTime<Utc>,
) -> Result<()> {
    let client_key = resolve_client_key(headers);

    if let RateLimitResult::Limited { retry_after } = state.limiter.check(&client_key, now).await {
        info!(
            client_key = %client_key,
            retry_after_secs = retry_after.as_secs(),
            "Request rate limited"
        );
        return Err(ContactError::RateLimited { retry_after });
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    if !state.validator.accepts_content_type(content_type) {
        return Err(ContactError::InvalidContentType);
    }

    let body = to_bytes(body, state.config.validation.max_body_bytes)
        .await
        .map_err(|_| ContactError::InvalidJson)?;
    let payload: Value = serde_json::from_slice(&body).map_err(|_| ContactError::InvalidJson)?;
    let Value::Object(fields) = payload else {
        return Err(ContactError::NotAnObject);
    };

    let submission = state.validator.validate(&fields)?;

    if !state.dispatcher.is_configured() {
        return Err(ContactError::NotConfigured);
    }

    let validated = submission.sanitize();
    let outbound = email::compose(&state.config.contact, &validated, now)
        .map_err(|err| ContactError::Unexpected(err.to_string()))?;

    state.dispatcher.send(&outbound).await?;

    info!(client_key = %client_key, "Contact message sent");
    Ok(())
}

fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    ContactError::Unexpected(detail).into_response()
}
