// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for the contact endpoint.
//!
//! Client input errors carry a specific, safe message. Server-side failures
//! are logged with full detail and reach the client as a generic message.

use crate::dispatch::DispatchError;
use crate::validator::ValidationError;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::error;

pub const RATE_LIMITED_MESSAGE: &str = "Too many requests. Please try again later.";
pub const NOT_CONFIGURED_MESSAGE: &str = "Email service is not configured. Please try again later.";
pub const DISPATCH_FAILED_MESSAGE: &str = "Failed to send email. Please try again later.";
pub const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred. Please try again later.";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed. Use POST to submit contact form.";

/// Application error types
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("Invalid content type. Expected application/json.")]
    InvalidContentType,

    #[error("Invalid JSON in request body.")]
    InvalidJson,

    #[error("Request body must be a valid object.")]
    NotAnObject,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Rate limit exceeded, retry in {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("Email provider API key is not set")]
    NotConfigured,

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ContactError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidContentType | Self::InvalidJson | Self::NotAnObject | Self::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::NotConfigured | Self::Dispatch(_) | Self::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message shown to the client. Never contains server-side detail.
    pub fn client_message(&self) -> String {
        match self {
            Self::InvalidContentType | Self::InvalidJson | Self::NotAnObject | Self::Validation(_) => {
                self.to_string()
            }
            Self::RateLimited { .. } => RATE_LIMITED_MESSAGE.to_string(),
            Self::NotConfigured => NOT_CONFIGURED_MESSAGE.to_string(),
            Self::Dispatch(_) => DISPATCH_FAILED_MESSAGE.to_string(),
            Self::Unexpected(_) => UNEXPECTED_MESSAGE.to_string(),
        }
    }

    /// Short label for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::InvalidContentType | Self::InvalidJson | Self::NotAnObject | Self::Validation(_) => {
                "invalid"
            }
            Self::RateLimited { .. } => "rate_limited",
            Self::NotConfigured => "not_configured",
            Self::Dispatch(_) => "dispatch_failed",
            Self::Unexpected(_) => "unexpected",
        }
    }
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        match &self {
            Self::NotConfigured => error!(error = %self, "Contact form cannot send email"),
            Self::Dispatch(err) => error!(error = %err, "Email dispatch failed"),
            Self::Unexpected(detail) => error!(detail = %detail, "Contact form error"),
            _ => {}
        }

        let body = Json(ErrorResponse {
            error: self.client_message(),
        });

        if let Self::RateLimited { retry_after } = &self {
            let retry_secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            return (
                self.status(),
                [(header::RETRY_AFTER, retry_secs.to_string())],
                body,
            )
                .into_response();
        }

        (self.status(), body).into_response()
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ContactError>;
