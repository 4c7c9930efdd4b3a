// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Relay
//!
//! A single `POST /contact` endpoint that turns an untrusted JSON contact
//! form submission into an email sent through a transactional provider:
//!
//! - Per-client fixed-window rate limiting (5 requests per minute default)
//! - Content-Type and JSON body validation
//! - Ordered name/email/message field validation
//! - Markup and null-byte sanitization
//! - HTML and plain-text email rendering
//! - Delivery through Brevo, with provider errors kept server-side

pub mod config;
pub mod dispatch;
pub mod email;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod limiter;
pub mod metrics;
pub mod sanitizer;
pub mod validator;

pub use config::Config;
pub use dispatch::{BrevoDispatcher, DispatchError, EmailDispatcher};
pub use error::ContactError;
pub use handlers::{router, AppState};
pub use limiter::{InMemoryStore, RateLimitResult, RateLimitStore, RateLimiter};
pub use validator::{ContactValidator, ValidationError};
