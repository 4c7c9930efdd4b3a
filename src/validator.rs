// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact form field validation.
//!
//! Fields are checked in a fixed order (name, email, message) and the first
//! failure wins. Validators look at raw JSON values so that a missing field,
//! a non-string and an empty string all produce the same "required" error.

use crate::config::ValidationConfig;
use crate::sanitizer::sanitize;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

/// Letters, whitespace, hyphen, apostrophe and period.
static NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z\s\-'.]+$").unwrap());

/// `local@domain.tld` with no whitespace or extra `@` anywhere.
static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

const NAME_MIN_LENGTH: usize = 2;

/// A contact form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Message,
}

impl Field {
    pub fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Message => "message",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A rejected field with a reason that is safe to show to the submitter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct ValidationError {
    pub field: Field,
    pub reason: String,
}

impl ValidationError {
    fn new(field: Field, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Raw, untrusted submission as extracted from the request object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Sanitized submission ready for the email builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactSubmission {
    /// Sanitize every field. The email keeps the case the sender typed.
    pub fn sanitize(self) -> ValidatedSubmission {
        ValidatedSubmission {
            name: sanitize(&self.name),
            email: sanitize(&self.email),
            message: sanitize(&self.message),
        }
    }
}

type FieldCheck = fn(&ContactValidator, Option<&Value>) -> Result<String, ValidationError>;

/// Contact form validator.
pub struct ContactValidator {
    config: ValidationConfig,
}

impl ContactValidator {
    /// Ordered field checks. Evaluation stops at the first failure.
    const CHECKS: [(Field, FieldCheck); 3] = [
        (Field::Name, Self::validate_name),
        (Field::Email, Self::validate_email),
        (Field::Message, Self::validate_message),
    ];

    /// Create a new validator with the given configuration.
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Whether the Content-Type header names an accepted media type.
    pub fn accepts_content_type(&self, content_type: Option<&str>) -> bool {
        let Some(ct) = content_type else {
            return false;
        };
        // Extract just the media type, ignoring charset etc.
        let media_type = ct.split(';').next().unwrap_or(ct).trim();

        self.config
            .accepted_content_types
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(media_type))
    }

    pub fn validate_name(&self, value: Option<&Value>) -> Result<String, ValidationError> {
        let err = |reason: String| ValidationError::new(Field::Name, reason);

        let name = required(value).ok_or_else(|| err("Name is required".into()))?;
        let trimmed = name.trim();
        let len = trimmed.chars().count();

        if len < NAME_MIN_LENGTH {
            return Err(err(format!(
                "Name must be at least {NAME_MIN_LENGTH} characters"
            )));
        }
        if len > self.config.name_max_length {
            return Err(err(format!(
                "Name must be less than {} characters",
                self.config.name_max_length
            )));
        }
        if !NAME_REGEX.is_match(trimmed) {
            return Err(err("Name contains invalid characters".into()));
        }

        Ok(name.to_string())
    }

    pub fn validate_email(&self, value: Option<&Value>) -> Result<String, ValidationError> {
        let err = |reason: &str| ValidationError::new(Field::Email, reason);

        let email = required(value).ok_or_else(|| err("Email is required"))?;
        let normalized = email.trim().to_lowercase();

        if !EMAIL_REGEX.is_match(&normalized) {
            return Err(err("Please enter a valid email address"));
        }
        if normalized.chars().count() > self.config.email_max_length {
            return Err(err("Email address is too long"));
        }

        Ok(email.to_string())
    }

    pub fn validate_message(&self, value: Option<&Value>) -> Result<String, ValidationError> {
        let err = |reason: String| ValidationError::new(Field::Message, reason);

        let message = required(value).ok_or_else(|| err("Message is required".into()))?;
        let len = message.trim().chars().count();

        if len < self.config.message_min_length {
            return Err(err(format!(
                "Message must be at least {} characters",
                self.config.message_min_length
            )));
        }
        if len > self.config.message_max_length {
            return Err(err(format!(
                "Message must be less than {} characters",
                self.config.message_max_length
            )));
        }

        Ok(message.to_string())
    }

    /// Validate a request object, surfacing only the first failing field.
    pub fn validate(&self, body: &Map<String, Value>) -> Result<ContactSubmission, ValidationError> {
        let mut accepted: [String; 3] = Default::default();
        for (slot, (field, check)) in accepted.iter_mut().zip(Self::CHECKS) {
            *slot = check(self, body.get(field.key()))?;
        }
        let [name, email, message] = accepted;

        Ok(ContactSubmission {
            name,
            email,
            message,
        })
    }
}

/// A present, non-empty string. Anything else counts as missing.
fn required(value: Option<&Value>) -> Option<&str> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
        _ => None,
    }
}
