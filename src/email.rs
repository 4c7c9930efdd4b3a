// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Rendering of accepted submissions into the notification email.
//!
//! Fields arrive already sanitized and are embedded verbatim.

use crate::config::ContactConfig;
use crate::validator::ValidatedSubmission;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::LazyLock;
use tera::Tera;

const FOOTER: &str = "This email was sent from your website's contact form.";

const HTML_TEMPLATE: (&str, &str) = ("contact.html", include_str!("../templates/contact.html"));
const TEXT_TEMPLATE: (&str, &str) = ("contact.txt", include_str!("../templates/contact.txt"));

static TEMPLATES: LazyLock<Tera> = LazyLock::new(|| {
    let mut tera = Tera::default();
    for (name, template) in [HTML_TEMPLATE, TEXT_TEMPLATE] {
        tera.add_raw_template(name, template)
            .expect("bundled email templates parse");
    }
    // Fields are sanitized upstream and embedded verbatim.
    tera.autoescape_on(vec![]);
    tera
});

/// Values available to the email templates.
#[derive(Debug, Serialize)]
struct ContactTemplate<'a> {
    name: &'a str,
    email: &'a str,
    message: &'a str,
    timestamp: String,
    footer: &'static str,
}

/// Rich and plain renderings of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    pub html_body: String,
    pub text_body: String,
}

/// A named mailbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mailbox {
    pub email: String,
    pub name: String,
}

/// Everything the dispatch collaborator needs to deliver one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub sender: Mailbox,
    pub reply_to: Mailbox,
    pub to: Mailbox,
    pub subject: String,
    pub content: EmailContent,
}

impl OutboundEmail {
    /// Address a rendered submission using the configured sender and recipient.
    pub fn new(config: &ContactConfig, submission: &ValidatedSubmission, content: EmailContent) -> Self {
        Self {
            sender: Mailbox {
                email: config.sender_email.clone(),
                name: config.sender_name.clone(),
            },
            reply_to: Mailbox {
                email: submission.email.clone(),
                name: submission.name.clone(),
            },
            to: Mailbox {
                email: config.recipient_email.clone(),
                name: config.recipient_name.clone(),
            },
            subject: format!("{} {}", config.subject_prefix, submission.name),
            content,
        }
    }
}

/// Human-readable UTC timestamp, e.g. `March 14, 2025 at 09:05:03 PM`.
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.format("%B %-d, %Y at %I:%M:%S %p").to_string()
}

/// Render the HTML and plain-text bodies. Deterministic for a given `now`.
pub fn build(
    name: &str,
    email: &str,
    message: &str,
    now: DateTime<Utc>,
) -> tera::Result<EmailContent> {
    let context = tera::Context::from_serialize(ContactTemplate {
        name,
        email,
        message,
        timestamp: format_timestamp(now),
        footer: FOOTER,
    })?;

    Ok(EmailContent {
        html_body: TEMPLATES.render(HTML_TEMPLATE.0, &context)?,
        text_body: TEMPLATES.render(TEXT_TEMPLATE.0, &context)?,
    })
}

/// Render and address a validated submission in one step.
pub fn compose(
    config: &ContactConfig,
    submission: &ValidatedSubmission,
    now: DateTime<Utc>,
) -> tera::Result<OutboundEmail> {
    let content = build(&submission.name, &submission.email, &submission.message, now)?;
    Ok(OutboundEmail::new(config, submission, content))
}
