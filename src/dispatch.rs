// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outbound delivery through the transactional email provider.
//!
//! The request pipeline only sees [`EmailDispatcher`]; the Brevo client is
//! one implementation of it.

use crate::config::ProviderConfig;
use crate::email::{Mailbox, OutboundEmail};
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Why a message could not be handed to the provider.
///
/// The `Display` output may contain provider detail and is meant for logs only.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Email provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Email provider rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Capability to deliver an [`OutboundEmail`].
#[async_trait]
pub trait EmailDispatcher: Send + Sync {
    /// Whether credentials are present. The pipeline refuses to send otherwise.
    fn is_configured(&self) -> bool;

    async fn send(&self, email: &OutboundEmail) -> Result<(), DispatchError>;
}

/// Brevo (`/v3/smtp/email`) request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoEmailRequest<'a> {
    sender: &'a Mailbox,
    reply_to: &'a Mailbox,
    to: [&'a Mailbox; 1],
    subject: &'a str,
    html_content: &'a str,
    text_content: &'a str,
}

impl<'a> From<&'a OutboundEmail> for BrevoEmailRequest<'a> {
    fn from(email: &'a OutboundEmail) -> Self {
        Self {
            sender: &email.sender,
            reply_to: &email.reply_to,
            to: [&email.to],
            subject: &email.subject,
            html_content: &email.content.html_body,
            text_content: &email.content.text_body,
        }
    }
}

/// Brevo transactional email client.
pub struct BrevoDispatcher {
    api_key: Option<String>,
    endpoint: Url,
    client: reqwest::Client,
}

impl BrevoDispatcher {
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.clone(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl EmailDispatcher for BrevoDispatcher {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn send(&self, email: &OutboundEmail) -> Result<(), DispatchError> {
        let api_key = self.api_key.as_deref().unwrap_or_default();

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("api-key", api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&BrevoEmailRequest::from(email))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), "Email accepted by provider");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(DispatchError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
