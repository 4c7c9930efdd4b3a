// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Relay Service
//!
//! Accepts contact form submissions on `POST /contact` and forwards them as
//! email through Brevo.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables (and a `.env` file if
//! present):
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `BREVO_API_KEY`: Provider API key. Without it submissions fail with 500.
//! - `CONTACT_RECIPIENT_EMAIL` / `CONTACT_RECIPIENT_NAME`: Who receives messages
//! - `CONTACT_SENDER_EMAIL` / `CONTACT_SENDER_NAME`: Verified sender identity
//! - `RATE_LIMIT_WINDOW_MS`: Rate limit window (default: 60000)
//! - `RATE_LIMIT_MAX_REQUESTS`: Requests per window per client (default: 5)
//! - `NAME_MAX_LENGTH`, `MESSAGE_MIN_LENGTH`, `MESSAGE_MAX_LENGTH`: Field bounds
//! - `MAX_BODY_BYTES`: Largest request body read (default: 65536)
//! - `RUST_LOG`: Log filter (default: info)

use chrono::Utc;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use contact_relay::{
    config::Config,
    dispatch::BrevoDispatcher,
    handlers::{router, AppState},
    limiter::{InMemoryStore, RateLimitStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before anything reads them
    dotenvy::dotenv().ok();

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
        window_ms = config.rate_limit.window_ms,
        max_requests = config.rate_limit.max_requests,
        recipient = %config.contact.recipient_email,
        "Starting contact relay"
    );
    if config.provider.api_key.is_none() {
        warn!("BREVO_API_KEY is not set, submissions will be rejected");
    }

    let dispatcher = Arc::new(BrevoDispatcher::new(&config.provider));
    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::new(InMemoryStore::new()),
        dispatcher,
    )?);

    // Spawn cleanup task
    let sweep_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_state.config.rate_limit.sweep_interval());
        loop {
            interval.tick().await;
            sweep_state.limiter.sweep(Utc::now()).await;
            let tracked = sweep_state.limiter.store().len().await;
            sweep_state.metrics.set_tracked_keys(tracked);
        }
    });

    let app = router(state).layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
