// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Shared fixtures for router-level tests.
//!
//! Provides a mock email dispatcher, a router wired to an in-memory store,
//! and helpers for building requests and reading responses.

#![allow(dead_code)]

pub mod generators;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use contact_relay::{
    config::Config,
    dispatch::{DispatchError, EmailDispatcher},
    email::OutboundEmail,
    handlers::{router, AppState},
    limiter::InMemoryStore,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// How the mock provider behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Deliver,
    Reject,
    Unconfigured,
    Panic,
}

/// Records every email it is asked to send.
pub struct MockDispatcher {
    outcome: Outcome,
    sent: Mutex<Vec<OutboundEmail>>,
}

impl MockDispatcher {
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailDispatcher for MockDispatcher {
    fn is_configured(&self) -> bool {
        self.outcome != Outcome::Unconfigured
    }

    async fn send(&self, email: &OutboundEmail) -> Result<(), DispatchError> {
        match self.outcome {
            Outcome::Deliver => {
                self.sent.lock().unwrap().push(email.clone());
                Ok(())
            }
            Outcome::Reject => Err(DispatchError::Rejected {
                status: 401,
                body: r#"{"code":"unauthorized","message":"Key not found: xkeysib-secret"}"#.into(),
            }),
            Outcome::Unconfigured => unreachable!("send called without configuration"),
            Outcome::Panic => panic!("provider exploded"),
        }
    }
}

/// Router plus handles on its collaborators.
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub store: Arc<InMemoryStore>,
    pub dispatcher: Arc<MockDispatcher>,
}

impl TestApp {
    pub fn new(outcome: Outcome) -> Self {
        Self::with_config(outcome, Config::default())
    }

    pub fn with_config(outcome: Outcome, config: Config) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let dispatcher = Arc::new(MockDispatcher::new(outcome));
        let state = Arc::new(
            AppState::new(config, store.clone(), dispatcher.clone()).unwrap(),
        );

        Self {
            router: router(state.clone()),
            state,
            store,
            dispatcher,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let raw = String::from_utf8(bytes.to_vec()).unwrap();
        let body = serde_json::from_str(&raw).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
            raw,
        }
    }
}

/// A fully buffered response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
    pub raw: String,
}

/// The canonical valid submission.
pub fn valid_payload() -> Value {
    json!({
        "name": "Jane Doe",
        "email": "jane@example.com",
        "message": "Hello, I would like to get in touch regarding your work.",
    })
}

/// A JSON request with an arbitrary body.
pub fn request(method: Method, uri: &str, body: Option<&str>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap()
}

/// A `POST /contact` from the given forwarded client address.
pub fn contact_request(client_ip: &str, payload: &Value) -> Request<Body> {
    let mut request = request(Method::POST, "/contact", Some(&payload.to_string()));
    request
        .headers_mut()
        .insert("x-forwarded-for", client_ip.parse().unwrap());
    request
}
