// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter for the contact endpoint.
//!
//! Each client key gets a counter that resets wholesale when its window
//! closes. Requests straddling a window edge can see up to twice the
//! configured maximum; that is acceptable for abuse mitigation.
//!
//! Records live behind a [`RateLimitStore`] so the in-memory table can be
//! swapped for a shared store without touching the request pipeline.

use crate::config::RateLimitConfig;
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Per-client counter for the current window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitRecord {
    pub client_key: String,
    pub count: u32,
    pub window_reset_at: DateTime<Utc>,
}

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed {
        /// Remaining requests in current window
        remaining: u32,
        /// When the current window closes
        reset_at: DateTime<Utc>,
    },
    /// Request is rate limited
    Limited {
        /// Time until the window closes
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Outcome of applying the window rule to one stored record.
#[derive(Debug, Clone)]
pub struct WindowStep {
    pub result: RateLimitResult,
    /// Replacement record, or `None` to leave the store untouched.
    pub write: Option<RateLimitRecord>,
}

/// Read-modify-write transition applied by a store under its lock.
pub type Transition<'a> = dyn Fn(Option<&RateLimitRecord>) -> WindowStep + Send + Sync + 'a;

/// Storage for rate-limit records.
///
/// Implementations must run `update` atomically per key: concurrent callers
/// for the same key may not interleave between reading and writing.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Apply `transition` to the record for `key` and persist its write.
    async fn update(&self, key: &str, transition: &Transition<'_>) -> RateLimitResult;

    /// Remove records whose window closed before `now`. Returns how many went.
    async fn sweep(&self, now: DateTime<Utc>) -> usize;

    /// Number of tracked client keys.
    async fn len(&self) -> usize;
}

#[async_trait]
impl<T: RateLimitStore + ?Sized> RateLimitStore for Arc<T> {
    async fn update(&self, key: &str, transition: &Transition<'_>) -> RateLimitResult {
        (**self).update(key, transition).await
    }

    async fn sweep(&self, now: DateTime<Utc>) -> usize {
        (**self).sweep(now).await
    }

    async fn len(&self) -> usize {
        (**self).len().await
    }
}

/// Process-local record table.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<String, RateLimitRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the record for `key`.
    pub async fn get(&self, key: &str) -> Option<RateLimitRecord> {
        self.records.read().await.get(key).cloned()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryStore {
    async fn update(&self, key: &str, transition: &Transition<'_>) -> RateLimitResult {
        let mut records = self.records.write().await;
        let step = transition(records.get(key));
        if let Some(record) = step.write {
            records.insert(key.to_string(), record);
        }
        step.result
    }

    async fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| now <= record.window_reset_at);
        before - records.len()
    }

    async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

/// Thread-safe fixed-window rate limiter.
pub struct RateLimiter<S = InMemoryStore> {
    config: RateLimitConfig,
    store: S,
}

impl RateLimiter<InMemoryStore> {
    /// Create a new rate limiter backed by an in-memory store.
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_store(config, InMemoryStore::new())
    }
}

impl<S: RateLimitStore> RateLimiter<S> {
    pub fn with_store(config: RateLimitConfig, store: S) -> Self {
        Self { config, store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Count a request from `client_key` at `now` and decide whether it may proceed.
    pub async fn check(&self, client_key: &str, now: DateTime<Utc>) -> RateLimitResult {
        let window = TimeDelta::milliseconds(i64::try_from(self.config.window_ms).unwrap_or(i64::MAX));
        let max_requests = self.config.max_requests;

        let result = self
            .store
            .update(client_key, &|record| {
                fixed_window_step(client_key, record, now, window, max_requests)
            })
            .await;

        if let RateLimitResult::Limited { retry_after } = &result {
            debug!(client_key, ?retry_after, "Client rate limit exceeded");
        }
        result
    }

    /// Drop records whose window has closed.
    pub async fn sweep(&self, now: DateTime<Utc>) -> usize {
        let removed = self.store.sweep(now).await;
        if removed > 0 {
            debug!(removed, "Swept expired rate limit records");
        }
        removed
    }
}

/// The fixed-window rule.
///
/// A missing or expired record opens a new window with `count = 1`. A full
/// window denies without touching the record. Otherwise the count goes up.
fn fixed_window_step(
    client_key: &str,
    record: Option<&RateLimitRecord>,
    now: DateTime<Utc>,
    window: TimeDelta,
    max_requests: u32,
) -> WindowStep {
    match record {
        Some(current) if now <= current.window_reset_at => {
            if current.count >= max_requests {
                let retry_after = (current.window_reset_at - now).to_std().unwrap_or_default();
                WindowStep {
                    result: RateLimitResult::Limited { retry_after },
                    write: None,
                }
            } else {
                let count = current.count + 1;
                WindowStep {
                    result: RateLimitResult::Allowed {
                        remaining: max_requests.saturating_sub(count),
                        reset_at: current.window_reset_at,
                    },
                    write: Some(RateLimitRecord {
                        count,
                        ..current.clone()
                    }),
                }
            }
        }
        _ => {
            let reset_at = now
                .checked_add_signed(window)
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            WindowStep {
                result: RateLimitResult::Allowed {
                    remaining: max_requests.saturating_sub(1),
                    reset_at,
                },
                write: Some(RateLimitRecord {
                    client_key: client_key.to_string(),
                    count: 1,
                    window_reset_at: reset_at,
                }),
            }
        }
    }
}
