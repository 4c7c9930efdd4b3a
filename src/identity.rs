// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Best-effort client identity for rate-limit bucketing.
//!
//! The key comes from proxy headers and is trivially spoofable when the
//! service is reachable directly. It is never used for anything but picking
//! a rate-limit bucket.

use axum::http::HeaderMap;

/// X-Forwarded-For header - comma-separated chain, originating client first.
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// X-Real-IP header - set by nginx-style proxies.
pub const X_REAL_IP: &str = "x-real-ip";

/// CF-Connecting-IP header - set by Cloudflare.
pub const CF_CONNECTING_IP: &str = "cf-connecting-ip";

/// Key used when no proxy header identifies the client.
pub const FALLBACK_CLIENT_KEY: &str = "127.0.0.1";

/// Resolve the rate-limit key for a request. Never empty.
pub fn resolve_client_key(headers: &HeaderMap) -> String {
    header_str(headers, X_FORWARDED_FOR)
        .and_then(first_forwarded_hop)
        .or_else(|| header_str(headers, X_REAL_IP))
        .or_else(|| header_str(headers, CF_CONNECTING_IP))
        .unwrap_or(FALLBACK_CLIENT_KEY)
        .to_string()
}

/// Trimmed, non-empty header value.
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn first_forwarded_hop(xff: &str) -> Option<&str> {
    xff.split(',').next().map(str::trim).filter(|ip| !ip.is_empty())
}
