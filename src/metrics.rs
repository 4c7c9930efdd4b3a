// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for the contact endpoint.

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Counters exposed on the metrics endpoint.
#[derive(Clone)]
pub struct ContactMetrics {
    registry: Registry,
    requests: IntCounterVec,
    tracked_keys: IntGauge,
}

impl ContactMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new("contact_requests_total", "Contact requests by outcome"),
            &["outcome"],
        )?;
        let tracked_keys = IntGauge::new(
            "contact_rate_limit_keys",
            "Client keys currently tracked by the rate limiter",
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(tracked_keys.clone()))?;

        Ok(Self {
            registry,
            requests,
            tracked_keys,
        })
    }

    /// Count one request with the given outcome label.
    pub fn record(&self, outcome: &str) {
        self.requests.with_label_values(&[outcome]).inc();
    }

    pub fn set_tracked_keys(&self, count: usize) {
        self.tracked_keys.set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    pub fn count(&self, outcome: &str) -> u64 {
        self.requests.with_label_values(&[outcome]).get()
    }

    /// Render all metrics in the Prometheus text format.
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_render() {
        let metrics = ContactMetrics::new().unwrap();
        metrics.record("sent");
        metrics.record("sent");
        metrics.record("rate_limited");
        metrics.set_tracked_keys(3);

        assert_eq!(metrics.count("sent"), 2);

        let text = metrics.render().unwrap();
        assert!(text.contains(r#"contact_requests_total{outcome="sent"} 2"#));
        assert!(text.contains(r#"contact_requests_total{outcome="rate_limited"} 1"#));
        assert!(text.contains("contact_rate_limit_keys 3"));
    }
}
