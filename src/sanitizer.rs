// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Free-text sanitization applied before submitted fields are embedded in
//! the outbound email.

/// Characters removed from submitted text.
const STRIPPED: &[char] = &['<', '>', '\0'];

/// Trim surrounding whitespace and remove markup brackets and null characters.
///
/// Total and idempotent: `sanitize(&sanitize(x)) == sanitize(x)`.
pub fn sanitize(input: &str) -> String {
    // Strip before trimming so a second pass is a no-op.
    input
        .chars()
        .filter(|c| !STRIPPED.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}
