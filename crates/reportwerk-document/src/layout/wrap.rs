// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Soft break insertion for long unbroken cell text (URLs, hashes).

/// Invisible wrap opportunity (U+200B ZERO WIDTH SPACE).
pub const SOFT_BREAK: char = '\u{200B}';

/// Insert a [`SOFT_BREAK`] before every character whose position is a
/// non-zero multiple of `interval`.
///
/// Positions count visible characters of `input`, so the function must run
/// exactly once on the raw cell text: a second pass would count the markers
/// from the first. Inputs shorter than `interval` come back unchanged.
pub fn insert_soft_breaks(input: &str, interval: usize) -> String {
    if interval == 0 || input.chars().count() < interval {
        return input.to_owned();
    }

    let mut out = String::with_capacity(input.len() + input.len() / interval * SOFT_BREAK.len_utf8());
    for (i, ch) in input.chars().enumerate() {
        if i > 0 && i % interval == 0 {
            out.push(SOFT_BREAK);
        }
        out.push(ch);
    }
    out
}

/// Remove every soft break marker.
pub fn strip_soft_breaks(input: &str) -> String {
    input.chars().filter(|&ch| ch != SOFT_BREAK).collect()
}
