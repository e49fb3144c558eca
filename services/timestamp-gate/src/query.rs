// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Raw query-string tokenizer.
//!
//! Splits an undecoded query string on `&` into segments and each segment on
//! its first `=`. No percent-decoding is performed and the input is never
//! modified; every slice returned borrows from the original bytes.

/// Query-string key carrying the request timestamp.
pub const TIMESTAMP_KEY: &[u8] = b"timestamp";

/// A single `key=value` segment of a query string.
///
/// `value` is `None` when the segment has no `=` at all, which is distinct
/// from an empty value (`key=`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPair<'a> {
    pub key: &'a [u8],
    pub value: Option<&'a [u8]>,
}

impl<'a> QueryPair<'a> {
    fn from_segment(segment: &'a [u8]) -> Self {
        match segment.iter().position(|&b| b == b'=') {
            Some(eq) => Self {
                key: &segment[..eq],
                value: Some(&segment[eq + 1..]),
            },
            None => Self {
                key: segment,
                value: None,
            },
        }
    }
}

/// Iterate over the `&`-separated pairs of a raw query string, left to right.
///
/// The end of the input terminates the last segment exactly as `&` would, so
/// `"a=1&"` yields `a=1` followed by an empty segment.
pub fn pairs(query: &[u8]) -> impl Iterator<Item = QueryPair<'_>> {
    query.split(|&b| b == b'&').map(QueryPair::from_segment)
}

/// Find the value of `key`, using the last segment that carries it.
///
/// Segments spelling the key without a `=` do not count as occurrences.
pub fn find_last<'a>(query: &'a [u8], key: &[u8]) -> Option<&'a [u8]> {
    pairs(query)
        .filter(|pair| pair.key == key)
        .filter_map(|pair| pair.value)
        .last()
}

/// Find the raw `timestamp` value in a query string.
pub fn find_timestamp(query: &[u8]) -> Option<&[u8]> {
    find_last(query, TIMESTAMP_KEY)
}
