// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Query-string timestamp window validator.
//!
//! Implements the access-phase check:
//! - Locate the `timestamp` key in the raw query string
//! - Parse its value as Unix seconds
//! - Accept only values within `now ± range_secs`

use crate::config::TimestampPolicy;
use crate::query;
use thiserror::Error;
use tracing::{debug, info};

/// Reasons a request is rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimestampError {
    #[error("Missing timestamp query parameter")]
    MissingKey,

    #[error("Could not parse timestamp from query string parameters")]
    EmptyOrInvalidValue,

    #[error("Timestamp {value} is above max range {max}")]
    OutOfRangeFuture { value: u64, max: i128 },

    #[error("Timestamp {value} is below min range {min}")]
    OutOfRangePast { value: u64, min: i128 },
}

impl TimestampError {
    /// Stable machine-readable code for responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingKey => "MISSING_TIMESTAMP",
            Self::EmptyOrInvalidValue => "INVALID_TIMESTAMP",
            Self::OutOfRangeFuture { .. } => "TIMESTAMP_IN_FUTURE",
            Self::OutOfRangePast { .. } => "TIMESTAMP_EXPIRED",
        }
    }
}

/// Outcome of validating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Request may continue
    Allow,
    /// No usable timestamp in the query string
    DenyMissingOrInvalid(TimestampError),
    /// Timestamp parsed but falls outside the window
    DenyOutOfRange(TimestampError),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn error(&self) -> Option<&TimestampError> {
        match self {
            Decision::Allow => None,
            Decision::DenyMissingOrInvalid(e) | Decision::DenyOutOfRange(e) => Some(e),
        }
    }
}

/// Parse a raw value as base-10 Unix seconds.
///
/// Only ASCII digits are accepted; empty input and overflow yield `None`.
pub fn parse_timestamp(raw: &[u8]) -> Option<u64> {
    if raw.is_empty() {
        return None;
    }

    raw.iter().try_fold(0u64, |acc, &b| {
        if !b.is_ascii_digit() {
            return None;
        }
        acc.checked_mul(10)?.checked_add(u64::from(b - b'0'))
    })
}

/// Decide whether a request carrying `query` is inside the window around `now`.
///
/// Never panics; every malformed input maps to a `Deny*` decision.
pub fn validate(query_string: &[u8], policy: &TimestampPolicy, now: i64) -> Decision {
    if !policy.enabled {
        return Decision::Allow;
    }

    let raw = match query::find_timestamp(query_string) {
        Some(raw) => raw,
        None => {
            info!("timestamp: no timestamp parameter in query string");
            return Decision::DenyMissingOrInvalid(TimestampError::MissingKey);
        }
    };

    debug!(
        value_len = raw.len(),
        query_len = query_string.len(),
        "timestamp: attempting to parse value"
    );

    let value = match parse_timestamp(raw) {
        Some(v) => v,
        None => {
            info!("timestamp: could not parse timestamp from query string parameters");
            return Decision::DenyMissingOrInvalid(TimestampError::EmptyOrInvalidValue);
        }
    };

    info!(now, timestamp = value, "timestamp: comparing against server time");

    let range = i128::from(policy.range_secs);
    let max = i128::from(now) + range;
    let min = i128::from(now) - range;

    if i128::from(value) > max {
        info!(timestamp = value, max = %max, range = policy.range_secs, "timestamp: value is above max range");
        return Decision::DenyOutOfRange(TimestampError::OutOfRangeFuture { value, max });
    }

    if i128::from(value) < min {
        info!(timestamp = value, min = %min, range = policy.range_secs, "timestamp: value is below min range");
        return Decision::DenyOutOfRange(TimestampError::OutOfRangePast { value, min });
    }

    Decision::Allow
}

/// Validator bound to a fixed policy.
pub struct TimestampValidator {
    policy: TimestampPolicy,
}

impl TimestampValidator {
    /// Create a new validator with the given effective policy.
    pub fn new(policy: TimestampPolicy) -> Self {
        Self { policy }
    }

    /// Validate a raw query string against `now`.
    pub fn validate(&self, query_string: &[u8], now: i64) -> Decision {
        validate(query_string, &self.policy, now)
    }
}
