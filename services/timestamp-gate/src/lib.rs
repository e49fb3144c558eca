// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Timestamp Gate
//!
//! This crate provides an access-control filter that admits a request only
//! when its query string carries a `timestamp` close enough to server time:
//!
//! - `timestamp` directive to enable the check per scope (off by default)
//! - `timestamp_range` tolerance in seconds (180 default)
//! - Main and per-location scopes with inheritance
//! - 403 for missing, unparsable, expired or future timestamps

pub mod clock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod query;
pub mod scope;
pub mod validator;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{Config, TimestampPolicy};
pub use scope::ScopeTable;
pub use validator::{Decision, TimestampError, TimestampValidator};
