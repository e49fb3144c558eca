// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Per-location policy resolution.
//!
//! Scopes nest as defaults → main → location. Every location's effective
//! policy is merged once when the table is built; lookups only pick the
//! longest matching path prefix. Paths are normalised first so dot
//! segments cannot climb out of one location into another.

use crate::config::{merge, Config, ConfigError, ScopeDirectives, TimestampPolicy};
use tracing::{debug, warn};
use url::Url;

/// Base used to resolve request paths.
const PATH_BASE_URL: &str = "http://localhost/";

/// Resolve `.` and `..` segments (including `%2e` spellings) in a request path.
///
/// The path is joined as a relative reference so a leading `//` is kept as
/// path rather than read as an authority.
pub fn normalize_path(path: &str) -> Option<String> {
    let relative = format!(".{path}");
    Url::parse(PATH_BASE_URL)
        .and_then(|base| base.join(&relative))
        .ok()
        .map(|url| url.path().to_string())
}

#[derive(Debug, Clone)]
struct Location {
    prefix: String,
    policy: TimestampPolicy,
}

/// Immutable table of effective policies.
#[derive(Debug, Clone)]
pub struct ScopeTable {
    main: TimestampPolicy,
    /// Sorted by descending prefix length so the first match is the longest.
    locations: Vec<Location>,
}

impl ScopeTable {
    /// Build the table from a loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        config.check()?;

        let main = merge(&ScopeDirectives::default(), &config.directives);

        let mut locations: Vec<Location> = config
            .locations
            .iter()
            .map(|loc| Location {
                prefix: loc.prefix.clone(),
                policy: merge(&main, &loc.directives).effective(),
            })
            .collect();
        locations.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));

        for loc in &locations {
            debug!(
                prefix = %loc.prefix,
                enabled = loc.policy.enabled,
                range_secs = loc.policy.range_secs,
                "Location policy resolved"
            );
        }

        Ok(Self {
            main: main.effective(),
            locations,
        })
    }

    /// Policy for requests that match no location.
    pub fn main(&self) -> &TimestampPolicy {
        &self.main
    }

    /// Effective policy for a request path.
    ///
    /// A path that cannot be normalised gets the main policy.
    pub fn resolve(&self, path: &str) -> &TimestampPolicy {
        let Some(path) = normalize_path(path) else {
            warn!(path = %path, "Unresolvable request path, using main scope");
            return &self.main;
        };
        self.lookup(&path)
    }

    fn lookup(&self, path: &str) -> &TimestampPolicy {
        self.locations
            .iter()
            .find(|loc| path.starts_with(loc.prefix.as_str()))
            .map(|loc| &loc.policy)
            .unwrap_or(&self.main)
    }
}
