// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the timestamp gate.
//!
//! Two directives are recognised at main and location scope:
//!
//! - `timestamp` (`on` | `off`, default `off`)
//! - `timestamp_range` (seconds, default 180)
//!
//! A scope that leaves a directive unset inherits it from its parent; the
//! effective [`TimestampPolicy`] is computed once at startup.

use serde::{Deserialize, Deserializer, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_PATH_ENV: &str = "TIMESTAMP_GATE_CONFIG";

/// Routes owned by the service itself.
const RESERVED_PATHS: &[&str] = &["/health", "/healthz", "/check"];

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {directive}: expected \"on\" or \"off\"")]
    InvalidFlag { directive: String, value: String },

    #[error("Invalid value {value:?} for {directive}: expected a non-negative integer")]
    InvalidNumber { directive: String, value: String },

    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Location prefix must start with '/': {0:?}")]
    InvalidPrefix(String),

    #[error("Duplicate location prefix: {0:?}")]
    DuplicateLocation(String),

    #[error("Metrics path must start with '/' and not shadow the root, a service route or a gated location: {0:?}")]
    InvalidMetricsPath(String),

    #[error("Invalid bind address {addr:?}: {source}")]
    InvalidBindAddr {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

/// Parse an `on`/`off` directive value (case-insensitive).
pub fn parse_flag(directive: &str, value: &str) -> Result<bool, ConfigError> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("on") {
        Ok(true)
    } else if trimmed.eq_ignore_ascii_case("off") {
        Ok(false)
    } else {
        Err(ConfigError::InvalidFlag {
            directive: directive.to_string(),
            value: value.to_string(),
        })
    }
}

/// Parse a non-negative decimal directive value.
pub fn parse_seconds(directive: &str, value: &str) -> Result<u64, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConfigError::InvalidNumber {
            directive: directive.to_string(),
            value: value.to_string(),
        });
    }
    trimmed.parse().map_err(|_| ConfigError::InvalidNumber {
        directive: directive.to_string(),
        value: value.to_string(),
    })
}

/// Directive values as written in one scope. `None` means "not set here".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeDirectives {
    /// `timestamp on|off`
    #[serde(
        rename = "timestamp",
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub enabled: Option<bool>,

    /// `timestamp_range <seconds>`
    #[serde(
        rename = "timestamp_range",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub range_secs: Option<u64>,
}

impl ScopeDirectives {
    /// Fill unset directives with built-in defaults.
    pub fn effective(&self) -> TimestampPolicy {
        let defaults = TimestampPolicy::default();
        TimestampPolicy {
            enabled: self.enabled.unwrap_or(defaults.enabled),
            range_secs: self.range_secs.unwrap_or(defaults.range_secs),
        }
    }
}

/// Merge a child scope onto its parent: a value set in the child wins,
/// otherwise the parent's value is inherited.
pub fn merge(parent: &ScopeDirectives, child: &ScopeDirectives) -> ScopeDirectives {
    ScopeDirectives {
        enabled: child.enabled.or(parent.enabled),
        range_secs: child.range_secs.or(parent.range_secs),
    }
}

/// Effective, immutable policy handed to the validator for each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampPolicy {
    pub enabled: bool,
    pub range_secs: u64,
}

impl Default for TimestampPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            range_secs: default_range_secs(),
        }
    }
}

/// Directives applied to requests whose path starts with `prefix`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationConfig {
    pub prefix: String,

    #[serde(flatten)]
    pub directives: ScopeDirectives,
}

/// Configuration for the timestamp gate service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Main-scope directives
    #[serde(flatten)]
    pub directives: ScopeDirectives,

    /// Per-location overrides, matched by longest path prefix
    #[serde(default)]
    pub locations: Vec<LocationConfig>,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true", deserialize_with = "deserialize_required_flag")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_range_secs() -> u64 {
    180 // three minutes
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            directives: ScopeDirectives::default(),
            locations: Vec::new(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

/// Flags may be written as JSON booleans or as `"on"`/`"off"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum FlagRepr {
    Bool(bool),
    Text(String),
}

impl FlagRepr {
    fn into_bool(self, directive: &str) -> Result<bool, ConfigError> {
        match self {
            FlagRepr::Bool(b) => Ok(b),
            FlagRepr::Text(s) => parse_flag(directive, &s),
        }
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<FlagRepr>::deserialize(deserializer)?
        .map(|flag| flag.into_bool("timestamp"))
        .transpose()
        .map_err(serde::de::Error::custom)
}

fn deserialize_required_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    FlagRepr::deserialize(deserializer)?
        .into_bool("metrics.enabled")
        .map_err(serde::de::Error::custom)
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Starts from defaults, applies the JSON file named by
    /// `TIMESTAMP_GATE_CONFIG` if set, then environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(addr) = lookup("BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(v) = lookup("TIMESTAMP") {
            config.directives.enabled = Some(parse_flag("TIMESTAMP", &v)?);
        }
        if let Some(v) = lookup("TIMESTAMP_RANGE") {
            config.directives.range_secs = Some(parse_seconds("TIMESTAMP_RANGE", &v)?);
        }
        if let Some(v) = lookup("METRICS_ENABLED") {
            config.metrics.enabled = parse_flag("METRICS_ENABLED", &v)?;
        }

        config.check()?;
        Ok(config)
    }

    /// Read a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reject location tables and routes the service cannot serve.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.metrics.enabled && !self.metrics_path_is_servable() {
            return Err(ConfigError::InvalidMetricsPath(self.metrics.path.clone()));
        }

        let mut seen = std::collections::HashSet::new();
        for location in &self.locations {
            if !location.prefix.starts_with('/') {
                return Err(ConfigError::InvalidPrefix(location.prefix.clone()));
            }
            if !seen.insert(location.prefix.as_str()) {
                return Err(ConfigError::DuplicateLocation(location.prefix.clone()));
            }
        }
        Ok(())
    }

    /// The metrics route is not gated, so it must not take over `/`, a
    /// service route, or a path under a location that enables the gate.
    fn metrics_path_is_servable(&self) -> bool {
        let path = self.metrics.path.as_str();
        if !path.starts_with('/') || path == "/" || RESERVED_PATHS.contains(&path) {
            return false;
        }

        let covering = self
            .locations
            .iter()
            .filter(|loc| path.starts_with(loc.prefix.as_str()))
            .max_by_key(|loc| loc.prefix.len());
        match covering {
            Some(loc) => !merge(&self.directives, &loc.directives).effective().enabled,
            None => true,
        }
    }

    /// Parse the bind address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_addr
            .parse()
            .map_err(|source| ConfigError::InvalidBindAddr {
                addr: self.bind_addr.clone(),
                source,
            })
    }
}
