// SPDX-License-Identifier: PMPL-1.0-or-later
//! Startup error types for the timestamp gate service

use crate::config::ConfigError;
use thiserror::Error;

/// Errors raised while assembling the service
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AppError>;
