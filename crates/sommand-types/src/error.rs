//! Error types for sommand.

use std::io;

/// Errors produced by the sommand framework.
///
/// Per-dispatch failures (no match, permission denial, parse rejection) are
/// not errors; they are reported through dispatch outcomes. These variants
/// cover tree construction, typed argument access, and executor faults.
#[derive(Debug, thiserror::Error)]
pub enum SommandError {
    #[error("config error: {0}")]
    Config(String),

    #[error("argument error: {0}")]
    Argument(String),

    #[error("execution error: {0}")]
    Execution(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, SommandError>;
