//! Error types for Vastra.

use thiserror::Error;

/// Core error type for all Vastra operations.
///
/// None of these ever reach a chat user: a conversation turn always degrades
/// to a fallback reply. They surface at startup (config, templates) and from
/// the external collaborators (language detection).
#[derive(Error, Debug)]
pub enum VastraError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Language detection failed: {0}")]
    Detection(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, VastraError>;
