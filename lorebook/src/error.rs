//! Error types for loading lorebooks and settings.

use thiserror::Error;

/// Errors raised while normalizing persisted lorebook data or settings.
///
/// Activation itself never fails; these only surface at the loading boundary.
#[derive(Error, Debug)]
pub enum LorebookError {
    /// Malformed JSON, or JSON that does not fit the detected shape.
    #[error("Invalid lorebook JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed settings file.
    #[error("Invalid settings TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON that is neither a standalone world info file nor a V2 character book.
    #[error("Unrecognized lorebook format: {0}")]
    UnrecognizedFormat(String),
}

/// Convenience result alias for this crate.
pub type Result<T> = std::result::Result<T, LorebookError>;
