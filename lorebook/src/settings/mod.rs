//! Activation settings - the per-call tunables of world info scanning.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// Fixed characters-per-token approximation used for every estimate.
pub const CHARS_PER_TOKEN: usize = 4;

/// Estimate the token cost of `text` as `ceil(chars / 4)`.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// Configuration for one activation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivationSettings {
    /// How far back into the story to scan, in tokens.
    pub scan_depth: usize,

    /// Maximum estimated tokens of activated content.
    pub token_budget: usize,

    /// Maximum number of recursive re-scans.
    pub recursion_depth: u32,

    /// Whether activated content is re-scanned for further triggers.
    pub enable_recursion: bool,
}

impl Default for ActivationSettings {
    fn default() -> Self {
        Self {
            scan_depth: 2000,
            token_budget: 1800,
            recursion_depth: 3,
            enable_recursion: true,
        }
    }
}

impl ActivationSettings {
    /// The scan window size in characters.
    pub fn scan_chars(&self) -> usize {
        self.scan_depth.saturating_mul(CHARS_PER_TOKEN)
    }

    /// Parse settings from TOML. Missing fields take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string(self)
    }
}
