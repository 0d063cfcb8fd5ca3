//! Trigger keys - the strings that wake an entry up.

use serde::{Deserialize, Serialize};

/// A single trigger key.
///
/// Whether a key is a pattern is decided once, when an entry is normalized,
/// so a literal key that happens to start and end with `/` stays literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKey {
    /// Plain text, matched as a substring or a whole word.
    Literal(String),

    /// A regular expression.
    Pattern {
        pattern: String,
        /// Explicit flags from a `/pattern/flags` key. `None` means the flags
        /// follow the entry's case sensitivity.
        flags: Option<String>,
    },
}

impl TriggerKey {
    /// Create a literal key.
    pub fn literal(text: impl Into<String>) -> Self {
        TriggerKey::Literal(text.into())
    }

    /// Create a pattern key whose flags follow the entry's case sensitivity.
    pub fn pattern(pattern: impl Into<String>) -> Self {
        TriggerKey::Pattern {
            pattern: pattern.into(),
            flags: None,
        }
    }

    /// Create a pattern key with explicit flags.
    pub fn pattern_with_flags(pattern: impl Into<String>, flags: impl Into<String>) -> Self {
        TriggerKey::Pattern {
            pattern: pattern.into(),
            flags: Some(flags.into()),
        }
    }

    /// Normalize a raw key string.
    ///
    /// In literal mode the text is kept verbatim. In regex mode a
    /// `/pattern/flags` key is split into its parts; anything else becomes a
    /// pattern with entry-derived flags.
    pub fn parse(raw: &str, use_regex: bool) -> Self {
        if !use_regex {
            return TriggerKey::literal(raw);
        }

        match split_slash_wrapped(raw) {
            Some((pattern, flags)) => TriggerKey::pattern_with_flags(pattern, flags),
            None => TriggerKey::pattern(raw),
        }
    }

    /// The key text as written by the author (pattern body for patterns).
    pub fn text(&self) -> &str {
        match self {
            TriggerKey::Literal(s) => s,
            TriggerKey::Pattern { pattern, .. } => pattern,
        }
    }

    /// An empty key never matches anything.
    pub fn is_empty(&self) -> bool {
        self.text().is_empty()
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self, TriggerKey::Pattern { .. })
    }
}

impl std::fmt::Display for TriggerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriggerKey::Literal(s) => write!(f, "{}", s),
            TriggerKey::Pattern {
                pattern,
                flags: Some(flags),
            } => write!(f, "/{}/{}", pattern, flags),
            TriggerKey::Pattern { pattern, .. } => write!(f, "{}", pattern),
        }
    }
}

/// Split `/pattern/flags` into `(pattern, flags)`.
///
/// The pattern must be non-empty and the flags drawn from `gimsuy`.
pub fn split_slash_wrapped(raw: &str) -> Option<(&str, &str)> {
    let rest = raw.strip_prefix('/')?;
    let close = rest.rfind('/')?;
    let (pattern, flags) = (&rest[..close], &rest[close + 1..]);

    if pattern.is_empty() || !flags.chars().all(|c| "gimsuy".contains(c)) {
        return None;
    }

    Some((pattern, flags))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_mode_keeps_slashes() {
        let key = TriggerKey::parse("/dragon/i", false);
        assert_eq!(key, TriggerKey::literal("/dragon/i"));
        assert!(!key.is_pattern());
    }

    #[test]
    fn test_regex_mode_splits_flags() {
        let key = TriggerKey::parse("/drag(on|oness)/i", true);
        assert_eq!(key, TriggerKey::pattern_with_flags("drag(on|oness)", "i"));
        assert_eq!(key.to_string(), "/drag(on|oness)/i");
    }

    #[test]
    fn test_regex_mode_bare_pattern() {
        let key = TriggerKey::parse("drag(on|oness)", true);
        assert_eq!(key, TriggerKey::pattern("drag(on|oness)"));
        assert_eq!(key.to_string(), "drag(on|oness)");
    }

    #[test]
    fn test_split_slash_wrapped() {
        assert_eq!(split_slash_wrapped("/a/b/gm"), Some(("a/b", "gm")));
        assert_eq!(split_slash_wrapped("/abc/"), Some(("abc", "")));
        assert_eq!(split_slash_wrapped("//i"), None);
        assert_eq!(split_slash_wrapped("/abc/q"), None);
        assert_eq!(split_slash_wrapped("abc"), None);
        assert_eq!(split_slash_wrapped("/abc"), None);
    }

    #[test]
    fn test_empty_key() {
        assert!(TriggerKey::literal("").is_empty());
        assert!(!TriggerKey::literal(" ").is_empty());
    }
}
