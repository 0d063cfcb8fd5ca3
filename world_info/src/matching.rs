//! Trigger key matching.
//!
//! Literal keys match as substrings (or whole words), case-folded unless the
//! entry is case sensitive. Pattern keys are compiled with `fancy_regex`, so
//! look-around and backreferences work; a pattern that fails to compile is
//! logged and treated as a non-match so a single bad key cannot abort a scan.

use regex::Regex;
use std::borrow::Cow;
use std::collections::HashMap;
use thiserror::Error;

use lorebook::{Entry, TriggerKey};

/// Per-entry flags that affect how literal keys match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchFlags {
    pub case_sensitive: bool,
    pub match_whole_words: bool,
}

impl From<&Entry> for MatchFlags {
    fn from(entry: &Entry) -> Self {
        Self {
            case_sensitive: entry.case_sensitive,
            match_whole_words: entry.match_whole_words,
        }
    }
}

/// Why a pattern key could not be compiled.
#[derive(Error, Debug)]
pub enum PatternError {
    #[error("unsupported regex flag '{0}'")]
    UnsupportedFlag(char),

    #[error(transparent)]
    Invalid(#[from] fancy_regex::Error),
}

/// Compile `pattern` with `/.../flags`-style flags.
///
/// `i`, `m` and `s` become inline flags. `g`, `y` and `u` do not change a
/// yes/no test and are accepted as no-ops.
pub fn compile_pattern(pattern: &str, flags: &str) -> Result<fancy_regex::Regex, PatternError> {
    let mut inline = String::new();
    for flag in flags.chars() {
        match flag {
            'i' | 'm' | 's' => {
                if !inline.contains(flag) {
                    inline.push(flag);
                }
            }
            'g' | 'y' | 'u' => {}
            other => return Err(PatternError::UnsupportedFlag(other)),
        }
    }

    let source = if inline.is_empty() {
        pattern.to_string()
    } else {
        format!("(?{}){}", inline, pattern)
    };
    Ok(fancy_regex::Regex::new(&source)?)
}

/// Text being scanned, with its case-folded form computed once.
#[derive(Debug, Clone)]
pub struct ScanText<'a> {
    raw: &'a str,
    folded: String,
}

impl<'a> ScanText<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self {
            raw,
            folded: raw.to_lowercase(),
        }
    }

    pub fn raw(&self) -> &'a str {
        self.raw
    }

    pub fn folded(&self) -> &str {
        &self.folded
    }
}

/// Matches trigger keys, caching compiled expressions for the life of one scan.
///
/// Failed compilations are cached too, so each bad pattern is reported once.
#[derive(Debug, Default)]
pub struct KeyMatcher {
    patterns: HashMap<(String, String), Option<fancy_regex::Regex>>,
    words: HashMap<String, Regex>,
}

impl KeyMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test a single key against `text`.
    pub fn matches(&mut self, key: &TriggerKey, text: &ScanText<'_>, flags: MatchFlags) -> bool {
        if key.is_empty() {
            return false;
        }

        match key {
            TriggerKey::Pattern { pattern, flags: explicit } => {
                let regex_flags = match explicit {
                    Some(f) => f.as_str(),
                    None if flags.case_sensitive => "",
                    None => "i",
                };
                self.pattern(pattern, regex_flags)
                    .is_some_and(|re| re.is_match(text.raw()).unwrap_or(false))
            }
            TriggerKey::Literal(literal) => {
                let (needle, haystack) = if flags.case_sensitive {
                    (Cow::Borrowed(literal.as_str()), text.raw())
                } else {
                    (Cow::Owned(literal.to_lowercase()), text.folded())
                };

                if flags.match_whole_words {
                    self.whole_word(&needle)
                        .is_some_and(|re| re.is_match(haystack))
                } else {
                    haystack.contains(needle.as_ref())
                }
            }
        }
    }

    /// Whether `entry`'s keys are satisfied by `text`.
    ///
    /// At least one primary key must match. For selective entries with
    /// secondary keys, the number of matching secondary keys must then satisfy
    /// the entry's selective logic.
    pub fn entry_matches(&mut self, entry: &Entry, text: &ScanText<'_>) -> bool {
        let flags = MatchFlags::from(entry);

        let primary = entry.keys.iter().any(|key| self.matches(key, text, flags));
        if !primary {
            return false;
        }

        if !entry.has_secondary_condition() {
            return true;
        }

        let matched = entry
            .secondary_keys
            .iter()
            .filter(|key| self.matches(key, text, flags))
            .count();

        entry
            .selective_logic
            .accepts(matched, entry.secondary_keys.len())
    }

    /// Number of distinct patterns compiled (or rejected) so far.
    pub fn cached_patterns(&self) -> usize {
        self.patterns.len() + self.words.len()
    }

    fn pattern(&mut self, pattern: &str, flags: &str) -> Option<&fancy_regex::Regex> {
        self.patterns
            .entry((pattern.to_string(), flags.to_string()))
            .or_insert_with(|| match compile_pattern(pattern, flags) {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::warn!(
                        pattern,
                        flags,
                        error = %e,
                        "invalid trigger pattern, treating as non-match"
                    );
                    None
                }
            })
            .as_ref()
    }

    fn whole_word(&mut self, needle: &str) -> Option<&Regex> {
        if !self.words.contains_key(needle) {
            let re = Regex::new(&format!(r"\b{}\b", regex::escape(needle))).ok()?;
            self.words.insert(needle.to_string(), re);
        }
        self.words.get(needle)
    }
}

/// Test a single key against `text` without a shared cache.
pub fn match_key(key: &TriggerKey, text: &str, flags: MatchFlags) -> bool {
    KeyMatcher::new().matches(key, &ScanText::new(text), flags)
}
