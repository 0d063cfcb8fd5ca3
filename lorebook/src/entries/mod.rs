//! Lorebook entry definitions.

mod key;
mod logic;

pub use key::*;
pub use logic::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::settings::estimate_tokens;

/// Identifier of an entry within its lorebook.
///
/// Opaque text: imported files use numeric uids, cards may omit ids entirely.
/// Uniqueness is only meaningful inside one lorebook.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create a fresh random ID for entries persisted without one.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntryId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EntryId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Default insertion order for entries that do not specify one.
pub const DEFAULT_INSERTION_ORDER: i64 = 100;

/// A single world info entry: a trigger condition plus the content to inject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,

    /// Primary triggers. Any one matching satisfies the primary condition.
    pub keys: Vec<TriggerKey>,

    /// Secondary triggers, consulted only for selective entries.
    pub secondary_keys: Vec<TriggerKey>,

    /// Text inserted into the prompt when the entry is active.
    pub content: String,

    /// Label for the prompt formatter. Ignored during activation.
    pub comment: Option<String>,

    pub enabled: bool,

    /// Activate regardless of keys (still subject to the probability gate).
    pub constant: bool,

    pub selective: bool,
    pub selective_logic: SelectiveLogic,

    /// Sort key in the prompt (ascending) and weight inside a group.
    pub insertion_order: i64,

    pub case_sensitive: bool,
    pub match_whole_words: bool,

    /// Activation chance in percent (0-100), honored when `use_probability` is set.
    pub probability: f64,
    pub use_probability: bool,

    /// Inclusion group. Entries sharing a group are mutually exclusive.
    pub group: Option<String>,

    /// Keep this entry's content out of recursive scans.
    pub prevent_recursion: bool,

    /// Only eligible once recursion has started (depth >= 1).
    pub delay_until_recursion: bool,
}

impl Entry {
    /// Create an enabled, non-constant entry with no keys.
    pub fn new(id: impl Into<EntryId>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            keys: Vec::new(),
            secondary_keys: Vec::new(),
            content: content.into(),
            comment: None,
            enabled: true,
            constant: false,
            selective: false,
            selective_logic: SelectiveLogic::default(),
            insertion_order: DEFAULT_INSERTION_ORDER,
            case_sensitive: false,
            match_whole_words: false,
            probability: 100.0,
            use_probability: false,
            group: None,
            prevent_recursion: false,
            delay_until_recursion: false,
        }
    }

    /// Add a literal primary key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.keys.push(TriggerKey::Literal(key.into()));
        self
    }

    /// Add a primary key of any kind.
    pub fn with_trigger(mut self, key: TriggerKey) -> Self {
        self.keys.push(key);
        self
    }

    /// Add a literal secondary key and mark the entry selective.
    pub fn with_secondary_key(mut self, key: impl Into<String>) -> Self {
        self.secondary_keys.push(TriggerKey::Literal(key.into()));
        self.selective = true;
        self
    }

    /// Add a secondary key of any kind and mark the entry selective.
    pub fn with_secondary_trigger(mut self, key: TriggerKey) -> Self {
        self.secondary_keys.push(key);
        self.selective = true;
        self
    }

    pub fn with_selective_logic(mut self, logic: SelectiveLogic) -> Self {
        self.selective = true;
        self.selective_logic = logic;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_constant(mut self, constant: bool) -> Self {
        self.constant = constant;
        self
    }

    pub fn with_insertion_order(mut self, order: i64) -> Self {
        self.insertion_order = order;
        self
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_whole_words(mut self, whole_words: bool) -> Self {
        self.match_whole_words = whole_words;
        self
    }

    /// Enable the probability gate with the given chance (clamped to 0-100).
    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = probability.clamp(0.0, 100.0);
        self.use_probability = true;
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_prevent_recursion(mut self, prevent: bool) -> Self {
        self.prevent_recursion = prevent;
        self
    }

    pub fn with_delay_until_recursion(mut self, delay: bool) -> Self {
        self.delay_until_recursion = delay;
        self
    }

    /// The trimmed group name, if the entry belongs to one.
    pub fn group_key(&self) -> Option<&str> {
        self.group
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
    }

    /// Selection weight inside an inclusion group.
    pub fn group_weight(&self) -> u64 {
        if self.insertion_order > 0 {
            self.insertion_order as u64
        } else {
            DEFAULT_INSERTION_ORDER as u64
        }
    }

    /// Estimated prompt cost of the content in tokens.
    pub fn token_cost(&self) -> usize {
        estimate_tokens(&self.content)
    }

    /// Whether any key is matched as a regular expression.
    pub fn uses_regex(&self) -> bool {
        self.keys
            .iter()
            .chain(&self.secondary_keys)
            .any(TriggerKey::is_pattern)
    }

    /// Whether secondary keys take part in activation.
    pub fn has_secondary_condition(&self) -> bool {
        self.selective && !self.secondary_keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_defaults() {
        let entry = Entry::new("1", "Dragons breathe fire.");
        assert!(entry.enabled);
        assert!(!entry.constant);
        assert!(!entry.use_probability);
        assert_eq!(entry.insertion_order, DEFAULT_INSERTION_ORDER);
        assert!(entry.keys.is_empty());
        assert!(!entry.has_secondary_condition());
    }

    #[test]
    fn test_entry_builder() {
        let entry = Entry::new("dragon", "Dragons breathe fire.")
            .with_key("dragon")
            .with_secondary_key("fire")
            .with_selective_logic(SelectiveLogic::AndAll)
            .with_comment("Dragons")
            .with_insertion_order(300)
            .with_probability(150.0);

        assert_eq!(entry.keys, vec![TriggerKey::literal("dragon")]);
        assert!(entry.has_secondary_condition());
        assert_eq!(entry.selective_logic, SelectiveLogic::AndAll);
        assert_eq!(entry.comment.as_deref(), Some("Dragons"));
        assert_eq!(entry.probability, 100.0);
        assert!(entry.use_probability);
        assert!(!entry.uses_regex());
    }

    #[test]
    fn test_group_key_trims() {
        assert_eq!(Entry::new("a", "").with_group("  weather ").group_key(), Some("weather"));
        assert_eq!(Entry::new("a", "").with_group("   ").group_key(), None);
        assert_eq!(Entry::new("a", "").group_key(), None);
    }

    #[test]
    fn test_group_weight_fallback() {
        assert_eq!(Entry::new("a", "").with_insertion_order(40).group_weight(), 40);
        assert_eq!(Entry::new("a", "").with_insertion_order(0).group_weight(), 100);
        assert_eq!(Entry::new("a", "").with_insertion_order(-5).group_weight(), 100);
    }

    #[test]
    fn test_token_cost() {
        assert_eq!(Entry::new("a", "").token_cost(), 0);
        assert_eq!(Entry::new("a", "abcd").token_cost(), 1);
        assert_eq!(Entry::new("a", "abcde").token_cost(), 2);
    }

    #[test]
    fn test_generated_ids_differ() {
        assert_ne!(EntryId::generate(), EntryId::generate());
    }
}
