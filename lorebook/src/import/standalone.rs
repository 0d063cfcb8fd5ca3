//! Standalone world info files.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use super::{id_text, normalize_keys, probability_gate};
use crate::book::Lorebook;
use crate::entries::{Entry, EntryId, SelectiveLogic, DEFAULT_INSERTION_ORDER};

/// A standalone world info file: `{ "entries": { "0": {...}, "1": {...} } }`.
#[derive(Debug, Deserialize, Clone)]
pub struct StandaloneFile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub entries: HashMap<String, StandaloneEntry>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct StandaloneEntry {
    #[serde(default)]
    pub uid: Option<Value>,
    #[serde(default)]
    pub key: Vec<String>,
    #[serde(alias = "keysecondary", default)]
    pub key_secondary: Vec<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub constant: Option<bool>,
    #[serde(default)]
    pub selective: Option<bool>,
    #[serde(default)]
    pub selective_logic: Option<i64>,
    #[serde(default)]
    pub order: Option<i64>,
    #[serde(default)]
    pub disable: Option<bool>,
    #[serde(default)]
    pub prevent_recursion: Option<bool>,
    #[serde(default)]
    pub delay_until_recursion: Option<bool>,
    #[serde(default)]
    pub probability: Option<f64>,
    #[serde(default)]
    pub use_probability: Option<bool>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub case_sensitive: Option<bool>,
    #[serde(default)]
    pub match_whole_words: Option<bool>,
    #[serde(default)]
    pub use_regex: Option<bool>,
}

impl StandaloneEntry {
    /// Normalize into an [`Entry`]. `map_key` is the id used when `uid` is absent.
    pub fn into_entry(self, map_key: &str) -> Entry {
        let id = self
            .uid
            .as_ref()
            .and_then(id_text)
            .unwrap_or_else(|| map_key.to_string());
        let (probability, use_probability) =
            probability_gate(self.probability, self.use_probability);
        let selective = self.selective.unwrap_or(!self.key_secondary.is_empty());

        Entry {
            id: EntryId(id),
            keys: normalize_keys(&self.key, self.use_regex),
            secondary_keys: normalize_keys(&self.key_secondary, self.use_regex),
            content: self.content,
            comment: self.comment.filter(|c| !c.is_empty()),
            enabled: !self.disable.unwrap_or(false),
            constant: self.constant.unwrap_or(false),
            selective,
            selective_logic: self
                .selective_logic
                .map(SelectiveLogic::from)
                .unwrap_or_default(),
            insertion_order: self.order.unwrap_or(DEFAULT_INSERTION_ORDER),
            case_sensitive: self.case_sensitive.unwrap_or(false),
            match_whole_words: self.match_whole_words.unwrap_or(false),
            probability,
            use_probability,
            group: self.group.filter(|g| !g.trim().is_empty()),
            prevent_recursion: self.prevent_recursion.unwrap_or(false),
            delay_until_recursion: self.delay_until_recursion.unwrap_or(false),
        }
    }
}

impl StandaloneFile {
    /// Normalize into a [`Lorebook`], ordering entries by their numeric map key.
    pub fn into_lorebook(self, fallback_name: &str) -> Lorebook {
        let mut keyed: Vec<_> = self.entries.into_iter().collect();
        keyed.sort_by(|(a, _), (b, _)| {
            let a_num = a.parse::<u64>().unwrap_or(u64::MAX);
            let b_num = b.parse::<u64>().unwrap_or(u64::MAX);
            a_num.cmp(&b_num).then_with(|| a.cmp(b))
        });

        Lorebook {
            name: self
                .name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| fallback_name.to_string()),
            description: self.description,
            entries: keyed
                .into_iter()
                .map(|(key, entry)| entry.into_entry(&key))
                .collect(),
        }
    }
}

/// Parse a standalone world info file.
pub fn parse_standalone(json: &str, name: &str) -> crate::Result<Lorebook> {
    let file: StandaloneFile = serde_json::from_str(json)?;
    Ok(file.into_lorebook(name))
}
