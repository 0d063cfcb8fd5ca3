//! V2 character-card lorebooks (`character_book`).

use serde::Deserialize;
use serde_json::Value;

use super::{id_text, normalize_keys, probability_gate};
use crate::book::Lorebook;
use crate::entries::{Entry, EntryId, SelectiveLogic, DEFAULT_INSERTION_ORDER};
use crate::settings::ActivationSettings;

/// A full V2 card. Only the parts relevant to its lorebook are read.
#[derive(Debug, Deserialize, Clone)]
pub struct CharacterCard {
    pub data: CharacterCardData,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CharacterCardData {
    #[serde(default)]
    pub name: Option<String>,
    pub character_book: CharacterBook,
}

impl CharacterCard {
    /// The embedded book, named after the character when it has no name of its own.
    pub fn into_lorebook(self, fallback_name: &str) -> Lorebook {
        let name = self
            .data
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| fallback_name.to_string());
        self.data.character_book.into_lorebook(&name)
    }
}

/// The V2 `character_book` object.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct CharacterBook {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub scan_depth: Option<usize>,
    #[serde(default)]
    pub token_budget: Option<usize>,
    #[serde(default)]
    pub recursive_scanning: Option<bool>,
    #[serde(default)]
    pub entries: Vec<CardEntry>,
}

/// One entry of a V2 `character_book`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct CardEntry {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub secondary_keys: Vec<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub insertion_order: Option<i64>,
    #[serde(default)]
    pub case_sensitive: Option<bool>,
    #[serde(default)]
    pub selective: Option<bool>,
    #[serde(default)]
    pub constant: Option<bool>,
    /// Some exporters write `null` here.
    #[serde(default)]
    pub extensions: Option<CardEntryExtensions>,
}

/// Fields V2 cards carry under `extensions` rather than at the top level.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct CardEntryExtensions {
    #[serde(default, alias = "selectiveLogic")]
    pub selective_logic: Option<i64>,
    #[serde(default)]
    pub probability: Option<f64>,
    #[serde(default, alias = "useProbability")]
    pub use_probability: Option<bool>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default, alias = "preventRecursion")]
    pub prevent_recursion: Option<bool>,
    #[serde(default, alias = "delayUntilRecursion")]
    pub delay_until_recursion: Option<bool>,
    #[serde(default, alias = "matchWholeWords")]
    pub match_whole_words: Option<bool>,
    #[serde(default, alias = "caseSensitive")]
    pub case_sensitive: Option<bool>,
    #[serde(default, alias = "useRegex")]
    pub use_regex: Option<bool>,
}

impl CardEntry {
    /// Normalize into an [`Entry`]. Entries without an id get a generated one.
    pub fn into_entry(self) -> Entry {
        let ext = self.extensions.unwrap_or_default();
        let id = self
            .id
            .as_ref()
            .and_then(id_text)
            .map(EntryId)
            .unwrap_or_else(EntryId::generate);
        let (probability, use_probability) =
            probability_gate(ext.probability, ext.use_probability);
        let selective = self.selective.unwrap_or(!self.secondary_keys.is_empty());

        Entry {
            id,
            keys: normalize_keys(&self.keys, ext.use_regex),
            secondary_keys: normalize_keys(&self.secondary_keys, ext.use_regex),
            content: self.content,
            comment: self.comment.or(self.name).filter(|c| !c.is_empty()),
            enabled: self.enabled.unwrap_or(true),
            constant: self.constant.unwrap_or(false),
            selective,
            selective_logic: ext
                .selective_logic
                .map(SelectiveLogic::from)
                .unwrap_or_default(),
            insertion_order: self.insertion_order.unwrap_or(DEFAULT_INSERTION_ORDER),
            case_sensitive: self.case_sensitive.or(ext.case_sensitive).unwrap_or(false),
            match_whole_words: ext.match_whole_words.unwrap_or(false),
            probability,
            use_probability,
            group: ext.group.filter(|g| !g.trim().is_empty()),
            prevent_recursion: ext.prevent_recursion.unwrap_or(false),
            delay_until_recursion: ext.delay_until_recursion.unwrap_or(false),
        }
    }
}

impl CharacterBook {
    pub fn into_lorebook(self, fallback_name: &str) -> Lorebook {
        Lorebook {
            name: self
                .name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| fallback_name.to_string()),
            description: self.description.filter(|d| !d.is_empty()),
            entries: self.entries.into_iter().map(CardEntry::into_entry).collect(),
        }
    }

    /// Overlay the book's own scan settings onto `base`.
    pub fn settings_over(&self, base: &ActivationSettings) -> ActivationSettings {
        ActivationSettings {
            scan_depth: self.scan_depth.unwrap_or(base.scan_depth),
            token_budget: self.token_budget.unwrap_or(base.token_budget),
            recursion_depth: base.recursion_depth,
            enable_recursion: self.recursive_scanning.unwrap_or(base.enable_recursion),
        }
    }
}

/// Parse a V2 `character_book` object, or a whole card embedding one.
pub fn parse_character_book(json: &str, fallback_name: &str) -> crate::Result<Lorebook> {
    let value: Value = serde_json::from_str(json)?;
    if value.get("data").is_some() {
        let card: CharacterCard = serde_json::from_value(value)?;
        return Ok(card.into_lorebook(fallback_name));
    }
    let book: CharacterBook = serde_json::from_value(value)?;
    Ok(book.into_lorebook(fallback_name))
}
