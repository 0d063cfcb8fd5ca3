//! Import of persisted lorebooks.
//!
//! Two JSON shapes are in circulation:
//! - **standalone**: a world info file whose `entries` is an object keyed by
//!   numeric strings (`key`, `keysecondary`, `order`, `disable`, ...)
//! - **character book**: the V2 character-card lorebook whose `entries` is an
//!   array (`keys`, `secondary_keys`, `insertion_order`, `enabled`, ...)
//!
//! Both are normalized into [`Entry`](crate::Entry) so activation only ever
//! sees one shape.

mod character_book;
mod standalone;

pub use character_book::*;
pub use standalone::*;

use serde_json::Value;

use crate::book::Lorebook;
use crate::entries::{split_slash_wrapped, TriggerKey};
use crate::error::{LorebookError, Result};

/// The persisted shape detected in a JSON document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LorebookFormat {
    Standalone,
    CharacterBook,
    CharacterCard,
}

/// Detect which persisted shape `value` has.
pub fn detect_format(value: &Value) -> Option<LorebookFormat> {
    match value.get("entries") {
        Some(Value::Object(_)) => return Some(LorebookFormat::Standalone),
        Some(Value::Array(_)) => return Some(LorebookFormat::CharacterBook),
        _ => {}
    }

    value
        .get("data")
        .and_then(|data| data.get("character_book"))
        .filter(|book| book.is_object())
        .map(|_| LorebookFormat::CharacterCard)
}

impl Lorebook {
    /// Parse any supported lorebook JSON document.
    ///
    /// `fallback_name` is used when the document does not name itself
    /// (standalone files are usually named after their file).
    pub fn from_json(json: &str, fallback_name: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json_value(value, fallback_name)
    }

    pub fn from_json_value(value: Value, fallback_name: &str) -> Result<Self> {
        match detect_format(&value) {
            Some(LorebookFormat::Standalone) => {
                let file: StandaloneFile = serde_json::from_value(value)?;
                Ok(file.into_lorebook(fallback_name))
            }
            Some(LorebookFormat::CharacterBook) => {
                let book: CharacterBook = serde_json::from_value(value)?;
                Ok(book.into_lorebook(fallback_name))
            }
            Some(LorebookFormat::CharacterCard) => {
                let card: CharacterCard = serde_json::from_value(value)?;
                Ok(card.into_lorebook(fallback_name))
            }
            None => Err(LorebookError::UnrecognizedFormat(
                "expected an `entries` object, an `entries` array or `data.character_book`".into(),
            )),
        }
    }
}

/// Normalize one persisted key string.
///
/// An explicit regex flag wins. Without one, the slash-wrapped
/// `/pattern/flags` convention marks a pattern.
pub(crate) fn normalize_key(raw: &str, use_regex: Option<bool>) -> TriggerKey {
    let use_regex = use_regex.unwrap_or_else(|| split_slash_wrapped(raw).is_some());
    TriggerKey::parse(raw, use_regex)
}

pub(crate) fn normalize_keys(raw: &[String], use_regex: Option<bool>) -> Vec<TriggerKey> {
    raw.iter().map(|k| normalize_key(k, use_regex)).collect()
}

/// Render a persisted id (number or string) as entry id text.
pub(crate) fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Resolve the probability gate from optional persisted fields.
///
/// Files that carry a probability below 100 without saying whether to use it
/// get the gate enabled.
pub(crate) fn probability_gate(
    probability: Option<f64>,
    use_probability: Option<bool>,
) -> (f64, bool) {
    let chance = probability.unwrap_or(100.0).clamp(0.0, 100.0);
    let enabled = use_probability.unwrap_or(chance < 100.0);
    (chance, enabled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format(&json!({"entries": {}})), Some(LorebookFormat::Standalone));
        assert_eq!(detect_format(&json!({"entries": []})), Some(LorebookFormat::CharacterBook));
        assert_eq!(
            detect_format(&json!({"data": {"character_book": {"entries": []}}})),
            Some(LorebookFormat::CharacterCard)
        );
        assert_eq!(detect_format(&json!({"name": "nothing"})), None);
    }

    #[test]
    fn test_unrecognized_format() {
        let err = Lorebook::from_json(r#"{"pages": []}"#, "x").unwrap_err();
        assert!(matches!(err, LorebookError::UnrecognizedFormat(_)));

        let err = Lorebook::from_json("not json", "x").unwrap_err();
        assert!(matches!(err, LorebookError::Json(_)));
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("dragon", None), TriggerKey::literal("dragon"));
        assert_eq!(normalize_key("/drag.n/i", None), TriggerKey::pattern_with_flags("drag.n", "i"));
        assert_eq!(normalize_key("/drag.n/i", Some(false)), TriggerKey::literal("/drag.n/i"));
        assert_eq!(normalize_key("drag.n", Some(true)), TriggerKey::pattern("drag.n"));
    }

    #[test]
    fn test_probability_gate() {
        assert_eq!(probability_gate(None, None), (100.0, false));
        assert_eq!(probability_gate(Some(40.0), None), (40.0, true));
        assert_eq!(probability_gate(Some(40.0), Some(false)), (40.0, false));
        assert_eq!(probability_gate(Some(250.0), Some(true)), (100.0, true));
    }

    #[test]
    fn test_both_shapes_normalize_alike() {
        let standalone = json!({
            "entries": {
                "0": {
                    "uid": 0,
                    "key": ["dragon"],
                    "keysecondary": ["fire"],
                    "content": "Dragons breathe fire.",
                    "selective": true,
                    "selectiveLogic": 3,
                    "order": 250,
                    "disable": false
                }
            }
        });
        let card_book = json!({
            "entries": [{
                "id": 0,
                "keys": ["dragon"],
                "secondary_keys": ["fire"],
                "content": "Dragons breathe fire.",
                "selective": true,
                "insertion_order": 250,
                "enabled": true,
                "extensions": { "selectiveLogic": 3 }
            }]
        });

        let a = Lorebook::from_json_value(standalone, "a").unwrap();
        let b = Lorebook::from_json_value(card_book, "b").unwrap();

        assert_eq!(a.entries, b.entries);
    }
}
