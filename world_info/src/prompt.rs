//! Prompt formatting for activated world info.

use serde::{Deserialize, Serialize};

use crate::activation::{total_tokens, ActivatedEntry};

/// How activated entries are rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Emit each entry's comment as a `[comment]` line before its content.
    pub include_comments: bool,

    /// Section heading used by [`WorldInfoPrompt::to_prompt_string`].
    pub heading: String,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            include_comments: false,
            heading: "World Information".to_string(),
        }
    }
}

/// Join activated entries into prompt text, separated by blank lines.
///
/// Entries with blank content are skipped.
pub fn format_entries(entries: &[ActivatedEntry<'_>], options: &FormatOptions) -> String {
    entries
        .iter()
        .filter(|a| !a.content().trim().is_empty())
        .map(|a| match a.comment().filter(|c| options.include_comments && !c.is_empty()) {
            Some(comment) => format!("[{}]\n{}", comment, a.content()),
            None => a.content().to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The world info section of a generation prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldInfoPrompt {
    pub heading: String,

    /// Formatted entries, without the heading.
    pub body: String,

    /// Number of entries rendered into the body.
    pub entry_count: usize,

    /// Estimated tokens of the activated content.
    pub token_estimate: usize,
}

impl WorldInfoPrompt {
    pub fn from_entries(entries: &[ActivatedEntry<'_>], options: &FormatOptions) -> Self {
        Self {
            heading: options.heading.clone(),
            body: format_entries(entries, options),
            entry_count: entries
                .iter()
                .filter(|a| !a.content().trim().is_empty())
                .count(),
            token_estimate: total_tokens(entries),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Format as a prompt section. Empty activations render as an empty string.
    pub fn to_prompt_string(&self) -> String {
        if self.is_empty() {
            return String::new();
        }

        let mut prompt = String::new();
        prompt.push_str(&format!("## {}\n", self.heading));
        prompt.push_str(&self.body);
        prompt.push_str("\n\n");
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lorebook::Entry;

    fn activated(entry: &Entry) -> ActivatedEntry<'_> {
        ActivatedEntry {
            entry,
            lorebook: "test",
            depth: 0,
        }
    }

    fn sample() -> Vec<Entry> {
        vec![
            Entry::new("1", "Dragons breathe fire.").with_comment("Dragons"),
            Entry::new("2", "   "),
            Entry::new("3", "The castle sits on a cliff."),
        ]
    }

    #[test]
    fn test_format_without_comments() {
        let entries = sample();
        let list: Vec<_> = entries.iter().map(activated).collect();

        let text = format_entries(&list, &FormatOptions::default());
        assert_eq!(text, "Dragons breathe fire.\n\nThe castle sits on a cliff.");
    }

    #[test]
    fn test_format_with_comments() {
        let entries = sample();
        let list: Vec<_> = entries.iter().map(activated).collect();
        let options = FormatOptions {
            include_comments: true,
            ..Default::default()
        };

        let text = format_entries(&list, &options);
        assert_eq!(text, "[Dragons]\nDragons breathe fire.\n\nThe castle sits on a cliff.");
    }

    #[test]
    fn test_prompt_section() {
        let entries = sample();
        let list: Vec<_> = entries.iter().map(activated).collect();

        let prompt = WorldInfoPrompt::from_entries(&list, &FormatOptions::default());
        assert_eq!(prompt.entry_count, 2);

        let text = prompt.to_prompt_string();
        assert!(text.starts_with("## World Information\n"));
        assert!(text.contains("Dragons breathe fire."));
        assert!(text.ends_with("cliff.\n\n"));
    }

    #[test]
    fn test_empty_prompt() {
        let prompt = WorldInfoPrompt::from_entries(&[], &FormatOptions::default());
        assert!(prompt.is_empty());
        assert_eq!(prompt.to_prompt_string(), "");
    }
}
