//! Token budget enforcement.

use super::ActivatedEntry;

/// Keep entries in order until the next one would exceed `budget` tokens.
///
/// Enumeration stops at the first entry that does not fit; nothing after it
/// is considered, even if it would fit on its own.
pub fn apply_token_budget<'a>(
    entries: Vec<ActivatedEntry<'a>>,
    budget: usize,
) -> Vec<ActivatedEntry<'a>> {
    let total = entries.len();
    let mut used = 0;
    let mut kept = Vec::with_capacity(total);

    for activated in entries {
        let cost = activated.token_cost();
        if used + cost > budget {
            tracing::debug!(
                budget,
                used,
                dropped = total - kept.len(),
                first_dropped = %activated.entry.id,
                "world info token budget reached"
            );
            break;
        }
        used += cost;
        kept.push(activated);
    }

    kept
}

/// Total estimated tokens of `entries`.
pub fn total_tokens(entries: &[ActivatedEntry<'_>]) -> usize {
    entries.iter().map(ActivatedEntry::token_cost).sum()
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

    #[test]
    fn test_budget_stops_at_first_overflow() {
        let a = Entry::new("a", "x".repeat(20)); // 5 tokens
        let b = Entry::new("b", "x".repeat(40)); // 10 tokens
        let c = Entry::new("c", "x".repeat(4)); // 1 token, would fit alone

        let kept = apply_token_budget(vec![activated(&a), activated(&b), activated(&c)], 12);
        let ids: Vec<_> = kept.iter().map(|x| x.entry.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
        assert_eq!(total_tokens(&kept), 5);
    }

    #[test]
    fn test_exact_fit_is_kept() {
        let a = Entry::new("a", "x".repeat(40));
        let kept = apply_token_budget(vec![activated(&a)], 10);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_zero_budget_keeps_free_entries() {
        let empty = Entry::new("empty", "");
        let full = Entry::new("full", "text");
        let kept = apply_token_budget(vec![activated(&empty), activated(&full)], 0);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].entry.id.as_str(), "empty");
    }
}
