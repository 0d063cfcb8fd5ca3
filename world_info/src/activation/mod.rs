//! World info activation - decides which lorebook entries enter the prompt.
//!
//! The activation pass works as follows:
//! 1. **Pooling**: Entries from every lorebook are pooled, tagged with their book
//! 2. **Windowing**: Only the tail of the story text (`scan_depth` tokens) is scanned
//! 3. **Scanning**: Constant entries and entries whose keys match are activated
//! 4. **Recursion**: Content of newly activated entries is scanned again, up to
//!    `recursion_depth` times
//! 5. **Ordering**: Activated entries are sorted by insertion order
//! 6. **Grouping**: Each inclusion group is reduced to one weighted winner
//! 7. **Budgeting**: Entries are kept in order until the token budget runs out

mod budget;
mod groups;
mod state;

pub use budget::*;
pub use groups::*;
pub use state::*;

use rand::Rng;
use serde::Serialize;

use crate::matching::{KeyMatcher, ScanText};
use lorebook::{ActivationSettings, Entry, EntryId, Lorebook};

/// An entry chosen for the prompt, annotated with where it came from.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ActivatedEntry<'a> {
    pub entry: &'a Entry,

    /// Name of the lorebook the entry belongs to.
    pub lorebook: &'a str,

    /// Recursion depth the entry was activated at (0 for the story text itself).
    pub depth: u32,
}

impl<'a> ActivatedEntry<'a> {
    pub fn id(&self) -> &'a EntryId {
        &self.entry.id
    }

    pub fn content(&self) -> &'a str {
        &self.entry.content
    }

    pub fn comment(&self) -> Option<&'a str> {
        self.entry.comment.as_deref()
    }

    pub fn token_cost(&self) -> usize {
        self.entry.token_cost()
    }
}

/// An entry in the activation pool.
#[derive(Debug, Clone, Copy)]
pub struct PooledEntry<'a> {
    pub entry: &'a Entry,
    pub lorebook: &'a str,
}

/// Pool the entries of all lorebooks, in book order then entry order.
pub fn pool_entries(lorebooks: &[Lorebook]) -> Vec<PooledEntry<'_>> {
    lorebooks
        .iter()
        .flat_map(|book| {
            book.entries.iter().map(move |entry| PooledEntry {
                entry,
                lorebook: book.name.as_str(),
            })
        })
        .collect()
}

/// The last `max_chars` characters of `text` (all of it when shorter).
pub fn scan_window(text: &str, max_chars: usize) -> &str {
    let total = text.chars().count();
    if total <= max_chars {
        return text;
    }

    match text.char_indices().nth(total - max_chars) {
        Some((start, _)) => &text[start..],
        None => "",
    }
}

/// Whether `entry` survives its probability gate.
pub fn passes_probability(entry: &Entry, rng: &mut impl Rng) -> bool {
    if !entry.use_probability {
        return true;
    }
    rng.random_range(0.0..100.0) < entry.probability
}

/// Everything one activation call produced, for callers that want more than
/// the final list.
#[derive(Debug, Clone)]
pub struct ActivationReport<'a> {
    /// Final entries: sorted, grouped and within budget.
    pub entries: Vec<ActivatedEntry<'a>>,

    /// Processed ids and per-depth counts from the scan.
    pub state: ActivationState,

    /// Entries removed because another member of their group won.
    pub dropped_by_group: usize,

    /// Entries removed by the token budget.
    pub dropped_by_budget: usize,
}

impl ActivationReport<'_> {
    fn empty() -> Self {
        Self {
            entries: Vec::new(),
            state: ActivationState::new(),
            dropped_by_group: 0,
            dropped_by_budget: 0,
        }
    }

    /// Estimated tokens of the final entries.
    pub fn token_count(&self) -> usize {
        total_tokens(&self.entries)
    }
}

/// The world info engine. Holds settings only; every call is independent.
#[derive(Debug, Clone, Default)]
pub struct WorldInfoEngine {
    settings: ActivationSettings,
}

impl WorldInfoEngine {
    /// Create a new engine with the given settings.
    pub fn new(settings: ActivationSettings) -> Self {
        Self { settings }
    }

    /// Create an engine with default settings.
    pub fn with_defaults() -> Self {
        Self::new(ActivationSettings::default())
    }

    pub fn settings(&self) -> &ActivationSettings {
        &self.settings
    }

    /// Activate entries for `scan_text` using thread-local randomness.
    pub fn activate<'a>(
        &self,
        lorebooks: &'a [Lorebook],
        scan_text: &str,
    ) -> Vec<ActivatedEntry<'a>> {
        self.activate_with_rng(lorebooks, scan_text, &mut rand::rng())
    }

    /// Activate entries for `scan_text`, drawing randomness from `rng`.
    pub fn activate_with_rng<'a>(
        &self,
        lorebooks: &'a [Lorebook],
        scan_text: &str,
        rng: &mut impl Rng,
    ) -> Vec<ActivatedEntry<'a>> {
        self.activate_report(lorebooks, scan_text, rng).entries
    }

    /// Run a full activation and report what happened along the way.
    pub fn activate_report<'a>(
        &self,
        lorebooks: &'a [Lorebook],
        scan_text: &str,
        rng: &mut impl Rng,
    ) -> ActivationReport<'a> {
        if lorebooks.is_empty() {
            return ActivationReport::empty();
        }

        let pool = pool_entries(lorebooks);
        let window = scan_window(scan_text, self.settings.scan_chars());

        let mut state = ActivationState::new();
        let mut matcher = KeyMatcher::new();
        let mut activated = self.activate_at_depth(&pool, window, 0, &mut state, &mut matcher, rng);

        activated.sort_by_key(|a| a.entry.insertion_order);

        let before_groups = activated.len();
        let grouped = resolve_groups(activated, rng);
        let before_budget = grouped.len();
        let entries = apply_token_budget(grouped, self.settings.token_budget);

        tracing::debug!(
            lorebooks = lorebooks.len(),
            pooled = pool.len(),
            activated = before_groups,
            kept = entries.len(),
            "world info activation finished"
        );

        ActivationReport {
            dropped_by_group: before_groups - before_budget,
            dropped_by_budget: before_budget - entries.len(),
            entries,
            state,
        }
    }

    /// Scan one depth level and recurse into newly activated content.
    ///
    /// Returns the entries activated here and at every deeper level, in
    /// discovery order. Beyond `recursion_depth` nothing activates; recursion
    /// itself only continues while `depth < recursion_depth`, so at most
    /// `recursion_depth` re-scans happen.
    pub fn activate_at_depth<'a>(
        &self,
        pool: &[PooledEntry<'a>],
        scan_text: &str,
        depth: u32,
        state: &mut ActivationState,
        matcher: &mut KeyMatcher,
        rng: &mut impl Rng,
    ) -> Vec<ActivatedEntry<'a>> {
        if depth > self.settings.recursion_depth {
            return Vec::new();
        }

        let text = ScanText::new(scan_text);
        let mut activated = Vec::new();

        for pooled in pool {
            let entry = pooled.entry;
            if state.is_processed(&entry.id) || !entry.enabled {
                continue;
            }
            if entry.delay_until_recursion && depth == 0 {
                continue;
            }

            let triggered = entry.constant || matcher.entry_matches(entry, &text);
            if !triggered || !passes_probability(entry, rng) {
                continue;
            }

            state.mark_processed(entry.id.clone());
            tracing::trace!(
                entry = %entry.id,
                lorebook = pooled.lorebook,
                depth,
                "entry activated"
            );
            activated.push(ActivatedEntry {
                entry,
                lorebook: pooled.lorebook,
                depth,
            });
        }

        state.record_depth(depth, activated.len());
        tracing::debug!(depth, activated = activated.len(), "world info scan pass");

        if self.settings.enable_recursion
            && depth < self.settings.recursion_depth
            && !activated.is_empty()
        {
            let recursive_text = activated
                .iter()
                .filter(|a| !a.entry.prevent_recursion)
                .map(|a| a.content())
                .collect::<Vec<_>>()
                .join("\n\n");

            if !recursive_text.is_empty() {
                let deeper =
                    self.activate_at_depth(pool, &recursive_text, depth + 1, state, matcher, rng);
                activated.extend(deeper);
            }
        }

        activated
    }
}
