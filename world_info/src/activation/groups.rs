//! Inclusion groups - mutually exclusive entries.

use rand::Rng;
use std::collections::{HashMap, HashSet};

use super::ActivatedEntry;

/// Collapse every inclusion group to a single winner.
///
/// Entries without a group pass through. A group with several members keeps
/// one, drawn with weight `insertion_order` (100 when not positive). Survivors
/// keep their position, so sorted input stays sorted.
pub fn resolve_groups<'a>(
    entries: Vec<ActivatedEntry<'a>>,
    rng: &mut impl Rng,
) -> Vec<ActivatedEntry<'a>> {
    // Groups in order of first appearance, so seeded draws are reproducible.
    let mut order: Vec<&'a str> = Vec::new();
    let mut members: HashMap<&'a str, Vec<usize>> = HashMap::new();

    for (index, activated) in entries.iter().enumerate() {
        let entry = activated.entry;
        if let Some(group) = entry.group_key() {
            members
                .entry(group)
                .or_insert_with(|| {
                    order.push(group);
                    Vec::new()
                })
                .push(index);
        }
    }

    let mut losers: HashSet<usize> = HashSet::new();
    for group in order {
        let indices = &members[group];
        if indices.len() < 2 {
            continue;
        }

        let weights: Vec<u64> = indices
            .iter()
            .map(|&i| entries[i].entry.group_weight())
            .collect();
        let winner = pick_weighted(&weights, rng);

        tracing::debug!(
            group,
            candidates = indices.len(),
            winner = %entries[indices[winner]].entry.id,
            "resolved inclusion group"
        );

        losers.extend(
            indices
                .iter()
                .enumerate()
                .filter(|(k, _)| *k != winner)
                .map(|(_, &i)| i),
        );
    }

    entries
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !losers.contains(i))
        .map(|(_, activated)| activated)
        .collect()
}

/// Pick an index with probability proportional to its weight.
///
/// Draws uniformly over `[0, total)` and returns the first index whose
/// cumulative weight reaches the draw.
///
/// Weights are summed as `f64`, so orders near `i64::MAX` cannot overflow.
pub fn pick_weighted(weights: &[u64], rng: &mut impl Rng) -> usize {
    let total: f64 = weights.iter().map(|&w| w as f64).sum();
    if weights.is_empty() || total <= 0.0 {
        return 0;
    }

    let draw = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for (index, weight) in weights.iter().enumerate() {
        cumulative += *weight as f64;
        if cumulative >= draw {
            return index;
        }
    }

    weights.len() - 1
}
