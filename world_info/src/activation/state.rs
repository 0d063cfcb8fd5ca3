//! Per-call activation state threaded through recursive scans.

use std::collections::HashSet;

use lorebook::EntryId;

/// Tracks which entries one activation call has already activated.
///
/// Created fresh for every call and passed by reference into each depth, so
/// an entry activated at one depth is never reconsidered at a deeper one.
#[derive(Debug, Clone, Default)]
pub struct ActivationState {
    processed: HashSet<EntryId>,
    per_depth: Vec<usize>,
}

impl ActivationState {
    /// Create a new empty activation state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `id` has already been activated in this call.
    pub fn is_processed(&self, id: &EntryId) -> bool {
        self.processed.contains(id)
    }

    /// Mark `id` as activated. Returns `false` if it already was.
    pub fn mark_processed(&mut self, id: EntryId) -> bool {
        self.processed.insert(id)
    }

    /// Record how many entries a depth activated.
    pub fn record_depth(&mut self, depth: u32, activated: usize) {
        let depth = depth as usize;
        if self.per_depth.len() <= depth {
            self.per_depth.resize(depth + 1, 0);
        }
        self.per_depth[depth] += activated;
    }

    /// Number of entries activated at `depth`.
    pub fn activated_at(&self, depth: u32) -> usize {
        self.per_depth.get(depth as usize).copied().unwrap_or(0)
    }

    /// Number of depths that were scanned, including depth 0.
    pub fn depths_scanned(&self) -> usize {
        self.per_depth.len()
    }

    /// Total number of activated entries across all depths.
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }
}
