//! Rising edge detection per rule.

use plcbox_common::rules::RuleId;
use std::collections::BTreeSet;

/// Remembers which rules were true on the previous cycle.
#[derive(Debug, Clone, Default)]
pub struct EdgeTracker {
    previous: BTreeSet<RuleId>,
    current: BTreeSet<RuleId>,
}

impl EdgeTracker {
    /// Create a tracker with no rule true.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `id` as true this cycle. Returns true on a rising edge.
    pub fn observe_true(&mut self, id: RuleId) -> bool {
        self.current.insert(id);
        !self.previous.contains(&id)
    }

    /// End the cycle: this cycle's true set becomes the edge memory.
    pub fn commit(&mut self) {
        std::mem::swap(&mut self.previous, &mut self.current);
        self.current.clear();
    }

    /// Whether `id` was true on the last committed cycle.
    pub fn was_true(&self, id: RuleId) -> bool {
        self.previous.contains(&id)
    }

    /// Number of rules true on the last committed cycle.
    pub fn true_count(&self) -> usize {
        self.previous.len()
    }
}
