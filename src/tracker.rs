//! Bounded retention of the best-scoring checkpoints.
use crate::error::ReachAvoidError;
use ordered_float::OrderedFloat;
use std::{cmp::Reverse, collections::BinaryHeap};

/// A retained checkpoint entry. Ordering is by score first, identifier
/// second, which makes tie-breaking deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Entry {
    score: OrderedFloat<f32>,
    identifier: String,
}

/// Keeps the `k` highest-scoring checkpoint identifiers seen so far.
///
/// Backed by a min-oriented binary heap of size at most `k`: offering a score
/// above the current minimum evicts the minimum; anything else is rejected
/// without mutation.
pub struct TopKTracker {
    max_to_keep: usize,
    heap: BinaryHeap<Reverse<Entry>>,
}

impl TopKTracker {
    /// Creates a tracker retaining at most `k` entries.
    pub fn new(k: usize) -> Self {
        Self {
            max_to_keep: k,
            heap: BinaryHeap::with_capacity(k),
        }
    }

    /// Offers a scored checkpoint; returns whether it was retained.
    ///
    /// Below capacity every offer is retained. At capacity the offer is
    /// retained only when its score is strictly greater than the current
    /// minimum, which is then evicted.
    pub fn offer(&mut self, score: f32, identifier: impl Into<String>) -> bool {
        let entry = Entry {
            score: OrderedFloat(score),
            identifier: identifier.into(),
        };
        if self.heap.len() < self.max_to_keep {
            self.heap.push(Reverse(entry));
            return true;
        }
        match self.heap.peek() {
            Some(Reverse(min)) if min.score < entry.score => {
                self.heap.pop();
                self.heap.push(Reverse(entry));
                true
            }
            _ => false,
        }
    }

    /// Identifier of the highest-scoring retained checkpoint.
    ///
    /// # Errors
    ///
    /// Fails with [`ReachAvoidError::EmptyTracker`] if nothing has been
    /// retained yet.
    pub fn best(&self) -> Result<&str, ReachAvoidError> {
        // Entries are wrapped in `Reverse`, so the maximum entry is the
        // minimum of the wrappers.
        self.heap
            .iter()
            .min()
            .map(|Reverse(entry)| entry.identifier.as_str())
            .ok_or(ReachAvoidError::EmptyTracker)
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether nothing has been retained yet.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Retained `(score, identifier)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (f32, &str)> {
        self.heap
            .iter()
            .map(|Reverse(entry)| (entry.score.0, entry.identifier.as_str()))
    }
}
