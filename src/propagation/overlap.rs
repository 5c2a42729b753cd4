// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Diversity constraint on the covers of successive solutions.
//!
//! Every accepted pattern's cover is appended to a shared history. A new
//! pattern is rejected when the Jaccard similarity of its cover with some
//! history cover exceeds `max_jaccard`.
//!
//! For a partial pattern with cover `C`, any completion has a cover
//! `X ⊆ C` with `|X| ≥ θ` (the minimal frequency). Writing `p = |C \ H|`,
//! the completion keeps at least `θ - p` transactions of `H`, and its union
//! with `H` has at most `|H| + p` transactions, hence
//! `J(X, H) ≥ max(0, θ - p) / (|H| + p)`.

use super::domain::{DomainView, Forcing};
use super::errors::PropagationFailure;
use super::{Outcome, Propagator};
use crate::store::BitSet;
use std::cell::RefCell;
use std::rc::Rc;

/// Covers of the patterns accepted so far, shared with the monitor that
/// records them.
pub type OverlapHistory = Rc<RefCell<Vec<BitSet>>>;

/// `|a ∩ b| / |a ∪ b|`, zero for two empty sets.
pub fn jaccard(a: &BitSet, b: &BitSet) -> f64 {
    let inter = a.and_count(b);
    ratio(inter, a.len() + b.len() - inter)
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Lower bound of the similarity between `H` and any subset of a cover of
/// size `size` sharing `shared` transactions with `H`, keeping at least
/// `min_frequency` transactions.
fn similarity_bound(size: usize, shared: usize, history: usize, min_frequency: usize) -> f64 {
    let outside = size - shared;
    ratio(min_frequency.saturating_sub(outside), history + outside)
}

#[derive(Debug)]
pub struct Overlap {
    history: OverlapHistory,
    max_jaccard: f64,
    min_frequency: usize,
    /// Final cover at a leaf.
    exact: BitSet,
}

impl Overlap {
    pub fn new(history: OverlapHistory, max_jaccard: f64, min_frequency: usize) -> Self {
        Self {
            history,
            max_jaccard,
            min_frequency,
            exact: BitSet::empty(0),
        }
    }
}

impl Propagator for Overlap {
    fn propagate(&mut self, view: &mut DomainView<'_>) -> Outcome {
        let store = view.store;
        let trail = &*view.trail;
        let history = self.history.borrow();
        if history.is_empty() {
            return Outcome::Noop;
        }
        let tracker = &mut *view.cover;
        let size = tracker.size(trail);
        let free = tracker.free(trail).to_vec();

        for (pattern, h) in history.iter().enumerate() {
            let shared = tracker.cover.and_count(trail, h);
            if similarity_bound(size, shared, h.len(), self.min_frequency) > self.max_jaccard {
                return Outcome::Fail(PropagationFailure::TooSimilar { pattern });
            }
        }

        if free.is_empty() {
            // The cover is final: compare exactly.
            tracker.cover.copy_into(trail, &mut self.exact);
            if let Some(pattern) = history
                .iter()
                .position(|h| jaccard(&self.exact, h) > self.max_jaccard)
            {
                return Outcome::Fail(PropagationFailure::TooSimilar { pattern });
            }
            return Outcome::Noop;
        }

        let mut forced = Vec::new();
        let cover = &mut tracker.cover;
        for item in free {
            cover.reset_mask(trail);
            cover.and_mask(trail, store.cover(item));
            let size = cover.mask_cardinality(trail);
            let too_similar = history.iter().any(|h| {
                let shared = cover.mask_and_count(trail, h);
                similarity_bound(size, shared, h.len(), self.min_frequency) > self.max_jaccard
            });
            if too_similar {
                forced.push(Forcing::absent(item));
            }
        }
        Outcome::forced(forced)
    }

    fn name(&self) -> &str {
        "Overlap"
    }
}
