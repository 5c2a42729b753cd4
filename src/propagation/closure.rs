// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Closedness propagators.
//!
//! A pattern is closed when no item outside it can be added without
//! changing its cover. [`CoverClosure`] enforces exactly that. Adequate
//! closure generalises it to a set of measures M′: a pattern is closed with
//! respect to M′ when every added item changes at least one measure of M′.
//! Under a minimal frequency, only additions that keep the pattern frequent
//! count.

use super::domain::{DomainView, Forcing};
use super::errors::PropagationFailure;
use super::{Outcome, Propagator};
use crate::cover::ReversibleSparseBitSet;
use crate::measure::MeasureComputer;
use crate::store::TransactionStore;
use crate::trail::{Trail, Trailed};
use serde::{Deserialize, Serialize};

/// Closure with respect to the cover.
///
/// A free item whose cover contains the current cover is forced present;
/// an absent item whose cover contains it makes the pattern unclosable.
#[derive(Debug, Default)]
pub struct CoverClosure;

impl CoverClosure {
    pub fn new() -> Self {
        Self
    }
}

impl Propagator for CoverClosure {
    fn propagate(&mut self, view: &mut DomainView<'_>) -> Outcome {
        let trail = &*view.trail;
        let tracker = &*view.cover;
        let covers = |item: &usize| tracker.cover.is_subset_of(trail, view.store.cover(*item));

        if let Some(&item) = tracker.absent(trail).iter().find(|i| covers(i)) {
            return Outcome::Fail(PropagationFailure::NotClosed { item });
        }
        Outcome::forced(
            tracker
                .free(trail)
                .iter()
                .filter(|i| covers(i))
                .map(|&item| Forcing::present(item))
                .collect(),
        )
    }

    fn name(&self) -> &str {
        "CoverClosure"
    }
}

/// Strength of adequate-closure filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClosureConsistency {
    /// Force present or fail on single items.
    #[default]
    Weak,
    /// Also rule out free items whose addition would make an absent item
    /// part of the closure.
    Domain,
}

/// Closure with respect to a set of measures.
///
/// Deductions must hold for every completion, not just the current node.
/// When every computer is hereditary and no frequency threshold applies, an
/// item keeping all measures now keeps them below. Otherwise the rules only
/// fire for items whose cover contains the branch cover, and once no item is
/// free, when the node is its own only completion.
#[derive(Debug)]
pub struct AdequateClosure {
    computers: Vec<Box<dyn MeasureComputer>>,
    consistency: ClosureConsistency,
    /// Present items the computers have been told about.
    seen: Trailed<usize>,
    min_frequency: usize,
}

impl AdequateClosure {
    /// Build from one computer per closure measure.
    pub fn new(
        trail: &mut Trail,
        store: &TransactionStore,
        mut computers: Vec<Box<dyn MeasureComputer>>,
        consistency: ClosureConsistency,
    ) -> Self {
        for computer in &mut computers {
            computer.reset(store, trail);
        }
        Self {
            computers,
            consistency,
            seen: Trailed::new(trail, 0),
            min_frequency: 0,
        }
    }

    /// Only count additions keeping at least `min_frequency` transactions.
    ///
    /// The threshold itself is enforced by [`super::CoverSize`].
    pub fn with_min_frequency(mut self, min_frequency: usize) -> Self {
        self.min_frequency = min_frequency;
        self
    }

    fn is_hereditary(&self) -> bool {
        self.min_frequency == 0 && self.computers.iter().all(|c| c.is_hereditary())
    }

    /// Whether every completion without `item` could still add it while
    /// keeping all measures, and so is not closed.
    fn closes_every_completion(
        &mut self,
        store: &TransactionStore,
        trail: &Trail,
        cover: &mut ReversibleSparseBitSet,
        item: usize,
        leaf: bool,
    ) -> bool {
        let item_cover = store.cover(item);
        if !cover.is_subset_of(trail, item_cover) {
            if !(leaf || self.is_hereditary()) {
                return false;
            }
            if self.min_frequency > 0 && cover.and_count(trail, item_cover) < self.min_frequency {
                return false;
            }
        }
        self.computers
            .iter_mut()
            .all(|computer| computer.is_constant(store, trail, cover, item))
    }

    /// Same question for the completions containing `with`.
    fn closes_every_completion_with(
        &mut self,
        store: &TransactionStore,
        trail: &Trail,
        cover: &mut ReversibleSparseBitSet,
        item: usize,
        with: usize,
    ) -> bool {
        if !self.is_hereditary() {
            cover.reset_mask(trail);
            cover.and_mask(trail, store.cover(with));
            if !cover.mask_is_subset_of(trail, store.cover(item)) {
                return false;
            }
        }
        self.computers
            .iter_mut()
            .all(|computer| computer.is_constant_pair(store, trail, cover, item, with))
    }
}

impl Propagator for AdequateClosure {
    fn propagate(&mut self, view: &mut DomainView<'_>) -> Outcome {
        let store = view.store;
        let tracker = &mut *view.cover;
        let seen = self.seen.get(view.trail);
        let present = tracker.items.present(view.trail);
        if present.len() > seen {
            let added = &present[seen..];
            for computer in &mut self.computers {
                computer.update(store, view.trail, added, &tracker.cover);
            }
            self.seen.set(view.trail, present.len());
        }
        let trail = &*view.trail;
        let absent = tracker.absent(trail).to_vec();
        let free = tracker.free(trail).to_vec();
        let cover = &mut tracker.cover;
        let leaf = free.is_empty();

        for &item in &absent {
            if self.closes_every_completion(store, trail, cover, item, leaf) {
                return Outcome::Fail(PropagationFailure::NotClosed { item });
            }
        }

        let mut forced = Vec::new();
        for &item in &free {
            if self.closes_every_completion(store, trail, cover, item, false) {
                forced.push(Forcing::present(item));
            }
        }

        if self.consistency == ClosureConsistency::Domain {
            for &with in &free {
                let blocked = absent
                    .iter()
                    .any(|&item| self.closes_every_completion_with(store, trail, cover, item, with));
                if blocked {
                    forced.push(Forcing::absent(with));
                }
            }
        }
        Outcome::forced(forced)
    }

    fn name(&self) -> &str {
        "AdequateClosure"
    }
}
