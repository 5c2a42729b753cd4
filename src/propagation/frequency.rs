// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Border propagators for maximal frequent and minimal infrequent patterns.
//!
//! With a frequency threshold `s`, [`FrequentSubsets`] keeps every direct
//! subset of the pattern frequent, and [`InfrequentSupersets`] keeps every
//! direct superset infrequent. Together with a cover-size bound they
//! characterise the positive border (maximal frequent patterns) and the
//! negative border (minimal infrequent patterns).

use super::domain::{DomainView, Forcing};
use super::errors::PropagationFailure;
use super::partition::leave_one_out_covers;
use super::{Outcome, Propagator};

/// Every direct subset `x \ {j}` has frequency at least `threshold`.
#[derive(Debug)]
pub struct FrequentSubsets {
    threshold: usize,
}

impl FrequentSubsets {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }
}

impl Propagator for FrequentSubsets {
    fn propagate(&mut self, view: &mut DomainView<'_>) -> Outcome {
        let store = view.store;
        let trail = &*view.trail;
        let threshold = self.threshold;
        let tracker = &*view.cover;
        let cover = &tracker.cover;
        let present = tracker.present(trail);
        let free = tracker.free(trail);

        let subcovers = leave_one_out_covers(store, present);
        for (k, sub) in subcovers.iter().enumerate() {
            let frequency = sub.cardinality();
            if frequency < threshold {
                return Outcome::Fail(PropagationFailure::InfrequentSubset {
                    item: present[k],
                    frequency,
                    threshold,
                });
            }
        }

        // An infrequent pattern is a subset of all its extensions.
        if cover.cardinality(trail) < threshold {
            return Outcome::forced(free.iter().map(|&item| Forcing::absent(item)).collect());
        }

        Outcome::forced(
            free.iter()
                .filter(|&&item| {
                    let item_cover = store.cover(item);
                    cover.and_count(trail, item_cover) < threshold
                        && subcovers
                            .iter()
                            .any(|sub| sub.and_count(item_cover) < threshold)
                })
                .map(|&item| Forcing::absent(item))
                .collect(),
        )
    }

    fn name(&self) -> &str {
        "FrequentSubsets"
    }
}

/// Every direct superset `x ∪ {j}` has frequency below `threshold`.
#[derive(Debug)]
pub struct InfrequentSupersets {
    threshold: usize,
}

impl InfrequentSupersets {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }
}

impl Propagator for InfrequentSupersets {
    fn propagate(&mut self, view: &mut DomainView<'_>) -> Outcome {
        let store = view.store;
        let trail = &*view.trail;
        let threshold = self.threshold;
        let tracker = &mut *view.cover;
        let absent = tracker.absent(trail).to_vec();
        let free = tracker.free(trail).to_vec();

        // Every completion covers at least the cover of present ∪ free.
        if tracker.mask_all_free(trail, store) >= threshold {
            let cover = &tracker.cover;
            if let Some(&item) = absent
                .iter()
                .find(|&&j| cover.mask_and_count(trail, store.cover(j)) >= threshold)
            {
                return Outcome::Fail(PropagationFailure::FrequentSuperset { item });
            }
        }

        let mut forced = Vec::new();
        for &item in &free {
            // Leaving `item` out, the completion of everything else would
            // stay extendable.
            if tracker.mask_free_except(trail, store, Some(item)) < threshold {
                continue;
            }
            let cover = &tracker.cover;
            let extendable = std::iter::once(item)
                .chain(absent.iter().copied())
                .any(|j| cover.mask_and_count(trail, store.cover(j)) >= threshold);
            if extendable {
                forced.push(Forcing::present(item));
            }
        }
        Outcome::forced(forced)
    }

    fn name(&self) -> &str {
        "InfrequentSupersets"
    }
}
