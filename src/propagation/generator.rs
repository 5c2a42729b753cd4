// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Generator propagator.
//!
//! A generator has no proper subset with the same cover. Since covers only
//! shrink as items are added, it is enough to check the direct subsets
//! `x \ {j}`.

use super::domain::{DomainView, Forcing};
use super::errors::PropagationFailure;
use super::partition::leave_one_out_covers;
use super::{Outcome, Propagator};

#[derive(Debug, Default)]
pub struct Generator;

impl Generator {
    pub fn new() -> Self {
        Self
    }
}

impl Propagator for Generator {
    fn propagate(&mut self, view: &mut DomainView<'_>) -> Outcome {
        let store = view.store;
        let trail = &*view.trail;
        let tracker = &*view.cover;
        let cover = &tracker.cover;
        let present = tracker.present(trail);
        let size = cover.cardinality(trail);

        let subcovers = leave_one_out_covers(store, present);
        if let Some(k) = subcovers.iter().position(|sub| sub.cardinality() == size) {
            return Outcome::Fail(PropagationFailure::NotGenerator { item: present[k] });
        }

        Outcome::forced(
            tracker
                .free(trail)
                .iter()
                .filter(|&&item| {
                    let item_cover = store.cover(item);
                    let extended = cover.and_count(trail, item_cover);
                    extended == size
                        || subcovers
                            .iter()
                            .any(|sub| sub.and_count(item_cover) == extended)
                })
                .map(|&item| Forcing::absent(item))
                .collect(),
        )
    }

    fn name(&self) -> &str {
        "Generator"
    }
}
