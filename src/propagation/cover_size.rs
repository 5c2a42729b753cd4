// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Cover-size bounds.

use super::domain::{DomainView, Forcing};
use super::errors::PropagationFailure;
use super::{Outcome, Propagator};

/// Keeps `|cover|` of the final pattern within `[min, max]`.
///
/// With `C` the cover of the present items and `L` the cover once every
/// free item is added, any completion has a cover size in `[|L|, |C|]`.
#[derive(Debug)]
pub struct CoverSize {
    min: usize,
    max: usize,
    bounds: (usize, usize),
}

impl CoverSize {
    pub fn new(min: usize, max: usize) -> Self {
        Self {
            min,
            max,
            bounds: (0, usize::MAX),
        }
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// `[lower, upper]` reachable cover sizes as of the last propagation.
    pub fn bounds(&self) -> (usize, usize) {
        self.bounds
    }
}

impl Propagator for CoverSize {
    fn propagate(&mut self, view: &mut DomainView<'_>) -> Outcome {
        let store = view.store;
        let trail = &*view.trail;
        let tracker = &mut *view.cover;

        let size = tracker.size(trail);
        if size < self.min {
            return Outcome::Fail(PropagationFailure::CoverTooSmall {
                size,
                min: self.min,
            });
        }
        let lower = tracker.mask_all_free(trail, store);
        self.bounds = (lower, size);
        if lower > self.max {
            return Outcome::Fail(PropagationFailure::CoverTooLarge {
                size: lower,
                max: self.max,
            });
        }

        let free = tracker.free(trail).to_vec();
        let mut forced: Vec<Forcing> = free
            .iter()
            .filter(|&&item| tracker.cover.and_count(trail, store.cover(item)) < self.min)
            .map(|&item| Forcing::absent(item))
            .collect();

        if size > self.max {
            // Without `item`, the smallest reachable cover is still too big.
            for &item in &free {
                if tracker.mask_free_except(trail, store, Some(item)) > self.max {
                    forced.push(Forcing::present(item));
                }
            }
        }
        Outcome::forced(forced)
    }

    fn name(&self) -> &str {
        "CoverSize"
    }
}
