// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Threshold pruning through optimistic measure bounds.

use super::domain::DomainView;
use super::errors::PropagationFailure;
use super::{Outcome, Propagator};
use crate::cover::CoverView;
use crate::measure::{bound, evaluate, BoundInput, Direction, Measure, MeasureValue};
use crate::store::{BitSet, TransactionStore};

/// Accepted range of one measure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    pub measure: Measure,
    pub min: Option<MeasureValue>,
    pub max: Option<MeasureValue>,
}

impl Threshold {
    pub fn accepts(&self, value: &MeasureValue) -> bool {
        self.min.map_or(true, |min| *value >= min) && self.max.map_or(true, |max| *value <= max)
    }

    /// Whether the value of a complete pattern is in range.
    pub fn accepts_pattern<C: CoverView>(
        &self,
        store: &TransactionStore,
        items: &[usize],
        cover: &C,
    ) -> bool {
        self.accepts(&evaluate(self.measure, store, items, cover))
    }
}

/// Buffers for the two covers bounding a partial pattern, reused from one
/// node to the next.
#[derive(Debug)]
pub struct BoundScratch {
    upper: BitSet,
    lower: BitSet,
}

impl Default for BoundScratch {
    fn default() -> Self {
        Self {
            upper: BitSet::empty(0),
            lower: BitSet::empty(0),
        }
    }
}

impl BoundScratch {
    /// Bound input at the current node: `upper` is the branch cover and
    /// `lower` the cover once every free item is added.
    pub fn input<'a>(&'a mut self, view: &'a mut DomainView<'_>) -> BoundInput<'a> {
        let store = view.store;
        let trail = &*view.trail;
        view.cover.mask_all_free(trail, store);
        view.cover.cover.copy_into(trail, &mut self.upper);
        view.cover.cover.mask_copy_into(trail, &mut self.lower);
        let tracker = &*view.cover;
        BoundInput {
            store,
            present: tracker.present(trail),
            free: tracker.free(trail),
            upper: &self.upper,
            lower: &self.lower,
        }
    }
}

/// Fails as soon as some threshold is out of reach of every completion.
#[derive(Debug)]
pub struct MeasureBounds {
    thresholds: Vec<Threshold>,
    scratch: BoundScratch,
}

impl MeasureBounds {
    pub fn new(thresholds: Vec<Threshold>) -> Self {
        Self {
            thresholds,
            scratch: BoundScratch::default(),
        }
    }
}

impl Propagator for MeasureBounds {
    fn propagate(&mut self, view: &mut DomainView<'_>) -> Outcome {
        let input = self.scratch.input(view);
        for threshold in &self.thresholds {
            let measure = threshold.measure;
            let too_low = threshold
                .min
                .is_some_and(|min| bound(measure, Direction::Maximize, &input) < min);
            let too_high = threshold
                .max
                .is_some_and(|max| bound(measure, Direction::Minimize, &input) > max);
            if too_low || too_high {
                return Outcome::Fail(PropagationFailure::BoundUnreachable { measure });
            }
        }
        Outcome::Noop
    }

    fn name(&self) -> &str {
        "MeasureBounds"
    }
}
