// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

use super::SharedSkyline;
use crate::measure::{bound, MeasureValue};
use crate::propagation::{BoundScratch, DomainView, Outcome, PropagationFailure, Propagator};

/// Fails when the best vector any completion can reach is already dominated.
#[derive(Debug)]
pub struct SkylinePruner {
    skyline: SharedSkyline,
    scratch: BoundScratch,
}

impl SkylinePruner {
    pub fn new(skyline: SharedSkyline) -> Self {
        Self {
            skyline,
            scratch: BoundScratch::default(),
        }
    }
}

impl Propagator for SkylinePruner {
    fn propagate(&mut self, view: &mut DomainView<'_>) -> Outcome {
        let skyline = self.skyline.borrow();
        if skyline.is_empty() {
            return Outcome::Noop;
        }
        let input = self.scratch.input(view);
        let best: Vec<MeasureValue> = skyline
            .objectives()
            .iter()
            .map(|o| bound(o.measure, o.direction, &input))
            .collect();
        if skyline.is_dominated(&best) {
            Outcome::Fail(PropagationFailure::Dominated)
        } else {
            Outcome::Noop
        }
    }

    fn name(&self) -> &str {
        "SkylinePruner"
    }
}
