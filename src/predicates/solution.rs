// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! SolutionPredicate - Reports each complete assignment as a pattern.

use crate::context::SearchContext;
use crate::engine::{Predicate, PredicateResult};
use crate::propagation::Threshold;
use tracing::debug;

/// Builds the pattern of the present items and hands it to the monitors.
///
/// Runs after every item is decided. Thresholds are checked exactly here,
/// since propagation only prunes on bounds. Returns `Suspend` once
/// `max_solutions` patterns have been reported.
#[derive(Debug)]
pub struct SolutionPredicate {
    thresholds: Vec<Threshold>,
    allow_empty: bool,
    max_solutions: Option<usize>,
    found: usize,
}

impl SolutionPredicate {
    pub fn new(thresholds: Vec<Threshold>, allow_empty: bool, max_solutions: Option<usize>) -> Self {
        Self {
            thresholds,
            allow_empty,
            max_solutions,
            found: 0,
        }
    }

    /// Patterns reported so far.
    pub fn found(&self) -> usize {
        self.found
    }
}

impl Predicate for SolutionPredicate {
    fn try_pred(&mut self, ctx: &mut SearchContext, _round: usize) -> PredicateResult {
        let mut pattern = ctx.current_pattern();
        if pattern.is_empty() && !self.allow_empty {
            return PredicateResult::Failure;
        }
        for threshold in &self.thresholds {
            let value = pattern.value(threshold.measure, &ctx.store);
            if !threshold.accepts(&value) {
                return PredicateResult::Failure;
            }
        }
        debug!(pattern = %pattern, "solution");
        ctx.notify_solution(&mut pattern);
        self.found += 1;
        if self.max_solutions.is_some_and(|max| self.found >= max) {
            PredicateResult::Suspend
        } else {
            PredicateResult::Success
        }
    }

    fn name(&self) -> &str {
        "Solution"
    }
}
