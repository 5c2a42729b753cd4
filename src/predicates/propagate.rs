// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! PropagatePredicate - Root propagation before any decision.

use crate::context::SearchContext;
use crate::engine::{Predicate, PredicateResult};
use tracing::debug;

/// Runs the context's propagators once, before branching.
///
/// Fails the whole search when the constraints are unsatisfiable with every
/// item free.
#[derive(Debug)]
pub struct PropagatePredicate;

impl Predicate for PropagatePredicate {
    fn try_pred(&mut self, ctx: &mut SearchContext, _round: usize) -> PredicateResult {
        match ctx.propagate() {
            Ok(()) => {
                debug!(
                    decided = ctx.domain.decided(&ctx.trail),
                    items = ctx.domain.nb_items(),
                    "root propagation"
                );
                PredicateResult::Success
            }
            Err(failure) => {
                debug!(%failure, "root propagation failed");
                PredicateResult::Failure
            }
        }
    }

    fn name(&self) -> &str {
        "Propagate"
    }
}
