// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The predicates mining programs are built from.
//!
//! [`PropagatePredicate`] reaches the root fixpoint, [`BranchPredicate`]
//! decides one free item per round, [`SolutionPredicate`] hands each leaf
//! to the monitors and [`FailPredicate`] closes the program. `test` holds
//! small predicates that exercise the engine alone.

pub mod branch;
pub mod propagate;
pub mod solution;

pub use branch::{BranchPredicate, ItemSelector};
pub use propagate::PropagatePredicate;
pub use solution::SolutionPredicate;

use crate::context::SearchContext;
use crate::engine::{Predicate, PredicateResult, TerminalPredicate};

/// Always fails, so the engine backtracks into the newest choice point.
///
/// Mining programs end with it: every assignment is visited once and
/// patterns reach the caller through [`SolutionPredicate`] on the way.
///
/// ```
/// use itemset_search::context::SearchContext;
/// use itemset_search::engine::EngineBuilder;
/// use itemset_search::predicates::FailPredicate;
/// use itemset_search::predicates::test::ChoicesPredicate;
/// use itemset_search::store::TransactionStore;
/// use std::sync::Arc;
///
/// let store = Arc::new(TransactionStore::from_transactions(1, &[vec![0]]).unwrap());
/// let mut ctx = SearchContext::new(store);
/// let engine = EngineBuilder::new()
///     .add(Box::new(ChoicesPredicate::new(3)))
///     .terminal(Box::new(FailPredicate))
///     .build();
///
/// // All three choices are tried, then the search is exhausted.
/// assert!(engine.search(&mut ctx).is_none());
/// ```
#[derive(Debug)]
pub struct FailPredicate;

impl Predicate for FailPredicate {
    fn try_pred(&mut self, _ctx: &mut SearchContext, _round: usize) -> PredicateResult {
        PredicateResult::Failure
    }

    fn name(&self) -> &str {
        "Fail"
    }
}

impl TerminalPredicate for FailPredicate {}
