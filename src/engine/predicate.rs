// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The predicate contract of the search engine.
//!
//! A search program is a list of predicates. Running one either moves the
//! program forward, opens a choice point, or sends the engine back to the
//! latest open choice point.
//!
//! # Example
//!
//! A predicate deciding item 0 both ways:
//!
//! ```
//! use itemset_search::context::SearchContext;
//! use itemset_search::engine::{Predicate, PredicateResult};
//! use itemset_search::propagation::ItemState;
//!
//! #[derive(Debug)]
//! struct DecideFirstItem;
//!
//! impl Predicate for DecideFirstItem {
//!     fn try_pred(&mut self, _ctx: &mut SearchContext, _round: usize) -> PredicateResult {
//!         PredicateResult::Choices(2)
//!     }
//!
//!     fn retry_pred(&mut self, ctx: &mut SearchContext, _round: usize, choice: usize) -> PredicateResult {
//!         let state = if choice == 0 { ItemState::Present } else { ItemState::Absent };
//!         match ctx.fix(0, state) {
//!             Ok(_) => PredicateResult::Success,
//!             Err(_) => PredicateResult::Failure,
//!         }
//!     }
//! }
//! ```

use crate::context::SearchContext;
use std::fmt::Debug;

/// What the engine does after a predicate ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateResult {
    /// Go on with the next predicate.
    Success,

    /// Run this predicate again with `round + 1`, e.g. one round per item
    /// decision.
    SuccessSamePredicate,

    /// Backtrack to the latest choice point with alternatives left.
    Failure,

    /// Open a choice point; the engine calls `retry_pred` with each choice
    /// in `0..n`.
    Choices(usize),

    /// Hand control back to the caller. The stack is kept, so a later
    /// `search` call resumes by backtracking.
    Suspend,
}

/// Marks the predicates allowed to end a program.
///
/// A terminal predicate never returns `Success`, so the engine never runs
/// off the end of the program.
pub trait TerminalPredicate: Predicate {}

/// One step of a search program.
///
/// Every change a predicate makes to the [`SearchContext`] must go through
/// the trail: the engine rewinds it before each retry and on backtrack,
/// which is the only undo predicates get.
pub trait Predicate: Debug {
    /// First run at `round`, counted from 0 on entry to the predicate.
    fn try_pred(&mut self, ctx: &mut SearchContext, round: usize) -> PredicateResult;

    /// Run alternative `choice` of a choice point opened by `try_pred`.
    ///
    /// The trail is rewound to just after `try_pred` before each call.
    /// Only `Success`, `SuccessSamePredicate` and `Failure` are meaningful.
    #[allow(unused)]
    fn retry_pred(
        &mut self,
        ctx: &mut SearchContext,
        round: usize,
        choice: usize,
    ) -> PredicateResult {
        panic!("{} opened no choice point", self.name());
    }

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
