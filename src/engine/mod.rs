// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Backtracking engine for predicate programs.
//!
//! A program is a list of [`Predicate`]s closed by a [`TerminalPredicate`].
//! The engine keeps one frame per predicate run. A frame whose predicate
//! returned `Choices(n)` becomes a choice point; a failure unwinds to the
//! newest choice point with untried choices, rewinds the trail to the mark
//! held by that frame and runs the next choice.
//!
//! Mining runs
//!
//! ```text
//! Propagate, Branch (rounds), Count(leaves), Solution, Fail
//! ```
//!
//! so each complete item assignment is reached once, reported, and then
//! undone by `Fail`.
//!
//! # Example
//!
//! ```
//! use itemset_search::context::SearchContext;
//! use itemset_search::engine::EngineBuilder;
//! use itemset_search::predicates::{FailPredicate, PropagatePredicate};
//! use itemset_search::store::TransactionStore;
//! use std::sync::Arc;
//!
//! let store = Arc::new(TransactionStore::from_transactions(1, &[vec![0]]).unwrap());
//! let mut ctx = SearchContext::new(store);
//! let engine = EngineBuilder::new()
//!     .add(Box::new(PropagatePredicate))
//!     .terminal(Box::new(FailPredicate))
//!     .build();
//!
//! // `None`: the search space is exhausted.
//! assert!(engine.search(&mut ctx).is_none());
//! ```

pub mod predicate;

pub use predicate::{Predicate, PredicateResult, TerminalPredicate};

use crate::context::SearchContext;
use tracing::trace;

/// Alternatives of a frame whose predicate returned `Choices(count)`.
#[derive(Debug, Clone, Copy)]
struct ChoicePoint {
    next: usize,
    count: usize,
}

impl ChoicePoint {
    fn take(&mut self) -> Option<usize> {
        (self.next < self.count).then(|| {
            self.next += 1;
            self.next - 1
        })
    }
}

/// One run of one predicate.
#[derive(Debug)]
struct Frame {
    predicate: usize,
    round: usize,
    /// Trail position to rewind to before running this frame.
    mark: usize,
    choices: Option<ChoicePoint>,
}

#[derive(Debug)]
pub struct SearchEngine {
    predicates: Vec<Box<dyn Predicate>>,
    /// Frames of the current path; kept across a suspension.
    frames: Vec<Frame>,
    tries: u64,
    retries: u64,
}

impl SearchEngine {
    /// Engine over `predicates` as given.
    ///
    /// [`EngineBuilder`] is the checked way to build one.
    pub fn new(predicates: Vec<Box<dyn Predicate>>) -> Self {
        Self {
            predicates,
            frames: Vec::new(),
            tries: 0,
            retries: 0,
        }
    }

    /// Run until a predicate suspends or every choice is exhausted.
    ///
    /// Returns `Some(engine)` on suspension; searching with it again resumes
    /// by backtracking from where it stopped. Solutions reach the caller
    /// through the monitors of `ctx`.
    ///
    /// # Panics
    ///
    /// Panics if the last predicate returns `Success`, or if `retry_pred`
    /// returns `Choices` or `Suspend`.
    pub fn search(mut self, ctx: &mut SearchContext) -> Option<Self> {
        if self.predicates.is_empty() {
            return None;
        }
        if self.frames.is_empty() {
            self.push(ctx, 0, 0);
        } else {
            self.unwind();
        }

        while let Some(frame) = self.frames.last_mut() {
            ctx.trail.rewind_to(frame.mark);
            let (index, round) = (frame.predicate, frame.round);

            let result = match frame.choices.as_mut() {
                None => {
                    self.tries += 1;
                    self.predicates[index].try_pred(ctx, round)
                }
                Some(choices) => {
                    let Some(choice) = choices.take() else {
                        self.unwind();
                        continue;
                    };
                    self.retries += 1;
                    let result = self.predicates[index].retry_pred(ctx, round, choice);
                    if matches!(result, PredicateResult::Choices(_) | PredicateResult::Suspend) {
                        panic!(
                            "{}::retry_pred returned {:?} inside a choice point",
                            self.predicates[index].name(),
                            result
                        );
                    }
                    result
                }
            };
            trace!(predicate = self.predicates[index].name(), round, ?result, "step");

            match result {
                PredicateResult::Success if index + 1 == self.predicates.len() => {
                    panic!(
                        "Invalid predicate sequence: {} succeeded as the last predicate",
                        self.predicates[index].name()
                    );
                }
                PredicateResult::Success => self.push(ctx, index + 1, 0),
                PredicateResult::SuccessSamePredicate => self.push(ctx, index, round + 1),
                // A choice point stays on the stack for its next choice.
                PredicateResult::Failure if self.at_choice_point() => {}
                PredicateResult::Failure => self.unwind(),
                PredicateResult::Choices(count) => {
                    let mark = ctx.trail.mark();
                    if let Some(frame) = self.frames.last_mut() {
                        frame.mark = mark;
                        frame.choices = Some(ChoicePoint { next: 0, count });
                    }
                }
                PredicateResult::Suspend => return Some(self),
            }
        }
        None
    }

    fn at_choice_point(&self) -> bool {
        self.frames.last().is_some_and(|f| f.choices.is_some())
    }

    /// Drop the top frame, then every frame down to the newest choice point.
    fn unwind(&mut self) {
        self.frames.pop();
        while self.frames.last().is_some_and(|f| f.choices.is_none()) {
            self.frames.pop();
        }
    }

    fn push(&mut self, ctx: &mut SearchContext, predicate: usize, round: usize) {
        self.frames.push(Frame {
            predicate,
            round,
            mark: ctx.trail.mark(),
            choices: None,
        });
    }

    /// Numbers of `try_pred` and `retry_pred` calls so far.
    pub fn calls(&self) -> (u64, u64) {
        (self.tries, self.retries)
    }
}

/// Builds a [`SearchEngine`] whose program ends with a terminal predicate.
#[derive(Debug, Default)]
pub struct EngineBuilder {
    predicates: Vec<Box<dyn Predicate>>,
}

/// An [`EngineBuilder`] that has its terminal predicate.
#[derive(Debug)]
pub struct TerminatedBuilder {
    predicates: Vec<Box<dyn Predicate>>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, predicate: Box<dyn Predicate>) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn terminal<T: TerminalPredicate + 'static>(mut self, predicate: Box<T>) -> TerminatedBuilder {
        self.predicates.push(predicate);
        TerminatedBuilder {
            predicates: self.predicates,
        }
    }
}

impl TerminatedBuilder {
    pub fn build(self) -> SearchEngine {
        SearchEngine::new(self.predicates)
    }
}
