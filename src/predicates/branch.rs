// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! BranchPredicate - Decides one undecided item per round.
//!
//! Each round picks a free item and returns `Choices(2)`: include it or
//! exclude it. After the decision the propagators run to a fixpoint, which
//! usually decides several more items. Once no item is free the predicate
//! succeeds and the next predicate sees a complete assignment.

use crate::context::SearchContext;
use crate::engine::{Predicate, PredicateResult};
use crate::propagation::ItemState;
use crate::state::Counters;
use serde::{Deserialize, Serialize};
use strum_macros::{Display as StrumDisplay, EnumString};

/// Which free item to branch on next.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, StrumDisplay,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ItemSelector {
    /// Lowest item index.
    #[default]
    Input,
    /// Item keeping the smallest cover once added (MinCov).
    MinCover,
    /// Least frequent item of the store.
    AscendingFrequency,
}

/// Branches on free items until every item is decided.
///
/// The item chosen at each round is remembered so that `retry_pred` can
/// decide it. Deeper rounds never overwrite shallower ones.
#[derive(Debug)]
pub struct BranchPredicate {
    selector: ItemSelector,
    present_first: bool,
    chosen: Vec<usize>,
}

impl BranchPredicate {
    pub fn new(selector: ItemSelector, present_first: bool) -> Self {
        Self {
            selector,
            present_first,
            chosen: Vec::new(),
        }
    }

    fn select(&self, ctx: &mut SearchContext) -> Option<usize> {
        match self.selector {
            ItemSelector::Input => (0..ctx.domain.nb_items())
                .find(|&item| ctx.domain.is_undecided(&ctx.trail, item)),
            ItemSelector::AscendingFrequency => ctx
                .domain
                .items_in(&ctx.trail, ItemState::Free)
                .into_iter()
                .min_by_key(|&item| (ctx.store.item_frequency(item), item)),
            ItemSelector::MinCover => {
                ctx.sync_cover();
                let (store, trail, cover) = (&*ctx.store, &ctx.trail, &ctx.cover);
                cover
                    .free(trail)
                    .iter()
                    .map(|&item| (cover.cover.and_count(trail, store.cover(item)), item))
                    .min()
                    .map(|(_, item)| item)
            }
        }
    }
}

impl Predicate for BranchPredicate {
    fn try_pred(&mut self, ctx: &mut SearchContext, round: usize) -> PredicateResult {
        let Some(item) = self.select(ctx) else {
            return PredicateResult::Success;
        };
        self.chosen.truncate(round);
        self.chosen.push(item);
        ctx.statistics.increment(Counters::Nodes);
        PredicateResult::Choices(2)
    }

    fn retry_pred(&mut self, ctx: &mut SearchContext, round: usize, choice: usize) -> PredicateResult {
        let item = self.chosen[round];
        let state = if (choice == 0) == self.present_first {
            ItemState::Present
        } else {
            ItemState::Absent
        };
        if ctx.fix(item, state).is_err() {
            return PredicateResult::Failure;
        }
        match ctx.propagate() {
            Ok(()) => PredicateResult::SuccessSamePredicate,
            Err(_) => PredicateResult::Failure,
        }
    }

    fn name(&self) -> &str {
        "Branch"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineBuilder;
    use crate::predicates::FailPredicate;
    use crate::state::Statistics;
    use crate::store::TransactionStore;
    use std::str::FromStr;
    use std::sync::Arc;

    fn context() -> SearchContext {
        let store = TransactionStore::from_transactions(
            3,
            &[vec![0, 1], vec![0, 1, 2], vec![0], vec![1, 2], vec![2]],
        )
        .unwrap();
        SearchContext::new(Arc::new(store))
    }

    #[test]
    fn test_selector_names() {
        assert_eq!(ItemSelector::from_str("min_cover").unwrap(), ItemSelector::MinCover);
        assert_eq!(ItemSelector::AscendingFrequency.to_string(), "ascending_frequency");
        assert_eq!(ItemSelector::default(), ItemSelector::Input);
    }

    #[test]
    fn test_full_tree_without_propagators() {
        let mut ctx = context();
        let branch = BranchPredicate::new(ItemSelector::Input, true);
        let engine = EngineBuilder::new()
            .add(Box::new(branch))
            .add(Statistics::counting_predicate(Counters::Leaves, None))
            .terminal(Box::new(FailPredicate))
            .build();
        assert!(engine.search(&mut ctx).is_none());
        assert_eq!(ctx.statistics.get(Counters::Leaves), 8);
        assert_eq!(ctx.statistics.get(Counters::Nodes), 7);
        // Fully backtracked.
        assert_eq!(ctx.domain.decided(&ctx.trail), 0);
    }

    #[test]
    fn test_min_cover_selection() {
        let mut ctx = context();
        let branch = BranchPredicate::new(ItemSelector::MinCover, true);
        ctx.fix(0, ItemState::Present).unwrap();
        // cover({0}) = {t0, t1, t2}: item 1 keeps 2 transactions, item 2 keeps 1.
        assert_eq!(branch.select(&mut ctx), Some(2));
    }

    #[test]
    fn test_ascending_frequency_selection() {
        let store = TransactionStore::from_transactions(3, &[vec![0, 1, 2], vec![0, 2], vec![0]])
            .unwrap();
        let mut ctx = SearchContext::new(Arc::new(store));
        let branch = BranchPredicate::new(ItemSelector::AscendingFrequency, true);
        assert_eq!(branch.select(&mut ctx), Some(1));
        ctx.fix(1, ItemState::Absent).unwrap();
        assert_eq!(branch.select(&mut ctx), Some(2));
    }

    #[test]
    fn test_absent_first_decides_absent() {
        let mut ctx = context();
        let mut branch = BranchPredicate::new(ItemSelector::Input, false);
        assert_eq!(branch.try_pred(&mut ctx, 0), PredicateResult::Choices(2));
        assert_eq!(
            branch.retry_pred(&mut ctx, 0, 0),
            PredicateResult::SuccessSamePredicate
        );
        assert_eq!(ctx.domain.state(&ctx.trail, 0), ItemState::Absent);
    }
}
