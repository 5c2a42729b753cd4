// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Everything one search branch needs.
//!
//! A context pairs the shared, read-only [`TransactionStore`] with the state
//! it owns alone: the trail, the item domain and the branch cover shared by
//! its propagators. Several contexts can search the same store at once, one
//! per thread.

use crate::monitor::Monitor;
use crate::pattern::Pattern;
use crate::propagation::{
    propagate_to_fixpoint, CoverTracker, ItemDomain, ItemState, PropagationFailure, Propagator,
};
use crate::state::{Counters, Statistics};
use crate::store::TransactionStore;
use crate::trail::Trail;
use std::sync::Arc;

/// Store, trail, domain, propagators and monitors of one search.
///
/// Rewinding the trail undoes the domain and the branch cover.
/// Monitors and statistics are never rewound.
///
/// # Example
///
/// ```
/// use itemset_search::context::SearchContext;
/// use itemset_search::propagation::{CoverSize, ItemState};
/// use itemset_search::store::TransactionStore;
/// use std::sync::Arc;
///
/// let store = TransactionStore::from_transactions(2, &[vec![0, 1], vec![0]]).unwrap();
/// let mut ctx = SearchContext::new(Arc::new(store));
/// ctx.add_propagator(|_, _| Box::new(CoverSize::new(2, 2)));
///
/// let mark = ctx.trail.mark();
/// ctx.propagate().unwrap();
/// assert_eq!(ctx.domain.state(&ctx.trail, 1), ItemState::Absent);
/// ctx.trail.rewind_to(mark);
/// assert_eq!(ctx.domain.state(&ctx.trail, 1), ItemState::Free);
/// ```
#[derive(Debug)]
pub struct SearchContext {
    pub store: Arc<TransactionStore>,
    pub trail: Trail,
    /// Present/absent/free state of every item.
    pub domain: ItemDomain,
    /// Cover of the present items; lags `domain` until the next sync.
    pub cover: CoverTracker,
    /// Run in order by [`Self::propagate`].
    pub propagators: Vec<Box<dyn Propagator>>,
    pub monitors: Vec<Box<dyn Monitor>>,
    pub statistics: Statistics,
}

impl SearchContext {
    /// Create a context over `store` with every item free.
    pub fn new(store: Arc<TransactionStore>) -> Self {
        let mut trail = Trail::new();
        let domain = ItemDomain::new(&mut trail, store.nb_items());
        let cover = CoverTracker::new(&mut trail, &store);
        Self {
            store,
            trail,
            domain,
            cover,
            propagators: Vec::new(),
            monitors: Vec::new(),
            statistics: Statistics::new(),
        }
    }

    /// Add a propagator whose reversible state is allocated on this
    /// context's trail.
    pub fn add_propagator<F>(&mut self, build: F)
    where
        F: FnOnce(&mut Trail, &TransactionStore) -> Box<dyn Propagator>,
    {
        let propagator = build(&mut self.trail, &*self.store);
        self.propagators.push(propagator);
    }

    pub fn add_monitor(&mut self, monitor: Box<dyn Monitor>) {
        self.monitors.push(monitor);
    }

    /// Run every propagator to a fixpoint.
    ///
    /// The trail is not rewound on failure; callers rewind to their mark.
    pub fn propagate(&mut self) -> Result<(), PropagationFailure> {
        self.statistics.increment(Counters::Propagations);
        match propagate_to_fixpoint(
            &mut self.propagators,
            &self.store,
            &mut self.trail,
            &mut self.domain,
            &mut self.cover,
        ) {
            Ok(fixes) => {
                self.statistics.add(Counters::Fixes, fixes as u64);
                Ok(())
            }
            Err(failure) => {
                self.statistics.record_failure(&failure);
                Err(failure)
            }
        }
    }

    /// Bring the branch cover in step with the domain.
    pub fn sync_cover(&mut self) {
        self.cover.sync(&self.store, &mut self.trail, &self.domain);
    }

    /// Decide one item.
    pub fn fix(&mut self, item: usize, state: ItemState) -> Result<bool, PropagationFailure> {
        self.domain.fix(&mut self.trail, item, state)
    }

    /// The present items with their cover.
    pub fn current_pattern(&self) -> Pattern {
        let items = self.domain.items_in(&self.trail, ItemState::Present);
        Pattern::from_items(&self.store, items)
    }

    /// Pass `pattern` to every monitor.
    pub fn notify_solution(&mut self, pattern: &mut Pattern) {
        for monitor in &mut self.monitors {
            monitor.on_solution(pattern, &self.store);
        }
        self.statistics.increment(Counters::Solutions);
    }
}
