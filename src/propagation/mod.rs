// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Constraint propagation over the item domain.
//!
//! A pattern under construction is a three-valued assignment of the items:
//! present, absent, or still free. Each propagator looks at the current
//! assignment and either does nothing, forces some free items, or reports
//! that no completion can satisfy its constraint.
//!
//! # Propagators
//!
//! | Propagator | Constraint |
//! |------------|------------|
//! | [`CoverSize`] | `min ≤ \|cover\| ≤ max` |
//! | [`CoverClosure`] | the pattern is closed |
//! | [`AdequateClosure`] | the pattern is closed for a set of measures |
//! | [`Generator`] | no proper subset has the same cover |
//! | [`FrequentSubsets`] | every direct subset is frequent |
//! | [`InfrequentSupersets`] | every direct superset is infrequent |
//! | [`MeasureBounds`] | measure thresholds stay reachable |
//! | [`Overlap`] | covers of solutions stay dissimilar |
//!
//! # Reversible state
//!
//! The search context owns one [`CoverTracker`]: the items split into
//! present, free and absent blocks, and the cover of the present items as a
//! [`crate::cover::ReversibleSparseBitSet`]. The driver syncs it with the
//! domain before each propagator runs and hands it over in the
//! [`DomainView`]. Propagators keep only scratch state of their own, such as
//! leave-one-out covers. Everything reversible lives on the shared
//! [`Trail`], so backtracking rewinds it together with the domain and
//! propagators never undo anything themselves.
//!
//! # Fixpoint
//!
//! [`propagate_to_fixpoint`] runs the propagators in order until a full round
//! forces nothing new. Each rule only ever forces items that every solution
//! below the current node agrees on, so the fixpoint does not depend on the
//! order of the propagators.

pub mod bounds;
pub mod closure;
pub mod cover_size;
pub mod domain;
pub mod errors;
pub mod frequency;
pub mod generator;
pub mod overlap;
pub mod partition;

pub use bounds::{BoundScratch, MeasureBounds, Threshold};
pub use closure::{AdequateClosure, ClosureConsistency, CoverClosure};
pub use cover_size::CoverSize;
pub use domain::{DomainView, Forcing, ItemDomain, ItemState};
pub use errors::{FailureKind, PropagationFailure};
pub use frequency::{FrequentSubsets, InfrequentSupersets};
pub use generator::Generator;
pub use overlap::{jaccard, Overlap, OverlapHistory};
pub use partition::{CoverTracker, ItemPartition};

use crate::store::TransactionStore;
use crate::trail::Trail;
use tracing::trace;

/// Result of one propagator run.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing to deduce.
    Noop,
    /// Items every completion must agree on.
    Forced(Vec<Forcing>),
    /// No completion satisfies the constraint.
    Fail(PropagationFailure),
}

impl Outcome {
    /// `Forced`, or `Noop` when there is nothing to force.
    pub fn forced(forcings: Vec<Forcing>) -> Self {
        if forcings.is_empty() {
            Outcome::Noop
        } else {
            Outcome::Forced(forcings)
        }
    }
}

/// A constraint over the item domain.
pub trait Propagator: std::fmt::Debug {
    /// Look at the domain and report what follows.
    ///
    /// Must not force an item that is already decided the other way; the
    /// driver turns that into [`PropagationFailure::Conflict`].
    fn propagate(&mut self, view: &mut DomainView<'_>) -> Outcome;

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Run `propagators` until no round forces a new item.
///
/// `cover` is synced with `domain` before every propagator. Returns the
/// number of items fixed. On failure the domain is left partially updated;
/// the caller rewinds the trail.
pub fn propagate_to_fixpoint(
    propagators: &mut [Box<dyn Propagator>],
    store: &TransactionStore,
    trail: &mut Trail,
    domain: &mut ItemDomain,
    cover: &mut CoverTracker,
) -> Result<usize, PropagationFailure> {
    let mut fixes = 0;
    loop {
        let mut changed = false;
        for propagator in propagators.iter_mut() {
            let outcome = propagator.propagate(&mut DomainView::new(
                store,
                &mut *trail,
                &*domain,
                &mut *cover,
            ));
            match outcome {
                Outcome::Noop => {}
                Outcome::Forced(forcings) => {
                    for forcing in forcings {
                        if domain.fix(trail, forcing.item, forcing.state)? {
                            trace!(
                                propagator = propagator.name(),
                                item = forcing.item,
                                state = ?forcing.state,
                                "forced"
                            );
                            changed = true;
                            fixes += 1;
                        }
                    }
                }
                Outcome::Fail(failure) => {
                    trace!(propagator = propagator.name(), %failure, "failed");
                    return Err(failure);
                }
            }
        }
        if !changed {
            return Ok(fixes);
        }
    }
}

/// A search node over a fixed store, for propagator tests.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    pub(crate) struct Node<'s> {
        pub store: &'s TransactionStore,
        pub trail: Trail,
        pub domain: ItemDomain,
        pub cover: CoverTracker,
    }

    impl<'s> Node<'s> {
        pub fn new(store: &'s TransactionStore) -> Self {
            let mut trail = Trail::new();
            let domain = ItemDomain::new(&mut trail, store.nb_items());
            let cover = CoverTracker::new(&mut trail, store);
            Self {
                store,
                trail,
                domain,
                cover,
            }
        }

        pub fn present(&mut self, item: usize) {
            self.domain.fix_present(&mut self.trail, item).unwrap();
        }

        pub fn absent(&mut self, item: usize) {
            self.domain.fix_absent(&mut self.trail, item).unwrap();
        }

        pub fn run(&mut self, propagator: &mut dyn Propagator) -> Outcome {
            propagator.propagate(&mut DomainView::new(
                self.store,
                &mut self.trail,
                &self.domain,
                &mut self.cover,
            ))
        }
    }
}
