// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Cover tracking.
//!
//! The cover of a partial pattern is the set of transactions containing all
//! of its present items. Propagators keep their own cover as a
//! [`ReversibleSparseBitSet`] whose words live in the search context's trail,
//! and use [`SparseBitSet`] for throwaway covers rebuilt on each call.
//!
//! Measures read covers through the [`CoverView`] trait so the same formula
//! works on a stored [`BitSet`], a scratch sparse set or a reversible cover.

pub mod reversible;
pub mod sparse;

pub use reversible::{ReversibleCover, ReversibleSparseBitSet};
pub use sparse::SparseBitSet;

use crate::store::BitSet;

/// Read-only access to a set of transactions.
pub trait CoverView {
    fn cardinality(&self) -> usize;

    /// Size of the intersection with `other`.
    fn and_count(&self, other: &BitSet) -> usize;

    /// Call `f` once per transaction in the set (order unspecified).
    fn for_each_transaction(&self, f: impl FnMut(usize));
}

impl CoverView for BitSet {
    fn cardinality(&self) -> usize {
        self.len()
    }

    fn and_count(&self, other: &BitSet) -> usize {
        BitSet::and_count(self, other)
    }

    fn for_each_transaction(&self, mut f: impl FnMut(usize)) {
        for t in self.iter() {
            f(t);
        }
    }
}
