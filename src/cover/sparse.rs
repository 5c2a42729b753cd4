// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Non-reversible sparse bitset for scratch covers.
//!
//! Same live-word compaction as [`super::ReversibleSparseBitSet`] but with
//! plain owned words. Propagators use it for covers they rebuild on every
//! call (sub-covers of the present items, covers of hypothetical completions).

use super::{CoverView, ReversibleSparseBitSet};
use crate::store::BitSet;
use crate::trail::Trail;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseBitSet {
    words: Vec<u64>,
    index: Vec<usize>,
    live: usize,
    universe: usize,
}

impl SparseBitSet {
    pub fn full(universe: usize) -> Self {
        Self::from_bitset(&BitSet::full(universe))
    }

    pub fn from_bitset(set: &BitSet) -> Self {
        let words = set.words().to_vec();
        let index: Vec<usize> = (0..words.len()).filter(|&i| words[i] != 0).collect();
        Self {
            live: index.len(),
            index,
            words,
            universe: set.universe(),
        }
    }

    /// Snapshot of the current content of a reversible set.
    pub fn from_reversible(set: &ReversibleSparseBitSet, trail: &Trail) -> Self {
        Self::from_bitset(&set.to_bitset(trail))
    }

    /// AND with `other`, dropping words that become zero.
    pub fn and(&mut self, other: &BitSet) {
        let words = other.words();
        let mut i = self.live;
        while i > 0 {
            i -= 1;
            let offset = self.index[i];
            self.words[offset] &= words[offset];
            if self.words[offset] == 0 {
                self.live -= 1;
                self.index.swap(i, self.live);
            }
        }
    }

    pub fn cardinality(&self) -> usize {
        self.index[..self.live]
            .iter()
            .map(|&offset| self.words[offset].count_ones() as usize)
            .sum()
    }

    pub fn and_count(&self, other: &BitSet) -> usize {
        let words = other.words();
        self.index[..self.live]
            .iter()
            .map(|&offset| (self.words[offset] & words[offset]).count_ones() as usize)
            .sum()
    }

    pub fn is_subset_of(&self, other: &BitSet) -> bool {
        let words = other.words();
        self.index[..self.live]
            .iter()
            .all(|&offset| self.words[offset] & !words[offset] == 0)
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn to_bitset(&self) -> BitSet {
        BitSet::from_words(self.universe, self.words.clone())
    }
}

impl CoverView for SparseBitSet {
    fn cardinality(&self) -> usize {
        SparseBitSet::cardinality(self)
    }

    fn and_count(&self, other: &BitSet) -> usize {
        SparseBitSet::and_count(self, other)
    }

    fn for_each_transaction(&self, mut f: impl FnMut(usize)) {
        for &offset in &self.index[..self.live] {
            let mut word = self.words[offset];
            while word != 0 {
                f(offset * 64 + word.trailing_zeros() as usize);
                word &= word - 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_and_and_count() {
        let mut set = SparseBitSet::full(130);
        set.and(&BitSet::from_ids(130, &[0, 64, 65, 129]));
        assert_eq!(set.cardinality(), 4);
        set.and(&BitSet::from_ids(130, &[64, 65]));
        assert_eq!(set.cardinality(), 2);
        assert_eq!(set.and_count(&BitSet::from_ids(130, &[65])), 1);
        assert!(set.is_subset_of(&BitSet::from_ids(130, &[64, 65, 100])));
        assert_eq!(set.to_bitset(), BitSet::from_ids(130, &[64, 65]));
    }

    #[test]
    fn test_and_to_empty() {
        let mut set = SparseBitSet::full(10);
        set.and(&BitSet::empty(10));
        assert!(set.is_empty());
        assert_eq!(set.cardinality(), 0);
        assert!(set.is_subset_of(&BitSet::empty(10)));
    }

    #[test]
    fn test_snapshot_of_reversible() {
        let mut trail = Trail::new();
        let mut cover = ReversibleSparseBitSet::full(&mut trail, 20);
        cover.intersect_with(&mut trail, &BitSet::from_ids(20, &[3, 4]));
        let snapshot = SparseBitSet::from_reversible(&cover, &trail);
        assert_eq!(snapshot.cardinality(), 2);
    }
}
