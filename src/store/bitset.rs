// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Fixed-universe bitset over transaction (or item) identifiers.
//!
//! Bit `i` of word `i / 64` is set when identifier `i` is in the set. Bits at
//! or beyond the universe size are always zero, so word-wise operations never
//! need masking except for [`BitSet::complement`].
//!
//! # Examples
//!
//! ```
//! use itemset_search::store::BitSet;
//!
//! let mut set = BitSet::empty(100);
//! set.insert(0);
//! set.insert(70);
//!
//! assert_eq!(set.len(), 2);
//! assert!(set.contains(70));
//! assert!(!set.contains(3));
//! assert_eq!(set.to_string(), "{0, 70}");
//! ```

use serde::{Serialize, Serializer};
use std::fmt;

/// Number of words needed for a universe of `nb_bits` identifiers.
pub fn words_for(nb_bits: usize) -> usize {
    nb_bits.div_ceil(64)
}

/// A set of identifiers in `0..universe`, stored as `u64` words.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitSet {
    words: Vec<u64>,
    universe: usize,
}

impl BitSet {
    /// Create an empty set over `universe` identifiers.
    pub fn empty(universe: usize) -> Self {
        Self {
            words: vec![0; words_for(universe)],
            universe,
        }
    }

    /// Create the set `0..universe`.
    pub fn full(universe: usize) -> Self {
        let mut words = vec![u64::MAX; words_for(universe)];
        let remaining_bits = universe % 64;
        if remaining_bits > 0 {
            if let Some(last) = words.last_mut() {
                *last = (1u64 << remaining_bits) - 1;
            }
        }
        Self { words, universe }
    }

    /// Build a set from raw words.
    ///
    /// # Panics
    ///
    /// Panics if the word count does not match the universe, or if a bit at
    /// or beyond `universe` is set.
    pub fn from_words(universe: usize, words: Vec<u64>) -> Self {
        assert_eq!(
            words.len(),
            words_for(universe),
            "BitSet word count mismatch for universe {}",
            universe
        );
        let set = Self { words, universe };
        assert_eq!(
            set.intersection(&Self::full(universe)),
            set,
            "BitSet has bits beyond universe {}",
            universe
        );
        set
    }

    /// Size of the universe.
    pub fn universe(&self) -> usize {
        self.universe
    }

    /// Check if the set contains `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id >= universe`.
    pub fn contains(&self, id: usize) -> bool {
        assert!(
            id < self.universe,
            "Identifier out of range: {} >= {}",
            id,
            self.universe
        );
        (self.words[id / 64] >> (id % 64)) & 1 != 0
    }

    /// Insert `id` into the set.
    ///
    /// # Panics
    ///
    /// Panics if `id >= universe`.
    pub fn insert(&mut self, id: usize) {
        assert!(
            id < self.universe,
            "Identifier out of range: {} >= {}",
            id,
            self.universe
        );
        self.words[id / 64] |= 1u64 << (id % 64);
    }

    /// Remove `id` from the set.
    ///
    /// # Panics
    ///
    /// Panics if `id >= universe`.
    pub fn remove(&mut self, id: usize) {
        assert!(
            id < self.universe,
            "Identifier out of range: {} >= {}",
            id,
            self.universe
        );
        self.words[id / 64] &= !(1u64 << (id % 64));
    }

    /// Population count.
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Get a reference to the underlying words.
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Remove every identifier, keeping the allocation.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// Make this an empty set over `universe`, reusing the allocation.
    pub fn reset(&mut self, universe: usize) {
        self.words.clear();
        self.words.resize(words_for(universe), 0);
        self.universe = universe;
    }

    /// Raw words for in-place writes. Bits at or beyond the universe must
    /// stay clear.
    pub(crate) fn words_mut(&mut self) -> &mut [u64] {
        &mut self.words
    }

    /// Iterate over identifiers in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(word_idx, &word)| {
            BitIter(word).map(move |bit| word_idx * 64 + bit)
        })
    }

    /// In-place intersection.
    pub fn intersect_with(&mut self, other: &Self) {
        for (w, o) in self.words.iter_mut().zip(&other.words) {
            *w &= *o;
        }
    }

    /// Compute the intersection of two sets.
    pub fn intersection(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.intersect_with(other);
        result
    }

    /// Compute the union of two sets.
    pub fn union(&self, other: &Self) -> Self {
        let mut result = self.clone();
        for (w, o) in result.words.iter_mut().zip(&other.words) {
            *w |= *o;
        }
        result
    }

    /// Compute the difference of two sets (self - other).
    pub fn difference(&self, other: &Self) -> Self {
        let mut result = self.clone();
        for (w, o) in result.words.iter_mut().zip(&other.words) {
            *w &= !*o;
        }
        result
    }

    /// Complement within the universe.
    pub fn complement(&self) -> Self {
        Self::full(self.universe).difference(self)
    }

    /// Size of the intersection, without allocating.
    pub fn and_count(&self, other: &Self) -> usize {
        self.words
            .iter()
            .zip(&other.words)
            .map(|(w, o)| (w & o).count_ones() as usize)
            .sum()
    }

    /// Check whether every element of `self` is in `other`.
    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.words.iter().zip(&other.words).all(|(w, o)| w & !o == 0)
    }
}

/// Iterator over the set bit positions of one word.
pub(crate) struct BitIter(pub(crate) u64);

impl Iterator for BitIter {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.0 == 0 {
            return None;
        }
        let bit = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(bit)
    }
}

impl fmt::Display for BitSet {
    /// Format a set as "{0, 5, 12, ...}".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        for id in self.iter() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}", id)?;
            first = false;
        }
        write!(f, "}}")
    }
}

impl Serialize for BitSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl BitSet {
    /// Build a set over `universe` from a list of identifiers.
    pub fn from_ids(universe: usize, ids: &[usize]) -> Self {
        let mut set = Self::empty(universe);
        for &id in ids {
            set.insert(id);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let set = BitSet::empty(10);
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        assert_eq!(set.words().len(), 1);
    }

    #[test]
    fn test_full() {
        for universe in [0, 1, 63, 64, 65, 130] {
            let set = BitSet::full(universe);
            assert_eq!(set.len(), universe, "universe {}", universe);
            for i in 0..universe {
                assert!(set.contains(i), "Missing id {}", i);
            }
        }
    }

    #[test]
    fn test_reset_reuses_set() {
        let mut set = BitSet::from_ids(100, &[3, 99]);
        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.universe(), 100);
        set.reset(10);
        assert_eq!(set, BitSet::empty(10));
        set.insert(9);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_insert_remove() {
        let mut set = BitSet::empty(200);
        set.insert(150);
        set.insert(150);
        assert_eq!(set.len(), 1);
        set.remove(150);
        set.remove(150);
        assert!(set.is_empty());
    }

    #[test]
    fn test_iter_across_words() {
        let set = BitSet::from_ids(200, &[199, 0, 64, 63]);
        let ids: Vec<_> = set.iter().collect();
        assert_eq!(ids, vec![0, 63, 64, 199]);
    }

    #[test]
    fn test_set_operations() {
        let a = BitSet::from_ids(70, &[1, 2, 3, 65]);
        let b = BitSet::from_ids(70, &[2, 3, 4, 69]);

        assert_eq!(a.intersection(&b), BitSet::from_ids(70, &[2, 3]));
        assert_eq!(a.union(&b), BitSet::from_ids(70, &[1, 2, 3, 4, 65, 69]));
        assert_eq!(a.difference(&b), BitSet::from_ids(70, &[1, 65]));
        assert_eq!(a.and_count(&b), 2);
    }

    #[test]
    fn test_complement_stays_in_universe() {
        let a = BitSet::from_ids(67, &[0, 66]);
        let c = a.complement();
        assert_eq!(c.len(), 65);
        assert!(!c.contains(0));
        assert!(!c.contains(66));
        assert_eq!(c.complement(), a);
    }

    #[test]
    fn test_subset() {
        let a = BitSet::from_ids(10, &[1, 2]);
        let b = BitSet::from_ids(10, &[1, 2, 5]);
        assert!(a.is_subset_of(&b));
        assert!(!b.is_subset_of(&a));
        assert!(BitSet::empty(10).is_subset_of(&a));
    }

    #[test]
    fn test_display() {
        assert_eq!(BitSet::empty(5).to_string(), "{}");
        assert_eq!(BitSet::from_ids(5, &[1, 4]).to_string(), "{1, 4}");
    }

    #[test]
    #[should_panic(expected = "Identifier out of range")]
    fn test_contains_out_of_range() {
        BitSet::empty(5).contains(5);
    }

    #[test]
    #[should_panic(expected = "bits beyond universe")]
    fn test_from_words_rejects_stray_bits() {
        BitSet::from_words(3, vec![0b1000]);
    }
}
