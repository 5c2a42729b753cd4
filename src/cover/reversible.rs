// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Reversible sparse bitset.
//!
//! The words of the set live in trail slots. A permutation `index` of the
//! word offsets keeps the live (possibly non-zero) words in `index[..live]`;
//! `live` is itself trailed. When an intersection zeroes a word, the word is
//! swapped to position `live - 1` and `live` is decremented, so later
//! operations never visit it again on this branch.
//!
//! The permutation is not trailed. Swaps only ever happen inside
//! `index[..live]`, so after a rewind restores a larger `live`, the set of
//! offsets in `index[..live]` is the same set it was at the save point, only
//! in a different order.
//!
//! A second, non-reversible word array (the mask) supports scratch
//! computations over the live words without touching the trail.
//!
//! The set is not `Clone`: a copy would share the trail slots
//! of its words while keeping its own permutation, and the two would drift
//! apart at the first compaction. Build a second set with
//! [`ReversibleSparseBitSet::new`].

use super::CoverView;
use crate::store::BitSet;
use crate::trail::{Slot, Trail, Trailed};

/// Trailed sparse bitset over a fixed universe of transactions.
#[derive(Debug)]
pub struct ReversibleSparseBitSet {
    first_word: Slot,
    universe: usize,
    index: Vec<usize>,
    live: Trailed<usize>,
    mask: Vec<u64>,
}

impl ReversibleSparseBitSet {
    /// Create a reversible copy of `initial`, allocating its words in `trail`.
    pub fn new(trail: &mut Trail, initial: &BitSet) -> Self {
        let words = initial.words();
        let first_word = trail.alloc_block(words);
        let mut index: Vec<usize> = (0..words.len()).filter(|&i| words[i] != 0).collect();
        let live_count = index.len();
        index.extend((0..words.len()).filter(|&i| words[i] == 0));
        Self {
            first_word,
            universe: initial.universe(),
            index,
            live: Trailed::new(trail, live_count),
            mask: vec![0; words.len()],
        }
    }

    /// Create a reversible set holding every transaction of the universe.
    pub fn full(trail: &mut Trail, universe: usize) -> Self {
        Self::new(trail, &BitSet::full(universe))
    }

    pub fn universe(&self) -> usize {
        self.universe
    }

    /// Number of words that may still hold a set bit.
    pub fn live_words(&self, trail: &Trail) -> usize {
        self.live.get(trail)
    }

    #[inline]
    fn word(&self, trail: &Trail, offset: usize) -> u64 {
        trail.get(self.first_word + offset)
    }

    #[inline]
    fn live_offsets<'a>(&'a self, trail: &Trail) -> &'a [usize] {
        &self.index[..self.live.get(trail)]
    }

    /// AND the set with `other`, compacting zeroed words out of the live index.
    ///
    /// Returns `false` when the set became (or already was) empty. The set
    /// stays fully restorable either way. Intersecting twice with the same
    /// set writes nothing the second time.
    pub fn intersect_with(&mut self, trail: &mut Trail, other: &BitSet) -> bool {
        let words = other.words();
        let mut live = self.live.get(trail);
        let mut i = live;
        while i > 0 {
            i -= 1;
            let offset = self.index[i];
            let slot = self.first_word + offset;
            let current = trail.get(slot);
            let updated = current & words[offset];
            if updated != current {
                trail.set(slot, updated);
                if updated == 0 {
                    live -= 1;
                    self.index.swap(i, live);
                }
            }
        }
        self.live.set(trail, live);
        live > 0
    }

    /// Popcount over live words only.
    pub fn cardinality(&self, trail: &Trail) -> usize {
        self.live_offsets(trail)
            .iter()
            .map(|&offset| self.word(trail, offset).count_ones() as usize)
            .sum()
    }

    /// Size of the intersection with `other`, without modifying the set.
    pub fn and_count(&self, trail: &Trail, other: &BitSet) -> usize {
        let words = other.words();
        self.live_offsets(trail)
            .iter()
            .map(|&offset| (self.word(trail, offset) & words[offset]).count_ones() as usize)
            .sum()
    }

    pub fn is_empty(&self, trail: &Trail) -> bool {
        self.live.get(trail) == 0
    }

    pub fn is_subset_of(&self, trail: &Trail, other: &BitSet) -> bool {
        let words = other.words();
        self.live_offsets(trail)
            .iter()
            .all(|&offset| self.word(trail, offset) & !words[offset] == 0)
    }

    pub fn is_disjoint_from(&self, trail: &Trail, other: &BitSet) -> bool {
        let words = other.words();
        self.live_offsets(trail)
            .iter()
            .all(|&offset| self.word(trail, offset) & words[offset] == 0)
    }

    pub fn contains(&self, trail: &Trail, transaction: usize) -> bool {
        (self.word(trail, transaction / 64) >> (transaction % 64)) & 1 != 0
    }

    /// Materialise the current content.
    pub fn to_bitset(&self, trail: &Trail) -> BitSet {
        let mut set = BitSet::empty(self.universe);
        self.copy_into(trail, &mut set);
        set
    }

    /// Overwrite `target` with the current content, reusing its words.
    pub fn copy_into(&self, trail: &Trail, target: &mut BitSet) {
        self.prepare(target);
        let words = target.words_mut();
        for &offset in self.live_offsets(trail) {
            words[offset] = self.word(trail, offset);
        }
    }

    fn prepare(&self, target: &mut BitSet) {
        if target.universe() == self.universe {
            target.clear();
        } else {
            target.reset(self.universe);
        }
    }

    /// Borrow the set together with the trail holding its words.
    pub fn view<'a>(&'a self, trail: &'a Trail) -> ReversibleCover<'a> {
        ReversibleCover { set: self, trail }
    }

    /// Copy the live words into the mask.
    pub fn reset_mask(&mut self, trail: &Trail) {
        let live = self.live.get(trail);
        for &offset in &self.index[..live] {
            self.mask[offset] = trail.get(self.first_word + offset);
        }
    }

    /// AND the mask with `other` over the live words.
    pub fn and_mask(&mut self, trail: &Trail, other: &BitSet) {
        let words = other.words();
        let live = self.live.get(trail);
        for &offset in &self.index[..live] {
            self.mask[offset] &= words[offset];
        }
    }

    pub fn mask_cardinality(&self, trail: &Trail) -> usize {
        self.live_offsets(trail)
            .iter()
            .map(|&offset| self.mask[offset].count_ones() as usize)
            .sum()
    }

    /// Size of the intersection of the mask with `other`.
    pub fn mask_and_count(&self, trail: &Trail, other: &BitSet) -> usize {
        let words = other.words();
        self.live_offsets(trail)
            .iter()
            .map(|&offset| (self.mask[offset] & words[offset]).count_ones() as usize)
            .sum()
    }

    pub fn mask_is_subset_of(&self, trail: &Trail, other: &BitSet) -> bool {
        let words = other.words();
        self.live_offsets(trail)
            .iter()
            .all(|&offset| self.mask[offset] & !words[offset] == 0)
    }

    /// Call `f` for each transaction of the set, restricted to `other` if given.
    pub fn for_each_and(&self, trail: &Trail, other: Option<&BitSet>, mut f: impl FnMut(usize)) {
        for &offset in self.live_offsets(trail) {
            let filter = other.map_or(u64::MAX, |o| o.words()[offset]);
            for_each_bit(offset, self.word(trail, offset) & filter, &mut f);
        }
    }

    /// Call `f` for each transaction of the mask, restricted to `other` if given.
    pub fn mask_for_each_and(
        &self,
        trail: &Trail,
        other: Option<&BitSet>,
        mut f: impl FnMut(usize),
    ) {
        for &offset in self.live_offsets(trail) {
            let filter = other.map_or(u64::MAX, |o| o.words()[offset]);
            for_each_bit(offset, self.mask[offset] & filter, &mut f);
        }
    }

    /// Materialise the mask over the live words.
    pub fn mask_to_bitset(&self, trail: &Trail) -> BitSet {
        let mut set = BitSet::empty(self.universe);
        self.mask_copy_into(trail, &mut set);
        set
    }

    /// Overwrite `target` with the mask over the live words.
    pub fn mask_copy_into(&self, trail: &Trail, target: &mut BitSet) {
        self.prepare(target);
        let words = target.words_mut();
        for &offset in self.live_offsets(trail) {
            words[offset] = self.mask[offset];
        }
    }
}

/// A reversible set read through its trail.
#[derive(Debug, Clone, Copy)]
pub struct ReversibleCover<'a> {
    set: &'a ReversibleSparseBitSet,
    trail: &'a Trail,
}

impl CoverView for ReversibleCover<'_> {
    fn cardinality(&self) -> usize {
        self.set.cardinality(self.trail)
    }

    fn and_count(&self, other: &BitSet) -> usize {
        self.set.and_count(self.trail, other)
    }

    fn for_each_transaction(&self, f: impl FnMut(usize)) {
        self.set.for_each_and(self.trail, None, f);
    }
}

#[inline]
fn for_each_bit(offset: usize, mut word: u64, f: &mut impl FnMut(usize)) {
    while word != 0 {
        f(offset * 64 + word.trailing_zeros() as usize);
        word &= word - 1;
    }
}
