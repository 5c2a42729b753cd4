// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Incremental measure computers for adequate closure.
//!
//! A computer follows the current pattern through [`MeasureComputer::update`]
//! and answers whether adding an item would leave its measure unchanged.
//! Covers are never intersected here: every question is asked against the
//! branch cover, whose mask serves as scratch. Any other incremental state
//! lives in the trail, so it is restored together with the rest of the
//! search state.

use super::evaluate::Extent;
use super::{Aggregate, Measure};
use crate::cover::ReversibleSparseBitSet;
use crate::store::{BitSet, TransactionStore};
use crate::trail::{Trail, Trailed};
use std::fmt::Debug;

/// Incremental evaluation of one closable measure.
pub trait MeasureComputer: Debug {
    fn measure(&self) -> Measure;

    /// Whether an item that keeps the measure of a pattern keeps it for
    /// every superset too.
    ///
    /// Holds for cover cardinalities and item-valued measures. Aggregates of
    /// per-transaction values do not: the transaction carrying the extreme
    /// can leave the cover as items are added.
    fn is_hereditary(&self) -> bool {
        true
    }

    /// Put the state in line with the empty pattern. Called once at the root.
    fn reset(&mut self, store: &TransactionStore, trail: &mut Trail);

    /// Record that `added` joined the pattern, whose cover is now `cover`.
    fn update(
        &mut self,
        store: &TransactionStore,
        trail: &mut Trail,
        added: &[usize],
        cover: &ReversibleSparseBitSet,
    );

    /// Whether adding `item` to the current pattern keeps the measure.
    fn is_constant(
        &mut self,
        store: &TransactionStore,
        trail: &Trail,
        cover: &mut ReversibleSparseBitSet,
        item: usize,
    ) -> bool;

    /// Whether adding `item` to the current pattern extended by `with` keeps
    /// the measure of that extended pattern.
    fn is_constant_pair(
        &mut self,
        store: &TransactionStore,
        trail: &Trail,
        cover: &mut ReversibleSparseBitSet,
        item: usize,
        with: usize,
    ) -> bool;
}

/// Computer for a closable measure, `None` when the measure has none.
pub fn computer_for(
    measure: Measure,
    store: &TransactionStore,
    trail: &mut Trail,
) -> Option<Box<dyn MeasureComputer>> {
    let computer: Box<dyn MeasureComputer> = match measure {
        Measure::Freq => Box::new(CoverComputer::new(measure, None)),
        Measure::Freq1 => Box::new(CoverComputer::new(
            measure,
            Some(store.positive_class()?.clone()),
        )),
        Measure::Freq2 => Box::new(CoverComputer::new(measure, Some(store.negative_class()?))),
        Measure::MaxFreq => Box::new(MaxFreqComputer::new(trail)),
        Measure::Attribute(aggregate @ (Aggregate::Min | Aggregate::Max | Aggregate::Mean), a) => {
            Box::new(AttributeComputer::new(aggregate, a, store, trail))
        }
        _ => return None,
    };
    Some(computer)
}

/// Cardinality of the cover, possibly restricted to one class.
///
/// Adding `i` keeps `|C ∩ base|` iff `C ∩ base ⊆ cover(i)`.
#[derive(Debug)]
pub struct CoverComputer {
    measure: Measure,
    /// `None` for the whole store.
    base: Option<BitSet>,
}

impl CoverComputer {
    pub fn new(measure: Measure, base: Option<BitSet>) -> Self {
        Self { measure, base }
    }
}

impl MeasureComputer for CoverComputer {
    fn measure(&self) -> Measure {
        self.measure
    }

    fn reset(&mut self, _store: &TransactionStore, _trail: &mut Trail) {}

    fn update(
        &mut self,
        _store: &TransactionStore,
        _trail: &mut Trail,
        _added: &[usize],
        _cover: &ReversibleSparseBitSet,
    ) {
    }

    fn is_constant(
        &mut self,
        store: &TransactionStore,
        trail: &Trail,
        cover: &mut ReversibleSparseBitSet,
        item: usize,
    ) -> bool {
        match &self.base {
            None => cover.is_subset_of(trail, store.cover(item)),
            Some(base) => {
                cover.reset_mask(trail);
                cover.and_mask(trail, base);
                cover.mask_is_subset_of(trail, store.cover(item))
            }
        }
    }

    fn is_constant_pair(
        &mut self,
        store: &TransactionStore,
        trail: &Trail,
        cover: &mut ReversibleSparseBitSet,
        item: usize,
        with: usize,
    ) -> bool {
        cover.reset_mask(trail);
        cover.and_mask(trail, store.cover(with));
        if let Some(base) = &self.base {
            cover.and_mask(trail, base);
        }
        cover.mask_is_subset_of(trail, store.cover(item))
    }
}

/// Largest item frequency of the pattern.
#[derive(Debug)]
pub struct MaxFreqComputer {
    current: Trailed<usize>,
}

impl MaxFreqComputer {
    pub fn new(trail: &mut Trail) -> Self {
        Self {
            current: Trailed::new(trail, 0),
        }
    }
}

impl MeasureComputer for MaxFreqComputer {
    fn measure(&self) -> Measure {
        Measure::MaxFreq
    }

    fn reset(&mut self, _store: &TransactionStore, trail: &mut Trail) {
        self.current.set(trail, 0);
    }

    fn update(
        &mut self,
        store: &TransactionStore,
        trail: &mut Trail,
        added: &[usize],
        _cover: &ReversibleSparseBitSet,
    ) {
        let largest = added.iter().map(|&item| store.item_frequency(item)).max();
        if let Some(freq) = largest.filter(|&freq| freq > self.current.get(trail)) {
            self.current.set(trail, freq);
        }
    }

    fn is_constant(
        &mut self,
        store: &TransactionStore,
        trail: &Trail,
        _cover: &mut ReversibleSparseBitSet,
        item: usize,
    ) -> bool {
        store.item_frequency(item) <= self.current.get(trail)
    }

    fn is_constant_pair(
        &mut self,
        store: &TransactionStore,
        trail: &Trail,
        _cover: &mut ReversibleSparseBitSet,
        item: usize,
        with: usize,
    ) -> bool {
        let extended = self.current.get(trail).max(store.item_frequency(with));
        store.item_frequency(item) <= extended
    }
}

/// Min, max or mean of a per-transaction attribute over the cover.
///
/// Not hereditary: with values `[5, 1, 5]` on transactions `{0, 1}`,
/// `{0, 1, 2}` and `{2}`, both items 0 and 2 keep the max 5 of the empty
/// pattern, while `{0, 2}` only covers the transaction valued 1.
#[derive(Debug)]
pub struct AttributeComputer {
    aggregate: Aggregate,
    attribute: usize,
    value: Trailed<f64>,
}

impl AttributeComputer {
    pub fn new(
        aggregate: Aggregate,
        attribute: usize,
        store: &TransactionStore,
        trail: &mut Trail,
    ) -> Self {
        let value = Trailed::new(trail, 0.0);
        let mut computer = Self {
            aggregate,
            attribute,
            value,
        };
        computer.reset(store, trail);
        computer
    }

    fn values<'a>(&self, store: &'a TransactionStore) -> &'a [f64] {
        &store.attribute(self.attribute).values
    }
}

impl MeasureComputer for AttributeComputer {
    fn measure(&self) -> Measure {
        Measure::Attribute(self.aggregate, self.attribute)
    }

    fn is_hereditary(&self) -> bool {
        false
    }

    fn reset(&mut self, store: &TransactionStore, trail: &mut Trail) {
        let value = Extent::of(self.values(store), store.full_cover()).value(self.aggregate);
        self.value.set(trail, value);
    }

    fn update(
        &mut self,
        store: &TransactionStore,
        trail: &mut Trail,
        _added: &[usize],
        cover: &ReversibleSparseBitSet,
    ) {
        let values = self.values(store);
        let mut extent = Extent::default();
        cover.for_each_and(trail, None, |t| extent.push(values[t]));
        self.value.set(trail, extent.value(self.aggregate));
    }

    fn is_constant(
        &mut self,
        store: &TransactionStore,
        trail: &Trail,
        cover: &mut ReversibleSparseBitSet,
        item: usize,
    ) -> bool {
        let values = self.values(store);
        let mut extent = Extent::default();
        cover.for_each_and(trail, Some(store.cover(item)), |t| extent.push(values[t]));
        extent.value(self.aggregate) == self.value.get(trail)
    }

    fn is_constant_pair(
        &mut self,
        store: &TransactionStore,
        trail: &Trail,
        cover: &mut ReversibleSparseBitSet,
        item: usize,
        with: usize,
    ) -> bool {
        let values = self.values(store);
        cover.reset_mask(trail);
        cover.and_mask(trail, store.cover(with));
        let mut extended = Extent::default();
        cover.mask_for_each_and(trail, None, |t| extended.push(values[t]));
        let mut both = Extent::default();
        cover.mask_for_each_and(trail, Some(store.cover(item)), |t| both.push(values[t]));
        both.value(self.aggregate) == extended.value(self.aggregate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreBuilder;

    fn store() -> TransactionStore {
        StoreBuilder::new(3)
            .transaction(&[0, 1])
            .transaction(&[0, 1, 2])
            .transaction(&[0])
            .transaction(&[1, 2])
            .transaction(&[2])
            .classes(&[true, true, false, false, false])
            .attribute("price", vec![4.0, 2.0, 10.0, 1.0, 3.0])
            .build()
            .unwrap()
    }

    /// Branch cover plus the computers following it.
    struct Branch {
        trail: Trail,
        cover: ReversibleSparseBitSet,
    }

    impl Branch {
        fn new(s: &TransactionStore) -> Self {
            let mut trail = Trail::new();
            let cover = ReversibleSparseBitSet::new(&mut trail, s.full_cover());
            Self { trail, cover }
        }

        fn add(&mut self, s: &TransactionStore, computer: &mut dyn MeasureComputer, item: usize) {
            self.cover.intersect_with(&mut self.trail, s.cover(item));
            computer.update(s, &mut self.trail, &[item], &self.cover);
        }

        fn constant(&mut self, s: &TransactionStore, c: &mut dyn MeasureComputer, item: usize) -> bool {
            c.is_constant(s, &self.trail, &mut self.cover, item)
        }

        fn pair(
            &mut self,
            s: &TransactionStore,
            c: &mut dyn MeasureComputer,
            item: usize,
            with: usize,
        ) -> bool {
            c.is_constant_pair(s, &self.trail, &mut self.cover, item, with)
        }
    }

    #[test]
    fn test_cover_computer_tracks_frequency() {
        let s = store();
        let mut b = Branch::new(&s);
        let mut freq = computer_for(Measure::Freq, &s, &mut b.trail).unwrap();
        assert!(!b.constant(&s, freq.as_mut(), 0));
        b.add(&s, freq.as_mut(), 0);
        // cover({0}) = {t0, t1, t2}; 1 drops t2
        assert!(!b.constant(&s, freq.as_mut(), 1));
        b.add(&s, freq.as_mut(), 1);
        assert!(b.constant(&s, freq.as_mut(), 0));
        assert!(freq.is_hereditary());
    }

    #[test]
    fn test_class_frequency_ignores_other_class() {
        let s = store();
        let mut b = Branch::new(&s);
        let mut freq1 = computer_for(Measure::Freq1, &s, &mut b.trail).unwrap();
        let mut freq = computer_for(Measure::Freq, &s, &mut b.trail).unwrap();
        b.add(&s, freq1.as_mut(), 0);
        // Positive transactions of {0} are t0, t1, both containing 1.
        assert!(b.constant(&s, freq1.as_mut(), 1));
        assert!(!b.constant(&s, freq.as_mut(), 1));
        // Negative transactions of {0}: t2 only, which lacks 1.
        let mut freq2 = computer_for(Measure::Freq2, &s, &mut b.trail).unwrap();
        assert!(!b.constant(&s, freq2.as_mut(), 1));
    }

    #[test]
    fn test_pair_on_cover() {
        let s = store();
        let mut b = Branch::new(&s);
        let mut freq = computer_for(Measure::Freq, &s, &mut b.trail).unwrap();
        // cover({2}) = {t1, t3, t4} and cover({1, 2}) = {t1, t3}
        assert!(!b.pair(&s, freq.as_mut(), 1, 2));
        b.add(&s, freq.as_mut(), 1);
        // From {1}: cover({1, 0}) = {t0, t1} ⊆ cover(0)
        assert!(b.pair(&s, freq.as_mut(), 0, 0));
        assert!(!b.pair(&s, freq.as_mut(), 2, 0));
    }

    #[test]
    fn test_max_freq_restored_with_trail() {
        let s = store();
        let mut b = Branch::new(&s);
        let mut maxfreq = computer_for(Measure::MaxFreq, &s, &mut b.trail).unwrap();
        maxfreq.reset(&s, &mut b.trail);
        let level = b.trail.save_state();
        b.add(&s, maxfreq.as_mut(), 0);
        assert!(b.constant(&s, maxfreq.as_mut(), 1));
        b.trail.restore_state(level);
        assert!(!b.constant(&s, maxfreq.as_mut(), 1));
        assert!(b.pair(&s, maxfreq.as_mut(), 1, 2));
    }

    #[test]
    fn test_attribute_max() {
        let s = store();
        let mut b = Branch::new(&s);
        let max = Measure::Attribute(Aggregate::Max, 0);
        let mut computer = computer_for(max, &s, &mut b.trail).unwrap();
        assert!(!computer.is_hereditary());
        // Full cover max is 10 at t2, which only contains 0.
        assert!(b.constant(&s, computer.as_mut(), 0));
        assert!(!b.constant(&s, computer.as_mut(), 1));
        b.add(&s, computer.as_mut(), 2);
        // cover({2}) prices 2, 1, 3; adding 1 keeps t1, t3 with max 2
        assert!(!b.constant(&s, computer.as_mut(), 1));
        // From {2, 1} = {t1, t3}, adding 0 keeps t1 with max 2
        assert!(b.pair(&s, computer.as_mut(), 0, 1));
    }

    #[test]
    fn test_attribute_constancy_is_not_hereditary() {
        let s = StoreBuilder::new(3)
            .transaction(&[0, 1])
            .transaction(&[0, 1, 2])
            .transaction(&[2])
            .attribute("a", vec![5.0, 1.0, 5.0])
            .build()
            .unwrap();
        let mut b = Branch::new(&s);
        let max = Measure::Attribute(Aggregate::Max, 0);
        let mut computer = computer_for(max, &s, &mut b.trail).unwrap();
        assert!(b.constant(&s, computer.as_mut(), 0));
        assert!(b.constant(&s, computer.as_mut(), 2));
        b.add(&s, computer.as_mut(), 0);
        assert!(!b.constant(&s, computer.as_mut(), 2));
    }

    #[test]
    fn test_not_closable() {
        let s = store();
        let mut trail = Trail::new();
        assert!(computer_for(Measure::Area, &s, &mut trail).is_none());
        assert!(computer_for(Measure::Attribute(Aggregate::Sum, 0), &s, &mut trail).is_none());
        let unlabelled = TransactionStore::from_transactions(1, &[vec![0]]).unwrap();
        assert!(computer_for(Measure::Freq1, &unlabelled, &mut trail).is_none());
    }
}
