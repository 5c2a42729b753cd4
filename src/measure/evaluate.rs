// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Exact measure values of complete patterns.

use super::{Aggregate, Measure, MeasureValue};
use crate::cover::CoverView;
use crate::store::TransactionStore;

/// Value of `measure` for the pattern `items` whose cover is `cover`.
///
/// `cover` must be the cover of `items`; frequency-family measures only read
/// its cardinality, intersected with the class partition where needed.
pub fn evaluate<C: CoverView>(
    measure: Measure,
    store: &TransactionStore,
    items: &[usize],
    cover: &C,
) -> MeasureValue {
    match measure {
        Measure::Freq => cover.cardinality().into(),
        Measure::Freq1 => class_frequency(store, cover, true).into(),
        Measure::Freq2 => class_frequency(store, cover, false).into(),
        Measure::FreqNeg => negative_frequency(store, items).into(),
        Measure::GrowthRate => growth_rate(
            store,
            class_frequency(store, cover, true),
            class_frequency(store, cover, false),
        ),
        Measure::Length => items.len().into(),
        Measure::Area => (cover.cardinality() * items.len()).into(),
        Measure::MaxFreq => max_item_frequency(store, items).into(),
        Measure::MinFreq => min_item_frequency(store, items).into(),
        Measure::AllConf => confidence(cover.cardinality(), max_item_frequency(store, items)),
        Measure::AnyConf => confidence(cover.cardinality(), min_item_frequency(store, items)),
        Measure::Attribute(aggregate, attribute) => {
            Extent::of(&store.attribute(attribute).values, cover)
                .value(aggregate)
                .into()
        }
    }
}

/// Frequency of a cover within the positive (`true`) or negative class.
///
/// Zero when the store has no classes.
pub(crate) fn class_frequency<C: CoverView>(
    store: &TransactionStore,
    cover: &C,
    positive: bool,
) -> usize {
    match store.positive_class() {
        Some(class) if positive => cover.and_count(class),
        Some(class) => cover.cardinality() - cover.and_count(class),
        None => 0,
    }
}

/// Number of transactions containing none of `items`.
pub(crate) fn negative_frequency(store: &TransactionStore, items: &[usize]) -> usize {
    let mut absent = store.full_cover().clone();
    for &item in items {
        absent.intersect_with(store.complement(item));
    }
    absent.len()
}

/// `(|D2| · freq1) / (|D1| · freq2)`; zero when `freq1` is zero.
pub(crate) fn growth_rate(store: &TransactionStore, freq1: usize, freq2: usize) -> MeasureValue {
    if freq1 == 0 {
        return MeasureValue::ratio(0, 1);
    }
    let d1 = store.class_count(true) as i64;
    let d2 = store.class_count(false) as i64;
    MeasureValue::ratio(d2 * freq1 as i64, d1 * freq2 as i64)
}

/// Largest item frequency; 0 for the empty pattern.
pub(crate) fn max_item_frequency(store: &TransactionStore, items: &[usize]) -> usize {
    items
        .iter()
        .map(|&item| store.item_frequency(item))
        .max()
        .unwrap_or(0)
}

/// Smallest item frequency; the number of transactions for the empty pattern.
pub(crate) fn min_item_frequency(store: &TransactionStore, items: &[usize]) -> usize {
    items
        .iter()
        .map(|&item| store.item_frequency(item))
        .min()
        .unwrap_or(store.nb_transactions())
}

/// `freq / reference`, with the empty-pattern convention `x / 0 = 1`.
pub(crate) fn confidence(freq: usize, reference: usize) -> MeasureValue {
    if reference == 0 {
        MeasureValue::ratio(1, 1)
    } else {
        MeasureValue::ratio(freq as i64, reference as i64)
    }
}

/// Running min/max/sum/count of attribute values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Extent {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub sum: f64,
}

impl Default for Extent {
    fn default() -> Self {
        Self {
            count: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            sum: 0.0,
        }
    }
}

impl Extent {
    pub fn of<C: CoverView>(values: &[f64], cover: &C) -> Self {
        let mut extent = Self::default();
        cover.for_each_transaction(|t| extent.push(values[t]));
        extent
    }

    pub fn push(&mut self, value: f64) {
        self.count += 1;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.sum += value;
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Aggregate value; every aggregate of an empty cover is 0.
    pub fn value(&self, aggregate: Aggregate) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        match aggregate {
            Aggregate::Min => self.min,
            Aggregate::Max => self.max,
            Aggregate::Mean => (self.min + self.max) / 2.0,
            Aggregate::Sum => self.sum,
            Aggregate::Avg => self.sum / self.count as f64,
        }
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

    fn eval(store: &TransactionStore, measure: Measure, items: &[usize]) -> MeasureValue {
        evaluate(measure, store, items, &store.cover_of(items))
    }

    #[test]
    fn test_frequency_family() {
        let s = store();
        assert_eq!(eval(&s, Measure::Freq, &[0, 1]), MeasureValue::Int(2));
        assert_eq!(eval(&s, Measure::Freq1, &[0, 1]), MeasureValue::Int(2));
        assert_eq!(eval(&s, Measure::Freq2, &[0, 1]), MeasureValue::Int(0));
        assert_eq!(eval(&s, Measure::Freq1, &[0]), MeasureValue::Int(2));
        assert_eq!(eval(&s, Measure::Freq2, &[0]), MeasureValue::Int(1));
        // Only t4 contains neither 0 nor 1.
        assert_eq!(eval(&s, Measure::FreqNeg, &[0, 1]), MeasureValue::Int(1));
        assert_eq!(eval(&s, Measure::FreqNeg, &[]), MeasureValue::Int(5));
    }

    #[test]
    fn test_growth_rate() {
        let s = store();
        // |D1| = 2, |D2| = 3
        assert_eq!(eval(&s, Measure::GrowthRate, &[0]), MeasureValue::ratio(3 * 2, 2));
        assert!(eval(&s, Measure::GrowthRate, &[0, 1]).is_infinite());
        assert_eq!(eval(&s, Measure::GrowthRate, &[1, 2]), MeasureValue::ratio(3, 2));
    }

    #[test]
    fn test_item_level_measures() {
        let s = store();
        assert_eq!(eval(&s, Measure::Length, &[0, 2]), MeasureValue::Int(2));
        assert_eq!(eval(&s, Measure::Area, &[0, 1]), MeasureValue::Int(4));
        assert_eq!(eval(&s, Measure::MaxFreq, &[]), MeasureValue::Int(0));
        assert_eq!(eval(&s, Measure::MinFreq, &[]), MeasureValue::Int(5));
        assert_eq!(eval(&s, Measure::AllConf, &[0, 1]), MeasureValue::ratio(2, 3));
        assert_eq!(eval(&s, Measure::AnyConf, &[]), MeasureValue::Int(1));
    }

    #[test]
    fn test_attribute_aggregates() {
        let s = store();
        // cover({2}) = {t1, t3, t4}: prices 2, 1, 3
        let m = |a| eval(&s, Measure::Attribute(a, 0), &[2]);
        assert_eq!(m(Aggregate::Min), MeasureValue::Real(1.0));
        assert_eq!(m(Aggregate::Max), MeasureValue::Real(3.0));
        assert_eq!(m(Aggregate::Mean), MeasureValue::Real(2.0));
        assert_eq!(m(Aggregate::Sum), MeasureValue::Real(6.0));
        assert_eq!(m(Aggregate::Avg), MeasureValue::Real(2.0));
        assert_eq!(
            eval(&s, Measure::Attribute(Aggregate::Min, 0), &[0, 1, 2]).as_f64(),
            2.0
        );
        // Empty cover.
        assert_eq!(
            evaluate(
                Measure::Attribute(Aggregate::Max, 0),
                &s,
                &[0],
                &crate::store::BitSet::empty(5)
            ),
            MeasureValue::Real(0.0)
        );
    }

    #[test]
    fn test_no_classes_gives_zero() {
        let s = TransactionStore::from_transactions(1, &[vec![0]]).unwrap();
        assert_eq!(eval(&s, Measure::Freq1, &[0]), MeasureValue::Int(0));
    }
}
