// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Complete patterns handed to monitors.

use crate::measure::{evaluate, Measure, MeasureValue};
use crate::store::{BitSet, TransactionStore};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// An itemset with its cover and the measures computed on it so far.
///
/// Items are kept sorted. Measure values are computed on demand and cached;
/// a pattern never changes once built, so the cache is never invalidated.
#[derive(Debug, Clone)]
pub struct Pattern {
    items: Vec<usize>,
    cover: BitSet,
    values: BTreeMap<Measure, MeasureValue>,
}

impl Pattern {
    /// Build from the items and their cover.
    ///
    /// `cover` must equal `store.cover_of(items)`.
    pub fn new(mut items: Vec<usize>, cover: BitSet) -> Self {
        items.sort_unstable();
        items.dedup();
        Self {
            items,
            cover,
            values: BTreeMap::new(),
        }
    }

    /// Build from the items, computing the cover.
    pub fn from_items(store: &TransactionStore, items: Vec<usize>) -> Self {
        let cover = store.cover_of(&items);
        Self::new(items, cover)
    }

    pub fn items(&self) -> &[usize] {
        &self.items
    }

    pub fn cover(&self) -> &BitSet {
        &self.cover
    }

    pub fn frequency(&self) -> usize {
        self.cover.len()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, item: usize) -> bool {
        self.items.binary_search(&item).is_ok()
    }

    /// Whether every item of `self` is in `other`.
    pub fn is_subset_of(&self, other: &Pattern) -> bool {
        self.items.iter().all(|&item| other.contains(item))
    }

    /// Value of `measure`, computed once.
    pub fn value(&mut self, measure: Measure, store: &TransactionStore) -> MeasureValue {
        let (items, cover) = (&self.items, &self.cover);
        *self
            .values
            .entry(measure)
            .or_insert_with(|| evaluate(measure, store, items, cover))
    }

    /// Values of `measures`, in order.
    pub fn values(&mut self, measures: &[Measure], store: &TransactionStore) -> Vec<MeasureValue> {
        measures.iter().map(|&m| self.value(m, store)).collect()
    }

    /// A value computed earlier, if any.
    pub fn cached(&self, measure: Measure) -> Option<MeasureValue> {
        self.values.get(&measure).copied()
    }

    /// Item labels from the store.
    pub fn labels(&self, store: &TransactionStore) -> Vec<String> {
        self.items.iter().map(|&item| store.label(item)).collect()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl Eq for Pattern {}

impl PartialOrd for Pattern {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pattern {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.items.cmp(&other.items)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (k, item) in self.items.iter().enumerate() {
            if k > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", item)?;
        }
        write!(f, "}} #{}", self.frequency())
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let measures: BTreeMap<String, MeasureValue> = self
            .values
            .iter()
            .map(|(measure, value)| (measure.to_string(), *value))
            .collect();
        let mut state = serializer.serialize_struct("Pattern", 3)?;
        state.serialize_field("items", &self.items)?;
        state.serialize_field("frequency", &self.frequency())?;
        state.serialize_field("measures", &measures)?;
        state.end()
    }
}
