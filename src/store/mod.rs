// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Immutable transaction store.
//!
//! The store is the vertical representation of a transactional dataset: for
//! every item, the set of transactions containing it, plus its complement.
//! Optional extras are a two-class partition of the transactions (for
//! `freq1`, `freq2` and growth rate) and named per-transaction numeric
//! attributes (for min/max/mean/sum/avg measures).
//!
//! The store is built once and never mutated. It is `Send + Sync` and meant to
//! be shared through an `Arc` by every search context of a run.
//!
//! # Example
//!
//! ```
//! use itemset_search::store::StoreBuilder;
//!
//! let store = StoreBuilder::new(3)
//!     .transaction(&[0, 1])
//!     .transaction(&[0, 1, 2])
//!     .transaction(&[0])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(store.item_frequency(0), 3);
//! assert_eq!(store.cover_of(&[0, 1]).len(), 2);
//! ```

pub mod bitset;

pub use bitset::BitSet;

use crate::error::StoreError;
use tracing::info;

/// A named numeric value per transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub values: Vec<f64>,
}

/// Vertical bit index over a transactional dataset.
#[derive(Debug, Clone)]
pub struct TransactionStore {
    nb_items: usize,
    nb_transactions: usize,
    /// item → transactions containing it
    covers: Vec<BitSet>,
    /// item → transactions not containing it
    complements: Vec<BitSet>,
    /// transaction → items
    rows: Vec<BitSet>,
    item_frequencies: Vec<usize>,
    full: BitSet,
    /// Positive-class transactions, when the dataset is labelled.
    positive: Option<BitSet>,
    attributes: Vec<Attribute>,
    labels: Vec<String>,
}

impl TransactionStore {
    /// Convenience constructor from rows of item identifiers.
    pub fn from_transactions(
        nb_items: usize,
        rows: &[Vec<usize>],
    ) -> Result<Self, StoreError> {
        rows.iter()
            .fold(StoreBuilder::new(nb_items), |builder, row| {
                builder.transaction(row)
            })
            .build()
    }

    pub fn nb_items(&self) -> usize {
        self.nb_items
    }

    pub fn nb_transactions(&self) -> usize {
        self.nb_transactions
    }

    /// Transactions containing `item`.
    pub fn cover(&self, item: usize) -> &BitSet {
        &self.covers[item]
    }

    /// Transactions not containing `item`.
    pub fn complement(&self, item: usize) -> &BitSet {
        &self.complements[item]
    }

    /// All transactions: the cover of the empty pattern.
    pub fn full_cover(&self) -> &BitSet {
        &self.full
    }

    /// Intersection of the covers of `items`.
    pub fn cover_of(&self, items: &[usize]) -> BitSet {
        let mut cover = self.full.clone();
        for &item in items {
            cover.intersect_with(&self.covers[item]);
        }
        cover
    }

    /// Items of transaction `t`.
    pub fn transaction(&self, t: usize) -> &BitSet {
        &self.rows[t]
    }

    pub fn item_frequency(&self, item: usize) -> usize {
        self.item_frequencies[item]
    }

    pub fn item_frequencies(&self) -> &[usize] {
        &self.item_frequencies
    }

    /// Whether the transactions carry a two-class partition.
    pub fn has_classes(&self) -> bool {
        self.positive.is_some()
    }

    /// Positive-class transactions (D1).
    pub fn positive_class(&self) -> Option<&BitSet> {
        self.positive.as_ref()
    }

    /// Negative-class transactions (D2).
    pub fn negative_class(&self) -> Option<BitSet> {
        self.positive.as_ref().map(BitSet::complement)
    }

    /// Number of transactions in the positive (`true`) or negative class.
    pub fn class_count(&self, positive: bool) -> usize {
        match &self.positive {
            Some(p) if positive => p.len(),
            Some(p) => self.nb_transactions - p.len(),
            None => 0,
        }
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, index: usize) -> &Attribute {
        &self.attributes[index]
    }

    /// Resolve an attribute by name, or by decimal index.
    pub fn attribute_index(&self, key: &str) -> Option<usize> {
        self.attributes
            .iter()
            .position(|a| a.name == key)
            .or_else(|| {
                key.parse::<usize>()
                    .ok()
                    .filter(|&index| index < self.attributes.len())
            })
    }

    /// Display label of an item (its identifier when unlabelled).
    pub fn label(&self, item: usize) -> String {
        self.labels
            .get(item)
            .cloned()
            .unwrap_or_else(|| item.to_string())
    }

    /// Fraction of set bits in the item × transaction matrix.
    pub fn density(&self) -> f64 {
        let cells = self.nb_items * self.nb_transactions;
        if cells == 0 {
            return 0.0;
        }
        self.item_frequencies.iter().sum::<usize>() as f64 / cells as f64
    }
}

/// Builder for [`TransactionStore`].
#[derive(Debug, Default)]
pub struct StoreBuilder {
    nb_items: usize,
    rows: Vec<Vec<usize>>,
    classes: Option<Vec<bool>>,
    attributes: Vec<Attribute>,
    labels: Option<Vec<String>>,
}

impl StoreBuilder {
    pub fn new(nb_items: usize) -> Self {
        Self {
            nb_items,
            ..Self::default()
        }
    }

    /// Append one transaction.
    pub fn transaction(mut self, items: &[usize]) -> Self {
        self.rows.push(items.to_vec());
        self
    }

    /// Positive-class flag per transaction.
    pub fn classes(mut self, positive: &[bool]) -> Self {
        self.classes = Some(positive.to_vec());
        self
    }

    /// Named numeric value per transaction.
    pub fn attribute(mut self, name: &str, values: Vec<f64>) -> Self {
        self.attributes.push(Attribute {
            name: name.to_string(),
            values,
        });
        self
    }

    /// Display labels, one per item.
    pub fn labels(mut self, labels: Vec<String>) -> Self {
        self.labels = Some(labels);
        self
    }

    pub fn build(self) -> Result<TransactionStore, StoreError> {
        let nb_items = self.nb_items;
        let nb_transactions = self.rows.len();

        let mut covers = vec![BitSet::empty(nb_transactions); nb_items];
        let mut rows = Vec::with_capacity(nb_transactions);
        for (t, row) in self.rows.iter().enumerate() {
            let mut items = BitSet::empty(nb_items);
            for &item in row {
                if item >= nb_items {
                    return Err(StoreError::ItemOutOfRange {
                        item,
                        transaction: t,
                        nb_items,
                    });
                }
                covers[item].insert(t);
                items.insert(item);
            }
            rows.push(items);
        }

        let positive = match self.classes {
            Some(flags) if flags.len() != nb_transactions => {
                return Err(StoreError::ClassLength {
                    expected: nb_transactions,
                    actual: flags.len(),
                });
            }
            Some(flags) => {
                let mut set = BitSet::empty(nb_transactions);
                for (t, &flag) in flags.iter().enumerate() {
                    if flag {
                        set.insert(t);
                    }
                }
                Some(set)
            }
            None => None,
        };

        for (i, attribute) in self.attributes.iter().enumerate() {
            if attribute.values.len() != nb_transactions {
                return Err(StoreError::AttributeLength {
                    name: attribute.name.clone(),
                    expected: nb_transactions,
                    actual: attribute.values.len(),
                });
            }
            if self.attributes[..i].iter().any(|a| a.name == attribute.name) {
                return Err(StoreError::DuplicateAttribute(attribute.name.clone()));
            }
        }

        let labels = match self.labels {
            Some(labels) if labels.len() != nb_items => {
                return Err(StoreError::LabelCount {
                    expected: nb_items,
                    actual: labels.len(),
                });
            }
            Some(labels) => labels,
            None => Vec::new(),
        };

        let complements = covers.iter().map(BitSet::complement).collect();
        let item_frequencies = covers.iter().map(BitSet::len).collect();

        let store = TransactionStore {
            nb_items,
            nb_transactions,
            covers,
            complements,
            rows,
            item_frequencies,
            full: BitSet::full(nb_transactions),
            positive,
            attributes: self.attributes,
            labels,
        };
        info!(
            items = store.nb_items,
            transactions = store.nb_transactions,
            density = store.density(),
            classes = store.has_classes(),
            attributes = store.attributes.len(),
            "transaction store built"
        );
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worked_example() -> TransactionStore {
        TransactionStore::from_transactions(
            3,
            &[vec![0, 1], vec![0, 1, 2], vec![0], vec![1, 2], vec![2]],
        )
        .unwrap()
    }

    #[test]
    fn test_covers() {
        let store = worked_example();
        assert_eq!(store.nb_items(), 3);
        assert_eq!(store.nb_transactions(), 5);
        assert_eq!(store.cover(0).to_string(), "{0, 1, 2}");
        assert_eq!(store.complement(0).to_string(), "{3, 4}");
        assert_eq!(store.cover_of(&[0, 1]).to_string(), "{0, 1}");
        assert_eq!(store.cover_of(&[]).len(), 5);
        assert_eq!(store.item_frequencies(), &[3, 3, 3]);
        assert_eq!(store.transaction(1).to_string(), "{0, 1, 2}");
    }

    #[test]
    fn test_classes() {
        let store = StoreBuilder::new(2)
            .transaction(&[0])
            .transaction(&[1])
            .transaction(&[0, 1])
            .classes(&[true, false, true])
            .build()
            .unwrap();
        assert!(store.has_classes());
        assert_eq!(store.class_count(true), 2);
        assert_eq!(store.class_count(false), 1);
        assert_eq!(store.negative_class().unwrap().to_string(), "{1}");
    }

    #[test]
    fn test_attributes_by_name_or_index() {
        let store = StoreBuilder::new(1)
            .transaction(&[0])
            .transaction(&[])
            .attribute("price", vec![1.5, 2.0])
            .build()
            .unwrap();
        assert_eq!(store.attribute_index("price"), Some(0));
        assert_eq!(store.attribute_index("0"), Some(0));
        assert_eq!(store.attribute_index("1"), None);
        assert_eq!(store.attribute_index("weight"), None);
    }

    #[test]
    fn test_item_out_of_range() {
        let err = StoreBuilder::new(2).transaction(&[2]).build().unwrap_err();
        assert_eq!(
            err,
            StoreError::ItemOutOfRange {
                item: 2,
                transaction: 0,
                nb_items: 2
            }
        );
    }

    #[test]
    fn test_attribute_length_mismatch() {
        let err = StoreBuilder::new(1)
            .transaction(&[0])
            .attribute("a", vec![1.0, 2.0])
            .build()
            .unwrap_err();
        assert!(matches!(err, StoreError::AttributeLength { actual: 2, .. }));
    }

    #[test]
    fn test_duplicate_attribute() {
        let err = StoreBuilder::new(1)
            .transaction(&[0])
            .attribute("a", vec![1.0])
            .attribute("a", vec![2.0])
            .build()
            .unwrap_err();
        assert_eq!(err, StoreError::DuplicateAttribute("a".into()));
    }

    #[test]
    fn test_labels() {
        let store = StoreBuilder::new(2)
            .transaction(&[0, 1])
            .labels(vec!["bread".into(), "milk".into()])
            .build()
            .unwrap();
        assert_eq!(store.label(1), "milk");
        let unlabelled = worked_example();
        assert_eq!(unlabelled.label(2), "2");
    }

    #[test]
    fn test_store_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TransactionStore>();
    }
}
