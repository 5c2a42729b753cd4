// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Association rules derived from mined patterns.
//!
//! A rule `x → y` joins two disjoint non-empty itemsets. Its measures only
//! depend on `freq(x)`, `freq(y)` and `freq(z)` with `z = x ∪ y`:
//!
//! | Measure | Value |
//! |---------|-------|
//! | support | `freq(z)` |
//! | relative support | `freq(z) / |T|` |
//! | confidence | `freq(z) / freq(x)` |
//! | lift | `confidence · |T| / freq(y)` |
//!
//! [`derive_rules`] enumerates every rule `x → z \ x` of the given patterns.
//! [`minimal_non_redundant_rules`] builds the smaller basis `g → c \ g` from
//! generators `g` and closed patterns `c ⊃ g`.

use crate::error::RuleError;
use crate::measure::MeasureValue;
use crate::pattern::Pattern;
use crate::store::TransactionStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display as StrumDisplay, EnumIter, EnumString};
use tracing::debug;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString, StrumDisplay, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum RuleMeasure {
    Support,
    RelativeSupport,
    Confidence,
    Lift,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationRule {
    antecedent: Vec<usize>,
    consequent: Vec<usize>,
    freq_x: usize,
    freq_y: usize,
    freq_z: usize,
    nb_transactions: usize,
}

impl AssociationRule {
    pub fn new(
        antecedent: &[usize],
        consequent: &[usize],
        store: &TransactionStore,
    ) -> Result<Self, RuleError> {
        if antecedent.is_empty() || consequent.is_empty() {
            return Err(RuleError::EmptySide);
        }
        let nb_items = store.nb_items();
        if let Some(&item) = antecedent.iter().chain(consequent).find(|&&i| i >= nb_items) {
            return Err(RuleError::ItemOutOfRange { item, nb_items });
        }
        if let Some(&item) = antecedent.iter().find(|i| consequent.contains(i)) {
            return Err(RuleError::NotDisjoint(item));
        }
        let mut x = antecedent.to_vec();
        let mut y = consequent.to_vec();
        x.sort_unstable();
        y.sort_unstable();
        x.dedup();
        y.dedup();
        let cover_x = store.cover_of(&x);
        let cover_y = store.cover_of(&y);
        Ok(Self {
            freq_x: cover_x.len(),
            freq_y: cover_y.len(),
            freq_z: cover_x.and_count(&cover_y),
            nb_transactions: store.nb_transactions(),
            antecedent: x,
            consequent: y,
        })
    }

    pub fn antecedent(&self) -> &[usize] {
        &self.antecedent
    }

    pub fn consequent(&self) -> &[usize] {
        &self.consequent
    }

    pub fn freq_x(&self) -> usize {
        self.freq_x
    }

    pub fn freq_y(&self) -> usize {
        self.freq_y
    }

    pub fn freq_z(&self) -> usize {
        self.freq_z
    }

    /// Confidence 1: `x` never occurs without `y`.
    pub fn is_exact(&self) -> bool {
        self.freq_z == self.freq_x
    }

    pub fn value(&self, measure: RuleMeasure) -> MeasureValue {
        let (x, y, z, n) = (
            self.freq_x as i64,
            self.freq_y as i64,
            self.freq_z as i64,
            self.nb_transactions as i64,
        );
        match measure {
            RuleMeasure::Support => MeasureValue::Int(z),
            RuleMeasure::RelativeSupport => MeasureValue::ratio(z, n),
            RuleMeasure::Confidence => MeasureValue::ratio(z, x),
            RuleMeasure::Lift => MeasureValue::ratio(z * n, x * y),
        }
    }
}

impl fmt::Display for AssociationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = |items: &[usize]| {
            items
                .iter()
                .map(|i| i.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        write!(
            f,
            "{{{}}} => {{{}}} (sup={}, conf={})",
            side(&self.antecedent),
            side(&self.consequent),
            self.freq_z,
            self.value(RuleMeasure::Confidence)
        )
    }
}

impl Serialize for AssociationRule {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("AssociationRule", 5)?;
        state.serialize_field("antecedent", &self.antecedent)?;
        state.serialize_field("consequent", &self.consequent)?;
        state.serialize_field("support", &self.freq_z)?;
        state.serialize_field("confidence", &self.value(RuleMeasure::Confidence))?;
        state.serialize_field("lift", &self.value(RuleMeasure::Lift))?;
        state.end()
    }
}

/// Minimal values a rule must reach to be kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleThresholds {
    pub min_support: Option<usize>,
    pub min_confidence: Option<f64>,
    pub min_lift: Option<f64>,
}

impl RuleThresholds {
    pub fn accepts(&self, rule: &AssociationRule) -> bool {
        let at_least = |measure, min: Option<f64>| {
            min.map_or(true, |min| rule.value(measure) >= MeasureValue::Real(min))
        };
        self.min_support.map_or(true, |min| rule.freq_z() >= min)
            && at_least(RuleMeasure::Confidence, self.min_confidence)
            && at_least(RuleMeasure::Lift, self.min_lift)
    }
}

/// Every non-empty proper subset of `items`.
fn proper_subsets(items: &[usize]) -> Vec<Vec<usize>> {
    let mut subsets = vec![Vec::new()];
    for &item in items {
        let with: Vec<Vec<usize>> = subsets
            .iter()
            .map(|s| {
                let mut s = s.clone();
                s.push(item);
                s
            })
            .collect();
        subsets.extend(with);
    }
    subsets.retain(|s| !s.is_empty() && s.len() < items.len());
    subsets
}

fn difference(z: &[usize], x: &[usize]) -> Vec<usize> {
    z.iter().copied().filter(|i| !x.contains(i)).collect()
}

fn sorted(mut rules: Vec<AssociationRule>) -> Vec<AssociationRule> {
    rules.sort_by(|a, b| {
        (&a.antecedent, &a.consequent).cmp(&(&b.antecedent, &b.consequent))
    });
    rules.dedup();
    rules
}

/// Rules `x → z \ x` for every pattern `z` and non-empty `x ⊊ z`.
pub fn derive_rules(
    patterns: &[Pattern],
    store: &TransactionStore,
    thresholds: &RuleThresholds,
) -> Vec<AssociationRule> {
    let mut rules = Vec::new();
    for z in patterns.iter().filter(|p| p.len() >= 2) {
        for x in proper_subsets(z.items()) {
            let y = difference(z.items(), &x);
            if let Ok(rule) = AssociationRule::new(&x, &y, store) {
                if thresholds.accepts(&rule) {
                    rules.push(rule);
                }
            }
        }
    }
    let rules = sorted(rules);
    debug!(patterns = patterns.len(), rules = rules.len(), "derived rules");
    rules
}

/// Rules `g → c \ g` for each generator `g` and closed pattern `c ⊋ g`.
pub fn minimal_non_redundant_rules(
    generators: &[Pattern],
    closed: &[Pattern],
    store: &TransactionStore,
    thresholds: &RuleThresholds,
) -> Vec<AssociationRule> {
    let mut rules = Vec::new();
    for g in generators.iter().filter(|g| !g.is_empty()) {
        for c in closed.iter().filter(|c| c.len() > g.len() && g.is_subset_of(c)) {
            let y = difference(c.items(), g.items());
            if let Ok(rule) = AssociationRule::new(g.items(), &y, store) {
                if thresholds.accepts(&rule) {
                    rules.push(rule);
                }
            }
        }
    }
    let rules = sorted(rules);
    debug!(rules = rules.len(), "minimal non-redundant rules");
    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn worked_example() -> TransactionStore {
        TransactionStore::from_transactions(
            3,
            &[vec![0, 1], vec![0, 1, 2], vec![0], vec![1, 2], vec![2]],
        )
        .unwrap()
    }

    #[test]
    fn test_rule_measures() {
        let s = worked_example();
        let rule = AssociationRule::new(&[0], &[1], &s).unwrap();
        assert_eq!((rule.freq_x(), rule.freq_y(), rule.freq_z()), (3, 3, 2));
        assert_eq!(rule.value(RuleMeasure::Support), MeasureValue::Int(2));
        assert_eq!(rule.value(RuleMeasure::RelativeSupport), MeasureValue::ratio(2, 5));
        assert_eq!(rule.value(RuleMeasure::Confidence), MeasureValue::ratio(2, 3));
        assert_eq!(rule.value(RuleMeasure::Lift), MeasureValue::ratio(10, 9));
        assert!(!rule.is_exact());
        assert_eq!(rule.to_string(), "{0} => {1} (sup=2, conf=2/3)");
    }

    #[test]
    fn test_invalid_rules() {
        let s = worked_example();
        assert_eq!(
            AssociationRule::new(&[0, 1], &[1], &s),
            Err(RuleError::NotDisjoint(1))
        );
        assert_eq!(AssociationRule::new(&[], &[1], &s), Err(RuleError::EmptySide));
        assert_eq!(
            AssociationRule::new(&[0], &[7], &s),
            Err(RuleError::ItemOutOfRange {
                item: 7,
                nb_items: 3
            })
        );
    }

    #[test]
    fn test_measure_names() {
        assert_eq!(RuleMeasure::RelativeSupport.to_string(), "relative_support");
        assert_eq!(RuleMeasure::from_str("lift").unwrap(), RuleMeasure::Lift);
    }

    #[test]
    fn test_derive_rules_with_confidence() {
        let s = worked_example();
        let patterns = vec![
            Pattern::from_items(&s, vec![0, 1]),
            Pattern::from_items(&s, vec![1, 2]),
            Pattern::from_items(&s, vec![0]),
        ];
        let all = derive_rules(&patterns, &s, &RuleThresholds::default());
        assert_eq!(all.len(), 4);
        let strict = RuleThresholds {
            min_confidence: Some(0.7),
            ..Default::default()
        };
        assert!(derive_rules(&patterns, &s, &strict).is_empty());
    }

    #[test]
    fn test_minimal_non_redundant() {
        let s = TransactionStore::from_transactions(
            3,
            &[vec![0, 1], vec![0, 1], vec![0, 1, 2], vec![2]],
        )
        .unwrap();
        let generators = vec![Pattern::from_items(&s, vec![0]), Pattern::from_items(&s, vec![1])];
        let closed = vec![
            Pattern::from_items(&s, vec![0, 1]),
            Pattern::from_items(&s, vec![0, 1, 2]),
        ];
        let rules = minimal_non_redundant_rules(&generators, &closed, &s, &RuleThresholds::default());
        let shown: Vec<String> = rules.iter().map(|r| r.to_string()).collect();
        assert_eq!(
            shown,
            vec![
                "{0} => {1} (sup=3, conf=1)",
                "{0} => {1, 2} (sup=1, conf=1/3)",
                "{1} => {0} (sup=3, conf=1)",
                "{1} => {0, 2} (sup=1, conf=1/3)",
            ]
        );
        assert!(rules[0].is_exact());
    }
}
