// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Pareto frontier of patterns over a vector of measures.
//!
//! # Dominance
//!
//! With objectives `o_1..o_k`, each a measure and a direction, a vector `a`
//! dominates `b` when `a` is at least as good as `b` on every objective and
//! strictly better on at least one. Equal vectors do not dominate each other,
//! so patterns with the same vector share the frontier.
//!
//! # Incremental maintenance
//!
//! [`Skyline::insert`] rejects a candidate dominated by a member, and
//! otherwise evicts every member the candidate dominates. Since dominance is
//! a strict partial order, the final frontier is the set of non-dominated
//! inserted patterns whatever the insertion order.
//!
//! During search, [`SkylinePruner`] asks whether the optimistic bound vector
//! of a partial pattern is already dominated, and [`SkylineMonitor`] inserts
//! each solution. Both hold the same [`SharedSkyline`].

mod monitor;
mod pruner;

pub use monitor::SkylineMonitor;
pub use pruner::SkylinePruner;

use crate::measure::{Direction, Measure, MeasureValue};
use crate::pattern::Pattern;
use crate::store::TransactionStore;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

/// One measure of the skyline vector, with its direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Objective {
    pub measure: Measure,
    pub direction: Direction,
}

impl Objective {
    pub fn maximize(measure: Measure) -> Self {
        Self {
            measure,
            direction: Direction::Maximize,
        }
    }

    pub fn minimize(measure: Measure) -> Self {
        Self {
            measure,
            direction: Direction::Minimize,
        }
    }
}

/// Whether `a` dominates `b` under `objectives`.
pub fn dominates(objectives: &[Objective], a: &[MeasureValue], b: &[MeasureValue]) -> bool {
    let mut strictly = false;
    for ((objective, x), y) in objectives.iter().zip(a).zip(b) {
        if !objective.direction.at_least_as_good(x, y) {
            return false;
        }
        strictly |= objective.direction.better(x, y);
    }
    strictly
}

#[derive(Debug, Clone, Serialize)]
pub struct SkylineMember {
    pub pattern: Pattern,
    pub values: Vec<MeasureValue>,
}

/// Result of [`Skyline::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// Dominated by a member, or already present.
    Rejected,
    /// On the frontier; `evicted` members were dominated by it.
    Accepted { evicted: usize },
}

#[derive(Debug, Clone)]
pub struct Skyline {
    objectives: Vec<Objective>,
    members: Vec<SkylineMember>,
}

/// A frontier shared by the pruner and the monitor of one search.
pub type SharedSkyline = Rc<RefCell<Skyline>>;

impl Skyline {
    pub fn new(objectives: Vec<Objective>) -> Self {
        Self {
            objectives,
            members: Vec::new(),
        }
    }

    pub fn shared(objectives: Vec<Objective>) -> SharedSkyline {
        Rc::new(RefCell::new(Self::new(objectives)))
    }

    pub fn objectives(&self) -> &[Objective] {
        &self.objectives
    }

    pub fn measures(&self) -> Vec<Measure> {
        self.objectives.iter().map(|o| o.measure).collect()
    }

    pub fn members(&self) -> &[SkylineMember] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether some member dominates `values`.
    pub fn is_dominated(&self, values: &[MeasureValue]) -> bool {
        self.members
            .iter()
            .any(|m| dominates(&self.objectives, &m.values, values))
    }

    /// Offer `pattern` with its measure vector.
    pub fn insert(&mut self, pattern: Pattern, values: Vec<MeasureValue>) -> Insertion {
        debug_assert_eq!(values.len(), self.objectives.len());
        if self.is_dominated(&values) || self.members.iter().any(|m| m.pattern == pattern) {
            return Insertion::Rejected;
        }
        let before = self.members.len();
        let objectives = &self.objectives;
        self.members
            .retain(|m| !dominates(objectives, &values, &m.values));
        let evicted = before - self.members.len();
        self.members.push(SkylineMember { pattern, values });
        Insertion::Accepted { evicted }
    }

    /// Offer `pattern`, computing its vector.
    pub fn insert_pattern(&mut self, mut pattern: Pattern, store: &TransactionStore) -> Insertion {
        let values = pattern.values(&self.measures(), store);
        self.insert(pattern, values)
    }

    /// Re-insert every member of `other`.
    pub fn merge(&mut self, other: Skyline) {
        for member in other.members {
            self.insert(member.pattern, member.values);
        }
    }

    /// Members sorted by items.
    pub fn into_members(mut self) -> Vec<SkylineMember> {
        self.members.sort_by(|a, b| a.pattern.cmp(&b.pattern));
        self.members
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn objectives() -> Vec<Objective> {
        vec![Objective::maximize(Measure::Freq), Objective::minimize(Measure::Length)]
    }

    fn v(a: i64, b: i64) -> Vec<MeasureValue> {
        vec![MeasureValue::Int(a), MeasureValue::Int(b)]
    }

    fn pattern(items: &[usize]) -> Pattern {
        Pattern::new(items.to_vec(), crate::store::BitSet::empty(4))
    }

    #[test]
    fn test_dominance() {
        let o = objectives();
        assert!(dominates(&o, &v(3, 1), &v(2, 1)));
        assert!(dominates(&o, &v(3, 1), &v(3, 2)));
        assert!(!dominates(&o, &v(3, 1), &v(3, 1)));
        assert!(!dominates(&o, &v(3, 2), &v(2, 1)));
    }

    #[test]
    fn test_insert_evicts_and_rejects() {
        let mut sky = Skyline::new(objectives());
        assert_eq!(
            sky.insert(pattern(&[0]), v(2, 1)),
            Insertion::Accepted { evicted: 0 }
        );
        assert_eq!(
            sky.insert(pattern(&[1, 2]), v(3, 2)),
            Insertion::Accepted { evicted: 0 }
        );
        assert_eq!(sky.insert(pattern(&[1, 3]), v(1, 2)), Insertion::Rejected);
        assert_eq!(
            sky.insert(pattern(&[3]), v(3, 1)),
            Insertion::Accepted { evicted: 2 }
        );
        assert_eq!(sky.len(), 1);
    }

    #[test]
    fn test_ties_are_kept() {
        let mut sky = Skyline::new(objectives());
        sky.insert(pattern(&[0]), v(2, 1));
        assert_eq!(
            sky.insert(pattern(&[1]), v(2, 1)),
            Insertion::Accepted { evicted: 0 }
        );
        assert_eq!(sky.insert(pattern(&[1]), v(2, 1)), Insertion::Rejected);
        assert_eq!(sky.len(), 2);
        assert!(!sky.is_dominated(&v(2, 1)));
        assert!(sky.is_dominated(&v(2, 2)));
    }

    #[test]
    fn test_merge() {
        let mut a = Skyline::new(objectives());
        a.insert(pattern(&[0]), v(2, 1));
        let mut b = Skyline::new(objectives());
        b.insert(pattern(&[1, 2]), v(4, 2));
        b.insert(pattern(&[3]), v(1, 1));
        a.merge(b);
        let items: Vec<Vec<usize>> = a
            .into_members()
            .into_iter()
            .map(|m| m.pattern.items().to_vec())
            .collect();
        assert_eq!(items, vec![vec![0], vec![1, 2]]);
    }
}
