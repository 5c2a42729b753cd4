// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Search counters.
//!
//! The context owns one [`Statistics`]. Predicates bump the counters as the
//! search runs; propagation failures are tallied per [`FailureKind`].

use crate::context::SearchContext;
use crate::engine::{Predicate, PredicateResult};
use crate::propagation::{FailureKind, PropagationFailure};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{EnumCount as EnumCountMacro, EnumIter, IntoStaticStr};

#[derive(Debug, EnumCountMacro, EnumIter, IntoStaticStr, Copy, Clone, PartialEq, Eq)]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum Counters {
    /// Branching decisions taken.
    Nodes,
    /// Complete assignments reached.
    Leaves,
    /// Patterns passed to the monitors.
    Solutions,
    /// Fixpoint computations.
    Propagations,
    /// Items forced by propagators.
    Fixes,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Statistics {
    counters: [u64; Counters::COUNT],
    failures: [u64; PropagationFailure::COUNT],
}

impl Statistics {
    pub fn new() -> Self {
        Statistics::default()
    }

    /// Predicate bumping `counter` each time it runs and `filter` (if any) accepts the context.
    pub fn counting_predicate(
        counter: Counters,
        filter: Option<fn(&SearchContext) -> bool>,
    ) -> Box<dyn Predicate> {
        Box::new(CountingPredicate {
            filter: filter.unwrap_or(|_| true),
            counter,
        })
    }

    pub fn increment(&mut self, counter: Counters) {
        self.add(counter, 1);
    }

    pub fn add(&mut self, counter: Counters, amount: u64) {
        self.counters[counter as usize] += amount;
    }

    pub fn get(&self, counter: Counters) -> u64 {
        self.counters[counter as usize]
    }

    pub fn record_failure(&mut self, failure: &PropagationFailure) {
        self.failures[failure.kind() as usize] += 1;
    }

    pub fn failures(&self, kind: FailureKind) -> u64 {
        self.failures[kind as usize]
    }

    pub fn total_failures(&self) -> u64 {
        self.failures.iter().sum()
    }

    /// Add the counts of another run, e.g. one branch of a partitioned search.
    pub fn merge(&mut self, other: &Statistics) {
        for (mine, theirs) in self.counters.iter_mut().zip(other.counters) {
            *mine += theirs;
        }
        for (mine, theirs) in self.failures.iter_mut().zip(other.failures) {
            *mine += theirs;
        }
    }
}

impl Serialize for Statistics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let failures: BTreeMap<&'static str, u64> = FailureKind::iter()
            .map(|kind| (kind.into(), self.failures(kind)))
            .filter(|&(_, n)| n > 0)
            .collect();
        let mut map = serializer.serialize_map(Some(Counters::COUNT + 1))?;
        for counter in Counters::iter() {
            let name: &'static str = counter.into();
            map.serialize_entry(name, &self.get(counter))?;
        }
        map.serialize_entry("failures", &failures)?;
        map.end()
    }
}

#[derive(Debug)]
struct CountingPredicate {
    filter: fn(&SearchContext) -> bool,
    counter: Counters,
}

impl Predicate for CountingPredicate {
    fn try_pred(&mut self, ctx: &mut SearchContext, _round: usize) -> PredicateResult {
        if (self.filter)(ctx) {
            ctx.statistics.increment(self.counter);
        }
        PredicateResult::Success
    }

    fn name(&self) -> &str {
        "Counting"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_and_failures() {
        let mut stats = Statistics::new();
        stats.increment(Counters::Nodes);
        stats.add(Counters::Fixes, 3);
        stats.record_failure(&PropagationFailure::Dominated);
        stats.record_failure(&PropagationFailure::Dominated);
        stats.record_failure(&PropagationFailure::NotClosed { item: 1 });
        assert_eq!(stats.get(Counters::Nodes), 1);
        assert_eq!(stats.get(Counters::Fixes), 3);
        assert_eq!(stats.failures(FailureKind::Dominated), 2);
        assert_eq!(stats.total_failures(), 3);
    }

    #[test]
    fn test_merge() {
        let mut a = Statistics::new();
        a.increment(Counters::Solutions);
        let mut b = Statistics::new();
        b.add(Counters::Solutions, 2);
        b.record_failure(&PropagationFailure::Conflict { item: 0 });
        a.merge(&b);
        assert_eq!(a.get(Counters::Solutions), 3);
        assert_eq!(a.failures(FailureKind::Conflict), 1);
    }

    #[test]
    fn test_serialize() {
        let mut stats = Statistics::new();
        stats.increment(Counters::Leaves);
        stats.record_failure(&PropagationFailure::Dominated);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["leaves"], 1);
        assert_eq!(json["nodes"], 0);
        assert_eq!(json["failures"]["Dominated"], 1);
    }
}
