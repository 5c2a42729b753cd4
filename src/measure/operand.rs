// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Skylineability of measures.
//!
//! To mine skypatterns it is enough to enumerate the patterns that are closed
//! with respect to a measure set M′, provided every objective is *maximally
//! (or minimally) M′-skylineable*: among patterns with equal M′ values, a
//! larger one is never worse. M′ is computed by decomposing each objective
//! into an operand tree and propagating a `max` / `min` conversion through it.

use super::{Aggregate, Direction, Measure};
use std::collections::BTreeSet;

/// Arithmetic decomposition of a measure.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Leaf(Measure),
    Constant,
    Add(Box<Operand>, Box<Operand>),
    Sub(Box<Operand>, Box<Operand>),
    Mul(Box<Operand>, Box<Operand>),
    Div(Box<Operand>, Box<Operand>),
}

fn leaf(m: Measure) -> Box<Operand> {
    Box::new(Operand::Leaf(m))
}

impl Operand {
    /// Decomposition of a measure into primitive measures.
    pub fn of(measure: Measure) -> Operand {
        match measure {
            Measure::Area => Operand::Mul(leaf(Measure::Freq), leaf(Measure::Length)),
            Measure::GrowthRate => Operand::Mul(
                Box::new(Operand::Div(
                    Box::new(Operand::Constant),
                    Box::new(Operand::Constant),
                )),
                Box::new(Operand::Div(leaf(Measure::Freq1), leaf(Measure::Freq2))),
            ),
            Measure::AllConf => Operand::Div(leaf(Measure::Freq), leaf(Measure::MaxFreq)),
            Measure::AnyConf => Operand::Div(leaf(Measure::Freq), leaf(Measure::MinFreq)),
            Measure::Attribute(Aggregate::Mean, a) => Operand::Div(
                Box::new(Operand::Add(
                    leaf(Measure::Attribute(Aggregate::Min, a)),
                    leaf(Measure::Attribute(Aggregate::Max, a)),
                )),
                Box::new(Operand::Constant),
            ),
            other => Operand::Leaf(other),
        }
    }

    /// Measures M′ such that this operand is maximally M′-skylineable.
    pub fn max_convert(&self) -> BTreeSet<Measure> {
        match self {
            Operand::Leaf(m) => leaf_convert(*m, Direction::Maximize),
            Operand::Constant => BTreeSet::new(),
            Operand::Add(a, b) | Operand::Mul(a, b) => union(a.max_convert(), b.max_convert()),
            Operand::Sub(a, b) | Operand::Div(a, b) => union(a.max_convert(), b.min_convert()),
        }
    }

    /// Measures M′ such that this operand is minimally M′-skylineable.
    pub fn min_convert(&self) -> BTreeSet<Measure> {
        match self {
            Operand::Leaf(m) => leaf_convert(*m, Direction::Minimize),
            Operand::Constant => BTreeSet::new(),
            Operand::Add(a, b) | Operand::Mul(a, b) => union(a.min_convert(), b.min_convert()),
            Operand::Sub(a, b) | Operand::Div(a, b) => union(a.min_convert(), b.max_convert()),
        }
    }
}

fn union(mut a: BTreeSet<Measure>, b: BTreeSet<Measure>) -> BTreeSet<Measure> {
    a.extend(b);
    a
}

/// Conversion of a primitive measure.
///
/// A measure that can only decrease as items are added is kept when
/// maximised and needs nothing when minimised; the reverse for measures that
/// can only increase. Sum and average of an attribute move either way and
/// are only determined by the cover, so they fall back to `freq`.
fn leaf_convert(measure: Measure, direction: Direction) -> BTreeSet<Measure> {
    let decreasing = match measure {
        Measure::Freq
        | Measure::Freq1
        | Measure::Freq2
        | Measure::FreqNeg
        | Measure::MinFreq
        | Measure::Attribute(Aggregate::Max, _) => true,
        Measure::Length | Measure::MaxFreq | Measure::Attribute(Aggregate::Min, _) => false,
        Measure::Attribute(Aggregate::Sum | Aggregate::Avg, _) => {
            return BTreeSet::from([Measure::Freq]);
        }
        composite => {
            let operand = Operand::of(composite);
            return match direction {
                Direction::Maximize => operand.max_convert(),
                Direction::Minimize => operand.min_convert(),
            };
        }
    };
    let keep = decreasing == (direction == Direction::Maximize);
    if keep {
        BTreeSet::from([measure])
    } else {
        BTreeSet::new()
    }
}

/// M′ for a list of objectives.
pub fn closure_measures(objectives: &[(Measure, Direction)]) -> BTreeSet<Measure> {
    objectives
        .iter()
        .flat_map(|&(measure, direction)| leaf_convert(measure, direction))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_and_area() {
        let m = closure_measures(&[
            (Measure::Freq, Direction::Maximize),
            (Measure::Area, Direction::Maximize),
        ]);
        assert_eq!(m, BTreeSet::from([Measure::Freq]));
    }

    #[test]
    fn test_length_minimised_needs_length() {
        assert_eq!(
            closure_measures(&[(Measure::Length, Direction::Minimize)]),
            BTreeSet::from([Measure::Length])
        );
        assert!(closure_measures(&[(Measure::Length, Direction::Maximize)]).is_empty());
    }

    #[test]
    fn test_growth_rate() {
        assert_eq!(
            closure_measures(&[(Measure::GrowthRate, Direction::Maximize)]),
            BTreeSet::from([Measure::Freq1])
        );
        assert_eq!(
            closure_measures(&[(Measure::GrowthRate, Direction::Minimize)]),
            BTreeSet::from([Measure::Freq2])
        );
    }

    #[test]
    fn test_all_confidence() {
        assert_eq!(
            closure_measures(&[(Measure::AllConf, Direction::Maximize)]),
            BTreeSet::from([Measure::Freq, Measure::MaxFreq])
        );
    }

    #[test]
    fn test_mean_attribute() {
        let mean = Measure::Attribute(Aggregate::Mean, 1);
        assert_eq!(
            closure_measures(&[(mean, Direction::Maximize)]),
            BTreeSet::from([Measure::Attribute(Aggregate::Max, 1)])
        );
        assert_eq!(
            closure_measures(&[(mean, Direction::Minimize)]),
            BTreeSet::from([Measure::Attribute(Aggregate::Min, 1)])
        );
    }

    #[test]
    fn test_sum_falls_back_to_cover() {
        let sum = Measure::Attribute(Aggregate::Sum, 0);
        assert_eq!(
            closure_measures(&[(sum, Direction::Minimize)]),
            BTreeSet::from([Measure::Freq])
        );
    }
}
