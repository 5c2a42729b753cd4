// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Optimistic bounds for partial patterns.
//!
//! A partial pattern has present items `P` and free items `F`. Every
//! completion `x` satisfies `P ⊆ x ⊆ P ∪ F`, so its cover `C` satisfies
//! `lower ⊆ C ⊆ upper` with `upper = cover(P)` and `lower = cover(P ∪ F)`.
//! [`bound`] returns a value that no completion beats in the requested
//! direction. Bounds only ever get tighter as items are decided.

use super::evaluate::{
    class_frequency, confidence, growth_rate, max_item_frequency, min_item_frequency,
    negative_frequency, Extent,
};
use super::{Aggregate, Direction, Measure, MeasureValue};
use crate::cover::CoverView;
use crate::store::{BitSet, TransactionStore};

/// Everything known about a partial pattern.
#[derive(Debug, Clone, Copy)]
pub struct BoundInput<'a> {
    pub store: &'a TransactionStore,
    pub present: &'a [usize],
    pub free: &'a [usize],
    /// cover(present)
    pub upper: &'a BitSet,
    /// cover(present ∪ free)
    pub lower: &'a BitSet,
}

impl BoundInput<'_> {
    fn all_items(&self) -> Vec<usize> {
        self.present.iter().chain(self.free).copied().collect()
    }

    fn max_length(&self) -> usize {
        self.present.len() + self.free.len()
    }
}

/// Best value of `measure` reachable by any completion, in `direction`.
pub fn bound(measure: Measure, direction: Direction, input: &BoundInput<'_>) -> MeasureValue {
    let store = input.store;
    let max = direction == Direction::Maximize;
    // Anti-monotone counts: best at the loosest cover when maximising.
    let (wide, narrow) = if max {
        (input.upper, input.lower)
    } else {
        (input.lower, input.upper)
    };
    match measure {
        Measure::Freq => wide.len().into(),
        Measure::Freq1 => class_frequency(store, wide, true).into(),
        Measure::Freq2 => class_frequency(store, wide, false).into(),
        Measure::FreqNeg => {
            if max {
                negative_frequency(store, input.present).into()
            } else {
                negative_frequency(store, &input.all_items()).into()
            }
        }
        Measure::GrowthRate => growth_rate(
            store,
            class_frequency(store, wide, true),
            class_frequency(store, narrow, false),
        ),
        Measure::Length => {
            if max {
                input.max_length().into()
            } else {
                input.present.len().into()
            }
        }
        Measure::Area => {
            if max {
                (input.upper.len() * input.max_length()).into()
            } else {
                (input.lower.len() * input.present.len()).into()
            }
        }
        Measure::MaxFreq => {
            if max {
                max_item_frequency(store, &input.all_items()).into()
            } else {
                max_item_frequency(store, input.present).into()
            }
        }
        Measure::MinFreq => {
            if max {
                min_item_frequency(store, input.present).into()
            } else {
                min_item_frequency(store, &input.all_items()).into()
            }
        }
        Measure::AllConf => {
            if max {
                cap_at_one(confidence(
                    input.upper.len(),
                    max_item_frequency(store, input.present),
                ))
            } else {
                confidence(
                    input.lower.len(),
                    max_item_frequency(store, &input.all_items()),
                )
            }
        }
        Measure::AnyConf => {
            if max {
                cap_at_one(confidence(
                    input.upper.len(),
                    min_item_frequency(store, &input.all_items()),
                ))
            } else {
                confidence(
                    input.lower.len(),
                    min_item_frequency(store, input.present),
                )
            }
        }
        Measure::Attribute(aggregate, attribute) => attribute_bound(
            aggregate,
            direction,
            &store.attribute(attribute).values,
            input,
        )
        .into(),
    }
}

/// Confidences never exceed one.
fn cap_at_one(value: MeasureValue) -> MeasureValue {
    let one = MeasureValue::Int(1);
    if value > one {
        one
    } else {
        value
    }
}

fn attribute_bound(
    aggregate: Aggregate,
    direction: Direction,
    values: &[f64],
    input: &BoundInput<'_>,
) -> f64 {
    let upper = Extent::of(values, input.upper);
    let lower = Extent::of(values, input.lower);
    // Some completion may have an empty cover, whose aggregates are all 0.
    let may_be_empty = lower.is_empty();
    let with_empty = |value: f64, pick: fn(f64, f64) -> f64| {
        if upper.is_empty() {
            0.0
        } else if may_be_empty {
            pick(value, 0.0)
        } else {
            value
        }
    };
    let max = direction == Direction::Maximize;
    match aggregate {
        // min(C) grows as C shrinks: best is a single transaction.
        Aggregate::Min if max => {
            if may_be_empty {
                with_empty(upper.max, f64::max)
            } else {
                lower.min
            }
        }
        Aggregate::Min => with_empty(upper.min, f64::min),
        Aggregate::Max if max => with_empty(upper.max, f64::max),
        Aggregate::Max => {
            if may_be_empty {
                with_empty(upper.min, f64::min)
            } else {
                lower.max
            }
        }
        Aggregate::Mean => {
            (attribute_bound(Aggregate::Min, direction, values, input)
                + attribute_bound(Aggregate::Max, direction, values, input))
                / 2.0
        }
        Aggregate::Sum => {
            let mut sum = lower.sum;
            input
                .upper
                .difference(input.lower)
                .for_each_transaction(|t| {
                    let v = values[t];
                    if (max && v > 0.0) || (!max && v < 0.0) {
                        sum += v;
                    }
                });
            sum
        }
        Aggregate::Avg if max => with_empty(upper.max, f64::max),
        Aggregate::Avg => with_empty(upper.min, f64::min),
    }
}
