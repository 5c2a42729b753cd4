// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Interestingness measures of itemsets.
//!
//! A [`Measure`] is a function of a pattern and its cover. This module
//! provides:
//!
//! - [`evaluate`]: the value of a measure on a complete pattern.
//! - [`bound`]: the best value any completion of a partial pattern can reach,
//!   used for threshold and skyline pruning.
//! - [`operand`]: the skylineability algebra choosing which measures a
//!   pattern must be closed for so that no skypattern is lost.
//! - [`computer`]: incremental, trailed computers answering "does adding this
//!   item change the measure?" for adequate closure.
//! - [`registry`]: name resolution and validation against a store.

pub mod bound;
pub mod computer;
pub mod evaluate;
pub mod operand;
pub mod registry;
pub mod value;

pub use bound::{bound, BoundInput};
pub use computer::MeasureComputer;
pub use evaluate::evaluate;
pub use registry::MeasureRegistry;
pub use value::MeasureValue;

use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display as StrumDisplay, EnumIter, EnumString};

/// Fold applied to a per-transaction attribute over the cover.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString, StrumDisplay, EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum Aggregate {
    Min,
    Max,
    /// (min + max) / 2
    Mean,
    Sum,
    /// sum / |cover|
    Avg,
}

/// An itemset measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Measure {
    /// |cover|
    Freq,
    /// |cover ∩ D1|
    Freq1,
    /// |cover ∩ D2|
    Freq2,
    /// Transactions containing none of the items.
    FreqNeg,
    /// (|D2| · freq1) / (|D1| · freq2)
    GrowthRate,
    Length,
    /// freq · length
    Area,
    /// Largest item frequency.
    MaxFreq,
    /// Smallest item frequency.
    MinFreq,
    /// freq / maxfreq
    AllConf,
    /// freq / minfreq
    AnyConf,
    /// Aggregate of an attribute (by index) over the cover.
    Attribute(Aggregate, usize),
}

impl Measure {
    /// Measures whose name carries no attribute.
    pub const SIMPLE: [Measure; 11] = [
        Measure::Freq,
        Measure::Freq1,
        Measure::Freq2,
        Measure::FreqNeg,
        Measure::GrowthRate,
        Measure::Length,
        Measure::Area,
        Measure::MaxFreq,
        Measure::MinFreq,
        Measure::AllConf,
        Measure::AnyConf,
    ];

    /// Registry name of a simple measure; `None` for attribute measures.
    pub fn simple_name(&self) -> Option<&'static str> {
        Some(match self {
            Measure::Freq => "freq",
            Measure::Freq1 => "freq1",
            Measure::Freq2 => "freq2",
            Measure::FreqNeg => "freqneg",
            Measure::GrowthRate => "grate",
            Measure::Length => "length",
            Measure::Area => "area",
            Measure::MaxFreq => "maxfreq",
            Measure::MinFreq => "minfreq",
            Measure::AllConf => "allconf",
            Measure::AnyConf => "anyconf",
            Measure::Attribute(..) => return None,
        })
    }

    /// Whether the measure needs class labels on the store.
    pub fn requires_classes(&self) -> bool {
        matches!(self, Measure::Freq1 | Measure::Freq2 | Measure::GrowthRate)
    }

    /// Whether an incremental closure computer exists for the measure.
    pub fn is_closable(&self) -> bool {
        matches!(
            self,
            Measure::Freq
                | Measure::Freq1
                | Measure::Freq2
                | Measure::MaxFreq
                | Measure::Attribute(Aggregate::Min | Aggregate::Max | Aggregate::Mean, _)
        )
    }

    /// Attribute index read by the measure, if any.
    pub fn attribute(&self) -> Option<usize> {
        match self {
            Measure::Attribute(_, index) => Some(*index),
            _ => None,
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measure::Attribute(aggregate, index) => write!(f, "{}({})", aggregate, index),
            simple => write!(f, "{}", simple.simple_name().unwrap_or_default()),
        }
    }
}

/// Optimisation direction of a measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Maximize,
    Minimize,
}

impl Direction {
    /// Whether `a` is strictly better than `b` in this direction.
    pub fn better(&self, a: &MeasureValue, b: &MeasureValue) -> bool {
        match self {
            Direction::Maximize => a > b,
            Direction::Minimize => a < b,
        }
    }

    /// Whether `a` is at least as good as `b` in this direction.
    pub fn at_least_as_good(&self, a: &MeasureValue, b: &MeasureValue) -> bool {
        match self {
            Direction::Maximize => a >= b,
            Direction::Minimize => a <= b,
        }
    }
}
