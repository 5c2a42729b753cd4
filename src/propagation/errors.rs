// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Error types for constraint propagation.

use crate::measure::Measure;
use strum_macros::{EnumCount as EnumCountMacro, EnumDiscriminants, EnumIter, IntoStaticStr};
use thiserror::Error;

/// Why a partial pattern is infeasible.
///
/// Failures are ordinary search outcomes, not errors of the program: the
/// host backtracks and keeps going. Each variant has a [`FailureKind`] so
/// statistics can count failures per rule.
#[derive(Debug, Clone, PartialEq, Eq, Error, EnumCountMacro, EnumDiscriminants)]
#[strum_discriminants(name(FailureKind), derive(EnumIter, IntoStaticStr, Hash))]
pub enum PropagationFailure {
    /// An item was forced both present and absent.
    #[error("item {item} forced both present and absent")]
    Conflict { item: usize },

    #[error("cover has {size} transactions, below the minimum {min}")]
    CoverTooSmall { size: usize, min: usize },

    /// Even the largest completion covers too many transactions.
    #[error("every completion covers at least {size} transactions, above the maximum {max}")]
    CoverTooLarge { size: usize, max: usize },

    /// An absent item occurs in every covered transaction.
    #[error("absent item {item} keeps the measures unchanged, so the pattern cannot be closed")]
    NotClosed { item: usize },

    /// Dropping a present item leaves the cover unchanged.
    #[error("removing item {item} keeps the cover, so the pattern is not a generator")]
    NotGenerator { item: usize },

    #[error("removing item {item} leaves a subset of frequency {frequency}, below {threshold}")]
    InfrequentSubset {
        item: usize,
        frequency: usize,
        threshold: usize,
    },

    /// Every completion has a frequent superset through an absent item.
    #[error("every completion extended by absent item {item} stays frequent")]
    FrequentSuperset { item: usize },

    #[error("threshold on {measure} is out of reach")]
    BoundUnreachable { measure: Measure },

    /// The best reachable measure vector is dominated by the skyline.
    #[error("best reachable measures are dominated by the skyline")]
    Dominated,

    #[error("too similar to accepted pattern {pattern}")]
    TooSimilar { pattern: usize },
}

impl PropagationFailure {
    pub fn kind(&self) -> FailureKind {
        FailureKind::from(self)
    }
}
