// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Setup-time error types.
//!
//! Infeasibility during search is not an error: propagators report it through
//! [`crate::propagation::Outcome::Fail`]. Broken internal invariants panic.
//! Everything here is detected before a search starts.

use thiserror::Error;

/// Errors building a [`crate::store::TransactionStore`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("item {item} in transaction {transaction} is out of range ({nb_items} items)")]
    ItemOutOfRange {
        item: usize,
        transaction: usize,
        nb_items: usize,
    },

    #[error("attribute '{name}' has {actual} values but the store has {expected} transactions")]
    AttributeLength {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("duplicate attribute '{0}'")]
    DuplicateAttribute(String),

    #[error("class labels given for {actual} transactions but the store has {expected}")]
    ClassLength { expected: usize, actual: usize },

    #[error("{actual} item labels given for {expected} items")]
    LabelCount { expected: usize, actual: usize },
}

/// Errors validating a mining configuration against a store.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("unknown measure '{0}'")]
    UnknownMeasure(String),

    #[error("contradictory thresholds for '{measure}': min {min} > max {max}")]
    ContradictoryThresholds { measure: String, min: f64, max: f64 },

    #[error("measure '{measure}' needs attribute '{attribute}' which the store does not have")]
    MissingAttribute { measure: String, attribute: String },

    #[error("measure '{0}' needs class labels but the store has none")]
    MissingClasses(String),

    #[error("measure '{0}' cannot be used for closure")]
    NotClosable(String),

    #[error("skyline mining needs at least one objective")]
    NoObjectives,

    #[error("invalid value {value} for '{name}'")]
    InvalidValue { name: String, value: f64 },

    #[error("could not parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors building an [`crate::rules::AssociationRule`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("item {0} appears on both sides of the rule")]
    NotDisjoint(usize),

    #[error("rule antecedent and consequent must both be non-empty")]
    EmptySide,

    #[error("item {item} is out of range ({nb_items} items)")]
    ItemOutOfRange { item: usize, nb_items: usize },
}

/// Top-level error for setting up a mining run.
#[derive(Debug, Error)]
pub enum MiningError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = StoreError::ItemOutOfRange {
            item: 7,
            transaction: 2,
            nb_items: 5,
        };
        assert_eq!(
            err.to_string(),
            "item 7 in transaction 2 is out of range (5 items)"
        );

        let err = ConfigError::ContradictoryThresholds {
            measure: "freq".into(),
            min: 5.0,
            max: 2.0,
        };
        assert!(err.to_string().contains("min 5 > max 2"));
    }

    #[test]
    fn test_mining_error_from() {
        let err: MiningError = ConfigError::UnknownMeasure("frq".into()).into();
        assert_eq!(err.to_string(), "unknown measure 'frq'");
    }
}
