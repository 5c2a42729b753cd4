// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Mining configuration.
//!
//! A [`MiningConfig`] names the task, per-measure settings and the search
//! switches. It is plain data: it can be written in TOML,
//!
//! ```toml
//! task = "skyline"
//! item_order = "min_cover"
//!
//! [measures.freq]
//! min = 2
//! objective = "maximize"
//!
//! [measures.area]
//! objective = "maximize"
//! ```
//!
//! or built in code. [`MiningConfig::validate`] resolves measure names
//! against a store and checks the settings before any search starts.

use crate::error::ConfigError;
use crate::measure::{Direction, Measure, MeasureRegistry, MeasureValue};
use crate::predicates::ItemSelector;
use crate::propagation::{ClosureConsistency, Threshold};
use crate::rules::RuleThresholds;
use crate::skyline::Objective;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum_macros::{Display as StrumDisplay, EnumString};
use tracing::debug;

/// What to enumerate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, StrumDisplay,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Task {
    /// Every pattern within the thresholds.
    #[default]
    All,
    /// Closed patterns, for the cover or for the measures marked `closed`.
    Closed,
    /// Patterns no proper subset of which has the same cover.
    Generators,
    /// Frequent patterns with no frequent superset (needs `freq.min`).
    Maximal,
    /// Infrequent patterns whose subsets are all frequent (needs `freq.min`).
    MinimalInfrequent,
    /// Non-dominated patterns for the measures with an `objective`.
    Skyline,
}

/// Settings for one measure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MeasureSettings {
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Skyline objective.
    pub objective: Option<Direction>,
    /// Part of the closure measure set for [`Task::Closed`].
    pub closed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MiningConfig {
    pub task: Task,
    pub closure: ClosureConsistency,
    pub item_order: ItemSelector,
    /// Try including an item before excluding it.
    pub present_first: bool,
    pub allow_empty: bool,
    /// Stop after this many solutions.
    pub max_solutions: Option<usize>,
    /// Maximal Jaccard similarity between the covers of two solutions.
    pub overlap: Option<f64>,
    /// Derive association rules from the mined patterns.
    pub rules: Option<RuleThresholds>,
    /// Settings by measure name, e.g. `freq`, `area` or `min(price)`.
    pub measures: BTreeMap<String, MeasureSettings>,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            task: Task::default(),
            closure: ClosureConsistency::default(),
            item_order: ItemSelector::default(),
            present_first: true,
            allow_empty: false,
            max_solutions: None,
            overlap: None,
            rules: None,
            measures: BTreeMap::new(),
        }
    }
}

/// A configuration checked against a store, with measure names resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Cover-size bounds from the `freq` settings.
    pub min_frequency: usize,
    pub max_frequency: usize,
    /// Ranges of every other measure.
    pub thresholds: Vec<Threshold>,
    pub objectives: Vec<Objective>,
    /// Measures marked `closed`.
    pub closed: Vec<Measure>,
}

impl MiningConfig {
    pub fn new(task: Task) -> Self {
        Self {
            task,
            ..Self::default()
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    fn settings(&mut self, measure: &str) -> &mut MeasureSettings {
        self.measures.entry(measure.to_string()).or_default()
    }

    pub fn min(mut self, measure: &str, value: f64) -> Self {
        self.settings(measure).min = Some(value);
        self
    }

    pub fn max(mut self, measure: &str, value: f64) -> Self {
        self.settings(measure).max = Some(value);
        self
    }

    pub fn objective(mut self, measure: &str, direction: Direction) -> Self {
        self.settings(measure).objective = Some(direction);
        self
    }

    pub fn closed(mut self, measure: &str) -> Self {
        self.settings(measure).closed = true;
        self
    }

    pub fn closure(mut self, consistency: ClosureConsistency) -> Self {
        self.closure = consistency;
        self
    }

    pub fn item_order(mut self, selector: ItemSelector) -> Self {
        self.item_order = selector;
        self
    }

    pub fn present_first(mut self, present_first: bool) -> Self {
        self.present_first = present_first;
        self
    }

    pub fn allow_empty(mut self, allow_empty: bool) -> Self {
        self.allow_empty = allow_empty;
        self
    }

    pub fn max_solutions(mut self, limit: usize) -> Self {
        self.max_solutions = Some(limit);
        self
    }

    pub fn overlap(mut self, max_jaccard: f64) -> Self {
        self.overlap = Some(max_jaccard);
        self
    }

    pub fn rules(mut self, thresholds: RuleThresholds) -> Self {
        self.rules = Some(thresholds);
        self
    }

    /// Resolve every measure name and check the settings fit together.
    pub fn validate(&self, registry: &MeasureRegistry<'_>) -> Result<ResolvedConfig, ConfigError> {
        let nb_transactions = registry.store().nb_transactions();
        let mut resolved = ResolvedConfig {
            min_frequency: 0,
            max_frequency: nb_transactions,
            thresholds: Vec::new(),
            objectives: Vec::new(),
            closed: Vec::new(),
        };

        for (name, settings) in &self.measures {
            let measure = registry.resolve(name)?;
            for value in settings.min.iter().chain(&settings.max) {
                if value.is_nan() {
                    return Err(invalid(name, *value));
                }
            }
            if let (Some(min), Some(max)) = (settings.min, settings.max) {
                if min > max {
                    return Err(ConfigError::ContradictoryThresholds {
                        measure: name.clone(),
                        min,
                        max,
                    });
                }
            }
            if settings.closed && !measure.is_closable() {
                return Err(ConfigError::NotClosable(name.clone()));
            }

            if measure == Measure::Freq {
                if let Some(min) = settings.min {
                    resolved.min_frequency = min.max(0.0).ceil() as usize;
                }
                if let Some(max) = settings.max {
                    if max < 0.0 {
                        return Err(invalid(name, max));
                    }
                    resolved.max_frequency = (max.floor() as usize).min(nb_transactions);
                }
            } else if settings.min.is_some() || settings.max.is_some() {
                resolved.thresholds.push(Threshold {
                    measure,
                    min: settings.min.map(MeasureValue::Real),
                    max: settings.max.map(MeasureValue::Real),
                });
            }
            if let Some(direction) = settings.objective {
                resolved.objectives.push(Objective { measure, direction });
            }
            if settings.closed {
                resolved.closed.push(measure);
            }
        }

        match self.task {
            Task::Maximal | Task::MinimalInfrequent if resolved.min_frequency == 0 => {
                let value = self
                    .measures
                    .get("freq")
                    .and_then(|s| s.min)
                    .unwrap_or(0.0);
                return Err(invalid("freq.min", value));
            }
            Task::Skyline if resolved.objectives.is_empty() => {
                return Err(ConfigError::NoObjectives);
            }
            _ => {}
        }
        if let Some(max_jaccard) = self.overlap {
            if !(0.0..=1.0).contains(&max_jaccard) {
                return Err(invalid("overlap", max_jaccard));
            }
        }
        if self.max_solutions == Some(0) {
            return Err(invalid("max_solutions", 0.0));
        }
        debug!(task = %self.task, ?resolved, "configuration resolved");
        Ok(resolved)
    }
}

fn invalid(name: &str, value: f64) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::Aggregate;
    use crate::store::{StoreBuilder, TransactionStore};

    fn store() -> TransactionStore {
        StoreBuilder::new(3)
            .transaction(&[0, 1])
            .transaction(&[0, 1, 2])
            .transaction(&[2])
            .attribute("price", vec![1.0, 2.0, 3.0])
            .build()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = MiningConfig::default();
        assert_eq!(config.task, Task::All);
        assert!(config.present_first);
        assert!(!config.allow_empty);
        assert_eq!(config.item_order, ItemSelector::Input);
    }

    #[test]
    fn test_from_toml() {
        let config = MiningConfig::from_toml_str(
            r#"
            task = "skyline"
            item_order = "min_cover"
            closure = "domain"

            [measures.freq]
            min = 2
            objective = "maximize"

            [measures."max(price)"]
            objective = "minimize"
            closed = true
            "#,
        )
        .unwrap();
        assert_eq!(config.task, Task::Skyline);
        assert_eq!(config.item_order, ItemSelector::MinCover);
        assert_eq!(config.closure, ClosureConsistency::Domain);
        assert_eq!(config.measures["freq"].min, Some(2.0));
        assert!(config.measures["max(price)"].closed);

        let s = store();
        let resolved = config.validate(&MeasureRegistry::new(&s)).unwrap();
        assert_eq!(resolved.min_frequency, 2);
        assert_eq!(resolved.max_frequency, 3);
        assert_eq!(
            resolved.objectives,
            vec![
                Objective::maximize(Measure::Freq),
                Objective::minimize(Measure::Attribute(Aggregate::Max, 0)),
            ]
        );
        assert_eq!(resolved.closed, vec![Measure::Attribute(Aggregate::Max, 0)]);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        assert!(matches!(
            MiningConfig::from_toml_str("tsk = \"all\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(MiningConfig::from_toml_str("task = \"everything\"").is_err());
    }

    #[test]
    fn test_builder_and_thresholds() {
        let s = store();
        let resolved = MiningConfig::new(Task::All)
            .min("freq", 1.5)
            .max("freq", 9.0)
            .min("length", 2.0)
            .validate(&MeasureRegistry::new(&s))
            .unwrap();
        assert_eq!((resolved.min_frequency, resolved.max_frequency), (2, 3));
        assert_eq!(resolved.thresholds.len(), 1);
        assert_eq!(resolved.thresholds[0].measure, Measure::Length);
        assert_eq!(resolved.thresholds[0].min, Some(MeasureValue::Int(2)));
    }

    #[test]
    fn test_validation_errors() {
        let s = store();
        let registry = MeasureRegistry::new(&s);
        let check = |config: MiningConfig| config.validate(&registry).unwrap_err();

        assert!(matches!(
            check(MiningConfig::default().min("frq", 1.0)),
            ConfigError::UnknownMeasure(_)
        ));
        assert!(matches!(
            check(MiningConfig::default().min("area", 5.0).max("area", 2.0)),
            ConfigError::ContradictoryThresholds { .. }
        ));
        assert!(matches!(
            check(MiningConfig::default().closed("area")),
            ConfigError::NotClosable(_)
        ));
        assert!(matches!(
            check(MiningConfig::default().min("grate", 1.0)),
            ConfigError::MissingClasses(_)
        ));
        assert!(matches!(
            check(MiningConfig::default().max("avg(weight)", 1.0)),
            ConfigError::MissingAttribute { .. }
        ));
        assert!(matches!(
            check(MiningConfig::new(Task::Skyline)),
            ConfigError::NoObjectives
        ));
        assert!(matches!(
            check(MiningConfig::new(Task::MinimalInfrequent)),
            ConfigError::InvalidValue { .. }
        ));
        assert!(matches!(
            check(MiningConfig::default().overlap(1.5)),
            ConfigError::InvalidValue { .. }
        ));
    }
}
