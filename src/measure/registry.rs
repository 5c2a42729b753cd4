// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Measure names, resolved and validated against a store.
//!
//! Simple measures go by their short name (`freq`, `grate`, ...). Attribute
//! measures are written `aggregate(attribute)` where the attribute is given
//! by name or by index, e.g. `min(price)` or `avg(0)`.

use super::computer::{computer_for, MeasureComputer};
use super::{Aggregate, Measure};
use crate::error::ConfigError;
use crate::store::TransactionStore;
use crate::trail::Trail;
use std::str::FromStr;
use strum::IntoEnumIterator;

/// Name resolution for the measures a store supports.
#[derive(Debug, Clone, Copy)]
pub struct MeasureRegistry<'a> {
    store: &'a TransactionStore,
}

impl<'a> MeasureRegistry<'a> {
    pub fn new(store: &'a TransactionStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &'a TransactionStore {
        self.store
    }

    /// Parse a measure name and check the store can evaluate it.
    pub fn resolve(&self, name: &str) -> Result<Measure, ConfigError> {
        let name = name.trim();
        let measure = match parse_attribute_measure(name) {
            Some((aggregate, key)) => {
                let aggregate = Aggregate::from_str(aggregate)
                    .map_err(|_| ConfigError::UnknownMeasure(name.to_string()))?;
                let index = self.store.attribute_index(key).ok_or_else(|| {
                    ConfigError::MissingAttribute {
                        measure: name.to_string(),
                        attribute: key.to_string(),
                    }
                })?;
                Measure::Attribute(aggregate, index)
            }
            None => Measure::SIMPLE
                .iter()
                .copied()
                .find(|m| m.simple_name() == Some(name))
                .ok_or_else(|| ConfigError::UnknownMeasure(name.to_string()))?,
        };
        if measure.requires_classes() && !self.store.has_classes() {
            return Err(ConfigError::MissingClasses(name.to_string()));
        }
        Ok(measure)
    }

    /// Display name, using the attribute's name rather than its index.
    pub fn name(&self, measure: Measure) -> String {
        match measure {
            Measure::Attribute(aggregate, index) => {
                format!("{}({})", aggregate, self.store.attribute(index).name)
            }
            simple => simple.to_string(),
        }
    }

    /// Every measure this store can evaluate.
    pub fn measures(&self) -> Vec<Measure> {
        let mut measures: Vec<Measure> = Measure::SIMPLE
            .iter()
            .copied()
            .filter(|m| !m.requires_classes() || self.store.has_classes())
            .collect();
        for index in 0..self.store.attributes().len() {
            measures.extend(Aggregate::iter().map(|a| Measure::Attribute(a, index)));
        }
        measures
    }

    /// Display names of [`Self::measures`].
    pub fn names(&self) -> Vec<String> {
        self.measures().into_iter().map(|m| self.name(m)).collect()
    }

    /// Incremental computer for a measure used as a closure criterion.
    pub fn computer(
        &self,
        measure: Measure,
        trail: &mut Trail,
    ) -> Result<Box<dyn MeasureComputer>, ConfigError> {
        computer_for(measure, self.store, trail)
            .ok_or_else(|| ConfigError::NotClosable(self.name(measure)))
    }
}

/// Split `agg(key)` into its parts.
fn parse_attribute_measure(name: &str) -> Option<(&str, &str)> {
    let open = name.find('(')?;
    let inner = name[open + 1..].strip_suffix(')')?;
    Some((name[..open].trim(), inner.trim()))
}
