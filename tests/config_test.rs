// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Configuration files, class-labelled stores and rule bases.

mod common;

use common::{items, mine, pasquier};
use itemset_search::measure::Direction;
use itemset_search::rules::{minimal_non_redundant_rules, RuleThresholds};
use itemset_search::{ConfigError, MiningConfig, MiningError, Miner, StoreBuilder, Task};
use std::sync::Arc;

#[test]
fn test_toml_skyline_run() {
    let config = MiningConfig::from_toml_str(
        r#"
        task = "skyline"
        item_order = "ascending_frequency"
        present_first = false

        [measures.freq]
        objective = "maximize"

        [measures.area]
        objective = "maximize"
        "#,
    )
    .unwrap();
    let result = mine(config, &pasquier());
    assert_eq!(items(&result), vec![vec![1, 2, 4], vec![1, 4]]);
}

#[test]
fn test_toml_rejects_unknown_fields() {
    let err = MiningConfig::from_toml_str("task = \"closed\"\nthreads = 4\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));

    let err = MiningConfig::from_toml_str("[measures.freq]\nminimum = 2\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_validation_errors() {
    let store = pasquier();
    let rejected = |config: MiningConfig| match Miner::new(config, Arc::clone(&store)) {
        Err(MiningError::Config(err)) => err,
        other => panic!("expected a configuration error, got {:?}", other.map(|_| ())),
    };

    assert!(matches!(
        rejected(MiningConfig::default().min("frequency", 2.0)),
        ConfigError::UnknownMeasure(_)
    ));
    assert!(matches!(
        rejected(MiningConfig::default().min("freq", 3.0).max("freq", 2.0)),
        ConfigError::ContradictoryThresholds { .. }
    ));
    assert!(matches!(
        rejected(MiningConfig::new(Task::Closed).closed("area")),
        ConfigError::NotClosable(_)
    ));
    assert!(matches!(
        rejected(MiningConfig::new(Task::Skyline)),
        ConfigError::NoObjectives
    ));
    assert!(matches!(
        rejected(MiningConfig::new(Task::MinimalInfrequent)),
        ConfigError::InvalidValue { .. }
    ));
    assert!(matches!(
        rejected(MiningConfig::default().overlap(1.5)),
        ConfigError::InvalidValue { .. }
    ));
    assert!(matches!(
        rejected(MiningConfig::default().min("grate", 2.0)),
        ConfigError::MissingClasses(_)
    ));
    assert!(matches!(
        rejected(MiningConfig::default().min("avg(price)", 2.0)),
        ConfigError::MissingAttribute { .. }
    ));
}

#[test]
fn test_class_measures() {
    let store = Arc::new(
        StoreBuilder::new(3)
            .transaction(&[0, 1])
            .transaction(&[0, 1, 2])
            .transaction(&[0, 2])
            .transaction(&[1, 2])
            .transaction(&[2])
            .classes(&[true, true, true, false, false])
            .build()
            .unwrap(),
    );
    // Patterns occurring at least twice in the positive class and never in
    // the negative one.
    let config = MiningConfig::default().min("freq1", 2.0).max("freq2", 0.0);
    let result = mine(config, &store);
    assert_eq!(items(&result), vec![vec![0], vec![0, 1], vec![0, 2]]);
}

#[test]
fn test_attribute_thresholds() {
    let store = Arc::new(
        StoreBuilder::new(3)
            .transaction(&[0, 1])
            .transaction(&[0, 1, 2])
            .transaction(&[2])
            .attribute("price", vec![10.0, 20.0, 30.0])
            .build()
            .unwrap(),
    );
    // Aggregates range over the transactions of the cover.
    let config = MiningConfig::default().max("max(price)", 20.0);
    let result = mine(config, &store);
    assert_eq!(
        items(&result),
        vec![vec![0], vec![0, 1], vec![0, 1, 2], vec![0, 2], vec![1], vec![1, 2]]
    );
}

#[test]
fn test_minimal_non_redundant_rules_from_mined_bases() {
    let store = pasquier();
    let generators = mine(
        MiningConfig::new(Task::Generators).min("freq", 2.0),
        &store,
    );
    let closed = mine(MiningConfig::new(Task::Closed).min("freq", 2.0), &store);
    let exact = RuleThresholds {
        min_confidence: Some(1.0),
        ..Default::default()
    };
    let rules = minimal_non_redundant_rules(&generators.patterns, &closed.patterns, &store, &exact);
    let sides: Vec<(Vec<usize>, Vec<usize>)> = rules
        .iter()
        .map(|r| (r.antecedent().to_vec(), r.consequent().to_vec()))
        .collect();
    assert_eq!(
        sides,
        vec![
            (vec![0], vec![2]),
            (vec![0, 1], vec![2, 4]),
            (vec![0, 4], vec![1, 2]),
            (vec![1], vec![4]),
            (vec![1, 2], vec![4]),
            (vec![2, 4], vec![1]),
            (vec![4], vec![1]),
        ]
    );

    let approximate = minimal_non_redundant_rules(
        &generators.patterns,
        &closed.patterns,
        &store,
        &RuleThresholds::default(),
    );
    assert!(approximate.len() > rules.len());
    assert!(approximate.iter().any(|r| !r.is_exact()));
}

#[test]
fn test_objective_direction_names() {
    let config = MiningConfig::new(Task::Skyline)
        .objective("freq", Direction::Maximize)
        .objective("length", Direction::Minimize);
    let text = toml::to_string(&config).unwrap();
    assert!(text.contains("objective = \"minimize\""));
    assert_eq!(MiningConfig::from_toml_str(&text).unwrap(), config);
}
