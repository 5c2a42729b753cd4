// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use itemset_search::measure::Measure;
use itemset_search::skyline::{dominates, Objective};
use itemset_search::{MiningConfig, MiningResult, Miner, Pattern, StoreBuilder, TransactionStore};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Route `tracing` output through the test harness.
///
/// Set `RUST_LOG=itemset_search=debug` to see the search.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Five transactions over three items.
pub fn worked_example() -> Arc<TransactionStore> {
    store(3, &[&[0, 1], &[0, 1, 2], &[0], &[1, 2], &[2]])
}

/// The example database of Pasquier et al. (1999), items `a..e` as `0..4`.
pub fn pasquier() -> Arc<TransactionStore> {
    store(5, &[&[0, 2, 3], &[1, 2, 4], &[0, 1, 2, 4], &[1, 4], &[0, 1, 2, 4]])
}

pub fn store(nb_items: usize, transactions: &[&[usize]]) -> Arc<TransactionStore> {
    let transactions: Vec<Vec<usize>> = transactions.iter().map(|t| t.to_vec()).collect();
    Arc::new(TransactionStore::from_transactions(nb_items, &transactions).unwrap())
}

/// A store with one per-transaction attribute `a`.
pub fn with_attribute(nb_items: usize, transactions: &[&[usize]], a: Vec<f64>) -> Arc<TransactionStore> {
    let builder = transactions
        .iter()
        .fold(StoreBuilder::new(nb_items), |b, t| b.transaction(t));
    Arc::new(builder.attribute("a", a).build().unwrap())
}

pub fn mine(config: MiningConfig, store: &Arc<TransactionStore>) -> MiningResult {
    init_tracing();
    Miner::new(config, Arc::clone(store)).unwrap().run()
}

/// Items of every mined pattern, in result order.
pub fn items(result: &MiningResult) -> Vec<Vec<usize>> {
    result.patterns.iter().map(|p| p.items().to_vec()).collect()
}

/// Items with frequencies, in result order.
pub fn with_frequency(result: &MiningResult) -> Vec<(Vec<usize>, usize)> {
    result
        .patterns
        .iter()
        .map(|p| (p.items().to_vec(), p.frequency()))
        .collect()
}

/// Every subset of `0..nb_items`, as sorted item lists.
pub fn all_subsets(nb_items: usize) -> Vec<Vec<usize>> {
    (0u32..1 << nb_items)
        .map(|mask| (0..nb_items).filter(|&i| mask & (1 << i) != 0).collect())
        .collect()
}

/// Distinct measure vectors of a skyline result, sorted.
pub fn frontier_values(result: &MiningResult) -> Vec<Vec<f64>> {
    let members = result.skyline.as_deref().unwrap_or_default();
    distinct(members.iter().map(|m| m.values.iter().map(|v| v.as_f64()).collect()))
}

/// Distinct measure vectors of the undominated non-empty patterns with at
/// least `min_frequency` transactions.
pub fn pareto_frontier(
    store: &TransactionStore,
    objectives: &[Objective],
    min_frequency: usize,
) -> Vec<Vec<f64>> {
    let measures: Vec<Measure> = objectives.iter().map(|o| o.measure).collect();
    let candidates: Vec<_> = all_subsets(store.nb_items())
        .into_iter()
        .filter(|items| !items.is_empty())
        .map(|items| Pattern::from_items(store, items))
        .filter(|p| p.frequency() >= min_frequency)
        .map(|mut p| p.values(&measures, store))
        .collect();
    distinct(
        candidates
            .iter()
            .filter(|v| !candidates.iter().any(|w| dominates(objectives, w, v)))
            .map(|v| v.iter().map(|x| x.as_f64()).collect()),
    )
}

/// Non-empty patterns with at least `min_frequency` transactions such that
/// no item can be added, keeping that frequency, without changing a measure.
pub fn closed_patterns(
    store: &TransactionStore,
    measures: &[Measure],
    min_frequency: usize,
) -> Vec<Vec<usize>> {
    let values = |items: &[usize]| Pattern::from_items(store, items.to_vec()).values(measures, store);
    let frequency = |items: &[usize]| store.cover_of(items).len();
    let mut closed: Vec<Vec<usize>> = all_subsets(store.nb_items())
        .into_iter()
        .filter(|x| !x.is_empty() && frequency(x) >= min_frequency)
        .filter(|x| {
            let own = values(x);
            (0..store.nb_items()).filter(|i| !x.contains(i)).all(|i| {
                let mut y = x.clone();
                y.push(i);
                y.sort_unstable();
                frequency(&y) < min_frequency || values(&y) != own
            })
        })
        .collect();
    closed.sort();
    closed
}

fn distinct(vectors: impl Iterator<Item = Vec<f64>>) -> Vec<Vec<f64>> {
    let mut vectors: Vec<Vec<f64>> = vectors.collect();
    vectors.sort_by(|a, b| a.partial_cmp(b).unwrap());
    vectors.dedup();
    vectors
}
