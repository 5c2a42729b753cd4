// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Constraint-based itemset mining.
//!
//! Mining tasks (closed patterns, generators, maximal frequent and minimal
//! infrequent patterns, skypatterns) are expressed as propagators over a
//! boolean decision per item, and solved by a backtracking search.
//!
//! # Data
//!
//! Shared and read-only: the [`store::TransactionStore`] holds, for each
//! item, the bitset of transactions containing it, plus optional class
//! labels and numeric attributes. It is built once and handed to every
//! search through an `Arc`.
//!
//! Per search and reversible: everything recorded on the [`Trail`], which
//! restores a saved level in time proportional to the changes made since.
//! That covers the present/absent/free state of each item
//! ([`propagation::ItemDomain`]) and the cover each propagator maintains
//! ([`cover::ReversibleSparseBitSet`], whose set of live words shrinks as
//! items are added).
//!
//! # Search Algorithm
//!
//! A search is a predicate program run by the [`SearchEngine`]:
//!
//! 1. [`predicates::PropagatePredicate`] reaches the fixpoint with every
//!    item free.
//! 2. [`predicates::BranchPredicate`] picks a free item each round, sets it
//!    present or absent and propagates again.
//! 3. [`predicates::SolutionPredicate`] reports the complete pattern.
//! 4. [`predicates::FailPredicate`] backtracks into the next branch.
//!
//! [`mining::Miner`] builds the program and the propagators from a
//! [`config::MiningConfig`].
//!
//! # Example
//!
//! ```
//! use itemset_search::config::{MiningConfig, Task};
//! use itemset_search::mining::Miner;
//! use itemset_search::store::TransactionStore;
//! use std::sync::Arc;
//!
//! let store = TransactionStore::from_transactions(
//!     3,
//!     &[vec![0, 1], vec![0, 1, 2], vec![0], vec![1, 2], vec![2]],
//! )
//! .unwrap();
//! let config = MiningConfig::new(Task::Closed).min("freq", 2.0);
//! let result = Miner::new(config, Arc::new(store)).unwrap().run();
//!
//! let closed: Vec<&[usize]> = result.patterns.iter().map(|p| p.items()).collect();
//! assert_eq!(closed, vec![&[0][..], &[0, 1], &[1], &[1, 2], &[2]]);
//! ```
//!
//! # References
//!
//! - Schaus, Aoga, Guns (2017). "CoverSize: A Global Constraint for
//!   Frequency-Based Itemset Mining." CP 2017.
//! - Ugarte et al. (2017). "Skypattern mining: From pattern condensed
//!   representations to dynamic constraint satisfaction problems."
//!   Artificial Intelligence 244.

pub mod config;
pub mod context;
pub mod cover;
pub mod engine;
pub mod error;
pub mod measure;
pub mod mining;
pub mod monitor;
pub mod pattern;
pub mod predicates;
pub mod propagation;
pub mod rules;
pub mod skyline;
pub mod state;
pub mod store;
pub mod trail;

pub use config::{MiningConfig, Task};
pub use context::SearchContext;
pub use engine::{Predicate, PredicateResult, SearchEngine};
pub use error::{ConfigError, MiningError, RuleError, StoreError};
pub use mining::{Miner, MiningResult};
pub use pattern::Pattern;
pub use store::{StoreBuilder, TransactionStore};
pub use trail::Trail;
