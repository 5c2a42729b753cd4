// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Solution monitors.
//!
//! A monitor is called once per solution with the completed pattern. It may
//! compute measures on it (they are cached on the pattern) and record it.

use crate::pattern::Pattern;
use crate::propagation::OverlapHistory;
use crate::store::TransactionStore;
use std::cell::RefCell;
use std::rc::Rc;

pub trait Monitor: std::fmt::Debug {
    fn on_solution(&mut self, pattern: &mut Pattern, store: &TransactionStore);
}

/// Patterns collected by a [`PatternCollector`].
pub type CollectedPatterns = Rc<RefCell<Vec<Pattern>>>;

/// Keeps a copy of every solution.
#[derive(Debug, Default)]
pub struct PatternCollector {
    patterns: CollectedPatterns,
}

impl PatternCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the collected patterns, valid after the monitor is boxed.
    pub fn patterns(&self) -> CollectedPatterns {
        Rc::clone(&self.patterns)
    }
}

impl Monitor for PatternCollector {
    fn on_solution(&mut self, pattern: &mut Pattern, _store: &TransactionStore) {
        self.patterns.borrow_mut().push(pattern.clone());
    }
}

/// Appends each solution's cover to an overlap history.
#[derive(Debug)]
pub struct OverlapMonitor {
    history: OverlapHistory,
}

impl OverlapMonitor {
    pub fn new(history: OverlapHistory) -> Self {
        Self { history }
    }
}

impl Monitor for OverlapMonitor {
    fn on_solution(&mut self, pattern: &mut Pattern, _store: &TransactionStore) {
        self.history.borrow_mut().push(pattern.cover().clone());
    }
}
