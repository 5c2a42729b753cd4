// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

use super::{Insertion, SharedSkyline};
use crate::monitor::Monitor;
use crate::pattern::Pattern;
use crate::store::TransactionStore;
use tracing::debug;

/// Inserts every solution into a shared frontier.
#[derive(Debug)]
pub struct SkylineMonitor {
    skyline: SharedSkyline,
    accepted: usize,
}

impl SkylineMonitor {
    pub fn new(skyline: SharedSkyline) -> Self {
        Self {
            skyline,
            accepted: 0,
        }
    }

    /// Solutions that reached the frontier, evicted or not since.
    pub fn accepted(&self) -> usize {
        self.accepted
    }
}

impl Monitor for SkylineMonitor {
    fn on_solution(&mut self, pattern: &mut Pattern, store: &TransactionStore) {
        let mut skyline = self.skyline.borrow_mut();
        let values = pattern.values(&skyline.measures(), store);
        match skyline.insert(pattern.clone(), values) {
            Insertion::Accepted { evicted } => {
                self.accepted += 1;
                debug!(pattern = %pattern, evicted, "skyline accepted");
            }
            Insertion::Rejected => debug!(pattern = %pattern, "skyline rejected"),
        }
    }
}
