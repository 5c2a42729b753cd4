// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Trail-based backtracking for reversible search state.
//!
//! All reversible state of a search branch lives in one arena of `u64` slots
//! owned by the [`Trail`]. Writing a slot through the trail logs the slot's old
//! value, and rewinding replays the log backwards. Restoring is therefore
//! proportional to the number of edits made since the save point, never to the
//! size of the arena.
//!
//! Two save-point flavours are offered:
//!
//! - **Decision levels** ([`Trail::save_state`] / [`Trail::restore_state`]):
//!   numbered from 1, strictly nested, matching a host's depth-first search.
//! - **Marks** ([`Trail::mark`] / [`Trail::rewind_to`]): raw positions in the
//!   edit log, used by the predicate engine which rewinds to the same point
//!   repeatedly while exploring choices.
//!
//! A slot's old value is logged at most once per save point. Each slot carries
//! the epoch at which it was last logged; every save point (level, mark or
//! rewind) opens a fresh epoch, so a stamp equal to the current epoch means the
//! entry for this save point is already in the log.

pub mod trailed;

pub use trailed::{TrailValue, Trailed};

/// Index of a slot in the trail arena.
pub type Slot = usize;

/// Decision level returned by [`Trail::save_state`].
pub type Level = usize;

/// A single entry in the trail, recording one state change.
#[derive(Debug, Clone, Copy)]
struct TrailEntry {
    slot: Slot,
    old_value: u64,
}

/// The trail: slot arena plus edit log.
///
/// Every `SearchContext` owns its own trail, so independent searches over
/// the same store never share reversible state.
#[derive(Debug, Default)]
pub struct Trail {
    /// Current slot values.
    values: Vec<u64>,
    /// Epoch at which each slot was last logged.
    stamps: Vec<u64>,
    /// Edit log.
    entries: Vec<TrailEntry>,
    /// Edit log positions of the saved decision levels.
    levels: Vec<usize>,
    /// Current epoch; advanced by every save point and rewind.
    epoch: u64,
}

impl Trail {
    /// Create a new empty trail.
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            stamps: Vec::new(),
            entries: Vec::with_capacity(1024),
            levels: Vec::with_capacity(64),
            epoch: 1,
        }
    }

    /// Allocate one slot holding `initial`.
    ///
    /// Allocation is not itself trailed: slots outlive every rewind.
    pub fn alloc(&mut self, initial: u64) -> Slot {
        let slot = self.values.len();
        self.values.push(initial);
        self.stamps.push(0);
        slot
    }

    /// Allocate a contiguous block of slots initialised from `values`.
    ///
    /// Returns the first slot of the block.
    pub fn alloc_block(&mut self, values: &[u64]) -> Slot {
        let first = self.values.len();
        self.values.extend_from_slice(values);
        self.stamps.resize(self.values.len(), 0);
        first
    }

    /// Number of allocated slots.
    pub fn slot_count(&self) -> usize {
        self.values.len()
    }

    /// Current value of a slot.
    #[inline]
    pub fn get(&self, slot: Slot) -> u64 {
        self.values[slot]
    }

    /// Write a slot, logging the old value if needed.
    #[inline]
    pub fn set(&mut self, slot: Slot, value: u64) {
        let old_value = self.values[slot];
        if old_value == value {
            return;
        }
        if self.stamps[slot] != self.epoch {
            self.stamps[slot] = self.epoch;
            self.entries.push(TrailEntry { slot, old_value });
        }
        self.values[slot] = value;
    }

    /// Save the current state as a new decision level.
    ///
    /// Returns the level number (1 for the first save).
    pub fn save_state(&mut self) -> Level {
        self.levels.push(self.entries.len());
        self.epoch += 1;
        self.levels.len()
    }

    /// Restore the state held when `level` was entered.
    ///
    /// Levels deeper than `level` are discarded along with `level` itself, so
    /// the current depth afterwards is `level - 1`.
    ///
    /// # Panics
    ///
    /// Panics if `level` was never saved or has already been restored.
    pub fn restore_state(&mut self, level: Level) {
        if level == 0 || level > self.levels.len() {
            panic!(
                "Trail invariant violated: restore to level {} but depth is {}",
                level,
                self.levels.len()
            );
        }
        let position = self.levels[level - 1];
        self.levels.truncate(level - 1);
        self.unwind(position);
    }

    /// Current decision level (number of saved, unrestored levels).
    pub fn level(&self) -> Level {
        self.levels.len()
    }

    /// Take a positional mark for [`Trail::rewind_to`].
    pub fn mark(&mut self) -> usize {
        self.epoch += 1;
        self.entries.len()
    }

    /// Rewind every edit made after `mark`.
    ///
    /// Decision levels saved after the mark are discarded.
    ///
    /// # Panics
    ///
    /// Panics if `mark` lies beyond the end of the edit log.
    pub fn rewind_to(&mut self, mark: usize) {
        if mark > self.entries.len() {
            panic!(
                "Trail invariant violated: rewind to mark {} beyond log length {}",
                mark,
                self.entries.len()
            );
        }
        while self.levels.last().is_some_and(|&position| position > mark) {
            self.levels.pop();
        }
        self.unwind(mark);
    }

    fn unwind(&mut self, position: usize) {
        while self.entries.len() > position {
            if let Some(entry) = self.entries.pop() {
                self.values[entry.slot] = entry.old_value;
            }
        }
        self.epoch += 1;
    }

    /// Get the current number of entries in the edit log.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the edit log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
