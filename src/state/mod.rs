// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Per-search bookkeeping that is not reversible.
//!
//! Counters only ever grow: backtracking the trail does not undo them.

pub mod statistics;

pub use statistics::{Counters, Statistics};
