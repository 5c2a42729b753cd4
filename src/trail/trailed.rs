// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Typed handles onto trail slots.

use super::{Slot, Trail};
use std::marker::PhantomData;

/// Conversion between a small `Copy` value and its raw slot encoding.
pub trait TrailValue: Copy {
    fn to_bits(self) -> u64;
    fn from_bits(bits: u64) -> Self;
}

impl TrailValue for u64 {
    fn to_bits(self) -> u64 {
        self
    }
    fn from_bits(bits: u64) -> Self {
        bits
    }
}

impl TrailValue for usize {
    fn to_bits(self) -> u64 {
        self as u64
    }
    fn from_bits(bits: u64) -> Self {
        bits as usize
    }
}

impl TrailValue for i64 {
    fn to_bits(self) -> u64 {
        self as u64
    }
    fn from_bits(bits: u64) -> Self {
        bits as i64
    }
}

impl TrailValue for bool {
    fn to_bits(self) -> u64 {
        self as u64
    }
    fn from_bits(bits: u64) -> Self {
        bits != 0
    }
}

impl TrailValue for f64 {
    fn to_bits(self) -> u64 {
        f64::to_bits(self)
    }
    fn from_bits(bits: u64) -> Self {
        f64::from_bits(bits)
    }
}

/// A typed value stored in a trail slot.
///
/// The handle itself is immutable and cheap to copy; the value lives in the
/// trail, so every write goes through the trail and is undone on rewind.
///
/// # Example
///
/// ```
/// use itemset_search::trail::{Trail, Trailed};
///
/// let mut trail = Trail::new();
/// let count = Trailed::new(&mut trail, 42usize);
///
/// let level = trail.save_state();
/// count.set(&mut trail, 100);
/// assert_eq!(count.get(&trail), 100);
///
/// trail.restore_state(level);
/// assert_eq!(count.get(&trail), 42);
/// ```
#[derive(Debug)]
pub struct Trailed<T: TrailValue> {
    slot: Slot,
    _phantom: PhantomData<T>,
}

impl<T: TrailValue> Clone for Trailed<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: TrailValue> Copy for Trailed<T> {}

impl<T: TrailValue> Trailed<T> {
    /// Allocate a slot in `trail` holding `initial_value`.
    pub fn new(trail: &mut Trail, initial_value: T) -> Self {
        Self {
            slot: trail.alloc(initial_value.to_bits()),
            _phantom: PhantomData,
        }
    }

    /// Get the current value.
    #[inline]
    pub fn get(&self, trail: &Trail) -> T {
        T::from_bits(trail.get(self.slot))
    }

    /// Set the value, recording the old value in the trail.
    #[inline]
    pub fn set(&self, trail: &mut Trail, new_value: T) {
        trail.set(self.slot, new_value.to_bits());
    }

    /// Set the value only if it differs from current value.
    ///
    /// Returns true if the value was changed.
    pub fn maybe_set(&self, trail: &mut Trail, new_value: T) -> bool {
        let bits = new_value.to_bits();
        if trail.get(self.slot) != bits {
            trail.set(self.slot, bits);
            true
        } else {
            false
        }
    }

    /// The underlying slot.
    pub fn slot(&self) -> Slot {
        self.slot
    }
}
