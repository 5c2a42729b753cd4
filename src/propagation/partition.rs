// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The branch cover: the item domain split into blocks, plus the cover of
//! the present items.
//!
//! An [`ItemPartition`] keeps the items in one permutation laid out as
//! `[present | free | absent]`, with the two boundaries trailed. Syncing with
//! the domain only scans the free block and moves newly decided items to the
//! edge of their block. As with the reversible bitset, swaps only happen
//! inside the free block, so a rewind restores the exact block contents.
//!
//! Each search context owns one [`CoverTracker`]. The propagation driver
//! syncs it before every propagator runs, and propagators and measure
//! computers read it instead of intersecting covers of their own.

use super::domain::{ItemDomain, ItemState};
use crate::cover::{ReversibleSparseBitSet, SparseBitSet};
use crate::store::TransactionStore;
use crate::trail::{Trail, Trailed};

#[derive(Debug)]
pub struct ItemPartition {
    order: Vec<usize>,
    present_end: Trailed<usize>,
    absent_start: Trailed<usize>,
}

impl ItemPartition {
    pub fn new(trail: &mut Trail, nb_items: usize) -> Self {
        Self {
            order: (0..nb_items).collect(),
            present_end: Trailed::new(trail, 0),
            absent_start: Trailed::new(trail, nb_items),
        }
    }

    pub fn present<'a>(&'a self, trail: &Trail) -> &'a [usize] {
        &self.order[..self.present_end.get(trail)]
    }

    pub fn free<'a>(&'a self, trail: &Trail) -> &'a [usize] {
        &self.order[self.present_end.get(trail)..self.absent_start.get(trail)]
    }

    pub fn absent<'a>(&'a self, trail: &Trail) -> &'a [usize] {
        &self.order[self.absent_start.get(trail)..]
    }

    /// Move items decided since the last sync out of the free block.
    ///
    /// Returns the items that became present.
    pub fn sync(&mut self, trail: &mut Trail, domain: &ItemDomain) -> Vec<usize> {
        let mut newly_present = Vec::new();
        let mut present_end = self.present_end.get(trail);
        let mut absent_start = self.absent_start.get(trail);
        let mut k = present_end;
        while k < absent_start {
            let item = self.order[k];
            match domain.state(trail, item) {
                ItemState::Free => k += 1,
                ItemState::Present => {
                    self.order.swap(k, present_end);
                    present_end += 1;
                    k += 1;
                    newly_present.push(item);
                }
                ItemState::Absent => {
                    absent_start -= 1;
                    self.order.swap(k, absent_start);
                }
            }
        }
        self.present_end.set(trail, present_end);
        self.absent_start.set(trail, absent_start);
        newly_present
    }
}

/// Item partition plus the reversible cover of the present items.
#[derive(Debug)]
pub struct CoverTracker {
    pub items: ItemPartition,
    pub cover: ReversibleSparseBitSet,
}

impl CoverTracker {
    pub fn new(trail: &mut Trail, store: &TransactionStore) -> Self {
        Self {
            items: ItemPartition::new(trail, store.nb_items()),
            cover: ReversibleSparseBitSet::new(trail, store.full_cover()),
        }
    }

    /// Catch up with the domain, narrowing the cover by new present items.
    ///
    /// Returns the items that became present.
    pub fn sync(
        &mut self,
        store: &TransactionStore,
        trail: &mut Trail,
        domain: &ItemDomain,
    ) -> Vec<usize> {
        let newly_present = self.items.sync(trail, domain);
        for &item in &newly_present {
            self.cover.intersect_with(trail, store.cover(item));
        }
        newly_present
    }

    pub fn present<'a>(&'a self, trail: &Trail) -> &'a [usize] {
        self.items.present(trail)
    }

    pub fn free<'a>(&'a self, trail: &Trail) -> &'a [usize] {
        self.items.free(trail)
    }

    pub fn absent<'a>(&'a self, trail: &Trail) -> &'a [usize] {
        self.items.absent(trail)
    }

    /// Size of the cover of the present items.
    pub fn size(&self, trail: &Trail) -> usize {
        self.cover.cardinality(trail)
    }

    /// Size of the cover of present ∪ every free item, computed in the mask.
    ///
    /// Leaves the mask holding that cover.
    pub fn mask_all_free(&mut self, trail: &Trail, store: &TransactionStore) -> usize {
        self.mask_free_except(trail, store, None)
    }

    /// Size of the cover of present ∪ free \ {skip}, computed in the mask.
    pub fn mask_free_except(
        &mut self,
        trail: &Trail,
        store: &TransactionStore,
        skip: Option<usize>,
    ) -> usize {
        self.cover.reset_mask(trail);
        for &item in self.items.free(trail) {
            if Some(item) != skip {
                self.cover.and_mask(trail, store.cover(item));
            }
        }
        self.cover.mask_cardinality(trail)
    }
}

/// Cover of `present` with one item left out, for each present item in turn.
///
/// Uses prefix and suffix intersections, so the cost is linear in the
/// number of present items.
pub fn leave_one_out_covers(store: &TransactionStore, present: &[usize]) -> Vec<SparseBitSet> {
    let mut prefixes = Vec::with_capacity(present.len());
    let mut running = SparseBitSet::from_bitset(store.full_cover());
    for &item in present {
        prefixes.push(running.clone());
        running.and(store.cover(item));
    }
    let mut result = Vec::with_capacity(present.len());
    let mut suffix = store.full_cover().clone();
    for (k, &item) in present.iter().enumerate().rev() {
        let mut cover = prefixes[k].clone();
        cover.and(&suffix);
        result.push(cover);
        suffix.intersect_with(store.cover(item));
    }
    result.reverse();
    result
}
