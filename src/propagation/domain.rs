// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Item domains.
//!
//! Each item of the store is a boolean decision: present in the pattern,
//! absent from it, or not yet decided. States live in the trail, so a host
//! rewinding the trail also undoes every decision made since.

use super::errors::PropagationFailure;
use super::partition::CoverTracker;
use crate::store::TransactionStore;
use crate::trail::{Trail, TrailValue, Trailed};

/// Decision state of one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemState {
    Free,
    Present,
    Absent,
}

impl TrailValue for ItemState {
    fn to_bits(self) -> u64 {
        match self {
            ItemState::Free => 0,
            ItemState::Present => 1,
            ItemState::Absent => 2,
        }
    }

    fn from_bits(bits: u64) -> Self {
        match bits {
            1 => ItemState::Present,
            2 => ItemState::Absent,
            _ => ItemState::Free,
        }
    }
}

/// Trailed decision state of every item.
#[derive(Debug)]
pub struct ItemDomain {
    states: Vec<Trailed<ItemState>>,
    decided: Trailed<usize>,
    /// Number of effective fixes ever made; never rewound.
    changes: u64,
}

impl ItemDomain {
    pub fn new(trail: &mut Trail, nb_items: usize) -> Self {
        Self {
            states: (0..nb_items)
                .map(|_| Trailed::new(trail, ItemState::Free))
                .collect(),
            decided: Trailed::new(trail, 0),
            changes: 0,
        }
    }

    pub fn nb_items(&self) -> usize {
        self.states.len()
    }

    pub fn state(&self, trail: &Trail, item: usize) -> ItemState {
        self.states[item].get(trail)
    }

    pub fn is_undecided(&self, trail: &Trail, item: usize) -> bool {
        self.state(trail, item) == ItemState::Free
    }

    pub fn is_present(&self, trail: &Trail, item: usize) -> bool {
        self.state(trail, item) == ItemState::Present
    }

    /// Fix `item` to `state`.
    ///
    /// Returns whether the domain changed. Fixing an item to the state it
    /// already has is a no-op; fixing it to the opposite state fails.
    pub fn fix(
        &mut self,
        trail: &mut Trail,
        item: usize,
        state: ItemState,
    ) -> Result<bool, PropagationFailure> {
        let current = self.state(trail, item);
        if current == state {
            return Ok(false);
        }
        if current != ItemState::Free || state == ItemState::Free {
            return Err(PropagationFailure::Conflict { item });
        }
        self.states[item].set(trail, state);
        let decided = self.decided.get(trail);
        self.decided.set(trail, decided + 1);
        self.changes += 1;
        Ok(true)
    }

    pub fn fix_present(&mut self, trail: &mut Trail, item: usize) -> Result<bool, PropagationFailure> {
        self.fix(trail, item, ItemState::Present)
    }

    pub fn fix_absent(&mut self, trail: &mut Trail, item: usize) -> Result<bool, PropagationFailure> {
        self.fix(trail, item, ItemState::Absent)
    }

    /// Number of decided items.
    pub fn decided(&self, trail: &Trail) -> usize {
        self.decided.get(trail)
    }

    pub fn all_decided(&self, trail: &Trail) -> bool {
        self.decided(trail) == self.states.len()
    }

    /// Items in `state`, ascending.
    pub fn items_in(&self, trail: &Trail, state: ItemState) -> Vec<usize> {
        (0..self.states.len())
            .filter(|&item| self.state(trail, item) == state)
            .collect()
    }

    /// Change counter, for change notification by polling.
    pub fn changes(&self) -> u64 {
        self.changes
    }
}

/// A forced decision requested by a propagator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Forcing {
    pub item: usize,
    pub state: ItemState,
}

impl Forcing {
    pub fn present(item: usize) -> Self {
        Self {
            item,
            state: ItemState::Present,
        }
    }

    pub fn absent(item: usize) -> Self {
        Self {
            item,
            state: ItemState::Absent,
        }
    }
}

/// What a propagator sees: the store, the trail holding its reversible
/// state, the current item domain and the branch cover.
#[derive(Debug)]
pub struct DomainView<'a> {
    pub store: &'a TransactionStore,
    pub trail: &'a mut Trail,
    pub domain: &'a ItemDomain,
    /// Cover of the present items, in step with `domain`.
    pub cover: &'a mut CoverTracker,
}

impl<'a> DomainView<'a> {
    /// Bring `cover` in step with `domain` and borrow them together.
    pub fn new(
        store: &'a TransactionStore,
        trail: &'a mut Trail,
        domain: &'a ItemDomain,
        cover: &'a mut CoverTracker,
    ) -> Self {
        cover.sync(store, trail, domain);
        Self {
            store,
            trail,
            domain,
            cover,
        }
    }

    pub fn state(&self, item: usize) -> ItemState {
        self.domain.state(self.trail, item)
    }

    pub fn is_undecided(&self, item: usize) -> bool {
        self.domain.is_undecided(self.trail, item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_and_restore() {
        let mut trail = Trail::new();
        let mut domain = ItemDomain::new(&mut trail, 3);
        let level = trail.save_state();
        assert_eq!(domain.fix_present(&mut trail, 1), Ok(true));
        assert_eq!(domain.fix_present(&mut trail, 1), Ok(false));
        assert_eq!(domain.fix_absent(&mut trail, 2), Ok(true));
        assert_eq!(domain.decided(&trail), 2);
        assert_eq!(domain.items_in(&trail, ItemState::Free), vec![0]);

        trail.restore_state(level);
        assert!(domain.is_undecided(&trail, 1));
        assert_eq!(domain.decided(&trail), 0);
        assert_eq!(domain.changes(), 2);
    }

    #[test]
    fn test_conflicting_fix_fails() {
        let mut trail = Trail::new();
        let mut domain = ItemDomain::new(&mut trail, 2);
        domain.fix_absent(&mut trail, 0).unwrap();
        assert_eq!(
            domain.fix_present(&mut trail, 0),
            Err(PropagationFailure::Conflict { item: 0 })
        );
        assert_eq!(domain.state(&trail, 0), ItemState::Absent);
    }

    #[test]
    fn test_all_decided() {
        let mut trail = Trail::new();
        let mut domain = ItemDomain::new(&mut trail, 2);
        domain.fix_present(&mut trail, 0).unwrap();
        assert!(!domain.all_decided(&trail));
        domain.fix_absent(&mut trail, 1).unwrap();
        assert!(domain.all_decided(&trail));
        assert!(domain.is_present(&trail, 0));
    }
}
