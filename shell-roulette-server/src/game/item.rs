//! Items and Inventory Allocation
//!
//! Four consumables, each with a per-player count. Items are dealt on join
//! and topped up every time the shell deck is reloaded.

use serde::{Serialize, Deserialize};

use crate::core::rng::DeterministicRng;
use crate::{INITIAL_ITEM_TOTAL, ITEMS_PER_GRANT, MAX_ITEM_TOTAL};

/// Consumable item kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ItemKind {
    /// Magnifying glass: privately reveals the next shell.
    #[serde(alias = "mag")]
    Inspect = 0,
    /// Cigar: restores one health.
    #[serde(alias = "cigar")]
    Heal = 1,
    /// Saw: doubles the damage of the holder's next shot.
    #[serde(alias = "saw")]
    DoubleDamage = 2,
    /// Soda: ejects the next shell without firing it.
    #[serde(alias = "soda")]
    Skip = 3,
}

impl ItemKind {
    /// Every kind, in slot order.
    pub const ALL: [ItemKind; 4] = [
        ItemKind::Inspect,
        ItemKind::Heal,
        ItemKind::DoubleDamage,
        ItemKind::Skip,
    ];

    /// Pick a kind uniformly at random.
    pub fn random(rng: &mut DeterministicRng) -> Self {
        Self::ALL[rng.next_int(Self::ALL.len() as u32) as usize]
    }
}

/// Per-player item counts, one slot per [`ItemKind`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    /// Magnifying glasses.
    pub inspect: u8,
    /// Cigars.
    pub heal: u8,
    /// Saws.
    pub double_damage: u8,
    /// Sodas.
    pub skip: u8,
}

impl Inventory {
    /// Empty inventory.
    pub const EMPTY: Inventory = Inventory {
        inspect: 0,
        heal: 0,
        double_damage: 0,
        skip: 0,
    };

    fn slot_mut(&mut self, kind: ItemKind) -> &mut u8 {
        match kind {
            ItemKind::Inspect => &mut self.inspect,
            ItemKind::Heal => &mut self.heal,
            ItemKind::DoubleDamage => &mut self.double_damage,
            ItemKind::Skip => &mut self.skip,
        }
    }

    /// Count held of one kind.
    pub fn count(&self, kind: ItemKind) -> u8 {
        match kind {
            ItemKind::Inspect => self.inspect,
            ItemKind::Heal => self.heal,
            ItemKind::DoubleDamage => self.double_damage,
            ItemKind::Skip => self.skip,
        }
    }

    /// Sum across all kinds.
    pub fn total(&self) -> u32 {
        ItemKind::ALL.iter().map(|k| self.count(*k) as u32).sum()
    }

    /// Room left under [`MAX_ITEM_TOTAL`].
    pub fn space_left(&self) -> u32 {
        (MAX_ITEM_TOTAL as u32).saturating_sub(self.total())
    }

    /// Add one item of a kind.
    pub fn add(&mut self, kind: ItemKind) {
        let slot = self.slot_mut(kind);
        *slot = slot.saturating_add(1);
    }

    /// Remove one item of a kind. Returns false if none were held.
    pub fn take(&mut self, kind: ItemKind) -> bool {
        let slot = self.slot_mut(kind);
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }
}

/// Deal a starting inventory of exactly [`INITIAL_ITEM_TOTAL`] items.
pub fn initial_inventory(rng: &mut DeterministicRng) -> Inventory {
    let mut inventory = Inventory::EMPTY;
    for _ in 0..INITIAL_ITEM_TOTAL {
        inventory.add(ItemKind::random(rng));
    }
    inventory
}

/// Top up an inventory after a reload.
///
/// Grants `min(2, space_left)` items of uniformly random kinds; the same
/// kind can come up twice. Existing counts are never reduced, so a full
/// inventory is left untouched.
pub fn grant(inventory: &mut Inventory, rng: &mut DeterministicRng) -> Vec<ItemKind> {
    let count = inventory.space_left().min(ITEMS_PER_GRANT as u32);
    let mut granted = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let kind = ItemKind::random(rng);
        inventory.add(kind);
        granted.push(kind);
    }
    granted
}
