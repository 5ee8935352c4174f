use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::rarity::SlotRarity;
use crate::wildcard::WildcardOdds;

/// Preferred card types for common slots, cycled by slot index.
pub const COMMON_TYPES: &[&str] = &["minion", "spell"];
/// Preferred card types for rare slots, cycled by slot index.
pub const RARE_TYPES: &[&str] = &["minion", "spell"];
/// Epic slots always lean toward spells.
pub const EPIC_TYPE: &str = "spell";
/// Preferred card types for wildcard slots; the first wildcard favors a hero.
pub const WILDCARD_TYPES: &[&str] = &["hero", "spell", "minion"];

/// Which slot group of a pack a slot belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    Common,
    Rare,
    Epic,
    Wildcard,
}

/// One guaranteed draw opportunity within a pack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackSlot {
    pub kind: SlotKind,
    /// Nominal rarity; for wildcards this is already rolled.
    pub rarity: SlotRarity,
    /// Card type tried first within each fallback tier.
    pub preferred_type: Option<&'static str>,
}

/// Slot counts of a pack type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotLayout {
    pub common: u32,
    pub rare: u32,
    pub epic: u32,
    pub wildcard: u32,
}

impl SlotLayout {
    /// Nominal number of cards in the pack.
    pub fn card_count(&self) -> u32 {
        self.common + self.rare + self.epic + self.wildcard
    }

    /// Expand the layout into ordered slots: commons, rares, epics, wildcards.
    ///
    /// Wildcard rarities are rolled here, once per slot.
    pub fn plan<R: Rng + ?Sized>(&self, odds: WildcardOdds, rng: &mut R) -> Vec<PackSlot> {
        let mut slots = Vec::with_capacity(self.card_count() as usize);

        for i in 0..self.common as usize {
            slots.push(PackSlot {
                kind: SlotKind::Common,
                rarity: SlotRarity::Common,
                preferred_type: Some(COMMON_TYPES[i % COMMON_TYPES.len()]),
            });
        }
        for i in 0..self.rare as usize {
            slots.push(PackSlot {
                kind: SlotKind::Rare,
                rarity: SlotRarity::Rare,
                preferred_type: Some(RARE_TYPES[i % RARE_TYPES.len()]),
            });
        }
        for _ in 0..self.epic {
            slots.push(PackSlot {
                kind: SlotKind::Epic,
                rarity: SlotRarity::Epic,
                preferred_type: Some(EPIC_TYPE),
            });
        }
        for i in 0..self.wildcard as usize {
            slots.push(PackSlot {
                kind: SlotKind::Wildcard,
                rarity: odds.roll(rng),
                preferred_type: Some(WILDCARD_TYPES[i % WILDCARD_TYPES.len()]),
            });
        }

        slots
    }
}
