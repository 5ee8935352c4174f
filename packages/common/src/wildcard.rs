use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::rarity::SlotRarity;

/// Width of the epic band that follows the mythic and legendary bands.
pub const EPIC_BAND: f64 = 20.0;

/// Upgrade chances for a wildcard slot, in percent.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WildcardOdds {
    pub legendary_chance: f64,
    pub mythic_chance: f64,
}

impl WildcardOdds {
    pub fn new(legendary_chance: f64, mythic_chance: f64) -> Self {
        Self {
            legendary_chance,
            mythic_chance,
        }
    }

    /// Resolve a roll in `[0, 100)` to a nominal rarity.
    ///
    /// Bands are cumulative with strict upper bounds:
    /// `[0, m)` mythic, `[m, m+l)` legendary, `[m+l, m+l+20)` epic, rest rare.
    pub fn rarity_for_roll(&self, roll: f64) -> SlotRarity {
        let mythic_end = self.mythic_chance;
        let legendary_end = mythic_end + self.legendary_chance;
        let epic_end = legendary_end + EPIC_BAND;

        if roll < mythic_end {
            SlotRarity::Mythic
        } else if roll < legendary_end {
            SlotRarity::Legendary
        } else if roll < epic_end {
            SlotRarity::Epic
        } else {
            SlotRarity::Rare
        }
    }

    /// Roll a uniform value in `[0, 100)` and resolve it.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> SlotRarity {
        let roll = rng.random::<f64>() * 100.0;
        self.rarity_for_roll(roll)
    }
}
