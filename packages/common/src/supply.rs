use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::rarity::NftRarity;

/// Total mintable copies across the whole catalog.
pub const DEFAULT_SUPPLY_TARGET: u64 = 3_300_000;

/// Default seed for per-card supply generation.
pub const DEFAULT_SUPPLY_SEED: u64 = 0x5EED_CA4D;

/// Fraction of the total supply allotted to each tier.
pub fn tier_share(rarity: NftRarity) -> f64 {
    match rarity {
        NftRarity::Mythic => 0.005,
        NftRarity::Legendary => 0.02,
        NftRarity::Rare => 0.20,
        NftRarity::Common => 0.775,
    }
}

/// Per-card supply bounds for one tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyRange {
    pub min: i32,
    pub max: i32,
    pub avg: i32,
}

impl SupplyRange {
    /// Spread a tier's total evenly over its cards, then allow ±20% per card.
    pub fn for_tier(tier_total: u64, card_count: usize) -> Self {
        let count = card_count.max(1) as f64;
        let avg = (tier_total as f64 / count).round();
        let min = ((avg * 0.8).round() as i32).max(1);
        let max = ((avg * 1.2).round() as i32).max(min);
        Self {
            min,
            max,
            avg: avg as i32,
        }
    }
}

/// Deterministic supply sizing for a catalog.
///
/// The same target, seed and card id always yield the same supply, so
/// re-running a seed with identical input writes identical values.
#[derive(Clone, Debug)]
pub struct SupplyPlan {
    seed: u64,
    ranges: HashMap<NftRarity, SupplyRange>,
}

impl SupplyPlan {
    pub fn new(target: u64, seed: u64, cards_per_tier: &HashMap<NftRarity, usize>) -> Self {
        let ranges = NftRarity::ALL
            .iter()
            .map(|&rarity| {
                let tier_total = (target as f64 * tier_share(rarity)).round() as u64;
                let count = cards_per_tier.get(&rarity).copied().unwrap_or(0);
                (rarity, SupplyRange::for_tier(tier_total, count))
            })
            .collect();
        Self { seed, ranges }
    }

    pub fn range(&self, rarity: NftRarity) -> SupplyRange {
        self.ranges[&rarity]
    }

    /// Supply for a single card, drawn uniformly from its tier's range.
    pub fn supply_for(&self, card_id: i32, rarity: NftRarity) -> i32 {
        let range = self.range(rarity);
        let mut rng = StdRng::seed_from_u64(
            self.seed ^ (card_id as u32 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15),
        );
        rng.random_range(range.min..=range.max)
    }
}
