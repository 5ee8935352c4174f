//! TOML catalog manifest: the card list and pack types the seeder loads.
//!
//! ```toml
//! [[cards]]
//! id = 1001
//! name = "Fenrir Unchained"
//! type = "minion"
//! rarity = "epic"
//! class = "Hunter"
//!
//! [[packs]]
//! name = "Standard Pack"
//! price = 100
//! common_slots = 3
//! rare_slots = 1
//! wildcard_slots = 1
//! legendary_chance = 15.0
//! mythic_chance = 5.0
//! ```

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use common::{NftRarity, SupplyPlan};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed catalog manifest: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid catalog manifest: {0}")]
    Invalid(String),
}

fn default_card_type() -> String {
    "minion".into()
}

fn default_class() -> String {
    "neutral".into()
}

fn default_true() -> bool {
    true
}

/// A card as authored in the game's data.
#[derive(Clone, Debug, Deserialize)]
pub struct CardEntry {
    pub id: i32,
    pub name: String,
    #[serde(rename = "type", default = "default_card_type")]
    pub card_type: String,
    /// The game's rarity label (`common`, `rare`, `epic`, `legendary`, ...).
    pub rarity: Option<String>,
    #[serde(rename = "class", default = "default_class")]
    pub hero_class: String,
    /// Tokens and other uncollectible cards get no supply row.
    #[serde(default = "default_true")]
    pub collectible: bool,
    /// Overrides the computed supply.
    pub max_supply: Option<i32>,
    #[serde(default)]
    pub reward_reserve: i32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PackEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: i32,
    #[serde(default)]
    pub common_slots: i32,
    #[serde(default)]
    pub rare_slots: i32,
    #[serde(default)]
    pub epic_slots: i32,
    #[serde(default)]
    pub wildcard_slots: i32,
    #[serde(default)]
    pub legendary_chance: f64,
    #[serde(default)]
    pub mythic_chance: f64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CatalogManifest {
    #[serde(default)]
    pub cards: Vec<CardEntry>,
    #[serde(default)]
    pub packs: Vec<PackEntry>,
}

/// A `card_supply` row ready to upsert.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SupplyRow {
    pub card_id: i32,
    pub card_name: String,
    pub nft_rarity: NftRarity,
    pub card_type: String,
    pub hero_class: String,
    pub max_supply: i32,
    pub reward_reserve: i32,
}

impl CatalogManifest {
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw)
    }

    /// Parse and validate manifest text.
    pub fn parse(raw: &str) -> Result<Self, CatalogError> {
        let manifest: Self = toml::from_str(raw)?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        let invalid = |msg: String| -> Result<(), CatalogError> {
            Err(CatalogError::Invalid(msg))
        };

        let mut ids = HashSet::new();
        for card in &self.cards {
            if !ids.insert(card.id) {
                return invalid(format!("duplicate card id {}", card.id));
            }
            if card.name.trim().is_empty() {
                return invalid(format!("card {} has an empty name", card.id));
            }
            if let Some(max) = card.max_supply
                && max < 1
            {
                return invalid(format!("card {} max_supply must be >= 1", card.id));
            }
            if card.reward_reserve < 0 {
                return invalid(format!("card {} reward_reserve must be >= 0", card.id));
            }
            if let Some(max) = card.max_supply
                && card.reward_reserve > max
            {
                return invalid(format!(
                    "card {} reward_reserve exceeds max_supply",
                    card.id
                ));
            }
        }

        let mut names = HashSet::new();
        for pack in &self.packs {
            let name = pack.name.trim();
            if name.is_empty() {
                return invalid("pack with an empty name".into());
            }
            if !names.insert(name.to_string()) {
                return invalid(format!("duplicate pack name '{name}'"));
            }
            if pack.price < 0 {
                return invalid(format!("pack '{name}' price must be >= 0"));
            }
            let slots = [
                pack.common_slots,
                pack.rare_slots,
                pack.epic_slots,
                pack.wildcard_slots,
            ];
            if slots.iter().any(|&s| s < 0) {
                return invalid(format!("pack '{name}' has a negative slot count"));
            }
            if slots.iter().sum::<i32>() == 0 {
                return invalid(format!("pack '{name}' has no slots"));
            }
            let chances = [pack.legendary_chance, pack.mythic_chance];
            if chances.iter().any(|c| !(0.0..=100.0).contains(c)) {
                return invalid(format!("pack '{name}' chances must be within 0-100"));
            }
            if pack.legendary_chance + pack.mythic_chance > 100.0 {
                return invalid(format!(
                    "pack '{name}' legendary_chance + mythic_chance exceeds 100"
                ));
            }
        }

        Ok(())
    }

    /// Collectible cards with their NFT tier.
    fn collectible(&self) -> impl Iterator<Item = (&CardEntry, NftRarity)> {
        self.cards.iter().filter(|c| c.collectible).map(|c| {
            (
                c,
                NftRarity::from_game_rarity(c.rarity.as_deref(), &c.card_type),
            )
        })
    }

    /// Number of collectible cards per NFT tier.
    pub fn tier_counts(&self) -> HashMap<NftRarity, usize> {
        let mut counts = HashMap::new();
        for (_, rarity) in self.collectible() {
            *counts.entry(rarity).or_insert(0) += 1;
        }
        counts
    }

    /// Size every collectible card's supply.
    ///
    /// Identical manifests, targets and seeds always produce identical rows.
    pub fn supply_rows(&self, target: u64, seed: u64) -> Vec<SupplyRow> {
        let plan = SupplyPlan::new(target, seed, &self.tier_counts());

        self.collectible()
            .map(|(card, nft_rarity)| {
                let max_supply = card
                    .max_supply
                    .unwrap_or_else(|| plan.supply_for(card.id, nft_rarity));
                SupplyRow {
                    card_id: card.id,
                    card_name: card.name.trim().to_string(),
                    nft_rarity,
                    card_type: card.card_type.trim().to_lowercase(),
                    hero_class: card.hero_class.trim().to_lowercase(),
                    max_supply,
                    reward_reserve: card.reward_reserve.min(max_supply),
                }
            })
            .collect()
    }
}
