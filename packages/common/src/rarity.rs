#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scarcity tier of a collectible card.
///
/// This is the four-level NFT classification, distinct from the game's own
/// rarity labels (see [`NftRarity::from_game_rarity`]). When the `sea-orm`
/// feature is enabled, this enum can be used directly as an entity column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "lowercase")]
pub enum NftRarity {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "common"))]
    Common,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "rare"))]
    Rare,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "legendary"))]
    Legendary,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "mythic"))]
    Mythic,
}

impl NftRarity {
    /// All tiers, scarcest first.
    pub const ALL: &'static [NftRarity] = &[
        Self::Mythic,
        Self::Legendary,
        Self::Rare,
        Self::Common,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Rare => "rare",
            Self::Legendary => "legendary",
            Self::Mythic => "mythic",
        }
    }

    /// Display rank used for ordering listings, 1 = scarcest.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Mythic => 1,
            Self::Legendary => 2,
            Self::Rare => 3,
            Self::Common => 4,
        }
    }

    /// Map a game card's rarity label and type onto its NFT tier.
    ///
    /// Heroes and game-legendary cards are mythic, epic cards are legendary,
    /// rare stays rare, and everything else (common, basic, free, unknown)
    /// is common.
    pub fn from_game_rarity(rarity: Option<&str>, card_type: &str) -> Self {
        let rarity = rarity.unwrap_or("common").to_ascii_lowercase();
        if card_type.eq_ignore_ascii_case("hero") || rarity == "legendary" {
            return Self::Mythic;
        }
        match rarity.as_str() {
            "epic" => Self::Legendary,
            "rare" => Self::Rare,
            _ => Self::Common,
        }
    }
}

impl fmt::Display for NftRarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an invalid rarity string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid rarity '{invalid}'. Valid values: {expected}")]
pub struct ParseRarityError {
    invalid: String,
    expected: &'static str,
}

impl FromStr for NftRarity {
    type Err = ParseRarityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "common" => Ok(Self::Common),
            "rare" => Ok(Self::Rare),
            "legendary" => Ok(Self::Legendary),
            "mythic" => Ok(Self::Mythic),
            _ => Err(ParseRarityError {
                invalid: s.to_string(),
                expected: "common, rare, legendary, mythic",
            }),
        }
    }
}

/// Nominal rarity requested by a pack slot, before supply is consulted.
///
/// `Epic` has no NFT tier of its own; it resolves to the legendary tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SlotRarity {
    Common,
    Rare,
    Epic,
    Legendary,
    Mythic,
}

impl SlotRarity {
    /// Tiers to try, in order, when drawing a card for this slot.
    ///
    /// Scarcity fails upward toward rarer tiers, never down. The only
    /// downward step is mythic falling back to legendary.
    pub fn fallback_chain(&self) -> &'static [NftRarity] {
        use NftRarity::*;
        match self {
            Self::Common => &[Common, Rare, Legendary, Mythic],
            Self::Rare => &[Rare, Legendary, Mythic],
            Self::Epic => &[Legendary, Mythic],
            Self::Legendary => &[Legendary, Mythic],
            Self::Mythic => &[Mythic, Legendary],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Rare => "rare",
            Self::Epic => "epic",
            Self::Legendary => "legendary",
            Self::Mythic => "mythic",
        }
    }
}

impl fmt::Display for SlotRarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
