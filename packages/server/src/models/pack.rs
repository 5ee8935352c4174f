use chrono::{DateTime, Utc};
use common::{NftRarity, SlotRarity};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

use super::shared::normalize_user_id;
use crate::allocation::{DrawnCard, PackOpening};
use crate::entity::pack_type;
use crate::error::AppError;

const OPEN_REQUIRED: &str = "packTypeId and userId are required";

/// An identifier that clients may send either as a JSON number or a string.
#[derive(Clone, Debug, Deserialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum IdInput {
    Number(i64),
    Text(String),
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenPackRequest {
    #[schema(value_type = Option<i64>, example = 1)]
    pub pack_type_id: Option<IdInput>,
    #[schema(value_type = Option<String>, example = "player-42")]
    pub user_id: Option<IdInput>,
}

/// A validated open request.
#[derive(Debug, PartialEq, Eq)]
pub struct OpenPackCommand {
    pub pack_type_id: i32,
    pub user_id: String,
}

impl OpenPackRequest {
    /// Reject missing or empty fields before any database work.
    ///
    /// Zero and negative pack ids count as missing. Ids beyond the column
    /// range cannot exist and are reported as not found.
    pub fn validate(self) -> Result<OpenPackCommand, AppError> {
        let required = || AppError::Validation(OPEN_REQUIRED.into());

        let pack_type_id = match self.pack_type_id.ok_or_else(required)? {
            IdInput::Number(n) => n,
            IdInput::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return Err(required());
                }
                s.parse::<i64>().map_err(|_| {
                    AppError::Validation("packTypeId must be an integer".into())
                })?
            }
        };
        if pack_type_id <= 0 {
            return Err(required());
        }
        let pack_type_id = i32::try_from(pack_type_id)
            .map_err(|_| AppError::NotFound("Pack type not found or inactive".into()))?;

        let user_id = match self.user_id.ok_or_else(required)? {
            IdInput::Number(n) => n.to_string(),
            IdInput::Text(s) if s.trim().is_empty() => return Err(required()),
            IdInput::Text(s) => s,
        };
        let user_id = normalize_user_id(&user_id)?;

        Ok(OpenPackCommand {
            pack_type_id,
            user_id,
        })
    }
}

/// A card pulled from a pack, as shown to the buyer.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenedCard {
    #[schema(example = 1042)]
    pub card_id: i32,
    #[schema(example = "Odin, Allfather")]
    pub card_name: String,
    pub nft_rarity: NftRarity,
    #[schema(example = "hero")]
    pub card_type: String,
    #[schema(example = "neutral")]
    pub hero_class: String,
    /// Copies left after this pull.
    #[schema(example = 149)]
    pub remaining_supply: i32,
    #[schema(example = 150)]
    pub max_supply: i32,
    /// Serial number of this particular copy.
    #[schema(example = 1)]
    pub mint_number: i32,
}

impl From<&DrawnCard> for OpenedCard {
    fn from(drawn: &DrawnCard) -> Self {
        Self {
            card_id: drawn.card.card_id,
            card_name: drawn.card.card_name.clone(),
            nft_rarity: drawn.card.nft_rarity,
            card_type: drawn.card.card_type.clone(),
            hero_class: drawn.card.hero_class.clone(),
            remaining_supply: drawn.card.remaining_supply,
            max_supply: drawn.card.max_supply,
            mint_number: drawn.mint_number,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenPackResponse {
    #[schema(example = true)]
    pub success: bool,
    /// Name of the opened pack type.
    #[schema(example = "Mega Pack")]
    pub pack_type: String,
    pub cards: Vec<OpenedCard>,
    #[schema(example = 15)]
    pub total_pulled: u32,
    /// Nominal card count of the pack type.
    #[schema(example = 15)]
    pub expected_count: u32,
    /// Nominal rarity of each slot that could not be filled.
    pub empty_slots: Vec<SlotRarity>,
}

impl From<PackOpening> for OpenPackResponse {
    fn from(opening: PackOpening) -> Self {
        let cards: Vec<OpenedCard> = opening.cards.iter().map(OpenedCard::from).collect();
        Self {
            success: true,
            total_pulled: cards.len() as u32,
            expected_count: opening.expected_count(),
            pack_type: opening.pack.name,
            cards,
            empty_slots: opening.empty_slots,
        }
    }
}

/// A purchasable pack type.
#[derive(Clone, Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PackTypeItem {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Standard Pack")]
    pub name: String,
    pub description: String,
    #[schema(example = 100)]
    pub price: i32,
    pub common_slots: i32,
    pub rare_slots: i32,
    pub epic_slots: i32,
    pub wildcard_slots: i32,
    /// Percent chance that a wildcard slot rolls legendary.
    #[schema(example = 15.0)]
    pub legendary_chance: f64,
    /// Percent chance that a wildcard slot rolls mythic.
    #[schema(example = 5.0)]
    pub mythic_chance: f64,
    pub is_active: bool,
    /// Nominal number of cards in one pack.
    #[schema(example = 5)]
    pub card_count: u32,
    pub created_at: DateTime<Utc>,
}

impl From<pack_type::Model> for PackTypeItem {
    fn from(m: pack_type::Model) -> Self {
        Self {
            card_count: m.slot_layout().card_count(),
            id: m.id,
            name: m.name,
            description: m.description,
            price: m.price,
            common_slots: m.common_slots,
            rare_slots: m.rare_slots,
            epic_slots: m.epic_slots,
            wildcard_slots: m.wildcard_slots,
            legendary_chance: m.legendary_chance,
            mythic_chance: m.mythic_chance,
            is_active: m.is_active,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct PackTypesResponse {
    pub success: bool,
    pub packs: Vec<PackTypeItem>,
}

/// Supply totals over the whole ledger.
#[derive(Clone, Debug, Serialize, Deserialize, FromQueryResult, utoipa::ToSchema)]
pub struct SupplyOverall {
    pub total_cards: i64,
    pub total_max_supply: i64,
    pub total_remaining_supply: i64,
    pub total_reward_reserve: i64,
    /// Copies packs may ever mint (`max_supply - reward_reserve`).
    pub total_pack_supply: i64,
    /// Copies packs may still mint.
    pub total_pack_remaining: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, FromQueryResult, utoipa::ToSchema)]
pub struct RaritySupplyRow {
    pub nft_rarity: NftRarity,
    pub card_count: i64,
    pub max_supply: i64,
    pub remaining_supply: i64,
    pub reward_reserve: i64,
    pub pack_supply: i64,
    pub pack_remaining: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, FromQueryResult, utoipa::ToSchema)]
pub struct TypeSupplyRow {
    pub card_type: String,
    pub card_count: i64,
    pub max_supply: i64,
    pub remaining_supply: i64,
    pub reward_reserve: i64,
    pub pack_supply: i64,
    pub pack_remaining: i64,
}

/// Cached body of the supply stats endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplyStats {
    pub overall: SupplyOverall,
    /// Scarcest tier first.
    pub by_rarity: Vec<RaritySupplyRow>,
    pub by_type: Vec<TypeSupplyRow>,
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct SupplyStatsResponse {
    pub success: bool,
    #[serde(flatten)]
    pub stats: SupplyStats,
}

/// Raw `pack_history` row joined with its pack name.
#[derive(Debug, FromQueryResult)]
pub struct PackHistoryRow {
    pub id: i32,
    pub user_id: String,
    pub pack_type_id: i32,
    pub pack_name: String,
    pub cards_received: serde_json::Value,
    pub opened_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PackHistoryItem {
    pub id: i32,
    pub user_id: String,
    pub pack_type_id: i32,
    #[schema(example = "Standard Pack")]
    pub pack_name: String,
    /// Card ids received, in slot order.
    pub cards_received: Vec<i32>,
    pub opened_at: DateTime<Utc>,
}

impl TryFrom<PackHistoryRow> for PackHistoryItem {
    type Error = AppError;

    fn try_from(row: PackHistoryRow) -> Result<Self, Self::Error> {
        let cards_received: Vec<i32> = serde_json::from_value(row.cards_received)
            .map_err(|e| AppError::Internal(format!("pack_history {}: {e}", row.id)))?;
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            pack_type_id: row.pack_type_id,
            pack_name: row.pack_name,
            cards_received,
            opened_at: row.opened_at,
        })
    }
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct PackHistoryResponse {
    pub success: bool,
    pub history: Vec<PackHistoryItem>,
}
