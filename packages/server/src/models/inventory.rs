use chrono::{DateTime, Utc};
use common::NftRarity;
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

use super::shared::Pagination;
use crate::error::AppError;

pub const DEFAULT_PAGE_LIMIT: u64 = 50;
pub const MAX_PAGE_LIMIT: u64 = 100;

/// Query parameters for listing a user's inventory.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InventoryQuery {
    /// Page number (1-indexed).
    #[param(example = 1)]
    pub page: Option<i64>,
    /// Items per page (1-100, default 50).
    #[param(example = 50)]
    pub limit: Option<i64>,
    /// Filter by NFT rarity tier.
    #[param(example = "legendary")]
    pub rarity: Option<String>,
    /// Filter by card type.
    #[serde(rename = "type")]
    #[param(example = "minion")]
    pub card_type: Option<String>,
    /// Filter by hero class (case-insensitive).
    #[serde(rename = "heroClass")]
    #[param(example = "warrior")]
    pub hero_class: Option<String>,
}

/// Normalized inventory listing filter.
#[derive(Debug, PartialEq, Eq)]
pub struct InventoryFilter {
    pub page: u64,
    pub limit: u64,
    pub rarity: Option<NftRarity>,
    pub card_type: Option<String>,
    pub hero_class: Option<String>,
}

impl InventoryFilter {
    /// Rows to skip, saturating at the largest `OFFSET` Postgres accepts.
    pub fn offset(&self) -> i64 {
        (self.page - 1)
            .checked_mul(self.limit)
            .and_then(|offset| i64::try_from(offset).ok())
            .unwrap_or(i64::MAX)
    }
}

fn non_empty_lower(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}

impl TryFrom<InventoryQuery> for InventoryFilter {
    type Error = AppError;

    fn try_from(q: InventoryQuery) -> Result<Self, Self::Error> {
        let page = q.page.filter(|&p| p >= 1).unwrap_or(1) as u64;
        let limit = match q.limit {
            Some(l) if l >= 1 => (l as u64).min(MAX_PAGE_LIMIT),
            _ => DEFAULT_PAGE_LIMIT,
        };

        let rarity = non_empty_lower(q.rarity)
            .map(|r| r.parse::<NftRarity>())
            .transpose()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        Ok(Self {
            page,
            limit,
            rarity,
            card_type: non_empty_lower(q.card_type),
            hero_class: non_empty_lower(q.hero_class),
        })
    }
}

/// A holding joined with its card's supply row.
#[derive(Clone, Debug, Serialize, Deserialize, FromQueryResult, utoipa::ToSchema)]
pub struct InventoryItem {
    #[schema(example = 1042)]
    pub card_id: i32,
    #[schema(example = 2)]
    pub quantity: i32,
    /// Mint number of the first copy received.
    #[schema(example = 17)]
    pub mint_number: Option<i32>,
    pub acquired_at: DateTime<Utc>,
    #[schema(example = "Fenrir Unchained")]
    pub card_name: String,
    pub nft_rarity: NftRarity,
    #[schema(example = "minion")]
    pub card_type: String,
    #[schema(example = "hunter")]
    pub hero_class: String,
    pub max_supply: i32,
    pub remaining_supply: i32,
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct InventoryResponse {
    pub success: bool,
    pub inventory: Vec<InventoryItem>,
    pub pagination: Pagination,
}

#[derive(Debug, FromQueryResult)]
pub struct CountRow {
    pub total: i64,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollectionOverall {
    pub unique_cards: i64,
    pub total_cards: i64,
    /// Percent of all cards in the catalog owned at least once.
    #[schema(example = 12.5)]
    pub completion_percentage: f64,
}

#[derive(Debug, Serialize, Deserialize, FromQueryResult, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RarityBreakdown {
    pub rarity: NftRarity,
    pub unique_cards: i64,
    pub total_cards: i64,
}

#[derive(Debug, Serialize, Deserialize, FromQueryResult, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TypeBreakdown {
    #[serde(rename = "type")]
    pub card_type: String,
    pub unique_cards: i64,
    pub total_cards: i64,
}

#[derive(Debug, Serialize, Deserialize, FromQueryResult, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassBreakdown {
    #[serde(rename = "class")]
    pub hero_class: String,
    pub unique_cards: i64,
    pub total_cards: i64,
}

#[derive(Debug, Serialize, Deserialize, FromQueryResult, utoipa::ToSchema)]
pub struct RecentAcquisition {
    pub card_id: i32,
    pub card_name: String,
    pub nft_rarity: NftRarity,
    pub acquired_at: DateTime<Utc>,
}

#[derive(Debug, FromQueryResult)]
pub struct OwnershipTotals {
    pub unique_cards: i64,
    pub total_cards: i64,
    pub catalog_size: i64,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStats {
    pub overall: CollectionOverall,
    /// Scarcest tier first.
    pub by_rarity: Vec<RarityBreakdown>,
    pub by_type: Vec<TypeBreakdown>,
    /// Ordered by class name.
    pub by_class: Vec<ClassBreakdown>,
    /// The ten most recently acquired holdings.
    pub recent_acquisitions: Vec<RecentAcquisition>,
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct CollectionStatsResponse {
    pub success: bool,
    pub stats: CollectionStats,
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct InventoryCardResponse {
    pub success: bool,
    pub card: InventoryItem,
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct RemoveCardResponse {
    pub success: bool,
    /// Always `true`; a missing holding is reported as 404 instead.
    pub removed: bool,
}

/// Share of the catalog owned, as a percentage rounded to two decimals.
pub fn completion_percentage(owned: i64, catalog_size: i64) -> f64 {
    if catalog_size <= 0 {
        return 0.0;
    }
    let pct = owned as f64 / catalog_size as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}
