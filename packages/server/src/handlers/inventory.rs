use axum::Json;
use axum::extract::{Path, State};
use sea_orm::{DbBackend, FromQueryResult, Statement, Value};
use tracing::{info, instrument};

use super::rarity_rank_sql;
use crate::error::{AppError, ErrorBody};
use crate::extractors::query::AppQuery;
use crate::ledger::SupplyLedger;
use crate::models::inventory::*;
use crate::models::shared::{Pagination, normalize_user_id};
use crate::state::AppState;

const RECENT_LIMIT: i64 = 10;
const CARD_NOT_IN_INVENTORY: &str = "Card not found in inventory";

const INVENTORY_COLUMNS: &str = r#"
    ui.card_id,
    ui.quantity,
    ui.mint_number,
    ui.acquired_at,
    cs.card_name,
    cs.nft_rarity,
    cs.card_type,
    cs.hero_class,
    cs.max_supply,
    cs.remaining_supply
"#;

/// Build the `WHERE` clause and bind values for an inventory listing.
fn inventory_where(user_id: &str, filter: &InventoryFilter) -> (String, Vec<Value>) {
    let mut clause = String::from("WHERE ui.user_id = $1");
    let mut values: Vec<Value> = vec![user_id.into()];

    if let Some(rarity) = filter.rarity {
        values.push(rarity.as_str().into());
        clause.push_str(&format!(" AND cs.nft_rarity = ${}", values.len()));
    }
    if let Some(card_type) = &filter.card_type {
        values.push(card_type.as_str().into());
        clause.push_str(&format!(" AND cs.card_type = ${}", values.len()));
    }
    if let Some(hero_class) = &filter.hero_class {
        values.push(hero_class.as_str().into());
        clause.push_str(&format!(" AND LOWER(cs.hero_class) = ${}", values.len()));
    }

    (clause, values)
}

#[utoipa::path(
    get,
    path = "/{user_id}",
    tag = "Inventory",
    operation_id = "listInventory",
    summary = "List a user's cards",
    description = "Returns the user's holdings joined with card data, scarcest tier first then by card name. \
                   `limit` is capped at 100.",
    params(
        ("user_id" = String, Path, description = "User identifier"),
        InventoryQuery,
    ),
    responses(
        (status = 200, description = "Paginated inventory", body = InventoryResponse),
        (status = 400, description = "Invalid filter (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_inventory(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    AppQuery(query): AppQuery<InventoryQuery>,
) -> Result<Json<InventoryResponse>, AppError> {
    let user_id = normalize_user_id(&user_id)?;
    let filter = InventoryFilter::try_from(query)?;
    let (where_clause, values) = inventory_where(&user_id, &filter);

    let total = CountRow::find_by_statement(Statement::from_sql_and_values(
        DbBackend::Postgres,
        format!(
            "SELECT COUNT(*)::BIGINT AS total \
             FROM user_inventory ui JOIN card_supply cs ON ui.card_id = cs.card_id \
             {where_clause}"
        ),
        values.clone(),
    ))
    .one(&state.db)
    .await?
    .map(|row| row.total)
    .unwrap_or(0);

    let mut page_values = values;
    page_values.push((filter.limit as i64).into());
    page_values.push(filter.offset().into());
    let limit_idx = page_values.len() - 1;
    let offset_idx = page_values.len();

    let inventory = InventoryItem::find_by_statement(Statement::from_sql_and_values(
        DbBackend::Postgres,
        format!(
            "SELECT {INVENTORY_COLUMNS} \
             FROM user_inventory ui JOIN card_supply cs ON ui.card_id = cs.card_id \
             {where_clause} \
             ORDER BY {}, cs.card_name ASC, cs.card_id ASC \
             LIMIT ${limit_idx} OFFSET ${offset_idx}",
            rarity_rank_sql("cs.nft_rarity")
        ),
        page_values,
    ))
    .all(&state.db)
    .await?;

    Ok(Json(InventoryResponse {
        success: true,
        inventory,
        pagination: Pagination::new(filter.page, filter.limit, total.max(0) as u64),
    }))
}

#[utoipa::path(
    get,
    path = "/{user_id}/stats",
    tag = "Inventory",
    operation_id = "getCollectionStats",
    summary = "Collection statistics",
    description = "Returns ownership totals, catalog completion, breakdowns by rarity, type and class, and the ten most recent acquisitions.",
    params(("user_id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Collection statistics", body = CollectionStatsResponse),
        (status = 400, description = "Invalid user id (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_collection_stats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<CollectionStatsResponse>, AppError> {
    let user_id = normalize_user_id(&user_id)?;
    let db = &state.db;
    let stmt = |sql: String, values: Vec<Value>| {
        Statement::from_sql_and_values(DbBackend::Postgres, sql, values)
    };

    let totals = OwnershipTotals::find_by_statement(stmt(
        r#"
        SELECT
            COUNT(DISTINCT ui.card_id)::BIGINT AS unique_cards,
            COALESCE(SUM(ui.quantity), 0)::BIGINT AS total_cards,
            (SELECT COUNT(*) FROM card_supply)::BIGINT AS catalog_size
        FROM user_inventory ui
        WHERE ui.user_id = $1
        "#
        .into(),
        vec![user_id.as_str().into()],
    ))
    .one(db)
    .await?
    .ok_or_else(|| AppError::Internal("ownership aggregate returned no row".into()))?;

    let group_columns = "COUNT(DISTINCT ui.card_id)::BIGINT AS unique_cards, \
                         COALESCE(SUM(ui.quantity), 0)::BIGINT AS total_cards";
    let joined = "FROM user_inventory ui JOIN card_supply cs ON ui.card_id = cs.card_id \
                  WHERE ui.user_id = $1";

    let by_rarity = RarityBreakdown::find_by_statement(stmt(
        format!(
            "SELECT cs.nft_rarity AS rarity, {group_columns} {joined} \
             GROUP BY cs.nft_rarity ORDER BY {}",
            rarity_rank_sql("cs.nft_rarity")
        ),
        vec![user_id.as_str().into()],
    ))
    .all(db)
    .await?;

    let by_type = TypeBreakdown::find_by_statement(stmt(
        format!(
            "SELECT cs.card_type, {group_columns} {joined} \
             GROUP BY cs.card_type ORDER BY cs.card_type"
        ),
        vec![user_id.as_str().into()],
    ))
    .all(db)
    .await?;

    let by_class = ClassBreakdown::find_by_statement(stmt(
        format!(
            "SELECT cs.hero_class, {group_columns} {joined} \
             GROUP BY cs.hero_class ORDER BY cs.hero_class"
        ),
        vec![user_id.as_str().into()],
    ))
    .all(db)
    .await?;

    let recent_acquisitions = RecentAcquisition::find_by_statement(stmt(
        format!(
            "SELECT ui.card_id, cs.card_name, cs.nft_rarity, ui.acquired_at {joined} \
             ORDER BY ui.acquired_at DESC, ui.card_id DESC LIMIT $2"
        ),
        vec![user_id.as_str().into(), RECENT_LIMIT.into()],
    ))
    .all(db)
    .await?;

    Ok(Json(CollectionStatsResponse {
        success: true,
        stats: CollectionStats {
            overall: CollectionOverall {
                unique_cards: totals.unique_cards,
                total_cards: totals.total_cards,
                completion_percentage: completion_percentage(
                    totals.unique_cards,
                    totals.catalog_size,
                ),
            },
            by_rarity,
            by_type,
            by_class,
            recent_acquisitions,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/{user_id}/card/{card_id}",
    tag = "Inventory",
    operation_id = "getInventoryCard",
    summary = "One card in a user's inventory",
    params(
        ("user_id" = String, Path, description = "User identifier"),
        ("card_id" = i32, Path, description = "Card ID"),
    ),
    responses(
        (status = 200, description = "Holding details", body = InventoryCardResponse),
        (status = 404, description = "User does not own this card (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_inventory_card(
    State(state): State<AppState>,
    Path((user_id, card_id)): Path<(String, i32)>,
) -> Result<Json<InventoryCardResponse>, AppError> {
    let user_id = normalize_user_id(&user_id)?;

    let card = InventoryItem::find_by_statement(Statement::from_sql_and_values(
        DbBackend::Postgres,
        format!(
            "SELECT {INVENTORY_COLUMNS} \
             FROM user_inventory ui JOIN card_supply cs ON ui.card_id = cs.card_id \
             WHERE ui.user_id = $1 AND ui.card_id = $2"
        ),
        [user_id.into(), card_id.into()],
    ))
    .one(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(CARD_NOT_IN_INVENTORY.into()))?;

    Ok(Json(InventoryCardResponse {
        success: true,
        card,
    }))
}

#[utoipa::path(
    delete,
    path = "/{user_id}/card/{card_id}",
    tag = "Inventory",
    operation_id = "removeInventoryCard",
    summary = "Remove a card from a user's inventory",
    description = "Administrative removal of a whole holding. Minted copies are not returned to supply.",
    params(
        ("user_id" = String, Path, description = "User identifier"),
        ("card_id" = i32, Path, description = "Card ID"),
    ),
    responses(
        (status = 200, description = "Holding removed", body = RemoveCardResponse),
        (status = 404, description = "User does not own this card (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn remove_inventory_card(
    State(state): State<AppState>,
    Path((user_id, card_id)): Path<(String, i32)>,
) -> Result<Json<RemoveCardResponse>, AppError> {
    let user_id = normalize_user_id(&user_id)?;

    let removed = SupplyLedger::new(&state.db)
        .remove_inventory(&user_id, card_id)
        .await?;
    if !removed {
        return Err(AppError::NotFound(CARD_NOT_IN_INVENTORY.into()));
    }

    info!(user_id = %user_id, card_id, "Inventory holding removed");
    Ok(Json(RemoveCardResponse {
        success: true,
        removed,
    }))
}
