use std::time::Duration;

use axum::Json;
use axum::extract::{Path, State};
use sea_orm::{DbBackend, FromQueryResult, Statement};
use tracing::{info, instrument, warn};

use super::rarity_rank_sql;
use crate::allocation;
use crate::cache::{PACK_TYPES_KEY, SUPPLY_STATS_KEY};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::pack::*;
use crate::models::shared::normalize_user_id;
use crate::registry;
use crate::state::AppState;

const HISTORY_LIMIT: u64 = 50;

#[utoipa::path(
    get,
    path = "/types",
    tag = "Packs",
    operation_id = "listPackTypes",
    summary = "List purchasable pack types",
    description = "Returns every active pack type, cheapest first. Responses are cached in-process.",
    responses(
        (status = 200, description = "Active pack types", body = PackTypesResponse),
        (status = 500, description = "Database failure (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_pack_types(
    State(state): State<AppState>,
) -> Result<Json<PackTypesResponse>, AppError> {
    let ttl = Duration::from_secs(state.config.cache.pack_types_ttl_secs);
    let packs = state
        .cache
        .get_or_try_insert_with(PACK_TYPES_KEY, ttl, || async {
            let models = registry::list_active_pack_types(&state.db).await?;
            Ok::<_, AppError>(
                models
                    .into_iter()
                    .map(PackTypeItem::from)
                    .collect::<Vec<_>>(),
            )
        })
        .await?;

    Ok(Json(PackTypesResponse {
        success: true,
        packs,
    }))
}

const SUPPLY_OVERALL_SQL: &str = r#"
SELECT
    COUNT(*)::BIGINT AS total_cards,
    COALESCE(SUM(max_supply), 0)::BIGINT AS total_max_supply,
    COALESCE(SUM(remaining_supply), 0)::BIGINT AS total_remaining_supply,
    COALESCE(SUM(reward_reserve), 0)::BIGINT AS total_reward_reserve,
    COALESCE(SUM(max_supply - reward_reserve), 0)::BIGINT AS total_pack_supply,
    COALESCE(SUM(GREATEST(remaining_supply - reward_reserve, 0)), 0)::BIGINT AS total_pack_remaining
FROM card_supply
"#;

const SUPPLY_GROUP_COLUMNS: &str = r#"
    COUNT(*)::BIGINT AS card_count,
    COALESCE(SUM(max_supply), 0)::BIGINT AS max_supply,
    COALESCE(SUM(remaining_supply), 0)::BIGINT AS remaining_supply,
    COALESCE(SUM(reward_reserve), 0)::BIGINT AS reward_reserve,
    COALESCE(SUM(max_supply - reward_reserve), 0)::BIGINT AS pack_supply,
    COALESCE(SUM(GREATEST(remaining_supply - reward_reserve, 0)), 0)::BIGINT AS pack_remaining
"#;

async fn load_supply_stats(db: &sea_orm::DatabaseConnection) -> Result<SupplyStats, AppError> {
    let overall = SupplyOverall::find_by_statement(Statement::from_string(
        DbBackend::Postgres,
        SUPPLY_OVERALL_SQL,
    ))
    .one(db)
    .await?
    .ok_or_else(|| AppError::Internal("supply aggregate returned no row".into()))?;

    let by_rarity = RaritySupplyRow::find_by_statement(Statement::from_string(
        DbBackend::Postgres,
        format!(
            "SELECT nft_rarity,{SUPPLY_GROUP_COLUMNS} FROM card_supply \
             GROUP BY nft_rarity ORDER BY {}",
            rarity_rank_sql("nft_rarity")
        ),
    ))
    .all(db)
    .await?;

    let by_type = TypeSupplyRow::find_by_statement(Statement::from_string(
        DbBackend::Postgres,
        format!(
            "SELECT card_type,{SUPPLY_GROUP_COLUMNS} FROM card_supply \
             GROUP BY card_type ORDER BY card_type"
        ),
    ))
    .all(db)
    .await?;

    Ok(SupplyStats {
        overall,
        by_rarity,
        by_type,
    })
}

#[utoipa::path(
    get,
    path = "/supply-stats",
    tag = "Packs",
    operation_id = "getSupplyStats",
    summary = "Aggregate card supply",
    description = "Returns supply totals overall, per NFT rarity (scarcest first) and per card type. Cached briefly and invalidated after every pack open.",
    responses(
        (status = 200, description = "Supply statistics", body = SupplyStatsResponse),
        (status = 500, description = "Database failure (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_supply_stats(
    State(state): State<AppState>,
) -> Result<Json<SupplyStatsResponse>, AppError> {
    let ttl = Duration::from_secs(state.config.cache.supply_stats_ttl_secs);
    let stats = state
        .cache
        .get_or_try_insert_with(SUPPLY_STATS_KEY, ttl, || load_supply_stats(&state.db))
        .await?;

    Ok(Json(SupplyStatsResponse {
        success: true,
        stats,
    }))
}

#[utoipa::path(
    post,
    path = "/open",
    tag = "Packs",
    operation_id = "openPack",
    summary = "Open a pack",
    description = "Draws one card per slot of the pack type inside a single transaction, decrementing supply and crediting the user. \
                   Slots whose entire fallback chain is sold out stay empty; they are listed in `emptySlots` and the call still succeeds.",
    request_body = OpenPackRequest,
    responses(
        (status = 200, description = "Pack opened", body = OpenPackResponse),
        (status = 400, description = "Missing or malformed fields (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Pack type missing or inactive (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Transaction failed and was rolled back (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn open_pack(
    State(state): State<AppState>,
    AppJson(payload): AppJson<OpenPackRequest>,
) -> Result<Json<OpenPackResponse>, AppError> {
    let cmd = payload.validate()?;

    let opening = allocation::open_pack(&state.db, cmd.pack_type_id, &cmd.user_id).await?;
    state.cache.invalidate(SUPPLY_STATS_KEY);

    if opening.is_short() {
        warn!(
            user_id = %cmd.user_id,
            pack_type_id = cmd.pack_type_id,
            expected = opening.expected_count(),
            pulled = opening.cards.len(),
            "Pack under-delivered: supply exhausted for some slots"
        );
    }
    info!(
        user_id = %cmd.user_id,
        pack = %opening.pack.name,
        pulled = opening.cards.len(),
        "Pack opened"
    );

    Ok(Json(opening.into()))
}

#[utoipa::path(
    get,
    path = "/history/{user_id}",
    tag = "Packs",
    operation_id = "getPackHistory",
    summary = "Recent pack openings of a user",
    description = "Returns up to the 50 most recent openings, newest first.",
    params(("user_id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Opening history", body = PackHistoryResponse),
        (status = 400, description = "Invalid user id (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_pack_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<PackHistoryResponse>, AppError> {
    let user_id = normalize_user_id(&user_id)?;

    let rows = PackHistoryRow::find_by_statement(Statement::from_sql_and_values(
        DbBackend::Postgres,
        r#"
        SELECT ph.id, ph.user_id, ph.pack_type_id, pt.name AS pack_name,
               ph.cards_received, ph.opened_at
        FROM pack_history ph
        JOIN pack_types pt ON ph.pack_type_id = pt.id
        WHERE ph.user_id = $1
        ORDER BY ph.opened_at DESC, ph.id DESC
        LIMIT $2
        "#,
        [user_id.into(), (HISTORY_LIMIT as i64).into()],
    ))
    .all(&state.db)
    .await?;

    let history = rows
        .into_iter()
        .map(PackHistoryItem::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(PackHistoryResponse {
        success: true,
        history,
    }))
}
