use std::collections::BTreeMap;

use chrono::Utc;
use common::NftRarity;
use sea_orm::sea_query::{Index, OnConflict, PostgresQueryBuilder};
use sea_orm::*;
use tracing::{info, warn};

use crate::catalog::{CatalogManifest, SupplyRow};
use crate::entity::{card_supply, pack_history, pack_type};

/// Rows per multi-row `INSERT`; keeps bind parameters well under the
/// Postgres limit.
const SUPPLY_BATCH: usize = 1000;

/// Summary of one seeding run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub cards: usize,
    pub skipped: usize,
    pub total_supply: i64,
    /// Per tier: card count and summed max supply.
    pub by_rarity: BTreeMap<u8, (NftRarity, usize, i64)>,
    pub packs: usize,
}

const UPSERT_SUPPLY_TAIL: &str = r#"
ON CONFLICT (card_id) DO UPDATE SET
    card_name = EXCLUDED.card_name,
    nft_rarity = EXCLUDED.nft_rarity,
    card_type = EXCLUDED.card_type,
    hero_class = EXCLUDED.hero_class,
    remaining_supply = GREATEST(
        EXCLUDED.max_supply - (card_supply.max_supply - card_supply.remaining_supply),
        0
    ),
    max_supply = EXCLUDED.max_supply,
    reward_reserve = EXCLUDED.reward_reserve
"#;

async fn upsert_supply_batch<C: ConnectionTrait>(db: &C, rows: &[SupplyRow]) -> Result<(), DbErr> {
    let mut placeholders = Vec::with_capacity(rows.len());
    let mut values: Vec<Value> = Vec::with_capacity(rows.len() * 8);

    for row in rows {
        let base = values.len();
        placeholders.push(format!(
            "(${}, ${}, ${}, ${}, ${}, ${}, ${}, ${})",
            base + 1,
            base + 2,
            base + 3,
            base + 4,
            base + 5,
            base + 6,
            base + 7,
            base + 8
        ));
        values.push(row.card_id.into());
        values.push(row.card_name.clone().into());
        values.push(row.nft_rarity.as_str().into());
        values.push(row.card_type.clone().into());
        values.push(row.hero_class.clone().into());
        values.push(row.max_supply.into());
        // Fresh rows start fully mintable.
        values.push(row.max_supply.into());
        values.push(row.reward_reserve.into());
    }

    let sql = format!(
        "INSERT INTO card_supply \
         (card_id, card_name, nft_rarity, card_type, hero_class, max_supply, remaining_supply, reward_reserve) \
         VALUES {} {UPSERT_SUPPLY_TAIL}",
        placeholders.join(", ")
    );

    db.execute_raw(Statement::from_sql_and_values(DbBackend::Postgres, sql, values))
        .await?;
    Ok(())
}

/// Load the manifest's cards and pack types into the database.
///
/// Existing cards keep their minted count: `remaining_supply` becomes
/// `max(new_max - minted, 0)`. Pack types are matched by name. Running twice
/// with the same input leaves the database unchanged.
pub async fn seed_catalog(
    db: &DatabaseConnection,
    manifest: &CatalogManifest,
    supply_target: u64,
    supply_seed: u64,
) -> Result<SeedReport, DbErr> {
    let rows = manifest.supply_rows(supply_target, supply_seed);
    let mut report = SeedReport {
        cards: rows.len(),
        skipped: manifest.cards.len() - rows.len(),
        packs: manifest.packs.len(),
        ..Default::default()
    };
    for row in &rows {
        report.total_supply += i64::from(row.max_supply);
        let tier = report
            .by_rarity
            .entry(row.nft_rarity.rank())
            .or_insert((row.nft_rarity, 0, 0));
        tier.1 += 1;
        tier.2 += i64::from(row.max_supply);
    }

    let txn = db.begin().await?;

    for batch in rows.chunks(SUPPLY_BATCH) {
        upsert_supply_batch(&txn, batch).await?;
    }

    let now = Utc::now();
    for pack in &manifest.packs {
        let model = pack_type::ActiveModel {
            name: Set(pack.name.trim().to_string()),
            description: Set(pack.description.clone()),
            price: Set(pack.price),
            common_slots: Set(pack.common_slots),
            rare_slots: Set(pack.rare_slots),
            epic_slots: Set(pack.epic_slots),
            wildcard_slots: Set(pack.wildcard_slots),
            legendary_chance: Set(pack.legendary_chance),
            mythic_chance: Set(pack.mythic_chance),
            is_active: Set(pack.is_active),
            created_at: Set(now),
            ..Default::default()
        };

        pack_type::Entity::insert(model)
            .on_conflict(
                OnConflict::column(pack_type::Column::Name)
                    .update_columns([
                        pack_type::Column::Description,
                        pack_type::Column::Price,
                        pack_type::Column::CommonSlots,
                        pack_type::Column::RareSlots,
                        pack_type::Column::EpicSlots,
                        pack_type::Column::WildcardSlots,
                        pack_type::Column::LegendaryChance,
                        pack_type::Column::MythicChance,
                        pack_type::Column::IsActive,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;
    }

    txn.commit().await?;

    info!(
        cards = report.cards,
        skipped = report.skipped,
        total_supply = report.total_supply,
        target = supply_target,
        packs = report.packs,
        "Catalog seeded"
    );
    for (rarity, count, supply) in report.by_rarity.values() {
        info!(rarity = %rarity, cards = count, supply = supply, "Tier supply");
    }

    Ok(report)
}

/// Ensure secondary indexes exist.
///
/// SeaORM's schema-sync doesn't create composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Pack draws: WHERE nft_rarity = ? AND card_type = ? AND remaining_supply > reward_reserve
    let draw_idx = Index::create()
        .if_not_exists()
        .name("idx_card_supply_rarity_type")
        .table(card_supply::Entity)
        .col(card_supply::Column::NftRarity)
        .col(card_supply::Column::CardType)
        .to_string(PostgresQueryBuilder);

    // History: WHERE user_id = ? ORDER BY opened_at DESC
    let history_idx = Index::create()
        .if_not_exists()
        .name("idx_pack_history_user_opened")
        .table(pack_history::Entity)
        .col(pack_history::Column::UserId)
        .col(pack_history::Column::OpenedAt)
        .to_string(PostgresQueryBuilder);

    for (name, stmt) in [
        ("idx_card_supply_rarity_type", draw_idx),
        ("idx_pack_history_user_opened", history_idx),
    ] {
        match db.execute_unprepared(&stmt).await {
            Ok(_) => info!("Ensured index {} exists", name),
            Err(e) => warn!("Failed to create index {}: {}", name, e),
        }
    }

    Ok(())
}

/// Install the `CHECK` constraint bounding supply counters.
///
/// Fails if existing rows already violate the bounds.
pub async fn ensure_constraints(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.execute_unprepared(
        r#"
        DO $$
        BEGIN
            IF NOT EXISTS (
                SELECT 1 FROM pg_constraint WHERE conname = 'card_supply_bounds'
            ) THEN
                ALTER TABLE card_supply ADD CONSTRAINT card_supply_bounds CHECK (
                    remaining_supply >= 0
                    AND remaining_supply <= max_supply
                    AND reward_reserve >= 0
                );
            END IF;
        END
        $$;
        "#,
    )
    .await?;

    info!("Ensured constraint card_supply_bounds exists");
    Ok(())
}
