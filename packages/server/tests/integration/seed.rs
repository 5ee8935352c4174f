use common::NftRarity;
use pack_server::catalog::CatalogManifest;
use pack_server::entity::{card_supply, pack_type};
use pack_server::seed::seed_catalog;
use sea_orm::{EntityTrait, QueryOrder};

use crate::common::{TestApp, routes};

const TARGET: u64 = 10_000;
const SEED: u64 = 42;

const MANIFEST: &str = r#"
    [[cards]]
    id = 1
    name = "Shieldmaiden"
    rarity = "common"
    class = "Warrior"

    [[cards]]
    id = 2
    name = "Frost Giant"
    rarity = "rare"

    [[cards]]
    id = 3
    name = "Sleipnir"
    rarity = "legendary"
    class = "Hunter"

    [[cards]]
    id = 4
    name = "Odin Allfather"
    type = "hero"

    [[cards]]
    id = 5
    name = "Huginn"
    collectible = false

    [[cards]]
    id = 6
    name = "Gungnir"
    type = "weapon"
    rarity = "epic"
    max_supply = 40
    reward_reserve = 5

    [[packs]]
    name = "Standard Pack"
    description = "Four cards"
    price = 100
    common_slots = 3
    wildcard_slots = 1
    legendary_chance = 15.0
    mythic_chance = 5.0
"#;

async fn supply_rows(app: &TestApp) -> Vec<card_supply::Model> {
    card_supply::Entity::find()
        .order_by_asc(card_supply::Column::CardId)
        .all(&app.db)
        .await
        .expect("DB query failed")
}

/// `(card_id, max_supply, remaining_supply, reward_reserve)` per card.
async fn supply_counters(app: &TestApp) -> Vec<(i32, i32, i32, i32)> {
    supply_rows(app)
        .await
        .into_iter()
        .map(|r| (r.card_id, r.max_supply, r.remaining_supply, r.reward_reserve))
        .collect()
}

#[tokio::test]
async fn seeds_collectible_cards_and_packs() {
    let app = TestApp::spawn().await;
    let manifest = CatalogManifest::parse(MANIFEST).unwrap();

    let report = seed_catalog(&app.db, &manifest, TARGET, SEED).await.unwrap();

    assert_eq!(report.cards, 5);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.packs, 1);

    let rows = supply_rows(&app).await;
    assert_eq!(
        rows.iter().map(|r| r.card_id).collect::<Vec<_>>(),
        vec![1, 2, 3, 4, 6]
    );
    assert!(rows.iter().all(|r| r.remaining_supply == r.max_supply));
    assert_eq!(report.total_supply, rows.iter().map(|r| i64::from(r.max_supply)).sum::<i64>());

    let odin = &rows[3];
    assert_eq!(odin.nft_rarity, NftRarity::Mythic);
    assert_eq!(odin.card_type, "hero");

    let gungnir = &rows[4];
    assert_eq!(gungnir.nft_rarity, NftRarity::Legendary);
    assert_eq!(gungnir.max_supply, 40);
    assert_eq!(gungnir.reward_reserve, 5);

    assert_eq!(rows[0].hero_class, "warrior");

    let res = app.get(routes::PACK_TYPES).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["packs"][0]["name"], "Standard Pack");
    assert_eq!(res.body["packs"][0]["card_count"], 4);
}

#[tokio::test]
async fn reseeding_is_idempotent() {
    let app = TestApp::spawn().await;
    let manifest = CatalogManifest::parse(MANIFEST).unwrap();

    seed_catalog(&app.db, &manifest, TARGET, SEED).await.unwrap();
    let first = supply_counters(&app).await;
    seed_catalog(&app.db, &manifest, TARGET, SEED).await.unwrap();
    let second = supply_counters(&app).await;

    assert_eq!(first, second);
    assert_eq!(app.count("card_supply").await, 5);
    assert_eq!(app.count("pack_types").await, 1);
}

#[tokio::test]
async fn reseeding_keeps_minted_copies() {
    let app = TestApp::spawn().await;
    let manifest = CatalogManifest::parse(MANIFEST).unwrap();
    seed_catalog(&app.db, &manifest, TARGET, SEED).await.unwrap();

    // Three copies of Gungnir already minted.
    app.execute("UPDATE card_supply SET remaining_supply = 37 WHERE card_id = 6")
        .await;

    let raised = MANIFEST.replace("max_supply = 40", "max_supply = 60");
    let manifest = CatalogManifest::parse(&raised).unwrap();
    seed_catalog(&app.db, &manifest, TARGET, SEED).await.unwrap();
    assert_eq!(app.remaining_supply(6).await, 57);

    let lowered = MANIFEST.replace("max_supply = 40", "max_supply = 2");
    let lowered = lowered.replace("reward_reserve = 5", "reward_reserve = 0");
    let manifest = CatalogManifest::parse(&lowered).unwrap();
    seed_catalog(&app.db, &manifest, TARGET, SEED).await.unwrap();
    assert_eq!(app.remaining_supply(6).await, 0);
}

#[tokio::test]
async fn pack_types_are_updated_by_name() {
    let app = TestApp::spawn().await;
    let manifest = CatalogManifest::parse(MANIFEST).unwrap();
    seed_catalog(&app.db, &manifest, TARGET, SEED).await.unwrap();
    let original = pack_type::Entity::find().one(&app.db).await.unwrap().unwrap();

    let repriced = MANIFEST
        .replace("price = 100", "price = 120")
        .replace("wildcard_slots = 1", "wildcard_slots = 1\n    is_active = false");
    let manifest = CatalogManifest::parse(&repriced).unwrap();
    seed_catalog(&app.db, &manifest, TARGET, SEED).await.unwrap();

    let packs = pack_type::Entity::find().all(&app.db).await.unwrap();
    assert_eq!(packs.len(), 1);
    assert_eq!(packs[0].id, original.id);
    assert_eq!(packs[0].price, 120);
    assert!(!packs[0].is_active);

    let res = app.get(routes::PACK_TYPES).await;
    assert_eq!(res.body["packs"], serde_json::json!([]));
}

#[tokio::test]
async fn seeded_catalog_can_be_opened() {
    let app = TestApp::spawn().await;
    let manifest = CatalogManifest::parse(MANIFEST).unwrap();
    seed_catalog(&app.db, &manifest, TARGET, SEED).await.unwrap();
    let pack = pack_type::Entity::find().one(&app.db).await.unwrap().unwrap();

    let res = app.open_pack(pack.id, "dave").await;

    assert_eq!(res.body["expectedCount"], 4);
    assert_eq!(res.body["totalPulled"], 4);
    assert!(res.card_ids().iter().all(|&id| id != 5));
}
