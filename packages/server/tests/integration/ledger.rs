use std::time::Duration;

use common::NftRarity;
use pack_server::error::AppError;
use pack_server::ledger::SupplyLedger;
use pack_server::registry;
use sea_orm::TransactionTrait;

use crate::common::{PackSpec, TestApp};

fn one_common() -> PackSpec {
    PackSpec {
        common: 1,
        ..Default::default()
    }
}

#[tokio::test]
async fn unknown_card_reads_as_exhausted() {
    let app = TestApp::spawn().await;
    let ledger = SupplyLedger::new(&app.db);
    assert_eq!(ledger.remaining_supply(404).await.unwrap(), 0);
}

#[tokio::test]
async fn decrement_refuses_exhausted_card() {
    let app = TestApp::spawn().await;
    app.insert_card(1, NftRarity::Common, "minion", 3, 0).await;

    let txn = app.db.begin().await.unwrap();
    let ledger = SupplyLedger::new(&txn);
    let card = ledger.lock_card(1).await.unwrap().unwrap();
    assert!(ledger.decrement_supply(card).await.is_err());
    txn.rollback().await.unwrap();

    assert_eq!(app.remaining_supply(1).await, 0);
}

#[tokio::test]
async fn reserved_copies_are_not_drawable() {
    let app = TestApp::spawn().await;
    app.insert_card_full(1, NftRarity::Legendary, "weapon", "warrior", 10, 2, 2)
        .await;
    let ledger = SupplyLedger::new(&app.db);

    let drawn = ledger
        .lock_random_drawable(NftRarity::Legendary, None)
        .await
        .unwrap();
    assert!(drawn.is_none());

    app.execute("UPDATE card_supply SET remaining_supply = 3 WHERE card_id = 1")
        .await;
    let drawn = ledger
        .lock_random_drawable(NftRarity::Legendary, Some("weapon"))
        .await
        .unwrap();
    assert_eq!(drawn.map(|card| card.card_id), Some(1));
}

#[tokio::test]
async fn upsert_keeps_first_mint_number() {
    let app = TestApp::spawn().await;
    app.insert_card(1, NftRarity::Rare, "spell", 10, 10).await;
    let ledger = SupplyLedger::new(&app.db);

    ledger.upsert_inventory("erin", 1, 3).await.unwrap();
    ledger.upsert_inventory("erin", 1, 8).await.unwrap();

    let holding = app.holding("erin", 1).await.unwrap();
    assert_eq!(holding.quantity, 2);
    assert_eq!(holding.mint_number, Some(3));

    assert!(ledger.remove_inventory("erin", 1).await.unwrap());
    assert!(!ledger.remove_inventory("erin", 1).await.unwrap());
}

#[tokio::test]
async fn inactive_pack_type_is_not_found() {
    let app = TestApp::spawn().await;
    let active = app.insert_pack("On", 10, one_common()).await;
    let retired = app
        .insert_pack_with_status("Off", 10, one_common(), false)
        .await;

    let found = registry::find_active_pack_type(&app.db, active).await.unwrap();
    assert_eq!(found.name, "On");

    for id in [retired, 9999] {
        let err = registry::find_active_pack_type(&app.db, id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}

/// A pack open waiting on a card lock skips the card if the holder drains it.
#[tokio::test]
async fn draw_waits_for_card_lock() {
    let app = TestApp::spawn().await;
    app.insert_card(1, NftRarity::Common, "minion", 1, 1).await;
    let pack = app.insert_pack("Single", 10, one_common()).await;

    let txn = app.db.begin().await.unwrap();
    let card = SupplyLedger::new(&txn).lock_card(1).await.unwrap().unwrap();

    let holder = async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        SupplyLedger::new(&txn).decrement_supply(card).await.unwrap();
        txn.commit().await.unwrap();
    };
    let (res, ()) = tokio::join!(app.open_pack(pack, "frank"), holder);

    assert_eq!(res.body["totalPulled"], 0);
    assert_eq!(res.body["emptySlots"], serde_json::json!(["common"]));
    assert_eq!(app.remaining_supply(1).await, 0);
    assert!(app.holding("frank", 1).await.is_none());
}

/// Postgres aborts one side of a lock cycle; an aborted pack open starts over.
#[tokio::test]
async fn open_survives_deadlock_with_another_transaction() {
    let app = TestApp::spawn().await;
    app.insert_card(1, NftRarity::Common, "minion", 5, 5).await;
    app.insert_card(2, NftRarity::Common, "spell", 5, 5).await;
    // First slot prefers minions, second prefers spells.
    let pack = app
        .insert_pack("Pair", 10, PackSpec {
            common: 2,
            ..Default::default()
        })
        .await;

    let txn = app.db.begin().await.unwrap();
    SupplyLedger::new(&txn).lock_card(2).await.unwrap().unwrap();

    let holder = async move {
        // By now the open holds card 1 and waits on card 2.
        tokio::time::sleep(Duration::from_millis(300)).await;
        let _ = SupplyLedger::new(&txn).lock_card(1).await;
        let _ = txn.rollback().await;
    };
    let (res, ()) = tokio::join!(app.open_pack(pack, "grace"), holder);

    let mut ids = res.card_ids();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(app.remaining_supply(1).await, 4);
    assert_eq!(app.remaining_supply(2).await, 4);
    assert_eq!(app.count("pack_history").await, 1);
}
