//! Pack opening: one transaction that draws every slot, decrements supply,
//! credits the buyer and appends a history row.

use chrono::Utc;
use common::{PackSlot, SlotRarity};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, RuntimeErr,
    Set, TransactionTrait,
};
use tracing::{debug, warn};

use crate::entity::{card_supply, pack_history, pack_type};
use crate::error::AppError;
use crate::ledger::SupplyLedger;
use crate::registry;

/// A card pulled from a pack.
#[derive(Clone, Debug)]
pub struct DrawnCard {
    /// Supply row as it reads after this pull's decrement.
    pub card: card_supply::Model,
    /// Serial number of this copy, 1-based.
    pub mint_number: i32,
}

/// Outcome of a committed pack opening.
#[derive(Clone, Debug)]
pub struct PackOpening {
    pub pack: pack_type::Model,
    /// Pulled cards in slot order.
    pub cards: Vec<DrawnCard>,
    /// Nominal rarity of every slot whose whole fallback chain was sold out.
    pub empty_slots: Vec<SlotRarity>,
}

impl PackOpening {
    pub fn expected_count(&self) -> u32 {
        self.pack.slot_layout().card_count()
    }

    pub fn is_short(&self) -> bool {
        !self.empty_slots.is_empty()
    }
}

/// Draw a single card for `slot`, walking its fallback chain.
///
/// Within each tier the slot's preferred card type is tried before any type.
/// The first hit is decremented and returned; later tiers are not touched.
pub async fn draw_slot<C: ConnectionTrait>(
    ledger: &SupplyLedger<'_, C>,
    slot: &PackSlot,
) -> Result<Option<DrawnCard>, DbErr> {
    for &rarity in slot.rarity.fallback_chain() {
        let mut candidate = None;
        if let Some(preferred) = slot.preferred_type {
            candidate = ledger.lock_random_drawable(rarity, Some(preferred)).await?;
        }
        if candidate.is_none() {
            candidate = ledger.lock_random_drawable(rarity, None).await?;
        }

        if let Some(card) = candidate {
            let mint_number = card.minted() + 1;
            let card = ledger.decrement_supply(card).await?;
            if rarity != slot.rarity.fallback_chain()[0] {
                debug!(
                    requested = %slot.rarity,
                    drawn = %rarity,
                    card_id = card.card_id,
                    "Slot fell back to another tier"
                );
            }
            return Ok(Some(DrawnCard { card, mint_number }));
        }
    }

    Ok(None)
}

/// Attempts per pack open when Postgres aborts the transaction to break a
/// lock cycle with another open.
const MAX_ATTEMPTS: u32 = 3;

/// SQLSTATE `40P01` (deadlock_detected) or `40001` (serialization_failure).
fn is_lock_conflict(err: &DbErr) -> bool {
    let (DbErr::Exec(RuntimeErr::SqlxError(e)) | DbErr::Query(RuntimeErr::SqlxError(e))) = err
    else {
        return false;
    };
    let sea_orm::sqlx::Error::Database(db_err) = &**e else {
        return false;
    };
    matches!(db_err.code().as_deref(), Some("40P01" | "40001"))
}

/// Open one pack of `pack_type_id` for `user_id`.
///
/// Everything happens inside a single transaction: any failure rolls back all
/// supply decrements, inventory changes and the history row. Draws lock
/// random rows, so two opens can deadlock; the aborted one is retried from
/// scratch a bounded number of times.
pub async fn open_pack(
    db: &DatabaseConnection,
    pack_type_id: i32,
    user_id: &str,
) -> Result<PackOpening, AppError> {
    let mut attempt = 1;
    loop {
        match try_open_pack(db, pack_type_id, user_id).await {
            Ok(Some(opening)) => return Ok(opening),
            Ok(None) => return Err(AppError::NotFound(registry::PACK_NOT_FOUND.into())),
            Err(e) if attempt < MAX_ATTEMPTS && is_lock_conflict(&e) => {
                warn!(attempt, pack_type_id, error = %e, "Pack open hit a lock conflict; retrying");
                attempt += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// One transaction. `Ok(None)` when the pack type is missing or inactive.
async fn try_open_pack(
    db: &DatabaseConnection,
    pack_type_id: i32,
    user_id: &str,
) -> Result<Option<PackOpening>, DbErr> {
    let txn = db.begin().await?;

    let result = match registry::lock_active_pack_type(&txn, pack_type_id).await {
        Ok(Some(pack)) => allocate(&txn, pack, user_id).await.map(Some),
        Ok(None) => Ok(None),
        Err(e) => Err(e),
    };

    match result {
        Ok(Some(opening)) => {
            txn.commit().await?;
            Ok(Some(opening))
        }
        Ok(None) => {
            txn.rollback().await?;
            Ok(None)
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                warn!(error = %rollback_err, "Rollback after failed pack open also failed");
            }
            Err(e)
        }
    }
}

async fn allocate(
    txn: &DatabaseTransaction,
    pack: pack_type::Model,
    user_id: &str,
) -> Result<PackOpening, DbErr> {
    let slots = {
        let mut rng = rand::rng();
        pack.slot_layout().plan(pack.wildcard_odds(), &mut rng)
    };

    let ledger = SupplyLedger::new(txn);
    let mut cards = Vec::with_capacity(slots.len());
    let mut empty_slots = Vec::new();

    for slot in &slots {
        match draw_slot(&ledger, slot).await? {
            Some(drawn) => cards.push(drawn),
            None => empty_slots.push(slot.rarity),
        }
    }

    for drawn in &cards {
        ledger
            .upsert_inventory(user_id, drawn.card.card_id, drawn.mint_number)
            .await?;
    }

    let card_ids: Vec<i32> = cards.iter().map(|drawn| drawn.card.card_id).collect();
    pack_history::ActiveModel {
        user_id: Set(user_id.to_string()),
        pack_type_id: Set(pack.id),
        cards_received: Set(serde_json::json!(card_ids)),
        opened_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    Ok(PackOpening {
        pack,
        cards,
        empty_slots,
    })
}
