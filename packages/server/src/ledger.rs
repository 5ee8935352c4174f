use chrono::Utc;
use common::NftRarity;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{LockType, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, Order, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::entity::{card_supply, user_inventory};

/// Reads and writes against the card supply ledger and user holdings.
///
/// Locking methods only make sense on a transaction; on a plain connection
/// the lock is released as soon as the statement finishes.
pub struct SupplyLedger<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> SupplyLedger<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Remaining mintable copies. Unknown cards read as exhausted.
    pub async fn remaining_supply(&self, card_id: i32) -> Result<i32, DbErr> {
        Ok(card_supply::Entity::find_by_id(card_id)
            .one(self.conn)
            .await?
            .map(|card| card.remaining_supply)
            .unwrap_or(0))
    }

    /// `SELECT … FOR UPDATE` on a single card row.
    pub async fn lock_card(&self, card_id: i32) -> Result<Option<card_supply::Model>, DbErr> {
        card_supply::Entity::find_by_id(card_id)
            .lock(LockType::Update)
            .one(self.conn)
            .await
    }

    /// Lock one random card of `rarity` that packs may still draw,
    /// optionally restricted to a card type.
    ///
    /// A row another transaction drained while we waited on its lock is
    /// re-checked by Postgres and skipped, so this can return `None` even
    /// though a candidate existed when the statement started.
    pub async fn lock_random_drawable(
        &self,
        rarity: NftRarity,
        card_type: Option<&str>,
    ) -> Result<Option<card_supply::Model>, DbErr> {
        let mut select = card_supply::Entity::find()
            .filter(card_supply::Column::NftRarity.eq(rarity))
            .filter(card_supply::drawable());

        if let Some(card_type) = card_type {
            select = select.filter(card_supply::Column::CardType.eq(card_type));
        }

        select
            .order_by(Expr::cust("RANDOM()"), Order::Asc)
            .limit(1)
            .lock(LockType::Update)
            .one(self.conn)
            .await
    }

    /// Take one copy of a card previously locked with stock left.
    ///
    /// Returns the row as it reads after the decrement.
    pub async fn decrement_supply(
        &self,
        card: card_supply::Model,
    ) -> Result<card_supply::Model, DbErr> {
        if card.remaining_supply <= 0 {
            return Err(DbErr::Custom(format!(
                "card {} has no remaining supply",
                card.card_id
            )));
        }

        let remaining = card.remaining_supply - 1;
        let mut active: card_supply::ActiveModel = card.into();
        active.remaining_supply = Set(remaining);
        active.update(self.conn).await
    }

    /// Add one copy to a user's holdings.
    ///
    /// New rows record `mint_number`; an existing row only has its quantity
    /// bumped and keeps its first mint number and acquisition time.
    pub async fn upsert_inventory(
        &self,
        user_id: &str,
        card_id: i32,
        mint_number: i32,
    ) -> Result<(), DbErr> {
        let model = user_inventory::ActiveModel {
            user_id: Set(user_id.to_string()),
            card_id: Set(card_id),
            quantity: Set(1),
            mint_number: Set(Some(mint_number)),
            acquired_at: Set(Utc::now()),
            ..Default::default()
        };

        user_inventory::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    user_inventory::Column::UserId,
                    user_inventory::Column::CardId,
                ])
                .value(
                    user_inventory::Column::Quantity,
                    Expr::cust("user_inventory.quantity + 1"),
                )
                .to_owned(),
            )
            .exec_without_returning(self.conn)
            .await?;

        Ok(())
    }

    /// Delete a holding outright. Minted copies are not returned to supply.
    pub async fn remove_inventory(&self, user_id: &str, card_id: i32) -> Result<bool, DbErr> {
        let result = user_inventory::Entity::delete_by_id((user_id.to_string(), card_id))
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
