use common::NftRarity;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::ExprTrait;
use serde::{Deserialize, Serialize};

/// One row per collectible card: how many copies may ever exist and how many
/// are still mintable.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "card_supply")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub card_id: i32,

    pub card_name: String,
    pub nft_rarity: NftRarity,
    pub card_type: String, // minion, spell, hero, weapon
    pub hero_class: String,

    pub max_supply: i32,
    /// Always within `0..=max_supply`.
    pub remaining_supply: i32,
    /// Copies held back from packs for rewards.
    pub reward_reserve: i32,

    #[sea_orm(has_many)]
    pub holdings: HasMany<super::user_inventory::Entity>,
}

impl Model {
    /// Number of copies already minted.
    pub fn minted(&self) -> i32 {
        self.max_supply - self.remaining_supply
    }
}

/// Rows packs may still draw: stock above the reward reserve.
pub fn drawable() -> Expr {
    Expr::col(Column::RemainingSupply).gt(Expr::col(Column::RewardReserve))
}

impl ActiveModelBehavior for ActiveModel {}
