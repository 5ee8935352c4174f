use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ownership of one card by one user. The composite key guarantees a single
/// row per pair; repeat pulls bump `quantity`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_inventory")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub card_id: i32,
    #[sea_orm(belongs_to, from = "card_id", to = "card_id")]
    pub card: HasOne<super::card_supply::Entity>,

    pub quantity: i32,
    /// Serial number of the first copy this user received.
    pub mint_number: Option<i32>,

    pub acquired_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
