use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only record of an opened pack.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pack_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: String,

    pub pack_type_id: i32,
    #[sea_orm(belongs_to, from = "pack_type_id", to = "id")]
    pub pack_type: HasOne<super::pack_type::Entity>,

    /// Card ids drawn, as a JSON array, in slot order.
    #[sea_orm(column_type = "JsonBinary")]
    pub cards_received: serde_json::Value,

    pub opened_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
