use common::{SlotLayout, WildcardOdds};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pack_types")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub price: i32,

    pub common_slots: i32,
    pub rare_slots: i32,
    pub epic_slots: i32,
    pub wildcard_slots: i32,
    /// Percent chances, only consulted for wildcard slots.
    pub legendary_chance: f64,
    pub mythic_chance: f64,

    /// Inactive packs are treated as nonexistent by every read path.
    pub is_active: bool,

    #[sea_orm(has_many)]
    pub openings: HasMany<super::pack_history::Entity>,

    pub created_at: DateTimeUtc,
}

impl Model {
    pub fn slot_layout(&self) -> SlotLayout {
        SlotLayout {
            common: self.common_slots.max(0) as u32,
            rare: self.rare_slots.max(0) as u32,
            epic: self.epic_slots.max(0) as u32,
            wildcard: self.wildcard_slots.max(0) as u32,
        }
    }

    pub fn wildcard_odds(&self) -> WildcardOdds {
        WildcardOdds::new(self.legendary_chance, self.mythic_chance)
    }
}

impl ActiveModelBehavior for ActiveModel {}
