pub mod card_supply;
pub mod pack_history;
pub mod pack_type;
pub mod user_inventory;
