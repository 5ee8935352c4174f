pub mod rarity;
pub mod slots;
pub mod supply;
pub mod wildcard;

pub use rarity::{NftRarity, ParseRarityError, SlotRarity};
pub use slots::{PackSlot, SlotKind, SlotLayout};
pub use supply::{SupplyPlan, SupplyRange};
pub use wildcard::WildcardOdds;
