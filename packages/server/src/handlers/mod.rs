pub mod health;
pub mod inventory;
pub mod pack;

use common::NftRarity;

/// SQL `CASE` expression ranking `column` by NFT tier, scarcest first.
pub(crate) fn rarity_rank_sql(column: &str) -> String {
    let arms: String = NftRarity::ALL
        .iter()
        .map(|r| format!(" WHEN '{}' THEN {}", r.as_str(), r.rank()))
        .collect();
    format!("CASE {column}{arms} ELSE 99 END")
}
