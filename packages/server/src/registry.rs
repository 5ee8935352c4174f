use sea_orm::sea_query::LockType;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseTransaction, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

use crate::entity::pack_type;
use crate::error::AppError;

pub const PACK_NOT_FOUND: &str = "Pack type not found or inactive";

/// Look up a purchasable pack type. Inactive packs are reported exactly like
/// missing ones.
pub async fn find_active_pack_type<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<pack_type::Model, AppError> {
    pack_type::Entity::find_by_id(id)
        .filter(pack_type::Column::IsActive.eq(true))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(PACK_NOT_FOUND.into()))
}

/// Like [`find_active_pack_type`], holding the row lock until the
/// transaction ends. Concurrent opens of the same pack type queue here.
///
/// Returns `None` for missing and inactive pack types alike.
pub async fn lock_active_pack_type(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<Option<pack_type::Model>, DbErr> {
    pack_type::Entity::find_by_id(id)
        .filter(pack_type::Column::IsActive.eq(true))
        .lock(LockType::Update)
        .one(txn)
        .await
}

/// All purchasable pack types, cheapest first.
pub async fn list_active_pack_types<C: ConnectionTrait>(
    db: &C,
) -> Result<Vec<pack_type::Model>, AppError> {
    Ok(pack_type::Entity::find()
        .filter(pack_type::Column::IsActive.eq(true))
        .order_by_asc(pack_type::Column::Price)
        .order_by_asc(pack_type::Column::Id)
        .all(db)
        .await?)
}
