use entity::kitchen_race_cohouse_members;
use lib::auth::User;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

pub async fn get_member(
    db: &impl ConnectionTrait,
    cohouse_id: Uuid,
    user_id: Uuid,
) -> Result<Option<kitchen_race_cohouse_members::Model>, DbErr> {
    kitchen_race_cohouse_members::Entity::find_by_id((cohouse_id, user_id))
        .one(db)
        .await
}

pub async fn get_members(
    db: &impl ConnectionTrait,
    cohouse_id: Uuid,
) -> Result<Vec<kitchen_race_cohouse_members::Model>, DbErr> {
    kitchen_race_cohouse_members::Entity::find()
        .filter(kitchen_race_cohouse_members::Column::CohouseId.eq(cohouse_id))
        .order_by_asc(kitchen_race_cohouse_members::Column::JoinedTimestamp)
        .all(db)
        .await
}

/// Whether the user may act for the cohouse. Admins always can.
pub async fn can_access_cohouse(
    db: &impl ConnectionTrait,
    user: &User,
    cohouse_id: Uuid,
) -> Result<bool, DbErr> {
    Ok(user.admin || get_member(db, cohouse_id, user.id).await?.is_some())
}
