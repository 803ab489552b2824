use entity::kitchen_race_challenges;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, QueryOrder};
use uuid::Uuid;

pub async fn get_challenge(
    db: &impl ConnectionTrait,
    challenge_id: Uuid,
) -> Result<Option<kitchen_race_challenges::Model>, DbErr> {
    kitchen_race_challenges::Entity::find_by_id(challenge_id)
        .one(db)
        .await
}

pub async fn list_challenges(
    db: &impl ConnectionTrait,
) -> Result<Vec<kitchen_race_challenges::Model>, DbErr> {
    kitchen_race_challenges::Entity::find()
        .order_by_asc(kitchen_race_challenges::Column::StartTimestamp)
        .all(db)
        .await
}
