use chrono::{DateTime, Utc};
use entity::kitchen_race_cohouse_members;
use poem_openapi::Object;
use uuid::Uuid;

#[derive(Debug, Clone, Object)]
pub struct CohouseMember {
    /// The cohouse the user belongs to.
    pub cohouse_id: Uuid,
    /// The user id.
    pub user_id: Uuid,
    /// When the user joined the cohouse.
    pub joined_timestamp: DateTime<Utc>,
}

impl From<kitchen_race_cohouse_members::Model> for CohouseMember {
    fn from(member: kitchen_race_cohouse_members::Model) -> Self {
        Self {
            cohouse_id: member.cohouse_id,
            user_id: member.user_id,
            joined_timestamp: member.joined_timestamp.and_utc(),
        }
    }
}
