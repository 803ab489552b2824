use sea_orm::entity::prelude::*;

use crate::sea_orm_active_enums::{KitchenRaceContentType, KitchenRaceResponseStatus};

/// One cohouse's submission to one challenge. `(challenge_id, cohouse_id)`
/// is unique; resubmissions overwrite the existing row.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "kitchen_race_challenge_responses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub challenge_id: Uuid,
    pub cohouse_id: Uuid,
    pub content_type: KitchenRaceContentType,
    /// Set for picture responses once the upload has completed.
    pub picture_url: Option<String>,
    /// Bitmask over the challenge's choices; set for multiple choice
    /// responses.
    pub selected_choices: Option<i64>,
    /// Set for single answer responses.
    pub answer_text: Option<String>,
    pub status: KitchenRaceResponseStatus,
    pub submission_timestamp: DateTime,
    pub review_timestamp: Option<DateTime>,
    pub reviewer: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::kitchen_race_challenges::Entity",
        from = "Column::ChallengeId",
        to = "super::kitchen_race_challenges::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    KitchenRaceChallenges,
}

impl Related<super::kitchen_race_challenges::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::KitchenRaceChallenges.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
