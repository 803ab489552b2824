use sea_orm::entity::prelude::*;

use crate::sea_orm_active_enums::KitchenRaceContentType;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "kitchen_race_challenges")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub start_timestamp: DateTime,
    pub end_timestamp: DateTime,
    pub content_type: KitchenRaceContentType,
    /// Choice texts; only set for multiple choice challenges.
    pub choices: Option<Vec<String>>,
    /// Bitmask over `choices` marking the correct ones, if the challenge
    /// has a known solution.
    pub correct_choices: Option<i64>,
    pub shuffle_choices: bool,
    pub points: Option<i64>,
    pub creator: Uuid,
    pub creation_timestamp: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::kitchen_race_challenge_responses::Entity")]
    KitchenRaceChallengeResponses,
}

impl Related<super::kitchen_race_challenge_responses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::KitchenRaceChallengeResponses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
