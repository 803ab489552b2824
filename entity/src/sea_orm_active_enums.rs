use poem_openapi::Enum;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The content variant of a challenge. Responses must carry the same
/// variant as the challenge they answer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Enum, Serialize, Deserialize,
)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "kitchen_race_content_type"
)]
#[oai(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KitchenRaceContentType {
    #[sea_orm(string_value = "picture")]
    Picture,
    #[sea_orm(string_value = "multiple_choice")]
    MultipleChoice,
    #[sea_orm(string_value = "single_answer")]
    SingleAnswer,
    #[sea_orm(string_value = "no_choice")]
    NoChoice,
}

/// Review status of a challenge response. New submissions start as
/// `Waiting`; only administrators move it to `Validated`/`Invalidated`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Enum, Serialize, Deserialize,
)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "kitchen_race_response_status"
)]
#[oai(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KitchenRaceResponseStatus {
    #[sea_orm(string_value = "waiting")]
    Waiting,
    #[sea_orm(string_value = "validated")]
    Validated,
    #[sea_orm(string_value = "invalidated")]
    Invalidated,
}
