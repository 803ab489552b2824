use sea_orm_migration::{
    prelude::{extension::postgres::Type, *},
    sea_orm::{EnumIter, Iterable},
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(ContentType::Type)
                    .values(ContentType::iter().skip(1))
                    .to_owned(),
            )
            .await?;

        manager
            .create_type(
                Type::create()
                    .as_enum(ResponseStatus::Type)
                    .values(ResponseStatus::iter().skip(1))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Challenge::Table)
                    .col(ColumnDef::new(Challenge::Id).uuid().primary_key())
                    .col(ColumnDef::new(Challenge::Title).text().not_null())
                    .col(ColumnDef::new(Challenge::Body).text().not_null())
                    .col(
                        ColumnDef::new(Challenge::StartTimestamp)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Challenge::EndTimestamp)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Challenge::ContentType)
                            .custom(ContentType::Type)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Challenge::Choices).array(ColumnType::Text))
                    .col(ColumnDef::new(Challenge::CorrectChoices).big_integer())
                    .col(
                        ColumnDef::new(Challenge::ShuffleChoices)
                            .boolean()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Challenge::Points).big_integer())
                    .col(ColumnDef::new(Challenge::Creator).uuid().not_null())
                    .col(
                        ColumnDef::new(Challenge::CreationTimestamp)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ChallengeResponse::Table)
                    .col(ColumnDef::new(ChallengeResponse::Id).uuid().primary_key())
                    .col(
                        ColumnDef::new(ChallengeResponse::ChallengeId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChallengeResponse::CohouseId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChallengeResponse::ContentType)
                            .custom(ContentType::Type)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ChallengeResponse::PictureUrl).text())
                    .col(ColumnDef::new(ChallengeResponse::SelectedChoices).big_integer())
                    .col(ColumnDef::new(ChallengeResponse::AnswerText).text())
                    .col(
                        ColumnDef::new(ChallengeResponse::Status)
                            .custom(ResponseStatus::Type)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChallengeResponse::SubmissionTimestamp)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ChallengeResponse::Table, ChallengeResponse::ChallengeId)
                            .to(Challenge::Table, Challenge::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("kitchen_race_challenge_responses_challenge_cohouse_idx")
                    .table(ChallengeResponse::Table)
                    .col(ChallengeResponse::ChallengeId)
                    .col(ChallengeResponse::CohouseId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CohouseMember::Table)
                    .col(ColumnDef::new(CohouseMember::CohouseId).uuid().not_null())
                    .col(ColumnDef::new(CohouseMember::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(CohouseMember::JoinedTimestamp)
                            .timestamp()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(CohouseMember::CohouseId)
                            .col(CohouseMember::UserId),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CohouseMember::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ChallengeResponse::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Challenge::Table).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(ResponseStatus::Type).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(ContentType::Type).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden, EnumIter)]
enum ContentType {
    #[iden = "kitchen_race_content_type"]
    Type,
    #[iden = "picture"]
    Picture,
    #[iden = "multiple_choice"]
    MultipleChoice,
    #[iden = "single_answer"]
    SingleAnswer,
    #[iden = "no_choice"]
    NoChoice,
}

#[derive(Iden, EnumIter)]
enum ResponseStatus {
    #[iden = "kitchen_race_response_status"]
    Type,
    #[iden = "waiting"]
    Waiting,
    #[iden = "validated"]
    Validated,
    #[iden = "invalidated"]
    Invalidated,
}

#[derive(Iden)]
enum Challenge {
    #[iden = "kitchen_race_challenges"]
    Table,
    Id,
    Title,
    Body,
    StartTimestamp,
    EndTimestamp,
    ContentType,
    Choices,
    CorrectChoices,
    ShuffleChoices,
    Points,
    Creator,
    CreationTimestamp,
}

#[derive(Iden)]
enum ChallengeResponse {
    #[iden = "kitchen_race_challenge_responses"]
    Table,
    Id,
    ChallengeId,
    CohouseId,
    ContentType,
    PictureUrl,
    SelectedChoices,
    AnswerText,
    Status,
    SubmissionTimestamp,
}

#[derive(Iden)]
enum CohouseMember {
    #[iden = "kitchen_race_cohouse_members"]
    Table,
    CohouseId,
    UserId,
    JoinedTimestamp,
}
