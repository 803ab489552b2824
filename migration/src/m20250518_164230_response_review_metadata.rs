use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(ChallengeResponse::Table)
                    .add_column(ColumnDef::new(ChallengeResponse::ReviewTimestamp).timestamp())
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(ChallengeResponse::Table)
                    .add_column(ColumnDef::new(ChallengeResponse::Reviewer).uuid())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(ChallengeResponse::Table)
                    .drop_column(ChallengeResponse::Reviewer)
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(ChallengeResponse::Table)
                    .drop_column(ChallengeResponse::ReviewTimestamp)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum ChallengeResponse {
    #[iden = "kitchen_race_challenge_responses"]
    Table,
    ReviewTimestamp,
    Reviewer,
}
