use sea_orm_migration::prelude::*;

const KEYWORD_UNIQUE: &str = "keyword_keyword_unique";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name(KEYWORD_UNIQUE)
                    .table(Keyword::Table)
                    .col(Keyword::Keyword)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(KEYWORD_UNIQUE)
                    .table(Keyword::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Keyword {
    Table,
    Keyword,
}
