use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .table(InviteCodes::Table)
                    .col(InviteCodes::CreatedByPhone)
                    .name("idx_invite_codes_created_by_phone")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(InviteCodes::Table)
                    .col(InviteCodes::UsedByPhone)
                    .name("idx_invite_codes_used_by_phone")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_invite_codes_used_by_phone")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_invite_codes_created_by_phone")
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum InviteCodes {
    Table,
    CreatedByPhone,
    UsedByPhone,
}
