use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(InviteCodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InviteCodes::Code)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(InviteCodes::CreatedByPhone).text().not_null())
                    .col(ColumnDef::new(InviteCodes::UsedByPhone).text().null())
                    .col(
                        ColumnDef::new(InviteCodes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(InviteCodes::UsedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    // Redeemer and redemption time are set together or not at all.
                    .check(
                        Expr::col(InviteCodes::UsedByPhone)
                            .is_null()
                            .and(Expr::col(InviteCodes::UsedAt).is_null())
                            .or(Expr::col(InviteCodes::UsedByPhone)
                                .is_not_null()
                                .and(Expr::col(InviteCodes::UsedAt).is_not_null())),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(InviteCodes::Table, InviteCodes::CreatedByPhone)
                            .to(Members::Table, Members::Phone)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InviteCodes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum InviteCodes {
    Table,
    Code,
    CreatedByPhone,
    UsedByPhone,
    CreatedAt,
    UsedAt,
}

#[derive(Iden)]
enum Members {
    Table,
    Phone,
}
