use sea_orm_migration::prelude::*;

use crate::m20260712_000002_transactions::Transactions;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Receipts {
    Table,
    TransactionId,
    MemberId,
    MemberName,
    Kind,
    AmountMinor,
    GeneratedBy,
    DocumentB64,
    GeneratedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Receipts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Receipts::TransactionId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Receipts::MemberId).string().not_null())
                    .col(ColumnDef::new(Receipts::MemberName).string().not_null())
                    .col(ColumnDef::new(Receipts::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Receipts::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Receipts::GeneratedBy).string().not_null())
                    .col(ColumnDef::new(Receipts::DocumentB64).text().not_null())
                    .col(ColumnDef::new(Receipts::GeneratedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-receipts-transaction_id")
                            .from(Receipts::Table, Receipts::TransactionId)
                            .to(Transactions::Table, Transactions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-receipts-member_id")
                    .table(Receipts::Table)
                    .col(Receipts::MemberId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Receipts::Table).to_owned())
            .await
    }
}
