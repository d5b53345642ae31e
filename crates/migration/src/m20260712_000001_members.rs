use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum Members {
    Table,
    Id,
    Name,
    Email,
    Mobile,
    Address,
    Password,
    Role,
    RegistrationNumber,
    PlanAmountMinor,
    PlanDurationYears,
    RegisteredAt,
    CollectionStatus,
    CollectionPaidMinor,
    CollectionLastPaidAt,
    LoanActive,
    LoanId,
    LoanPrincipalMinor,
    LoanInterestRatePercent,
    LoanIssuedAt,
    LoanDueAt,
    LoanRemainingMinor,
    LoanStatus,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Members::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Members::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Members::Name).string().not_null())
                    .col(ColumnDef::new(Members::Email).string().not_null())
                    .col(ColumnDef::new(Members::Mobile).string().not_null())
                    .col(ColumnDef::new(Members::Address).string())
                    .col(ColumnDef::new(Members::Password).string().not_null())
                    .col(ColumnDef::new(Members::Role).string().not_null())
                    .col(
                        ColumnDef::new(Members::RegistrationNumber)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Members::PlanAmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Members::PlanDurationYears)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Members::RegisteredAt).timestamp().not_null())
                    .col(
                        ColumnDef::new(Members::CollectionStatus)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Members::CollectionPaidMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Members::CollectionLastPaidAt).timestamp())
                    .col(ColumnDef::new(Members::LoanActive).boolean().not_null())
                    .col(ColumnDef::new(Members::LoanId).string())
                    .col(
                        ColumnDef::new(Members::LoanPrincipalMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Members::LoanInterestRatePercent)
                            .double()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Members::LoanIssuedAt).timestamp())
                    .col(ColumnDef::new(Members::LoanDueAt).timestamp())
                    .col(
                        ColumnDef::new(Members::LoanRemainingMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Members::LoanStatus).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-members-email")
                    .table(Members::Table)
                    .col(Members::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-members-mobile")
                    .table(Members::Table)
                    .col(Members::Mobile)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-members-registration_number")
                    .table(Members::Table)
                    .col(Members::RegistrationNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Members::Table).to_owned())
            .await
    }
}
