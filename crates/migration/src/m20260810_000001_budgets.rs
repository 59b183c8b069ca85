use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Budgets {
    Table,
    Id,
    OwnerKind,
    OwnerId,
    Currency,
    TotalIncomeCents,
    TotalExpensesCents,
    CurrentAmountCents,
    StartAmountCents,
    PlannedAmountCents,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Budgets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Budgets::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Budgets::OwnerKind).string().not_null())
                    .col(ColumnDef::new(Budgets::OwnerId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Budgets::Currency)
                            .string()
                            .not_null()
                            .default("EUR"),
                    )
                    .col(
                        ColumnDef::new(Budgets::TotalIncomeCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Budgets::TotalExpensesCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Budgets::CurrentAmountCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Budgets::StartAmountCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Budgets::PlannedAmountCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Budgets::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Budgets::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uidx-budgets-owner_kind-owner_id")
                    .table(Budgets::Table)
                    .col(Budgets::OwnerKind)
                    .col(Budgets::OwnerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Budgets::Table).to_owned())
            .await?;
        Ok(())
    }
}
