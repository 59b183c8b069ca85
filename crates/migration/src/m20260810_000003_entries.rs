use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Entries {
    Table,
    Id,
    BudgetId,
    PayerId,
    Direction,
    AmountCents,
    OccurredOn,
    CreatedAt,
    CategoryId,
    Note,
    TransferId,
    IdempotencyKey,
}

#[derive(Iden)]
enum Budgets {
    Table,
    Id,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Entries::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Entries::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Entries::BudgetId).blob().not_null())
                    .col(ColumnDef::new(Entries::PayerId).big_integer().not_null())
                    .col(ColumnDef::new(Entries::Direction).string().not_null())
                    .col(
                        ColumnDef::new(Entries::AmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Entries::OccurredOn).date().not_null())
                    .col(ColumnDef::new(Entries::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Entries::CategoryId).blob())
                    .col(ColumnDef::new(Entries::Note).string())
                    .col(ColumnDef::new(Entries::TransferId).blob())
                    .col(ColumnDef::new(Entries::IdempotencyKey).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-entries-budget_id")
                            .from(Entries::Table, Entries::BudgetId)
                            .to(Budgets::Table, Budgets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-entries-category_id")
                            .from(Entries::Table, Entries::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-entries-budget_id-occurred_on")
                    .table(Entries::Table)
                    .col(Entries::BudgetId)
                    .col(Entries::OccurredOn)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uidx-entries-payer_id-idempotency_key-direction")
                    .table(Entries::Table)
                    .col(Entries::PayerId)
                    .col(Entries::IdempotencyKey)
                    .col(Entries::Direction)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Entries::Table).to_owned())
            .await?;
        Ok(())
    }
}
