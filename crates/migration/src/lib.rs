pub use sea_orm_migration::prelude::*;

mod m20260810_000001_budgets;
mod m20260810_000002_categories;
mod m20260810_000003_entries;
mod m20260812_000001_seed_categories;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260810_000001_budgets::Migration),
            Box::new(m20260810_000002_categories::Migration),
            Box::new(m20260810_000003_entries::Migration),
            Box::new(m20260812_000001_seed_categories::Migration),
        ]
    }
}
