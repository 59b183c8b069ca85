use sea_orm::{ConnectionTrait, DbBackend, Statement, Value};
use sea_orm_migration::{SchemaManagerConnection, prelude::*};
use uuid::Uuid;

#[derive(DeriveMigrationName)]
pub struct Migration;

const INCOME: &str = "income";
const EXPENSE: &str = "expense";

/// Initial catalog: (name, direction, color, sort rank). The last three are
/// the system rows the ledger reaches for by name.
const CATALOG: &[(&str, &str, &str, i32)] = &[
    ("Salary", INCOME, "#2ECC71", 1),
    ("Freelance", INCOME, "#3498DB", 2),
    ("Investments", INCOME, "#9B59B6", 3),
    ("Business", INCOME, "#34495E", 4),
    ("Gifts", INCOME, "#F1C40F", 5),
    ("Rental Income", INCOME, "#E67E22", 6),
    ("Refunds", INCOME, "#1ABC9C", 7),
    ("Other Income", INCOME, "#7F8C8D", 8),
    ("Groceries", EXPENSE, "#E74C3C", 10),
    ("Dining Out", EXPENSE, "#D35400", 11),
    ("Housing / Rent", EXPENSE, "#C0392B", 12),
    ("Utilities", EXPENSE, "#F39C12", 13),
    ("Transportation", EXPENSE, "#2980B9", 14),
    ("Vehicle Maintenance", EXPENSE, "#2C3E50", 15),
    ("Health & Medical", EXPENSE, "#16A085", 16),
    ("Entertainment", EXPENSE, "#8E44AD", 17),
    ("Shopping", EXPENSE, "#27AE60", 18),
    ("Clothing", EXPENSE, "#E84393", 19),
    ("Education", EXPENSE, "#0984E3", 20),
    ("Personal Care", EXPENSE, "#FD79A8", 21),
    ("Sports & Fitness", EXPENSE, "#00CEC9", 22),
    ("Travel", EXPENSE, "#00B894", 23),
    ("Debt Payments", EXPENSE, "#636E72", 24),
    ("Charity", EXPENSE, "#55E6C1", 25),
    ("Pets", EXPENSE, "#A29BFE", 26),
    ("Subscriptions", EXPENSE, "#6C5CE7", 27),
    ("Electronics", EXPENSE, "#2D3436", 28),
    ("Taxes", EXPENSE, "#B33939", 29),
    ("Insurance", EXPENSE, "#218C74", 30),
    ("Other Expenses", EXPENSE, "#95A5A6", 99),
    ("Transfer Out", EXPENSE, "#95A5A6", 100),
    ("Transfer In", INCOME, "#95A5A6", 101),
    ("Top Up", INCOME, "#00ff00", 102),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let backend = db.get_database_backend();
        for (name, direction, color, sort_order) in CATALOG {
            insert_category(db, backend, name, direction, color, *sort_order).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let backend = db.get_database_backend();
        let names: Vec<Value> = CATALOG
            .iter()
            .map(|(name, ..)| (*name).to_string().into())
            .collect();
        let placeholders = vec!["?"; names.len()].join(", ");
        db.execute(Statement::from_sql_and_values(
            backend,
            format!("DELETE FROM categories WHERE name IN ({placeholders});"),
            names,
        ))
        .await?;
        Ok(())
    }
}

async fn insert_category(
    db: &SchemaManagerConnection<'_>,
    backend: DbBackend,
    name: &str,
    direction: &str,
    color_hex: &str,
    sort_order: i32,
) -> Result<(), DbErr> {
    let values = vec![
        Uuid::new_v4().into(),
        name.to_string().into(),
        direction.to_string().into(),
        color_hex.to_string().into(),
        Value::Bool(Some(true)),
        Value::Int(Some(sort_order)),
    ];
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO categories (id, name, direction, color_hex, is_active, sort_order) \
         VALUES (?, ?, ?, ?, ?, ?);",
        values,
    ))
    .await?;
    Ok(())
}
