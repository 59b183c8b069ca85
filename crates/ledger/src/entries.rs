//! Ledger entry primitives.
//!
//! A `LedgerEntry` is one immutable money movement against a budget: an
//! income or an expense, attributed to the paying user. Entries are the
//! source of truth the budget totals are recomputed from.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, LedgerResult, Money};

/// Income/expense classification shared by entries and categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Income,
    Expense,
}

impl Direction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for Direction {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(LedgerError::Validation(format!(
                "invalid direction: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub payer_id: i64,
    pub direction: Direction,
    pub amount: Money,
    pub occurred_on: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub category_id: Option<Uuid>,
    pub note: Option<String>,
    /// Set on both halves of a transfer, pairing them.
    pub transfer_id: Option<Uuid>,
    pub idempotency_key: Option<String>,
}

impl LedgerEntry {
    /// Builds a new entry, rejecting non-positive amounts.
    pub fn new(
        budget_id: Uuid,
        payer_id: i64,
        direction: Direction,
        amount: Money,
        occurred_on: NaiveDate,
        category_id: Option<Uuid>,
        note: Option<String>,
    ) -> LedgerResult<Self> {
        if !amount.is_positive() {
            return Err(LedgerError::Validation(
                "amount must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            budget_id,
            payer_id,
            direction,
            amount,
            occurred_on,
            created_at: Utc::now(),
            category_id,
            note,
            transfer_id: None,
            idempotency_key: None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub budget_id: Uuid,
    pub payer_id: i64,
    pub direction: String,
    pub amount_cents: i64,
    pub occurred_on: Date,
    pub created_at: DateTimeUtc,
    pub category_id: Option<Uuid>,
    pub note: Option<String>,
    pub transfer_id: Option<Uuid>,
    pub idempotency_key: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::budgets::Entity",
        from = "Column::BudgetId",
        to = "super::budgets::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Budgets,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Categories,
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&LedgerEntry> for ActiveModel {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            id: ActiveValue::Set(entry.id),
            budget_id: ActiveValue::Set(entry.budget_id),
            payer_id: ActiveValue::Set(entry.payer_id),
            direction: ActiveValue::Set(entry.direction.as_str().to_string()),
            amount_cents: ActiveValue::Set(entry.amount.cents()),
            occurred_on: ActiveValue::Set(entry.occurred_on),
            created_at: ActiveValue::Set(entry.created_at),
            category_id: ActiveValue::Set(entry.category_id),
            note: ActiveValue::Set(entry.note.clone()),
            transfer_id: ActiveValue::Set(entry.transfer_id),
            idempotency_key: ActiveValue::Set(entry.idempotency_key.clone()),
        }
    }
}

impl TryFrom<Model> for LedgerEntry {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            budget_id: model.budget_id,
            payer_id: model.payer_id,
            direction: Direction::try_from(model.direction.as_str())?,
            amount: Money::new(model.amount_cents),
            occurred_on: model.occurred_on,
            created_at: model.created_at,
            category_id: model.category_id,
            note: model.note,
            transfer_id: model.transfer_id,
            idempotency_key: model.idempotency_key,
        })
    }
}
