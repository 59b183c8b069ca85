//! Budget aggregate: the cached financial summary of one owner.
//!
//! Totals are a denormalized projection over the entries table, refreshed by
//! `Ledger::recalc` after every mutation. They are never updated through
//! ad-hoc field increments, so the cache-consistency invariant
//! `current == start + income - expenses` lives in exactly one code path.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, LedgerError, LedgerResult, Money, OwnerRef};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub id: Uuid,
    pub owner: OwnerRef,
    pub currency: Currency,
    pub total_income: Money,
    pub total_expenses: Money,
    pub current_amount: Money,
    pub start_amount: Money,
    pub planned_amount: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Initial values for a freshly created budget.
///
/// `planned_amount` carries the owner's declared goal for event owners and
/// stays zero for users and groups.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BudgetDefaults {
    pub start_amount: Money,
    pub planned_amount: Money,
    pub currency: Currency,
}

/// Read-only view of the five cached monetary fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetSnapshot {
    pub total_income: Money,
    pub total_expenses: Money,
    pub current_amount: Money,
    pub start_amount: Money,
    pub planned_amount: Money,
}

impl Budget {
    pub fn new(owner: OwnerRef, defaults: BudgetDefaults) -> LedgerResult<Self> {
        let now = Utc::now();
        let budget = Self {
            id: Uuid::new_v4(),
            owner,
            currency: defaults.currency,
            total_income: Money::ZERO,
            total_expenses: Money::ZERO,
            current_amount: defaults.start_amount,
            start_amount: defaults.start_amount,
            planned_amount: defaults.planned_amount,
            created_at: now,
            updated_at: now,
        };
        budget.validate()?;
        Ok(budget)
    }

    /// Rejects negative accumulators before anything persists.
    pub fn validate(&self) -> LedgerResult<()> {
        for (field, value) in [
            ("total_income", self.total_income),
            ("total_expenses", self.total_expenses),
            ("start_amount", self.start_amount),
            ("planned_amount", self.planned_amount),
        ] {
            if value.is_negative() {
                return Err(LedgerError::Validation(format!(
                    "{field} must be non-negative"
                )));
            }
        }
        Ok(())
    }

    /// Installs freshly summed totals and recomputes the current amount.
    ///
    /// Invariant: `current_amount == start_amount + total_income -
    /// total_expenses` holds on success.
    pub(crate) fn apply_totals(&mut self, income: Money, expenses: Money) -> LedgerResult<()> {
        self.total_income = income;
        self.total_expenses = expenses;
        self.current_amount = self
            .start_amount
            .checked_add(income)
            .and_then(|v| v.checked_sub(expenses))
            .ok_or_else(|| {
                LedgerError::Validation("amount overflow during recalculation".to_string())
            })?;
        self.validate()
    }

    #[must_use]
    pub fn snapshot(&self) -> BudgetSnapshot {
        BudgetSnapshot {
            total_income: self.total_income,
            total_expenses: self.total_expenses,
            current_amount: self.current_amount,
            start_amount: self.start_amount,
            planned_amount: self.planned_amount,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_kind: String,
    pub owner_id: i64,
    pub currency: String,
    pub total_income_cents: i64,
    pub total_expenses_cents: i64,
    pub current_amount_cents: i64,
    pub start_amount_cents: i64,
    pub planned_amount_cents: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::entries::Entity")]
    Entries,
}

impl Related<super::entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Budget> for ActiveModel {
    fn from(budget: &Budget) -> Self {
        Self {
            id: ActiveValue::Set(budget.id),
            owner_kind: ActiveValue::Set(budget.owner.kind().as_str().to_string()),
            owner_id: ActiveValue::Set(budget.owner.owner_id()),
            currency: ActiveValue::Set(budget.currency.code().to_string()),
            total_income_cents: ActiveValue::Set(budget.total_income.cents()),
            total_expenses_cents: ActiveValue::Set(budget.total_expenses.cents()),
            current_amount_cents: ActiveValue::Set(budget.current_amount.cents()),
            start_amount_cents: ActiveValue::Set(budget.start_amount.cents()),
            planned_amount_cents: ActiveValue::Set(budget.planned_amount.cents()),
            created_at: ActiveValue::Set(budget.created_at),
            updated_at: ActiveValue::Set(budget.updated_at),
        }
    }
}

impl TryFrom<Model> for Budget {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let owner = OwnerRef::from_parts(model.owner_kind.as_str(), model.owner_id)
            .map_err(|_| {
                LedgerError::Integrity(format!(
                    "budget {} has invalid owner kind {}",
                    model.id, model.owner_kind
                ))
            })?;
        Ok(Self {
            id: model.id,
            owner,
            currency: Currency::try_from(model.currency.as_str()).unwrap_or_default(),
            total_income: Money::new(model.total_income_cents),
            total_expenses: Money::new(model.total_expenses_cents),
            current_amount: Money::new(model.current_amount_cents),
            start_amount: Money::new(model.start_amount_cents),
            planned_amount: Money::new(model.planned_amount_cents),
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
