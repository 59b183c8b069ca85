//! Budget aggregate operations: idempotent creation, recalculation, and
//! owner resolution.

use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseTransaction, QueryFilter, QuerySelect, Statement,
    TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Budget, BudgetDefaults, BudgetSnapshot, Direction, LedgerError, LedgerResult, Money, OwnerRef,
    budgets, entries,
};

use super::{Ledger, with_tx};

impl Ledger {
    /// Idempotent get-or-create of the budget for an owner.
    ///
    /// Called by the owner subsystems right after a User/Group/Event row is
    /// created. A lost creation race resolves to the existing row via the
    /// unique `(owner_kind, owner_id)` index; the second caller never sees
    /// the conflict.
    pub async fn ensure_for_owner(
        &self,
        owner: OwnerRef,
        defaults: BudgetDefaults,
    ) -> LedgerResult<Budget> {
        let budget = Budget::new(owner, defaults)?;
        with_tx!(self, |db_tx| {
            match Self::find_by_owner(&db_tx, owner).await? {
                Some(model) => Ok(Budget::try_from(model)?),
                None => match budgets::ActiveModel::from(&budget).insert(&db_tx).await {
                    Ok(_) => Ok(budget.clone()),
                    Err(insert_err) => match Self::find_by_owner(&db_tx, owner).await? {
                        Some(model) => Ok(Budget::try_from(model)?),
                        None => Err(insert_err.into()),
                    },
                },
            }
        })
    }

    /// Pure read of the cached totals; always reflects the last successful
    /// recalculation.
    pub async fn snapshot(&self, budget_id: Uuid) -> LedgerResult<BudgetSnapshot> {
        let model = budgets::Entity::find_by_id(budget_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("budget {budget_id}")))?;
        Ok(Budget::try_from(model)?.snapshot())
    }

    /// Returns the full budget record for an owner.
    ///
    /// A missing row is a data-integrity symptom (every owner gets a budget
    /// at creation time), so it is logged distinctly and reported as
    /// [`LedgerError::Integrity`] rather than a plain not-found.
    pub async fn budget_for_owner(&self, owner: OwnerRef) -> LedgerResult<Budget> {
        let model = budgets::Entity::find()
            .filter(budgets::Column::OwnerKind.eq(owner.kind().as_str()))
            .filter(budgets::Column::OwnerId.eq(owner.owner_id()))
            .one(&self.database)
            .await?;
        match model {
            Some(model) => Ok(Budget::try_from(model)?),
            None => {
                tracing::error!(owner = %owner, "owner has no budget");
                Err(LedgerError::Integrity(format!("no budget for owner {owner}")))
            }
        }
    }

    /// Locates a budget from untrusted routing input (`kind` as a string).
    ///
    /// Unknown kinds are a normal not-found; an owner without a budget is an
    /// integrity error, see [`Ledger::budget_for_owner`].
    pub async fn resolve_budget_for_owner(&self, kind: &str, id: i64) -> LedgerResult<Budget> {
        let owner = OwnerRef::from_parts(kind, id)?;
        self.budget_for_owner(owner).await
    }

    /// Recomputes the cached totals from the entries table.
    ///
    /// Runs in one transaction with the budget row locked for update, so two
    /// concurrent recalculations serialize instead of racing on the
    /// read-then-write. Safe to call repeatedly: the same ledger state
    /// always produces the same totals.
    pub async fn recalc(&self, budget_id: Uuid) -> LedgerResult<BudgetSnapshot> {
        with_tx!(self, |db_tx| {
            self.recalc_in_tx(&db_tx, budget_id).await
        })
    }

    /// Overwrites the manually adjustable baseline, then recalculates.
    pub async fn set_start_amount(
        &self,
        budget_id: Uuid,
        amount: Money,
    ) -> LedgerResult<BudgetSnapshot> {
        if amount.is_negative() {
            return Err(LedgerError::Validation(
                "start_amount must be non-negative".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            Self::require_budget_locked(&db_tx, budget_id).await?;
            let active = budgets::ActiveModel {
                id: ActiveValue::Set(budget_id),
                start_amount_cents: ActiveValue::Set(amount.cents()),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            self.recalc_in_tx(&db_tx, budget_id).await
        })
    }

    /// Overwrites the goal amount, then recalculates.
    pub async fn set_planned_amount(
        &self,
        budget_id: Uuid,
        amount: Money,
    ) -> LedgerResult<BudgetSnapshot> {
        if amount.is_negative() {
            return Err(LedgerError::Validation(
                "planned_amount must be non-negative".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            Self::require_budget_locked(&db_tx, budget_id).await?;
            let active = budgets::ActiveModel {
                id: ActiveValue::Set(budget_id),
                planned_amount_cents: ActiveValue::Set(amount.cents()),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            self.recalc_in_tx(&db_tx, budget_id).await
        })
    }

    /// Removes an owner's budget and its entries (owner deletion cascade).
    pub async fn delete_for_owner(&self, owner: OwnerRef) -> LedgerResult<()> {
        with_tx!(self, |db_tx| {
            let model = Self::find_by_owner(&db_tx, owner)
                .await?
                .ok_or_else(|| LedgerError::NotFound(format!("budget of {owner}")))?;
            entries::Entity::delete_many()
                .filter(entries::Column::BudgetId.eq(model.id))
                .exec(&db_tx)
                .await?;
            budgets::Entity::delete_by_id(model.id).exec(&db_tx).await?;
            Ok(())
        })
    }

    pub(super) async fn recalc_in_tx(
        &self,
        db_tx: &DatabaseTransaction,
        budget_id: Uuid,
    ) -> LedgerResult<BudgetSnapshot> {
        let model = Self::require_budget_locked(db_tx, budget_id).await?;
        let mut budget = Budget::try_from(model)?;

        let income = Self::sum_entries(db_tx, budget_id, Direction::Income).await?;
        let expenses = Self::sum_entries(db_tx, budget_id, Direction::Expense).await?;
        budget.apply_totals(income, expenses)?;
        tracing::debug!(
            budget = %budget_id,
            income = %income,
            expenses = %expenses,
            current = %budget.current_amount,
            "recalculated budget totals"
        );

        let active = budgets::ActiveModel {
            id: ActiveValue::Set(budget_id),
            total_income_cents: ActiveValue::Set(budget.total_income.cents()),
            total_expenses_cents: ActiveValue::Set(budget.total_expenses.cents()),
            current_amount_cents: ActiveValue::Set(budget.current_amount.cents()),
            updated_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        active.update(db_tx).await?;

        Ok(budget.snapshot())
    }

    pub(super) async fn require_budget(
        &self,
        db_tx: &DatabaseTransaction,
        owner: OwnerRef,
    ) -> LedgerResult<Budget> {
        match Self::find_by_owner(db_tx, owner).await? {
            Some(model) => Ok(Budget::try_from(model)?),
            None => {
                tracing::error!(owner = %owner, "owner has no budget");
                Err(LedgerError::Integrity(format!("no budget for owner {owner}")))
            }
        }
    }

    async fn find_by_owner(
        db_tx: &DatabaseTransaction,
        owner: OwnerRef,
    ) -> LedgerResult<Option<budgets::Model>> {
        Ok(budgets::Entity::find()
            .filter(budgets::Column::OwnerKind.eq(owner.kind().as_str()))
            .filter(budgets::Column::OwnerId.eq(owner.owner_id()))
            .one(db_tx)
            .await?)
    }

    async fn require_budget_locked(
        db_tx: &DatabaseTransaction,
        budget_id: Uuid,
    ) -> LedgerResult<budgets::Model> {
        budgets::Entity::find_by_id(budget_id)
            .lock_exclusive()
            .one(db_tx)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("budget {budget_id}")))
    }

    async fn sum_entries(
        db_tx: &DatabaseTransaction,
        budget_id: Uuid,
        direction: Direction,
    ) -> LedgerResult<Money> {
        let backend = db_tx.get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            "SELECT COALESCE(SUM(amount_cents), 0) AS sum \
             FROM entries \
             WHERE budget_id = ? AND direction = ?",
            [budget_id.into(), direction.as_str().into()],
        );
        let row = db_tx.query_one(stmt).await?;
        let cents: i64 = row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0);
        Ok(Money::new(cents))
    }
}
