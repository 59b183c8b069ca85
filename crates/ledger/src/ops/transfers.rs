//! Transfer engine: atomic paired writes plus the top-up and expense
//! conveniences built on it.
//!
//! A transfer is one transaction containing an expense entry on the source
//! budget, an income entry on the destination budget, and a recalculation
//! of both. Either everything lands or nothing does.

use sea_orm::{DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    CreateEntryCmd, Direction, EntryMeta, ExpenseCmd, LedgerEntry, LedgerError, LedgerResult,
    Money, OTHER_EXPENSES_NAME, OwnerRef, TOP_UP_NAME, TRANSFER_IN_NAME, TRANSFER_OUT_NAME,
    TopUpCmd, TransferCmd, entries,
};

use super::{Ledger, normalize_optional_text, with_tx};

const TRANSFER_COLOR: &str = "#95A5A6";
const TOP_UP_COLOR: &str = "#00ff00";
const OTHER_EXPENSE_COLOR: &str = "#ff0000";

impl Ledger {
    /// Moves funds between two owners' budgets.
    ///
    /// Returns the transfer id shared by both halves. When the command
    /// carries an idempotency key already used by this payer, the existing
    /// pair's transfer id comes back and nothing is written.
    ///
    /// A caller-supplied category applies to the half whose direction it
    /// matches; the other half falls back to the reserved transfer
    /// category. With no category supplied both halves use the reserved
    /// pair ("Transfer Out" / "Transfer In").
    pub async fn transfer(&self, cmd: TransferCmd) -> LedgerResult<Uuid> {
        if !cmd.amount.is_positive() {
            return Err(LedgerError::Validation("amount must be > 0".to_string()));
        }
        with_tx!(self, |db_tx| {
            let source = self.require_budget(&db_tx, cmd.from).await?;
            let destination = self.require_budget(&db_tx, cmd.to).await?;
            if source.currency != destination.currency {
                return Err(LedgerError::Validation(format!(
                    "currency mismatch: {} budget is {}, {} budget is {}",
                    cmd.from,
                    source.currency,
                    cmd.to,
                    destination.currency
                )));
            }

            let key = normalize_optional_text(cmd.meta.idempotency_key.as_deref());
            if let Some(key) = key.as_deref() {
                if let Some(existing) =
                    Self::find_transfer_by_key(&db_tx, cmd.payer_id, key).await?
                {
                    tracing::debug!(
                        payer = cmd.payer_id,
                        key,
                        "idempotency key seen, reusing transfer"
                    );
                    return Ok(existing);
                }
            }

            let (out_category, in_category) =
                self.resolve_transfer_categories(&db_tx, cmd.meta.category_id).await?;

            let transfer_id = Uuid::new_v4();
            let mut out_cmd =
                CreateEntryCmd::new(source.id, cmd.payer_id, Direction::Expense, cmd.amount)
                    .category_id(out_category);
            let mut in_cmd =
                CreateEntryCmd::new(destination.id, cmd.payer_id, Direction::Income, cmd.amount)
                    .category_id(in_category);
            if let Some(note) = cmd.meta.note.as_deref() {
                out_cmd = out_cmd.note(note);
                in_cmd = in_cmd.note(note);
            }
            if let Some(date) = cmd.meta.occurred_on {
                out_cmd = out_cmd.occurred_on(date);
                in_cmd = in_cmd.occurred_on(date);
            }
            if let Some(key) = key.as_deref() {
                out_cmd = out_cmd.idempotency_key(key);
                in_cmd = in_cmd.idempotency_key(key);
            }

            let out_entry = self.insert_entry(&db_tx, out_cmd, Some(transfer_id)).await?;
            if out_entry.transfer_id != Some(transfer_id) {
                // Lost an insert race on the key; the winner's pair stands.
                return out_entry.transfer_id.ok_or_else(|| {
                    LedgerError::Integrity(format!(
                        "entry {} reused for a transfer but has no transfer id",
                        out_entry.id
                    ))
                });
            }
            let in_entry = self.insert_entry(&db_tx, in_cmd, Some(transfer_id)).await?;
            if in_entry.transfer_id != Some(transfer_id) {
                // The key already tags an unrelated income entry; writing
                // only the expense half would leave a one-sided transfer.
                return Err(LedgerError::Integrity(format!(
                    "idempotency key on entry {} already covers an income outside this transfer",
                    in_entry.id
                )));
            }

            self.recalc_in_tx(&db_tx, source.id).await?;
            self.recalc_in_tx(&db_tx, destination.id).await?;
            tracing::info!(
                transfer = %transfer_id,
                from = %cmd.from,
                to = %cmd.to,
                amount = %cmd.amount,
                "transfer completed"
            );
            Ok(transfer_id)
        })
    }

    /// Records an income on the user's own budget and recalculates.
    ///
    /// Defaults to the "Top Up" category; a supplied category must be an
    /// income one.
    pub async fn top_up(&self, cmd: TopUpCmd) -> LedgerResult<LedgerEntry> {
        self.write_own_entry(
            cmd.user_id,
            Direction::Income,
            cmd.amount,
            cmd.meta,
            TOP_UP_NAME,
            TOP_UP_COLOR,
        )
        .await
    }

    /// Records an expense on the user's own budget and recalculates.
    ///
    /// Defaults to the "Other Expenses" category; a supplied category must
    /// be an expense one.
    pub async fn set_expense(&self, cmd: ExpenseCmd) -> LedgerResult<LedgerEntry> {
        self.write_own_entry(
            cmd.user_id,
            Direction::Expense,
            cmd.amount,
            cmd.meta,
            OTHER_EXPENSES_NAME,
            OTHER_EXPENSE_COLOR,
        )
        .await
    }

    async fn write_own_entry(
        &self,
        user_id: i64,
        direction: Direction,
        amount: Money,
        meta: EntryMeta,
        default_category: &str,
        default_color: &str,
    ) -> LedgerResult<LedgerEntry> {
        if !amount.is_positive() {
            return Err(LedgerError::Validation("amount must be > 0".to_string()));
        }
        with_tx!(self, |db_tx| {
            let budget = self.require_budget(&db_tx, OwnerRef::User(user_id)).await?;
            let category_id = match meta.category_id {
                Some(category_id) => category_id,
                None => {
                    Self::get_or_create_system_category(
                        &db_tx,
                        default_category,
                        direction,
                        default_color,
                    )
                    .await?
                    .id
                }
            };
            let cmd = CreateEntryCmd {
                budget_id: budget.id,
                payer_id: user_id,
                direction,
                amount,
                meta: EntryMeta {
                    category_id: Some(category_id),
                    ..meta
                },
            };
            let entry = self.insert_entry(&db_tx, cmd, None).await?;
            self.recalc_in_tx(&db_tx, budget.id).await?;
            Ok(entry)
        })
    }

    /// Picks the category for each half of a transfer.
    async fn resolve_transfer_categories(
        &self,
        db_tx: &DatabaseTransaction,
        supplied: Option<Uuid>,
    ) -> LedgerResult<(Uuid, Uuid)> {
        let supplied = match supplied {
            Some(category_id) => Some(Self::require_category(db_tx, category_id).await?),
            None => None,
        };
        let out_id = match supplied.as_ref().filter(|c| c.direction == Direction::Expense) {
            Some(category) => category.id,
            None => {
                Self::get_or_create_system_category(
                    db_tx,
                    TRANSFER_OUT_NAME,
                    Direction::Expense,
                    TRANSFER_COLOR,
                )
                .await?
                .id
            }
        };
        let in_id = match supplied.as_ref().filter(|c| c.direction == Direction::Income) {
            Some(category) => category.id,
            None => {
                Self::get_or_create_system_category(
                    db_tx,
                    TRANSFER_IN_NAME,
                    Direction::Income,
                    TRANSFER_COLOR,
                )
                .await?
                .id
            }
        };
        Ok((out_id, in_id))
    }

    async fn find_transfer_by_key(
        db_tx: &DatabaseTransaction,
        payer_id: i64,
        key: &str,
    ) -> LedgerResult<Option<Uuid>> {
        let existing = entries::Entity::find()
            .filter(entries::Column::PayerId.eq(payer_id))
            .filter(entries::Column::IdempotencyKey.eq(key))
            .filter(entries::Column::Direction.eq(Direction::Expense.as_str()))
            .one(db_tx)
            .await?;
        match existing {
            Some(model) => {
                let transfer_id = model.transfer_id.ok_or_else(|| {
                    LedgerError::Integrity(format!(
                        "entry {} reused for a transfer but has no transfer id",
                        model.id
                    ))
                })?;
                Ok(Some(transfer_id))
            }
            None => Ok(None),
        }
    }
}
