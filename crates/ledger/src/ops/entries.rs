//! Entry store operations: append, delete-with-recalc, and filtered history
//! listing.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    Condition, DatabaseTransaction, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    CreateEntryCmd, Direction, EntryMeta, LedgerEntry, LedgerError, LedgerResult, categories,
    entries,
};

use super::{Ledger, normalize_optional_text, with_tx};

/// Which slice of the entry store a listing reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryScope {
    /// All entries of one budget, regardless of who paid.
    Budget(Uuid),
    /// All entries paid by one user across every budget.
    Payer(i64),
}

/// History filters, all optional and combinable.
///
/// `search` matches case-insensitively against the note and the category
/// name. `date_from` is inclusive.
#[derive(Clone, Debug, Default)]
pub struct EntryListFilter {
    pub direction: Option<Direction>,
    pub date_from: Option<NaiveDate>,
    pub category_id: Option<Uuid>,
    pub search: Option<String>,
}

impl EntryListFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    #[must_use]
    pub fn date_from(mut self, date: NaiveDate) -> Self {
        self.date_from = Some(date);
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }
}

impl Ledger {
    /// Appends one entry to a budget.
    ///
    /// Does not recalculate; callers batching several writes invoke
    /// [`Ledger::recalc`] once at the end. The transfer engine and the
    /// top-up/expense conveniences recalculate for you.
    pub async fn create_entry(&self, cmd: CreateEntryCmd) -> LedgerResult<LedgerEntry> {
        with_tx!(self, |db_tx| {
            self.create_entry_in_tx(&db_tx, cmd).await
        })
    }

    /// Removes an entry and refreshes its budget's totals.
    pub async fn delete_entry(&self, entry_id: Uuid) -> LedgerResult<()> {
        with_tx!(self, |db_tx| {
            let model = entries::Entity::find_by_id(entry_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| LedgerError::NotFound(format!("entry {entry_id}")))?;
            let budget_id = model.budget_id;
            entries::Entity::delete_by_id(entry_id).exec(&db_tx).await?;
            self.recalc_in_tx(&db_tx, budget_id).await?;
            Ok(())
        })
    }

    /// Paginated history listing, newest first (occurred_on, then
    /// created_at as tie-breaker).
    pub async fn list_entries(
        &self,
        scope: EntryScope,
        filter: EntryListFilter,
        limit: u64,
        offset: u64,
    ) -> LedgerResult<Vec<LedgerEntry>> {
        let mut query = entries::Entity::find();
        query = match scope {
            EntryScope::Budget(budget_id) => {
                query.filter(entries::Column::BudgetId.eq(budget_id))
            }
            EntryScope::Payer(payer_id) => query.filter(entries::Column::PayerId.eq(payer_id)),
        };
        if let Some(direction) = filter.direction {
            query = query.filter(entries::Column::Direction.eq(direction.as_str()));
        }
        if let Some(date_from) = filter.date_from {
            query = query.filter(entries::Column::OccurredOn.gte(date_from));
        }
        if let Some(category_id) = filter.category_id {
            query = query.filter(entries::Column::CategoryId.eq(category_id));
        }
        if let Some(term) = normalize_optional_text(filter.search.as_deref()) {
            query = query
                .join(JoinType::LeftJoin, entries::Relation::Categories.def())
                .filter(
                    Condition::any()
                        .add(entries::Column::Note.contains(&term))
                        .add(categories::Column::Name.contains(&term)),
                );
        }
        let models = query
            .order_by_desc(entries::Column::OccurredOn)
            .order_by_desc(entries::Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(&self.database)
            .await?;
        models.into_iter().map(LedgerEntry::try_from).collect()
    }

    pub(super) async fn create_entry_in_tx(
        &self,
        db_tx: &DatabaseTransaction,
        cmd: CreateEntryCmd,
    ) -> LedgerResult<LedgerEntry> {
        let budget_id = cmd.budget_id;
        crate::budgets::Entity::find_by_id(budget_id)
            .one(db_tx)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("budget {budget_id}")))?;
        self.insert_entry(db_tx, cmd, None).await
    }

    /// Shared insert path for plain entries and transfer halves.
    ///
    /// Resolves the occurred_on default, enforces the category/direction
    /// invariant, and deduplicates on `(payer_id, idempotency_key,
    /// direction)`: a key seen before returns the original entry, and a
    /// lost insert race recovers the winner's row.
    pub(super) async fn insert_entry(
        &self,
        db_tx: &DatabaseTransaction,
        cmd: CreateEntryCmd,
        transfer_id: Option<Uuid>,
    ) -> LedgerResult<LedgerEntry> {
        let CreateEntryCmd {
            budget_id,
            payer_id,
            direction,
            amount,
            meta,
        } = cmd;
        let EntryMeta {
            category_id,
            note,
            idempotency_key,
            occurred_on,
        } = meta;

        if let Some(category_id) = category_id {
            let category = Self::require_category(db_tx, category_id).await?;
            if category.direction != direction {
                return Err(LedgerError::Validation(format!(
                    "category \"{}\" is an {} category, entry is an {}",
                    category.name,
                    category.direction.as_str(),
                    direction.as_str()
                )));
            }
        }

        let idempotency_key = normalize_optional_text(idempotency_key.as_deref());
        if let Some(key) = idempotency_key.as_deref() {
            if let Some(existing) =
                Self::find_by_idempotency_key(db_tx, payer_id, key, direction).await?
            {
                tracing::debug!(payer = payer_id, key, "idempotency key seen, reusing entry");
                return Ok(LedgerEntry::try_from(existing)?);
            }
        }

        let occurred_on = occurred_on.unwrap_or_else(|| Utc::now().date_naive());
        let note = normalize_optional_text(note.as_deref());
        let mut entry =
            LedgerEntry::new(budget_id, payer_id, direction, amount, occurred_on, category_id, note)?;
        entry.transfer_id = transfer_id;
        entry.idempotency_key = idempotency_key;

        match entries::ActiveModel::from(&entry).insert(db_tx).await {
            Ok(_) => Ok(entry),
            Err(insert_err) => match entry.idempotency_key.as_deref() {
                Some(key) => {
                    match Self::find_by_idempotency_key(db_tx, payer_id, key, direction).await? {
                        Some(existing) => Ok(LedgerEntry::try_from(existing)?),
                        None => Err(insert_err.into()),
                    }
                }
                None => Err(insert_err.into()),
            },
        }
    }

    async fn find_by_idempotency_key(
        db_tx: &DatabaseTransaction,
        payer_id: i64,
        key: &str,
        direction: Direction,
    ) -> LedgerResult<Option<entries::Model>> {
        Ok(entries::Entity::find()
            .filter(entries::Column::PayerId.eq(payer_id))
            .filter(entries::Column::IdempotencyKey.eq(key))
            .filter(entries::Column::Direction.eq(direction.as_str()))
            .one(db_tx)
            .await?)
    }
}
