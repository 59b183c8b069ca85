//! Command structs for ledger write operations.
//!
//! These types group parameters for entry creation, transfers, and the
//! top-up/expense conveniences, keeping call sites readable and avoiding
//! long argument lists.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{Direction, Money, OwnerRef};

/// Common metadata for entry creation.
///
/// `occurred_on` defaults to today when unset; `idempotency_key` lets a
/// caller retry a write without double-posting.
#[derive(Clone, Debug, Default)]
pub struct EntryMeta {
    pub category_id: Option<Uuid>,
    pub note: Option<String>,
    pub idempotency_key: Option<String>,
    pub occurred_on: Option<NaiveDate>,
}

impl EntryMeta {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn occurred_on(mut self, date: NaiveDate) -> Self {
        self.occurred_on = Some(date);
        self
    }
}

/// Create a single ledger entry against a budget (no recalculation).
#[derive(Clone, Debug)]
pub struct CreateEntryCmd {
    pub budget_id: Uuid,
    pub payer_id: i64,
    pub direction: Direction,
    pub amount: Money,
    pub meta: EntryMeta,
}

impl CreateEntryCmd {
    #[must_use]
    pub fn new(budget_id: Uuid, payer_id: i64, direction: Direction, amount: Money) -> Self {
        Self {
            budget_id,
            payer_id,
            direction,
            amount,
            meta: EntryMeta::new(),
        }
    }

    #[must_use]
    pub fn meta(mut self, meta: EntryMeta) -> Self {
        self.meta = meta;
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.meta.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.meta.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn occurred_on(mut self, date: NaiveDate) -> Self {
        self.meta.occurred_on = Some(date);
        self
    }

    #[must_use]
    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.meta.idempotency_key = Some(key.into());
        self
    }
}

/// Move funds between two owners' budgets as one atomic unit.
#[derive(Clone, Debug)]
pub struct TransferCmd {
    pub from: OwnerRef,
    pub to: OwnerRef,
    pub payer_id: i64,
    pub amount: Money,
    pub meta: EntryMeta,
}

impl TransferCmd {
    #[must_use]
    pub fn new(from: OwnerRef, to: OwnerRef, payer_id: i64, amount: Money) -> Self {
        Self {
            from,
            to,
            payer_id,
            amount,
            meta: EntryMeta::new(),
        }
    }

    #[must_use]
    pub fn meta(mut self, meta: EntryMeta) -> Self {
        self.meta = meta;
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.meta.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.meta.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn occurred_on(mut self, date: NaiveDate) -> Self {
        self.meta.occurred_on = Some(date);
        self
    }

    #[must_use]
    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.meta.idempotency_key = Some(key.into());
        self
    }
}

/// Record an income entry against the user's own budget.
#[derive(Clone, Debug)]
pub struct TopUpCmd {
    pub user_id: i64,
    pub amount: Money,
    pub meta: EntryMeta,
}

impl TopUpCmd {
    #[must_use]
    pub fn new(user_id: i64, amount: Money) -> Self {
        Self {
            user_id,
            amount,
            meta: EntryMeta::new(),
        }
    }

    #[must_use]
    pub fn meta(mut self, meta: EntryMeta) -> Self {
        self.meta = meta;
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.meta.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.meta.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn occurred_on(mut self, date: NaiveDate) -> Self {
        self.meta.occurred_on = Some(date);
        self
    }

    #[must_use]
    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.meta.idempotency_key = Some(key.into());
        self
    }
}

/// Record an expense entry against the user's own budget.
#[derive(Clone, Debug)]
pub struct ExpenseCmd {
    pub user_id: i64,
    pub amount: Money,
    pub meta: EntryMeta,
}

impl ExpenseCmd {
    #[must_use]
    pub fn new(user_id: i64, amount: Money) -> Self {
        Self {
            user_id,
            amount,
            meta: EntryMeta::new(),
        }
    }

    #[must_use]
    pub fn meta(mut self, meta: EntryMeta) -> Self {
        self.meta = meta;
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.meta.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.meta.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn occurred_on(mut self, date: NaiveDate) -> Self {
        self.meta.occurred_on = Some(date);
        self
    }

    #[must_use]
    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.meta.idempotency_key = Some(key.into());
        self
    }
}
