//! Budget/ledger core for a social finance tracker.
//!
//! One [`Budget`] per owner (user, group, or shared event) caches the totals
//! derived from an append-mostly ledger of [`LedgerEntry`] records. The
//! [`Ledger`] service exposes the write path (entries, atomic transfers,
//! recalculation) and the read path (history listing, dashboard analytics)
//! over a sea-orm database connection. The web layer, social graph, and
//! owner CRUD live outside this crate and call in through `Ledger`.

pub use budgets::{Budget, BudgetDefaults, BudgetSnapshot};
pub use categories::{
    Category, OTHER_EXPENSES_NAME, TOP_UP_NAME, TRANSFER_IN_NAME, TRANSFER_OUT_NAME,
};
pub use commands::{CreateEntryCmd, EntryMeta, ExpenseCmd, TopUpCmd, TransferCmd};
pub use currency::Currency;
pub use entries::{Direction, LedgerEntry};
pub use error::LedgerError;
pub use money::Money;
pub use ops::{
    CashflowPoint, CategoryStat, Contribution, DailyTotal, EntryListFilter, EntryScope,
    GoalProgress, Kpi, Ledger, LedgerBuilder,
};
pub use owner::{OwnerKind, OwnerRef};

mod budgets;
mod categories;
mod commands;
mod currency;
mod entries;
mod error;
mod money;
mod ops;
mod owner;

type LedgerResult<T> = Result<T, LedgerError>;
