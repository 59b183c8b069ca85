//! The error type shared by every ledger operation.
//!
//! The variants map the failure classes the core distinguishes:
//!
//! - [`Validation`]: bad input (non-positive amount, category/direction
//!   mismatch, negative accumulator), rejected before anything persists.
//! - [`NotFound`]: unknown owner kind or missing row.
//! - [`Integrity`]: a data-integrity symptom, e.g. an owner that should have
//!   a budget but has none.
//! - [`Concurrency`]: lock wait / serialization failure during a
//!   recomputation; the caller decides whether to retry.
//!
//! [`Validation`]: LedgerError::Validation
//! [`NotFound`]: LedgerError::NotFound
//! [`Integrity`]: LedgerError::Integrity
//! [`Concurrency`]: LedgerError::Concurrency
use sea_orm::DbErr;
use thiserror::Error;

/// Ledger custom errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Data integrity violated: {0}")]
    Integrity(String),
    #[error("Concurrent update failed: {0}")]
    Concurrency(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for LedgerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Integrity(a), Self::Integrity(b)) => a == b,
            (Self::Concurrency(a), Self::Concurrency(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
