//! Contains traits and implementations for objects that store the domain
//! [models](crate::models).
//!
//! The service layer only ever talks to the traits defined here; the SQLite
//! implementations live in [sqlite].

mod account;
mod budget;
mod budget_tracking;
mod transaction;

pub mod sqlite;

pub use account::AccountStore;
pub use budget::{BudgetQuery, BudgetStore};
pub use budget_tracking::BudgetTrackingStore;
pub use transaction::{SortOrder, TransactionQuery, TransactionStore};

use crate::Error;

/// The durable store for every domain collection, plus a transactional
/// boundary for multi-step mutations.
///
/// The transaction lifecycle operations mutate a transaction row and one or
/// two account balances together; [LedgerStore::atomically] lets the service
/// layer wrap those steps so a mid-sequence failure cannot leave a balance
/// half-updated.
pub trait LedgerStore:
    AccountStore + BudgetStore + TransactionStore + BudgetTrackingStore
{
    /// Run `operation` inside a single transactional boundary.
    ///
    /// If `operation` returns an error, every store write it performed is
    /// rolled back and the error is returned unchanged.
    fn atomically<R, F>(&mut self, operation: F) -> Result<R, Error>
    where
        F: FnOnce(&mut Self) -> Result<R, Error>;
}
