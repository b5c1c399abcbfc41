//! This module defines the domain data types.

pub use account::{Account, AccountType, AccountUpdate, NewAccount};
pub use budget::{Budget, BudgetCategory, BudgetUpdate, NewBudget};
pub use budget_tracking::BudgetTracking;
pub use transaction::{
    NewTransaction, TRANSACTION_CATEGORIES, Transaction, TransactionType, TransactionUpdate,
};

use serde::{Deserialize, Serialize};

mod account;
mod budget;
mod budget_tracking;
mod transaction;

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseID = i64;

/// The ID of the user that owns an entity.
///
/// Identity resolution happens upstream of this application; the ID is opaque
/// here and only used to partition every query by owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// The underlying integer ID.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}
