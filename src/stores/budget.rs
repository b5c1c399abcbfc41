//! Defines the budget store trait.

use std::ops::RangeInclusive;

use time::Date;

use crate::{
    Error,
    models::{Budget, DatabaseID, UserID},
};

/// Defines how budgets should be fetched from [BudgetStore::get_budgets].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BudgetQuery {
    /// Only include budgets with this active status.
    pub is_active: Option<bool>,
    /// Only include budgets whose date range overlaps this inclusive range.
    pub overlapping: Option<RangeInclusive<Date>>,
}

/// Handles the persistence of [Budget] records, scoped to an owner.
pub trait BudgetStore {
    /// Insert a new budget into the store.
    ///
    /// The `id` of `budget` is ignored; the returned budget carries the
    /// store-assigned ID.
    fn insert_budget(&mut self, budget: &Budget) -> Result<Budget, Error>;

    /// Retrieve the budget with `id` owned by `owner`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no such budget exists for the owner.
    fn get_budget(&self, owner: UserID, id: DatabaseID) -> Result<Budget, Error>;

    /// Retrieve the budgets owned by `owner` matching `query`, most recent
    /// start date first.
    fn get_budgets(&self, owner: UserID, query: &BudgetQuery) -> Result<Vec<Budget>, Error>;

    /// Overwrite the stored budget matching `budget`'s ID and owner.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no such budget exists for the owner.
    fn update_budget(&mut self, budget: &Budget) -> Result<(), Error>;

    /// Delete the budget with `id` owned by `owner`, along with any tracking
    /// row caching its spend total.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no such budget exists for the owner.
    fn delete_budget(&mut self, owner: UserID, id: DatabaseID) -> Result<(), Error>;
}
