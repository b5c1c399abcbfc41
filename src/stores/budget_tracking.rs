//! Defines the budget tracking (cached spend total) store trait.

use rust_decimal::Decimal;

use crate::{
    Error,
    models::{BudgetTracking, DatabaseID, UserID},
};

/// Handles the persistence of [BudgetTracking] cache rows, scoped to an
/// owner.
///
/// At most one tracking row exists per budget; [BudgetTrackingStore::upsert_tracking]
/// enforces this even under concurrent cache population.
pub trait BudgetTrackingStore {
    /// Retrieve the tracking row for the budget with `budget_id`, if one
    /// exists.
    ///
    /// A missing row is not an error: the cache is an optimization and
    /// callers fall back to recomputation.
    fn get_tracking_for_budget(
        &self,
        owner: UserID,
        budget_id: DatabaseID,
    ) -> Result<Option<BudgetTracking>, Error>;

    /// Write the cached spend total for the budget with `budget_id`,
    /// replacing any existing tracking row for that budget.
    fn upsert_tracking(
        &mut self,
        owner: UserID,
        budget_id: DatabaseID,
        spent_amount: Decimal,
    ) -> Result<BudgetTracking, Error>;

    /// Remove the tracking row for the budget with `budget_id`, if one
    /// exists.
    ///
    /// Removing a row that does not exist is not an error.
    fn delete_tracking_for_budget(
        &mut self,
        owner: UserID,
        budget_id: DatabaseID,
    ) -> Result<(), Error>;
}
