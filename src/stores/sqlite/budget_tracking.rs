//! Implements the SQLite backed budget tracking store.

use rusqlite::params;
use rust_decimal::Decimal;
use time::OffsetDateTime;

use crate::{
    Error,
    db::MapRow,
    models::{BudgetTracking, DatabaseID, UserID},
    stores::BudgetTrackingStore,
};

use super::SqliteLedgerStore;

const TRACKING_COLUMNS: &str = "id, owner_id, budget_id, spent_amount, last_updated";

impl BudgetTrackingStore for SqliteLedgerStore {
    fn get_tracking_for_budget(
        &self,
        owner: UserID,
        budget_id: DatabaseID,
    ) -> Result<Option<BudgetTracking>, Error> {
        let result = self
            .lock()?
            .prepare(&format!(
                "SELECT {TRACKING_COLUMNS} FROM budget_tracking
                 WHERE budget_id = ?1 AND owner_id = ?2"
            ))?
            .query_row(params![budget_id, owner.as_i64()], BudgetTracking::map_row);

        match result {
            Ok(tracking) => Ok(Some(tracking)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn upsert_tracking(
        &mut self,
        owner: UserID,
        budget_id: DatabaseID,
        spent_amount: Decimal,
    ) -> Result<BudgetTracking, Error> {
        // The UNIQUE constraint on budget_id makes concurrent cache
        // populations converge on a single row instead of duplicating it.
        let tracking = self
            .lock()?
            .prepare(&format!(
                "INSERT INTO budget_tracking (owner_id, budget_id, spent_amount, last_updated)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(budget_id) DO UPDATE
                 SET spent_amount = excluded.spent_amount, last_updated = excluded.last_updated
                 RETURNING {TRACKING_COLUMNS}"
            ))?
            .query_row(
                params![
                    owner.as_i64(),
                    budget_id,
                    spent_amount.to_string(),
                    OffsetDateTime::now_utc(),
                ],
                BudgetTracking::map_row,
            )?;

        Ok(tracking)
    }

    fn delete_tracking_for_budget(
        &mut self,
        owner: UserID,
        budget_id: DatabaseID,
    ) -> Result<(), Error> {
        self.lock()?.execute(
            "DELETE FROM budget_tracking WHERE budget_id = ?1 AND owner_id = ?2",
            params![budget_id, owner.as_i64()],
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::{
        models::UserID, stores::BudgetTrackingStore, stores::sqlite::test_utils::get_test_store,
    };

    #[test]
    fn missing_tracking_is_none() {
        let store = get_test_store();

        let tracking = store
            .get_tracking_for_budget(UserID::new(1), 1)
            .unwrap();

        assert_eq!(tracking, None);
    }

    #[test]
    fn upsert_creates_then_replaces() {
        let mut store = get_test_store();
        let owner = UserID::new(1);

        let first = store
            .upsert_tracking(owner, 1, Decimal::new(15000, 2))
            .unwrap();
        let second = store
            .upsert_tracking(owner, 1, Decimal::new(20000, 2))
            .unwrap();

        // Replaced, not duplicated.
        assert_eq!(first.id, second.id);
        assert_eq!(
            store
                .get_tracking_for_budget(owner, 1)
                .unwrap()
                .map(|tracking| tracking.spent_amount),
            Some(Decimal::new(20000, 2))
        );
    }

    #[test]
    fn delete_is_idempotent() {
        let mut store = get_test_store();
        let owner = UserID::new(1);
        store
            .upsert_tracking(owner, 1, Decimal::new(100, 0))
            .unwrap();

        store.delete_tracking_for_budget(owner, 1).unwrap();
        store.delete_tracking_for_budget(owner, 1).unwrap();

        assert_eq!(store.get_tracking_for_budget(owner, 1).unwrap(), None);
    }
}
