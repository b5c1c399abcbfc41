//! Defines the `BudgetTracking` type, a memoized spend total for a budget.

use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    db::{CreateTable, MapRow, decimal_from_row},
    models::{DatabaseID, UserID},
};

/// A cached spend total for a single budget.
///
/// This is a memoized result of the spend calculator, never a source of
/// truth: it may be stale and is only read as an optimization, with a
/// fallback to recomputation when absent. The schema enforces at most one
/// tracking row per budget, and writes are upserts so that two concurrent
/// cache populations cannot duplicate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetTracking {
    /// The ID of the tracking row.
    pub id: DatabaseID,
    /// The ID of the user that owns the tracked budget.
    pub owner: UserID,
    /// The budget this row caches the spend total for.
    pub budget: DatabaseID,
    /// The cached spend total.
    pub spent_amount: Decimal,
    /// When the cached total was last written.
    pub last_updated: OffsetDateTime,
}

impl CreateTable for BudgetTracking {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS budget_tracking (
                id INTEGER PRIMARY KEY,
                owner_id INTEGER NOT NULL,
                budget_id INTEGER NOT NULL UNIQUE,
                spent_amount TEXT NOT NULL,
                last_updated TEXT NOT NULL,
                FOREIGN KEY(budget_id) REFERENCES budget(id) ON DELETE CASCADE
                )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for BudgetTracking {
    type ReturnType = Self;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get(offset)?,
            owner: UserID::new(row.get(offset + 1)?),
            budget: row.get(offset + 2)?,
            spent_amount: decimal_from_row(row, offset + 3)?,
            last_updated: row.get(offset + 4)?,
        })
    }
}
