//! Defines the `Budget` type, a spending cap for a category over a date range.

use rusqlite::{Connection, Row, types::Type};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    db::{CreateTable, MapRow, decimal_from_row},
    models::{DatabaseID, UserID},
};

/// The fixed set of categories a budget can track.
///
/// This vocabulary overlaps with, but is not identical to, the transaction
/// category vocabulary: budgets have `Savings` and `Donations`, transactions
/// have income-only labels such as `Salary` and `Refund` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetCategory {
    Housing,
    Transportation,
    Food,
    Utilities,
    Healthcare,
    Insurance,
    Debt,
    Personal,
    Entertainment,
    Education,
    Savings,
    Gifts,
    Donations,
    Other,
}

impl BudgetCategory {
    /// The canonical display name, also used as the stored representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetCategory::Housing => "Housing",
            BudgetCategory::Transportation => "Transportation",
            BudgetCategory::Food => "Food",
            BudgetCategory::Utilities => "Utilities",
            BudgetCategory::Healthcare => "Healthcare",
            BudgetCategory::Insurance => "Insurance",
            BudgetCategory::Debt => "Debt",
            BudgetCategory::Personal => "Personal",
            BudgetCategory::Entertainment => "Entertainment",
            BudgetCategory::Education => "Education",
            BudgetCategory::Savings => "Savings",
            BudgetCategory::Gifts => "Gifts",
            BudgetCategory::Donations => "Donations",
            BudgetCategory::Other => "Other",
        }
    }

    /// Parse the stored representation back into a [BudgetCategory].
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Housing" => Some(BudgetCategory::Housing),
            "Transportation" => Some(BudgetCategory::Transportation),
            "Food" => Some(BudgetCategory::Food),
            "Utilities" => Some(BudgetCategory::Utilities),
            "Healthcare" => Some(BudgetCategory::Healthcare),
            "Insurance" => Some(BudgetCategory::Insurance),
            "Debt" => Some(BudgetCategory::Debt),
            "Personal" => Some(BudgetCategory::Personal),
            "Entertainment" => Some(BudgetCategory::Entertainment),
            "Education" => Some(BudgetCategory::Education),
            "Savings" => Some(BudgetCategory::Savings),
            "Gifts" => Some(BudgetCategory::Gifts),
            "Donations" => Some(BudgetCategory::Donations),
            "Other" => Some(BudgetCategory::Other),
            _ => None,
        }
    }
}

/// A spending cap for a category over a date range.
///
/// Budgets are created and edited directly by the user and never mutated by
/// transaction processing. The amount spent against a budget is derived on
/// read by the spend calculator, not stored on the budget itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// The ID of the budget.
    pub id: DatabaseID,
    /// The ID of the user that owns the budget.
    pub owner: UserID,
    /// The display name of the budget.
    pub name: String,
    /// The spending cap. Always positive.
    pub amount: Decimal,
    /// The category of spending this budget tracks.
    pub category: BudgetCategory,
    /// The first day the budget applies to.
    pub start_date: Date,
    /// The last day the budget applies to. Strictly after `start_date`.
    pub end_date: Date,
    /// An optional free-text description.
    pub description: Option<String>,
    /// Whether the budget is active.
    pub is_active: bool,
}

impl Budget {
    /// Whether the budget's date range overlaps the inclusive range
    /// [`start`, `end`].
    pub fn overlaps(&self, start: Date, end: Date) -> bool {
        self.start_date <= end && self.end_date >= start
    }
}

/// The data needed to create a new [Budget].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewBudget {
    /// The display name of the budget.
    pub name: String,
    /// The spending cap.
    pub amount: Decimal,
    /// The category of spending to track.
    pub category: BudgetCategory,
    /// The first day the budget applies to.
    pub start_date: Date,
    /// The last day the budget applies to.
    pub end_date: Date,
    /// An optional free-text description.
    #[serde(default)]
    pub description: Option<String>,
}

/// A partial update to a [Budget].
///
/// Absent fields keep their prior value; the merged record is re-validated
/// before it is persisted.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BudgetUpdate {
    /// Rename the budget.
    pub name: Option<String>,
    /// Change the spending cap.
    pub amount: Option<Decimal>,
    /// Change the tracked category.
    pub category: Option<BudgetCategory>,
    /// Change the first day the budget applies to.
    pub start_date: Option<Date>,
    /// Change the last day the budget applies to.
    pub end_date: Option<Date>,
    /// Change the description.
    pub description: Option<String>,
    /// Activate or deactivate the budget.
    pub is_active: Option<bool>,
}

impl CreateTable for Budget {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS budget (
                id INTEGER PRIMARY KEY,
                owner_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                amount TEXT NOT NULL,
                category TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                description TEXT,
                is_active INTEGER NOT NULL DEFAULT 1
                )",
            (),
        )?;

        connection.execute(
            "CREATE INDEX IF NOT EXISTS idx_budget_owner_dates ON budget(owner_id, start_date, end_date)",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for Budget {
    type ReturnType = Self;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self, rusqlite::Error> {
        let category_name = row.get::<_, String>(offset + 4)?;
        let category = BudgetCategory::from_name(&category_name).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                offset + 4,
                Type::Text,
                format!("unknown budget category {category_name:?}").into(),
            )
        })?;

        Ok(Self {
            id: row.get(offset)?,
            owner: UserID::new(row.get(offset + 1)?),
            name: row.get(offset + 2)?,
            amount: decimal_from_row(row, offset + 3)?,
            category,
            start_date: row.get(offset + 5)?,
            end_date: row.get(offset + 6)?,
            description: row.get(offset + 7)?,
            is_active: row.get(offset + 8)?,
        })
    }
}
