//! This file defines the type `Transaction`, the core type of the budgeting
//! part of the application.

use rusqlite::{Connection, Row, types::Type};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    db::{CreateTable, MapRow, decimal_from_row, tags_from_row},
    models::{DatabaseID, UserID},
};

/// The direction of a transaction's effect on account balances.
///
/// The stored amount is always a positive magnitude; the sign of the balance
/// effect is derived from this type and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money leaving the source account.
    Expense,
    /// Money entering the source account.
    Income,
    /// Money moving from the source account to the destination account.
    Transfer,
}

impl TransactionType {
    /// The stored representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Expense => "expense",
            TransactionType::Income => "income",
            TransactionType::Transfer => "transfer",
        }
    }

    /// Parse the stored representation back into a [TransactionType].
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "expense" => Some(TransactionType::Expense),
            "income" => Some(TransactionType::Income),
            "transfer" => Some(TransactionType::Transfer),
            _ => None,
        }
    }
}

/// The canonical transaction category vocabulary.
///
/// Transactions store their category as free text rather than as a foreign
/// key so that historical data with drifting labels ("food", "Utilities ")
/// keeps working; new labels are validated by fuzzy-matching against this
/// list. See [crate::category_match].
pub const TRANSACTION_CATEGORIES: [&str; 16] = [
    "Housing",
    "Transportation",
    "Food",
    "Utilities",
    "Healthcare",
    "Insurance",
    "Debt",
    "Personal",
    "Entertainment",
    "Education",
    "Salary",
    "Gifts",
    "Refund",
    "Investment",
    "Transfer",
    "Other",
];

/// A single movement of money: an expense, an income, or a transfer between
/// two accounts.
///
/// Invariant: `amount` is always positive and `to_account` is present exactly
/// when `transaction_type` is [TransactionType::Transfer]. Each transaction's
/// balance effect is applied to its account(s) exactly once at any point in
/// time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: DatabaseID,
    /// The ID of the user that owns the transaction.
    pub owner: UserID,
    /// The source account.
    pub account: DatabaseID,
    /// The direction of the balance effect.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The magnitude of the transaction. Always positive.
    pub amount: Decimal,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The category label as entered by the user.
    pub category: String,
    /// When the transaction happened.
    pub date: Date,
    /// The destination account. Present exactly for transfers.
    pub to_account: Option<DatabaseID>,
    /// Whether the transaction has been reconciled against a statement.
    pub is_reconciled: bool,
    /// Free-form labels attached by the user.
    pub tags: Vec<String>,
    /// Optional free-text notes.
    pub notes: Option<String>,
}

/// The data needed to create a new [Transaction].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewTransaction {
    /// The source account.
    pub account: DatabaseID,
    /// The direction of the balance effect.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The magnitude of the transaction.
    pub amount: Decimal,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The category label.
    pub category: String,
    /// When the transaction happened. Defaults to today when absent.
    #[serde(default)]
    pub date: Option<Date>,
    /// The destination account, required for transfers.
    #[serde(default)]
    pub to_account: Option<DatabaseID>,
    /// Free-form labels.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Optional free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// A partial update to a [Transaction].
///
/// Absent fields keep their prior value; the merged record is re-validated
/// before its balance effect is applied.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransactionUpdate {
    /// Move the transaction to a different source account.
    pub account: Option<DatabaseID>,
    /// Change the direction of the balance effect.
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    /// Change the magnitude.
    pub amount: Option<Decimal>,
    /// Change the description.
    pub description: Option<String>,
    /// Change the category label.
    pub category: Option<String>,
    /// Change the date.
    pub date: Option<Date>,
    /// Change the destination account. Ignored unless the merged record is a
    /// transfer.
    pub to_account: Option<DatabaseID>,
    /// Mark the transaction as reconciled or not.
    pub is_reconciled: Option<bool>,
    /// Replace the tags.
    pub tags: Option<Vec<String>>,
    /// Replace the notes.
    pub notes: Option<String>,
}

impl CreateTable for Transaction {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY,
                owner_id INTEGER NOT NULL,
                account_id INTEGER NOT NULL,
                type TEXT NOT NULL,
                amount TEXT NOT NULL,
                description TEXT NOT NULL,
                category TEXT NOT NULL,
                date TEXT NOT NULL,
                to_account_id INTEGER,
                is_reconciled INTEGER NOT NULL DEFAULT 0,
                tags TEXT NOT NULL DEFAULT '[]',
                notes TEXT,
                FOREIGN KEY(account_id) REFERENCES account(id),
                FOREIGN KEY(to_account_id) REFERENCES account(id)
                )",
            (),
        )?;

        connection.execute(
            "CREATE INDEX IF NOT EXISTS idx_transaction_owner_date ON \"transaction\"(owner_id, date)",
            (),
        )?;
        connection.execute(
            "CREATE INDEX IF NOT EXISTS idx_transaction_account ON \"transaction\"(account_id)",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for Transaction {
    type ReturnType = Self;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self, rusqlite::Error> {
        let type_name = row.get::<_, String>(offset + 3)?;
        let transaction_type = TransactionType::from_name(&type_name).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                offset + 3,
                Type::Text,
                format!("unknown transaction type {type_name:?}").into(),
            )
        })?;

        Ok(Self {
            id: row.get(offset)?,
            owner: UserID::new(row.get(offset + 1)?),
            account: row.get(offset + 2)?,
            transaction_type,
            amount: decimal_from_row(row, offset + 4)?,
            description: row.get(offset + 5)?,
            category: row.get(offset + 6)?,
            date: row.get(offset + 7)?,
            to_account: row.get(offset + 8)?,
            is_reconciled: row.get(offset + 9)?,
            tags: tags_from_row(row, offset + 10)?,
            notes: row.get(offset + 11)?,
        })
    }
}

#[cfg(test)]
mod transaction_type_tests {
    use super::TransactionType;

    #[test]
    fn stored_name_round_trips() {
        for transaction_type in [
            TransactionType::Expense,
            TransactionType::Income,
            TransactionType::Transfer,
        ] {
            assert_eq!(
                TransactionType::from_name(transaction_type.as_str()),
                Some(transaction_type)
            );
        }
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&TransactionType::Expense).unwrap();

        assert_eq!(json, "\"expense\"");
    }
}
