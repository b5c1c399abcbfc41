//! Defines the `Account` type, the holder of a running balance.

use rusqlite::{Connection, Row, types::Type};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    db::{CreateTable, MapRow, decimal_from_row},
    models::{DatabaseID, UserID},
};

/// The kind of financial account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    Checking,
    Savings,
    #[serde(rename = "Credit Card")]
    CreditCard,
    Cash,
    Investment,
    Other,
}

impl AccountType {
    /// The canonical display name, also used as the stored representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Checking => "Checking",
            AccountType::Savings => "Savings",
            AccountType::CreditCard => "Credit Card",
            AccountType::Cash => "Cash",
            AccountType::Investment => "Investment",
            AccountType::Other => "Other",
        }
    }

    /// Parse the stored representation back into an [AccountType].
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Checking" => Some(AccountType::Checking),
            "Savings" => Some(AccountType::Savings),
            "Credit Card" => Some(AccountType::CreditCard),
            "Cash" => Some(AccountType::Cash),
            "Investment" => Some(AccountType::Investment),
            "Other" => Some(AccountType::Other),
            _ => None,
        }
    }
}

/// A financial account with a running balance.
///
/// The balance is the running sum of the effects of every live transaction
/// that references the account as source or destination. It is only ever
/// changed through the balance adjuster, never set directly by transaction
/// processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// The ID of the account.
    pub id: DatabaseID,
    /// The ID of the user that owns the account.
    pub owner: UserID,
    /// The display name of the account.
    pub name: String,
    /// The kind of account.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// The current balance. May be negative.
    pub balance: Decimal,
    /// The ISO currency code, e.g. "USD".
    pub currency: String,
    /// An optional free-text description.
    pub description: Option<String>,
    /// Whether the account is active. Inactive accounts are kept for history.
    pub is_active: bool,
}

/// The data needed to create a new [Account].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewAccount {
    /// The display name of the account.
    pub name: String,
    /// The kind of account.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// The opening balance. Defaults to zero.
    #[serde(default)]
    pub balance: Decimal,
    /// The ISO currency code. Defaults to "USD".
    #[serde(default = "default_currency")]
    pub currency: String,
    /// An optional free-text description.
    #[serde(default)]
    pub description: Option<String>,
}

fn default_currency() -> String {
    "USD".to_owned()
}

/// A partial update to an [Account]. Absent fields keep their prior value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AccountUpdate {
    /// Rename the account.
    pub name: Option<String>,
    /// Change the kind of account.
    #[serde(rename = "type")]
    pub account_type: Option<AccountType>,
    /// Set the balance directly, e.g. to correct an opening balance.
    pub balance: Option<Decimal>,
    /// Change the currency code.
    pub currency: Option<String>,
    /// Change the description.
    pub description: Option<String>,
    /// Activate or deactivate the account.
    pub is_active: Option<bool>,
}

impl CreateTable for Account {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS account (
                id INTEGER PRIMARY KEY,
                owner_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                type TEXT NOT NULL,
                balance TEXT NOT NULL,
                currency TEXT NOT NULL DEFAULT 'USD',
                description TEXT,
                is_active INTEGER NOT NULL DEFAULT 1
                )",
            (),
        )?;

        connection.execute(
            "CREATE INDEX IF NOT EXISTS idx_account_owner ON account(owner_id)",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for Account {
    type ReturnType = Self;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self, rusqlite::Error> {
        let type_name = row.get::<_, String>(offset + 3)?;
        let account_type = AccountType::from_name(&type_name).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                offset + 3,
                Type::Text,
                format!("unknown account type {type_name:?}").into(),
            )
        })?;

        Ok(Self {
            id: row.get(offset)?,
            owner: UserID::new(row.get(offset + 1)?),
            name: row.get(offset + 2)?,
            account_type,
            balance: decimal_from_row(row, offset + 4)?,
            currency: row.get(offset + 5)?,
            description: row.get(offset + 6)?,
            is_active: row.get(offset + 7)?,
        })
    }
}

#[cfg(test)]
mod account_type_tests {
    use super::AccountType;

    #[test]
    fn stored_name_round_trips() {
        let types = [
            AccountType::Checking,
            AccountType::Savings,
            AccountType::CreditCard,
            AccountType::Cash,
            AccountType::Investment,
            AccountType::Other,
        ];

        for account_type in types {
            assert_eq!(
                AccountType::from_name(account_type.as_str()),
                Some(account_type)
            );
        }
    }

    #[test]
    fn credit_card_serializes_with_space() {
        let json = serde_json::to_string(&AccountType::CreditCard).unwrap();

        assert_eq!(json, "\"Credit Card\"");
    }
}
