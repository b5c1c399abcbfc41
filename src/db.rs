/*! This module defines and implements traits for interacting with the application's database. */

use rusqlite::{Connection, Error, Row, types::Type};
use rust_decimal::Decimal;

use crate::models::{Account, Budget, BudgetTracking, Transaction};

/// A trait for adding an object schema to a database.
pub trait CreateTable {
    /// Create a table for the model if it does not exist yet.
    ///
    /// # Errors
    /// Returns an error if there is an SQL error.
    fn create_table(connection: &Connection) -> Result<(), Error>;
}

/// A trait for mapping a `rusqlite::Row` from a SQLite database to a concrete rust type.
pub trait MapRow {
    /// The type to map the row to.
    type ReturnType;

    /// Convert a table row into a concrete type.
    ///
    /// # Errors
    /// Returns an error if a row column could not be converted into the
    /// corresponding struct field.
    fn map_row(row: &Row) -> Result<Self::ReturnType, Error> {
        Self::map_row_with_offset(row, 0)
    }

    /// Convert a table row into a concrete type, with columns shifted
    /// `offset` to the right, e.g. for rows from joined tables.
    ///
    /// # Errors
    /// Returns an error if a row column could not be converted into the
    /// corresponding struct field.
    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, Error>;
}

/// Create the tables for the domain models. Safe to call on a database that
/// already has them.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    Account::create_table(connection)?;
    Budget::create_table(connection)?;
    Transaction::create_table(connection)?;
    BudgetTracking::create_table(connection)?;

    Ok(())
}

/// Read a monetary amount stored as text into a [Decimal].
///
/// Amounts are stored as their canonical decimal string so that no precision
/// is lost to floating point round-tripping.
pub(crate) fn decimal_from_row(row: &Row, index: usize) -> Result<Decimal, Error> {
    let text = row.get::<_, String>(index)?;

    text.parse::<Decimal>()
        .map_err(|error| Error::FromSqlConversionFailure(index, Type::Text, Box::new(error)))
}

/// Read a JSON-encoded list of tags into a `Vec<String>`.
pub(crate) fn tags_from_row(row: &Row, index: usize) -> Result<Vec<String>, Error> {
    let text = row.get::<_, String>(index)?;

    serde_json::from_str(&text)
        .map_err(|error| Error::FromSqlConversionFailure(index, Type::Text, Box::new(error)))
}
