//! Defines the transaction store trait.

use std::ops::RangeInclusive;

use rust_decimal::Decimal;
use time::Date;

use crate::{
    Error,
    models::{DatabaseID, Transaction, TransactionType, UserID},
};

/// The order to sort transactions in a [TransactionQuery].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Sort in order of increasing value.
    Ascending,
    /// Sort in order of decreasing value.
    Descending,
}

/// Defines how transactions should be fetched from
/// [TransactionStore::get_transactions].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransactionQuery {
    /// Include transactions that reference this account as source or
    /// destination.
    pub account: Option<DatabaseID>,
    /// Include transactions of this type.
    pub transaction_type: Option<TransactionType>,
    /// Include transactions with exactly this stored category label.
    ///
    /// This is a strict filter for client-driven listing; fuzzy category
    /// matching happens in the service layer, not the store.
    pub category: Option<String>,
    /// Include transactions within `date_range` (inclusive).
    pub date_range: Option<RangeInclusive<Date>>,
    /// Include transactions with at least this amount.
    pub min_amount: Option<Decimal>,
    /// Include transactions with at most this amount.
    pub max_amount: Option<Decimal>,
    /// Include transactions whose description contains this text
    /// (case-insensitive).
    pub search: Option<String>,
    /// Orders transactions by date. None returns transactions in the order
    /// they are stored.
    pub sort_date: Option<SortOrder>,
    /// Selects up to the first N (`limit`) transactions.
    pub limit: Option<u64>,
    /// Skips the first N (`offset`) transactions.
    pub offset: u64,
}

/// Handles the persistence of [Transaction] records, scoped to an owner.
pub trait TransactionStore {
    /// Insert a new transaction into the store.
    ///
    /// The `id` of `transaction` is ignored; the returned transaction carries
    /// the store-assigned ID.
    fn insert_transaction(&mut self, transaction: &Transaction) -> Result<Transaction, Error>;

    /// Retrieve the transaction with `id` owned by `owner`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no such transaction exists for the owner.
    fn get_transaction(&self, owner: UserID, id: DatabaseID) -> Result<Transaction, Error>;

    /// Retrieve the transactions owned by `owner` matching `query`.
    fn get_transactions(
        &self,
        owner: UserID,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>, Error>;

    /// Count the transactions owned by `owner` matching `query`, ignoring
    /// `limit` and `offset`.
    fn count_transactions(&self, owner: UserID, query: &TransactionQuery) -> Result<u64, Error>;

    /// Count the transactions owned by `owner` that reference the account
    /// with `account_id` as source or destination.
    fn count_transactions_for_account(
        &self,
        owner: UserID,
        account_id: DatabaseID,
    ) -> Result<u64, Error>;

    /// Overwrite the stored transaction matching `transaction`'s ID and
    /// owner.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no such transaction exists for the owner.
    fn update_transaction(&mut self, transaction: &Transaction) -> Result<(), Error>;

    /// Delete the transaction with `id` owned by `owner`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no such transaction exists for the owner.
    fn delete_transaction(&mut self, owner: UserID, id: DatabaseID) -> Result<(), Error>;
}
