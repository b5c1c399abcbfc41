//! Defines the account store trait.

use rust_decimal::Decimal;

use crate::{
    Error,
    models::{Account, DatabaseID, UserID},
};

/// Handles the persistence of [Account] records.
///
/// All reads and writes are scoped to an owner; an ID that exists but belongs
/// to a different owner behaves exactly like an ID that does not exist.
pub trait AccountStore {
    /// Insert a new account into the store.
    ///
    /// The `id` of `account` is ignored; the returned account carries the
    /// store-assigned ID.
    fn insert_account(&mut self, account: &Account) -> Result<Account, Error>;

    /// Retrieve the account with `id` owned by `owner`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no such account exists for the owner.
    fn get_account(&self, owner: UserID, id: DatabaseID) -> Result<Account, Error>;

    /// Retrieve all accounts owned by `owner`.
    fn get_accounts(&self, owner: UserID) -> Result<Vec<Account>, Error>;

    /// Overwrite the stored account matching `account`'s ID and owner.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no such account exists for the owner.
    fn update_account(&mut self, account: &Account) -> Result<(), Error>;

    /// Delete the account with `id` owned by `owner`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no such account exists for the owner.
    fn delete_account(&mut self, owner: UserID, id: DatabaseID) -> Result<(), Error>;

    /// Add `delta` (which may be negative) to the balance of the account with
    /// `id` owned by `owner`.
    ///
    /// Implementations must make the read and write a single atomic step so
    /// that concurrent adjustments against the same account cannot lose an
    /// update.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no such account exists for the owner.
    fn adjust_balance(&mut self, owner: UserID, id: DatabaseID, delta: Decimal)
    -> Result<(), Error>;
}
