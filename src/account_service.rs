//! Account CRUD.
//!
//! Deleting an account that transactions still reference is refused: the
//! transactions' balance effects would become unanchored. Deactivating the
//! account keeps the history intact instead.

use crate::{
    Error,
    models::{Account, AccountUpdate, DatabaseID, NewAccount, UserID},
    stores::LedgerStore,
};

/// Create an account for `owner`.
///
/// # Errors
/// Returns [Error::Validation] if the name is empty.
pub fn create_account<L>(
    ledger: &mut L,
    owner: UserID,
    new_account: NewAccount,
) -> Result<Account, Error>
where
    L: LedgerStore,
{
    if new_account.name.trim().is_empty() {
        return Err(Error::Validation("a name is required".to_owned()));
    }

    let created = ledger.insert_account(&Account {
        id: 0,
        owner,
        name: new_account.name,
        account_type: new_account.account_type,
        balance: new_account.balance,
        currency: new_account.currency,
        description: new_account.description,
        is_active: true,
    })?;

    tracing::info!(account_id = created.id, "created account");

    Ok(created)
}

/// Update the account with `id` owned by `owner`. Absent fields keep their
/// prior value.
///
/// # Errors
/// Returns [Error::NotFound] if no such account exists for the owner and
/// [Error::Validation] if the merged record is invalid.
pub fn update_account<L>(
    ledger: &mut L,
    owner: UserID,
    id: DatabaseID,
    update: AccountUpdate,
) -> Result<Account, Error>
where
    L: LedgerStore,
{
    let existing = ledger.get_account(owner, id)?;
    let merged = Account {
        id: existing.id,
        owner: existing.owner,
        name: update.name.unwrap_or(existing.name),
        account_type: update.account_type.unwrap_or(existing.account_type),
        balance: update.balance.unwrap_or(existing.balance),
        currency: update.currency.unwrap_or(existing.currency),
        description: update.description.or(existing.description),
        is_active: update.is_active.unwrap_or(existing.is_active),
    };

    if merged.name.trim().is_empty() {
        return Err(Error::Validation("a name is required".to_owned()));
    }

    ledger.update_account(&merged)?;

    Ok(merged)
}

/// Delete the account with `id` owned by `owner`.
///
/// # Errors
/// Returns [Error::NotFound] if no such account exists for the owner and
/// [Error::Conflict] if any transaction still references it.
pub fn delete_account<L>(ledger: &mut L, owner: UserID, id: DatabaseID) -> Result<(), Error>
where
    L: LedgerStore,
{
    ledger.get_account(owner, id)?;

    let references = ledger.count_transactions_for_account(owner, id)?;
    if references > 0 {
        return Err(Error::Conflict(
            "cannot delete an account that transactions reference, deactivate it instead"
                .to_owned(),
        ));
    }

    ledger.delete_account(owner, id)?;

    tracing::info!(account_id = id, "deleted account");

    Ok(())
}
