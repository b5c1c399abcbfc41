//! Applies and reverses the balance effect of a transaction.
//!
//! Every balance mutation in the application goes through [apply] and
//! [reverse]. The two are exact inverses: for any transaction, applying and
//! then reversing it leaves every account balance unchanged. Transaction
//! updates rely on this by always reversing the old record and applying the
//! new one, never by computing a delta between the two.

use rust_decimal::Decimal;

use crate::{
    Error,
    models::{Transaction, TransactionType},
    stores::AccountStore,
};

/// Apply the balance effect of `transaction` to its account(s).
///
/// Expenses subtract from the source account, incomes add to it, and
/// transfers subtract from the source and add to the destination.
///
/// # Errors
/// Returns [Error::Validation] if a transfer has no destination account and
/// [Error::NotFound] if a referenced account does not exist for the owner.
pub fn apply<S>(accounts: &mut S, transaction: &Transaction) -> Result<(), Error>
where
    S: AccountStore,
{
    shift(accounts, transaction, Decimal::ONE)
}

/// Undo the balance effect of `transaction`, restoring every affected
/// balance to its value before [apply].
///
/// # Errors
/// Returns [Error::Validation] if a transfer has no destination account and
/// [Error::NotFound] if a referenced account does not exist for the owner.
pub fn reverse<S>(accounts: &mut S, transaction: &Transaction) -> Result<(), Error>
where
    S: AccountStore,
{
    shift(accounts, transaction, Decimal::NEGATIVE_ONE)
}

fn shift<S>(accounts: &mut S, transaction: &Transaction, direction: Decimal) -> Result<(), Error>
where
    S: AccountStore,
{
    let owner = transaction.owner;
    let amount = transaction.amount * direction;

    match transaction.transaction_type {
        TransactionType::Expense => accounts.adjust_balance(owner, transaction.account, -amount),
        TransactionType::Income => accounts.adjust_balance(owner, transaction.account, amount),
        TransactionType::Transfer => {
            let destination = transaction.to_account.ok_or_else(|| {
                Error::Validation("a transfer requires a destination account".to_owned())
            })?;

            accounts.adjust_balance(owner, transaction.account, -amount)?;
            accounts.adjust_balance(owner, destination, amount)
        }
    }
}
