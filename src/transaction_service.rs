//! The transaction lifecycle: create, update, and delete transactions while
//! keeping account balances and cached spend totals consistent.
//!
//! Each mutation runs inside [LedgerStore::atomically] so the transaction
//! row, the balance adjustments, and the cache invalidation land together or
//! not at all.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use time::{Date, Duration, OffsetDateTime};

use crate::{
    Error, balance,
    category_match::categories_match,
    models::{
        DatabaseID, NewTransaction, TRANSACTION_CATEGORIES, Transaction, TransactionType,
        TransactionUpdate, UserID,
    },
    spending,
    stores::{LedgerStore, TransactionQuery},
};

/// A page of transactions along with the total count ignoring pagination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionListing {
    /// The requested page of transactions.
    pub transactions: Vec<Transaction>,
    /// The total number of matching transactions.
    pub total: u64,
}

/// Create a transaction for `owner` and apply its balance effect.
///
/// The date defaults to today when absent. Both referenced accounts must
/// exist and belong to `owner`.
///
/// # Errors
/// Returns [Error::Validation] if the record is invalid and
/// [Error::NotFound] if a referenced account does not exist for the owner.
pub fn create_transaction<L>(
    ledger: &mut L,
    owner: UserID,
    new_transaction: NewTransaction,
) -> Result<Transaction, Error>
where
    L: LedgerStore,
{
    let date = new_transaction
        .date
        .unwrap_or_else(|| OffsetDateTime::now_utc().date());
    let to_account = match new_transaction.transaction_type {
        TransactionType::Transfer => new_transaction.to_account,
        _ => None,
    };
    let transaction = Transaction {
        id: 0,
        owner,
        account: new_transaction.account,
        transaction_type: new_transaction.transaction_type,
        amount: new_transaction.amount,
        description: new_transaction.description,
        category: new_transaction.category,
        date,
        to_account,
        is_reconciled: false,
        tags: new_transaction.tags,
        notes: new_transaction.notes,
    };

    validate(&transaction)?;

    ledger.atomically(|ledger| {
        ledger.get_account(owner, transaction.account)?;
        if let Some(destination) = transaction.to_account {
            ledger.get_account(owner, destination)?;
        }

        let created = ledger.insert_transaction(&transaction)?;
        balance::apply(ledger, &created)?;
        spending::invalidate_tracking(ledger, owner, &[(created.category.as_str(), created.date)])?;

        tracing::info!(
            transaction_id = created.id,
            transaction_type = created.transaction_type.as_str(),
            "created transaction"
        );

        Ok(created)
    })
}

/// Update the transaction with `id` owned by `owner`.
///
/// The old record's balance effect is fully reversed and the merged record's
/// effect applied, so the accounts end up exactly as if the merged record
/// had been created instead of the old one.
///
/// # Errors
/// Returns [Error::NotFound] if no such transaction exists for the owner and
/// [Error::Validation] if the merged record is invalid.
pub fn update_transaction<L>(
    ledger: &mut L,
    owner: UserID,
    id: DatabaseID,
    update: TransactionUpdate,
) -> Result<Transaction, Error>
where
    L: LedgerStore,
{
    ledger.atomically(|ledger| {
        let existing = ledger.get_transaction(owner, id)?;
        let merged = merge(&existing, update);

        validate(&merged)?;

        balance::reverse(ledger, &existing)?;
        balance::apply(ledger, &merged)?;
        ledger.update_transaction(&merged)?;
        spending::invalidate_tracking(
            ledger,
            owner,
            &[
                (existing.category.as_str(), existing.date),
                (merged.category.as_str(), merged.date),
            ],
        )?;

        tracing::info!(transaction_id = id, "updated transaction");

        Ok(merged)
    })
}

/// Delete the transaction with `id` owned by `owner`, restoring the affected
/// account balances to their values before the transaction existed.
///
/// # Errors
/// Returns [Error::NotFound] if no such transaction exists for the owner.
pub fn delete_transaction<L>(ledger: &mut L, owner: UserID, id: DatabaseID) -> Result<(), Error>
where
    L: LedgerStore,
{
    ledger.atomically(|ledger| {
        let existing = ledger.get_transaction(owner, id)?;

        balance::reverse(ledger, &existing)?;
        ledger.delete_transaction(owner, id)?;
        spending::invalidate_tracking(ledger, owner, &[(existing.category.as_str(), existing.date)])?;

        tracing::info!(transaction_id = id, "deleted transaction");

        Ok(())
    })
}

/// Retrieve the transactions matching `query` along with the total count
/// ignoring pagination.
pub fn list_transactions<L>(
    ledger: &L,
    owner: UserID,
    query: &TransactionQuery,
) -> Result<TransactionListing, Error>
where
    L: LedgerStore,
{
    let transactions = ledger.get_transactions(owner, query)?;
    let total = ledger.count_transactions(owner, query)?;

    Ok(TransactionListing {
        transactions,
        total,
    })
}

/// Income and expense totals per category label over a date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionStats {
    /// The headline totals.
    pub summary: StatsSummary,
    /// Income totals per category, largest first.
    pub income_by_category: Vec<CategoryTotal>,
    /// Expense totals per category, largest first.
    pub expense_by_category: Vec<CategoryTotal>,
}

/// The headline numbers for a stats window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    /// The total income over the window.
    pub total_income: Decimal,
    /// The total expenses over the window.
    pub total_expense: Decimal,
    /// Income minus expenses.
    pub net_income: Decimal,
    /// Net income as a percentage of total income, zero when there is no
    /// income.
    pub savings_rate: Decimal,
}

/// The total amount and record count for one category label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// The category label as stored on the transactions.
    pub category: String,
    /// The total amount for the category.
    pub total_amount: Decimal,
    /// The number of transactions in the category.
    pub count: u64,
}

/// The inclusive date window for a stats request.
///
/// Explicit dates win; otherwise the window ends today and spans the named
/// period ("week", "month", or "year"), defaulting to a month.
pub fn stats_window(
    period: Option<&str>,
    start_date: Option<Date>,
    end_date: Option<Date>,
) -> (Date, Date) {
    let end = end_date.unwrap_or_else(|| OffsetDateTime::now_utc().date());
    let start = start_date.unwrap_or_else(|| {
        let days = match period {
            Some("week") => 7,
            Some("year") => 365,
            _ => 30,
        };

        end.saturating_sub(Duration::days(days))
    });

    (start, end)
}

/// Aggregate income and expense totals per category between `start_date`
/// and `end_date` (inclusive). Transfers are internal movements and are
/// excluded.
pub fn transaction_stats<L>(
    ledger: &L,
    owner: UserID,
    start_date: Date,
    end_date: Date,
) -> Result<TransactionStats, Error>
where
    L: LedgerStore,
{
    let transactions = ledger.get_transactions(
        owner,
        &TransactionQuery {
            date_range: Some(start_date..=end_date),
            ..TransactionQuery::default()
        },
    )?;

    let mut income: BTreeMap<String, (Decimal, u64)> = BTreeMap::new();
    let mut expense: BTreeMap<String, (Decimal, u64)> = BTreeMap::new();

    for transaction in &transactions {
        let totals = match transaction.transaction_type {
            TransactionType::Income => &mut income,
            TransactionType::Expense => &mut expense,
            TransactionType::Transfer => continue,
        };

        let entry = totals
            .entry(transaction.category.clone())
            .or_insert((Decimal::ZERO, 0));
        entry.0 += transaction.amount.abs();
        entry.1 += 1;
    }

    let total_income: Decimal = income.values().map(|(total, _)| *total).sum();
    let total_expense: Decimal = expense.values().map(|(total, _)| *total).sum();
    let net_income = total_income - total_expense;
    let savings_rate = if total_income > Decimal::ZERO {
        net_income / total_income * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };

    Ok(TransactionStats {
        summary: StatsSummary {
            total_income,
            total_expense,
            net_income,
            savings_rate,
        },
        income_by_category: into_sorted_totals(income),
        expense_by_category: into_sorted_totals(expense),
    })
}

fn into_sorted_totals(totals: BTreeMap<String, (Decimal, u64)>) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, (total_amount, count))| CategoryTotal {
            category,
            total_amount,
            count,
        })
        .collect();
    totals.sort_by(|a, b| b.total_amount.cmp(&a.total_amount));

    totals
}

fn merge(existing: &Transaction, update: TransactionUpdate) -> Transaction {
    let transaction_type = update
        .transaction_type
        .unwrap_or(existing.transaction_type);
    let to_account = match transaction_type {
        TransactionType::Transfer => update.to_account.or(existing.to_account),
        _ => None,
    };

    Transaction {
        id: existing.id,
        owner: existing.owner,
        account: update.account.unwrap_or(existing.account),
        transaction_type,
        amount: update.amount.unwrap_or(existing.amount),
        description: update.description.unwrap_or_else(|| existing.description.clone()),
        category: update.category.unwrap_or_else(|| existing.category.clone()),
        date: update.date.unwrap_or(existing.date),
        to_account,
        is_reconciled: update.is_reconciled.unwrap_or(existing.is_reconciled),
        tags: update.tags.unwrap_or_else(|| existing.tags.clone()),
        notes: update.notes.or_else(|| existing.notes.clone()),
    }
}

fn validate(transaction: &Transaction) -> Result<(), Error> {
    if transaction.description.trim().is_empty() {
        return Err(Error::Validation("a description is required".to_owned()));
    }

    if transaction.amount <= Decimal::ZERO {
        return Err(Error::Validation(
            "the amount must be greater than zero".to_owned(),
        ));
    }

    let category_known = TRANSACTION_CATEGORIES
        .iter()
        .any(|canonical| categories_match(&transaction.category, canonical));
    if !category_known {
        return Err(Error::Validation(format!(
            "unknown category {:?}",
            transaction.category
        )));
    }

    if transaction.transaction_type == TransactionType::Transfer {
        let destination = transaction.to_account.ok_or_else(|| {
            Error::Validation("a transfer requires a destination account".to_owned())
        })?;

        if destination == transaction.account {
            return Err(Error::Validation(
                "a transfer cannot use the same account as source and destination".to_owned(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod transaction_service_tests {
    use rust_decimal::Decimal;
    use time::macros::date;

    use super::{
        create_transaction, delete_transaction, list_transactions, stats_window,
        transaction_stats, update_transaction,
    };
    use crate::{
        Error,
        models::{
            Account, AccountType, DatabaseID, NewTransaction, TransactionType, TransactionUpdate,
            UserID,
        },
        stores::{
            AccountStore, TransactionQuery,
            sqlite::{SqliteLedgerStore, test_utils::get_test_store},
        },
    };

    const OWNER: UserID = UserID::new(1);

    fn insert_account(store: &mut SqliteLedgerStore, balance: Decimal) -> Account {
        store
            .insert_account(&Account {
                id: 0,
                owner: OWNER,
                name: "Everyday".to_owned(),
                account_type: AccountType::Checking,
                balance,
                currency: "USD".to_owned(),
                description: None,
                is_active: true,
            })
            .unwrap()
    }

    fn new_expense(account: DatabaseID, amount: Decimal) -> NewTransaction {
        NewTransaction {
            account,
            transaction_type: TransactionType::Expense,
            amount,
            description: "Groceries".to_owned(),
            category: "Food".to_owned(),
            date: Some(date!(2025 - 06 - 15)),
            to_account: None,
            tags: Vec::new(),
            notes: None,
        }
    }

    #[test]
    fn create_applies_balance_effect() {
        let mut store = get_test_store();
        let account = insert_account(&mut store, Decimal::new(10000, 2));

        let created =
            create_transaction(&mut store, OWNER, new_expense(account.id, Decimal::new(2550, 2)))
                .unwrap();

        assert_eq!(created.owner, OWNER);
        assert_eq!(
            store.get_account(OWNER, account.id).unwrap().balance,
            Decimal::new(7450, 2)
        );
    }

    #[test]
    fn a_sequence_of_operations_keeps_balances_exact() {
        let mut store = get_test_store();
        let account = insert_account(&mut store, Decimal::ZERO);

        create_transaction(
            &mut store,
            OWNER,
            NewTransaction {
                transaction_type: TransactionType::Income,
                amount: Decimal::new(100000, 2),
                category: "Salary".to_owned(),
                ..new_expense(account.id, Decimal::ZERO)
            },
        )
        .unwrap();
        create_transaction(&mut store, OWNER, new_expense(account.id, Decimal::new(3333, 2)))
            .unwrap();
        create_transaction(&mut store, OWNER, new_expense(account.id, Decimal::new(1667, 2)))
            .unwrap();

        assert_eq!(
            store.get_account(OWNER, account.id).unwrap().balance,
            Decimal::new(95000, 2)
        );
    }

    #[test]
    fn create_fails_when_account_is_missing() {
        let mut store = get_test_store();

        let result = create_transaction(&mut store, OWNER, new_expense(999, Decimal::ONE));

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn create_rejects_transfer_to_same_account() {
        let mut store = get_test_store();
        let account = insert_account(&mut store, Decimal::new(100, 0));

        let result = create_transaction(
            &mut store,
            OWNER,
            NewTransaction {
                transaction_type: TransactionType::Transfer,
                to_account: Some(account.id),
                category: "Transfer".to_owned(),
                ..new_expense(account.id, Decimal::new(50, 0))
            },
        );

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn create_rejects_transfer_without_destination() {
        let mut store = get_test_store();
        let account = insert_account(&mut store, Decimal::new(100, 0));

        let result = create_transaction(
            &mut store,
            OWNER,
            NewTransaction {
                transaction_type: TransactionType::Transfer,
                category: "Transfer".to_owned(),
                ..new_expense(account.id, Decimal::new(50, 0))
            },
        );

        assert!(matches!(result, Err(Error::Validation(_))));
        // A failed create leaves the balance untouched.
        assert_eq!(
            store.get_account(OWNER, account.id).unwrap().balance,
            Decimal::new(100, 0)
        );
    }

    #[test]
    fn create_rejects_unknown_category() {
        let mut store = get_test_store();
        let account = insert_account(&mut store, Decimal::new(100, 0));

        let result = create_transaction(
            &mut store,
            OWNER,
            NewTransaction {
                category: "Gift cards".to_owned(),
                ..new_expense(account.id, Decimal::ONE)
            },
        );

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn update_amount_changes_balance_by_the_difference() {
        let mut store = get_test_store();
        let account = insert_account(&mut store, Decimal::new(10000, 2));
        let created =
            create_transaction(&mut store, OWNER, new_expense(account.id, Decimal::new(3000, 2)))
                .unwrap();

        update_transaction(
            &mut store,
            OWNER,
            created.id,
            TransactionUpdate {
                amount: Some(Decimal::new(4500, 2)),
                ..TransactionUpdate::default()
            },
        )
        .unwrap();

        assert_eq!(
            store.get_account(OWNER, account.id).unwrap().balance,
            Decimal::new(5500, 2)
        );
    }

    #[test]
    fn update_moving_between_types_reverses_then_applies() {
        let mut store = get_test_store();
        let account = insert_account(&mut store, Decimal::new(100, 0));
        let created =
            create_transaction(&mut store, OWNER, new_expense(account.id, Decimal::new(30, 0)))
                .unwrap();

        update_transaction(
            &mut store,
            OWNER,
            created.id,
            TransactionUpdate {
                transaction_type: Some(TransactionType::Income),
                category: Some("Refund".to_owned()),
                ..TransactionUpdate::default()
            },
        )
        .unwrap();

        // 100 - 30 = 70, then reversed to 100 and applied as income: 130.
        assert_eq!(
            store.get_account(OWNER, account.id).unwrap().balance,
            Decimal::new(130, 0)
        );
    }

    #[test]
    fn invalid_update_leaves_everything_unchanged() {
        let mut store = get_test_store();
        let account = insert_account(&mut store, Decimal::new(100, 0));
        let created =
            create_transaction(&mut store, OWNER, new_expense(account.id, Decimal::new(30, 0)))
                .unwrap();

        let result = update_transaction(
            &mut store,
            OWNER,
            created.id,
            TransactionUpdate {
                amount: Some(Decimal::ZERO),
                ..TransactionUpdate::default()
            },
        );

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(
            store.get_account(OWNER, account.id).unwrap().balance,
            Decimal::new(70, 0)
        );
    }

    #[test]
    fn delete_restores_the_balance() {
        let mut store = get_test_store();
        let account = insert_account(&mut store, Decimal::new(100, 0));
        let created =
            create_transaction(&mut store, OWNER, new_expense(account.id, Decimal::new(30, 0)))
                .unwrap();

        delete_transaction(&mut store, OWNER, created.id).unwrap();

        assert_eq!(
            store.get_account(OWNER, account.id).unwrap().balance,
            Decimal::new(100, 0)
        );
        assert_eq!(
            list_transactions(&store, OWNER, &TransactionQuery::default())
                .unwrap()
                .total,
            0
        );
    }

    #[test]
    fn foreign_owner_cannot_touch_a_transaction() {
        let mut store = get_test_store();
        let account = insert_account(&mut store, Decimal::new(100, 0));
        let created =
            create_transaction(&mut store, OWNER, new_expense(account.id, Decimal::new(30, 0)))
                .unwrap();

        let other = UserID::new(2);

        assert_eq!(
            update_transaction(&mut store, other, created.id, TransactionUpdate::default()),
            Err(Error::NotFound)
        );
        assert_eq!(
            delete_transaction(&mut store, other, created.id),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn stats_totals_and_savings_rate() {
        let mut store = get_test_store();
        let account = insert_account(&mut store, Decimal::ZERO);
        create_transaction(
            &mut store,
            OWNER,
            NewTransaction {
                transaction_type: TransactionType::Income,
                amount: Decimal::new(200000, 2),
                category: "Salary".to_owned(),
                ..new_expense(account.id, Decimal::ZERO)
            },
        )
        .unwrap();
        create_transaction(&mut store, OWNER, new_expense(account.id, Decimal::new(50000, 2)))
            .unwrap();

        let stats =
            transaction_stats(&store, OWNER, date!(2025 - 06 - 01), date!(2025 - 06 - 30))
                .unwrap();

        assert_eq!(stats.summary.total_income, Decimal::new(200000, 2));
        assert_eq!(stats.summary.total_expense, Decimal::new(50000, 2));
        assert_eq!(stats.summary.net_income, Decimal::new(150000, 2));
        assert_eq!(stats.summary.savings_rate, Decimal::new(75, 0));
        assert_eq!(stats.expense_by_category[0].category, "Food");
        assert_eq!(stats.expense_by_category[0].count, 1);
    }

    #[test]
    fn stats_with_no_income_has_zero_savings_rate() {
        let mut store = get_test_store();
        let account = insert_account(&mut store, Decimal::new(100, 0));
        create_transaction(&mut store, OWNER, new_expense(account.id, Decimal::new(10, 0)))
            .unwrap();

        let stats =
            transaction_stats(&store, OWNER, date!(2025 - 06 - 01), date!(2025 - 06 - 30))
                .unwrap();

        assert_eq!(stats.summary.savings_rate, Decimal::ZERO);
    }

    #[test]
    fn stats_window_prefers_explicit_dates() {
        let (start, end) = stats_window(
            Some("year"),
            Some(date!(2025 - 01 - 01)),
            Some(date!(2025 - 03 - 31)),
        );

        assert_eq!(start, date!(2025 - 01 - 01));
        assert_eq!(end, date!(2025 - 03 - 31));
    }

    #[test]
    fn stats_window_spans_the_named_period() {
        let (start, end) = stats_window(Some("week"), None, Some(date!(2025 - 06 - 08)));

        assert_eq!(start, date!(2025 - 06 - 01));
        assert_eq!(end, date!(2025 - 06 - 08));
    }
}
