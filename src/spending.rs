//! Computes how much was spent in a category over a date range, memoizing
//! the result per budget.
//!
//! The cached totals in the budget tracking table are an optimization only:
//! any write that could change a budget's spend total deletes the affected
//! tracking rows via [invalidate_tracking], and the next read recomputes the
//! total from the transaction records.

use rust_decimal::Decimal;
use time::Date;

use crate::{
    Error,
    category_match::categories_match,
    models::{Budget, TransactionType, UserID},
    stores::{BudgetQuery, LedgerStore, TransactionQuery},
};

/// The total spent in `category` between `start_date` and `end_date`
/// (inclusive).
///
/// If a budget of the owner matches the category and overlaps the range, and
/// a cached total exists for it, the cached total is returned without
/// scanning any transactions. Otherwise the total is computed by summing the
/// expense transactions in the range whose category matches, and cached
/// against the budget when one was found and the total is positive.
pub fn spent_amount<L>(
    ledger: &mut L,
    owner: UserID,
    category: &str,
    start_date: Date,
    end_date: Date,
) -> Result<Decimal, Error>
where
    L: LedgerStore,
{
    let budget = resolve_budget(ledger, owner, category, start_date, end_date)?;

    if let Some(budget) = &budget
        && let Some(tracking) = ledger.get_tracking_for_budget(owner, budget.id)?
    {
        tracing::debug!(
            budget_id = budget.id,
            "returning cached spend total for {category:?}"
        );

        return Ok(tracking.spent_amount);
    }

    let expenses = ledger.get_transactions(
        owner,
        &TransactionQuery {
            transaction_type: Some(TransactionType::Expense),
            date_range: Some(start_date..=end_date),
            ..TransactionQuery::default()
        },
    )?;

    // Stored amounts are positive magnitudes, but take the absolute value in
    // case older records carry signed amounts.
    let total: Decimal = expenses
        .iter()
        .filter(|transaction| categories_match(&transaction.category, category))
        .map(|transaction| transaction.amount.abs())
        .sum();

    if let Some(budget) = budget
        && total > Decimal::ZERO
    {
        ledger.upsert_tracking(owner, budget.id, total)?;
    }

    Ok(total)
}

/// Drop the cached spend totals that the given category/date pairs could
/// have contributed to.
///
/// Every transaction write calls this with the (category, date) of each
/// record it touched, so a stale cached total is never served after a
/// mutation.
pub fn invalidate_tracking<L>(
    ledger: &mut L,
    owner: UserID,
    touched: &[(&str, Date)],
) -> Result<(), Error>
where
    L: LedgerStore,
{
    let budgets = ledger.get_budgets(owner, &BudgetQuery::default())?;

    for budget in budgets {
        let affected = touched.iter().any(|(category, date)| {
            categories_match(budget.category.as_str(), category)
                && budget.overlaps(*date, *date)
        });

        if affected {
            ledger.delete_tracking_for_budget(owner, budget.id)?;
        }
    }

    Ok(())
}

fn resolve_budget<L>(
    ledger: &L,
    owner: UserID,
    category: &str,
    start_date: Date,
    end_date: Date,
) -> Result<Option<Budget>, Error>
where
    L: LedgerStore,
{
    let budgets = ledger.get_budgets(
        owner,
        &BudgetQuery {
            overlapping: Some(start_date..=end_date),
            ..BudgetQuery::default()
        },
    )?;

    Ok(budgets
        .into_iter()
        .find(|budget| categories_match(budget.category.as_str(), category)))
}

#[cfg(test)]
mod spending_tests {
    use rust_decimal::Decimal;
    use time::{Date, macros::date};

    use super::{invalidate_tracking, spent_amount};
    use crate::{
        models::{
            Account, AccountType, Budget, BudgetCategory, DatabaseID, Transaction,
            TransactionType, UserID,
        },
        stores::{
            AccountStore, BudgetStore, BudgetTrackingStore, TransactionStore,
            sqlite::{SqliteLedgerStore, test_utils::get_test_store},
        },
    };

    const OWNER: UserID = UserID::new(1);

    fn insert_account(store: &mut SqliteLedgerStore) -> Account {
        store
            .insert_account(&Account {
                id: 0,
                owner: OWNER,
                name: "Everyday".to_owned(),
                account_type: AccountType::Checking,
                balance: Decimal::new(1000, 0),
                currency: "USD".to_owned(),
                description: None,
                is_active: true,
            })
            .unwrap()
    }

    fn insert_budget(store: &mut SqliteLedgerStore, category: BudgetCategory) -> Budget {
        store
            .insert_budget(&Budget {
                id: 0,
                owner: OWNER,
                name: format!("{} budget", category.as_str()),
                amount: Decimal::new(500, 0),
                category,
                start_date: date!(2025 - 06 - 01),
                end_date: date!(2025 - 06 - 30),
                description: None,
                is_active: true,
            })
            .unwrap()
    }

    fn insert_expense(
        store: &mut SqliteLedgerStore,
        account: DatabaseID,
        category: &str,
        amount: Decimal,
        date: Date,
    ) {
        store
            .insert_transaction(&Transaction {
                id: 0,
                owner: OWNER,
                account,
                transaction_type: TransactionType::Expense,
                amount,
                description: "test".to_owned(),
                category: category.to_owned(),
                date,
                to_account: None,
                is_reconciled: false,
                tags: Vec::new(),
                notes: None,
            })
            .unwrap();
    }

    #[test]
    fn cached_total_is_returned_without_scanning() {
        let mut store = get_test_store();
        let budget = insert_budget(&mut store, BudgetCategory::Food);
        store
            .upsert_tracking(OWNER, budget.id, Decimal::new(15000, 2))
            .unwrap();
        // A transaction the cached total does not include; a scan would find
        // it, a cache hit will not.
        let account = insert_account(&mut store);
        insert_expense(
            &mut store,
            account.id,
            "Food",
            Decimal::new(9900, 2),
            date!(2025 - 06 - 10),
        );

        let total = spent_amount(
            &mut store,
            OWNER,
            "Food",
            date!(2025 - 06 - 01),
            date!(2025 - 06 - 30),
        )
        .unwrap();

        assert_eq!(total, Decimal::new(15000, 2));
    }

    #[test]
    fn scan_sums_matching_expenses_and_caches() {
        let mut store = get_test_store();
        let budget = insert_budget(&mut store, BudgetCategory::Food);
        let account = insert_account(&mut store);
        insert_expense(
            &mut store,
            account.id,
            "food",
            Decimal::new(1000, 2),
            date!(2025 - 06 - 05),
        );
        insert_expense(
            &mut store,
            account.id,
            "Food",
            Decimal::new(2550, 2),
            date!(2025 - 06 - 20),
        );
        // Different category and out-of-range records are excluded.
        insert_expense(
            &mut store,
            account.id,
            "Utilities",
            Decimal::new(5000, 2),
            date!(2025 - 06 - 10),
        );
        insert_expense(
            &mut store,
            account.id,
            "Food",
            Decimal::new(700, 2),
            date!(2025 - 07 - 01),
        );

        let total = spent_amount(
            &mut store,
            OWNER,
            "Food",
            date!(2025 - 06 - 01),
            date!(2025 - 06 - 30),
        )
        .unwrap();

        assert_eq!(total, Decimal::new(3550, 2));
        assert_eq!(
            store
                .get_tracking_for_budget(OWNER, budget.id)
                .unwrap()
                .map(|tracking| tracking.spent_amount),
            Some(Decimal::new(3550, 2))
        );
    }

    #[test]
    fn no_budget_means_no_tracking_row() {
        let mut store = get_test_store();
        let account = insert_account(&mut store);
        insert_expense(
            &mut store,
            account.id,
            "Entertainment",
            Decimal::new(4200, 2),
            date!(2025 - 06 - 05),
        );

        let total = spent_amount(
            &mut store,
            OWNER,
            "Entertainment",
            date!(2025 - 06 - 01),
            date!(2025 - 06 - 30),
        )
        .unwrap();

        assert_eq!(total, Decimal::new(4200, 2));
    }

    #[test]
    fn synonym_categories_share_a_budget() {
        let mut store = get_test_store();
        insert_budget(&mut store, BudgetCategory::Donations);
        let account = insert_account(&mut store);
        insert_expense(
            &mut store,
            account.id,
            "Gifts",
            Decimal::new(2500, 2),
            date!(2025 - 06 - 12),
        );

        let total = spent_amount(
            &mut store,
            OWNER,
            "Donations",
            date!(2025 - 06 - 01),
            date!(2025 - 06 - 30),
        )
        .unwrap();

        assert_eq!(total, Decimal::new(2500, 2));
    }

    #[test]
    fn invalidation_drops_only_affected_budgets() {
        let mut store = get_test_store();
        let food = insert_budget(&mut store, BudgetCategory::Food);
        let utilities = insert_budget(&mut store, BudgetCategory::Utilities);
        store
            .upsert_tracking(OWNER, food.id, Decimal::new(100, 0))
            .unwrap();
        store
            .upsert_tracking(OWNER, utilities.id, Decimal::new(200, 0))
            .unwrap();

        invalidate_tracking(&mut store, OWNER, &[("food", date!(2025 - 06 - 15))]).unwrap();

        assert_eq!(store.get_tracking_for_budget(OWNER, food.id).unwrap(), None);
        assert!(
            store
                .get_tracking_for_budget(OWNER, utilities.id)
                .unwrap()
                .is_some()
        );
    }

    #[test]
    fn invalidation_ignores_dates_outside_the_budget() {
        let mut store = get_test_store();
        let food = insert_budget(&mut store, BudgetCategory::Food);
        store
            .upsert_tracking(OWNER, food.id, Decimal::new(100, 0))
            .unwrap();

        invalidate_tracking(&mut store, OWNER, &[("Food", date!(2025 - 07 - 15))]).unwrap();

        assert!(
            store
                .get_tracking_for_budget(OWNER, food.id)
                .unwrap()
                .is_some()
        );
    }
}
