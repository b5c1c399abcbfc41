//! Budget CRUD and the aggregated budget summary.
//!
//! Budgets are returned enriched with their spend total and the percentage
//! of the cap used. The percentage is deliberately uncapped so that a reader
//! can see how far over budget they are, not just that they are over.

use rust_decimal::Decimal;
use serde::Serialize;
use time::{Date, Month};

use crate::{
    Error,
    models::{Budget, BudgetUpdate, DatabaseID, NewBudget, UserID},
    spending,
    stores::{BudgetQuery, LedgerStore},
};

/// A budget with its derived spend figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedBudget {
    /// The budget record itself.
    #[serde(flatten)]
    pub budget: Budget,
    /// The amount spent against the budget.
    pub spent: Decimal,
    /// `spent` as a percentage of the cap. May exceed 100.
    pub percentage_used: Decimal,
}

/// Filters for [get_budgets].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BudgetListFilter {
    /// Only include budgets with this active status.
    pub is_active: Option<bool>,
    /// Only include budgets overlapping this month, and compute their spend
    /// within it.
    pub month: Option<(Date, Date)>,
}

/// Totals across every active budget overlapping a month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetSummary {
    /// The sum of every included budget's cap.
    pub total_budgeted: Decimal,
    /// The sum of every included budget's spend within the month.
    pub total_spent: Decimal,
    /// `total_budgeted` minus `total_spent`. Negative when over budget.
    pub remaining: Decimal,
    /// `total_spent` as a percentage of `total_budgeted`. May exceed 100.
    pub percentage_used: Decimal,
    /// The number of budgets included.
    pub budget_count: u64,
}

/// Create a budget for `owner`.
///
/// # Errors
/// Returns [Error::Validation] if the name is empty, the amount is not
/// positive, or the end date is not after the start date.
pub fn create_budget<L>(ledger: &mut L, owner: UserID, new_budget: NewBudget) -> Result<Budget, Error>
where
    L: LedgerStore,
{
    let budget = Budget {
        id: 0,
        owner,
        name: new_budget.name,
        amount: new_budget.amount,
        category: new_budget.category,
        start_date: new_budget.start_date,
        end_date: new_budget.end_date,
        description: new_budget.description,
        is_active: true,
    };

    validate(&budget)?;

    let created = ledger.insert_budget(&budget)?;

    tracing::info!(budget_id = created.id, "created budget");

    Ok(created)
}

/// Retrieve the budget with `id` owned by `owner`, enriched with its spend
/// figures over its own date range.
///
/// # Errors
/// Returns [Error::NotFound] if no such budget exists for the owner.
pub fn get_budget<L>(ledger: &mut L, owner: UserID, id: DatabaseID) -> Result<EnrichedBudget, Error>
where
    L: LedgerStore,
{
    let budget = ledger.get_budget(owner, id)?;

    enrich(ledger, budget, None)
}

/// Retrieve the budgets owned by `owner` matching `filter`, each enriched
/// with its spend figures.
pub fn get_budgets<L>(
    ledger: &mut L,
    owner: UserID,
    filter: &BudgetListFilter,
) -> Result<Vec<EnrichedBudget>, Error>
where
    L: LedgerStore,
{
    let budgets = ledger.get_budgets(
        owner,
        &BudgetQuery {
            is_active: filter.is_active,
            overlapping: filter.month.map(|(start, end)| start..=end),
        },
    )?;

    budgets
        .into_iter()
        .map(|budget| enrich(ledger, budget, filter.month))
        .collect()
}

/// Update the budget with `id` owned by `owner`. Absent fields keep their
/// prior value.
///
/// # Errors
/// Returns [Error::NotFound] if no such budget exists for the owner and
/// [Error::Validation] if the merged record is invalid.
pub fn update_budget<L>(
    ledger: &mut L,
    owner: UserID,
    id: DatabaseID,
    update: BudgetUpdate,
) -> Result<EnrichedBudget, Error>
where
    L: LedgerStore,
{
    let existing = ledger.get_budget(owner, id)?;
    let merged = Budget {
        id: existing.id,
        owner: existing.owner,
        name: update.name.unwrap_or(existing.name),
        amount: update.amount.unwrap_or(existing.amount),
        category: update.category.unwrap_or(existing.category),
        start_date: update.start_date.unwrap_or(existing.start_date),
        end_date: update.end_date.unwrap_or(existing.end_date),
        description: update.description.or(existing.description),
        is_active: update.is_active.unwrap_or(existing.is_active),
    };

    validate(&merged)?;

    ledger.update_budget(&merged)?;
    // The edit may have changed what the budget tracks, so any cached spend
    // total is stale.
    ledger.delete_tracking_for_budget(owner, id)?;

    enrich(ledger, merged, None)
}

/// Delete the budget with `id` owned by `owner`, along with its cached spend
/// total.
///
/// # Errors
/// Returns [Error::NotFound] if no such budget exists for the owner.
pub fn delete_budget<L>(ledger: &mut L, owner: UserID, id: DatabaseID) -> Result<(), Error>
where
    L: LedgerStore,
{
    ledger.delete_budget(owner, id)?;

    tracing::info!(budget_id = id, "deleted budget");

    Ok(())
}

/// Aggregate the active budgets overlapping the month starting at
/// `month_start`.
///
/// Each budget's spend is computed over the intersection of its own date
/// range and the month, so a quarterly budget only contributes the month's
/// spending to the totals.
pub fn budget_summary<L>(
    ledger: &mut L,
    owner: UserID,
    month: (Date, Date),
) -> Result<BudgetSummary, Error>
where
    L: LedgerStore,
{
    let (month_start, month_end) = month;
    let budgets = ledger.get_budgets(
        owner,
        &BudgetQuery {
            is_active: Some(true),
            overlapping: Some(month_start..=month_end),
        },
    )?;

    let mut total_budgeted = Decimal::ZERO;
    let mut total_spent = Decimal::ZERO;
    let budget_count = budgets.len() as u64;

    for budget in budgets {
        let window_start = budget.start_date.max(month_start);
        let window_end = budget.end_date.min(month_end);
        let spent = spending::spent_amount(
            ledger,
            owner,
            budget.category.as_str(),
            window_start,
            window_end,
        )?;

        total_budgeted += budget.amount;
        total_spent += spent;
    }

    Ok(BudgetSummary {
        total_budgeted,
        total_spent,
        remaining: total_budgeted - total_spent,
        percentage_used: percentage_used(total_spent, total_budgeted),
        budget_count,
    })
}

/// Parse a "YYYY-MM" month into its first and last day.
///
/// # Errors
/// Returns [Error::Validation] if `month` is not a valid "YYYY-MM" string.
pub fn month_bounds(month: &str) -> Result<(Date, Date), Error> {
    let invalid = || Error::Validation(format!("invalid month {month:?}, expected YYYY-MM"));

    let (year_text, month_text) = month.split_once('-').ok_or_else(invalid)?;
    let year: i32 = year_text.parse().map_err(|_| invalid())?;
    let month_number: u8 = month_text.parse().map_err(|_| invalid())?;
    let month = Month::try_from(month_number).map_err(|_| invalid())?;

    let start = Date::from_calendar_date(year, month, 1).map_err(|_| invalid())?;
    let end = start
        .replace_day(month.length(year))
        .map_err(|_| invalid())?;

    Ok((start, end))
}

fn enrich<L>(
    ledger: &mut L,
    budget: Budget,
    month: Option<(Date, Date)>,
) -> Result<EnrichedBudget, Error>
where
    L: LedgerStore,
{
    let (window_start, window_end) = match month {
        Some((month_start, month_end)) => (
            budget.start_date.max(month_start),
            budget.end_date.min(month_end),
        ),
        None => (budget.start_date, budget.end_date),
    };

    let spent = spending::spent_amount(
        ledger,
        budget.owner,
        budget.category.as_str(),
        window_start,
        window_end,
    )?;

    Ok(EnrichedBudget {
        percentage_used: percentage_used(spent, budget.amount),
        budget,
        spent,
    })
}

fn percentage_used(spent: Decimal, amount: Decimal) -> Decimal {
    if amount.is_zero() {
        Decimal::ZERO
    } else {
        spent / amount * Decimal::ONE_HUNDRED
    }
}

fn validate(budget: &Budget) -> Result<(), Error> {
    if budget.name.trim().is_empty() {
        return Err(Error::Validation("a name is required".to_owned()));
    }

    if budget.amount <= Decimal::ZERO {
        return Err(Error::Validation(
            "the amount must be greater than zero".to_owned(),
        ));
    }

    if budget.end_date <= budget.start_date {
        return Err(Error::Validation(
            "the end date must be after the start date".to_owned(),
        ));
    }

    Ok(())
}
