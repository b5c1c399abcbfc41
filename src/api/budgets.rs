//! The budget routes of the REST API.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    auth::AuthenticatedUser,
    budget_service::{
        self, BudgetListFilter, BudgetSummary, EnrichedBudget, month_bounds,
    },
    models::{Budget, BudgetUpdate, DatabaseID, NewBudget},
    stores::LedgerStore,
};

/// Query parameters for listing budgets.
#[derive(Debug, Default, Deserialize)]
pub struct BudgetListParams {
    /// Only include budgets with this active status.
    pub is_active: Option<bool>,
    /// Only include budgets overlapping this "YYYY-MM" month.
    pub month: Option<String>,
}

/// Query parameters for the budget summary.
#[derive(Debug, Default, Deserialize)]
pub struct BudgetSummaryParams {
    /// The "YYYY-MM" month to summarize. Defaults to the current month.
    pub month: Option<String>,
}

/// Create a budget for the authenticated user.
pub async fn create_budget_endpoint<L>(
    State(state): State<AppState<L>>,
    AuthenticatedUser(owner): AuthenticatedUser,
    Json(new_budget): Json<NewBudget>,
) -> Result<(StatusCode, Json<Budget>), Error>
where
    L: LedgerStore + Clone + Send + Sync,
{
    let mut ledger = state.ledger;
    let budget = budget_service::create_budget(&mut ledger, owner, new_budget)?;

    Ok((StatusCode::CREATED, Json(budget)))
}

/// List the authenticated user's budgets with their spend figures.
pub async fn get_budgets_endpoint<L>(
    State(state): State<AppState<L>>,
    AuthenticatedUser(owner): AuthenticatedUser,
    Query(params): Query<BudgetListParams>,
) -> Result<Json<Vec<EnrichedBudget>>, Error>
where
    L: LedgerStore + Clone + Send + Sync,
{
    let month = params.month.as_deref().map(month_bounds).transpose()?;
    let filter = BudgetListFilter {
        is_active: params.is_active,
        month,
    };

    let mut ledger = state.ledger;
    let budgets = budget_service::get_budgets(&mut ledger, owner, &filter)?;

    Ok(Json(budgets))
}

/// Aggregate the active budgets overlapping a month.
pub async fn get_budget_summary_endpoint<L>(
    State(state): State<AppState<L>>,
    AuthenticatedUser(owner): AuthenticatedUser,
    Query(params): Query<BudgetSummaryParams>,
) -> Result<Json<BudgetSummary>, Error>
where
    L: LedgerStore + Clone + Send + Sync,
{
    let month = match params.month.as_deref() {
        Some(month) => month_bounds(month)?,
        None => current_month(),
    };

    let mut ledger = state.ledger;
    let summary = budget_service::budget_summary(&mut ledger, owner, month)?;

    Ok(Json(summary))
}

/// Retrieve a single budget with its spend figures.
pub async fn get_budget_endpoint<L>(
    State(state): State<AppState<L>>,
    AuthenticatedUser(owner): AuthenticatedUser,
    Path(budget_id): Path<DatabaseID>,
) -> Result<Json<EnrichedBudget>, Error>
where
    L: LedgerStore + Clone + Send + Sync,
{
    let mut ledger = state.ledger;
    let budget = budget_service::get_budget(&mut ledger, owner, budget_id)?;

    Ok(Json(budget))
}

/// Update a budget. Absent fields keep their prior value.
pub async fn update_budget_endpoint<L>(
    State(state): State<AppState<L>>,
    AuthenticatedUser(owner): AuthenticatedUser,
    Path(budget_id): Path<DatabaseID>,
    Json(update): Json<BudgetUpdate>,
) -> Result<Json<EnrichedBudget>, Error>
where
    L: LedgerStore + Clone + Send + Sync,
{
    let mut ledger = state.ledger;
    let budget = budget_service::update_budget(&mut ledger, owner, budget_id, update)?;

    Ok(Json(budget))
}

/// Delete a budget and its cached spend total.
pub async fn delete_budget_endpoint<L>(
    State(state): State<AppState<L>>,
    AuthenticatedUser(owner): AuthenticatedUser,
    Path(budget_id): Path<DatabaseID>,
) -> Result<StatusCode, Error>
where
    L: LedgerStore + Clone + Send + Sync,
{
    let mut ledger = state.ledger;
    budget_service::delete_budget(&mut ledger, owner, budget_id)?;

    Ok(StatusCode::NO_CONTENT)
}

fn current_month() -> (time::Date, time::Date) {
    let today = OffsetDateTime::now_utc().date();
    let start = today.replace_day(1).unwrap_or(today);
    let end = today
        .replace_day(today.month().length(today.year()))
        .unwrap_or(today);

    (start, end)
}
