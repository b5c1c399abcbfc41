//! The transaction routes of the REST API.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    api::Pagination,
    auth::AuthenticatedUser,
    models::{DatabaseID, NewTransaction, Transaction, TransactionType, TransactionUpdate},
    stores::{LedgerStore, SortOrder, TransactionQuery},
    transaction_service::{self, TransactionStats},
};

const DEFAULT_PAGE_SIZE: u64 = 50;

/// Query parameters for listing transactions.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionListParams {
    /// Only include transactions referencing this account.
    pub account: Option<DatabaseID>,
    /// Only include transactions of this type.
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    /// Only include transactions with exactly this category label.
    pub category: Option<String>,
    /// Only include transactions on or after this date.
    pub start_date: Option<Date>,
    /// Only include transactions on or before this date.
    pub end_date: Option<Date>,
    /// Only include transactions with at least this amount.
    pub min_amount: Option<Decimal>,
    /// Only include transactions with at most this amount.
    pub max_amount: Option<Decimal>,
    /// Only include transactions whose description contains this text.
    pub search: Option<String>,
    /// "date" for oldest first, "-date" (the default) for newest first.
    pub sort: Option<String>,
    /// The one-based page number.
    pub page: Option<u64>,
    /// The page size.
    pub limit: Option<u64>,
}

/// Query parameters for the stats endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct StatsParams {
    /// "week", "month", or "year". Defaults to a month.
    pub period: Option<String>,
    /// Overrides `period` with an explicit window start.
    pub start_date: Option<Date>,
    /// The end of the window. Defaults to today.
    pub end_date: Option<Date>,
}

/// A page of transactions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionListResponse {
    /// The requested page of transactions.
    pub transactions: Vec<Transaction>,
    /// Pagination metadata for the full result set.
    pub pagination: Pagination,
}

/// Create a transaction for the authenticated user and apply its balance
/// effect.
pub async fn create_transaction_endpoint<L>(
    State(state): State<AppState<L>>,
    AuthenticatedUser(owner): AuthenticatedUser,
    Json(new_transaction): Json<NewTransaction>,
) -> Result<(StatusCode, Json<Transaction>), Error>
where
    L: LedgerStore + Clone + Send + Sync,
{
    let mut ledger = state.ledger;
    let transaction = transaction_service::create_transaction(&mut ledger, owner, new_transaction)?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// List the authenticated user's transactions, newest first by default.
pub async fn get_transactions_endpoint<L>(
    State(state): State<AppState<L>>,
    AuthenticatedUser(owner): AuthenticatedUser,
    Query(params): Query<TransactionListParams>,
) -> Result<Json<TransactionListResponse>, Error>
where
    L: LedgerStore + Clone + Send + Sync,
{
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
    let sort_date = match params.sort.as_deref() {
        Some("date") => SortOrder::Ascending,
        _ => SortOrder::Descending,
    };
    let date_range = match (params.start_date, params.end_date) {
        (None, None) => None,
        (start, end) => Some(start.unwrap_or(Date::MIN)..=end.unwrap_or(Date::MAX)),
    };

    let query = TransactionQuery {
        account: params.account,
        transaction_type: params.transaction_type,
        category: params.category,
        date_range,
        min_amount: params.min_amount,
        max_amount: params.max_amount,
        search: params.search,
        sort_date: Some(sort_date),
        limit: Some(limit),
        offset: (page - 1) * limit,
    };

    let listing = transaction_service::list_transactions(&state.ledger, owner, &query)?;

    Ok(Json(TransactionListResponse {
        pagination: Pagination::new(page, limit, listing.total),
        transactions: listing.transactions,
    }))
}

/// Aggregate income and expense statistics over a date window.
pub async fn get_transaction_stats_endpoint<L>(
    State(state): State<AppState<L>>,
    AuthenticatedUser(owner): AuthenticatedUser,
    Query(params): Query<StatsParams>,
) -> Result<Json<TransactionStats>, Error>
where
    L: LedgerStore + Clone + Send + Sync,
{
    let (start_date, end_date) = transaction_service::stats_window(
        params.period.as_deref(),
        params.start_date,
        params.end_date,
    );

    let stats = transaction_service::transaction_stats(&state.ledger, owner, start_date, end_date)?;

    Ok(Json(stats))
}

/// Retrieve a single transaction.
pub async fn get_transaction_endpoint<L>(
    State(state): State<AppState<L>>,
    AuthenticatedUser(owner): AuthenticatedUser,
    Path(transaction_id): Path<DatabaseID>,
) -> Result<Json<Transaction>, Error>
where
    L: LedgerStore + Clone + Send + Sync,
{
    let transaction = state.ledger.get_transaction(owner, transaction_id)?;

    Ok(Json(transaction))
}

/// Update a transaction, reversing the old balance effect and applying the
/// new one.
pub async fn update_transaction_endpoint<L>(
    State(state): State<AppState<L>>,
    AuthenticatedUser(owner): AuthenticatedUser,
    Path(transaction_id): Path<DatabaseID>,
    Json(update): Json<TransactionUpdate>,
) -> Result<Json<Transaction>, Error>
where
    L: LedgerStore + Clone + Send + Sync,
{
    let mut ledger = state.ledger;
    let transaction =
        transaction_service::update_transaction(&mut ledger, owner, transaction_id, update)?;

    Ok(Json(transaction))
}

/// Delete a transaction and restore the affected balances.
pub async fn delete_transaction_endpoint<L>(
    State(state): State<AppState<L>>,
    AuthenticatedUser(owner): AuthenticatedUser,
    Path(transaction_id): Path<DatabaseID>,
) -> Result<StatusCode, Error>
where
    L: LedgerStore + Clone + Send + Sync,
{
    let mut ledger = state.ledger;
    transaction_service::delete_transaction(&mut ledger, owner, transaction_id)?;

    Ok(StatusCode::NO_CONTENT)
}
