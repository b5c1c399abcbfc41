//! Defines the endpoints (routes) of the REST API.

/// The accounts collection.
pub const ACCOUNTS: &str = "/api/accounts";
/// A single account.
pub const ACCOUNT: &str = "/api/accounts/{account_id}";

/// The budgets collection.
pub const BUDGETS: &str = "/api/budgets";
/// The aggregated budget summary for a month.
pub const BUDGET_SUMMARY: &str = "/api/budgets/summary";
/// A single budget.
pub const BUDGET: &str = "/api/budgets/{budget_id}";

/// The transactions collection.
pub const TRANSACTIONS: &str = "/api/transactions";
/// Aggregated income and expense statistics.
pub const TRANSACTION_STATS: &str = "/api/transactions/stats";
/// A single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
