//! Application router configuration.

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::{
    AppState,
    api::{
        accounts::{
            create_account_endpoint, delete_account_endpoint, get_account_endpoint,
            get_accounts_endpoint, update_account_endpoint,
        },
        budgets::{
            create_budget_endpoint, delete_budget_endpoint, get_budget_endpoint,
            get_budget_summary_endpoint, get_budgets_endpoint, update_budget_endpoint,
        },
        transactions::{
            create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
            get_transaction_stats_endpoint, get_transactions_endpoint,
            update_transaction_endpoint,
        },
    },
    endpoints,
    stores::LedgerStore,
};

/// Return a router with all the app's routes.
pub fn build_router<L>(state: AppState<L>) -> Router
where
    L: LedgerStore + Clone + Send + Sync + 'static,
{
    Router::new()
        .route(
            endpoints::ACCOUNTS,
            get(get_accounts_endpoint).post(create_account_endpoint),
        )
        .route(
            endpoints::ACCOUNT,
            get(get_account_endpoint)
                .put(update_account_endpoint)
                .delete(delete_account_endpoint),
        )
        .route(
            endpoints::BUDGETS,
            get(get_budgets_endpoint).post(create_budget_endpoint),
        )
        .route(endpoints::BUDGET_SUMMARY, get(get_budget_summary_endpoint))
        .route(
            endpoints::BUDGET,
            get(get_budget_endpoint)
                .put(update_budget_endpoint)
                .delete(delete_budget_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION_STATS,
            get(get_transaction_stats_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(update_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod routing_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;

    use super::build_router;
    use crate::{app_state::create_app_state, auth::USER_ID_HEADER, endpoints};

    #[tokio::test]
    async fn every_collection_route_requires_a_user() {
        let state = create_app_state(Connection::open_in_memory().unwrap()).unwrap();
        let server = TestServer::new(build_router(state));

        for route in [
            endpoints::ACCOUNTS,
            endpoints::BUDGETS,
            endpoints::BUDGET_SUMMARY,
            endpoints::TRANSACTIONS,
            endpoints::TRANSACTION_STATS,
        ] {
            let response = server.get(route).await;

            assert_eq!(
                response.status_code(),
                StatusCode::UNAUTHORIZED,
                "expected 401 for {route} without the user header"
            );
        }
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let state = create_app_state(Connection::open_in_memory().unwrap()).unwrap();
        let server = TestServer::new(build_router(state));

        let response = server
            .get("/api/unknown")
            .add_header(USER_ID_HEADER, "1")
            .await;

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }
}
