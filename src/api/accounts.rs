//! The account routes of the REST API.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState, Error, account_service,
    auth::AuthenticatedUser,
    models::{Account, AccountUpdate, DatabaseID, NewAccount},
    stores::LedgerStore,
};

/// Create an account for the authenticated user.
pub async fn create_account_endpoint<L>(
    State(state): State<AppState<L>>,
    AuthenticatedUser(owner): AuthenticatedUser,
    Json(new_account): Json<NewAccount>,
) -> Result<(StatusCode, Json<Account>), Error>
where
    L: LedgerStore + Clone + Send + Sync,
{
    let mut ledger = state.ledger;
    let account = account_service::create_account(&mut ledger, owner, new_account)?;

    Ok((StatusCode::CREATED, Json(account)))
}

/// List the authenticated user's accounts.
pub async fn get_accounts_endpoint<L>(
    State(state): State<AppState<L>>,
    AuthenticatedUser(owner): AuthenticatedUser,
) -> Result<Json<Vec<Account>>, Error>
where
    L: LedgerStore + Clone + Send + Sync,
{
    let accounts = state.ledger.get_accounts(owner)?;

    Ok(Json(accounts))
}

/// Retrieve a single account.
pub async fn get_account_endpoint<L>(
    State(state): State<AppState<L>>,
    AuthenticatedUser(owner): AuthenticatedUser,
    Path(account_id): Path<DatabaseID>,
) -> Result<Json<Account>, Error>
where
    L: LedgerStore + Clone + Send + Sync,
{
    let account = state.ledger.get_account(owner, account_id)?;

    Ok(Json(account))
}

/// Update an account. Absent fields keep their prior value.
pub async fn update_account_endpoint<L>(
    State(state): State<AppState<L>>,
    AuthenticatedUser(owner): AuthenticatedUser,
    Path(account_id): Path<DatabaseID>,
    Json(update): Json<AccountUpdate>,
) -> Result<Json<Account>, Error>
where
    L: LedgerStore + Clone + Send + Sync,
{
    let mut ledger = state.ledger;
    let account = account_service::update_account(&mut ledger, owner, account_id, update)?;

    Ok(Json(account))
}

/// Delete an account that no transactions reference.
pub async fn delete_account_endpoint<L>(
    State(state): State<AppState<L>>,
    AuthenticatedUser(owner): AuthenticatedUser,
    Path(account_id): Path<DatabaseID>,
) -> Result<StatusCode, Error>
where
    L: LedgerStore + Clone + Send + Sync,
{
    let mut ledger = state.ledger;
    account_service::delete_account(&mut ledger, owner, account_id)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod account_route_tests {
    use axum_test::TestServer;
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use serde_json::json;

    use crate::{
        app_state::create_app_state, auth::USER_ID_HEADER, build_router, endpoints,
        models::Account,
    };

    fn get_test_server() -> TestServer {
        let state = create_app_state(Connection::open_in_memory().unwrap()).unwrap();
        let app = build_router(state);

        TestServer::new(app)
    }

    #[tokio::test]
    async fn create_and_get_account() {
        let server = get_test_server();

        let created = server
            .post(endpoints::ACCOUNTS)
            .add_header(USER_ID_HEADER, "1")
            .json(&json!({"name": "Everyday", "type": "Checking", "balance": "100.00"}))
            .await;
        created.assert_status(axum::http::StatusCode::CREATED);
        let created = created.json::<Account>();

        let got = server
            .get(&format!("/api/accounts/{}", created.id))
            .add_header(USER_ID_HEADER, "1")
            .await
            .json::<Account>();

        assert_eq!(got, created);
        assert_eq!(got.balance, Decimal::new(10000, 2));
        assert_eq!(got.currency, "USD");
    }

    #[tokio::test]
    async fn missing_user_header_is_unauthorized() {
        let server = get_test_server();

        let response = server.get(endpoints::ACCOUNTS).await;

        response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn accounts_are_scoped_to_the_requesting_user() {
        let server = get_test_server();
        let created = server
            .post(endpoints::ACCOUNTS)
            .add_header(USER_ID_HEADER, "1")
            .json(&json!({"name": "Everyday", "type": "Checking"}))
            .await
            .json::<Account>();

        let response = server
            .get(&format!("/api/accounts/{}", created.id))
            .add_header(USER_ID_HEADER, "2")
            .await;

        response.assert_status(axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_account_with_transactions_is_a_conflict() {
        let server = get_test_server();
        let account = server
            .post(endpoints::ACCOUNTS)
            .add_header(USER_ID_HEADER, "1")
            .json(&json!({"name": "Everyday", "type": "Checking", "balance": "100.00"}))
            .await
            .json::<Account>();
        server
            .post(endpoints::TRANSACTIONS)
            .add_header(USER_ID_HEADER, "1")
            .json(&json!({
                "account": account.id,
                "type": "expense",
                "amount": "10.00",
                "description": "Groceries",
                "category": "Food",
            }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let response = server
            .delete(&format!("/api/accounts/{}", account.id))
            .add_header(USER_ID_HEADER, "1")
            .await;

        response.assert_status(axum::http::StatusCode::CONFLICT);
    }
}
