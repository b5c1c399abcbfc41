//! Pocketledger is a personal budgeting service.
//!
//! This library provides a JSON REST API for managing accounts, budgets, and
//! transactions. Its core is the reconciliation between budgets and
//! transactions: every transaction write keeps account balances exact, and
//! budgets are read back enriched with how much of their cap has been spent.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod api;
mod app_state;
mod auth;
mod balance;
mod endpoints;
mod error;
mod routing;
mod spending;

pub mod account_service;
pub mod budget_service;
pub mod category_match;
pub mod db;
pub mod models;
pub mod stores;
pub mod transaction_service;

pub use app_state::{AppState, SqlAppState, create_app_state};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal,
/// whichever comes first, and then signals the server to shut down
/// gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
