//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{Error, db::initialize, stores::LedgerStore, stores::sqlite::SqliteLedgerStore};

/// The state of the REST server.
///
/// Route handlers are generic over the ledger store so that tests can swap
/// in whichever store implementation they need.
#[derive(Debug, Clone)]
pub struct AppState<L>
where
    L: LedgerStore + Clone + Send + Sync,
{
    /// The durable store for every domain collection.
    pub ledger: L,
}

/// The [AppState] backed by SQLite used by the server binary.
pub type SqlAppState = AppState<SqliteLedgerStore>;

/// Create the server state from a SQLite database connection.
///
/// This function will create the tables for the domain models if the
/// database does not have them yet.
///
/// # Errors
/// Returns an error if the database cannot be initialized.
pub fn create_app_state(db_connection: Connection) -> Result<SqlAppState, Error> {
    initialize(&db_connection)?;

    Ok(AppState {
        ledger: SqliteLedgerStore::new(Arc::new(Mutex::new(db_connection))),
    })
}
