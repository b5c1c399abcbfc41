//! Implements a SQLite backed ledger store.

mod account;
mod budget;
mod budget_tracking;
mod transaction;

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::{Error, stores::LedgerStore};

/// Stores the domain collections in a SQLite database.
///
/// Cloning is cheap: clones share the same underlying connection. Statements
/// are serialized through the connection mutex; multi-step mutations
/// additionally hold a write lock for the duration of
/// [LedgerStore::atomically] so that two mutation sequences cannot interleave
/// their statements on the shared connection.
#[derive(Debug, Clone)]
pub struct SqliteLedgerStore {
    connection: Arc<Mutex<Connection>>,
    write_lock: Arc<Mutex<()>>,
}

impl SqliteLedgerStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self {
            connection,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection.lock().map_err(|_| Error::DatabaseLockError)
    }

    fn execute_raw(&self, sql: &str) -> Result<(), Error> {
        self.lock()?.execute_batch(sql)?;

        Ok(())
    }
}

impl LedgerStore for SqliteLedgerStore {
    fn atomically<R, F>(&mut self, operation: F) -> Result<R, Error>
    where
        F: FnOnce(&mut Self) -> Result<R, Error>,
    {
        let write_lock = Arc::clone(&self.write_lock);
        let _guard = write_lock.lock().map_err(|_| Error::DatabaseLockError)?;

        self.execute_raw("BEGIN IMMEDIATE")?;

        match operation(self) {
            Ok(value) => {
                self.execute_raw("COMMIT")?;
                Ok(value)
            }
            Err(error) => {
                if let Err(rollback_error) = self.execute_raw("ROLLBACK") {
                    tracing::error!("could not roll back SQL transaction: {rollback_error}");
                }
                Err(error)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;

    use crate::db::initialize;

    use super::SqliteLedgerStore;

    /// A ledger store backed by a fresh in-memory database.
    pub(crate) fn get_test_store() -> SqliteLedgerStore {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        SqliteLedgerStore::new(Arc::new(Mutex::new(connection)))
    }
}
