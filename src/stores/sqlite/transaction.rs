//! Implements the SQLite backed transaction store.

use rusqlite::{params, params_from_iter, types::Value};
use rust_decimal::prelude::ToPrimitive;

use crate::{
    Error,
    db::MapRow,
    models::{DatabaseID, Transaction, UserID},
    stores::{SortOrder, TransactionQuery, TransactionStore},
};

use super::SqliteLedgerStore;

const TRANSACTION_COLUMNS: &str = "id, owner_id, account_id, type, amount, description, category, \
     date, to_account_id, is_reconciled, tags, notes";

/// Build the WHERE clause and parameters shared by the list and count
/// queries. Amount filters compare on a REAL cast; the stored text amounts
/// would otherwise compare lexicographically.
fn build_where_clause(owner: UserID, query: &TransactionQuery) -> (String, Vec<Value>) {
    let mut where_clause_parts = vec!["owner_id = ?".to_string()];
    let mut query_parameters = vec![Value::Integer(owner.as_i64())];

    if let Some(account) = query.account {
        where_clause_parts.push("(account_id = ? OR to_account_id = ?)".to_string());
        query_parameters.push(Value::Integer(account));
        query_parameters.push(Value::Integer(account));
    }

    if let Some(transaction_type) = query.transaction_type {
        where_clause_parts.push("type = ?".to_string());
        query_parameters.push(Value::Text(transaction_type.as_str().to_string()));
    }

    if let Some(ref category) = query.category {
        where_clause_parts.push("category = ?".to_string());
        query_parameters.push(Value::Text(category.clone()));
    }

    if let Some(ref date_range) = query.date_range {
        where_clause_parts.push("date BETWEEN ? AND ?".to_string());
        query_parameters.push(Value::Text(date_range.start().to_string()));
        query_parameters.push(Value::Text(date_range.end().to_string()));
    }

    if let Some(min_amount) = query.min_amount {
        where_clause_parts.push("CAST(amount AS REAL) >= ?".to_string());
        query_parameters.push(Value::Real(min_amount.to_f64().unwrap_or_default()));
    }

    if let Some(max_amount) = query.max_amount {
        where_clause_parts.push("CAST(amount AS REAL) <= ?".to_string());
        query_parameters.push(Value::Real(max_amount.to_f64().unwrap_or_default()));
    }

    if let Some(ref search) = query.search {
        where_clause_parts.push("description LIKE ?".to_string());
        query_parameters.push(Value::Text(format!("%{search}%")));
    }

    (where_clause_parts.join(" AND "), query_parameters)
}

impl TransactionStore for SqliteLedgerStore {
    fn insert_transaction(&mut self, transaction: &Transaction) -> Result<Transaction, Error> {
        let tags = serde_json::to_string(&transaction.tags)
            .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

        let created = self
            .lock()?
            .prepare(&format!(
                "INSERT INTO \"transaction\" (owner_id, account_id, type, amount, description, \
                 category, date, to_account_id, is_reconciled, tags, notes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                 RETURNING {TRANSACTION_COLUMNS}"
            ))?
            .query_row(
                params![
                    transaction.owner.as_i64(),
                    transaction.account,
                    transaction.transaction_type.as_str(),
                    transaction.amount.to_string(),
                    transaction.description,
                    transaction.category,
                    transaction.date,
                    transaction.to_account,
                    transaction.is_reconciled,
                    tags,
                    transaction.notes,
                ],
                Transaction::map_row,
            )?;

        Ok(created)
    }

    fn get_transaction(&self, owner: UserID, id: DatabaseID) -> Result<Transaction, Error> {
        let transaction = self
            .lock()?
            .prepare(&format!(
                "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = ?1 AND owner_id = ?2"
            ))?
            .query_row(params![id, owner.as_i64()], Transaction::map_row)?;

        Ok(transaction)
    }

    fn get_transactions(
        &self,
        owner: UserID,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>, Error> {
        let (where_clause, query_parameters) = build_where_clause(owner, query);

        let mut query_string =
            format!("SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE {where_clause}");

        match query.sort_date {
            Some(SortOrder::Ascending) => query_string.push_str(" ORDER BY date ASC, id ASC"),
            Some(SortOrder::Descending) => query_string.push_str(" ORDER BY date DESC, id DESC"),
            None => {}
        }

        if let Some(limit) = query.limit {
            query_string.push_str(&format!(" LIMIT {limit} OFFSET {}", query.offset));
        }

        self.lock()?
            .prepare(&query_string)?
            .query_map(
                params_from_iter(query_parameters.iter()),
                Transaction::map_row,
            )?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
            .collect()
    }

    fn count_transactions(&self, owner: UserID, query: &TransactionQuery) -> Result<u64, Error> {
        let (where_clause, query_parameters) = build_where_clause(owner, query);

        let count = self
            .lock()?
            .prepare(&format!(
                "SELECT COUNT(*) FROM \"transaction\" WHERE {where_clause}"
            ))?
            .query_row(params_from_iter(query_parameters.iter()), |row| {
                row.get::<_, i64>(0)
            })?;

        Ok(count as u64)
    }

    fn count_transactions_for_account(
        &self,
        owner: UserID,
        account_id: DatabaseID,
    ) -> Result<u64, Error> {
        let count = self
            .lock()?
            .prepare(
                "SELECT COUNT(*) FROM \"transaction\"
                 WHERE owner_id = ?1 AND (account_id = ?2 OR to_account_id = ?2)",
            )?
            .query_row(params![owner.as_i64(), account_id], |row| {
                row.get::<_, i64>(0)
            })?;

        Ok(count as u64)
    }

    fn update_transaction(&mut self, transaction: &Transaction) -> Result<(), Error> {
        let tags = serde_json::to_string(&transaction.tags)
            .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

        let rows_affected = self.lock()?.execute(
            "UPDATE \"transaction\"
             SET account_id = ?1, type = ?2, amount = ?3, description = ?4, category = ?5,
                 date = ?6, to_account_id = ?7, is_reconciled = ?8, tags = ?9, notes = ?10
             WHERE id = ?11 AND owner_id = ?12",
            params![
                transaction.account,
                transaction.transaction_type.as_str(),
                transaction.amount.to_string(),
                transaction.description,
                transaction.category,
                transaction.date,
                transaction.to_account,
                transaction.is_reconciled,
                tags,
                transaction.notes,
                transaction.id,
                transaction.owner.as_i64(),
            ],
        )?;

        if rows_affected == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }

    fn delete_transaction(&mut self, owner: UserID, id: DatabaseID) -> Result<(), Error> {
        let rows_affected = self.lock()?.execute(
            "DELETE FROM \"transaction\" WHERE id = ?1 AND owner_id = ?2",
            params![id, owner.as_i64()],
        )?;

        if rows_affected == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }
}
