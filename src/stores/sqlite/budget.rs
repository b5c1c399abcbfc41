//! Implements the SQLite backed budget store.

use rusqlite::{params, params_from_iter, types::Value};

use crate::{
    Error,
    db::MapRow,
    models::{Budget, DatabaseID, UserID},
    stores::{BudgetQuery, BudgetStore},
};

use super::SqliteLedgerStore;

const BUDGET_COLUMNS: &str =
    "id, owner_id, name, amount, category, start_date, end_date, description, is_active";

impl BudgetStore for SqliteLedgerStore {
    fn insert_budget(&mut self, budget: &Budget) -> Result<Budget, Error> {
        let created = self
            .lock()?
            .prepare(&format!(
                "INSERT INTO budget (owner_id, name, amount, category, start_date, end_date, description, is_active)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 RETURNING {BUDGET_COLUMNS}"
            ))?
            .query_row(
                params![
                    budget.owner.as_i64(),
                    budget.name,
                    budget.amount.to_string(),
                    budget.category.as_str(),
                    budget.start_date,
                    budget.end_date,
                    budget.description,
                    budget.is_active,
                ],
                Budget::map_row,
            )?;

        Ok(created)
    }

    fn get_budget(&self, owner: UserID, id: DatabaseID) -> Result<Budget, Error> {
        let budget = self
            .lock()?
            .prepare(&format!(
                "SELECT {BUDGET_COLUMNS} FROM budget WHERE id = ?1 AND owner_id = ?2"
            ))?
            .query_row(params![id, owner.as_i64()], Budget::map_row)?;

        Ok(budget)
    }

    fn get_budgets(&self, owner: UserID, query: &BudgetQuery) -> Result<Vec<Budget>, Error> {
        let mut where_clause_parts = vec!["owner_id = ?".to_string()];
        let mut query_parameters = vec![Value::Integer(owner.as_i64())];

        if let Some(is_active) = query.is_active {
            where_clause_parts.push("is_active = ?".to_string());
            query_parameters.push(Value::Integer(is_active as i64));
        }

        if let Some(ref range) = query.overlapping {
            where_clause_parts.push("start_date <= ? AND end_date >= ?".to_string());
            query_parameters.push(Value::Text(range.end().to_string()));
            query_parameters.push(Value::Text(range.start().to_string()));
        }

        let query_string = format!(
            "SELECT {BUDGET_COLUMNS} FROM budget WHERE {} ORDER BY start_date DESC",
            where_clause_parts.join(" AND ")
        );

        self.lock()?
            .prepare(&query_string)?
            .query_map(params_from_iter(query_parameters.iter()), Budget::map_row)?
            .map(|maybe_budget| maybe_budget.map_err(Error::from))
            .collect()
    }

    fn update_budget(&mut self, budget: &Budget) -> Result<(), Error> {
        let rows_affected = self.lock()?.execute(
            "UPDATE budget
             SET name = ?1, amount = ?2, category = ?3, start_date = ?4, end_date = ?5,
                 description = ?6, is_active = ?7
             WHERE id = ?8 AND owner_id = ?9",
            params![
                budget.name,
                budget.amount.to_string(),
                budget.category.as_str(),
                budget.start_date,
                budget.end_date,
                budget.description,
                budget.is_active,
                budget.id,
                budget.owner.as_i64(),
            ],
        )?;

        if rows_affected == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }

    fn delete_budget(&mut self, owner: UserID, id: DatabaseID) -> Result<(), Error> {
        // Both deletes happen under a single acquisition of the connection
        // mutex so a cache row cannot outlive its budget.
        let connection = self.lock()?;

        connection.execute(
            "DELETE FROM budget_tracking WHERE budget_id = ?1 AND owner_id = ?2",
            params![id, owner.as_i64()],
        )?;

        let rows_affected = connection.execute(
            "DELETE FROM budget WHERE id = ?1 AND owner_id = ?2",
            params![id, owner.as_i64()],
        )?;

        if rows_affected == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }
}
