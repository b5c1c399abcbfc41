//! Implements the SQLite backed account store.

use rusqlite::params;
use rust_decimal::Decimal;

use crate::{
    Error,
    db::{MapRow, decimal_from_row},
    models::{Account, DatabaseID, UserID},
    stores::AccountStore,
};

use super::SqliteLedgerStore;

const ACCOUNT_COLUMNS: &str =
    "id, owner_id, name, type, balance, currency, description, is_active";

impl AccountStore for SqliteLedgerStore {
    fn insert_account(&mut self, account: &Account) -> Result<Account, Error> {
        let created = self
            .lock()?
            .prepare(&format!(
                "INSERT INTO account (owner_id, name, type, balance, currency, description, is_active)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 RETURNING {ACCOUNT_COLUMNS}"
            ))?
            .query_row(
                params![
                    account.owner.as_i64(),
                    account.name,
                    account.account_type.as_str(),
                    account.balance.to_string(),
                    account.currency,
                    account.description,
                    account.is_active,
                ],
                Account::map_row,
            )?;

        Ok(created)
    }

    fn get_account(&self, owner: UserID, id: DatabaseID) -> Result<Account, Error> {
        let account = self
            .lock()?
            .prepare(&format!(
                "SELECT {ACCOUNT_COLUMNS} FROM account WHERE id = ?1 AND owner_id = ?2"
            ))?
            .query_row(params![id, owner.as_i64()], Account::map_row)?;

        Ok(account)
    }

    fn get_accounts(&self, owner: UserID) -> Result<Vec<Account>, Error> {
        self.lock()?
            .prepare(&format!(
                "SELECT {ACCOUNT_COLUMNS} FROM account WHERE owner_id = ?1 ORDER BY id"
            ))?
            .query_map(params![owner.as_i64()], Account::map_row)?
            .map(|maybe_account| maybe_account.map_err(Error::from))
            .collect()
    }

    fn update_account(&mut self, account: &Account) -> Result<(), Error> {
        let rows_affected = self.lock()?.execute(
            "UPDATE account
             SET name = ?1, type = ?2, balance = ?3, currency = ?4, description = ?5, is_active = ?6
             WHERE id = ?7 AND owner_id = ?8",
            params![
                account.name,
                account.account_type.as_str(),
                account.balance.to_string(),
                account.currency,
                account.description,
                account.is_active,
                account.id,
                account.owner.as_i64(),
            ],
        )?;

        if rows_affected == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }

    fn delete_account(&mut self, owner: UserID, id: DatabaseID) -> Result<(), Error> {
        let rows_affected = self.lock()?.execute(
            "DELETE FROM account WHERE id = ?1 AND owner_id = ?2",
            params![id, owner.as_i64()],
        )?;

        if rows_affected == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }

    fn adjust_balance(
        &mut self,
        owner: UserID,
        id: DatabaseID,
        delta: Decimal,
    ) -> Result<(), Error> {
        // The read and write happen under a single acquisition of the
        // connection mutex, so concurrent adjustments against the same
        // account cannot lose an update.
        let connection = self.lock()?;

        let balance = connection
            .prepare("SELECT balance FROM account WHERE id = ?1 AND owner_id = ?2")?
            .query_row(params![id, owner.as_i64()], |row| decimal_from_row(row, 0))?;

        connection.execute(
            "UPDATE account SET balance = ?1 WHERE id = ?2 AND owner_id = ?3",
            params![(balance + delta).to_string(), id, owner.as_i64()],
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::{
        Error,
        models::{Account, AccountType, UserID},
        stores::AccountStore,
        stores::sqlite::test_utils::get_test_store,
    };

    fn new_account(owner: UserID, name: &str) -> Account {
        Account {
            id: 0,
            owner,
            name: name.to_owned(),
            account_type: AccountType::Checking,
            balance: Decimal::new(10050, 2),
            currency: "USD".to_owned(),
            description: None,
            is_active: true,
        }
    }

    #[test]
    fn insert_assigns_id_and_round_trips() {
        let mut store = get_test_store();
        let owner = UserID::new(1);

        let account = store.insert_account(&new_account(owner, "Checking")).unwrap();

        assert_ne!(account.id, 0);
        assert_eq!(store.get_account(owner, account.id).unwrap(), account);
    }

    #[test]
    fn get_is_scoped_to_owner() {
        let mut store = get_test_store();
        let owner = UserID::new(1);
        let account = store.insert_account(&new_account(owner, "Checking")).unwrap();

        let result = store.get_account(UserID::new(2), account.id);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn adjust_balance_adds_delta() {
        let mut store = get_test_store();
        let owner = UserID::new(1);
        let account = store.insert_account(&new_account(owner, "Checking")).unwrap();

        store
            .adjust_balance(owner, account.id, Decimal::new(-2550, 2))
            .unwrap();

        assert_eq!(
            store.get_account(owner, account.id).unwrap().balance,
            Decimal::new(7500, 2)
        );
    }

    #[test]
    fn adjust_balance_of_missing_account_fails() {
        let mut store = get_test_store();

        let result = store.adjust_balance(UserID::new(1), 999, Decimal::ONE);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn update_overwrites_fields() {
        let mut store = get_test_store();
        let owner = UserID::new(1);
        let mut account = store.insert_account(&new_account(owner, "Checking")).unwrap();

        account.name = "Emergency Fund".to_owned();
        account.account_type = AccountType::Savings;
        account.is_active = false;
        store.update_account(&account).unwrap();

        assert_eq!(store.get_account(owner, account.id).unwrap(), account);
    }

    #[test]
    fn delete_removes_account() {
        let mut store = get_test_store();
        let owner = UserID::new(1);
        let account = store.insert_account(&new_account(owner, "Checking")).unwrap();

        store.delete_account(owner, account.id).unwrap();

        assert_eq!(store.get_account(owner, account.id), Err(Error::NotFound));
    }
}
