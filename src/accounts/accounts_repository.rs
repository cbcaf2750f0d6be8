use diesel::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

use crate::db::{get_connection, DbPool};
use crate::orders::{Order, OrderDB};
use crate::schema::{account_envelopes, account_types, accounts, orders};

use super::accounts_errors::{AccountError, Result};
use super::accounts_traits::AccountRepositoryTrait;
use super::accounts_model::{
    cash_to_db, AccountDB, AccountHoldings, AccountType, AccountTypeDB, AccountWithTypes,
    Envelope, EnvelopeDB, EnvelopeHoldings, NewAccount,
};

/// Repository for accounts, account types and envelope cash balances
pub struct AccountRepository {
    pool: Arc<DbPool>,
}

impl AccountRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Creates an account and its envelope rows in one transaction
    pub fn create(&self, new_account: NewAccount) -> Result<AccountWithTypes> {
        new_account.validate()?;

        let mut conn = get_connection(&self.pool)
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        conn.transaction(|conn| {
            let types = account_types::table
                .filter(account_types::id.eq_any(&new_account.account_type_ids))
                .order(account_types::name.asc())
                .load::<AccountTypeDB>(conn)?;

            if types.len() != new_account.account_type_ids.len() {
                return Err(AccountError::NotFound(
                    "One or more account types do not exist".to_string(),
                ));
            }

            let now = chrono::Utc::now().naive_utc();
            let account_db = AccountDB {
                id: uuid::Uuid::new_v4().to_string(),
                name: new_account.name.trim().to_string(),
                created_at: now,
                updated_at: now,
            };

            diesel::insert_into(accounts::table)
                .values(&account_db)
                .execute(conn)?;

            let envelope_rows: Vec<EnvelopeDB> = types
                .iter()
                .map(|t| EnvelopeDB {
                    account_id: account_db.id.clone(),
                    account_type_id: t.id.clone(),
                    cash: 0.0,
                })
                .collect();

            diesel::insert_into(account_envelopes::table)
                .values(&envelope_rows)
                .execute(conn)?;

            Ok(AccountWithTypes {
                account: account_db.into(),
                types: types.into_iter().map(AccountType::from).collect(),
            })
        })
    }

    /// Retrieves an account and its types by account ID
    pub fn get_by_id(&self, account_id: &str) -> Result<AccountWithTypes> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        let account = accounts::table
            .find(account_id)
            .first::<AccountDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    AccountError::NotFound(format!("Account with id {} not found", account_id))
                }
                _ => AccountError::DatabaseError(e.to_string()),
            })?;

        let types = account_envelopes::table
            .inner_join(account_types::table)
            .filter(account_envelopes::account_id.eq(account_id))
            .select(AccountTypeDB::as_select())
            .order(account_types::name.asc())
            .load::<AccountTypeDB>(&mut conn)?;

        Ok(AccountWithTypes {
            account: account.into(),
            types: types.into_iter().map(AccountType::from).collect(),
        })
    }

    /// Lists all accounts with their types, ordered by name
    pub fn list(&self) -> Result<Vec<AccountWithTypes>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        let account_rows = accounts::table
            .order(accounts::name.asc())
            .load::<AccountDB>(&mut conn)?;

        let pairs = account_envelopes::table
            .inner_join(account_types::table)
            .select((account_envelopes::account_id, AccountTypeDB::as_select()))
            .order(account_types::name.asc())
            .load::<(String, AccountTypeDB)>(&mut conn)?;

        let mut types_by_account: HashMap<String, Vec<AccountType>> = HashMap::new();
        for (acc_id, type_db) in pairs {
            types_by_account
                .entry(acc_id)
                .or_default()
                .push(type_db.into());
        }

        Ok(account_rows
            .into_iter()
            .map(|a| {
                let types = types_by_account.remove(&a.id).unwrap_or_default();
                AccountWithTypes {
                    account: a.into(),
                    types,
                }
            })
            .collect())
    }

    /// Lists the seeded account type catalog
    pub fn list_account_types(&self) -> Result<Vec<AccountType>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        account_types::table
            .order(account_types::name.asc())
            .load::<AccountTypeDB>(&mut conn)
            .map(|rows| rows.into_iter().map(AccountType::from).collect())
            .map_err(AccountError::from)
    }

    /// Deletes an account; envelopes and orders go with it (FK cascade)
    pub fn delete(&self, account_id: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        let affected = diesel::delete(accounts::table.find(account_id)).execute(&mut conn)?;

        if affected == 0 {
            return Err(AccountError::NotFound(format!(
                "Account with id {} not found",
                account_id
            )));
        }

        Ok(affected)
    }

    /// Sets the cash balance of one envelope. Last write wins; concurrent
    /// updates are not serialized beyond the single UPDATE statement.
    pub fn update_envelope_cash(
        &self,
        account_id: &str,
        account_type_id: &str,
        cash: Decimal,
    ) -> Result<Envelope> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        let affected = diesel::update(
            account_envelopes::table.find((account_id.to_string(), account_type_id.to_string())),
        )
        .set(account_envelopes::cash.eq(cash_to_db(cash)))
        .execute(&mut conn)?;

        if affected == 0 {
            return Err(AccountError::NotFound(format!(
                "Envelope {}/{} not found",
                account_id, account_type_id
            )));
        }

        let type_name = account_types::table
            .find(account_type_id)
            .select(account_types::name)
            .first::<String>(&mut conn)?;

        Ok(Envelope {
            account_id: account_id.to_string(),
            account_type_id: account_type_id.to_string(),
            type_name,
            cash,
        })
    }

    /// The read shape the valuation engine consumes: every account (or one,
    /// when `account_id` is given) with its envelopes, each envelope with its
    /// cash balance and date-ordered orders.
    pub fn get_accounts_with_holdings(
        &self,
        account_id: Option<&str>,
    ) -> Result<Vec<AccountHoldings>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        let mut account_query = accounts::table.into_boxed();
        if let Some(aid) = account_id {
            account_query = account_query.filter(accounts::id.eq(aid.to_string()));
        }
        let account_rows = account_query
            .order(accounts::name.asc())
            .load::<AccountDB>(&mut conn)?;

        let account_ids: Vec<String> = account_rows.iter().map(|a| a.id.clone()).collect();

        let envelope_rows = account_envelopes::table
            .inner_join(account_types::table)
            .filter(account_envelopes::account_id.eq_any(&account_ids))
            .select((EnvelopeDB::as_select(), account_types::name))
            .order((
                account_envelopes::account_id.asc(),
                account_envelopes::account_type_id.asc(),
            ))
            .load::<(EnvelopeDB, String)>(&mut conn)?;

        let order_rows = orders::table
            .filter(orders::account_id.eq_any(&account_ids))
            .order(orders::order_date.asc())
            .load::<OrderDB>(&mut conn)?;

        let mut orders_by_envelope: HashMap<(String, String), Vec<Order>> = HashMap::new();
        for row in order_rows {
            orders_by_envelope
                .entry((row.account_id.clone(), row.account_type_id.clone()))
                .or_default()
                .push(row.into());
        }

        let mut envelopes_by_account: HashMap<String, Vec<EnvelopeHoldings>> = HashMap::new();
        for (envelope_db, type_name) in envelope_rows {
            let key = envelope_db.account_id.clone();
            let envelope_orders = orders_by_envelope
                .remove(&(
                    envelope_db.account_id.clone(),
                    envelope_db.account_type_id.clone(),
                ))
                .unwrap_or_default();
            envelopes_by_account
                .entry(key)
                .or_default()
                .push(EnvelopeHoldings {
                    envelope: Envelope::from_db(envelope_db, type_name),
                    orders: envelope_orders,
                });
        }

        Ok(account_rows
            .into_iter()
            .map(|a| {
                let envelopes = envelopes_by_account.remove(&a.id).unwrap_or_default();
                AccountHoldings {
                    account: a.into(),
                    envelopes,
                }
            })
            .collect())
    }
}

impl AccountRepositoryTrait for AccountRepository {
    fn create(&self, new_account: NewAccount) -> Result<AccountWithTypes> {
        AccountRepository::create(self, new_account)
    }

    fn get_by_id(&self, account_id: &str) -> Result<AccountWithTypes> {
        AccountRepository::get_by_id(self, account_id)
    }

    fn list(&self) -> Result<Vec<AccountWithTypes>> {
        AccountRepository::list(self)
    }

    fn list_account_types(&self) -> Result<Vec<AccountType>> {
        AccountRepository::list_account_types(self)
    }

    fn delete(&self, account_id: &str) -> Result<usize> {
        AccountRepository::delete(self, account_id)
    }

    fn update_envelope_cash(
        &self,
        account_id: &str,
        account_type_id: &str,
        cash: Decimal,
    ) -> Result<Envelope> {
        AccountRepository::update_envelope_cash(self, account_id, account_type_id, cash)
    }

    fn get_accounts_with_holdings(
        &self,
        account_id: Option<&str>,
    ) -> Result<Vec<AccountHoldings>> {
        AccountRepository::get_accounts_with_holdings(self, account_id)
    }
}
