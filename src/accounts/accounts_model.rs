use chrono::NaiveDateTime;
use diesel::prelude::*;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::accounts_errors::{AccountError, Result};
use crate::orders::Order;
use crate::utils::decimal_serde::decimal_serde;

/// Domain model representing an account in the system
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// One of the envelope categories an account can be paired with (PEA, CTO,
/// Livret A, ...). Seeded reference data, never created by user action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountType {
    pub id: String,
    pub name: String,
}

/// Input model for creating a new account together with its envelopes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub name: String,
    pub account_type_ids: Vec<String>,
}

impl NewAccount {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AccountError::InvalidData(
                "Account name cannot be empty".to_string(),
            ));
        }
        if self.account_type_ids.is_empty() {
            return Err(AccountError::InvalidData(
                "An account needs at least one account type".to_string(),
            ));
        }
        Ok(())
    }
}

/// An account together with the types it is paired with
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountWithTypes {
    #[serde(flatten)]
    pub account: Account,
    pub types: Vec<AccountType>,
}

/// The Account x AccountType pairing carrying the envelope cash balance.
/// Cash may go negative; that is an explicit user entry, not validated away.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub account_id: String,
    pub account_type_id: String,
    pub type_name: String,
    #[serde(with = "decimal_serde")]
    pub cash: Decimal,
}

/// Read shape consumed by the valuation engine: one envelope with the
/// date-ordered ledger of its orders.
#[derive(Debug, Clone)]
pub struct EnvelopeHoldings {
    pub envelope: Envelope,
    pub orders: Vec<Order>,
}

/// Read shape consumed by the valuation engine: one account with all of its
/// envelopes and their orders.
#[derive(Debug, Clone)]
pub struct AccountHoldings {
    pub account: Account,
    pub envelopes: Vec<EnvelopeHoldings>,
}

/// Database model for accounts
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone,
)]
#[diesel(table_name = crate::schema::accounts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AccountDB {
    pub id: String,
    pub name: String,
    #[diesel(skip_insertion)]
    pub created_at: NaiveDateTime,
    #[diesel(skip_insertion)]
    pub updated_at: NaiveDateTime,
}

/// Database model for account types
#[derive(Queryable, Identifiable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::account_types)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AccountTypeDB {
    pub id: String,
    pub name: String,
}

/// Database model for the account/type pairing rows
#[derive(Queryable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::account_envelopes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct EnvelopeDB {
    pub account_id: String,
    pub account_type_id: String,
    pub cash: f64,
}

impl From<AccountDB> for Account {
    fn from(db: AccountDB) -> Self {
        Self {
            id: db.id,
            name: db.name,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<AccountTypeDB> for AccountType {
    fn from(db: AccountTypeDB) -> Self {
        Self {
            id: db.id,
            name: db.name,
        }
    }
}

impl Envelope {
    pub(crate) fn from_db(db: EnvelopeDB, type_name: String) -> Self {
        Self {
            account_id: db.account_id,
            account_type_id: db.account_type_id,
            type_name,
            cash: Decimal::from_f64_retain(db.cash).unwrap_or_default(),
        }
    }
}

pub(crate) fn cash_to_db(cash: Decimal) -> f64 {
    cash.to_f64().unwrap_or_default()
}
