use rust_decimal::Decimal;

use super::accounts_model::{AccountHoldings, AccountType, AccountWithTypes, Envelope, NewAccount};
use super::accounts_errors::Result;

/// Trait defining the contract for Account repository operations.
pub trait AccountRepositoryTrait: Send + Sync {
    fn create(&self, new_account: NewAccount) -> Result<AccountWithTypes>;
    fn get_by_id(&self, account_id: &str) -> Result<AccountWithTypes>;
    fn list(&self) -> Result<Vec<AccountWithTypes>>;
    fn list_account_types(&self) -> Result<Vec<AccountType>>;
    fn delete(&self, account_id: &str) -> Result<usize>;
    fn update_envelope_cash(
        &self,
        account_id: &str,
        account_type_id: &str,
        cash: Decimal,
    ) -> Result<Envelope>;
    fn get_accounts_with_holdings(&self, account_id: Option<&str>)
        -> Result<Vec<AccountHoldings>>;
}

/// Trait defining the contract for Account service operations.
pub trait AccountServiceTrait: Send + Sync {
    fn create_account(&self, new_account: NewAccount) -> Result<AccountWithTypes>;
    fn get_account(&self, account_id: &str) -> Result<AccountWithTypes>;
    fn list_accounts(&self) -> Result<Vec<AccountWithTypes>>;
    fn list_account_types(&self) -> Result<Vec<AccountType>>;
    fn delete_account(&self, account_id: &str) -> Result<()>;
    fn update_envelope_cash(
        &self,
        account_id: &str,
        account_type_id: &str,
        cash: Decimal,
    ) -> Result<Envelope>;
    fn get_accounts_with_holdings(&self, account_id: Option<&str>)
        -> Result<Vec<AccountHoldings>>;
}
