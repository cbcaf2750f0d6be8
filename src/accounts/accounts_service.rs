use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::accounts_errors::Result;
use super::accounts_model::{AccountHoldings, AccountType, AccountWithTypes, Envelope, NewAccount};
use super::accounts_traits::{AccountRepositoryTrait, AccountServiceTrait};

/// Service for managing accounts and their envelopes
pub struct AccountService {
    repository: Arc<dyn AccountRepositoryTrait>,
}

impl AccountService {
    pub fn new(repository: Arc<dyn AccountRepositoryTrait>) -> Self {
        Self { repository }
    }
}

impl AccountServiceTrait for AccountService {
    fn create_account(&self, new_account: NewAccount) -> Result<AccountWithTypes> {
        debug!(
            "Creating account '{}' with {} envelope(s)",
            new_account.name,
            new_account.account_type_ids.len()
        );
        self.repository.create(new_account)
    }

    fn get_account(&self, account_id: &str) -> Result<AccountWithTypes> {
        self.repository.get_by_id(account_id)
    }

    fn list_accounts(&self) -> Result<Vec<AccountWithTypes>> {
        self.repository.list()
    }

    fn list_account_types(&self) -> Result<Vec<AccountType>> {
        self.repository.list_account_types()
    }

    fn delete_account(&self, account_id: &str) -> Result<()> {
        self.repository.delete(account_id)?;
        Ok(())
    }

    fn update_envelope_cash(
        &self,
        account_id: &str,
        account_type_id: &str,
        cash: Decimal,
    ) -> Result<Envelope> {
        self.repository
            .update_envelope_cash(account_id, account_type_id, cash)
    }

    fn get_accounts_with_holdings(
        &self,
        account_id: Option<&str>,
    ) -> Result<Vec<AccountHoldings>> {
        self.repository.get_accounts_with_holdings(account_id)
    }
}
