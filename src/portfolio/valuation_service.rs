use async_trait::async_trait;
use log::debug;
use std::collections::HashSet;
use std::sync::Arc;

use super::portfolio_errors::Result;
use super::valuation_calculator::build_account_valuation;
use super::valuation_model::PortfolioValuation;
use crate::accounts::AccountRepositoryTrait;
use crate::market_data::MarketDataServiceTrait;

/// Trait defining the contract for valuation operations.
#[async_trait]
pub trait ValuationServiceTrait: Send + Sync {
    /// Computes the valuation tree for one account, or for the whole
    /// portfolio when no account id is given. Best-effort under quote or FX
    /// failure; only a ledger read failure is surfaced.
    async fn get_portfolio_valuation(&self, account_id: Option<&str>)
        -> Result<PortfolioValuation>;
}

/// The position aggregator: turns the raw ledger into the valuation tree
/// using one batch of live quotes and one FX rate per invocation.
pub struct ValuationService {
    account_repository: Arc<dyn AccountRepositoryTrait>,
    market_data_service: Arc<dyn MarketDataServiceTrait>,
}

impl ValuationService {
    pub fn new(
        account_repository: Arc<dyn AccountRepositoryTrait>,
        market_data_service: Arc<dyn MarketDataServiceTrait>,
    ) -> Self {
        Self {
            account_repository,
            market_data_service,
        }
    }
}

#[async_trait]
impl ValuationServiceTrait for ValuationService {
    async fn get_portfolio_valuation(
        &self,
        account_id: Option<&str>,
    ) -> Result<PortfolioValuation> {
        let holdings = self
            .account_repository
            .get_accounts_with_holdings(account_id)?;

        // One quote per distinct symbol per request, never per order.
        let symbols: Vec<String> = holdings
            .iter()
            .flat_map(|account| &account.envelopes)
            .flat_map(|envelope| &envelope.orders)
            .map(|order| order.symbol.trim().to_uppercase())
            .collect::<HashSet<String>>()
            .into_iter()
            .collect();

        debug!(
            "Valuing {} account(s) across {} distinct symbol(s)",
            holdings.len(),
            symbols.len()
        );

        let quotes = self.market_data_service.get_quotes(&symbols).await;
        let usd_to_eur = self.market_data_service.get_usd_to_eur_rate().await;

        let accounts: Vec<_> = holdings
            .iter()
            .map(|account| build_account_valuation(account, &quotes, usd_to_eur))
            .collect();

        let total_value = accounts.iter().map(|a| a.total_value).sum();

        Ok(PortfolioValuation {
            total_value,
            accounts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::{
        Account, AccountError, AccountHoldings, AccountType, AccountWithTypes, Envelope,
        EnvelopeHoldings, NewAccount,
    };
    use crate::market_data::{MarketDataError, QuoteSummary, SymbolQuote};
    use crate::orders::{Order, OrderSide};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    struct FixedLedger {
        holdings: Vec<AccountHoldings>,
    }

    impl AccountRepositoryTrait for FixedLedger {
        fn create(&self, _new_account: NewAccount) -> crate::accounts::accounts_errors::Result<AccountWithTypes> {
            unimplemented!()
        }
        fn get_by_id(&self, _account_id: &str) -> crate::accounts::accounts_errors::Result<AccountWithTypes> {
            unimplemented!()
        }
        fn list(&self) -> crate::accounts::accounts_errors::Result<Vec<AccountWithTypes>> {
            unimplemented!()
        }
        fn list_account_types(&self) -> crate::accounts::accounts_errors::Result<Vec<AccountType>> {
            unimplemented!()
        }
        fn delete(&self, _account_id: &str) -> crate::accounts::accounts_errors::Result<usize> {
            unimplemented!()
        }
        fn update_envelope_cash(
            &self,
            _account_id: &str,
            _account_type_id: &str,
            _cash: Decimal,
        ) -> crate::accounts::accounts_errors::Result<Envelope> {
            unimplemented!()
        }
        fn get_accounts_with_holdings(
            &self,
            account_id: Option<&str>,
        ) -> crate::accounts::accounts_errors::Result<Vec<AccountHoldings>> {
            match account_id {
                None => Ok(self.holdings.clone()),
                Some(id) => {
                    let filtered: Vec<_> = self
                        .holdings
                        .iter()
                        .filter(|h| h.account.id == id)
                        .cloned()
                        .collect();
                    if filtered.is_empty() {
                        Err(AccountError::NotFound(id.to_string()))
                    } else {
                        Ok(filtered)
                    }
                }
            }
        }
    }

    struct StaticQuotes {
        quotes: HashMap<String, SymbolQuote>,
        usd_to_eur: Decimal,
    }

    #[async_trait]
    impl MarketDataServiceTrait for StaticQuotes {
        async fn get_quote(
            &self,
            symbol: &str,
        ) -> crate::market_data::market_data_errors::Result<SymbolQuote> {
            self.quotes
                .get(symbol)
                .cloned()
                .ok_or_else(|| MarketDataError::NotFound(symbol.to_string()))
        }

        async fn get_quotes(&self, symbols: &[String]) -> HashMap<String, SymbolQuote> {
            symbols
                .iter()
                .filter_map(|s| self.quotes.get(s).map(|q| (s.clone(), q.clone())))
                .collect()
        }

        async fn get_usd_to_eur_rate(&self) -> Decimal {
            self.usd_to_eur
        }

        async fn search_ticker(
            &self,
            _query: &str,
        ) -> crate::market_data::market_data_errors::Result<Vec<QuoteSummary>> {
            Ok(vec![])
        }
    }

    fn sample_holdings() -> Vec<AccountHoldings> {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let buy = |symbol: &str, quantity: Decimal, price: Decimal| Order {
            id: uuid::Uuid::new_v4().to_string(),
            account_id: "acc-1".to_string(),
            account_type_id: "pea".to_string(),
            symbol: symbol.to_string(),
            side: OrderSide::Buy,
            quantity,
            price,
            currency: "EUR".to_string(),
            order_date: date,
            created_at: date,
        };

        vec![AccountHoldings {
            account: Account {
                id: "acc-1".to_string(),
                name: "Boursorama".to_string(),
                ..Default::default()
            },
            envelopes: vec![EnvelopeHoldings {
                envelope: Envelope {
                    account_id: "acc-1".to_string(),
                    account_type_id: "pea".to_string(),
                    type_name: "PEA".to_string(),
                    cash: dec!(500),
                },
                orders: vec![buy("X", dec!(10), dec!(100)), buy("X", dec!(5), dec!(120))],
            }],
        }]
    }

    #[tokio::test]
    async fn valuation_tree_rolls_up_to_portfolio_total() {
        let market_data = StaticQuotes {
            quotes: [(
                "X".to_string(),
                SymbolQuote {
                    symbol: "X".to_string(),
                    long_name: None,
                    short_name: None,
                    price: dec!(110),
                },
            )]
            .into_iter()
            .collect(),
            usd_to_eur: dec!(0.93),
        };
        let service = ValuationService::new(
            Arc::new(FixedLedger {
                holdings: sample_holdings(),
            }),
            Arc::new(market_data),
        );

        let valuation = service.get_portfolio_valuation(None).await.unwrap();

        // 15 shares @ 110 + 500 cash
        assert_eq!(valuation.total_value, dec!(2150));
        assert_eq!(valuation.accounts.len(), 1);
        let position = &valuation.accounts[0].envelopes[0].positions[0];
        assert_eq!(position.quantity, dec!(15));
        assert_eq!(position.avg_price.round_dp(2), dec!(106.67));
    }

    #[tokio::test]
    async fn valuation_is_best_effort_without_quotes() {
        let market_data = StaticQuotes {
            quotes: HashMap::new(),
            usd_to_eur: dec!(0.93),
        };
        let service = ValuationService::new(
            Arc::new(FixedLedger {
                holdings: sample_holdings(),
            }),
            Arc::new(market_data),
        );

        let valuation = service.get_portfolio_valuation(None).await.unwrap();

        // values at cost: 1600 + 500 cash
        assert_eq!(valuation.total_value, dec!(2100));
        let envelope = &valuation.accounts[0].envelopes[0];
        assert_eq!(envelope.diff_value, dec!(0));
    }
}
