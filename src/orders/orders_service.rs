use async_trait::async_trait;
use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::orders_errors::{OrderError, Result};
use super::orders_import::{OrderImportResult, OrderImportRow};
use super::orders_model::{NewOrder, Order, OrderRecord, OrderUpdate, OrderView};
use super::orders_traits::{OrderRepositoryTrait, OrderServiceTrait};
use crate::constants::{DISPLAY_DECIMAL_PRECISION, USD_CURRENCY};
use crate::market_data::MarketDataServiceTrait;

/// Service for managing the order ledger
pub struct OrderService {
    repository: Arc<dyn OrderRepositoryTrait>,
    market_data_service: Arc<dyn MarketDataServiceTrait>,
}

impl OrderService {
    pub fn new(
        repository: Arc<dyn OrderRepositoryTrait>,
        market_data_service: Arc<dyn MarketDataServiceTrait>,
    ) -> Self {
        Self {
            repository,
            market_data_service,
        }
    }

    /// Annotates one order with its EUR-converted display fields, using the
    /// single request-scoped USD->EUR rate.
    fn build_view(record: OrderRecord, usd_to_eur: Decimal) -> OrderView {
        let order = record.order;
        let total = (order.price * order.quantity).round_dp(DISPLAY_DECIMAL_PRECISION);
        let (price_eur, total_eur) = if order.currency == USD_CURRENCY {
            (
                (order.price * usd_to_eur).round_dp(DISPLAY_DECIMAL_PRECISION),
                (total * usd_to_eur).round_dp(DISPLAY_DECIMAL_PRECISION),
            )
        } else {
            (order.price, total)
        };

        OrderView {
            order,
            account_name: record.account_name,
            account_type: record.account_type,
            price_eur,
            total,
            total_eur,
        }
    }
}

#[async_trait]
impl OrderServiceTrait for OrderService {
    fn create_order(&self, new_order: NewOrder) -> Result<Order> {
        self.repository.create(new_order)
    }

    fn update_order(&self, order_update: OrderUpdate) -> Result<Order> {
        self.repository.update(order_update)
    }

    fn delete_order(&self, order_id: &str) -> Result<()> {
        self.repository.delete(order_id)
    }

    fn get_order(&self, order_id: &str) -> Result<Order> {
        self.repository.get_by_id(order_id)
    }

    /// The flat order list, newest first, with EUR-converted fields
    async fn get_orders(&self) -> Result<Vec<OrderView>> {
        let records = self.repository.list()?;
        let usd_to_eur = self.market_data_service.get_usd_to_eur_rate().await;

        Ok(records
            .into_iter()
            .map(|record| Self::build_view(record, usd_to_eur))
            .collect())
    }

    /// Orders of one envelope, newest first, with EUR-converted fields
    async fn get_orders_for_envelope(
        &self,
        account_id: &str,
        account_type_id: &str,
    ) -> Result<Vec<OrderView>> {
        let records = self
            .repository
            .list_for_envelope(account_id, account_type_id)?;
        let usd_to_eur = self.market_data_service.get_usd_to_eur_rate().await;

        Ok(records
            .into_iter()
            .map(|record| Self::build_view(record, usd_to_eur))
            .collect())
    }

    /// Imports a batch of raw rows. Validation is row-tolerant: bad rows are
    /// reported and skipped, the surviving rows are inserted all-or-nothing.
    fn import_orders(&self, rows: Vec<OrderImportRow>) -> Result<OrderImportResult> {
        if rows.is_empty() {
            return Err(OrderError::ImportError(
                "No orders provided for import".to_string(),
            ));
        }

        let mut valid: Vec<NewOrder> = Vec::with_capacity(rows.len());
        let mut errors = Vec::new();

        for (index, raw) in rows.into_iter().enumerate() {
            match raw.into_new_order(index + 1) {
                Ok(new_order) => valid.push(new_order),
                Err(err) => errors.push(err),
            }
        }

        debug!(
            "Importing {} order(s), {} row(s) rejected",
            valid.len(),
            errors.len()
        );

        let imported = if valid.is_empty() {
            Vec::new()
        } else {
            self.repository.bulk_insert(valid)?
        };

        Ok(OrderImportResult { imported, errors })
    }
}
