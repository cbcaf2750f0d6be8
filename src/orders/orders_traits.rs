use async_trait::async_trait;

use super::orders_import::{OrderImportResult, OrderImportRow};
use super::orders_model::{NewOrder, Order, OrderRecord, OrderUpdate, OrderView};
use super::orders_errors::Result;

/// Trait defining the contract for Order repository operations.
pub trait OrderRepositoryTrait: Send + Sync {
    fn create(&self, new_order: NewOrder) -> Result<Order>;
    fn update(&self, order_update: OrderUpdate) -> Result<Order>;
    fn delete(&self, order_id: &str) -> Result<()>;
    fn get_by_id(&self, order_id: &str) -> Result<Order>;
    fn list(&self) -> Result<Vec<OrderRecord>>;
    fn list_for_envelope(
        &self,
        account_id: &str,
        account_type_id: &str,
    ) -> Result<Vec<OrderRecord>>;
    fn bulk_insert(&self, new_orders: Vec<NewOrder>) -> Result<Vec<Order>>;
}

/// Trait defining the contract for Order service operations.
#[async_trait]
pub trait OrderServiceTrait: Send + Sync {
    fn create_order(&self, new_order: NewOrder) -> Result<Order>;
    fn update_order(&self, order_update: OrderUpdate) -> Result<Order>;
    fn delete_order(&self, order_id: &str) -> Result<()>;
    fn get_order(&self, order_id: &str) -> Result<Order>;
    async fn get_orders(&self) -> Result<Vec<OrderView>>;
    async fn get_orders_for_envelope(
        &self,
        account_id: &str,
        account_type_id: &str,
    ) -> Result<Vec<OrderView>>;
    fn import_orders(&self, rows: Vec<OrderImportRow>) -> Result<OrderImportResult>;
}
