use diesel::prelude::*;
use std::sync::Arc;

use crate::db::{get_connection, DbPool};
use crate::schema::{account_types, accounts, orders};

use super::orders_errors::{OrderError, Result};
use super::orders_model::{NewOrder, Order, OrderDB, OrderRecord, OrderSide, OrderUpdate};
use super::orders_traits::OrderRepositoryTrait;

/// Repository for the order ledger
pub struct OrderRepository {
    pool: Arc<DbPool>,
}

impl OrderRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Creates a new order in the database
    pub fn create(&self, new_order: NewOrder) -> Result<Order> {
        new_order.validate()?;
        let side = new_order.side.parse::<OrderSide>()?;

        let order_db = OrderDB::from_new(&new_order, uuid::Uuid::new_v4().to_string(), side);

        let mut conn =
            get_connection(&self.pool).map_err(|e| OrderError::DatabaseError(e.to_string()))?;

        diesel::insert_into(orders::table)
            .values(&order_db)
            .execute(&mut conn)?;

        Ok(order_db.into())
    }

    /// Replaces an existing order wholesale
    pub fn update(&self, order_update: OrderUpdate) -> Result<Order> {
        order_update.validate()?;
        let side = order_update.order.side.parse::<OrderSide>()?;

        let mut conn =
            get_connection(&self.pool).map_err(|e| OrderError::DatabaseError(e.to_string()))?;

        let existing = orders::table
            .find(&order_update.id)
            .first::<OrderDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    OrderError::NotFound(format!("Order with id {} not found", order_update.id))
                }
                _ => OrderError::DatabaseError(e.to_string()),
            })?;

        let mut order_db = OrderDB::from_new(&order_update.order, order_update.id.clone(), side);
        order_db.created_at = existing.created_at;

        diesel::update(orders::table.find(&order_update.id))
            .set(&order_db)
            .execute(&mut conn)?;

        Ok(order_db.into())
    }

    /// Deletes an order by its ID
    pub fn delete(&self, order_id: &str) -> Result<()> {
        let mut conn =
            get_connection(&self.pool).map_err(|e| OrderError::DatabaseError(e.to_string()))?;

        let affected = diesel::delete(orders::table.find(order_id)).execute(&mut conn)?;

        if affected == 0 {
            return Err(OrderError::NotFound(format!(
                "Order with id {} not found",
                order_id
            )));
        }

        Ok(())
    }

    /// Retrieves an order by its ID
    pub fn get_by_id(&self, order_id: &str) -> Result<Order> {
        let mut conn =
            get_connection(&self.pool).map_err(|e| OrderError::DatabaseError(e.to_string()))?;

        orders::table
            .find(order_id)
            .first::<OrderDB>(&mut conn)
            .map(Order::from)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    OrderError::NotFound(format!("Order with id {} not found", order_id))
                }
                _ => OrderError::DatabaseError(e.to_string()),
            })
    }

    /// Lists every order joined with its account and type names, newest first
    pub fn list(&self) -> Result<Vec<OrderRecord>> {
        let mut conn =
            get_connection(&self.pool).map_err(|e| OrderError::DatabaseError(e.to_string()))?;

        orders::table
            .inner_join(accounts::table)
            .inner_join(account_types::table)
            .select((OrderDB::as_select(), accounts::name, account_types::name))
            .order(orders::order_date.desc())
            .load::<(OrderDB, String, String)>(&mut conn)
            .map(|rows| {
                rows.into_iter()
                    .map(|(order_db, account_name, account_type)| OrderRecord {
                        order: order_db.into(),
                        account_name,
                        account_type,
                    })
                    .collect()
            })
            .map_err(OrderError::from)
    }

    /// Lists the orders of one envelope, newest first
    pub fn list_for_envelope(
        &self,
        account_id: &str,
        account_type_id: &str,
    ) -> Result<Vec<OrderRecord>> {
        let mut conn =
            get_connection(&self.pool).map_err(|e| OrderError::DatabaseError(e.to_string()))?;

        orders::table
            .inner_join(accounts::table)
            .inner_join(account_types::table)
            .filter(orders::account_id.eq(account_id))
            .filter(orders::account_type_id.eq(account_type_id))
            .select((OrderDB::as_select(), accounts::name, account_types::name))
            .order(orders::order_date.desc())
            .load::<(OrderDB, String, String)>(&mut conn)
            .map(|rows| {
                rows.into_iter()
                    .map(|(order_db, account_name, account_type)| OrderRecord {
                        order: order_db.into(),
                        account_name,
                        account_type,
                    })
                    .collect()
            })
            .map_err(OrderError::from)
    }

    /// Inserts a batch of orders in one transaction; the whole batch rolls
    /// back if any row fails.
    pub fn bulk_insert(&self, new_orders: Vec<NewOrder>) -> Result<Vec<Order>> {
        let mut rows: Vec<OrderDB> = Vec::with_capacity(new_orders.len());
        for new_order in &new_orders {
            new_order.validate()?;
            let side = new_order.side.parse::<OrderSide>()?;
            rows.push(OrderDB::from_new(
                new_order,
                uuid::Uuid::new_v4().to_string(),
                side,
            ));
        }

        let mut conn =
            get_connection(&self.pool).map_err(|e| OrderError::DatabaseError(e.to_string()))?;

        conn.transaction(|conn| {
            diesel::insert_into(orders::table)
                .values(&rows)
                .execute(conn)?;
            Ok::<_, OrderError>(())
        })?;

        Ok(rows.into_iter().map(Order::from).collect())
    }
}

impl OrderRepositoryTrait for OrderRepository {
    fn create(&self, new_order: NewOrder) -> Result<Order> {
        OrderRepository::create(self, new_order)
    }

    fn update(&self, order_update: OrderUpdate) -> Result<Order> {
        OrderRepository::update(self, order_update)
    }

    fn delete(&self, order_id: &str) -> Result<()> {
        OrderRepository::delete(self, order_id)
    }

    fn get_by_id(&self, order_id: &str) -> Result<Order> {
        OrderRepository::get_by_id(self, order_id)
    }

    fn list(&self) -> Result<Vec<OrderRecord>> {
        OrderRepository::list(self)
    }

    fn list_for_envelope(
        &self,
        account_id: &str,
        account_type_id: &str,
    ) -> Result<Vec<OrderRecord>> {
        OrderRepository::list_for_envelope(self, account_id, account_type_id)
    }

    fn bulk_insert(&self, new_orders: Vec<NewOrder>) -> Result<Vec<Order>> {
        OrderRepository::bulk_insert(self, new_orders)
    }
}
