use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use crate::{
    db_types::{NewOrder, NewOrderItem, Order, OrderId, OrderItem, OrderStatusType},
    sqlite::{create_schema, db_url, new_pool, order_items, orders},
    traits::{SettlementDatabase, SettlementError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL from the environment, applying the schema if needed.
    pub async fn new(max_connections: u32) -> Result<Self, SettlementError> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SettlementError> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        create_schema(&pool).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl SettlementDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order(&self, order: NewOrder, items: Vec<NewOrderItem>) -> Result<Order, SettlementError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::insert_order(order, &mut tx).await?;
        for item in items {
            order_items::insert_order_item(&order.order_id, item, &mut tx).await?;
        }
        tx.commit().await?;
        debug!("🗃️ Order {} has been saved in the DB with id {}", order.order_id, order.id);
        Ok(order)
    }

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, SettlementError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order_by_order_id(order_id, &mut conn).await
    }

    async fn fetch_order_items(&self, order_id: &OrderId) -> Result<Vec<OrderItem>, SettlementError> {
        let mut conn = self.pool.acquire().await?;
        order_items::fetch_order_items(order_id, &mut conn).await
    }

    async fn fetch_orders_by_status(&self, status: OrderStatusType) -> Result<Vec<Order>, SettlementError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_orders_by_status(status, &mut conn).await
    }

    async fn update_order_status(
        &self,
        order_id: &OrderId,
        expected: OrderStatusType,
        new_status: OrderStatusType,
        provider_ref: Option<String>,
    ) -> Result<Option<Order>, SettlementError> {
        let mut conn = self.pool.acquire().await?;
        let result = orders::update_order_status(order_id, expected, new_status, provider_ref, &mut conn).await?;
        if let Some(order) = &result {
            debug!("🗃️ Order {} is now {}", order.order_id, order.status);
        }
        Ok(result)
    }
}
