//! `SqliteDatabase` is a concrete implementation of an order engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use log::*;
use sqlx::{migrate::MigrateError, SqlitePool};

use super::db::{buyers, new_pool, orders, products, PoolSettings};
use crate::{
    config::EngineConfig,
    db_types::{BuyerId, NewOrder, Order, OrderId, OrderJoinRow, Product, ProductId, ProductStock},
    order_api::order_objects::OrderQueryFilter,
    traits::{InsertOrderResult, OrderManagement, OrderStore, OrderStoreError},
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

impl OrderManagement for SqliteDatabase {
    async fn buyer_exists(&self, buyer_id: BuyerId) -> Result<bool, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let exists = buyers::buyer_exists(buyer_id, &mut conn).await?;
        trace!("🗃️ Buyer {buyer_id} exists: {exists}");
        Ok(exists)
    }

    async fn fetch_product_stock(&self, product_id: ProductId) -> Result<Option<ProductStock>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let stock = products::fetch_product_stock(product_id, &mut conn).await?;
        Ok(stock)
    }

    async fn fetch_product(&self, product_id: ProductId) -> Result<Option<Product>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product(product_id, &mut conn).await?;
        Ok(product)
    }

    async fn fetch_order_rows(&self, filter: &OrderQueryFilter) -> Result<Vec<OrderJoinRow>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let rows = orders::fetch_order_rows(filter, &mut conn).await?;
        Ok(rows)
    }
}

impl OrderStore for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order_with_items(&self, order: &NewOrder) -> Result<InsertOrderResult, OrderStoreError> {
        if order.items.is_empty() {
            return Err(OrderStoreError::EmptyOrder);
        }
        // Dropping `tx` on any early return rolls the whole transaction back.
        let mut tx = self.pool.begin().await?;
        let header = orders::insert_order_header(order, &mut tx).await?;
        let mut items = Vec::with_capacity(order.items.len());
        for item in &order.items {
            let line_item = orders::insert_line_item(header.id, item, &mut tx).await?;
            trace!(
                "🗃️ Line item {} ({} x {}) added to order {}",
                line_item.id, item.quantity, item.product_name, header.id
            );
            products::take_stock(item, &mut tx).await.map_err(|e| {
                debug!("🗃️ Order for buyer {} is being rolled back. {e}", order.buyer_id);
                e
            })?;
            items.push(line_item);
        }
        tx.commit().await?;
        debug!("🗃️ Order {} has been saved in the DB with {} line items", header.id, items.len());
        Ok(InsertOrderResult::new(header, items))
    }

    async fn mark_order_paid(&self, order_id: OrderId) -> Result<(Order, bool), OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        if let Some(order) = orders::mark_paid_if_pending(order_id, &mut conn).await? {
            debug!("🗃️ Order {order_id} marked as paid");
            return Ok((order, true));
        }
        let order =
            orders::fetch_order_by_id(order_id, &mut conn).await?.ok_or(OrderStoreError::OrderNotFound(order_id))?;
        debug!("🗃️ Order {order_id} is already {}. No action to take", order.status);
        Ok((order, false))
    }

    async fn close(&mut self) -> Result<(), OrderStoreError> {
        self.pool.close().await;
        Ok(())
    }
}

impl SqliteDatabase {
    /// Creates a new database API object from the engine configuration.
    pub async fn new(config: &EngineConfig) -> Result<Self, OrderStoreError> {
        let settings = PoolSettings {
            max_connections: config.max_connections,
            busy_timeout: config.busy_timeout,
            create_if_missing: config.create_if_missing,
        };
        Self::new_with_settings(&config.database_url, settings).await
    }

    /// Creates a new database API object for `url`, using the default pool settings apart from the connection limit.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, OrderStoreError> {
        let config = EngineConfig::default();
        let settings = PoolSettings {
            max_connections,
            busy_timeout: config.busy_timeout,
            create_if_missing: config.create_if_missing,
        };
        Self::new_with_settings(url, settings).await
    }

    async fn new_with_settings(url: &str, settings: PoolSettings) -> Result<Self, OrderStoreError> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, settings).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date by running the embedded migrations.
    pub async fn run_migrations(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Migrations complete for {}", self.url);
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
