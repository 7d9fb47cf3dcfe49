use thiserror::Error;

use crate::{
    db_types::{NewOrder, Order, OrderId, ProductId},
    traits::{InsertOrderResult, OrderManagement},
};

/// This trait defines the write behaviour for backends supporting the order engine.
///
/// Every method that changes more than one row does so inside a single database transaction. If any statement fails,
/// the transaction is rolled back and no partial state is observable afterwards.
#[allow(async_fn_in_trait)]
pub trait OrderStore: Clone + OrderManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Takes a validated order, and in a single atomic transaction,
    /// * inserts the order header with status `pending`,
    /// * inserts one line item per requested item, snapshotting name, price, quantity and subtotal from the request,
    /// * decrements each product's stock and increments its sales by the ordered quantity.
    ///
    /// The inventory adjustment is a relative update that only applies while `stock >= quantity`. If the guard
    /// refuses an item, the whole transaction is rolled back and [`OrderStoreError::InsufficientStock`] (or
    /// [`OrderStoreError::ProductNotFound`]) is returned, carrying the stock level observed inside the transaction.
    /// The product is named by its catalogue title, or by the requested name if it does not exist.
    async fn insert_order_with_items(&self, order: &NewOrder) -> Result<InsertOrderResult, OrderStoreError>;

    /// Marks the order as `paid`. Stock is not re-validated.
    ///
    /// Implementations must make the transition with a single conditional write, so that concurrent calls for the
    /// same order (or alongside order inserts) neither fail nor report the transition twice.
    ///
    /// Returns the updated order, and `true` if the status actually changed (`false` if the order was already paid).
    async fn mark_order_paid(&self, order_id: OrderId) -> Result<(Order, bool), OrderStoreError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), OrderStoreError> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderStoreError {
    #[error("We have an internal database engine (configuration/uptime etc.) error: {0}")]
    DatabaseError(String),
    #[error("Cannot write an order without any line items")]
    EmptyOrder,
    #[error("Product {product_id} ({product_name}) does not exist")]
    ProductNotFound { product_id: ProductId, product_name: String },
    #[error(
        "Insufficient stock for product {product_id} ({product_name}). Available: {available}, Requested: {requested}"
    )]
    InsufficientStock { product_id: ProductId, product_name: String, available: i64, requested: i64 },
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
}

impl From<sqlx::Error> for OrderStoreError {
    fn from(e: sqlx::Error) -> Self {
        OrderStoreError::DatabaseError(e.to_string())
    }
}
