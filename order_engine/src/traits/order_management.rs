use crate::{
    db_types::{BuyerId, OrderJoinRow, Product, ProductId, ProductStock},
    order_api::order_objects::OrderQueryFilter,
    traits::OrderStoreError,
};

/// The `OrderManagement` trait defines the read-only queries the order engine makes against its backend.
///
/// Implementations must be safe to call concurrently: the stock check issues one
/// [`fetch_product_stock`](OrderManagement::fetch_product_stock) call per distinct product, all in flight at the same
/// time.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Checks whether a buyer with the given id exists. The call succeeds if the query succeeds, returning the
    /// existence of the buyer as a boolean.
    async fn buyer_exists(&self, buyer_id: BuyerId) -> Result<bool, OrderStoreError>;

    /// Fetches the title and current stock level of a product. If the product does not exist, `None` is returned.
    ///
    /// The result is a snapshot and may be stale by the time an order is written.
    async fn fetch_product_stock(&self, product_id: ProductId) -> Result<Option<ProductStock>, OrderStoreError>;

    /// Fetches the full product record, including the sales counter.
    async fn fetch_product(&self, product_id: ProductId) -> Result<Option<Product>, OrderStoreError>;

    /// Fetches the flat `orders ⟕ order_items` rows matching the filter.
    ///
    /// Rows are ordered most-recent order first (ties broken by descending order id), and by line item id within an
    /// order. Orders without line items yield a single row with `NULL` item columns.
    async fn fetch_order_rows(&self, filter: &OrderQueryFilter) -> Result<Vec<OrderJoinRow>, OrderStoreError>;
}
