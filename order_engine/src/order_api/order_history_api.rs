use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{BuyerId, OrderId},
    order_api::{
        errors::OrderHistoryError,
        order_objects::{OrderQueryFilter, OrderWithItems},
        read_model::collapse_order_rows,
    },
    traits::OrderManagement,
};

/// Read-only access to placed orders, each with its line items.
///
/// Orders are listed most recent first. Line items keep the order in which they were written.
pub struct OrderHistoryApi<B> {
    db: B,
}

impl<B> Debug for OrderHistoryApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderHistoryApi")
    }
}

impl<B> OrderHistoryApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> OrderHistoryApi<B>
where B: OrderManagement
{
    pub async fn list_orders(&self) -> Result<Vec<OrderWithItems>, OrderHistoryError> {
        self.search(&OrderQueryFilter::default()).await
    }

    /// Lists the orders of a single buyer. Fails with [`OrderHistoryError::BuyerNotFound`] if the buyer does not
    /// exist; a buyer without orders gets an empty list.
    pub async fn list_orders_for_buyer(&self, buyer_id: BuyerId) -> Result<Vec<OrderWithItems>, OrderHistoryError> {
        if !self.db.buyer_exists(buyer_id).await? {
            debug!("📦️ Cannot list orders. Buyer {buyer_id} does not exist");
            return Err(OrderHistoryError::BuyerNotFound(buyer_id));
        }
        self.search(&OrderQueryFilter::default().with_buyer_id(buyer_id)).await
    }

    pub async fn fetch_order(&self, order_id: OrderId) -> Result<OrderWithItems, OrderHistoryError> {
        let mut orders = self.search(&OrderQueryFilter::default().with_order_id(order_id)).await?;
        orders.pop().ok_or(OrderHistoryError::OrderNotFound(order_id))
    }

    pub async fn search(&self, filter: &OrderQueryFilter) -> Result<Vec<OrderWithItems>, OrderHistoryError> {
        let rows = self.db.fetch_order_rows(filter).await?;
        let orders = collapse_order_rows(rows);
        trace!("📦️ {} order(s) found. {filter}", orders.len());
        Ok(orders)
    }
}
