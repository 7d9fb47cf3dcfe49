use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::db_types::{BuyerId, Money, Order, OrderId, OrderLineItem, OrderStatusType, ProductId};

//--------------------------------------   NewOrderRequest   ---------------------------------------------------------
/// A typed, but not yet validated, order request.
///
/// The field names follow the wire format (`userId`, `totalAmount`, `orderItems`, …). Monetary values are in minor
/// units. Requests arriving as raw JSON with decimal amounts should go through
/// [`crate::order_api::validation::validate_order_json`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderRequest {
    #[serde(rename = "userId")]
    pub buyer_id: BuyerId,
    pub total_amount: Money,
    pub shipping_fee: Money,
    pub shipping_address: String,
    #[serde(rename = "orderItems")]
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i64,
    pub price: Money,
    pub subtotal: Money,
}

impl OrderItemRequest {
    pub fn new<S: Into<String>>(product_id: ProductId, product_name: S, quantity: i64, price: Money) -> Self {
        let subtotal = price.saturating_mul(quantity);
        Self { product_id, product_name: product_name.into(), quantity, price, subtotal }
    }
}

impl NewOrderRequest {
    /// Builds a request whose declared total is consistent with its items and shipping fee.
    pub fn new<S: Into<String>>(
        buyer_id: BuyerId,
        shipping_address: S,
        shipping_fee: Money,
        items: Vec<OrderItemRequest>,
    ) -> Self {
        let total_amount = items.iter().fold(shipping_fee, |total, i| total.saturating_add(i.subtotal));
        Self { buyer_id, total_amount, shipping_fee, shipping_address: shipping_address.into(), items }
    }

    pub fn with_total_amount(mut self, total_amount: Money) -> Self {
        self.total_amount = total_amount;
        self
    }
}

//--------------------------------------   OrderWithItems    ---------------------------------------------------------
/// An order header together with its line items, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_name: Option<String>,
    #[serde(rename = "orderItems")]
    pub items: Vec<OrderLineItem>,
}

impl OrderWithItems {
    pub fn new(order: Order, buyer_name: Option<String>) -> Self {
        Self { order, buyer_name, items: Vec::new() }
    }

    pub fn id(&self) -> OrderId {
        self.order.id
    }

    pub fn total_quantity(&self) -> i64 {
        self.items.iter().fold(0, |total, i| total.saturating_add(i.quantity))
    }
}

//--------------------------------------   OrderQueryFilter  ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderQueryFilter {
    pub buyer_id: Option<BuyerId>,
    pub order_id: Option<OrderId>,
    pub status: Option<OrderStatusType>,
}

impl OrderQueryFilter {
    pub fn with_buyer_id(mut self, buyer_id: BuyerId) -> Self {
        self.buyer_id = Some(buyer_id);
        self
    }

    pub fn with_order_id(mut self, order_id: OrderId) -> Self {
        self.order_id = Some(order_id);
        self
    }

    pub fn with_status(mut self, status: OrderStatusType) -> Self {
        self.status = Some(status);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.buyer_id.is_none() && self.order_id.is_none() && self.status.is_none()
    }
}

impl Display for OrderQueryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "No filters.")?;
            return Ok(());
        }
        if let Some(buyer_id) = &self.buyer_id {
            write!(f, "buyer_id: {buyer_id}. ")?;
        }
        if let Some(order_id) = &self.order_id {
            write!(f, "order_id: {order_id}. ")?;
        }
        if let Some(status) = &self.status {
            write!(f, "status: {status}. ")?;
        }
        Ok(())
    }
}
