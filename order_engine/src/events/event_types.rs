use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderLineItem};

/// Published after an order and its line items have been committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreatedEvent {
    pub order: Order,
    pub items: Vec<OrderLineItem>,
}

impl OrderCreatedEvent {
    pub fn new(order: Order, items: Vec<OrderLineItem>) -> Self {
        Self { order, items }
    }
}

/// Published when an order moves from `pending` to `paid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPaidEvent {
    pub order: Order,
}

impl OrderPaidEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}
