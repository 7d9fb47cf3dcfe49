use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderLineItem};

/// The rows written by a successful order insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertOrderResult {
    pub order: Order,
    /// The line items, in insertion order
    pub items: Vec<OrderLineItem>,
}

impl InsertOrderResult {
    pub fn new(order: Order, items: Vec<OrderLineItem>) -> Self {
        Self { order, items }
    }

    pub fn total_quantity(&self) -> i64 {
        self.items.iter().fold(0, |total, i| total.saturating_add(i.quantity))
    }
}
