//! Collapses the flat `orders ⟕ order_items` join into one [`OrderWithItems`] per order.
//!
//! Orders keep the position of their first row, so whatever ordering the query applied to headers is preserved. Items
//! are appended in row order.
use std::collections::HashMap;

use crate::{
    db_types::{OrderId, OrderJoinRow},
    order_api::order_objects::OrderWithItems,
};

pub fn collapse_order_rows(rows: Vec<OrderJoinRow>) -> Vec<OrderWithItems> {
    let mut orders: Vec<OrderWithItems> = Vec::new();
    let mut index: HashMap<OrderId, usize> = HashMap::new();
    for row in rows {
        let pos = *index.entry(row.order_id).or_insert_with(|| {
            orders.push(OrderWithItems::new(row.header(), row.buyer_name.clone()));
            orders.len() - 1
        });
        if let Some(item) = row.line_item() {
            orders[pos].items.push(item);
        }
    }
    orders
}
