use chrono::Utc;
use log::{debug, trace};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    db_types::{NewOrder, NewOrderItem, Order, OrderId, OrderJoinRow, OrderLineItem, OrderStatusType},
    order_api::order_objects::OrderQueryFilter,
};

/// Inserts a new order header into the database using the given connection, with status `pending`.
///
/// This is not atomic with respect to the line items. Embed this call inside a transaction, passing `&mut *tx` as
/// the connection argument.
pub async fn insert_order_header(order: &NewOrder, conn: &mut SqliteConnection) -> Result<Order, sqlx::Error> {
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                user_id,
                total_amount,
                shipping_fee,
                shipping_address,
                order_status,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(order.buyer_id)
    .bind(order.total_amount)
    .bind(order.shipping_fee)
    .bind(order.shipping_address.as_str())
    .bind(OrderStatusType::Pending)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    debug!("📝️ Order header {} inserted for buyer {}", order.id, order.buyer_id);
    Ok(order)
}

/// Inserts a single line item for the given order. The product name and prices are taken from the request as-is.
pub async fn insert_line_item(
    order_id: OrderId,
    item: &NewOrderItem,
    conn: &mut SqliteConnection,
) -> Result<OrderLineItem, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO order_items (
                order_id,
                product_id,
                product_name,
                quantity,
                price,
                subtotal
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(item.product_id)
    .bind(item.product_name.as_str())
    .bind(item.quantity)
    .bind(item.price)
    .bind(item.subtotal)
    .fetch_one(conn)
    .await
}

pub async fn fetch_order_by_id(order_id: OrderId, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(order_id).fetch_optional(conn).await
}

/// Moves a pending order to `paid` in a single statement, returning the updated record.
///
/// Returns `None` if the order does not exist or is not pending. The status guard sits in the `WHERE` clause, so
/// concurrent callers cannot both see the transition, and no read precedes the write.
pub async fn mark_paid_if_pending(
    order_id: OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("UPDATE orders SET order_status = $1 WHERE id = $2 AND order_status = $3 RETURNING *")
        .bind(OrderStatusType::Paid)
        .bind(order_id)
        .bind(OrderStatusType::Pending)
        .fetch_optional(conn)
        .await
}

/// Fetches the joined order header and line item rows matching the filter.
///
/// Resulting rows are ordered by `created_at` in descending order (newest orders first, with the order id as the
/// tie-breaker), and by line item id within each order.
pub async fn fetch_order_rows(
    query: &OrderQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderJoinRow>, sqlx::Error> {
    let mut builder = QueryBuilder::<Sqlite>::new(
        r#"
    SELECT
        o.id AS order_id,
        o.user_id AS buyer_id,
        u.name AS buyer_name,
        o.total_amount,
        o.shipping_fee,
        o.shipping_address,
        o.order_status,
        o.created_at,
        oi.id AS item_id,
        oi.product_id,
        oi.product_name,
        oi.quantity,
        oi.price,
        oi.subtotal
    FROM orders o
    LEFT JOIN order_items oi ON o.id = oi.order_id
    LEFT JOIN users u ON o.user_id = u.id
    "#,
    );
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(buyer_id) = query.buyer_id {
        where_clause.push("o.user_id = ");
        where_clause.push_bind_unseparated(buyer_id);
    }
    if let Some(order_id) = query.order_id {
        where_clause.push("o.id = ");
        where_clause.push_bind_unseparated(order_id);
    }
    if let Some(status) = query.status {
        where_clause.push("o.order_status = ");
        where_clause.push_bind_unseparated(status);
    }
    builder.push(" ORDER BY o.created_at DESC, o.id DESC, oi.id ASC");

    trace!("📝️ Executing query: {}", builder.sql());
    let rows = builder.build_query_as::<OrderJoinRow>().fetch_all(conn).await?;
    trace!("📝️ Result of fetch_order_rows: {} rows", rows.len());
    Ok(rows)
}
