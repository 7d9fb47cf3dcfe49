use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrderItem, Product, ProductId, ProductStock},
    traits::OrderStoreError,
};

/// Fetches the title and current stock for the product. Returns `None` if there is no such product.
pub async fn fetch_product_stock(
    product_id: ProductId,
    conn: &mut SqliteConnection,
) -> Result<Option<ProductStock>, sqlx::Error> {
    sqlx::query_as("SELECT id AS product_id, title, stock FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(conn)
        .await
}

pub async fn fetch_product(product_id: ProductId, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as("SELECT id, title, stock, sales, price FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(conn)
        .await
}

/// Takes the item's quantity out of stock and adds them to the sales counter.
///
/// The update is relative (`stock = stock - quantity`), and only applies while `stock >= quantity`, so two
/// transactions decrementing the same product can never leave it negative. This is not atomic on its own with respect
/// to other writes; run it inside a transaction and pass `&mut *tx` as the connection.
///
/// If the guard refuses the update, the stock level visible on this connection is read back so that the error can
/// report what was actually available.
pub async fn take_stock(item: &NewOrderItem, conn: &mut SqliteConnection) -> Result<(), OrderStoreError> {
    let (product_id, quantity) = (item.product_id, item.quantity);
    let result = sqlx::query(
        r#"
            UPDATE products
            SET stock = stock - $1, sales = sales + $1
            WHERE id = $2 AND stock >= $1
        "#,
    )
    .bind(quantity)
    .bind(product_id)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 1 {
        trace!("🗃️ Took {quantity} units of product {product_id} from stock");
        return Ok(());
    }
    match fetch_product_stock(product_id, conn).await? {
        None => Err(OrderStoreError::ProductNotFound { product_id, product_name: item.product_name.clone() }),
        Some(p) => Err(OrderStoreError::InsufficientStock {
            product_id,
            product_name: p.title,
            available: p.stock,
            requested: quantity,
        }),
    }
}
