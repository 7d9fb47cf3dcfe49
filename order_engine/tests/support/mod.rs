#![allow(dead_code)]
use log::*;
use order_engine::{
    db_types::{BuyerId, Money, ProductId},
    order_objects::{NewOrderRequest, OrderItemRequest},
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    OrderStore,
    SqliteDatabase,
};
use sqlx::{migrate::MigrateDatabase, Sqlite};

pub async fn setup() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 10).await.expect("Error creating database")
}

pub async fn tear_down(mut db: SqliteDatabase) {
    let url = db.url().to_string();
    if let Err(e) = db.close().await {
        error!("🚀️ Failed to close database: {e}");
    }
    if let Err(e) = Sqlite::drop_database(&url).await {
        warn!("🚀️ Failed to remove database {url}: {e}");
    }
}

/// Builds a request with consistent totals. Items are `(product, name, quantity, unit price in cents)`.
pub fn request(buyer_id: BuyerId, address: &str, fee: i64, items: &[(ProductId, &str, i64, i64)]) -> NewOrderRequest {
    let items = items
        .iter()
        .map(|(id, name, qty, price)| OrderItemRequest::new(*id, *name, *qty, Money::from(*price)))
        .collect();
    NewOrderRequest::new(buyer_id, address, Money::from(fee), items)
}
