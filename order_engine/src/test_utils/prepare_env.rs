use chrono::Utc;
use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

use crate::{
    db_types::{BuyerId, Money, OrderId, OrderStatusType, ProductId},
    SqliteDatabase,
};

/// Loads `.env.test`, initialises logging and creates a freshly migrated database at `url`.
pub async fn prepare_test_env(url: &str) {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    create_database(url).await;
    run_migrations(url).await;
}

/// A database URL in the system temp directory that no other test is using.
pub fn random_db_path() -> String {
    let path = std::env::temp_dir().join(format!("order_engine_test_{}.db", rand::random::<u64>()));
    format!("sqlite://{}", path.display())
}

pub async fn run_migrations(url: &str) {
    let db = SqliteDatabase::new_with_url(url, 1).await.expect("Error creating connection to database");
    db.run_migrations().await.expect("Error running DB migrations");
    db.pool().close().await;
    info!("🚀️ Migrations complete");
}

pub async fn create_database(url: &str) {
    if Sqlite::database_exists(url).await.unwrap_or(false) {
        if let Err(e) = Sqlite::drop_database(url).await {
            warn!("Error dropping database {url}: {e:?}");
        }
    }
    Sqlite::create_database(url).await.expect("Error creating database");
    info!("Created Sqlite database {url}");
}

pub async fn seed_buyer(db: &SqliteDatabase, name: &str) -> BuyerId {
    let email = format!("{}_{}@example.com", name.to_lowercase().replace(' ', "."), rand::random::<u32>());
    sqlx::query_scalar("INSERT INTO users (name, email) VALUES ($1, $2) RETURNING id")
        .bind(name)
        .bind(email)
        .fetch_one(db.pool())
        .await
        .expect("Error seeding buyer")
}

pub async fn seed_product(db: &SqliteDatabase, title: &str, price: Money, stock: i64) -> ProductId {
    sqlx::query_scalar("INSERT INTO products (title, price, stock, sales) VALUES ($1, $2, $3, 0) RETURNING id")
        .bind(title)
        .bind(price)
        .bind(stock)
        .fetch_one(db.pool())
        .await
        .expect("Error seeding product")
}

/// Writes an order header with no line items, bypassing the order writer.
pub async fn insert_bare_order(db: &SqliteDatabase, buyer_id: BuyerId, address: &str) -> OrderId {
    sqlx::query_scalar(
        r#"INSERT INTO orders (user_id, total_amount, shipping_fee, shipping_address, order_status, created_at)
        VALUES ($1, 0, 0, $2, $3, $4) RETURNING id"#,
    )
    .bind(buyer_id)
    .bind(address)
    .bind(OrderStatusType::Pending)
    .bind(Utc::now())
    .fetch_one(db.pool())
    .await
    .expect("Error inserting bare order")
}
