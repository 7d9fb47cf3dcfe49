use std::collections::HashMap;

use cucumber::World;
use log::*;
use order_engine::{
    db_types::{BuyerId, Order, ProductId},
    events::EventProducers,
    order_objects::OrderItemRequest,
    test_utils::prepare_env::{create_database, random_db_path, run_migrations},
    OrderFlowApi,
    OrderFlowError,
    OrderHistoryApi,
    SqliteDatabase,
};

#[derive(Default, Debug, World)]
pub struct OrderWorld {
    pub system: Option<OrderSystem>,
    pub buyers: HashMap<String, BuyerId>,
    pub products: HashMap<String, ProductId>,
    /// Items collected for the next checkout
    pub cart: Vec<OrderItemRequest>,
    pub last_result: Option<Result<Order, OrderFlowError>>,
}

#[derive(Debug)]
pub struct OrderSystem {
    pub db_path: String,
    pub api: OrderFlowApi<SqliteDatabase>,
    pub history: OrderHistoryApi<SqliteDatabase>,
}

impl OrderWorld {
    pub fn system(&self) -> &OrderSystem {
        self.system.as_ref().expect("Order system not initialised")
    }

    pub fn api(&self) -> &OrderFlowApi<SqliteDatabase> {
        &self.system().api
    }

    pub fn history(&self) -> &OrderHistoryApi<SqliteDatabase> {
        &self.system().history
    }

    pub fn db(&self) -> &SqliteDatabase {
        self.api().db()
    }

    pub fn buyer(&self, name: &str) -> BuyerId {
        *self.buyers.get(name).unwrap_or_else(|| panic!("Unknown buyer {name}"))
    }

    pub fn product(&self, title: &str) -> ProductId {
        *self.products.get(title).unwrap_or_else(|| panic!("Unknown product {title}"))
    }

    pub fn last_result(&self) -> &Result<Order, OrderFlowError> {
        self.last_result.as_ref().expect("No order has been placed yet")
    }
}

impl OrderSystem {
    pub async fn new() -> Self {
        let url = prepare_test_env().await;
        let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
        debug!("Created database: {url}");
        let history = OrderHistoryApi::new(db.clone());
        let api = OrderFlowApi::new(db, EventProducers::default());
        Self { db_path: url, api, history }
    }
}

pub async fn prepare_test_env() -> String {
    let path = random_db_path();
    create_database(&path).await;
    run_migrations(&path).await;
    path
}
