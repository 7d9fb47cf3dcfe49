use cucumber::given;
use order_engine::{db_types::Money, test_utils::prepare_env::{seed_buyer, seed_product}};

use crate::cucumber::{world::OrderSystem, OrderWorld};

#[given("a fresh install")]
async fn fresh_database(world: &mut OrderWorld) {
    let system = OrderSystem::new().await;
    world.system = Some(system);
}

#[given(expr = "a buyer named {string}")]
async fn a_buyer(world: &mut OrderWorld, name: String) {
    let id = seed_buyer(world.db(), &name).await;
    world.buyers.insert(name, id);
}

#[given(expr = "a product {string} priced at {float} with {int} in stock")]
async fn a_product(world: &mut OrderWorld, title: String, price: f64, stock: i64) {
    let price = Money::from_decimal(price).expect("Invalid price");
    let id = seed_product(world.db(), &title, price, stock).await;
    world.products.insert(title, id);
}
