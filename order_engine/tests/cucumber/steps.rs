use cucumber::{then, when};
use order_engine::{
    db_types::{BuyerId, Money, OrderStatusType},
    order_api::stock_reconciliation::StockVerdict,
    order_objects::{NewOrderRequest, OrderItemRequest},
    OrderFlowError,
    OrderManagement,
};

use crate::cucumber::OrderWorld;

fn money(value: f64) -> Money {
    Money::from_decimal(value).expect("Invalid amount")
}

#[when(expr = "{int} {string} is added to the cart")]
async fn add_to_cart(world: &mut OrderWorld, quantity: i64, title: String) {
    let product_id = world.product(&title);
    let price = world.db().fetch_product(product_id).await.expect("Error fetching product").expect("No product").price;
    world.cart.push(OrderItemRequest::new(product_id, title, quantity, price));
}

async fn checkout(world: &mut OrderWorld, buyer_id: BuyerId, address: String, fee: f64) {
    let items = std::mem::take(&mut world.cart);
    let request = NewOrderRequest::new(buyer_id, address, money(fee), items);
    let result = world.api().place_order(&request).await;
    world.last_result = Some(result);
}

#[when(expr = "{string} checks out to {string} with a shipping fee of {float}")]
async fn buyer_checks_out(world: &mut OrderWorld, buyer: String, address: String, fee: f64) {
    let buyer_id = world.buyer(&buyer);
    checkout(world, buyer_id, address, fee).await;
}

#[when(expr = "buyer #{int} checks out to {string} with a shipping fee of {float}")]
async fn unknown_buyer_checks_out(world: &mut OrderWorld, buyer_id: i64, address: String, fee: f64) {
    checkout(world, BuyerId(buyer_id), address, fee).await;
}

#[when("the order is marked as paid")]
async fn mark_paid(world: &mut OrderWorld) {
    let order = world.last_result().as_ref().expect("The last order was not accepted").clone();
    let paid = world.api().mark_order_paid(order.id).await.expect("Error marking order as paid");
    world.last_result = Some(Ok(paid));
}

#[then(expr = "the order is accepted with a total of {float}")]
async fn order_accepted(world: &mut OrderWorld, total: f64) {
    match world.last_result() {
        Ok(order) => assert_eq!(order.total_amount, money(total), "Total is incorrect"),
        Err(e) => panic!("Order was rejected: {e}"),
    }
}

#[then(expr = "the order is rejected because the buyer does not exist")]
async fn rejected_for_buyer(world: &mut OrderWorld) {
    let err = world.last_result().as_ref().expect_err("Order was accepted");
    assert!(matches!(err, OrderFlowError::BuyerNotFound(_)), "Unexpected error: {err}");
}

#[then(expr = "the order is rejected as invalid because of {string}")]
async fn rejected_as_invalid(world: &mut OrderWorld, field: String) {
    match world.last_result() {
        Err(OrderFlowError::Validation(e)) => assert_eq!(e.field, field),
        other => panic!("Expected a validation error. Got {other:?}"),
    }
}

#[then(expr = "the order is rejected for lack of stock of {string}")]
async fn rejected_for_stock(world: &mut OrderWorld, titles: String) {
    let err = world.last_result().as_ref().expect_err("Order was accepted");
    let mut expected = titles.split(", ").map(|t| world.product(t)).collect::<Vec<_>>();
    expected.sort();
    let mut actual = err.shortfalls().iter().map(StockVerdict::product_id).collect::<Vec<_>>();
    actual.sort();
    assert_eq!(actual, expected, "Shortfalls do not match. {err}");
}

#[then(expr = "{string} has {int} in stock and {int} sold")]
async fn check_stock(world: &mut OrderWorld, title: String, stock: i64, sales: i64) {
    let product_id = world.product(&title);
    let product = world.db().fetch_product(product_id).await.expect("Error fetching product").expect("No product");
    assert_eq!(product.stock, stock, "Stock is incorrect");
    assert_eq!(product.sales, sales, "Sales are incorrect");
}

#[then(expr = "{string} has {int} order(s)")]
async fn check_order_count(world: &mut OrderWorld, buyer: String, count: usize) {
    let orders = world.history().list_orders_for_buyer(world.buyer(&buyer)).await.expect("Error listing orders");
    assert_eq!(orders.len(), count, "Order count is incorrect");
}

#[then(expr = "the latest order for {string} contains {string}")]
async fn check_latest_items(world: &mut OrderWorld, buyer: String, titles: String) {
    let orders = world.history().list_orders_for_buyer(world.buyer(&buyer)).await.expect("Error listing orders");
    let latest = orders.first().expect("Buyer has no orders");
    let names = latest.items.iter().map(|i| i.product_name.as_str()).collect::<Vec<_>>().join(", ");
    assert_eq!(names, titles, "Line items are incorrect");
}

#[then(expr = "the latest order for {string} has status {string}")]
async fn check_latest_status(world: &mut OrderWorld, buyer: String, status: String) {
    let orders = world.history().list_orders_for_buyer(world.buyer(&buyer)).await.expect("Error listing orders");
    let latest = orders.first().expect("Buyer has no orders");
    let expected = status.parse::<OrderStatusType>().expect("Invalid status");
    assert_eq!(latest.order.status, expected, "Status is incorrect");
}
