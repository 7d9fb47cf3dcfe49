//! Structural validation of incoming order requests.
//!
//! Validation runs before anything touches the database. Fields are checked in a fixed order
//! (`userId`, `totalAmount`, `shippingFee`, `shippingAddress`, `orderItems`, then each item's `productId`,
//! `productName`, `quantity`, `price` and `subtotal`), and the first offending field is reported.
//!
//! Besides presence and type checks, the validator enforces the totals rule: every item's subtotal must equal
//! `price × quantity`, and the order total must equal the sum of the subtotals plus the shipping fee. Amounts are
//! whole minor units, so these comparisons are exact.
use std::collections::HashMap;

use serde_json::{Map, Value};
use shop_common::Money;
use thiserror::Error;

use crate::{
    db_types::{BuyerId, NewOrder, NewOrderItem, ProductId},
    order_api::order_objects::{NewOrderRequest, OrderItemRequest},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid order request. `{field}` {reason}")]
pub struct ValidationError {
    /// The offending field, e.g. `shippingAddress` or `orderItems[2].quantity`
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new<F: Into<String>, R: Into<String>>(field: F, reason: R) -> Self {
        Self { field: field.into(), reason: reason.into() }
    }
}

/// Validates a typed order request, producing a [`NewOrder`] that the order writer can accept.
pub fn validate_order_request(request: &NewOrderRequest) -> Result<NewOrder, ValidationError> {
    let buyer_id = BuyerId(positive_id("userId", request.buyer_id.value())?);
    let total_amount = non_negative("totalAmount", request.total_amount)?;
    let shipping_fee = non_negative("shippingFee", request.shipping_fee)?;
    let shipping_address = non_empty_text("shippingAddress", &request.shipping_address)?;
    if request.items.is_empty() {
        return Err(ValidationError::new("orderItems", "must contain at least one item"));
    }
    let items =
        request.items.iter().enumerate().map(|(i, item)| validate_item(i, item)).collect::<Result<Vec<_>, _>>()?;
    check_combined_quantities(&items)?;
    check_total(total_amount, shipping_fee, &items)?;
    Ok(NewOrder { buyer_id, total_amount, shipping_fee, shipping_address, items })
}

/// Validates a raw JSON order request, checking both field types and the rules applied by
/// [`validate_order_request`]. Monetary values are decimal numbers in major units (e.g. `12.5`).
pub fn validate_order_json(raw: &Value) -> Result<NewOrder, ValidationError> {
    let fields = raw.as_object().ok_or_else(|| ValidationError::new("request", "must be a JSON object"))?;
    let buyer_id = BuyerId(json_id(fields, "userId", "userId")?);
    let total_amount = json_money(fields, "totalAmount", "totalAmount")?;
    let shipping_fee = json_money(fields, "shippingFee", "shippingFee")?;
    let shipping_address = json_text(fields, "shippingAddress", "shippingAddress")?;
    let raw_items = match fields.get("orderItems") {
        None | Some(Value::Null) => return Err(ValidationError::new("orderItems", "is required")),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(ValidationError::new("orderItems", "must be an array")),
    };
    if raw_items.is_empty() {
        return Err(ValidationError::new("orderItems", "must contain at least one item"));
    }
    let items = raw_items.iter().enumerate().map(|(i, item)| json_item(i, item)).collect::<Result<Vec<_>, _>>()?;
    check_combined_quantities(&items)?;
    check_total(total_amount, shipping_fee, &items)?;
    Ok(NewOrder { buyer_id, total_amount, shipping_fee, shipping_address, items })
}

fn validate_item(index: usize, item: &OrderItemRequest) -> Result<NewOrderItem, ValidationError> {
    let field = |name: &str| format!("orderItems[{index}].{name}");
    let product_id = ProductId(positive_id(&field("productId"), item.product_id.value())?);
    let product_name = non_empty_text(&field("productName"), &item.product_name)?;
    let quantity = positive_quantity(&field("quantity"), item.quantity)?;
    let price = non_negative(&field("price"), item.price)?;
    let subtotal = non_negative(&field("subtotal"), item.subtotal)?;
    let item = NewOrderItem { product_id, product_name, quantity, price, subtotal };
    check_subtotal(&field("subtotal"), &item)?;
    Ok(item)
}

fn json_item(index: usize, raw: &Value) -> Result<NewOrderItem, ValidationError> {
    let field = |name: &str| format!("orderItems[{index}].{name}");
    let fields =
        raw.as_object().ok_or_else(|| ValidationError::new(format!("orderItems[{index}]"), "must be an object"))?;
    let product_id = ProductId(json_id(fields, "productId", &field("productId"))?);
    let product_name = json_text(fields, "productName", &field("productName"))?;
    let quantity = positive_quantity(&field("quantity"), json_integer(fields, "quantity", &field("quantity"))?)?;
    let price = json_money(fields, "price", &field("price"))?;
    let subtotal = json_money(fields, "subtotal", &field("subtotal"))?;
    let item = NewOrderItem { product_id, product_name, quantity, price, subtotal };
    check_subtotal(&field("subtotal"), &item)?;
    Ok(item)
}

fn check_subtotal(field: &str, item: &NewOrderItem) -> Result<(), ValidationError> {
    let expected = item
        .price
        .checked_mul(item.quantity)
        .ok_or_else(|| ValidationError::new(field, "cannot be checked because price × quantity is too large"))?;
    if item.subtotal == expected {
        Ok(())
    } else {
        Err(ValidationError::new(field, format!("is {} but price × quantity is {expected}", item.subtotal)))
    }
}

fn check_total(total: Money, shipping_fee: Money, items: &[NewOrderItem]) -> Result<(), ValidationError> {
    let expected = Money::checked_sum(items.iter().map(|i| i.subtotal).chain([shipping_fee]))
        .ok_or_else(|| ValidationError::new("totalAmount", "cannot be checked because the subtotals are too large"))?;
    if total == expected {
        Ok(())
    } else {
        Err(ValidationError::new(
            "totalAmount",
            format!("is {total} but the item subtotals plus shipping come to {expected}"),
        ))
    }
}

/// Items for the same product are stocked against their combined quantity, so that sum has to fit too.
fn check_combined_quantities(items: &[NewOrderItem]) -> Result<(), ValidationError> {
    let mut demand: HashMap<ProductId, i64> = HashMap::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let total = demand.entry(item.product_id).or_default();
        let field = format!("orderItems[{i}].quantity");
        *total = total
            .checked_add(item.quantity)
            .ok_or_else(|| ValidationError::new(field, "makes the combined quantity for the product too large"))?;
    }
    Ok(())
}

//--------------------------------------   field rules   ---------------------------------------------------------
fn positive_id(field: &str, value: i64) -> Result<i64, ValidationError> {
    if value > 0 {
        Ok(value)
    } else {
        Err(ValidationError::new(field, "must be a positive integer"))
    }
}

fn positive_quantity(field: &str, value: i64) -> Result<i64, ValidationError> {
    if value > 0 {
        Ok(value)
    } else {
        Err(ValidationError::new(field, "must be at least 1"))
    }
}

fn non_negative(field: &str, value: Money) -> Result<Money, ValidationError> {
    if value.is_negative() {
        Err(ValidationError::new(field, "must not be negative"))
    } else {
        Ok(value)
    }
}

fn non_empty_text(field: &str, value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ValidationError::new(field, "must not be empty"))
    } else {
        Ok(value.to_string())
    }
}

//--------------------------------------   JSON accessors   ---------------------------------------------------------
fn json_value<'a>(fields: &'a Map<String, Value>, key: &str, field: &str) -> Result<&'a Value, ValidationError> {
    match fields.get(key) {
        None | Some(Value::Null) => Err(ValidationError::new(field, "is required")),
        Some(v) => Ok(v),
    }
}

fn json_integer(fields: &Map<String, Value>, key: &str, field: &str) -> Result<i64, ValidationError> {
    let value = json_value(fields, key, field)?;
    if !value.is_number() {
        return Err(ValidationError::new(field, "must be a number"));
    }
    value.as_i64().ok_or_else(|| ValidationError::new(field, "must be an integer"))
}

fn json_id(fields: &Map<String, Value>, key: &str, field: &str) -> Result<i64, ValidationError> {
    positive_id(field, json_integer(fields, key, field)?)
}

fn json_money(fields: &Map<String, Value>, key: &str, field: &str) -> Result<Money, ValidationError> {
    let amount =
        json_value(fields, key, field)?.as_f64().ok_or_else(|| ValidationError::new(field, "must be a number"))?;
    let amount = Money::from_decimal(amount).map_err(|e| ValidationError::new(field, e.to_string()))?;
    non_negative(field, amount)
}

fn json_text(fields: &Map<String, Value>, key: &str, field: &str) -> Result<String, ValidationError> {
    let text =
        json_value(fields, key, field)?.as_str().ok_or_else(|| ValidationError::new(field, "must be a string"))?;
    non_empty_text(field, text)
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    fn valid_json() -> Value {
        json!({
            "userId": 3,
            "totalAmount": 38.5,
            "shippingFee": 5,
            "shippingAddress": "12 Harbour Road",
            "orderItems": [
                { "productId": 1, "productName": "Kettle", "quantity": 1, "price": 20, "subtotal": 20 },
                { "productId": 2, "productName": "Mug", "quantity": 3, "price": 4.5, "subtotal": 13.5 }
            ]
        })
    }

    #[test]
    fn accepts_a_well_formed_request() {
        let order = validate_order_json(&valid_json()).expect("request should be valid");
        assert_eq!(order.buyer_id, BuyerId(3));
        assert_eq!(order.total_amount, Money::from(3850));
        assert_eq!(order.shipping_fee, Money::from(500));
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[1].price, Money::from(450));
        assert_eq!(order.items[1].product_name, "Mug");
    }

    #[test]
    fn empty_shipping_address_is_rejected() {
        let mut raw = valid_json();
        raw["shippingAddress"] = json!("");
        let err = validate_order_json(&raw).unwrap_err();
        assert_eq!(err.field, "shippingAddress");
        raw["shippingAddress"] = json!("   ");
        assert_eq!(validate_order_json(&raw).unwrap_err().field, "shippingAddress");
    }

    #[test]
    fn first_offending_field_is_reported() {
        let mut raw = valid_json();
        raw["userId"] = json!("three");
        raw["shippingFee"] = json!(null);
        let err = validate_order_json(&raw).unwrap_err();
        assert_eq!(err.field, "userId");
        assert_eq!(err.reason, "must be a number");
        raw["userId"] = json!(3);
        assert_eq!(validate_order_json(&raw).unwrap_err().field, "shippingFee");
    }

    #[test]
    fn item_fields_are_named_by_index() {
        let mut raw = valid_json();
        raw["orderItems"][1]["quantity"] = json!(0);
        let err = validate_order_json(&raw).unwrap_err();
        assert_eq!(err.field, "orderItems[1].quantity");

        let mut raw = valid_json();
        raw["orderItems"][0]["quantity"] = json!(1.5);
        assert_eq!(validate_order_json(&raw).unwrap_err().reason, "must be an integer");

        let mut raw = valid_json();
        raw["orderItems"][0].as_object_mut().unwrap().remove("productName");
        assert_eq!(validate_order_json(&raw).unwrap_err().field, "orderItems[0].productName");
    }

    #[test]
    fn items_must_be_a_non_empty_array() {
        let mut raw = valid_json();
        raw["orderItems"] = json!([]);
        assert_eq!(validate_order_json(&raw).unwrap_err().field, "orderItems");
        raw["orderItems"] = json!({ "productId": 1 });
        assert_eq!(validate_order_json(&raw).unwrap_err().reason, "must be an array");
        raw.as_object_mut().unwrap().remove("orderItems");
        assert_eq!(validate_order_json(&raw).unwrap_err().reason, "is required");
    }

    #[test]
    fn totals_must_add_up() {
        let mut raw = valid_json();
        raw["orderItems"][1]["subtotal"] = json!(13);
        assert_eq!(validate_order_json(&raw).unwrap_err().field, "orderItems[1].subtotal");

        let mut raw = valid_json();
        raw["totalAmount"] = json!(40);
        assert_eq!(validate_order_json(&raw).unwrap_err().field, "totalAmount");
    }

    #[test]
    fn oversized_amounts_are_rejected_not_wrapped() {
        let mut raw = valid_json();
        raw["orderItems"][0]["quantity"] = json!(1000);
        raw["orderItems"][0]["price"] = json!(1.0e15);
        raw["orderItems"][0]["subtotal"] = json!(1);
        let err = validate_order_json(&raw).unwrap_err();
        assert_eq!(err.field, "orderItems[0].subtotal");
        assert!(err.reason.contains("too large"));

        // Each subtotal fits, but their sum does not
        let mut raw = valid_json();
        for i in 0..2 {
            raw["orderItems"][i]["quantity"] = json!(1);
            raw["orderItems"][i]["price"] = json!(6.0e16);
            raw["orderItems"][i]["subtotal"] = json!(6.0e16);
        }
        let err = validate_order_json(&raw).unwrap_err();
        assert_eq!(err.field, "totalAmount");
        assert!(err.reason.contains("too large"));
    }

    #[test]
    fn combined_quantity_for_a_product_must_fit() {
        let items = vec![
            OrderItemRequest::new(ProductId(4), "Teapot", i64::MAX, Money::from(0)),
            OrderItemRequest::new(ProductId(5), "Cup", 1, Money::from(0)),
            OrderItemRequest::new(ProductId(4), "Teapot", i64::MAX, Money::from(0)),
        ];
        let request = NewOrderRequest::new(BuyerId(9), "7 Elm Street", Money::from(0), items);
        let err = validate_order_request(&request).unwrap_err();
        assert_eq!(err.field, "orderItems[2].quantity");

        let items = vec![
            OrderItemRequest::new(ProductId(4), "Teapot", i64::MAX, Money::from(0)),
            OrderItemRequest::new(ProductId(5), "Cup", i64::MAX, Money::from(0)),
        ];
        let request = NewOrderRequest::new(BuyerId(9), "7 Elm Street", Money::from(0), items);
        assert!(validate_order_request(&request).is_ok());
    }

    #[test]
    fn amounts_with_fractional_cents_are_rejected() {
        let mut raw = valid_json();
        raw["shippingFee"] = json!(5.001);
        let err = validate_order_json(&raw).unwrap_err();
        assert_eq!(err.field, "shippingFee");
        assert!(err.reason.contains("decimal places"));
    }

    #[test]
    fn typed_requests_follow_the_same_rules() {
        let items = vec![OrderItemRequest::new(ProductId(4), "Teapot", 2, Money::from(1200))];
        let request = NewOrderRequest::new(BuyerId(9), "7 Elm Street", Money::from(300), items);
        let order = validate_order_request(&request).expect("request should be valid");
        assert_eq!(order.total_amount, Money::from(2700));
        assert_eq!(order.items[0].subtotal, Money::from(2400));

        let bad_total = request.clone().with_total_amount(Money::from(2600));
        assert_eq!(validate_order_request(&bad_total).unwrap_err().field, "totalAmount");

        let mut no_items = request.clone();
        no_items.items.clear();
        assert_eq!(validate_order_request(&no_items).unwrap_err().field, "orderItems");

        let mut bad_buyer = request;
        bad_buyer.buyer_id = BuyerId(0);
        assert_eq!(validate_order_request(&bad_buyer).unwrap_err().field, "userId");
    }
}
