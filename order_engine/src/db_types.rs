//! Data types stored in, and read back from, the order database.
//!
//! Row types derive [`FromRow`] so that the SQLite backend can map query results directly onto them. Identifier
//! newtypes are transparent over `i64`, so they can be bound as query parameters and decoded as columns.
use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
pub use shop_common::Money;
use sqlx::{FromRow, Type};
use thiserror::Error;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Type, Serialize, Deserialize)]
        #[sqlx(transparent)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "#{}", self.0)
            }
        }

        impl $name {
            pub fn value(&self) -> i64 {
                self.0
            }
        }
    };
}

//--------------------------------------     Identifiers     ---------------------------------------------------------
id_type!(
    /// The identifier of a buyer, as issued by the (external) authentication subsystem.
    BuyerId
);
id_type!(
    /// The identifier of a product in the catalog.
    ProductId
);
id_type!(
    /// The database identifier of an order header.
    OrderId
);

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatusType {
    /// The order has been recorded and stock has been reserved, but no payment has been confirmed.
    #[default]
    Pending,
    /// An external payment step has confirmed payment for the order.
    Paid,
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "pending"),
            OrderStatusType::Paid => write!(f, "paid"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

//--------------------------------------       Product       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    /// Units available for sale. Never negative.
    pub stock: i64,
    /// Cumulative units sold through the order writer.
    pub sales: i64,
    pub price: Money,
}

/// The slice of a product that the stock check needs.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ProductStock {
    pub product_id: ProductId,
    pub title: String,
    pub stock: i64,
}

//--------------------------------------        Order        ---------------------------------------------------------
/// An order header, as persisted in the `orders` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[sqlx(rename = "user_id")]
    pub buyer_id: BuyerId,
    pub total_amount: Money,
    pub shipping_fee: Money,
    pub shipping_address: String,
    #[sqlx(rename = "order_status")]
    pub status: OrderStatusType,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------    OrderLineItem    ---------------------------------------------------------
/// A line item belonging to an order. Name and price are snapshots taken when the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    pub id: i64,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i64,
    /// The unit price at the time of ordering
    pub price: Money,
    pub subtotal: Money,
}

//--------------------------------------      NewOrder       ---------------------------------------------------------
/// A validated order, ready to be handed to the order writer.
///
/// Instances are normally produced by [`crate::order_api::validation`], which guarantees that the address is not
/// empty, that there is at least one item, and that the totals add up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub buyer_id: BuyerId,
    pub total_amount: Money,
    pub shipping_fee: Money,
    pub shipping_address: String,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i64,
    pub price: Money,
    pub subtotal: Money,
}

impl NewOrderItem {
    /// Creates a line item whose subtotal is `price × quantity`.
    pub fn new<S: Into<String>>(product_id: ProductId, product_name: S, quantity: i64, price: Money) -> Self {
        let subtotal = price.saturating_mul(quantity);
        Self { product_id, product_name: product_name.into(), quantity, price, subtotal }
    }
}

impl NewOrder {
    /// Creates an order whose total is the sum of the item subtotals plus the shipping fee.
    pub fn new<S: Into<String>>(
        buyer_id: BuyerId,
        shipping_address: S,
        shipping_fee: Money,
        items: Vec<NewOrderItem>,
    ) -> Self {
        let total_amount = items.iter().fold(shipping_fee, |total, i| total.saturating_add(i.subtotal));
        Self { buyer_id, total_amount, shipping_fee, shipping_address: shipping_address.into(), items }
    }
}

//--------------------------------------     OrderJoinRow    ---------------------------------------------------------
/// One row of the `orders ⟕ order_items` join that feeds the order read model.
///
/// The item columns are `NULL` for an order without line items.
#[derive(Debug, Clone, FromRow)]
pub struct OrderJoinRow {
    pub order_id: OrderId,
    pub buyer_id: BuyerId,
    pub buyer_name: Option<String>,
    pub total_amount: Money,
    pub shipping_fee: Money,
    pub shipping_address: String,
    pub order_status: OrderStatusType,
    pub created_at: DateTime<Utc>,
    pub item_id: Option<i64>,
    pub product_id: Option<ProductId>,
    pub product_name: Option<String>,
    pub quantity: Option<i64>,
    pub price: Option<Money>,
    pub subtotal: Option<Money>,
}

impl OrderJoinRow {
    pub fn header(&self) -> Order {
        Order {
            id: self.order_id,
            buyer_id: self.buyer_id,
            total_amount: self.total_amount,
            shipping_fee: self.shipping_fee,
            shipping_address: self.shipping_address.clone(),
            status: self.order_status,
            created_at: self.created_at,
        }
    }

    /// The line item carried by this row, if there is one.
    pub fn line_item(&self) -> Option<OrderLineItem> {
        let id = self.item_id?;
        Some(OrderLineItem {
            id,
            order_id: self.order_id,
            product_id: self.product_id?,
            product_name: self.product_name.clone().unwrap_or_default(),
            quantity: self.quantity.unwrap_or_default(),
            price: self.price.unwrap_or_default(),
            subtotal: self.subtotal.unwrap_or_default(),
        })
    }
}
