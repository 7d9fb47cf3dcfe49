//! Order Engine
//!
//! The order engine accepts order requests from buyers, checks them against the product catalogue, and records them
//! together with the matching inventory adjustments. It never oversells: stock is decremented with a guarded,
//! relative update inside the same transaction that writes the order.
//!
//! The library is divided into these sections:
//! 1. Database management ([`traits`] and the SQLite backend, [`SqliteDatabase`]). You should never need to access the
//!    database directly. The exception is the data types stored in the database, which live in [`mod@db_types`].
//! 2. The public API ([`order_api`]). [`OrderFlowApi`] places orders, and [`OrderHistoryApi`] reads them back.
//! 3. Events ([`mod@events`]). Hooks can be registered to react to new orders and to payment confirmation, e.g. to
//!    start a payment flow.
//!
//! Configuration is an explicit [`EngineConfig`] value.
pub mod config;
pub mod db_types;
pub mod events;
pub mod order_api;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use config::EngineConfig;
pub use order_api::{
    errors::{OrderFlowError, OrderHistoryError},
    order_flow_api::OrderFlowApi,
    order_history_api::OrderHistoryApi,
    order_objects,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{InsertOrderResult, OrderManagement, OrderStore, OrderStoreError};
