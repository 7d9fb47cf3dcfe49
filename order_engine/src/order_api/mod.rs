//! # Order engine public API
//!
//! * [`order_flow_api`] places orders: validation, the buyer check, stock reconciliation and the transactional
//!   write. It also records payment confirmation.
//! * [`order_history_api`] lists placed orders together with their line items.
//!
//! The other submodules hold the request and response types, and the individual stages of the order flow.
//!
//! # API usage
//!
//! An API instance is created by supplying a database backend that implements the backend traits it needs.
//!
//! ```rust,ignore
//! use order_engine::{events::EventProducers, EngineConfig, OrderFlowApi, SqliteDatabase};
//! let db = SqliteDatabase::new(&EngineConfig::from_env_or_default()).await?;
//! let api = OrderFlowApi::new(db, EventProducers::default());
//! let order = api.place_order_json(&request_body).await?;
//! ```

pub mod errors;
pub mod order_flow_api;
pub mod order_history_api;
pub mod order_objects;
pub mod read_model;
pub mod stock_reconciliation;
pub mod validation;
