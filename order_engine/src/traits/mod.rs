//! # Order database backend contracts
//!
//! This module defines the behaviour that a database backend needs to expose in order to be used by the order
//! engine APIs.
//!
//! * [`OrderManagement`] covers the read-only lookups: buyer existence, product stock and the joined order rows that
//!   feed the order read model. None of these calls mutate anything.
//! * [`OrderStore`] builds on `OrderManagement` with the writes: the atomic order insert (header, line items and the
//!   inventory adjustment in one transaction) and the `pending` → `paid` status transition.
//!
//! Backends report failures with [`OrderStoreError`].
mod data_objects;
mod order_management;
mod order_store;

pub use data_objects::InsertOrderResult;
pub use order_management::OrderManagement;
pub use order_store::{OrderStore, OrderStoreError};
