//! Order lifecycle events.
//!
//! The engine publishes an [`OrderCreatedEvent`] after an order commits and an [`OrderPaidEvent`] when an order is
//! marked as paid. Register callbacks with [`EventHooks`], turn them into running [`EventHandlers`], and hand the
//! resulting [`EventProducers`] to [`crate::OrderFlowApi::new`].
mod channel;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::*;
pub use hooks::{EventHandlers, EventHooks, EventProducers};
