use std::fmt::Debug;

use log::*;
use serde_json::Value;

use crate::{
    db_types::{NewOrder, Order, OrderId},
    events::{EventProducers, OrderCreatedEvent, OrderPaidEvent},
    order_api::{
        errors::OrderFlowError,
        order_objects::NewOrderRequest,
        stock_reconciliation::reconcile_stock,
        validation::{validate_order_json, validate_order_request},
    },
    traits::{InsertOrderResult, OrderStore, OrderStoreError},
};

/// `OrderFlowApi` takes order requests from buyers and turns them into committed orders.
///
/// Each attempt runs through the same stages: the request is validated, the buyer's existence is checked, current
/// stock is reconciled against the requested quantities, and finally the order, its line items and the inventory
/// adjustments are written in one transaction. Any failure stops the attempt at that stage; nothing is retried.
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }
}

impl<B> OrderFlowApi<B>
where B: OrderStore
{
    /// Places an order from a typed request. Amounts are in minor units.
    ///
    /// On success, the committed order header (status `pending`) is returned.
    pub async fn place_order(&self, request: &NewOrderRequest) -> Result<Order, OrderFlowError> {
        trace!("📦️ Validating order request from buyer {}", request.buyer_id);
        let order = validate_order_request(request)?;
        self.process_new_order(order).await
    }

    /// Places an order from a raw JSON request body, with decimal amounts (e.g. `"totalAmount": 38.5`).
    pub async fn place_order_json(&self, raw: &Value) -> Result<Order, OrderFlowError> {
        trace!("📦️ Validating raw order request");
        let order = validate_order_json(raw)?;
        self.process_new_order(order).await
    }

    /// Runs an already validated order through the buyer check, the stock check and the order writer.
    pub async fn process_new_order(&self, order: NewOrder) -> Result<Order, OrderFlowError> {
        let buyer_id = order.buyer_id;
        let exists = self.db.buyer_exists(buyer_id).await.map_err(lookup_failed)?;
        if !exists {
            debug!("📦️ Rejecting order. Buyer {buyer_id} does not exist");
            return Err(OrderFlowError::BuyerNotFound(buyer_id));
        }
        trace!("📦️ Reconciling stock for {} item(s) ordered by buyer {buyer_id}", order.items.len());
        let report = reconcile_stock(&self.db, &order.items).await.map_err(lookup_failed)?;
        if !report.is_sufficient() {
            let shortfalls = report.shortfalls();
            info!("📦️ Order for buyer {buyer_id} rejected. {} item(s) cannot be supplied", shortfalls.len());
            return Err(OrderFlowError::StockRejected(shortfalls));
        }
        trace!("📦️ Stock is sufficient. Writing order for buyer {buyer_id}");
        let result = self.db.insert_order_with_items(&order).await.map_err(|e| {
            warn!("📦️ Order for buyer {buyer_id} was rolled back. {e}");
            OrderFlowError::OrderWriteFailed(e)
        })?;
        info!(
            "📦️ Order {} committed for buyer {buyer_id}. {} line item(s), {} unit(s), total {}",
            result.order.id,
            result.items.len(),
            result.total_quantity(),
            result.order.total_amount
        );
        let order = result.order.clone();
        self.call_order_created_hook(result).await;
        Ok(order)
    }

    /// Marks a pending order as paid. Payment itself happens elsewhere; this only records the outcome.
    ///
    /// Marking an order that is already paid succeeds without publishing another event.
    pub async fn mark_order_paid(&self, order_id: OrderId) -> Result<Order, OrderFlowError> {
        let (order, changed) = self.db.mark_order_paid(order_id).await.map_err(|e| match e {
            OrderStoreError::OrderNotFound(id) => OrderFlowError::OrderNotFound(id),
            e => OrderFlowError::OrderWriteFailed(e),
        })?;
        if changed {
            debug!("📦️ Order {order_id} is now paid");
            self.call_order_paid_hook(&order).await;
        }
        Ok(order)
    }

    async fn call_order_created_hook(&self, result: InsertOrderResult) {
        for emitter in &self.producers.order_created_producer {
            debug!("📦️ Notifying order created hook subscribers");
            let event = OrderCreatedEvent::new(result.order.clone(), result.items.clone());
            emitter.publish_event(event).await;
        }
    }

    async fn call_order_paid_hook(&self, order: &Order) {
        for emitter in &self.producers.order_paid_producer {
            debug!("📦️ Notifying order paid hook subscribers");
            emitter.publish_event(OrderPaidEvent::new(order.clone())).await;
        }
    }
}

fn lookup_failed(e: OrderStoreError) -> OrderFlowError {
    error!("📦️ Lookup failed before the order could be written. {e}");
    OrderFlowError::LookupFailed(e.to_string())
}
