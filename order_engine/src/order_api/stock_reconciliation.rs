//! Advisory stock check for a candidate order.
//!
//! One stock lookup is issued per distinct product, and all lookups are in flight concurrently. Once every lookup has
//! returned, each requested item gets a [`StockVerdict`]. The check reads outside any transaction, so its answer can
//! be stale by the time the order is written; the order writer re-checks stock atomically as it decrements it.
use std::collections::HashMap;

use futures_util::future::try_join_all;
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{NewOrderItem, ProductId, ProductStock},
    traits::{OrderManagement, OrderStoreError},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum StockVerdict {
    /// The product exists and has at least as many units in stock as were requested.
    Sufficient { product_id: ProductId, available: i64, requested: i64 },
    /// There is no product with this id.
    NotFound { product_id: ProductId, product_name: String },
    /// The product exists but has fewer units in stock than were requested.
    Insufficient { product_id: ProductId, product_name: String, available: i64, requested: i64 },
}

impl StockVerdict {
    /// Computes the verdict for one item. `requested` is the total demand for the product across the whole order.
    pub fn evaluate(item: &NewOrderItem, requested: i64, stock: Option<&ProductStock>) -> Self {
        let product_id = item.product_id;
        match stock {
            None => Self::NotFound { product_id, product_name: item.product_name.clone() },
            Some(s) if s.stock >= requested => Self::Sufficient { product_id, available: s.stock, requested },
            Some(s) => {
                Self::Insufficient { product_id, product_name: s.title.clone(), available: s.stock, requested }
            },
        }
    }

    pub fn is_sufficient(&self) -> bool {
        matches!(self, Self::Sufficient { .. })
    }

    pub fn product_id(&self) -> ProductId {
        match self {
            Self::Sufficient { product_id, .. } |
            Self::NotFound { product_id, .. } |
            Self::Insufficient { product_id, .. } => *product_id,
        }
    }
}

/// The verdicts for every requested item, in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockReport {
    pub verdicts: Vec<StockVerdict>,
}

impl StockReport {
    pub fn is_sufficient(&self) -> bool {
        self.verdicts.iter().all(StockVerdict::is_sufficient)
    }

    /// All the items that cannot be satisfied, not just the first.
    pub fn shortfalls(&self) -> Vec<StockVerdict> {
        self.verdicts.iter().filter(|v| !v.is_sufficient()).cloned().collect()
    }
}

/// Looks up current stock for every product in `items` and produces a verdict per item.
///
/// Products that appear in more than one item are looked up once, and their verdicts compare stock against the
/// combined quantity.
pub async fn reconcile_stock<B>(db: &B, items: &[NewOrderItem]) -> Result<StockReport, OrderStoreError>
where B: OrderManagement {
    let mut demand: HashMap<ProductId, i64> = HashMap::with_capacity(items.len());
    let mut distinct = Vec::with_capacity(items.len());
    for item in items {
        let total = demand.entry(item.product_id).or_insert_with(|| {
            distinct.push(item.product_id);
            0
        });
        *total = total.saturating_add(item.quantity);
    }
    trace!("📦️ Looking up stock for {} distinct products", distinct.len());
    let lookups = distinct.iter().map(|id| db.fetch_product_stock(*id));
    let results = try_join_all(lookups).await?;
    let stock = distinct.into_iter().zip(results).collect::<HashMap<ProductId, Option<ProductStock>>>();
    let verdicts = items
        .iter()
        .map(|item| {
            let requested = demand.get(&item.product_id).copied().unwrap_or(item.quantity);
            let current = stock.get(&item.product_id).and_then(Option::as_ref);
            StockVerdict::evaluate(item, requested, current)
        })
        .collect();
    let report = StockReport { verdicts };
    if !report.is_sufficient() {
        debug!("📦️ Stock check failed for {} item(s)", report.shortfalls().len());
    }
    Ok(report)
}
