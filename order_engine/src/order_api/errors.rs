use thiserror::Error;

use crate::{
    db_types::{BuyerId, OrderId},
    order_api::{stock_reconciliation::StockVerdict, validation::ValidationError},
    traits::OrderStoreError,
};

/// The reasons an order placement (or payment confirmation) can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderFlowError {
    #[error("Invalid order request. {0}")]
    Validation(#[from] ValidationError),
    #[error("Buyer {0} does not exist")]
    BuyerNotFound(BuyerId),
    #[error("Not enough stock to fill the order. {} item(s) cannot be satisfied", .0.len())]
    StockRejected(Vec<StockVerdict>),
    #[error("The order could not be written. {0}")]
    OrderWriteFailed(OrderStoreError),
    #[error("A lookup failed before the order was written. {0}")]
    LookupFailed(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
}

impl OrderFlowError {
    /// The items that could not be satisfied, whether the advisory stock check or the order writer's guard refused
    /// them. Empty for every other kind of failure.
    pub fn shortfalls(&self) -> Vec<StockVerdict> {
        match self {
            Self::StockRejected(verdicts) => verdicts.clone(),
            Self::OrderWriteFailed(OrderStoreError::InsufficientStock {
                product_id,
                product_name,
                available,
                requested,
            }) => vec![StockVerdict::Insufficient {
                product_id: *product_id,
                product_name: product_name.clone(),
                available: *available,
                requested: *requested,
            }],
            Self::OrderWriteFailed(OrderStoreError::ProductNotFound { product_id, product_name }) => {
                vec![StockVerdict::NotFound { product_id: *product_id, product_name: product_name.clone() }]
            },
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderHistoryError {
    #[error("Buyer {0} does not exist")]
    BuyerNotFound(BuyerId),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Could not read the order history. {0}")]
    ReadModelError(String),
}

impl From<OrderStoreError> for OrderHistoryError {
    fn from(e: OrderStoreError) -> Self {
        match e {
            OrderStoreError::OrderNotFound(id) => Self::OrderNotFound(id),
            e => Self::ReadModelError(e.to_string()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::db_types::ProductId;

    #[test]
    fn guard_failures_are_reported_as_shortfalls() {
        let err = OrderFlowError::OrderWriteFailed(OrderStoreError::InsufficientStock {
            product_id: ProductId(4),
            product_name: "Teapot".into(),
            available: 2,
            requested: 3,
        });
        assert_eq!(err.shortfalls(), vec![StockVerdict::Insufficient {
            product_id: ProductId(4),
            product_name: "Teapot".into(),
            available: 2,
            requested: 3
        }]);
        let err = OrderFlowError::OrderWriteFailed(OrderStoreError::ProductNotFound {
            product_id: ProductId(9),
            product_name: "Ghost".into(),
        });
        let expected = StockVerdict::NotFound { product_id: ProductId(9), product_name: "Ghost".into() };
        assert_eq!(err.shortfalls(), vec![expected]);
        assert!(OrderFlowError::BuyerNotFound(BuyerId(1)).shortfalls().is_empty());
    }
}
