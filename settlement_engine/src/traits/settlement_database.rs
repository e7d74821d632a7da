use thiserror::Error;

use crate::db_types::{NewOrder, NewOrderItem, Order, OrderId, OrderItem, OrderStatusType};

/// How many read-validate-write cycles a guarded transition attempts before surfacing
/// [`SettlementError::ConcurrentModification`].
pub const MAX_TRANSITION_ATTEMPTS: usize = 3;

/// The order ledger. Backends implementing this trait provide durable storage for orders and items, and the
/// row-level conditional update that makes concurrent transitions safe without any in-process lock (the checkout
/// path, the webhook reconciler and the staff console may live in different processes).
#[allow(async_fn_in_trait)]
pub trait SettlementDatabase {
    /// The URL of the database.
    fn url(&self) -> &str;

    /// Persists an order together with its line items in a single transaction. A payment intent with no items, or
    /// items with no parent order, is unrecoverable inconsistency, so both succeed or neither does.
    async fn insert_order(&self, order: NewOrder, items: Vec<NewOrderItem>) -> Result<Order, SettlementError>;

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, SettlementError>;

    async fn fetch_order_items(&self, order_id: &OrderId) -> Result<Vec<OrderItem>, SettlementError>;

    async fn fetch_orders_by_status(&self, status: OrderStatusType) -> Result<Vec<Order>, SettlementError>;

    /// Conditionally updates the order's status: the write only lands if the row's status is still `expected`, and,
    /// when `provider_ref` is given, if the row's `provider_payment_ref` is unset or already equal to it.
    ///
    /// Returns the updated row, or `None` when the condition failed because another writer got there first. The
    /// caller decides whether to re-read and retry.
    async fn update_order_status(
        &self,
        order_id: &OrderId,
        expected: OrderStatusType,
        new_status: OrderStatusType,
        provider_ref: Option<String>,
    ) -> Result<Option<Order>, SettlementError>;
}

#[derive(Debug, Clone, Error)]
pub enum SettlementError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Cannot create an order without any items")]
    EmptyOrder,
    #[error("Order item rejected: {0}")]
    InvalidOrderItem(String),
    #[error("Order subtotal {subtotal} is below the minimum order value {minimum}")]
    BelowMinimumOrder { subtotal: sps_common::Money, minimum: sps_common::Money },
    #[error("Illegal order transition from {from} to {to}")]
    IllegalTransition { from: OrderStatusType, to: OrderStatusType },
    #[error("Online orders are settled by the payment provider and cannot be accepted manually")]
    ManualAcceptOfOnlineOrder,
    #[error("The payment notification is missing required fields and cannot be reconciled: {0}")]
    MalformedNotification(String),
    #[error("The payment notification references order {0}, which is unknown")]
    UnknownOrder(String),
    #[error(
        "Order {order_id} is already settled against provider payment {existing}; refusing to apply payment \
         {incoming}"
    )]
    PaymentReferenceConflict { order_id: OrderId, existing: String, incoming: String },
    #[error("Gave up transitioning order {0} after repeated concurrent modifications")]
    ConcurrentModification(OrderId),
    #[error("The payment provider could not be reached: {0}")]
    ProviderUnavailable(String),
    #[error("The payment provider rejected the lookup: {0}")]
    ProviderLookupFailed(String),
}

impl SettlementError {
    /// Whether redelivering the same notification later could succeed. Retryable conditions are surfaced to the
    /// webhook caller as failures so the provider's own retry mechanism redelivers; everything else is acknowledged
    /// to stop redelivery of an unfixable event.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SettlementError::ConcurrentModification(_) | SettlementError::ProviderUnavailable(_))
            || matches!(self, SettlementError::DatabaseError(_))
    }
}

impl From<sqlx::Error> for SettlementError {
    fn from(e: sqlx::Error) -> Self {
        SettlementError::DatabaseError(e.to_string())
    }
}
