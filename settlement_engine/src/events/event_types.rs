use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderStatusType};

/// Emitted once when checkout persists a new order, so viewers (customer status page, admin dashboard) can start
/// tracking it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreatedEvent {
    pub order: Order,
}

impl OrderCreatedEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

/// Emitted after every successful lifecycle transition. Delivery to viewers is best-effort: a dropped event never
/// rolls back the transition, and viewers recover by re-polling on reconnect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStateChangedEvent {
    pub order: Order,
    pub old_status: OrderStatusType,
    pub new_status: OrderStatusType,
}

impl OrderStateChangedEvent {
    pub fn new(order: Order, old_status: OrderStatusType) -> Self {
        let new_status = order.status;
        Self { order, old_status, new_status }
    }
}
