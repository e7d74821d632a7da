use std::fmt::Debug;

use log::*;
use sps_common::Money;

use crate::{
    db_types::{NewOrder, NewOrderItem, Order, OrderId, OrderItem, OrderStatusType, PaymentMethod},
    events::{EventProducers, OrderCreatedEvent, OrderStateChangedEvent},
    fees::{calculate_fees, CommissionPolicy},
    transitions::{check_transition, TransitionTrigger},
    traits::{SettlementDatabase, SettlementError, MAX_TRANSITION_ATTEMPTS},
};

/// `OrderFlowApi` is the primary API for placing orders and moving them through the lifecycle in response to
/// checkout requests, reconciled payments and staff actions.
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
}

impl<B> OrderFlowApi<B>
where B: SettlementDatabase
{
    /// Place a brand-new order.
    ///
    /// The subtotal is computed from the line items' price snapshots, the fee breakdown is locked in via the
    /// commission policy, and the order together with its items is persisted atomically in `PendingPayment`. An
    /// order with no items, or one whose subtotal falls short of the policy's minimum, is rejected before anything
    /// touches the database.
    pub async fn place_order(
        &self,
        items: Vec<NewOrderItem>,
        customer_contact: String,
        delivery_address: String,
        payment_method: PaymentMethod,
        change_for: Option<Money>,
        policy: &CommissionPolicy,
    ) -> Result<Order, SettlementError> {
        if items.is_empty() {
            return Err(SettlementError::EmptyOrder);
        }
        let mut subtotal = Money::from_cents(0);
        for item in &items {
            if item.quantity < 1 {
                return Err(SettlementError::InvalidOrderItem(format!(
                    "{} has a quantity of {}",
                    item.product_name, item.quantity
                )));
            }
            if item.price_snapshot < Money::from_cents(0) {
                return Err(SettlementError::InvalidOrderItem(format!(
                    "{} has a negative price of {}",
                    item.product_name, item.price_snapshot
                )));
            }
            subtotal = item
                .line_total()
                .and_then(|line| subtotal.checked_add(line))
                .ok_or_else(|| {
                    SettlementError::InvalidOrderItem(format!("{} overflows the order total", item.product_name))
                })?;
        }
        let fees = calculate_fees(subtotal, policy);
        if !fees.meets_minimum {
            return Err(SettlementError::BelowMinimumOrder { subtotal, minimum: policy.min_order_value });
        }
        let mut order = NewOrder::new(
            subtotal,
            fees.delivery_fee,
            fees.service_fee,
            payment_method,
            customer_contact,
            delivery_address,
        );
        if let Some(change_for) = change_for {
            order = order.with_change_for(change_for);
        }
        let order = self.db.insert_order(order, items).await?;
        debug!("🔄️📦️ Order {} placed. Total {} due via {payment_method}", order.order_id, order.total_amount);
        self.call_order_created_hook(&order).await;
        Ok(order)
    }

    /// Attempt a lifecycle transition for the given order.
    ///
    /// Each attempt re-reads the order, validates the edge against the lifecycle table, and then performs a
    /// conditional write that only lands if the row is still in the state that was just read. A failed write means
    /// another writer transitioned the order in between, so the cycle repeats with fresh state, up to
    /// [`MAX_TRANSITION_ATTEMPTS`] times.
    pub async fn transition_order(
        &self,
        order_id: &OrderId,
        target: OrderStatusType,
        trigger: TransitionTrigger,
        provider_ref: Option<String>,
    ) -> Result<Order, SettlementError> {
        for attempt in 1..=MAX_TRANSITION_ATTEMPTS {
            let order = self
                .db
                .fetch_order_by_order_id(order_id)
                .await?
                .ok_or_else(|| SettlementError::OrderNotFound(order_id.clone()))?;
            let old_status = order.status;
            check_transition(old_status, target, trigger, order.payment_method)?;
            match self.db.update_order_status(order_id, old_status, target, provider_ref.clone()).await? {
                Some(updated) => {
                    info!("🔄️📦️ Order {order_id} transitioned from {old_status} to {target} ({trigger})");
                    self.call_state_change_hook(&updated, old_status).await;
                    return Ok(updated);
                },
                None => {
                    warn!(
                        "🔄️📦️ Order {order_id} was modified concurrently during attempt {attempt} of a transition \
                         to {target}. Re-reading."
                    );
                },
            }
        }
        Err(SettlementError::ConcurrentModification(order_id.clone()))
    }

    /// A transition requested from the staff console. The trigger is derived from the requested target and the
    /// order's current state, so callers only ever name the state they want.
    pub async fn staff_transition(&self, order_id: &OrderId, target: OrderStatusType) -> Result<Order, SettlementError> {
        let order = self
            .db
            .fetch_order_by_order_id(order_id)
            .await?
            .ok_or_else(|| SettlementError::OrderNotFound(order_id.clone()))?;
        let trigger = match target {
            OrderStatusType::Preparing => TransitionTrigger::StaffAccept,
            OrderStatusType::OutForDelivery | OrderStatusType::Delivered => TransitionTrigger::StaffAdvance,
            OrderStatusType::Cancelled if order.status == OrderStatusType::PendingPayment => {
                TransitionTrigger::StaffReject
            },
            OrderStatusType::Cancelled => TransitionTrigger::StaffCancel,
            OrderStatusType::PendingPayment => {
                return Err(SettlementError::IllegalTransition { from: order.status, to: target });
            },
        };
        self.transition_order(order_id, target, trigger, None).await
    }

    pub async fn fetch_order(&self, order_id: &OrderId) -> Result<Order, SettlementError> {
        self.db
            .fetch_order_by_order_id(order_id)
            .await?
            .ok_or_else(|| SettlementError::OrderNotFound(order_id.clone()))
    }

    pub async fn fetch_order_items(&self, order_id: &OrderId) -> Result<Vec<OrderItem>, SettlementError> {
        self.db.fetch_order_items(order_id).await
    }

    pub async fn fetch_orders_by_status(&self, status: OrderStatusType) -> Result<Vec<Order>, SettlementError> {
        self.db.fetch_orders_by_status(status).await
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    async fn call_order_created_hook(&self, order: &Order) {
        for emitter in &self.producers.order_created_producers {
            debug!("🔄️📦️ Notifying order created hook subscribers");
            let event = OrderCreatedEvent::new(order.clone());
            emitter.publish_event(event).await;
        }
    }

    async fn call_state_change_hook(&self, order: &Order, old_status: OrderStatusType) {
        for emitter in &self.producers.state_change_producers {
            debug!("🔄️📦️ Notifying state change hook subscribers");
            let event = OrderStateChangedEvent::new(order.clone(), old_status);
            emitter.publish_event(event).await;
        }
    }
}
