use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Order, OrderId, OrderStatusType, PaymentNotification},
    transitions::TransitionTrigger,
    traits::{PaymentProvider, ProviderLookupError, SettlementDatabase, SettlementError},
    OrderFlowApi,
};

/// What the reconciler decided about a notification. Every variant carries the order as it stands after
/// reconciliation, so callers can report the current state without another read.
#[derive(Debug, Clone)]
pub enum ReconcileOutcome {
    /// The payment moved the order to a new state.
    Transitioned(Order),
    /// The order was already settled against this same payment. Nothing to do.
    Duplicate(Order),
    /// The payment is in a state that demands no transition (pending, in process, refunds and the like).
    NoAction(Order),
}

/// `ReconcilerApi` turns untrusted webhook notifications into trusted order transitions.
///
/// A notification is never acted on directly: the payment is re-fetched from the provider, the order is looked up
/// by the external reference the provider holds for it, and only then is a state change attempted. Redeliveries and
/// replays are absorbed by the write-once provider payment reference on the order row.
pub struct ReconcilerApi<B, P> {
    flow: OrderFlowApi<B>,
    provider: P,
}

impl<B, P> Debug for ReconcilerApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconcilerApi")
    }
}

impl<B, P> ReconcilerApi<B, P> {
    pub fn new(flow: OrderFlowApi<B>, provider: P) -> Self {
        Self { flow, provider }
    }

    pub fn flow(&self) -> &OrderFlowApi<B> {
        &self.flow
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl<B, P> ReconcilerApi<B, P>
where
    B: SettlementDatabase,
    P: PaymentProvider,
{
    /// Reconcile a single payment notification against the provider's authoritative record.
    pub async fn reconcile(&self, notification: PaymentNotification) -> Result<ReconcileOutcome, SettlementError> {
        let provider_id = notification
            .provider_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| SettlementError::MalformedNotification("no payment id present".to_string()))?;
        let payment = self.provider.fetch_payment(provider_id).await.map_err(|e| match e {
            ProviderLookupError::Timeout(msg) => SettlementError::ProviderUnavailable(msg),
            ProviderLookupError::Api(msg) => SettlementError::ProviderLookupFailed(msg),
        })?;
        debug!("📬️ Payment [{}] fetched from provider. Status: {}", payment.id, payment.status);
        // The reference on the fetched record is authoritative. The one in the notification body, if present, is
        // only cross-checked.
        let reference = payment
            .external_reference
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .ok_or_else(|| {
                SettlementError::MalformedNotification(format!("payment {} carries no external reference", payment.id))
            })?;
        if let Some(claimed) = notification.external_reference.as_deref() {
            if claimed != reference {
                warn!(
                    "📬️ Notification for payment [{}] claimed reference {claimed}, but the provider holds \
                     {reference}. Trusting the provider.",
                    payment.id
                );
            }
        }
        let order_id = OrderId::from(reference.to_string());
        let order = self
            .flow
            .db()
            .fetch_order_by_order_id(&order_id)
            .await?
            .ok_or_else(|| SettlementError::UnknownOrder(reference.to_string()))?;
        match order.provider_payment_ref.as_deref() {
            Some(existing) if existing == payment.id => {
                debug!("📬️ Order {order_id} is already settled against payment [{}]. No action.", payment.id);
                return Ok(ReconcileOutcome::Duplicate(order));
            },
            Some(existing) => {
                return Err(SettlementError::PaymentReferenceConflict {
                    order_id,
                    existing: existing.to_string(),
                    incoming: payment.id,
                });
            },
            None => {},
        }
        let (target, trigger) = if payment.status.is_approved() {
            (OrderStatusType::Preparing, TransitionTrigger::PaymentConfirmed)
        } else if payment.status.is_terminal_denial() {
            (OrderStatusType::Cancelled, TransitionTrigger::PaymentDenied)
        } else {
            debug!(
                "📬️ Payment [{}] is {} and settles nothing yet. Order {order_id} stays {}.",
                payment.id, payment.status, order.status
            );
            return Ok(ReconcileOutcome::NoAction(order));
        };
        let updated = match self.flow.transition_order(&order_id, target, trigger, Some(payment.id.clone())).await {
            Ok(updated) => updated,
            // A concurrent delivery of this same payment can settle the order between the duplicate check above and
            // the conditional write, in which case the retried transition reads a settled row and reports an illegal
            // edge. Re-check the reference before surfacing that as an error.
            Err(err @ SettlementError::IllegalTransition { .. }) => {
                let current = self
                    .flow
                    .db()
                    .fetch_order_by_order_id(&order_id)
                    .await?
                    .ok_or_else(|| SettlementError::UnknownOrder(reference.to_string()))?;
                if current.provider_payment_ref.as_deref() == Some(payment.id.as_str()) {
                    debug!(
                        "📬️ Order {order_id} was settled against payment [{}] by a concurrent delivery. No action.",
                        payment.id
                    );
                    return Ok(ReconcileOutcome::Duplicate(current));
                }
                return Err(err);
            },
            Err(e) => return Err(e),
        };
        info!("📬️ Payment [{}] reconciled. Order {order_id} is now {}.", payment.id, updated.status);
        Ok(ReconcileOutcome::Transitioned(updated))
    }
}
