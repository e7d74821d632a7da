//! The canonical order lifecycle.
//!
//! Every status change in the system, whether it originates from a provider webhook or a staff console, is checked
//! against this table before anything is written:
//!
//! | From           | To             | Trigger                           |
//! |----------------|----------------|-----------------------------------|
//! | PendingPayment | Preparing      | PaymentConfirmed, StaffAccept (*) |
//! | PendingPayment | Cancelled      | PaymentDenied, StaffReject        |
//! | Preparing      | OutForDelivery | StaffAdvance                      |
//! | OutForDelivery | Delivered      | StaffAdvance                      |
//! | Preparing      | Cancelled      | StaffCancel                       |
//! | OutForDelivery | Cancelled      | StaffCancel                       |
//!
//! (*) StaffAccept is only valid for orders that are not paid online; the webhook owns that edge.
//!
//! Anything not in the table, including re-entrant transitions and any transition out of a terminal status, is an
//! error rather than a silent no-op. Silently accepting a bad transition would mask a reconciliation bug.
use std::fmt::Display;

use crate::{
    db_types::{OrderStatusType, PaymentMethod},
    traits::SettlementError,
};

/// What caused a transition to be requested. The trigger is part of the guard: the same edge can be legal for one
/// trigger and illegal for another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionTrigger {
    /// The payment provider reported the payment as approved.
    PaymentConfirmed,
    /// The payment provider reported a terminal denial (rejected, expired, cancelled).
    PaymentDenied,
    /// Staff accepted a card-machine or cash order for preparation.
    StaffAccept,
    /// Staff rejected a pending order.
    StaffReject,
    /// Staff moved the order along the happy path (out for delivery, delivered).
    StaffAdvance,
    /// Staff cancelled an order that was already being prepared or delivered. Always explicit, never automatic.
    StaffCancel,
}

impl Display for TransitionTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionTrigger::PaymentConfirmed => write!(f, "payment confirmed"),
            TransitionTrigger::PaymentDenied => write!(f, "payment denied"),
            TransitionTrigger::StaffAccept => write!(f, "staff accept"),
            TransitionTrigger::StaffReject => write!(f, "staff reject"),
            TransitionTrigger::StaffAdvance => write!(f, "staff advance"),
            TransitionTrigger::StaffCancel => write!(f, "staff cancel"),
        }
    }
}

/// Validates a single transition against the lifecycle table. Pure; the caller is responsible for making the
/// read-validate-write cycle atomic.
pub fn check_transition(
    from: OrderStatusType,
    to: OrderStatusType,
    trigger: TransitionTrigger,
    payment_method: PaymentMethod,
) -> Result<(), SettlementError> {
    use OrderStatusType::*;
    use TransitionTrigger::*;
    match (from, to, trigger) {
        (PendingPayment, Preparing, PaymentConfirmed) => Ok(()),
        (PendingPayment, Preparing, StaffAccept) if !payment_method.is_online() => Ok(()),
        (PendingPayment, Preparing, StaffAccept) => Err(SettlementError::ManualAcceptOfOnlineOrder),
        (PendingPayment, Cancelled, PaymentDenied | StaffReject) => Ok(()),
        (Preparing, OutForDelivery, StaffAdvance) => Ok(()),
        (OutForDelivery, Delivered, StaffAdvance) => Ok(()),
        (Preparing | OutForDelivery, Cancelled, StaffCancel) => Ok(()),
        (from, to, _) => Err(SettlementError::IllegalTransition { from, to }),
    }
}
