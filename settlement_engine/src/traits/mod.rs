//! Interface contracts of the settlement engine.
//!
//! * [`SettlementDatabase`] is the order ledger: the durable store of orders and their line items. It is the
//!   correctness boundary for concurrent writers, via its conditional status update.
//! * [`PaymentProvider`] is the outbound boundary to the payment provider: the authoritative lookup the reconciler
//!   performs before trusting anything a webhook said.
mod payment_provider;
mod settlement_database;

pub use payment_provider::{PaymentProvider, ProviderLookupError, ProviderPayment, ProviderPaymentStatus};
pub use settlement_database::{SettlementDatabase, SettlementError, MAX_TRANSITION_ATTEMPTS};
