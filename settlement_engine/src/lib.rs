//! Settlement Engine
//!
//! The settlement engine holds the core logic of the ordering and settlement system. It is server-agnostic: the HTTP
//! layer lives in `settlement_server`, and provider REST plumbing lives in `provider_tools`.
//!
//! The library is divided into four main sections:
//! 1. Pure calculation modules: [`pix`] (deterministic Pix "copia e cola" code generation with CRC-16 checksum),
//!    [`fees`] (commission and delivery fee calculation), and [`transitions`] (the order lifecycle rules).
//! 2. Database management ([`mod@sqlite`]). SQLite is the supported backend. You should never need to access the
//!    database directly. Instead, use the public API. The exception is the data types stored in the database, which are
//!    defined in the [`db_types`] module and are public.
//! 3. The engine public API: [`OrderFlowApi`] for placing orders and transitioning them through the lifecycle, and
//!    [`ReconcilerApi`] for reconciling payment webhooks against the provider's authoritative records. Backends need to
//!    implement the [`SettlementDatabase`] trait to drive these APIs.
//! 4. A set of [`events`] that fire when orders are created or change state. A simple actor framework lets you hook
//!    into these events and perform custom actions.
mod api;
#[cfg(feature = "sqlite")]
mod sqlite;
mod traits;

pub mod db_types;
pub mod events;
pub mod fees;
pub mod pix;
pub mod transitions;

pub use api::{OrderFlowApi, ReconcileOutcome, ReconcilerApi};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{
    PaymentProvider,
    ProviderLookupError,
    ProviderPayment,
    ProviderPaymentStatus,
    SettlementDatabase,
    SettlementError,
    MAX_TRANSITION_ATTEMPTS,
};
