//! A thin REST client for the payment provider's payments API.
//!
//! The settlement engine never trusts a webhook body. Whenever a notification arrives, the payment it names is
//! fetched from the provider with this client and only the fetched record is acted on. The client is deliberately
//! small: one authenticated GET with a hard timeout.
mod api;
mod config;
mod data_objects;
mod error;

pub use api::ProviderApi;
pub use config::ProviderConfig;
pub use data_objects::ProviderPaymentData;
pub use error::ProviderApiError;
