//! Bridges the engine's [`PaymentProvider`] trait to the REST client in `provider_tools`, keeping the engine
//! itself free of HTTP concerns.
use log::*;
use provider_tools::{ProviderApi, ProviderApiError};
use settlement_engine::{PaymentProvider, ProviderLookupError, ProviderPayment, ProviderPaymentStatus};

/// Newtype around [`ProviderApi`] so the foreign-trait/foreign-type orphan rule allows the impl below.
#[derive(Clone)]
pub struct ProviderBridge(pub ProviderApi);

impl PaymentProvider for ProviderBridge {
    async fn fetch_payment(&self, provider_id: &str) -> Result<ProviderPayment, ProviderLookupError> {
        let data = ProviderApi::fetch_payment(&self.0, provider_id).await.map_err(|e| match e {
            ProviderApiError::Timeout(msg) => ProviderLookupError::Timeout(msg),
            e => ProviderLookupError::Api(e.to_string()),
        })?;
        let status = match data.status.parse::<ProviderPaymentStatus>() {
            Ok(status) => status,
            Err(_) => {
                warn!("📬️ Provider returned an unparseable payment status: {}", data.status);
                ProviderPaymentStatus::Other(data.status.clone())
            },
        };
        Ok(ProviderPayment { id: data.id_string(), status, external_reference: data.external_reference.clone() })
    }
}
