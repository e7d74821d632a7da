use log::*;
use sps_common::Secret;

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub access_token: Secret<String>,
    /// Hard deadline for a single payment lookup, in seconds. The webhook handler answers the provider's
    /// redelivery mechanism, so a lookup must fail fast rather than hang.
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.mercadopago.com".to_string(),
            access_token: Secret::new(String::default()),
            timeout_secs: 10,
        }
    }
}

impl ProviderConfig {
    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("SPS_PROVIDER_BASE_URL").unwrap_or_else(|_| {
            warn!("SPS_PROVIDER_BASE_URL not set, using https://api.mercadopago.com as default");
            "https://api.mercadopago.com".to_string()
        });
        let access_token = Secret::new(std::env::var("SPS_PROVIDER_ACCESS_TOKEN").unwrap_or_else(|_| {
            warn!("SPS_PROVIDER_ACCESS_TOKEN not set, payment lookups will be rejected by the provider");
            String::default()
        }));
        let timeout_secs = std::env::var("SPS_PROVIDER_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(10);
        Self { base_url, access_token, timeout_secs }
    }
}
