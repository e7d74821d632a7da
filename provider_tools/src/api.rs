use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::de::DeserializeOwned;

use crate::{config::ProviderConfig, data_objects::ProviderPaymentData, ProviderApiError};

#[derive(Clone)]
pub struct ProviderApi {
    config: ProviderConfig,
    client: Arc<Client>,
}

impl ProviderApi {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let bearer = format!("Bearer {}", config.access_token.reveal());
        let val =
            HeaderValue::from_str(bearer.as_str()).map_err(|e| ProviderApiError::Initialization(e.to_string()))?;
        headers.insert("Authorization", val);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    /// Fetches the authoritative record for a single payment.
    pub async fn fetch_payment(&self, payment_id: &str) -> Result<ProviderPaymentData, ProviderApiError> {
        let path = format!("/v1/payments/{payment_id}");
        let payment = self.rest_query::<ProviderPaymentData>(Method::GET, path.as_str()).await?;
        trace!("Payment [{}] fetched with status {}", payment.id_string(), payment.status);
        Ok(payment)
    }

    async fn rest_query<T: DeserializeOwned>(&self, method: Method, path: &str) -> Result<T, ProviderApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {url}");
        let req = self.client.request(method, url);
        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderApiError::Timeout(e.to_string())
            } else {
                ProviderApiError::RestResponseError(e.to_string())
            }
        })?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| ProviderApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| ProviderApiError::RestResponseError(e.to_string()))?;
            Err(ProviderApiError::QueryError { status, message })
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }
}
