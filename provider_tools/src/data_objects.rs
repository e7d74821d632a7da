use serde::{Deserialize, Serialize};

/// The subset of the provider's payment record the settlement engine cares about. Everything else in the response
/// body is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderPaymentData {
    pub id: serde_json::Value,
    pub status: String,
    pub external_reference: Option<String>,
}

impl ProviderPaymentData {
    /// The provider serialises payment ids as numbers in some payloads and strings in others.
    pub fn id_string(&self) -> String {
        match &self.id {
            serde_json::Value::String(s) => s.clone(),
            v => v.to_string(),
        }
    }
}
