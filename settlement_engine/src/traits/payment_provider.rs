use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The authoritative payment record as fetched from the provider. A webhook body only ever tells us *which* payment
/// to look at; this record tells us what actually happened to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderPayment {
    pub id: String,
    pub status: ProviderPaymentStatus,
    /// The merchant-side reference attached to the payment, expected to equal an order id.
    pub external_reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderPaymentStatus {
    Approved,
    Pending,
    InProcess,
    Rejected,
    Expired,
    Cancelled,
    Refunded,
    ChargedBack,
    /// Anything this engine does not know about. Unknown statuses degrade to "no action", never to a crash.
    #[serde(untagged)]
    Other(String),
}

impl ProviderPaymentStatus {
    /// True when the provider has settled the payment in the merchant's favor.
    pub fn is_approved(&self) -> bool {
        matches!(self, ProviderPaymentStatus::Approved)
    }

    /// True for statuses that definitively deny a pending payment, justifying cancellation of the order.
    /// Post-settlement statuses (refunded, charged back) are deliberately not included; those need manual review.
    pub fn is_terminal_denial(&self) -> bool {
        matches!(
            self,
            ProviderPaymentStatus::Rejected | ProviderPaymentStatus::Expired | ProviderPaymentStatus::Cancelled
        )
    }
}

impl FromStr for ProviderPaymentStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "approved" => Self::Approved,
            "pending" => Self::Pending,
            "in_process" => Self::InProcess,
            "rejected" => Self::Rejected,
            "expired" => Self::Expired,
            "cancelled" => Self::Cancelled,
            "refunded" => Self::Refunded,
            "charged_back" => Self::ChargedBack,
            other => Self::Other(other.to_string()),
        })
    }
}

impl Display for ProviderPaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderPaymentStatus::Approved => write!(f, "approved"),
            ProviderPaymentStatus::Pending => write!(f, "pending"),
            ProviderPaymentStatus::InProcess => write!(f, "in_process"),
            ProviderPaymentStatus::Rejected => write!(f, "rejected"),
            ProviderPaymentStatus::Expired => write!(f, "expired"),
            ProviderPaymentStatus::Cancelled => write!(f, "cancelled"),
            ProviderPaymentStatus::Refunded => write!(f, "refunded"),
            ProviderPaymentStatus::ChargedBack => write!(f, "charged_back"),
            ProviderPaymentStatus::Other(s) => write!(f, "{s}"),
        }
    }
}

/// The outbound boundary to the payment provider. The single lookup call must carry a timeout; on timeout the
/// notification that prompted it is treated as retryable by the caller's delivery retry, not retried internally.
#[allow(async_fn_in_trait)]
pub trait PaymentProvider {
    async fn fetch_payment(&self, provider_id: &str) -> Result<ProviderPayment, ProviderLookupError>;
}

#[derive(Debug, Clone, Error)]
pub enum ProviderLookupError {
    #[error("The payment provider did not respond in time: {0}")]
    Timeout(String),
    #[error("The payment provider returned an error: {0}")]
    Api(String),
}
