use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use settlement_engine::db_types::{NewOrderItem, Order, OrderId, OrderStatusType, PaymentMethod};
use sps_common::Money;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

//----------------------------------------------   Checkout  ----------------------------------------------------

/// An incoming checkout request. All monetary values are centavos. Note that no fee figures are accepted here;
/// the fee breakdown is computed server-side from the configured commission policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<NewOrderItem>,
    pub customer_contact: String,
    pub delivery_address: String,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub change_for: Option<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub order: OrderView,
    /// The Pix "copia e cola" payload. Only present for online payments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pix_payload: Option<String>,
}

/// The public face of an order. The provider payment reference and the internal row id never leave the server,
/// so they simply are not part of this view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderView {
    pub order_id: OrderId,
    pub status: OrderStatusType,
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub service_fee: Money,
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_for: Option<Money>,
    pub delivery_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self {
            order_id: order.order_id,
            status: order.status,
            subtotal: order.subtotal,
            delivery_fee: order.delivery_fee,
            service_fee: order.service_fee,
            total_amount: order.total_amount,
            payment_method: order.payment_method,
            change_for: order.change_for,
            delivery_address: order.delivery_address,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

//----------------------------------------------   Webhook  ----------------------------------------------------

/// The query-string half of a provider notification, e.g. `?topic=payment&id=12345`. Newer notification formats
/// use `type` instead of `topic`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookQuery {
    pub topic: Option<String>,
    #[serde(rename = "type")]
    pub notification_type: Option<String>,
    pub id: Option<String>,
}

impl WebhookQuery {
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref().or(self.notification_type.as_deref())
    }
}

/// The JSON half of a provider notification. The payment id lands in `data.id`, as a number or a string
/// depending on the notification's age.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookBody {
    #[serde(rename = "type")]
    pub notification_type: Option<String>,
    pub action: Option<String>,
    pub data: Option<WebhookData>,
    pub external_reference: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookData {
    pub id: Option<serde_json::Value>,
}

impl WebhookBody {
    pub fn payment_id(&self) -> Option<String> {
        match self.data.as_ref()?.id.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            v @ serde_json::Value::Number(_) => Some(v.to_string()),
            _ => None,
        }
    }
}

//----------------------------------------------   Staff  ----------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub target: OrderStatusType,
    #[serde(default)]
    pub reason: Option<String>,
}

//----------------------------------------------   Pix  ----------------------------------------------------

/// A request to render a Pix payload. Fields that are omitted fall back to the configured merchant identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PixRequest {
    pub key: Option<String>,
    pub name: Option<String>,
    pub city: Option<String>,
    /// Amount in centavos. Omitted or zero renders an open-amount code.
    pub amount: Option<Money>,
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PixResponse {
    pub payload: String,
}
