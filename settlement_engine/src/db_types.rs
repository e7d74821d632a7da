use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use sps_common::Money;
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid value for {0}: {1}")]
pub struct ConversionError(pub &'static str, pub String);

//--------------------------------------        OrderId        -------------------------------------------------------
/// The opaque public identifier of an order. Generated once at checkout and immutable thereafter. This is the value
/// that travels to the payment provider as the `external_reference` and comes back in webhook notifications.
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    /// Generate a fresh random order id. 10 alphanumeric characters is comfortably collision-free for a single
    /// storefront and short enough to fit the Pix reference field.
    pub fn random() -> Self {
        let token: String = rand::thread_rng().sample_iter(&Alphanumeric).take(10).map(char::from).collect();
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

//--------------------------------------   OrderStatusType     -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatusType {
    /// The order has been created and no payment confirmation has been received.
    PendingPayment,
    /// Payment was confirmed (or the order was manually accepted) and the kitchen is preparing it.
    Preparing,
    /// The order has left with a courier.
    OutForDelivery,
    /// The order has been handed to the customer. Terminal.
    Delivered,
    /// The order was rejected, denied or cancelled. Terminal. Rows are never deleted.
    Cancelled,
}

impl OrderStatusType {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatusType::Delivered | OrderStatusType::Cancelled)
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::PendingPayment => write!(f, "PendingPayment"),
            OrderStatusType::Preparing => write!(f, "Preparing"),
            OrderStatusType::OutForDelivery => write!(f, "OutForDelivery"),
            OrderStatusType::Delivered => write!(f, "Delivered"),
            OrderStatusType::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PendingPayment" => Ok(Self::PendingPayment),
            "Preparing" => Ok(Self::Preparing),
            "OutForDelivery" => Ok(Self::OutForDelivery),
            "Delivered" => Ok(Self::Delivered),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError("order status", s.to_string())),
        }
    }
}

//--------------------------------------    PaymentMethod      -------------------------------------------------------
/// How the customer chose to pay. The method determines which transitions are externally reachable: only `Online`
/// orders receive provider webhooks; `CardMachine` and `Cash` orders are accepted manually by staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Online,
    CardMachine,
    /// Paid in cash on delivery. The wire name is "money", which is what the storefront has always sent.
    #[serde(rename = "money")]
    Cash,
}

impl PaymentMethod {
    pub fn is_online(&self) -> bool {
        matches!(self, PaymentMethod::Online)
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Online => write!(f, "Online"),
            PaymentMethod::CardMachine => write!(f, "CardMachine"),
            PaymentMethod::Cash => write!(f, "Cash"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Online" | "online" => Ok(Self::Online),
            "CardMachine" | "card_machine" => Ok(Self::CardMachine),
            "Cash" | "cash" | "money" => Ok(Self::Cash),
            s => Err(ConversionError("payment method", s.to_string())),
        }
    }
}

//--------------------------------------        Order          -------------------------------------------------------
/// A persisted order row. The monetary breakdown is locked at creation time and `total_amount` always equals
/// `subtotal + delivery_fee + service_fee`. `status` is only ever mutated through the guarded transition API, and
/// `provider_payment_ref` is only ever set by the reconciler, once.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    pub status: OrderStatusType,
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub service_fee: Money,
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    pub change_for: Option<Money>,
    pub provider_payment_ref: Option<String>,
    pub customer_contact: String,
    pub delivery_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       NewOrder        -------------------------------------------------------
/// A not-yet-persisted order, as assembled by the checkout flow after fee calculation.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: OrderId,
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub service_fee: Money,
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    /// Only meaningful for cash orders: the note the customer will pay with, so the courier brings change.
    pub change_for: Option<Money>,
    pub customer_contact: String,
    pub delivery_address: String,
}

impl NewOrder {
    pub fn new(
        subtotal: Money,
        delivery_fee: Money,
        service_fee: Money,
        payment_method: PaymentMethod,
        customer_contact: String,
        delivery_address: String,
    ) -> Self {
        Self {
            order_id: OrderId::random(),
            subtotal,
            delivery_fee,
            service_fee,
            total_amount: subtotal + delivery_fee + service_fee,
            payment_method,
            change_for: None,
            customer_contact,
            delivery_address,
        }
    }

    pub fn with_change_for(mut self, change_for: Money) -> Self {
        self.change_for = Some(change_for);
        self
    }
}

//--------------------------------------      OrderItem        -------------------------------------------------------
/// An immutable line item. `price_snapshot` is the catalog price at the moment the order was placed and is never
/// recomputed, so later catalog edits cannot change what the customer owes.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: OrderId,
    pub product_name: String,
    pub price_snapshot: Money,
    pub quantity: i64,
    pub container_exchange: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_name: String,
    pub price_snapshot: Money,
    pub quantity: i64,
    /// True when a returnable container (water gallon, gas bottle) is exchanged rather than sold.
    #[serde(default)]
    pub container_exchange: bool,
}

impl NewOrderItem {
    /// `price_snapshot * quantity`, or `None` when the product would not fit in an i64 centavo amount. Quantities
    /// and prices arrive from the checkout request, so overflow here is hostile input, not a bug.
    pub fn line_total(&self) -> Option<Money> {
        self.price_snapshot.checked_mul(self.quantity)
    }
}

//---------------------------------------  PaymentNotification  ------------------------------------------------------
/// A transient, untrusted webhook notification from the payment provider. It is a hint to fetch the authoritative
/// payment record, never a source of truth. Not persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentNotification {
    pub provider_topic: String,
    pub provider_id: Option<String>,
    /// Reference claimed by the notification body, if any. Cross-checked against the fetched payment record.
    pub external_reference: Option<String>,
}

impl PaymentNotification {
    pub fn payment(provider_id: impl Into<String>) -> Self {
        Self { provider_topic: "payment".to_string(), provider_id: Some(provider_id.into()), external_reference: None }
    }
}
