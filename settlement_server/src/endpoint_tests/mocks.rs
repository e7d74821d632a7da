use chrono::{TimeZone, Utc};
use mockall::mock;
use settlement_engine::{
    db_types::{NewOrder, NewOrderItem, Order, OrderId, OrderItem, OrderStatusType, PaymentMethod},
    PaymentProvider,
    ProviderLookupError,
    ProviderPayment,
    SettlementDatabase,
    SettlementError,
};
use sps_common::Money;

use crate::config::{MerchantConfig, ServerConfig};

mock! {
    pub SettlementDb {}
    impl SettlementDatabase for SettlementDb {
        fn url(&self) -> &str;
        async fn insert_order(&self, order: NewOrder, items: Vec<NewOrderItem>) -> Result<Order, SettlementError>;
        async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, SettlementError>;
        async fn fetch_order_items(&self, order_id: &OrderId) -> Result<Vec<OrderItem>, SettlementError>;
        async fn fetch_orders_by_status(&self, status: OrderStatusType) -> Result<Vec<Order>, SettlementError>;
        async fn update_order_status(
            &self,
            order_id: &OrderId,
            expected: OrderStatusType,
            new_status: OrderStatusType,
            provider_ref: Option<String>,
        ) -> Result<Option<Order>, SettlementError>;
    }
}

mock! {
    pub Provider {}
    impl PaymentProvider for Provider {
        async fn fetch_payment(&self, provider_id: &str) -> Result<ProviderPayment, ProviderLookupError>;
    }
}

pub fn sample_order(status: OrderStatusType, payment_method: PaymentMethod) -> Order {
    Order {
        id: 1,
        order_id: OrderId("ORD1234567".into()),
        status,
        subtotal: Money::from_cents(4000),
        delivery_fee: Money::from_cents(600),
        service_fee: Money::from_cents(400),
        total_amount: Money::from_cents(5000),
        payment_method,
        change_for: None,
        provider_payment_ref: None,
        customer_contact: "+5598984991078".to_string(),
        delivery_address: "Rua das Flores 123".to_string(),
        created_at: Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap(),
    }
}

pub fn test_config() -> ServerConfig {
    ServerConfig {
        merchant: MerchantConfig {
            pix_key: "chave@pix.dev".to_string(),
            name: "Deposito Dois Irmaos".to_string(),
            city: "SAO LUIS".to_string(),
        },
        ..ServerConfig::default()
    }
}
