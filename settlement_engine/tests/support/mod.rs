#![allow(dead_code)]

use log::*;
use settlement_engine::{
    db_types::NewOrderItem,
    events::EventProducers,
    fees::{CommissionPolicy, CommissionTier},
    OrderFlowApi,
    SqliteDatabase,
};
use sps_common::Money;

/// Creates a fresh in-memory database. A single connection is used so that the database lives exactly as long as
/// the pool does.
pub async fn new_test_db() -> SqliteDatabase {
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    SqliteDatabase::new_with_url("sqlite::memory:", 1).await.expect("Error creating test database")
}

pub async fn new_test_api() -> OrderFlowApi<SqliteDatabase> {
    let db = new_test_db().await;
    OrderFlowApi::new(db, EventProducers::default())
}

/// 10% commission up to R$50, 8% above, R$6 delivery, R$15 minimum order.
pub fn test_policy() -> CommissionPolicy {
    CommissionPolicy::tiered(
        vec![
            CommissionTier { max_subtotal: Money::from_cents(5000), percent: 10.0 },
            CommissionTier { max_subtotal: Money::from_cents(10000), percent: 8.0 },
        ],
        Money::from_cents(600),
        Money::from_cents(1500),
    )
    .expect("valid test policy")
}

pub fn gallon(quantity: i64) -> NewOrderItem {
    NewOrderItem {
        product_name: "Água Mineral 20L".to_string(),
        price_snapshot: Money::from_cents(2000),
        quantity,
        container_exchange: true,
    }
}

pub fn gas_bottle(quantity: i64) -> NewOrderItem {
    NewOrderItem {
        product_name: "Botijão de Gás P13".to_string(),
        price_snapshot: Money::from_cents(11000),
        quantity,
        container_exchange: true,
    }
}
