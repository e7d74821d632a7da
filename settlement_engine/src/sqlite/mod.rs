mod db;

pub mod order_items;
pub mod orders;

use std::{env, str::FromStr};

pub use db::SqliteDatabase;
use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

use crate::traits::SettlementError;

const SQLITE_DB_URL: &str = "sqlite://data/settlement.db";

pub fn db_url() -> String {
    let result = env::var("SPS_DATABASE_URL").unwrap_or_else(|_| {
        info!("SPS_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SettlementError> {
    let options = SqliteConnectOptions::from_str(url)
        .map_err(|e| SettlementError::DatabaseError(e.to_string()))?
        .create_if_missing(true);
    // In-memory databases evaporate when their last connection closes, so idle reaping is disabled.
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    Ok(pool)
}

const SCHEMA: [&str; 4] = [
    r#"CREATE TABLE IF NOT EXISTS orders (
    id                   INTEGER PRIMARY KEY AUTOINCREMENT,
    order_id             TEXT NOT NULL UNIQUE,
    status               TEXT NOT NULL DEFAULT 'PendingPayment',
    subtotal             INTEGER NOT NULL,
    delivery_fee         INTEGER NOT NULL,
    service_fee          INTEGER NOT NULL,
    total_amount         INTEGER NOT NULL,
    payment_method       TEXT NOT NULL,
    change_for           INTEGER NULL,
    provider_payment_ref TEXT NULL,
    customer_contact     TEXT NOT NULL,
    delivery_address     TEXT NOT NULL,
    created_at           DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at           DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
)"#,
    "CREATE INDEX IF NOT EXISTS idx_orders_status ON orders (status)",
    r#"CREATE TABLE IF NOT EXISTS order_items (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    order_id           TEXT NOT NULL REFERENCES orders (order_id),
    product_name       TEXT NOT NULL,
    price_snapshot     INTEGER NOT NULL,
    quantity           INTEGER NOT NULL,
    container_exchange BOOLEAN NOT NULL DEFAULT 0
)"#,
    "CREATE INDEX IF NOT EXISTS idx_order_items_order_id ON order_items (order_id)",
];

/// Applies the schema. Every statement is idempotent, so this runs unconditionally at startup.
pub async fn create_schema(pool: &SqlitePool) -> Result<(), SettlementError> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
