use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatusType},
    traits::SettlementError,
};

/// Inserts a new order using the given connection. This is not atomic on its own. Embed this call inside a
/// transaction if you need atomicity with the line item inserts, and pass `&mut *tx` as the connection argument.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, SettlementError> {
    let order = sqlx::query_as::<_, Order>(
        r#"
            INSERT INTO orders (
                order_id,
                subtotal,
                delivery_fee,
                service_fee,
                total_amount,
                payment_method,
                change_for,
                customer_contact,
                delivery_address
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *;
        "#,
    )
    .bind(order.order_id)
    .bind(order.subtotal)
    .bind(order.delivery_fee)
    .bind(order.service_fee)
    .bind(order.total_amount)
    .bind(order.payment_method)
    .bind(order.change_for)
    .bind(order.customer_contact)
    .bind(order.delivery_address)
    .fetch_one(conn)
    .await?;
    Ok(order)
}

pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SettlementError> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE order_id = $1 LIMIT 1")
        .bind(order_id.clone())
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

pub async fn fetch_orders_by_status(
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, SettlementError> {
    let orders = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE status = $1 ORDER BY id ASC")
        .bind(status)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

/// The conditional status update at the heart of the lifecycle guarantees. The row is only touched when its status
/// is still `expected`, and, when a provider reference is supplied, when `provider_payment_ref` is either unset or
/// already equal to the incoming value. Returns `None` when no row matched, which the caller treats as a lost race.
pub async fn update_order_status(
    order_id: &OrderId,
    expected: OrderStatusType,
    new_status: OrderStatusType,
    provider_ref: Option<String>,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SettlementError> {
    let order = sqlx::query_as::<_, Order>(
        r#"
            UPDATE orders SET
                status = $1,
                provider_payment_ref = COALESCE($2, provider_payment_ref),
                updated_at = CURRENT_TIMESTAMP
            WHERE order_id = $3
              AND status = $4
              AND ($2 IS NULL OR provider_payment_ref IS NULL OR provider_payment_ref = $2)
            RETURNING *;
        "#,
    )
    .bind(new_status)
    .bind(provider_ref)
    .bind(order_id.clone())
    .bind(expected)
    .fetch_optional(conn)
    .await?;
    if order.is_none() {
        trace!("🗃️ Conditional update of order {order_id} from {expected} to {new_status} matched no row");
    }
    Ok(order)
}
