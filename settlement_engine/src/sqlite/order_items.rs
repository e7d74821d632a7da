use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrderItem, OrderId, OrderItem},
    traits::SettlementError,
};

pub async fn insert_order_item(
    order_id: &OrderId,
    item: NewOrderItem,
    conn: &mut SqliteConnection,
) -> Result<OrderItem, SettlementError> {
    let item = sqlx::query_as::<_, OrderItem>(
        r#"
            INSERT INTO order_items (order_id, product_name, price_snapshot, quantity, container_exchange)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(order_id.clone())
    .bind(item.product_name)
    .bind(item.price_snapshot)
    .bind(item.quantity)
    .bind(item.container_exchange)
    .fetch_one(conn)
    .await?;
    Ok(item)
}

pub async fn fetch_order_items(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderItem>, SettlementError> {
    let items = sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id ASC")
        .bind(order_id.clone())
        .fetch_all(conn)
        .await?;
    Ok(items)
}
