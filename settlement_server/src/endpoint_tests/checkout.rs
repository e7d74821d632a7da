use actix_web::{http::StatusCode, web, web::ServiceConfig};
use serde_json::json;
use settlement_engine::{
    db_types::{OrderStatusType, PaymentMethod},
    events::EventProducers,
    pix,
    OrderFlowApi,
};
use sps_common::Money;

use super::{
    helpers::post_request,
    mocks::{sample_order, test_config, MockSettlementDb},
};
use crate::{data_objects::CheckoutResponse, routes::CheckoutRoute};

fn configure(cfg: &mut ServiceConfig) {
    let mut db = MockSettlementDb::new();
    db.expect_insert_order().returning(|order, _items| {
        let mut result = sample_order(OrderStatusType::PendingPayment, order.payment_method);
        result.order_id = order.order_id;
        result.subtotal = order.subtotal;
        result.delivery_fee = order.delivery_fee;
        result.service_fee = order.service_fee;
        result.total_amount = order.total_amount;
        result.change_for = order.change_for;
        Ok(result)
    });
    let api = OrderFlowApi::new(db, EventProducers::default());
    cfg.service(CheckoutRoute::<MockSettlementDb>::new())
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(test_config()));
}

fn checkout_body(payment_method: &str) -> serde_json::Value {
    json!({
        "items": [
            { "product_name": "Água Mineral 20L", "price_snapshot": 2000, "quantity": 2, "container_exchange": true }
        ],
        "customer_contact": "+5598984991078",
        "delivery_address": "Rua das Flores 123",
        "payment_method": payment_method,
    })
}

#[actix_web::test]
async fn checkout_prices_the_order_server_side() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("/checkout", checkout_body("money"), configure).await;
    assert_eq!(status, StatusCode::OK);
    let response: CheckoutResponse = serde_json::from_str(&body).unwrap();
    assert_eq!(response.order.status, OrderStatusType::PendingPayment);
    assert_eq!(response.order.subtotal, Money::from_cents(4000));
    assert_eq!(response.order.delivery_fee, Money::from_cents(0));
    assert_eq!(response.order.service_fee, Money::from_cents(0));
    assert!(response.pix_payload.is_none());
    // The provider payment reference is not part of the public view.
    assert!(!body.contains("provider_payment_ref"));
}

#[actix_web::test]
async fn checkout_for_online_payment_returns_a_pix_payload() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("/checkout", checkout_body("online"), configure).await;
    assert_eq!(status, StatusCode::OK);
    let response: CheckoutResponse = serde_json::from_str(&body).unwrap();
    let payload = response.pix_payload.expect("online payment should carry a Pix payload");
    assert!(payload.starts_with("000201"));
    assert!(pix::validate_checksum(&payload));
    // The payload amount is the order total and the reference is the order id.
    assert!(payload.contains("540540.00"));
    assert!(payload.contains(response.order.order_id.as_str()));
}

#[actix_web::test]
async fn checkout_ignores_client_fee_figures() {
    let _ = env_logger::try_init().ok();
    let mut body = checkout_body("money");
    body["service_fee"] = json!(1);
    body["delivery_fee"] = json!(1);
    let (status, response) = post_request("/checkout", body, configure).await;
    assert_eq!(status, StatusCode::OK);
    let response: CheckoutResponse = serde_json::from_str(&response).unwrap();
    assert_eq!(response.order.delivery_fee, Money::from_cents(0));
    assert_eq!(response.order.service_fee, Money::from_cents(0));
}

#[actix_web::test]
async fn checkout_with_no_items_is_rejected() {
    let _ = env_logger::try_init().ok();
    let body = json!({
        "items": [],
        "customer_contact": "+5598984991078",
        "delivery_address": "Rua das Flores 123",
        "payment_method": "money",
    });
    let (status, body) = post_request("/checkout", body, configure).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.contains("without any items"));
}

#[actix_web::test]
async fn checkout_with_hostile_quantities_is_rejected() {
    let _ = env_logger::try_init().ok();
    // A quantity that overflows the line total, and one that is not positive. Neither may reach the database (the
    // mock has no insert expectation and would panic).
    for quantity in [i64::MAX / 1000, 0, -3] {
        let mut body = checkout_body("money");
        body["items"][0]["quantity"] = json!(quantity);
        let (status, body) = post_request("/checkout", body, configure_without_insert).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "quantity {quantity} was not rejected");
        assert!(body.contains("Order item rejected"));
    }
}

fn configure_without_insert(cfg: &mut ServiceConfig) {
    let api = OrderFlowApi::new(MockSettlementDb::new(), EventProducers::default());
    cfg.service(CheckoutRoute::<MockSettlementDb>::new())
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(test_config()));
}
