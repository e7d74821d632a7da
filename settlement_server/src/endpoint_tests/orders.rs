use actix_web::{http::StatusCode, web, web::ServiceConfig};
use serde_json::json;
use settlement_engine::{
    db_types::{OrderStatusType, PaymentMethod},
    events::EventProducers,
    OrderFlowApi,
};

use super::{
    helpers::{get_request, post_request},
    mocks::{sample_order, MockSettlementDb},
};
use crate::{
    data_objects::OrderView,
    routes::{OrderByIdRoute, UpdateOrderStatusRoute},
};

fn configure(cfg: &mut ServiceConfig) {
    let mut db = MockSettlementDb::new();
    db.expect_fetch_order_by_order_id().returning(|order_id| {
        if order_id.as_str() == "ORD1234567" {
            let mut order = sample_order(OrderStatusType::Preparing, PaymentMethod::Cash);
            order.order_id = order_id.clone();
            Ok(Some(order))
        } else {
            Ok(None)
        }
    });
    db.expect_update_order_status().returning(|order_id, _expected, new_status, _provider_ref| {
        let mut order = sample_order(new_status, PaymentMethod::Cash);
        order.order_id = order_id.clone();
        Ok(Some(order))
    });
    let api = OrderFlowApi::new(db, EventProducers::default());
    cfg.service(OrderByIdRoute::<MockSettlementDb>::new())
        .service(UpdateOrderStatusRoute::<MockSettlementDb>::new())
        .app_data(web::Data::new(api));
}

#[actix_web::test]
async fn fetch_order_returns_the_public_view() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/order/ORD1234567", configure).await;
    assert_eq!(status, StatusCode::OK);
    let view: OrderView = serde_json::from_str(&body).unwrap();
    assert_eq!(view.order_id.as_str(), "ORD1234567");
    assert_eq!(view.status, OrderStatusType::Preparing);
    assert!(!body.contains("provider_payment_ref"));
    assert!(!body.contains("\"id\""));
}

#[actix_web::test]
async fn fetch_unknown_order_is_a_404() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/order/NOSUCH", configure).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("does not exist"));
}

#[actix_web::test]
async fn staff_can_advance_a_preparing_order() {
    let _ = env_logger::try_init().ok();
    let body = json!({ "target": "OutForDelivery", "reason": "courier left" });
    let (status, body) = post_request("/order/ORD1234567/status", body, configure).await;
    assert_eq!(status, StatusCode::OK);
    let view: OrderView = serde_json::from_str(&body).unwrap();
    assert_eq!(view.status, OrderStatusType::OutForDelivery);
}

#[actix_web::test]
async fn an_illegal_staff_move_is_a_conflict() {
    let _ = env_logger::try_init().ok();
    // The order is Preparing; jumping straight to Delivered skips the courier leg.
    let body = json!({ "target": "Delivered" });
    let (status, body) = post_request("/order/ORD1234567/status", body, configure).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("Illegal order transition"));
}

#[actix_web::test]
async fn a_staff_move_on_an_unknown_order_is_a_404() {
    let _ = env_logger::try_init().ok();
    let body = json!({ "target": "Preparing" });
    let (status, _body) = post_request("/order/NOSUCH/status", body, configure).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
