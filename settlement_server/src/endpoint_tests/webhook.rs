use actix_web::{http::StatusCode, web, web::ServiceConfig};
use serde_json::json;
use settlement_engine::{
    db_types::{OrderStatusType, PaymentMethod},
    events::EventProducers,
    OrderFlowApi,
    ProviderLookupError,
    ProviderPayment,
    ProviderPaymentStatus,
    ReconcilerApi,
};

use super::{
    helpers::{post_empty_request, post_request},
    mocks::{sample_order, MockProvider, MockSettlementDb},
};
use crate::routes::PaymentWebhookRoute;

type MockReconciler = ReconcilerApi<MockSettlementDb, MockProvider>;

fn reconciler(db: MockSettlementDb, provider: MockProvider) -> MockReconciler {
    ReconcilerApi::new(OrderFlowApi::new(db, EventProducers::default()), provider)
}

fn route(cfg: &mut ServiceConfig, api: MockReconciler) {
    cfg.service(PaymentWebhookRoute::<MockSettlementDb, MockProvider>::new()).app_data(web::Data::new(api));
}

/// Provider holds an approved payment pay-1 for order ORD1234567; the order is pending and unsettled.
fn configure_approved(cfg: &mut ServiceConfig) {
    let mut provider = MockProvider::new();
    provider.expect_fetch_payment().returning(|id| {
        Ok(ProviderPayment {
            id: id.to_string(),
            status: ProviderPaymentStatus::Approved,
            external_reference: Some("ORD1234567".to_string()),
        })
    });
    let mut db = MockSettlementDb::new();
    db.expect_fetch_order_by_order_id()
        .returning(|oid| match oid.as_str() {
            "ORD1234567" => {
                let mut order = sample_order(OrderStatusType::PendingPayment, PaymentMethod::Online);
                order.order_id = oid.clone();
                Ok(Some(order))
            },
            _ => Ok(None),
        });
    db.expect_update_order_status().returning(|oid, _expected, new_status, provider_ref| {
        let mut order = sample_order(new_status, PaymentMethod::Online);
        order.order_id = oid.clone();
        order.provider_payment_ref = provider_ref;
        Ok(Some(order))
    });
    route(cfg, reconciler(db, provider));
}

/// The order was already settled against pay-1.
fn configure_settled(cfg: &mut ServiceConfig) {
    let mut provider = MockProvider::new();
    provider.expect_fetch_payment().returning(|id| {
        Ok(ProviderPayment {
            id: id.to_string(),
            status: ProviderPaymentStatus::Approved,
            external_reference: Some("ORD1234567".to_string()),
        })
    });
    let mut db = MockSettlementDb::new();
    db.expect_fetch_order_by_order_id().returning(|oid| {
        let mut order = sample_order(OrderStatusType::Preparing, PaymentMethod::Online);
        order.order_id = oid.clone();
        order.provider_payment_ref = Some("pay-1".to_string());
        Ok(Some(order))
    });
    route(cfg, reconciler(db, provider));
}

/// The provider cannot be reached.
fn configure_unreachable(cfg: &mut ServiceConfig) {
    let mut provider = MockProvider::new();
    provider
        .expect_fetch_payment()
        .returning(|_| Err(ProviderLookupError::Timeout("deadline has elapsed".to_string())));
    route(cfg, reconciler(MockSettlementDb::new(), provider));
}

#[actix_web::test]
async fn an_approved_payment_is_acknowledged_after_settling() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_empty_request("/webhook/payment?topic=payment&id=pay-1", configure_approved).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"success\":true"));
    assert!(body.contains("Preparing"));
}

#[actix_web::test]
async fn the_payment_id_can_arrive_in_the_json_body() {
    let _ = env_logger::try_init().ok();
    let body = json!({ "action": "payment.updated", "type": "payment", "data": { "id": 123456789 } });
    let (status, body) = post_request("/webhook/payment", body, configure_approved).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"success\":true"));
}

#[actix_web::test]
async fn non_payment_topics_are_acknowledged_without_action() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_empty_request("/webhook/payment?topic=merchant_order&id=mo-1", configure_unreachable).await;
    // The provider mock would fail the test if it were consulted; the topic filter answers first.
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("ignored"));
}

#[actix_web::test]
async fn a_redelivered_webhook_is_acknowledged_as_a_duplicate() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_empty_request("/webhook/payment?topic=payment&id=pay-1", configure_settled).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("already reconciled"));
}

#[actix_web::test]
async fn a_conflicting_payment_is_acknowledged_with_a_failure_body() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_empty_request("/webhook/payment?topic=payment&id=pay-2", configure_settled).await;
    // Redelivering cannot fix a conflict, so the provider must not retry: 200 with a failure body.
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"success\":false"));
    assert!(body.contains("already settled"));
}

#[actix_web::test]
async fn a_notification_without_a_payment_id_is_acknowledged_with_a_failure_body() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_empty_request("/webhook/payment?topic=payment", configure_unreachable).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"success\":false"));
}

#[actix_web::test]
async fn a_provider_timeout_asks_for_redelivery() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_empty_request("/webhook/payment?topic=payment&id=pay-1", configure_unreachable).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.contains("\"success\":false"));
}
