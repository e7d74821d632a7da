use actix_web::{http::StatusCode, web, web::ServiceConfig};
use serde_json::json;
use settlement_engine::pix;

use super::{helpers::post_request, mocks::test_config};
use crate::{data_objects::PixResponse, routes::render_pix};

fn configure(cfg: &mut ServiceConfig) {
    cfg.service(render_pix).app_data(web::Data::new(test_config()));
}

fn configure_unset_merchant(cfg: &mut ServiceConfig) {
    cfg.service(render_pix).app_data(web::Data::new(crate::config::ServerConfig::default()));
}

#[actix_web::test]
async fn pix_renders_with_the_configured_merchant() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("/pix", json!({ "amount": 2350, "reference": "AB12" }), configure).await;
    assert_eq!(status, StatusCode::OK);
    let response: PixResponse = serde_json::from_str(&body).unwrap();
    assert!(response.payload.starts_with("000201"));
    assert!(response.payload.contains("chave@pix.dev"));
    assert!(response.payload.contains("DEPOSITO DOIS IRMAOS"));
    assert!(response.payload.contains("540523.50"));
    assert!(response.payload.contains("0504AB12"));
    assert!(pix::validate_checksum(&response.payload));
}

#[actix_web::test]
async fn pix_request_fields_override_the_configuration() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/pix", json!({ "name": "Açaí do Zé", "city": "São Luís" }), configure).await;
    assert_eq!(status, StatusCode::OK);
    let response: PixResponse = serde_json::from_str(&body).unwrap();
    assert!(response.payload.contains("ACAI DO ZE"));
    assert!(response.payload.contains("SAO LUIS"));
    // No amount requested: the currency tag runs straight into the country tag and the reference defaults.
    assert!(response.payload.contains("53039865802BR"));
    assert!(response.payload.contains("62070503***"));
}

#[actix_web::test]
async fn pix_without_a_configured_key_is_rejected() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("/pix", json!({}), configure_unset_merchant).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Pix key is empty"));
}
