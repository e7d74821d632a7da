use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use provider_tools::ProviderApi;
use settlement_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    OrderFlowApi,
    ReconcilerApi,
    SqliteDatabase,
};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::provider::ProviderBridge,
    routes::{health, render_pix, CheckoutRoute, OrderByIdRoute, PaymentWebhookRoute, UpdateOrderStatusRoute},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let provider = ProviderApi::new(config.provider.clone())
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let mut hooks = EventHooks::default();
    hooks.on_order_created(|ev| {
        info!("🪝️ Order {} created for {}", ev.order.order_id, ev.order.total_amount);
        Box::pin(async {})
    });
    hooks.on_state_change(|ev| {
        info!("🪝️ Order {} moved from {} to {}", ev.order.order_id, ev.old_status, ev.new_status);
        Box::pin(async {})
    });
    let handlers = EventHandlers::new(100, hooks);
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, provider, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    provider: ProviderApi,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let host = config.host.clone();
    let port = config.port;
    let provider = ProviderBridge(provider);
    let srv = HttpServer::new(move || {
        let flow_api = OrderFlowApi::new(db.clone(), producers.clone());
        let reconciler_api =
            ReconcilerApi::new(OrderFlowApi::new(db.clone(), producers.clone()), provider.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("sps::access_log"))
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(flow_api))
            .app_data(web::Data::new(reconciler_api))
            .service(health)
            .service(render_pix)
            .service(CheckoutRoute::<SqliteDatabase>::new())
            .service(PaymentWebhookRoute::<SqliteDatabase, ProviderBridge>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(UpdateOrderStatusRoute::<SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
