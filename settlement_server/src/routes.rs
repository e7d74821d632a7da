//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. For this reason, any long, non-cpu-bound operation (e.g. I/O,
//! database operations, etc.) should be expressed as futures or asynchronous functions. Async handlers get executed
//! concurrently by worker threads and thus don't block execution.
use actix_web::{get, post, web, HttpResponse, Responder};
use log::*;
use settlement_engine::{
    db_types::{OrderId, PaymentNotification},
    pix::{self, PixCode},
    OrderFlowApi,
    PaymentProvider,
    ReconcileOutcome,
    ReconcilerApi,
    SettlementDatabase,
};

use crate::{
    config::ServerConfig,
    data_objects::{
        CheckoutRequest,
        CheckoutResponse,
        JsonResponse,
        OrderView,
        PixRequest,
        PixResponse,
        StatusUpdateRequest,
        WebhookBody,
        WebhookQuery,
    },
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Webhook  ----------------------------------------------------
route!(payment_webhook => Post "/webhook/payment" impl SettlementDatabase, PaymentProvider);
/// Route handler for provider payment notifications.
///
/// The notification's payment id is the only input taken from the request; everything acted upon is fetched from
/// the provider afterwards. Response codes follow the provider's redelivery contract: anything unfixable is
/// acknowledged with a 200 (plus a failure body for the logs), while transient conditions answer 503 so the
/// provider redelivers the notification later.
pub async fn payment_webhook<B, P>(
    query: web::Query<WebhookQuery>,
    body: Option<web::Json<WebhookBody>>,
    api: web::Data<ReconcilerApi<B, P>>,
) -> HttpResponse
where
    B: SettlementDatabase,
    P: PaymentProvider,
{
    let query = query.into_inner();
    let body = body.map(web::Json::into_inner).unwrap_or_default();
    let topic = query
        .topic()
        .map(String::from)
        .or_else(|| body.notification_type.clone())
        .or_else(|| body.action.clone())
        .unwrap_or_default();
    if !topic.starts_with("payment") {
        debug!("📬️ Ignoring webhook notification with topic '{topic}'");
        return HttpResponse::Ok().json(JsonResponse::success(format!("Notification topic {topic} ignored.")));
    }
    let provider_id = query.id.clone().or_else(|| body.payment_id());
    let notification = PaymentNotification {
        provider_topic: topic,
        provider_id,
        external_reference: body.external_reference.clone(),
    };
    match api.reconcile(notification).await {
        Ok(ReconcileOutcome::Transitioned(order)) => {
            info!("📬️ Webhook settled. Order {} is now {}.", order.order_id, order.status);
            HttpResponse::Ok().json(JsonResponse::success(format!("Order is now {}.", order.status)))
        },
        Ok(ReconcileOutcome::Duplicate(order)) => {
            info!("📬️ Webhook redelivery for order {} absorbed.", order.order_id);
            HttpResponse::Ok().json(JsonResponse::success("Payment already reconciled."))
        },
        Ok(ReconcileOutcome::NoAction(order)) => {
            debug!("📬️ Webhook required no action. Order {} stays {}.", order.order_id, order.status);
            HttpResponse::Ok().json(JsonResponse::success("No action required."))
        },
        Err(e) if e.is_retryable() => {
            warn!("📬️ Webhook could not be processed right now. Asking the provider to redeliver. {e}");
            HttpResponse::ServiceUnavailable().json(JsonResponse::failure(e))
        },
        Err(e) => {
            warn!("📬️ Webhook was acknowledged but could not be reconciled. {e}");
            HttpResponse::Ok().json(JsonResponse::failure(e))
        },
    }
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(checkout => Post "/checkout" impl SettlementDatabase);
/// Route handler for the checkout endpoint.
///
/// Prices every line item from its snapshot, applies the configured commission policy, and creates the order with
/// its items in a single transaction. Clients never supply fee figures. For online payments the response carries
/// the rendered Pix payload for the order total.
pub async fn checkout<B: SettlementDatabase>(
    body: web::Json<CheckoutRequest>,
    api: web::Data<OrderFlowApi<B>>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    debug!("💻️ POST checkout with {} items via {}", request.items.len(), request.payment_method);
    let order = api
        .place_order(
            request.items,
            request.customer_contact,
            request.delivery_address,
            request.payment_method,
            request.change_for,
            &config.commission_policy,
        )
        .await?;
    let pix_payload = if order.payment_method.is_online() {
        let payload =
            PixCode::new(config.merchant.pix_key.as_str(), config.merchant.name.as_str(), config.merchant.city.as_str())
            .with_amount(order.total_amount)
            .with_reference(order.order_id.as_str())
            .encode()
            .map_err(|e| ServerError::ConfigurationError(e.to_string()))?;
        Some(payload)
    } else {
        None
    };
    let response = CheckoutResponse { order: OrderView::from(order), pix_payload };
    Ok(HttpResponse::Ok().json(response))
}

//----------------------------------------------   Pix  ----------------------------------------------------
/// Renders a Pix "copia e cola" payload. Omitted fields fall back to the configured merchant identity.
#[post("/pix")]
pub async fn render_pix(body: web::Json<PixRequest>, config: web::Data<ServerConfig>) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    let mut code = PixCode::new(
        request.key.unwrap_or_else(|| config.merchant.pix_key.clone()),
        request.name.unwrap_or_else(|| config.merchant.name.clone()),
        request.city.unwrap_or_else(|| config.merchant.city.clone()),
    );
    if let Some(amount) = request.amount {
        code = code.with_amount(amount);
    }
    if let Some(reference) = request.reference {
        code = code.with_reference(reference);
    }
    let payload = code.encode().map_err(|e| ServerError::InvalidRequestBody(e.to_string()))?;
    debug_assert!(pix::validate_checksum(&payload));
    Ok(HttpResponse::Ok().json(PixResponse { payload }))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(order_by_id => Get "/order/{order_id}" impl SettlementDatabase);
pub async fn order_by_id<B: SettlementDatabase>(
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = OrderId::from(path.into_inner());
    debug!("💻️ GET order {order_id}");
    let order = api.fetch_order(&order_id).await?;
    Ok(HttpResponse::Ok().json(OrderView::from(order)))
}

route!(update_order_status => Post "/order/{order_id}/status" impl SettlementDatabase);
/// Route handler for the staff status endpoint.
///
/// The caller names the state it wants the order in; the lifecycle rules decide whether the move is legal from the
/// order's current state. An illegal move answers 409 and an unknown order 404.
pub async fn update_order_status<B: SettlementDatabase>(
    path: web::Path<String>,
    body: web::Json<StatusUpdateRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = OrderId::from(path.into_inner());
    let request = body.into_inner();
    info!(
        "💻️ POST order {order_id} to {}{}",
        request.target,
        request.reason.as_deref().map(|r| format!(" ({r})")).unwrap_or_default()
    );
    let order = api.staff_transition(&order_id, request.target).await?;
    Ok(HttpResponse::Ok().json(OrderView::from(order)))
}
