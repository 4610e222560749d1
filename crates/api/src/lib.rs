//! HTTP and WebSocket surface for the order tracking system.
//!
//! Provides REST endpoints for orders, deliveries and notifications, a
//! WebSocket push stream, structured logging (tracing) and Prometheus
//! metrics.

pub mod config;
pub mod error;
pub mod routes;

pub use config::Config;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use storage::{
    DeliveryRepository, InMemoryDeliveryRepository, InMemoryNotificationRepository,
    InMemoryOrderRepository, NotificationRepository, OrderRepository,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// The application state wired over the in-memory repositories.
pub type DefaultAppState =
    AppState<InMemoryOrderRepository, InMemoryDeliveryRepository, InMemoryNotificationRepository>;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<O, D, N>(
    state: Arc<AppState<O, D, N>>,
    metrics_handle: PrometheusHandle,
) -> Router
where
    O: OrderRepository + Clone + 'static,
    D: DeliveryRepository + 'static,
    N: NotificationRepository + Clone + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::create::<O, D, N>))
        .route("/orders", get(routes::orders::list::<O, D, N>))
        .route(
            "/orders/by-number/{number}",
            get(routes::orders::get_by_number::<O, D, N>),
        )
        .route("/orders/{id}", get(routes::orders::get::<O, D, N>))
        .route("/orders/{id}/confirm", post(routes::orders::confirm::<O, D, N>))
        .route(
            "/orders/{id}/start-delivery",
            post(routes::orders::start_delivery::<O, D, N>),
        )
        .route("/orders/{id}/cancel", post(routes::orders::cancel::<O, D, N>))
        .route(
            "/orders/{id}/delivery",
            post(routes::deliveries::register::<O, D, N>),
        )
        .route(
            "/orders/{id}/delivery",
            get(routes::deliveries::get_for_order::<O, D, N>),
        )
        .route("/deliveries", get(routes::deliveries::list::<O, D, N>))
        .route("/notifications", get(routes::notifications::list::<O, D, N>))
        .route(
            "/notifications/unread-count",
            get(routes::notifications::unread_count::<O, D, N>),
        )
        .route(
            "/notifications/{id}/read",
            post(routes::notifications::mark_read::<O, D, N>),
        )
        .route(
            "/notifications/read-all",
            post(routes::notifications::mark_all_read::<O, D, N>),
        )
        .route("/ws", get(routes::ws::connect::<O, D, N>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state over fresh in-memory repositories.
pub fn create_default_state() -> Arc<DefaultAppState> {
    use app::{DeliveryService, Dispatcher, NotificationService, OrderService};
    use realtime::Hub;

    let hub = Arc::new(Hub::new());
    let orders = InMemoryOrderRepository::new();
    let deliveries = InMemoryDeliveryRepository::new();
    let notifications = InMemoryNotificationRepository::new();

    Arc::new(AppState {
        order_service: OrderService::new(
            orders.clone(),
            deliveries.clone(),
            notifications.clone(),
            hub.clone(),
        ),
        delivery_service: DeliveryService::new(
            orders.clone(),
            deliveries.clone(),
            notifications.clone(),
            hub.clone(),
        ),
        notification_service: NotificationService::new(
            orders.clone(),
            notifications.clone(),
            hub.clone(),
        ),
        dispatcher: Dispatcher::new(hub, orders, notifications),
    })
}
