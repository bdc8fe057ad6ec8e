use aggregation::AggregationEngine;
use axum::{routing::get, routing::post, Router};
use configuration::Settings;
use core_types::RecordSet;
use dataset::StateBoundaries;
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod cache;
pub mod error;
pub mod handlers;

use cache::ViewCache;

/// The shared application state that all handlers can access.
///
/// The record set is read-only between loads; the lock exists only so the
/// reload endpoint can swap in a freshly loaded set, which also invalidates
/// the view cache.
pub struct AppState {
    pub record_set: RwLock<RecordSet>,
    pub boundaries: StateBoundaries,
    pub engine: AggregationEngine,
    pub cache: ViewCache,
    pub settings: Settings,
}

/// The main function to configure and run the web server.
///
/// Loads the sales export and boundary GeoJSON named in the settings, then
/// serves one JSON endpoint per derived view.
pub async fn run_server(addr: SocketAddr, settings: Settings) -> anyhow::Result<()> {
    let record_set = dataset::load_csv(&settings.dataset.orders_path)?;
    let boundaries = StateBoundaries::load(&settings.dataset.boundaries_path)?;

    let app_state = Arc::new(AppState {
        record_set: RwLock::new(record_set),
        boundaries,
        engine: AggregationEngine::new(),
        cache: ViewCache::new(),
        settings,
    });

    let app = router(app_state);

    tracing::info!("Dashboard API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the application router; split out so tests can drive the handlers
/// without binding a socket.
pub fn router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/summary", get(handlers::get_summary))
        .route("/api/views/daily-orders", get(handlers::get_daily_orders))
        .route("/api/views/category-ratings", get(handlers::get_category_ratings))
        .route("/api/views/category-volume", get(handlers::get_category_volume))
        .route("/api/views/state-ratings", get(handlers::get_state_ratings))
        .route("/api/views/state-revenue", get(handlers::get_state_revenue))
        .route("/api/views/payment-mix", get(handlers::get_payment_mix))
        .route("/api/views/customer-states", get(handlers::get_customer_states))
        .route("/api/views/customer-map", get(handlers::get_customer_map))
        .route("/api/reload", post(handlers::reload_dataset))
        .with_state(app_state)
        .layer(cors)
        // This middleware logs information about every incoming request.
        .layer(TraceLayer::new_for_http())
}
