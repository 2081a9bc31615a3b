use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;

/// Adds the health check and a permissive CORS layer (any origin, method and header).
pub fn app(router: Router) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(router)
        .layer(CorsLayer::permissive())
}
