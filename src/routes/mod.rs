//! Route definitions for the dashboard API.

pub mod chat;
pub mod dashboard;
pub mod health;

use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Assemble the full application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .route("/api/dashboard/summary", get(dashboard::summary))
        .route("/api/dashboard/sales", get(dashboard::sales))
        .route("/api/dashboard/inventory", get(dashboard::inventory))
        .route("/api/dashboard/shortage", get(dashboard::shortage))
        .route("/api/chat/text-to-sql", post(chat::text_to_sql))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}
