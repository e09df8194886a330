use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{bestsellers, category, handlers, history, navigation, search};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Catalog mirror
        .route("/navigation", get(navigation::get_navigation))
        .route("/bestsellers", get(bestsellers::get_bestsellers))
        .route("/search", get(search::search))
        .route("/category/{slug}", get(category::get_category))
        .route("/history", post(history::post_history))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
}
