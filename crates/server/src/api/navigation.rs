//! Navigation tree handler.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use bookmirror_core::Category;
use serde::Serialize;

use super::{error_body, ErrorResponse};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct NavigationResponse {
    pub categories: Vec<Category>,
}

/// GET /api/v1/navigation
///
/// The stored root tree with children; an empty cache triggers a live sync.
pub async fn get_navigation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<NavigationResponse>, (StatusCode, Json<ErrorResponse>)> {
    let categories = match state.store().root_tree() {
        Ok(tree) if !tree.is_empty() => tree,
        Ok(_) => match state.navigation().sync().await {
            Ok(tree) => tree,
            Err(e) => {
                return Err((StatusCode::INTERNAL_SERVER_ERROR, error_body(e.to_string())))
            }
        },
        Err(e) => return Err((StatusCode::INTERNAL_SERVER_ERROR, error_body(e.to_string()))),
    };

    Ok(Json(NavigationResponse { categories }))
}
