//! Bestseller shelf handler.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use bookmirror_core::BestsellerSection;
use serde::Serialize;

use super::{error_body, ErrorResponse};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct BestsellersResponse {
    pub sections: Vec<BestsellerSection>,
}

/// GET /api/v1/bestsellers
///
/// Cached bestseller collections, scraping the homepage on first use.
pub async fn get_bestsellers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BestsellersResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.bestsellers().get_bestsellers().await {
        Ok(sections) => Ok(Json(BestsellersResponse { sections })),
        Err(e) => Err((StatusCode::INTERNAL_SERVER_ERROR, error_body(e.to_string()))),
    }
}
