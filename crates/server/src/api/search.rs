//! Product search + enrichment handler.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use bookmirror_core::ProductDetails;
use serde::{Deserialize, Serialize};

use super::{error_body, ErrorResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    /// `null` when no product matched the query.
    pub result: Option<ProductDetails>,
}

/// GET /api/v1/search?q=
///
/// Cached detail record when one exists, live search-and-scrape otherwise.
/// A missing or blank `q` is a client error before any core operation runs.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, Json<ErrorResponse>)> {
    let query = params.q.as_deref().unwrap_or("").trim().to_string();
    if query.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            error_body("Missing required query parameter: q"),
        ));
    }

    match state.enricher().search_and_scrape(&query).await {
        Ok(result) => Ok(Json(SearchResponse { query, result })),
        Err(e) => Err((StatusCode::INTERNAL_SERVER_ERROR, error_body(e.to_string()))),
    }
}
