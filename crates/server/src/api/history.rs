//! Browsing history lookup handler.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use bookmirror_core::Product;
use serde::{Deserialize, Serialize};

use super::{error_body, ErrorResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HistoryRequest {
    #[serde(default)]
    pub ids: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub products: Vec<Product>,
}

/// POST /api/v1/history with body `{ "ids": ["1", "2"] }`
///
/// Stored records for the given ids, input order preserved; unknown or
/// non-numeric ids are omitted. A missing `ids` field is a client error.
pub async fn post_history(
    State(state): State<Arc<AppState>>,
    Json(body): Json<HistoryRequest>,
) -> Result<Json<HistoryResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Some(ids) = body.ids else {
        return Err((
            StatusCode::BAD_REQUEST,
            error_body("Missing required body field: ids"),
        ));
    };

    let numeric_ids: Vec<i64> = ids.iter().filter_map(|id| id.parse().ok()).collect();

    match state.store().products_by_ids(&numeric_ids) {
        Ok(products) => Ok(Json(HistoryResponse { products })),
        Err(e) => Err((StatusCode::INTERNAL_SERVER_ERROR, error_body(e.to_string()))),
    }
}
