//! Category listing handler.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use bookmirror_core::Product;
use serde::{Deserialize, Serialize};

use super::{error_body, ErrorResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CategoryParams {
    #[serde(default, rename = "loadMore")]
    pub load_more: bool,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub slug: String,
    pub products: Vec<Product>,
    pub total: usize,
}

/// GET /api/v1/category/{slug}?loadMore=
///
/// Stored products for the category; a cache miss (or explicit load-more)
/// crawls exactly one listing page first. An unknown slug is an empty
/// result, not an error.
pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(params): Query<CategoryParams>,
) -> Result<Json<CategoryResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.crawler().fetch_category(&slug, params.load_more).await {
        Ok(products) => {
            let total = products.len();
            Ok(Json(CategoryResponse {
                slug,
                products,
                total,
            }))
        }
        Err(e) => Err((StatusCode::INTERNAL_SERVER_ERROR, error_body(e.to_string()))),
    }
}
