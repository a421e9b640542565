//! services/api/src/web/search.rs
//!
//! Cross-institution search endpoints under `/buscar`.

use crate::web::{
    envelope::{BookEnvelope, ErrorEnvelope, SearchEnvelope},
    error::HttpError,
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Title fragment; empty or missing lists every source in full.
    pub q: Option<String>,
}

/// GET /buscar - Search the home catalog and every partner at once
#[utoipa::path(
    get,
    path = "/buscar",
    params(SearchQuery),
    responses(
        (status = 200, description = "Aggregated results with per-source counts", body = SearchEnvelope),
        (status = 500, description = "No source could answer", body = ErrorEnvelope)
    ),
    tag = "search"
)]
pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchEnvelope>, HttpError> {
    let query = params.q.unwrap_or_default();
    let results = state.search.search(&query).await?;
    Ok(Json(SearchEnvelope {
        success: true,
        data: results.books,
        stats: results.stats,
    }))
}

/// GET /buscar/{idLibro}/{idUni} - Fetch one record from the institution that owns it
///
/// `idUni` is `interno`, the home institution's name, or a partner key, label or alias.
#[utoipa::path(
    get,
    path = "/buscar/{idLibro}/{idUni}",
    params(
        ("idLibro" = String, Path, description = "Raw book id at its origin"),
        ("idUni" = String, Path, description = "Origin institution")
    ),
    responses(
        (status = 200, description = "The book", body = BookEnvelope),
        (status = 400, description = "Unrecognized institution", body = ErrorEnvelope),
        (status = 404, description = "Book not found at that institution", body = ErrorEnvelope)
    ),
    tag = "search"
)]
pub async fn find_book_handler(
    State(state): State<Arc<AppState>>,
    Path((book_id, origin)): Path<(String, String)>,
) -> Result<Json<BookEnvelope>, HttpError> {
    let data = state.search.find_book(&book_id, &origin).await?;
    Ok(Json(BookEnvelope {
        success: true,
        data,
    }))
}
