//! services/api/src/web/books.rs
//!
//! CRUD endpoints for the home institution's own catalog under `/libros`.

use crate::web::{
    envelope::{BookEnvelope, BookListEnvelope, ErrorEnvelope, MessageEnvelope},
    error::HttpError,
    state::AppState,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use catalog_core::commands;
use catalog_core::domain::{BookPatch, NewBook};
use catalog_core::projection::BookView;
use std::sync::Arc;
use tracing::info;

async fn load_view(state: &AppState, id: &str) -> Result<BookView, HttpError> {
    let book = state
        .catalog
        .get_by_id(id)
        .await?
        .ok_or_else(|| HttpError::not_found(format!("Book '{}' not found", id)))?;
    Ok(BookView::from_internal(book, state.home_label()))
}

/// GET /libros - List every internal book
#[utoipa::path(
    get,
    path = "/libros",
    responses(
        (status = 200, description = "All internal books", body = BookListEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    ),
    tag = "books"
)]
pub async fn list_books_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BookListEnvelope>, HttpError> {
    let books = state.catalog.list_all().await?;
    let data = books
        .into_iter()
        .map(|book| BookView::from_internal(book, state.home_label()))
        .collect();
    Ok(Json(BookListEnvelope {
        success: true,
        data,
    }))
}

/// GET /libros/{id} - Fetch one internal book
#[utoipa::path(
    get,
    path = "/libros/{id}",
    params(("id" = String, Path, description = "Book id")),
    responses(
        (status = 200, description = "The book", body = BookEnvelope),
        (status = 404, description = "No book with that id", body = ErrorEnvelope)
    ),
    tag = "books"
)]
pub async fn get_book_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BookEnvelope>, HttpError> {
    let data = load_view(&state, &id).await?;
    Ok(Json(BookEnvelope {
        success: true,
        data,
    }))
}

/// POST /libros/guardar - Register a new internal book
///
/// Cover and PDF are expected as base64 payloads, optionally as data URLs.
#[utoipa::path(
    post,
    path = "/libros/guardar",
    request_body = NewBook,
    responses(
        (status = 201, description = "Book created", body = BookEnvelope),
        (status = 400, description = "Missing or malformed fields", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    ),
    tag = "books"
)]
pub async fn create_book_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewBook>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let Json(new_book) = payload?;
    let book = commands::create_book(state.catalog.as_ref(), new_book).await?;
    info!(book_id = %book.id, "Book created");

    let body = BookEnvelope {
        success: true,
        data: BookView::from_internal(book, state.home_label()),
    };
    Ok((StatusCode::CREATED, Json(body)))
}

/// PUT /libros/editar/{id} - Update some fields of an internal book
#[utoipa::path(
    put,
    path = "/libros/editar/{id}",
    params(("id" = String, Path, description = "Book id")),
    request_body = BookPatch,
    responses(
        (status = 200, description = "Updated book", body = BookEnvelope),
        (status = 400, description = "Empty or malformed update", body = ErrorEnvelope),
        (status = 404, description = "No book with that id", body = ErrorEnvelope)
    ),
    tag = "books"
)]
pub async fn update_book_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<BookPatch>, JsonRejection>,
) -> Result<Json<BookEnvelope>, HttpError> {
    let Json(patch) = payload?;
    if !commands::update_book(state.catalog.as_ref(), &id, patch).await? {
        return Err(HttpError::not_found(format!("Book '{}' not found", id)));
    }
    info!(book_id = %id, "Book updated");

    let data = load_view(&state, &id).await?;
    Ok(Json(BookEnvelope {
        success: true,
        data,
    }))
}

/// DELETE /libros/{id} - Remove an internal book
#[utoipa::path(
    delete,
    path = "/libros/{id}",
    params(("id" = String, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book deleted", body = MessageEnvelope),
        (status = 404, description = "No book with that id", body = ErrorEnvelope)
    ),
    tag = "books"
)]
pub async fn delete_book_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageEnvelope>, HttpError> {
    if !state.catalog.delete(&id).await? {
        return Err(HttpError::not_found(format!("Book '{}' not found", id)));
    }
    info!(book_id = %id, "Book deleted");
    Ok(Json(MessageEnvelope::ok("Book deleted")))
}
