//! services/api/src/web/rest.rs
//!
//! Contains the service banner and fallback handlers and the master definition
//! for the OpenAPI specification.

use crate::web::{auth, books, envelope, error::HttpError, search, users};
use axum::http::StatusCode;
use catalog_core::aggregation::SearchStats;
use catalog_core::domain::{BookPatch, NewBook, NewUser, Role, UserPatch};
use catalog_core::projection::{BookView, UserView};
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login_handler,
        auth::logout_handler,
        users::list_users_handler,
        users::get_user_handler,
        users::create_user_handler,
        users::update_user_handler,
        users::delete_user_handler,
        books::list_books_handler,
        books::get_book_handler,
        books::create_book_handler,
        books::update_book_handler,
        books::delete_book_handler,
        search::search_handler,
        search::find_book_handler,
    ),
    components(
        schemas(
            auth::LoginRequest,
            NewBook,
            BookPatch,
            NewUser,
            UserPatch,
            Role,
            BookView,
            UserView,
            SearchStats,
            envelope::BookEnvelope,
            envelope::BookListEnvelope,
            envelope::SearchEnvelope,
            envelope::UserEnvelope,
            envelope::UserListEnvelope,
            envelope::MessageEnvelope,
            envelope::ErrorEnvelope,
        )
    ),
    tags(
        (name = "auth", description = "Credential checks."),
        (name = "users", description = "Library account management."),
        (name = "books", description = "The home institution's own catalog."),
        (name = "search", description = "Search across the home catalog and every partner catalog.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Banner and Fallback
//=========================================================================================

/// GET / - Liveness banner
pub async fn index_handler() -> &'static str {
    "Catalog aggregation API is running"
}

pub async fn not_found_handler() -> HttpError {
    HttpError::new(StatusCode::NOT_FOUND, "Route not found")
}
