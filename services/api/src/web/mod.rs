pub mod auth;
pub mod books;
pub mod envelope;
pub mod error;
pub mod rest;
pub mod search;
pub mod state;
pub mod users;

use crate::config::ConfigError;
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post, put},
    Router,
};
use rest::ApiDoc;
use state::AppState;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Base64 covers and PDFs travel inside JSON bodies.
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Builds the complete application: REST routes, Swagger UI and request tracing.
pub fn build_router(state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/", get(rest::index_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/usuarios", get(users::list_users_handler))
        .route("/usuarios/guardar", post(users::create_user_handler))
        .route("/usuarios/editar/{id}", put(users::update_user_handler))
        .route(
            "/usuarios/{id}",
            get(users::get_user_handler).delete(users::delete_user_handler),
        )
        .route("/libros", get(books::list_books_handler))
        .route("/libros/guardar", post(books::create_book_handler))
        .route("/libros/editar/{id}", put(books::update_book_handler))
        .route(
            "/libros/{id}",
            get(books::get_book_handler).delete(books::delete_book_handler),
        )
        .route("/buscar", get(search::search_handler))
        .route("/buscar/{idLibro}/{idUni}", get(search::find_book_handler))
        .fallback(rest::not_found_handler)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state);

    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
}

/// CORS policy for the browser front-end: a single origin when configured, any otherwise.
pub fn cors_layer(allowed_origin: Option<&str>) -> Result<CorsLayer, ConfigError> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    match allowed_origin {
        Some(origin) => {
            let origin = origin.parse::<HeaderValue>().map_err(|e| {
                ConfigError::InvalidValue("CORS_ALLOWED_ORIGIN".to_string(), e.to_string())
            })?;
            Ok(cors.allow_origin(origin).allow_credentials(true))
        }
        None => Ok(cors.allow_origin(Any)),
    }
}
