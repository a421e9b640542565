//! End-to-end tests of the REST surface: the full router backed by in-memory
//! stores and partner adapters talking HTTP to a local fake partner.

use api_lib::{
    adapters::HttpPartnerAdapter,
    config::parse_partners,
    web::{build_router, state::AppState},
};
use axum::{
    body::Body,
    extract::{Path, Query},
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use catalog_core::domain::Book;
use catalog_core::memory::{InMemoryCatalogStore, InMemoryUserStore};
use catalog_core::{AggregationService, CatalogStore, ExternalBookSource, UserStore};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::ServiceExt;

const HOME: &str = "Biblioteca Universidad Gustambo";
const COVER: &str = "iVBORw0KGgo=";
const PDF: &str = "data:application/pdf;base64,JVBERi0xLjQ=";

//=========================================================================================
// Fake Partner
//=========================================================================================

fn partner_catalog() -> Vec<Value> {
    vec![
        json!({
            "id": 7,
            "titulo": "Pedro Páramo",
            "portadaBase64": COVER,
            "pdfUrl": "https://pdf.example/7.pdf",
            "generoLiterario": "Novela",
            "fechaPublicacion": "1955-03-19"
        }),
        json!({
            "uuid": "b-2",
            "title": "Rayuela",
            "universidadPropietaria": "UTL"
        }),
    ]
}

async fn partner_search(Query(params): Query<HashMap<String, String>>) -> Json<Vec<Value>> {
    let needle = params.get("q").cloned().unwrap_or_default().to_lowercase();
    let hits = partner_catalog()
        .into_iter()
        .filter(|b| {
            b.get("titulo")
                .or_else(|| b.get("title"))
                .and_then(Value::as_str)
                .map(|t| t.to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
        .collect();
    Json(hits)
}

async fn partner_item(Path(id): Path<String>) -> impl IntoResponse {
    let found = partner_catalog()
        .into_iter()
        .find(|b| b["id"].to_string() == id || b["uuid"] == id.as_str());
    match found {
        Some(book) => Json(book).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn spawn_partner() -> String {
    let app = Router::new()
        .route("/libros", get(partner_search))
        .route("/libros/{id}", get(partner_item))
        .route("/broken", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(1500)).await;
                Json(partner_catalog())
            }),
        );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", address)
}

fn partners_toml(base: &str) -> String {
    format!(
        r#"
[[partner]]
key = "utl"
label = "Universidad Tecnológica de León"
aliases = ["UTL"]
search_url = "{base}/libros"
item_url = "{base}/libros"
fallback_author = "UTL"

[partner.fields]
id = ["id", "uuid"]
title = ["titulo", "title"]
cover_image = ["portadaBase64", "portadaUrl"]
pdf_document = ["pdfBase64", "pdfUrl"]
author = ["universidadPropietaria"]
genre = ["generoLiterario"]
publish_date = ["fechaPublicacion"]

[[partner]]
key = "unam"
label = "Universidad Nacional Autónoma de México"
search_url = "{base}/broken"

[[partner]]
key = "oxford"
label = "Oxford University"
search_url = "{base}/slow"
timeout_ms = 200
"#
    )
}

//=========================================================================================
// Harness
//=========================================================================================

struct TestApp {
    router: Router,
    catalog: Arc<InMemoryCatalogStore>,
}

fn home_book(id: &str, title: &str) -> Book {
    Book {
        id: id.to_string(),
        title: title.to_string(),
        cover_image: COVER.to_string(),
        pdf_document: PDF.to_string(),
        author: "Julio Cortázar".to_string(),
        genre: "Novela".to_string(),
        description: String::new(),
        publish_date: "1963-06-28".to_string(),
    }
}

async fn test_app() -> TestApp {
    let base = spawn_partner().await;
    let client = reqwest::Client::new();
    let sources: Vec<Arc<dyn ExternalBookSource>> = parse_partners(&partners_toml(&base), "test")
        .unwrap()
        .into_iter()
        .map(|config| {
            let adapter =
                HttpPartnerAdapter::new(client.clone(), config, Duration::from_secs(2)).unwrap();
            Arc::new(adapter) as Arc<dyn ExternalBookSource>
        })
        .collect();

    let catalog = Arc::new(InMemoryCatalogStore::with_books(vec![home_book(
        "home-1", "Rayuela",
    )]));
    let catalog_port: Arc<dyn CatalogStore> = catalog.clone();
    let users: Arc<dyn UserStore> = Arc::new(InMemoryUserStore::default());
    let search = Arc::new(AggregationService::new(catalog_port.clone(), sources, HOME));
    let state = Arc::new(AppState {
        catalog: catalog_port,
        users,
        search,
    });

    TestApp {
        router: build_router(state),
        catalog,
    }
}

async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<String>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(text) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(text)
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    send_raw(app, method, uri, body.map(|json| json.to_string())).await
}

fn titles(body: &Value) -> Vec<&str> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap())
        .collect()
}

//=========================================================================================
// Search
//=========================================================================================

#[tokio::test]
async fn search_merges_home_and_partner_results_in_configuration_order() {
    let app = test_app().await;

    let (status, body) = send(&app.router, Method::GET, "/buscar?q=", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(titles(&body), vec!["Rayuela", "Pedro Páramo", "Rayuela"]);
    assert_eq!(
        body["stats"],
        json!({ "internos": 1, "externos": { "oxford": 0, "unam": 0, "utl": 2 }, "total": 3 })
    );

    let data = body["data"].as_array().unwrap();
    assert_eq!(data[0]["id"], "home-1");
    assert_eq!(data[0]["originLabel"], HOME);
    assert_eq!(data[1]["id"], "Universidad Tecnológica de León-7");
    assert_eq!(data[1]["coverUrl"], COVER);
    assert_eq!(data[1]["author"], "UTL");
    assert_eq!(data[1]["description"], "Novela");
    assert_eq!(data[2]["author"], "UTL");
}

#[tokio::test]
async fn search_filters_by_title_fragment() {
    let app = test_app().await;

    let (status, body) = send(&app.router, Method::GET, "/buscar?q=p%C3%A1ramo", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["Pedro Páramo"]);
    assert_eq!(body["stats"]["internos"], 0);
    assert_eq!(body["stats"]["total"], 1);
}

#[tokio::test]
async fn slow_partner_is_bounded_by_its_timeout() {
    let app = test_app().await;

    let started = Instant::now();
    let (status, body) = send(&app.router, Method::GET, "/buscar?q=rayuela", None).await;
    let elapsed = started.elapsed();

    assert_eq!(status, StatusCode::OK);
    assert!(elapsed < Duration::from_millis(1200), "search took {:?}", elapsed);
    assert_eq!(body["stats"]["externos"]["oxford"], 0);
    assert_eq!(body["stats"]["total"], 2);
}

#[tokio::test]
async fn single_record_is_routed_by_origin() {
    let app = test_app().await;

    let (status, body) = send(&app.router, Method::GET, "/buscar/7/utl", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Pedro Páramo");
    assert_eq!(body["data"]["originLabel"], "Universidad Tecnológica de León");

    let (status, body) = send(&app.router, Method::GET, "/buscar/home-1/interno", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], "home-1");

    let (status, body) = send(&app.router, Method::GET, "/buscar/404/UTL", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app.router, Method::GET, "/buscar/%20/utl", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app.router, Method::GET, "/buscar/1/harvard", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("harvard"));
}

//=========================================================================================
// Books
//=========================================================================================

#[tokio::test]
async fn book_lifecycle() {
    let app = test_app().await;

    let new_book = json!({
        "title": "Ficciones",
        "author": "Jorge Luis Borges",
        "coverImage": COVER,
        "pdfDocument": PDF,
        "genre": "Cuento"
    });
    let (status, body) =
        send(&app.router, Method::POST, "/libros/guardar", Some(new_book)).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["originLabel"], HOME);
    assert_eq!(body["data"]["publishDate"].as_str().unwrap().len(), 10);
    assert_eq!(app.catalog.list_all().await.unwrap().len(), 2);

    let (status, body) = send(
        &app.router,
        Method::PUT,
        &format!("/libros/editar/{}", id),
        Some(json!({ "description": "Colección de cuentos" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["description"], "Colección de cuentos");
    assert_eq!(body["data"]["title"], "Ficciones");

    let (status, body) = send(&app.router, Method::GET, &format!("/libros/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["author"], "Jorge Luis Borges");

    let (status, _) = send(&app.router, Method::DELETE, &format!("/libros/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app.router, Method::DELETE, &format!("/libros/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn book_input_errors_are_client_errors() {
    let app = test_app().await;

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/libros/guardar",
        Some(json!({ "title": "Sin autor", "coverImage": COVER, "pdfDocument": PDF })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        &app.router,
        Method::POST,
        "/libros/guardar",
        Some(json!({ "title": "T", "author": "A", "coverImage": "not base64!", "pdfDocument": PDF })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_raw(
        &app.router,
        Method::POST,
        "/libros/guardar",
        Some("{ not json".to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app.router, Method::PUT, "/libros/editar/home-1", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app.router,
        Method::PUT,
        "/libros/editar/missing",
        Some(json!({ "title": "Nuevo" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app.router, Method::GET, "/libros/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

//=========================================================================================
// Users and Auth
//=========================================================================================

#[tokio::test]
async fn user_registration_and_login() {
    let app = test_app().await;

    let new_user = json!({
        "nombre": "Ana López",
        "email": "Ana@Example.com",
        "rol": "alumno",
        "password": "s3cret"
    });
    let (status, body) =
        send(&app.router, Method::POST, "/usuarios/guardar", Some(new_user.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["email"], "ana@example.com");
    assert_eq!(body["data"]["role"], "student");
    assert!(body["data"].get("password_hash").is_none());
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app.router, Method::POST, "/usuarios/guardar", Some(new_user)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/auth/login",
        Some(json!({ "email": "ana@example.com", "password": "s3cret" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id.as_str());

    let (status, _) = send(
        &app.router,
        Method::POST,
        "/auth/login",
        Some(json!({ "email": "ana@example.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app.router,
        Method::POST,
        "/auth/login",
        Some(json!({ "email": "ana@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app.router, Method::POST, "/auth/logout", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = send(
        &app.router,
        Method::PUT,
        &format!("/usuarios/editar/{}", id),
        Some(json!({ "role": "librarian" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "librarian");

    let (status, body) = send(&app.router, Method::GET, "/usuarios", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app.router, Method::DELETE, &format!("/usuarios/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app.router, Method::GET, &format!("/usuarios/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn user_input_errors_are_client_errors() {
    let app = test_app().await;

    let (status, _) = send(
        &app.router,
        Method::POST,
        "/usuarios/guardar",
        Some(json!({ "name": "Sin correo", "role": "student", "password": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app.router,
        Method::POST,
        "/usuarios/guardar",
        Some(json!({ "name": "N", "email": "no-at-sign", "role": "student", "password": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app.router,
        Method::PUT,
        "/usuarios/editar/missing",
        Some(json!({ "name": "Nadie" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

//=========================================================================================
// Misc
//=========================================================================================

#[tokio::test]
async fn unknown_routes_get_a_json_404() {
    let app = test_app().await;

    let (status, body) = send(&app.router, Method::GET, "/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, body) = send(&app.router, Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"].get("/buscar").is_some());
}
