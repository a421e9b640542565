//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, HttpPartnerAdapter},
    config::{load_partners, Config},
    error::ApiError,
    web::{build_router, cors_layer, state::AppState},
};
use catalog_core::aggregation::AggregationService;
use catalog_core::ports::{CatalogStore, ExternalBookSource, UserStore};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Partner Adapters ---
    let http_client = reqwest::Client::builder()
        .user_agent(concat!("catalog-api/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let mut sources: Vec<Arc<dyn ExternalBookSource>> = Vec::new();
    for partner in load_partners(&config.partners_path)? {
        let adapter =
            HttpPartnerAdapter::new(http_client.clone(), partner, config.partner_timeout)?;
        info!(key = adapter.key(), label = adapter.label(), "Partner catalog registered");
        sources.push(Arc::new(adapter));
    }
    info!("{} partner catalog(s) configured", sources.len());

    // --- 4. Build the Shared AppState ---
    let catalog: Arc<dyn CatalogStore> = db_adapter.clone();
    let users: Arc<dyn UserStore> = db_adapter;
    let search = Arc::new(AggregationService::new(
        catalog.clone(),
        sources,
        config.home_institution.clone(),
    ));
    let app_state = Arc::new(AppState {
        catalog,
        users,
        search,
    });

    // --- 5. Create the Web Router ---
    let app = build_router(app_state).layer(cors_layer(config.cors_allowed_origin.as_deref())?);

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
