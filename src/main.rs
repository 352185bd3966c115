//! amparo-rides server entry point.
//!
//! Wires the store, pricing model, and session file into one workflow
//! controller and serves the REST API.

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use amparo_rides::api;
use amparo_rides::app_state::AppState;
use amparo_rides::config::AppConfig;
use amparo_rides::persistence::seed::initial_drivers;
use amparo_rides::persistence::{MemoryStore, PersistenceGateway, PostgresStore, RideStore};
use amparo_rides::service::{
    GenerativePricingModel, JsonFileStore, PricingClient, SessionStore, WorkflowController,
    WorkflowSettings,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = AppConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, city = %config.city_name, "starting amparo-rides");

    // Build persistence layer
    let store: Arc<dyn RideStore> = if config.persistence_enabled {
        Arc::new(PostgresStore::connect(&config).await?)
    } else {
        tracing::warn!("persistence disabled; using in-memory store");
        Arc::new(MemoryStore::with_drivers(&initial_drivers()))
    };

    // Build service layer
    if config.pricing.api_key.is_none() {
        tracing::warn!("PRICING_API_KEY not set; non-fixed fares use the fallback estimate");
    }
    let model = GenerativePricingModel::new(config.pricing.clone(), config.city_name.clone())?;
    let sessions = SessionStore::new(Box::new(JsonFileStore::new(config.session_file.clone())));
    let controller = Arc::new(WorkflowController::new(
        PersistenceGateway::new(store),
        PricingClient::new(Arc::new(model)),
        sessions,
        WorkflowSettings {
            confirmation_delay: config.confirmation_delay,
            city_name: config.city_name.clone(),
        },
    ));
    controller.startup().await;

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .with_state(AppState::new(controller));

    #[cfg(feature = "swagger-ui")]
    let app = {
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        app.merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", api::openapi::ApiDoc::openapi()),
        )
    };

    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
