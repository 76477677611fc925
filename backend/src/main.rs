//! Smart Irrigation Platform - Backend Server
//!
//! Estimates the daily irrigation amount for a crop from its sowing date,
//! last watering and historical weather, and explains the recommendation.

use axum::{
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::{any::Any, net::SocketAddr, sync::Arc, time::Duration};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod external;
mod handlers;
mod routes;
mod services;

pub use config::Config;

use error::AppError;
use external::{Explainer, GeminiClient, LinearModel, Oracle, PlaceholderExplainer};
use services::{IrrigationService, WeatherService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub irrigation: Arc<IrrigationService>,
    pub explainer: Arc<dyn Explainer>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "irrigation_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    tracing::info!("Starting Smart Irrigation Server");
    tracing::info!("Environment: {}", config.environment);

    // Weather data and model are loaded once; both may be missing
    let weather = Arc::new(WeatherService::load(
        &config.weather.csv_path,
        config.weather.header_rows,
    ));

    let oracle: Option<Arc<dyn Oracle>> = match LinearModel::load(&config.model.path) {
        Ok(model) => {
            tracing::info!(
                "Model loaded from {} ({} features)",
                config.model.path.display(),
                model.n_features()
            );
            Some(Arc::new(model))
        }
        Err(e) => {
            tracing::error!("Model loading error: {:#}", e);
            None
        }
    };

    let explainer: Arc<dyn Explainer> = if config.explainer.is_enabled() {
        tracing::info!("Explanations via {}", config.explainer.model);
        Arc::new(GeminiClient::new(&config.explainer)?)
    } else {
        tracing::warn!("No explainer API key configured, explanations disabled");
        Arc::new(PlaceholderExplainer)
    };

    let irrigation = IrrigationService::new(
        weather,
        oracle,
        explainer.clone(),
        Duration::from_secs(config.explainer.timeout_secs),
    );

    // Create application state
    let state = AppState {
        irrigation: Arc::new(irrigation),
        explainer,
    };

    // Build application
    let app = create_app(state);

    // Start server
    let host: std::net::IpAddr = config
        .server
        .host
        .parse()
        .map_err(|e| AppError::Configuration(format!("Invalid server.host: {}", e)))?;
    let addr = SocketAddr::from((host, config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    Router::new()
        .route("/", get(handlers::service_info))
        .merge(routes::api_routes())
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Convert a handler panic into the generic internal error response
fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "unknown panic".to_string());

    AppError::Internal(detail).into_response()
}
