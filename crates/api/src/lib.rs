//! # Ulendo API
//!
//! The HTTP server of the booking platform: schedule search, seat booking,
//! QR tickets and conductor validation.
//!
//! ## Architecture
//!
//! - **Routes**: define API endpoints and URL structure
//! - **Handlers**: implement request processing
//! - **Middleware**: authentication, role guards and error mapping
//! - **Config**: environment configuration
//!
//! Handlers talk to storage through [`ulendo_db::TicketStore`], which owns
//! the seat and single-use ticket invariants.

/// Configuration module for API settings
pub mod config;
/// Request handlers that implement business logic
pub mod handlers;
/// Middleware for authentication and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
};
use eyre::Result;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;
use ulendo_db::TicketStore;

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    /// Persistence for users, sessions, schedules and bookings
    pub store: Arc<dyn TicketStore>,
    /// Lifetime of sessions issued at login
    pub session_ttl: chrono::Duration,
}

impl ApiState {
    pub fn new(store: Arc<dyn TicketStore>, session_ttl: chrono::Duration) -> Self {
        Self { store, session_ttl }
    }
}

/// All endpoints, mounted under `/api`, without transport layers.
pub fn build_router(state: Arc<ApiState>) -> Router {
    let api = Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Login, registration and session endpoints
        .merge(routes::auth::routes())
        // Schedule search and management endpoints
        .merge(routes::schedule::routes())
        // Booking, ticket and scan endpoints
        .merge(routes::booking::routes());

    Router::new().nest("/api", api).with_state(state)
}

/// Router with CORS, tracing and timeout layers applied.
pub fn build_app(config: &config::ApiConfig, state: Arc<ApiState>) -> Router {
    let app = build_router(state);

    // Apply CORS configuration if origins are specified
    let app = match &config.cors_origins {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!("Ignoring invalid CORS origin: {}", origin);
                        None
                    }
                })
                .collect();

            let cors = CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
                .allow_origin(origins)
                .allow_credentials(true);

            app.layer(cors)
        }
        None => app,
    };

    app.layer(TraceLayer::new_for_http()).layer(
        tower::ServiceBuilder::new()
            .layer(axum::error_handling::HandleErrorLayer::new(
                handlers::handle_timeout,
            ))
            .timeout(Duration::from_secs(config.request_timeout))
            .into_inner(),
    )
}

/// Starts the API server with the provided configuration and store
///
/// # Example
///
/// ```rust,no_run
/// # async fn run() -> eyre::Result<()> {
/// use std::sync::Arc;
/// use ulendo_api::{config::ApiConfig, start_server};
/// use ulendo_db::MemoryStore;
///
/// let config = ApiConfig::from_env()?;
/// start_server(config, Arc::new(MemoryStore::new())).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_server(config: config::ApiConfig, store: Arc<dyn TicketStore>) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if config.database_url.is_none() {
        warn!("DATABASE_URL is not set; bookings are kept in memory and lost on restart");
    }

    let state = Arc::new(ApiState::new(
        store,
        chrono::Duration::hours(config.session_ttl_hours),
    ));
    let app = build_app(&config, state);

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
