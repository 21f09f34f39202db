//! Textile Production Ledger - Backend
//!
//! Raw material stock, production runs, finished goods and a cash ledger
//! for a small textile workshop, served over HTTP.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod invalidation;
pub mod routes;
pub mod services;
pub mod store;

pub use config::Config;
pub use invalidation::{Collection, Invalidations};
pub use store::Store;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<Config>,
    pub invalidations: Invalidations,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        let invalidations = Invalidations::new(config.invalidation.channel_capacity);
        Self {
            store,
            config: Arc::new(config),
            invalidations,
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Textile Production Ledger API v1"
}
