//! Route definitions for the textile production ledger

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/raw-materials", raw_material_routes())
        .nest("/production", production_routes())
        .nest("/finished-goods", finished_goods_routes())
        .nest("/transactions", transaction_routes())
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/invalidations", get(handlers::invalidation_stream))
}

/// Raw material stock routes
fn raw_material_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_raw_materials).post(handlers::create_raw_material),
        )
        .route(
            "/:id",
            get(handlers::get_raw_material)
                .put(handlers::update_raw_material)
                .delete(handlers::delete_raw_material),
        )
        .route("/:id/adjust", post(handlers::adjust_raw_material))
}

/// Production routes; records are append-only
fn production_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(handlers::list_production).post(handlers::create_production),
    )
}

/// Finished goods routes
fn finished_goods_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_finished_goods))
        .route("/upsert", post(handlers::upsert_finished_good))
        .route(
            "/:id",
            put(handlers::update_finished_good).delete(handlers::delete_finished_good),
        )
}

/// Cash ledger routes
fn transaction_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_transactions).post(handlers::create_transaction),
        )
        .route("/balance", get(handlers::get_balance))
        .route("/:id", delete(handlers::delete_transaction))
}
