//! REST API routes configuration

use crate::api::handlers::{self, ApiState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

/// Create the API router with all routes
pub fn create_router(state: ApiState) -> Router {
    // Configure CORS for browser access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Vault configuration
        .route("/api/vault", get(handlers::get_vault_info))
        .route("/api/vault/init", post(handlers::initialize_vault))
        // Transactions
        .route(
            "/api/transactions",
            get(handlers::list_transactions).post(handlers::propose_transaction),
        )
        .route("/api/transactions/{id}", get(handlers::get_transaction))
        .route(
            "/api/transactions/{id}/hash",
            get(handlers::get_signing_hash),
        )
        .route(
            "/api/transactions/{id}/signatures",
            post(handlers::submit_signature),
        )
        // Add state and middleware
        .with_state(state)
        .layer(cors)
}
