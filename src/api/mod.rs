//! REST API module
//!
//! Exposes the vault to dashboards and other collaborators over HTTP.
//!
//! # Endpoints
//!
//! ## Vault
//! - `GET /api/vault` - Signers, threshold and counters
//! - `POST /api/vault/init` - One-time initialization
//!
//! ## Transactions
//! - `GET /api/transactions` - List transactions
//! - `POST /api/transactions` - Propose a transaction
//! - `GET /api/transactions/{id}` - Get transaction with authorization progress
//! - `GET /api/transactions/{id}/hash?caller=` - Digest to sign
//! - `POST /api/transactions/{id}/signatures` - Submit a signature
//!
//! Errors are returned as `{ "error": ..., "code": ... }` where `code` is the
//! stable vault error code.

pub mod handlers;
pub mod routes;

pub use handlers::ApiState;
pub use routes::create_router;
