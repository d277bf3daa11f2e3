use std::sync::Arc;

use crate::config::ServerConfig;
use crate::wallet::WalletApi;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: datapace_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Client for the external wallet system (trait object so tests can
    /// substitute a stub).
    pub wallet: Arc<dyn WalletApi>,
}
