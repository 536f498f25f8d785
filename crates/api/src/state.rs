use std::sync::Arc;

use gactif_core::lifecycle::AssetLifecycle;
use gactif_core::store::Store;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Storage backend; reads for services and health go straight here.
    pub store: Arc<dyn Store>,
    /// The only path through which assets are mutated.
    pub lifecycle: Arc<AssetLifecycle>,
    /// Present when running against PostgreSQL, for health checks.
    pub pool: Option<gactif_db::DbPool>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Wire the lifecycle manager over `store` using the configured policy.
    pub fn new(
        store: Arc<dyn Store>,
        pool: Option<gactif_db::DbPool>,
        config: ServerConfig,
    ) -> Self {
        let lifecycle = AssetLifecycle::new(Arc::clone(&store), config.service_resolution);
        Self {
            store,
            lifecycle: Arc::new(lifecycle),
            pool,
            config: Arc::new(config),
        }
    }
}
