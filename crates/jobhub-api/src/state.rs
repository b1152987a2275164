//! Application state.

use std::sync::Arc;

use jobhub_storage::UploadStore;
use jobhub_store::Store;

use crate::auth::TokenKeys;
use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<Store>,
    pub uploads: Arc<UploadStore>,
    pub tokens: Arc<TokenKeys>,
}

impl AppState {
    /// Open the store and upload directory described by the config.
    pub fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let store = Store::open(&config.data_dir)?;
        let uploads = UploadStore::open(&config.uploads_dir)?;
        let tokens = TokenKeys::new(&config.jwt_secret, config.token_ttl_hours);

        Ok(Self {
            config,
            store: Arc::new(store),
            uploads: Arc::new(uploads),
            tokens: Arc::new(tokens),
        })
    }
}
