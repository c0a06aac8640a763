use std::sync::Arc;

use adapters::{AdapterError, Database, ObjectStorage};

use crate::{auth::JwtKeys, config::Config, database::init_store};

/// Shared, read-only state handed to every handler.
pub struct AppState {
    pub config: Config,
    pub keys: JwtKeys,
    pub db: Arc<dyn Database>,
    pub storage: Arc<dyn ObjectStorage>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Arc<Self>, AdapterError> {
        let (db, storage) = init_store(&config.store)?;
        Ok(Self::with_backends(config, db, storage))
    }

    pub fn with_backends(
        config: Config,
        db: Arc<dyn Database>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Arc<Self> {
        let keys = JwtKeys::new(
            config.jwt_secret.as_bytes(),
            config.access_token_ttl,
            config.refresh_token_ttl,
        );

        Arc::new(Self {
            config,
            keys,
            db,
            storage,
        })
    }
}
