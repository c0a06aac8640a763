//! Module for database connection setup and common utilities.
//!
//! This module is responsible for building the configured backing store and
//! exposes the composite read queries used by the API handlers.

pub mod models;
pub mod queries;

use std::sync::Arc;

use adapters::{AdapterError, Database, MemoryDatabase, MemoryStorage, ObjectStorage, SupabaseClient};
use tracing::info;

use crate::config::StoreConfig;

pub fn init_store(
    store: &StoreConfig,
) -> Result<(Arc<dyn Database>, Arc<dyn ObjectStorage>), AdapterError> {
    match store {
        StoreConfig::Supabase { url, key } => {
            info!("Using Supabase at {url}");
            let client = Arc::new(SupabaseClient::new(url, key)?);
            let db: Arc<dyn Database> = client.clone();
            let storage: Arc<dyn ObjectStorage> = client;
            Ok((db, storage))
        }
        StoreConfig::Memory => {
            info!("Using in-memory store");
            let db: Arc<dyn Database> = Arc::new(MemoryDatabase::new());
            let storage: Arc<dyn ObjectStorage> = Arc::new(MemoryStorage::default());
            Ok((db, storage))
        }
    }
}
