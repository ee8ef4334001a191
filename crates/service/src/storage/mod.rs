//! Storage abstractions for the lists document
//!
//! Every backend persists the full `ListMap` as one JSON document. Reads never
//! fail: an absent, corrupt, or unreachable document reads as an empty map.
//! Writes replace the whole document and surface failures to the caller.

pub mod file;
pub mod memory;
pub mod redis_store;
pub mod rest_store;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use configs::{StorageBackend, StorageConfig};
use models::{GiftList, ListMap};
use tracing::{info, warn};

use crate::errors::ServiceError;

/// Whole-document store for every gift list.
/// Implementations can be file-backed, in-memory, or a remote KV.
#[async_trait]
pub trait ListStore: Send + Sync {
    /// Current mapping, or empty when the document cannot be read.
    async fn read_all(&self) -> ListMap;

    /// Replace the entire document.
    async fn write_all(&self, lists: &ListMap) -> Result<(), ServiceError>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

/// Decode a stored document, degrading to an empty map when it is not a JSON
/// object. Entries are decoded one by one so a single bad list is skipped
/// without hiding the others.
pub(crate) fn decode_document(bytes: &[u8], backend: &'static str) -> ListMap {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return ListMap::new();
    }
    let entries = match serde_json::from_slice::<serde_json::Map<String, serde_json::Value>>(bytes) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(backend, error = %e, "lists document is corrupt; treating store as empty");
            return ListMap::new();
        }
    };
    let mut lists = ListMap::with_capacity(entries.len());
    for (id, value) in entries {
        match serde_json::from_value::<GiftList>(value) {
            Ok(list) => {
                lists.insert(id, list);
            }
            Err(e) => warn!(backend, list_id = %id, error = %e, "skipping undecodable list"),
        }
    }
    lists
}

pub(crate) fn encode_document(lists: &ListMap) -> Result<String, ServiceError> {
    serde_json::to_string(lists).map_err(ServiceError::store)
}

/// Open the backend selected by configuration.
pub async fn open_store(cfg: &StorageConfig) -> Result<Arc<dyn ListStore>, ServiceError> {
    let store: Arc<dyn ListStore> = match cfg.backend {
        StorageBackend::File => file::JsonFileStore::new(&cfg.file_path).await?,
        StorageBackend::Redis => Arc::new(redis_store::RedisListStore::new(&cfg.redis_url, &cfg.key)?),
        StorageBackend::Rest => Arc::new(rest_store::RestKvStore::new(
            &cfg.rest_url,
            &cfg.rest_token,
            &cfg.key,
            Duration::from_secs(cfg.rest_timeout_secs),
        )?),
        StorageBackend::Memory => Arc::new(memory::MemoryListStore::default()),
    };
    info!(backend = store.backend(), key = %cfg.key, "lists store opened");
    Ok(store)
}
