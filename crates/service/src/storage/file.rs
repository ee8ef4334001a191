use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use models::ListMap;
use tokio::fs;
use tracing::{debug, warn};

use super::{decode_document, encode_document, ListStore};
use crate::errors::ServiceError;

/// Lists document persisted as a local JSON file.
///
/// Every read goes to disk so several processes sharing the file see each
/// other's writes. Writes land in a sibling temp file first and are renamed
/// into place.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    file_path: PathBuf,
}

impl JsonFileStore {
    /// Initialize the store from a path. Creates missing parent directories.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(ServiceError::store)?;
            }
        }
        Ok(Arc::new(Self { file_path }))
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.file_path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl ListStore for JsonFileStore {
    async fn read_all(&self) -> ListMap {
        match fs::read(&self.file_path).await {
            Ok(bytes) => decode_document(&bytes, self.backend()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.file_path.display(), "lists file absent; empty store");
                ListMap::new()
            }
            Err(e) => {
                warn!(path = %self.file_path.display(), error = %e, "cannot read lists file");
                ListMap::new()
            }
        }
    }

    async fn write_all(&self, lists: &ListMap) -> Result<(), ServiceError> {
        let data = encode_document(lists)?;
        let tmp = self.temp_path();
        fs::write(&tmp, data).await.map_err(ServiceError::store)?;
        fs::rename(&tmp, &self.file_path).await.map_err(ServiceError::store)?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "file"
    }
}
