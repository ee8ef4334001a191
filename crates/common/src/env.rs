//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::warn;

/// Warn when the optional frontend directory is missing; create the parent
/// directory of the lists file when the file backend is in use.
pub async fn ensure_env(frontend_dir: &str, lists_file: Option<&str>) -> anyhow::Result<()> {
    if tokio::fs::metadata(frontend_dir).await.is_err() {
        warn!(%frontend_dir, "frontend assets directory not found; static assets may 404");
    }
    if let Some(parent) = lists_file.and_then(|f| Path::new(f).parent()) {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_parent_of_lists_file() -> anyhow::Result<()> {
        let dir = std::env::temp_dir().join(format!("wishlist_env_{}", uuid::Uuid::new_v4()));
        let file = dir.join("nested").join("lists.json");
        ensure_env("/nonexistent-frontend", file.to_str()).await?;
        assert!(tokio::fs::metadata(dir.join("nested")).await?.is_dir());
        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }
}
