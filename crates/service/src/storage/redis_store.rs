use async_trait::async_trait;
use models::ListMap;
use redis::AsyncCommands;
use tracing::warn;

use super::{decode_document, encode_document, ListStore};
use crate::errors::ServiceError;

/// Lists document held under a single key of a Redis-protocol server.
#[derive(Clone)]
pub struct RedisListStore {
    client: redis::Client,
    key: String,
}

impl RedisListStore {
    pub fn new(url: &str, key: &str) -> Result<Self, ServiceError> {
        let client = redis::Client::open(url).map_err(ServiceError::store)?;
        Ok(Self { client, key: key.to_string() })
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, redis::RedisError> {
        self.client.get_multiplexed_async_connection().await
    }
}

#[async_trait]
impl ListStore for RedisListStore {
    async fn read_all(&self) -> ListMap {
        let mut conn = match self.connection().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!(key = %self.key, error = %e, "redis unreachable; reading empty store");
                return ListMap::new();
            }
        };
        match conn.get::<_, Option<String>>(&self.key).await {
            Ok(Some(raw)) => decode_document(raw.as_bytes(), self.backend()),
            Ok(None) => ListMap::new(),
            Err(e) => {
                warn!(key = %self.key, error = %e, "redis GET failed; reading empty store");
                ListMap::new()
            }
        }
    }

    async fn write_all(&self, lists: &ListMap) -> Result<(), ServiceError> {
        let data = encode_document(lists)?;
        let mut conn = self.connection().await.map_err(ServiceError::store)?;
        conn.set::<_, _, ()>(&self.key, data).await.map_err(ServiceError::store)?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use models::NewListInput;
    use uuid::Uuid;

    #[test]
    fn rejects_malformed_url() {
        assert!(RedisListStore::new("not a url", "gift-lists").is_err());
    }

    #[tokio::test]
    async fn unreachable_server_reads_empty_and_fails_writes() {
        let store = RedisListStore::new("redis://127.0.0.1:1/", "gift-lists").unwrap();
        assert!(store.read_all().await.is_empty());
        let res = store.write_all(&ListMap::new()).await;
        assert!(matches!(res, Err(ServiceError::Store(_))));
    }

    // Needs a live server; set REDIS_URL to run.
    #[tokio::test]
    async fn redis_round_trip_when_available() -> Result<(), anyhow::Error> {
        let url = match std::env::var("REDIS_URL") {
            Ok(url) => url,
            Err(_) => {
                eprintln!("REDIS_URL missing; skip redis store test.");
                return Ok(());
            }
        };
        let key = format!("gift-lists-test-{}", Uuid::new_v4());
        let store = RedisListStore::new(&url, &key)?;
        assert!(store.read_all().await.is_empty());

        let list = NewListInput { name: Some("B-day".into()), creator: Some("Sam".into()), birthday: Some("2025-05-01".into()) }
            .into_list("r1".into(), Utc::now())?;
        let mut lists = ListMap::new();
        lists.insert(list.id.clone(), list.clone());
        store.write_all(&lists).await?;
        assert_eq!(store.read_all().await.get("r1"), Some(&list));

        let mut conn = store.connection().await?;
        conn.del::<_, ()>(&key).await?;
        Ok(())
    }
}
