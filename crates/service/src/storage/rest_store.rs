use std::time::Duration;

use async_trait::async_trait;
use models::ListMap;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{decode_document, encode_document, ListStore};
use crate::errors::ServiceError;

/// Lists document held in a managed key-value store reached over its REST API.
///
/// Commands are posted as a JSON array (`["GET", key]`, `["SET", key, value]`)
/// with a bearer token; replies carry either `result` or `error`.
#[derive(Clone)]
pub struct RestKvStore {
    http: reqwest::Client,
    url: String,
    token: String,
    key: String,
}

#[derive(Debug, Deserialize)]
struct CommandReply {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

impl RestKvStore {
    pub fn new(url: &str, token: &str, key: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ServiceError::store)?;
        Ok(Self {
            http,
            url: url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            key: key.to_string(),
        })
    }

    async fn command(&self, args: Value) -> Result<Value, String> {
        let resp = self
            .http
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&args)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let status = resp.status();
        let reply = resp.json::<CommandReply>().await.map_err(|e| format!("{status}: {e}"))?;
        if let Some(err) = reply.error {
            return Err(format!("{status}: {err}"));
        }
        if !status.is_success() {
            return Err(format!("unexpected status {status}"));
        }
        Ok(reply.result.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl ListStore for RestKvStore {
    async fn read_all(&self) -> ListMap {
        match self.command(json!(["GET", self.key])).await {
            Ok(Value::Null) => ListMap::new(),
            Ok(Value::String(raw)) => decode_document(raw.as_bytes(), self.backend()),
            // some clients store the object itself rather than its JSON text
            Ok(other @ Value::Object(_)) => serde_json::from_value(other).unwrap_or_else(|e| {
                warn!(key = %self.key, error = %e, "lists document is corrupt; treating store as empty");
                ListMap::new()
            }),
            Ok(other) => {
                warn!(key = %self.key, kind = ?other, "unexpected GET result; treating store as empty");
                ListMap::new()
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "kv GET failed; reading empty store");
                ListMap::new()
            }
        }
    }

    async fn write_all(&self, lists: &ListMap) -> Result<(), ServiceError> {
        let data = encode_document(lists)?;
        let result = self
            .command(json!(["SET", self.key, data]))
            .await
            .map_err(ServiceError::Store)?;
        debug!(key = %self.key, ?result, "kv SET done");
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "rest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    use axum::{extract::State, http::{HeaderMap, StatusCode}, routing::post, Json, Router};
    use chrono::Utc;
    use models::NewListInput;
    use tokio::{net::TcpListener, sync::Mutex};

    const TOKEN: &str = "test-token";

    type Kv = Arc<Mutex<HashMap<String, String>>>;

    async fn kv_endpoint(
        State(kv): State<Kv>,
        headers: HeaderMap,
        Json(cmd): Json<Vec<Value>>,
    ) -> (StatusCode, Json<Value>) {
        let authorized = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(|v| v == format!("Bearer {TOKEN}"))
            .unwrap_or(false);
        if !authorized {
            return (StatusCode::UNAUTHORIZED, Json(json!({"error": "Unauthorized"})));
        }
        let arg = |i: usize| cmd.get(i).and_then(|v| v.as_str()).unwrap_or_default().to_string();
        let mut map = kv.lock().await;
        match arg(0).as_str() {
            "GET" => (StatusCode::OK, Json(json!({"result": map.get(&arg(1))}))),
            "SET" => {
                map.insert(arg(1), arg(2));
                (StatusCode::OK, Json(json!({"result": "OK"})))
            }
            other => (StatusCode::BAD_REQUEST, Json(json!({"error": format!("unknown command {other}")}))),
        }
    }

    async fn spawn_kv() -> anyhow::Result<(String, Kv)> {
        let kv: Kv = Arc::new(Mutex::new(HashMap::new()));
        let app = Router::new().route("/", post(kv_endpoint)).with_state(kv.clone());
        let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await { eprintln!("kv mock error: {}", e); }
        });
        Ok((format!("http://{}/", addr), kv))
    }

    #[tokio::test]
    async fn rest_store_round_trip() -> anyhow::Result<()> {
        let (url, kv) = spawn_kv().await?;
        let store = RestKvStore::new(&url, TOKEN, "gift-lists", Duration::from_secs(5))?;

        assert!(store.read_all().await.is_empty());

        let list = NewListInput { name: Some("B-day".into()), creator: Some("Sam".into()), birthday: Some("2025-05-01".into()) }
            .into_list("k1".into(), Utc::now())?;
        let mut lists = ListMap::new();
        lists.insert(list.id.clone(), list.clone());
        store.write_all(&lists).await?;

        assert!(kv.lock().await.contains_key("gift-lists"));
        assert_eq!(store.read_all().await.get("k1"), Some(&list));
        Ok(())
    }

    #[tokio::test]
    async fn bad_token_reads_empty_and_fails_writes() -> anyhow::Result<()> {
        let (url, kv) = spawn_kv().await?;
        kv.lock().await.insert("gift-lists".into(), "{}".into());
        let store = RestKvStore::new(&url, "wrong", "gift-lists", Duration::from_secs(5))?;

        assert!(store.read_all().await.is_empty());
        let res = store.write_all(&ListMap::new()).await;
        assert!(matches!(res, Err(ServiceError::Store(_))));
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_value_reads_empty() -> anyhow::Result<()> {
        let (url, kv) = spawn_kv().await?;
        kv.lock().await.insert("gift-lists".into(), "definitely not json".into());
        let store = RestKvStore::new(&url, TOKEN, "gift-lists", Duration::from_secs(5))?;
        assert!(store.read_all().await.is_empty());
        Ok(())
    }
}
