use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    /// Optional directory with static frontend assets.
    #[serde(default = "default_frontend_dir")]
    pub frontend_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4), frontend_dir: default_frontend_dir() }
    }
}

/// Which physical backend holds the lists document.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Redis,
    Rest,
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Redis => "redis",
            Self::Rest => "rest",
            Self::Memory => "memory",
        }
    }
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" | "json" => Ok(Self::File),
            "redis" => Ok(Self::Redis),
            "rest" | "kv" => Ok(Self::Rest),
            "memory" | "mem" => Ok(Self::Memory),
            other => Err(anyhow!("unknown storage backend: {other}")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Key (or file) under which the whole document is stored.
    #[serde(default = "default_key")]
    pub key: String,
    #[serde(default = "default_file_path")]
    pub file_path: String,
    #[serde(default)]
    pub redis_url: String,
    #[serde(default)]
    pub rest_url: String,
    #[serde(default)]
    pub rest_token: String,
    #[serde(default = "default_rest_timeout")]
    pub rest_timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            key: default_key(),
            file_path: default_file_path(),
            redis_url: String::new(),
            rest_url: String::new(),
            rest_token: String::new(),
            rest_timeout_secs: default_rest_timeout(),
        }
    }
}

fn default_frontend_dir() -> String { "frontend".into() }
fn default_key() -> String { "gift-lists".into() }
fn default_file_path() -> String { "data/gift-lists.json".into() }
fn default_rest_timeout() -> u64 { 10 }

/// `CONFIG_PATH` or `config.toml`; defaults when that file does not exist.
pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file_or_default(&path)
}

/// A missing file yields the defaults. A file that exists and fails to read
/// or parse is an error.
pub fn load_from_file_or_default(path: &str) -> Result<AppConfig> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse(&content).with_context(|| format!("invalid config file {path}")),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(anyhow::Error::new(e).context(format!("cannot read config file {path}"))),
    }
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    /// Config file if present, otherwise defaults filled from the environment.
    pub fn load_or_env() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.normalize_with(process_env)
    }

    /// Same as [`normalize_and_validate`](Self::normalize_and_validate) with an explicit env lookup.
    pub fn normalize_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.server.normalize_from_env(&lookup);
        self.server.normalize()?;
        // 环境变量只填充 TOML 中未提供的存储配置
        self.storage.normalize_from_env(&lookup)?;
        self.storage.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize_from_env<F: Fn(&str) -> Option<String>>(&mut self, lookup: &F) {
        if let Some(host) = lookup("SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT").and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
        if let Some(w) = lookup("TOKIO_WORKER_THREADS").and_then(|v| v.parse::<usize>().ok()) {
            self.worker_threads = Some(w);
        }
    }

    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 { self.worker_threads = Some(4); }
        } else {
            self.worker_threads = Some(4);
        }
        Ok(())
    }
}

impl StorageConfig {
    pub fn normalize_from_env<F: Fn(&str) -> Option<String>>(&mut self, lookup: &F) -> Result<()> {
        if let Some(backend) = lookup("STORAGE_BACKEND") {
            self.backend = backend.parse()?;
        }
        if let Some(key) = lookup("LISTS_KEY") {
            self.key = key;
        }
        if let Some(path) = lookup("LISTS_FILE") {
            self.file_path = path;
        }
        if self.redis_url.trim().is_empty() {
            if let Some(url) = lookup("REDIS_URL") {
                self.redis_url = url;
            }
        }
        if self.rest_url.trim().is_empty() {
            if let Some(url) = lookup("KV_REST_API_URL") {
                self.rest_url = url;
            }
        }
        if self.rest_token.trim().is_empty() {
            if let Some(token) = lookup("KV_REST_API_TOKEN") {
                self.rest_token = token;
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.key.trim().is_empty() {
            return Err(anyhow!("storage.key must not be empty"));
        }
        match self.backend {
            StorageBackend::File => {
                if self.file_path.trim().is_empty() {
                    return Err(anyhow!("storage.file_path is empty; set it in config.toml or LISTS_FILE"));
                }
            }
            StorageBackend::Redis => {
                let lower = self.redis_url.to_lowercase();
                if !(lower.starts_with("redis://") || lower.starts_with("rediss://")) {
                    return Err(anyhow!("storage.redis_url must start with redis:// or rediss://; set it in config.toml or REDIS_URL"));
                }
            }
            StorageBackend::Rest => {
                let lower = self.rest_url.to_lowercase();
                if !(lower.starts_with("http://") || lower.starts_with("https://")) {
                    return Err(anyhow!("storage.rest_url must start with http(s); set it in config.toml or KV_REST_API_URL"));
                }
                if self.rest_token.trim().is_empty() {
                    return Err(anyhow!("storage.rest_token is empty; set it in config.toml or KV_REST_API_TOKEN"));
                }
                if self.rest_timeout_secs == 0 {
                    return Err(anyhow!("storage.rest_timeout_secs must be a positive number of seconds"));
                }
            }
            StorageBackend::Memory => {}
        }
        Ok(())
    }
}
