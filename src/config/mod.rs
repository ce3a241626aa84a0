//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

pub use cli::{CliArgs, ServeOverrides};

use std::{
    net::{Ipv4Addr, SocketAddr},
    num::NonZeroUsize,
    str::FromStr,
    time::Duration,
};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "todos";
const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_MONGO_HOST: &str = "localhost";
const DEFAULT_MONGO_PORT: u16 = 27017;
const DEFAULT_DATABASE_NAME: &str = "todos";
const DEFAULT_COLLECTION_NAME: &str = "todos";
const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_REDIS_URL: &str = "127.0.0.1:6379";
const DEFAULT_REDIS_DB: u32 = 0;
const DEFAULT_CACHE_TTL_SECS: u64 = 10;
const DEFAULT_CACHE_TIMEOUT_MS: u64 = 500;
const DEFAULT_CACHE_MEMORY_CAPACITY: usize = 1_024;

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub store: StoreSettings,
    pub cache: CacheSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub advertised_port: Option<String>,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub uri: String,
    pub database: String,
    pub collection: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Redis,
    Memory,
    Disabled,
}

impl FromStr for CacheBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            "disabled" | "none" | "off" => Ok(Self::Disabled),
            other => Err(format!(
                "unknown backend `{other}` (expected redis, memory or disabled)"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub backend: CacheBackend,
    pub redis_url: String,
    pub ttl: Duration,
    pub timeout: Duration,
    pub memory_capacity: NonZeroUsize,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix("TODOS")
            .prefix_separator("__")
            .separator("__"),
    );

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_serve_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

/// Resolve configuration from the process arguments.
pub fn load_with_cli() -> Result<Settings, LoadError> {
    load(&CliArgs::parse())
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    store: RawStoreSettings,
    cache: RawCacheSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(addr) = overrides.server_addr.as_ref() {
            self.server.addr = Some(addr.clone());
        }
        if let Some(port) = overrides.advertised_port.as_ref() {
            self.server.advertised_port = Some(port.clone());
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(uri) = overrides.mongo_uri.as_ref() {
            self.store.uri = Some(uri.clone());
        }
        if let Some(host) = overrides.mongo_host.as_ref() {
            self.store.host = Some(host.clone());
        }
        if let Some(port) = overrides.mongo_port {
            self.store.port = Some(port);
        }
        if let Some(name) = overrides.database_name.as_ref() {
            self.store.database = Some(name.clone());
        }
        if let Some(name) = overrides.collection_name.as_ref() {
            self.store.collection = Some(name.clone());
        }
        if let Some(timeout) = overrides.store_timeout_ms {
            self.store.timeout_ms = Some(timeout);
        }
        if let Some(backend) = overrides.cache_backend.as_ref() {
            self.cache.backend = Some(backend.clone());
        }
        if let Some(url) = overrides.redis_url.as_ref() {
            self.cache.url = Some(url.clone());
        }
        if let Some(password) = overrides.redis_password.as_ref() {
            self.cache.password = Some(password.clone());
        }
        if let Some(db) = overrides.redis_db {
            self.cache.db = Some(db);
        }
        if let Some(ttl) = overrides.cache_ttl_seconds {
            self.cache.ttl_seconds = Some(ttl);
        }
        if let Some(timeout) = overrides.cache_timeout_ms {
            self.cache.timeout_ms = Some(timeout);
        }
        if let Some(capacity) = overrides.cache_memory_capacity {
            self.cache.memory_capacity = Some(capacity);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            store,
            cache,
        } = raw;

        let server = build_server_settings(server)?;
        let logging = build_logging_settings(logging)?;
        let store = build_store_settings(store)?;
        let cache = build_cache_settings(cache)?;

        Ok(Self {
            server,
            logging,
            store,
            cache,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let raw_addr = server
        .addr
        .unwrap_or_else(|| DEFAULT_SERVER_ADDR.to_string());
    let addr = parse_listen_addr(&raw_addr)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;
    if addr.port() == 0 {
        return Err(LoadError::invalid(
            "server.addr",
            "port must be greater than zero",
        ));
    }

    let advertised_port = non_blank(server.advertised_port);

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        addr,
        advertised_port,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_store_settings(store: RawStoreSettings) -> Result<StoreSettings, LoadError> {
    let uri = match non_blank(store.uri) {
        Some(uri) => uri,
        None => {
            let host = non_blank(store.host).unwrap_or_else(|| DEFAULT_MONGO_HOST.to_string());
            let port = store.port.unwrap_or(DEFAULT_MONGO_PORT);
            if port == 0 {
                return Err(LoadError::invalid(
                    "store.port",
                    "port must be greater than zero",
                ));
            }
            format!("mongodb://{host}:{port}")
        }
    };
    if !uri.starts_with("mongodb://") && !uri.starts_with("mongodb+srv://") {
        return Err(LoadError::invalid(
            "store.uri",
            "expected a mongodb:// or mongodb+srv:// connection string",
        ));
    }

    let database =
        non_blank(store.database).unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string());
    let collection =
        non_blank(store.collection).unwrap_or_else(|| DEFAULT_COLLECTION_NAME.to_string());

    let timeout_ms = store.timeout_ms.unwrap_or(DEFAULT_STORE_TIMEOUT_MS);
    if timeout_ms == 0 {
        return Err(LoadError::invalid(
            "store.timeout_ms",
            "must be greater than zero",
        ));
    }

    Ok(StoreSettings {
        uri,
        database,
        collection,
        timeout: Duration::from_millis(timeout_ms),
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let backend = match cache.backend.as_deref() {
        Some(value) => CacheBackend::from_str(value)
            .map_err(|reason| LoadError::invalid("cache.backend", reason))?,
        None => CacheBackend::Redis,
    };

    let url = non_blank(cache.url).unwrap_or_else(|| DEFAULT_REDIS_URL.to_string());
    let password = non_blank(cache.password);
    let db = cache.db.unwrap_or(DEFAULT_REDIS_DB);
    let redis_url = build_redis_url(&url, password.as_deref(), db)
        .map_err(|reason| LoadError::invalid("cache.url", reason))?;

    let ttl_seconds = cache.ttl_seconds.unwrap_or(DEFAULT_CACHE_TTL_SECS);
    if ttl_seconds == 0 {
        return Err(LoadError::invalid(
            "cache.ttl_seconds",
            "must be greater than zero",
        ));
    }

    let timeout_ms = cache.timeout_ms.unwrap_or(DEFAULT_CACHE_TIMEOUT_MS);
    if timeout_ms == 0 {
        return Err(LoadError::invalid(
            "cache.timeout_ms",
            "must be greater than zero",
        ));
    }

    let capacity = cache
        .memory_capacity
        .unwrap_or(DEFAULT_CACHE_MEMORY_CAPACITY);
    let memory_capacity = NonZeroUsize::new(capacity).ok_or_else(|| {
        LoadError::invalid("cache.memory_capacity", "must be greater than zero")
    })?;

    Ok(CacheSettings {
        backend,
        redis_url,
        ttl: Duration::from_secs(ttl_seconds),
        timeout: Duration::from_millis(timeout_ms),
        memory_capacity,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    addr: Option<String>,
    advertised_port: Option<String>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawStoreSettings {
    uri: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    database: Option<String>,
    collection: Option<String>,
    timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    backend: Option<String>,
    url: Option<String>,
    password: Option<String>,
    db: Option<u32>,
    ttl_seconds: Option<u64>,
    timeout_ms: Option<u64>,
    memory_capacity: Option<usize>,
}

/// Accepts `host:port`, `:port` and a bare `port`; the short forms bind every interface.
fn parse_listen_addr(raw: &str) -> Result<SocketAddr, String> {
    let trimmed = raw.trim();
    let port_only = trimmed.strip_prefix(':').unwrap_or(trimmed);
    if let Ok(port) = port_only.parse::<u16>() {
        return Ok(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)));
    }

    trimmed
        .parse()
        .map_err(|err| format!("invalid address `{trimmed}`: {err}"))
}

fn build_redis_url(raw: &str, password: Option<&str>, db: u32) -> Result<String, String> {
    let candidate = if raw.contains("://") {
        raw.trim().to_string()
    } else {
        format!("redis://{}", raw.trim())
    };

    let mut url =
        Url::parse(&candidate).map_err(|err| format!("invalid url `{candidate}`: {err}"))?;
    if !matches!(url.scheme(), "redis" | "rediss") {
        return Err(format!("unsupported scheme `{}`", url.scheme()));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(format!("url `{candidate}` has no host"));
    }

    if let Some(password) = password {
        url.set_password(Some(password))
            .map_err(|_| format!("url `{candidate}` cannot carry a password"))?;
    }
    if url.path().is_empty() || url.path() == "/" {
        url.set_path(&format!("/{db}"));
    }

    Ok(url.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}
