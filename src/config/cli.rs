use std::path::PathBuf;

use clap::{Args, Parser, builder::BoolishValueParser};

/// Command-line arguments for the todos binary.
///
/// The unprefixed environment variables (`SERVER_PORT`, `REDIS_URL`, ...) are
/// accepted as fallbacks for the matching flags.
#[derive(Debug, Parser)]
#[command(name = "todos", version, about = "Todo record service")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "TODOS_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listen address (`:8080` binds every interface).
    #[arg(long = "server-addr", env = "SERVER_PORT", value_name = "ADDR")]
    pub server_addr: Option<String>,

    /// Port advertised in startup logs.
    #[arg(long = "advertised-port", env = "APP_PORT", value_name = "PORT")]
    pub advertised_port: Option<String>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Full MongoDB connection string; wins over host and port.
    #[arg(long = "mongo-uri", value_name = "URI")]
    pub mongo_uri: Option<String>,

    /// Override the MongoDB host.
    #[arg(long = "mongo-host", env = "MONGO_HOST", value_name = "HOST")]
    pub mongo_host: Option<String>,

    /// Override the MongoDB port.
    #[arg(long = "mongo-port", env = "MONGO_PORT", value_name = "PORT")]
    pub mongo_port: Option<u16>,

    /// Override the database holding the todo collection.
    #[arg(long = "database-name", env = "DATABASE_NAME", value_name = "NAME")]
    pub database_name: Option<String>,

    /// Override the todo collection name.
    #[arg(long = "collection-name", env = "COLLECTION_NAME", value_name = "NAME")]
    pub collection_name: Option<String>,

    /// Override the per-call store timeout.
    #[arg(long = "store-timeout-ms", value_name = "MS")]
    pub store_timeout_ms: Option<u64>,

    /// Select the cache backend (redis|memory|disabled).
    #[arg(long = "cache-backend", value_name = "BACKEND")]
    pub cache_backend: Option<String>,

    /// Override the Redis address (`host:port` or a `redis://` URL).
    #[arg(long = "redis-url", env = "REDIS_URL", value_name = "URL")]
    pub redis_url: Option<String>,

    /// Override the Redis password.
    #[arg(
        long = "redis-password",
        env = "REDIS_PASSWORD",
        value_name = "PASSWORD",
        hide_env_values = true
    )]
    pub redis_password: Option<String>,

    /// Override the Redis logical database.
    #[arg(long = "redis-db", value_name = "INDEX")]
    pub redis_db: Option<u32>,

    /// Override how long cached todos live.
    #[arg(long = "cache-ttl-seconds", value_name = "SECONDS")]
    pub cache_ttl_seconds: Option<u64>,

    /// Override the per-call cache timeout.
    #[arg(long = "cache-timeout-ms", value_name = "MS")]
    pub cache_timeout_ms: Option<u64>,

    /// Override the in-memory cache capacity.
    #[arg(long = "cache-memory-capacity", value_name = "COUNT")]
    pub cache_memory_capacity: Option<usize>,
}
