use thiserror::Error;

/// Failures of the process-level plumbing: sockets, backends and startup.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store unavailable: {0}")]
    Database(String),
    #[error("cache unavailable: {0}")]
    Cache(String),
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl InfraError {
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache(message.into())
    }

    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}
