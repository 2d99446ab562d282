//! Error types for registry construction and configuration.

use thiserror::Error;

/// Errors that can occur while claiming component ids or building tables.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("cannot register component '{name}': registry '{registry}' is full ({capacity} slots)")]
    CapacityExceeded {
        registry: String,
        name: String,
        capacity: usize,
    },

    #[error("instance table has {capacity} slots but {registered} components are already registered")]
    TableTooSmall { registered: usize, capacity: usize },

    #[error("capacity {capacity} is outside 1..={max}")]
    InvalidCapacity { capacity: usize, max: usize },

    #[error("the global registry is already initialized")]
    AlreadyInitialized,
}

/// Errors that can occur while loading a [`RegistryConfig`](crate::RegistryConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("registry capacity {capacity} is outside 1..={max}", max = crate::config::MAX_CAPACITY)]
    InvalidCapacity { capacity: usize },
}
