//! Registry configuration

use crate::error::{ConfigError, RegistryError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default number of component slots per registry and table.
pub const DEFAULT_CAPACITY: usize = 128;

/// Upper bound on slots per registry and table. Tables allocate every slot
/// up front and ids are stored as `u32`.
pub const MAX_CAPACITY: usize = 1 << 16;

/// Settings for a component registry and the tables built against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Label used in diagnostics.
    pub name: String,
    /// Maximum number of component ids the registry hands out.
    pub capacity: usize,
}

impl RegistryConfig {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON document. Missing fields take their defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 || self.capacity > MAX_CAPACITY {
            return Err(ConfigError::InvalidCapacity {
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}

/// Reject capacities a registry or table cannot be built with.
pub(crate) fn check_capacity(capacity: usize) -> Result<(), RegistryError> {
    if capacity == 0 || capacity > MAX_CAPACITY {
        return Err(RegistryError::InvalidCapacity {
            capacity,
            max: MAX_CAPACITY,
        });
    }
    Ok(())
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            name: "global".to_string(),
            capacity: DEFAULT_CAPACITY,
        }
    }
}
