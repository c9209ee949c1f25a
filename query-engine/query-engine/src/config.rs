use arango_client::{ArangoConfig, ConfigError};
use serde::Deserialize;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// The configuration file. Everything lives in the `[arangodb]` table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub arangodb: ArangoSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ArangoSettings {
    #[serde(flatten)]
    pub connection: ArangoConfig,

    /// A schema file, or a directory whose `*.graphqls` files make up the schema.
    pub schema_location: PathBuf,

    /// Create the database, collections and indexes on startup.
    pub auto_create: bool,

    /// Per-query timeout in milliseconds. Zero disables it.
    pub query_timeout_ms: u64,
}

impl Default for ArangoSettings {
    fn default() -> Self {
        Self {
            connection: ArangoConfig::default(),
            schema_location: PathBuf::from("."),
            auto_create: false,
            query_timeout_ms: 0,
        }
    }
}

impl ArangoSettings {
    pub fn query_timeout(&self) -> Option<Duration> {
        (self.query_timeout_ms > 0).then(|| Duration::from_millis(self.query_timeout_ms))
    }
}

impl EngineConfig {
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    /// Reads the configuration file. Without a file every setting has its default.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml(&input)
    }
}
