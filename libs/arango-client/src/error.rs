use thiserror::Error;

/// ArangoDB error number for "duplicate name" (database, collection or index).
const ERROR_ARANGO_DUPLICATE_NAME: i64 = 1207;
/// ArangoDB error number for "collection or view not found".
const ERROR_ARANGO_DATA_SOURCE_NOT_FOUND: i64 = 1203;
/// ArangoDB error number for "database not found".
const ERROR_ARANGO_DATABASE_NOT_FOUND: i64 = 1228;

pub type TransportResult<T> = Result<T, TransportError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not load host '{host}' from the `hosts` setting. Expected format host:port,host:port,...")]
    InvalidHost { host: String },

    #[error("Could not read configuration file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Error connecting to ArangoDB at {endpoint}: {message}")]
    Connection { endpoint: String, message: String },

    #[error("ArangoDB returned error {error_num} (HTTP {code}): {message}")]
    Server { code: u16, error_num: i64, message: String },

    #[error("Unexpected response from ArangoDB: {0}")]
    InvalidResponse(String),
}

impl TransportError {
    /// The object that was about to be created exists already.
    pub fn is_duplicate_name(&self) -> bool {
        matches!(
            self,
            TransportError::Server {
                error_num: ERROR_ARANGO_DUPLICATE_NAME,
                ..
            }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TransportError::Server {
                error_num: ERROR_ARANGO_DATA_SOURCE_NOT_FOUND | ERROR_ARANGO_DATABASE_NOT_FOUND,
                ..
            }
        )
    }

    pub fn server(code: u16, error_num: i64, message: impl Into<String>) -> Self {
        TransportError::Server {
            code,
            error_num,
            message: message.into(),
        }
    }

    pub fn duplicate_name(name: &str) -> Self {
        Self::server(409, ERROR_ARANGO_DUPLICATE_NAME, format!("duplicate name: {name}"))
    }

    pub fn data_source_not_found(name: &str) -> Self {
        Self::server(
            404,
            ERROR_ARANGO_DATA_SOURCE_NOT_FOUND,
            format!("collection or view not found: {name}"),
        )
    }
}
