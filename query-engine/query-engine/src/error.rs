use arango_client::{ConfigError, TransportError};
use graph_schema::SchemaError;
use schema_core::ProvisioningError;
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Error in schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("Could not read schema from {}: {source}", path.display())]
    SchemaLocation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No `*.graphqls` files found in {}", .0.display())]
    EmptySchemaLocation(PathBuf),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Provisioning failed: {0}")]
    Provisioning(#[from] ProvisioningError),

    #[error("Invalid query variables: {0}")]
    InvalidVariables(String),

    #[error("{0}")]
    Serialization(#[from] serde_json::Error),
}

impl EngineError {
    /// Writes the error as a single JSON line to stderr.
    pub fn render_as_json(&self) -> Result<(), anyhow::Error> {
        use std::io::Write as _;

        let error = json!({
            "is_panic": false,
            "message": self.to_string(),
        });

        let stderr = std::io::stderr();
        let locked_stderr = stderr.lock();
        let mut writer = std::io::LineWriter::new(locked_stderr);
        serde_json::to_writer(&mut writer, &error)?;
        writeln!(&mut writer)?;
        writer.flush()?;

        Ok(())
    }
}
