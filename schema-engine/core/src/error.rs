use arango_client::{CollectionKind, TransportError};
use thiserror::Error;

use crate::ProvisioningPhase;

pub type ProvisioningResult<T> = Result<T, ProvisioningError>;

#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error("Collection `{collection}` exists with kind `{existing}`, but the schema needs kind `{expected}`.")]
    CollectionKindMismatch {
        collection: String,
        expected: CollectionKind,
        existing: CollectionKind,
    },

    #[error("The {phase} phase cannot run before the {required} phase has completed.")]
    PhaseOrder {
        phase: ProvisioningPhase,
        required: ProvisioningPhase,
    },

    #[error("Failed to {operation}: {source}")]
    Transport {
        operation: String,
        #[source]
        source: TransportError,
    },
}

impl ProvisioningError {
    pub(crate) fn transport(operation: impl Into<String>, source: TransportError) -> Self {
        ProvisioningError::Transport {
            operation: operation.into(),
            source,
        }
    }
}
