use crate::FieldPath;
use arango_client::TransportError;
use graph_schema::UnresolvedTypeError;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    UnresolvedType(#[from] UnresolvedTypeError),

    #[error(transparent)]
    UnsupportedSelection(#[from] UnsupportedSelectionError),

    #[error(transparent)]
    QueryExecution(#[from] QueryExecutionError),

    #[error("Inconsistent query result: Field {field} is required to return data, got `null` instead.")]
    NullValue { field: String },

    #[error("Inconsistent query result: Field {field} expected {expected}, got `{found}`.")]
    InvalidValue {
        field: String,
        expected: String,
        found: String,
    },
}

impl FetchError {
    pub fn null_value(field: &str) -> Self {
        FetchError::NullValue { field: field.to_owned() }
    }
}

/// No query generator knows how to answer a selection. A schema or request defect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot select field \"{field}\" on type \"{parent_type}\": {reason}")]
pub struct UnsupportedSelectionError {
    pub parent_type: String,
    pub field: String,
    pub reason: String,
}

impl UnsupportedSelectionError {
    pub fn new(parent_type: impl Into<String>, field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            parent_type: parent_type.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// A storage round trip failed. Never retried here.
#[derive(Debug, Error)]
#[error("Query for field `{path}` failed: {kind}")]
pub struct QueryExecutionError {
    pub path: FieldPath,
    pub kind: ExecutionErrorKind,
}

#[derive(Debug, Error)]
pub enum ExecutionErrorKind {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("timed out after {} ms", .0.as_millis())]
    Timeout(Duration),

    #[error("the query traverses from a start vertex, but none was given")]
    UnboundStartVertex,
}

/// Errors of a whole request, before any field is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Error parsing GraphQL query: {0}")]
    Parse(String),

    #[error("Only query operations are supported, got a {0}.")]
    UnsupportedOperation(&'static str),

    #[error("Unknown operation named \"{0}\".")]
    UnknownOperation(String),

    #[error("Must provide operation name if query contains multiple operations.")]
    AmbiguousOperation,

    #[error("Unknown fragment \"{0}\".")]
    UnknownFragment(String),

    #[error("Fragment \"{0}\" spreads itself.")]
    FragmentCycle(String),
}

/// An error attached to the response path it occurred at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub message: String,
    pub path: FieldPath,
}

impl FieldError {
    pub fn new(error: &FetchError, path: FieldPath) -> Self {
        Self {
            message: error.to_string(),
            path,
        }
    }
}
