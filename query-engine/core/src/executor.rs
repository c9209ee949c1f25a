use crate::{DocumentsFragment, ExecutionErrorKind, FieldPath, QueryExecutionError, START_PARAMETER};
use arango_client::ArangoTransport;
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use tracing::Instrument;

/// Runs compiled fragments against the database, one round trip per fragment.
#[derive(Clone)]
pub struct TraversalQueryExecutor {
    transport: Arc<dyn ArangoTransport>,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for TraversalQueryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraversalQueryExecutor")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl TraversalQueryExecutor {
    pub fn new(transport: Arc<dyn ArangoTransport>) -> Self {
        Self {
            transport,
            timeout: None,
        }
    }

    /// Aborts queries running longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Executes `fragment` in `database`. `start` binds the start vertex id of fragments
    /// traversing from an already resolved record.
    pub async fn execute(
        &self,
        fragment: &DocumentsFragment,
        database: &str,
        start: Option<&str>,
        path: &FieldPath,
    ) -> Result<Vec<Value>, QueryExecutionError> {
        let error = |kind| QueryExecutionError {
            path: path.clone(),
            kind,
        };

        let mut query = fragment.render();

        if fragment.traverses_from_start() {
            let start = start.ok_or_else(|| error(ExecutionErrorKind::UnboundStartVertex))?;
            query.bind(START_PARAMETER, start);
        }

        let span = tracing::debug_span!("execute_traversal", path = %path, database);

        async {
            let bind_vars = Value::Object(query.bind_vars.clone());

            tracing::debug!(
                target: "query_core::query",
                query = %query.query,
                bind_vars = %bind_vars,
                "Executing traversal query"
            );

            let round_trip = self.transport.query(database, &query);

            let result = match self.timeout {
                Some(timeout) => match tokio::time::timeout(timeout, round_trip).await {
                    Ok(result) => result,
                    Err(_) => return Err(error(ExecutionErrorKind::Timeout(timeout))),
                },
                None => round_trip.await,
            };

            let records = result.map_err(|err| error(ExecutionErrorKind::Transport(err)))?;

            tracing::debug!(records = records.len(), "Traversal query finished");

            Ok(records)
        }
        .instrument(span)
        .await
    }
}
