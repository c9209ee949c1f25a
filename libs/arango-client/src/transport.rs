use crate::{AqlQuery, CollectionKind, IndexSpec, TransportResult};
use async_trait::async_trait;
use serde_json::Value;

/// The primitives the engine needs from the database. Connection handling,
/// host selection and retries are the implementor's business.
#[async_trait]
pub trait ArangoTransport: Send + Sync {
    /// Creates a database. Fails with a duplicate-name error if it exists.
    async fn create_database(&self, name: &str) -> TransportResult<()>;

    /// The kind of an existing collection, `None` if there is no such collection.
    async fn collection_kind(&self, database: &str, name: &str) -> TransportResult<Option<CollectionKind>>;

    /// Creates a collection. Fails with a duplicate-name error if it exists.
    async fn create_collection(&self, database: &str, name: &str, kind: CollectionKind) -> TransportResult<()>;

    /// Creates the index unless an identical one exists.
    async fn ensure_index(&self, database: &str, collection: &str, index: &IndexSpec) -> TransportResult<()>;

    /// Runs the query and drains its cursor.
    async fn query(&self, database: &str, query: &AqlQuery) -> TransportResult<Vec<Value>>;
}
