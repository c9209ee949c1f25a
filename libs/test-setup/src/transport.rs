use arango_client::{
    AqlQuery, ArangoTransport, CollectionKind, IndexSpec, SYSTEM_DATABASE, TransportError, TransportResult,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::{
    collections::{BTreeMap, BTreeSet},
    time::Duration,
};

/// ArangoDB error number for "forbidden".
const ERROR_FORBIDDEN: i64 = 11;
/// ArangoDB error number for "database not found".
const ERROR_DATABASE_NOT_FOUND: i64 = 1228;

type QueryHandler = Box<dyn Fn(&AqlQuery) -> QueryReply + Send + Sync>;

/// Every call the engines made, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    CreateDatabase(String),
    CollectionKind(String),
    CreateCollection(String, CollectionKind),
    EnsureIndex(String, IndexSpec),
    Query(String),
}

/// What a query returns. Query results are canned: nothing evaluates AQL here.
pub struct QueryReply {
    result: TransportResult<Vec<Value>>,
    latency: Option<Duration>,
}

impl QueryReply {
    pub fn records(records: Vec<Value>) -> Self {
        Self {
            result: Ok(records),
            latency: None,
        }
    }

    pub fn error(error: TransportError) -> Self {
        Self {
            result: Err(error),
            latency: None,
        }
    }

    pub fn delayed(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }
}

#[derive(Debug, Default)]
struct State {
    databases: BTreeSet<String>,
    collections: BTreeMap<(String, String), CollectionKind>,
    indexes: BTreeMap<(String, String), Vec<IndexSpec>>,
    forbidden_collections: BTreeSet<String>,
    calls: Vec<TransportCall>,
    queries: Vec<AqlQuery>,
}

/// A transport keeping databases, collections and indexes in memory, with the
/// same "already exists" and "not found" behaviour as the real server.
pub struct InMemoryTransport {
    state: Mutex<State>,
    handler: QueryHandler,
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTransport {
    pub fn new() -> Self {
        let mut state = State::default();
        state.databases.insert(SYSTEM_DATABASE.to_owned());

        Self {
            state: Mutex::new(state),
            handler: Box::new(|_| QueryReply::records(Vec::new())),
        }
    }

    pub fn with_query_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&AqlQuery) -> QueryReply + Send + Sync + 'static,
    {
        self.handler = Box::new(handler);
        self
    }

    pub fn with_database(self, name: &str) -> Self {
        self.state.lock().databases.insert(name.to_owned());
        self
    }

    pub fn with_collection(self, database: &str, name: &str, kind: CollectionKind) -> Self {
        {
            let mut state = self.state.lock();
            state.databases.insert(database.to_owned());
            state.collections.insert((database.to_owned(), name.to_owned()), kind);
        }

        self
    }

    /// Creating this collection fails with a permission error.
    pub fn with_forbidden_collection(self, name: &str) -> Self {
        self.state.lock().forbidden_collections.insert(name.to_owned());
        self
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.state.lock().calls.clone()
    }

    pub fn queries(&self) -> Vec<AqlQuery> {
        self.state.lock().queries.clone()
    }

    pub fn databases(&self) -> Vec<String> {
        self.state.lock().databases.iter().cloned().collect()
    }

    pub fn collections(&self, database: &str) -> Vec<(String, CollectionKind)> {
        self.state
            .lock()
            .collections
            .iter()
            .filter(|((db, _), _)| db == database)
            .map(|((_, name), kind)| (name.clone(), *kind))
            .collect()
    }

    pub fn indexes(&self, database: &str, collection: &str) -> Vec<IndexSpec> {
        self.state
            .lock()
            .indexes
            .get(&(database.to_owned(), collection.to_owned()))
            .cloned()
            .unwrap_or_default()
    }
}

fn database_not_found(name: &str) -> TransportError {
    TransportError::server(404, ERROR_DATABASE_NOT_FOUND, format!("database not found: {name}"))
}

fn ensure_database(state: &State, database: &str) -> TransportResult<()> {
    if state.databases.contains(database) {
        Ok(())
    } else {
        Err(database_not_found(database))
    }
}

#[async_trait]
impl ArangoTransport for InMemoryTransport {
    async fn create_database(&self, name: &str) -> TransportResult<()> {
        let mut state = self.state.lock();
        state.calls.push(TransportCall::CreateDatabase(name.to_owned()));

        if !state.databases.insert(name.to_owned()) {
            return Err(TransportError::duplicate_name(name));
        }

        Ok(())
    }

    async fn collection_kind(&self, database: &str, name: &str) -> TransportResult<Option<CollectionKind>> {
        let mut state = self.state.lock();
        state.calls.push(TransportCall::CollectionKind(name.to_owned()));
        ensure_database(&state, database)?;

        Ok(state.collections.get(&(database.to_owned(), name.to_owned())).copied())
    }

    async fn create_collection(&self, database: &str, name: &str, kind: CollectionKind) -> TransportResult<()> {
        let mut state = self.state.lock();
        state.calls.push(TransportCall::CreateCollection(name.to_owned(), kind));
        ensure_database(&state, database)?;

        if state.forbidden_collections.contains(name) {
            return Err(TransportError::server(403, ERROR_FORBIDDEN, "forbidden"));
        }

        let key = (database.to_owned(), name.to_owned());

        if state.collections.contains_key(&key) {
            return Err(TransportError::duplicate_name(name));
        }

        state.collections.insert(key, kind);

        Ok(())
    }

    async fn ensure_index(&self, database: &str, collection: &str, index: &IndexSpec) -> TransportResult<()> {
        let mut state = self.state.lock();
        state
            .calls
            .push(TransportCall::EnsureIndex(collection.to_owned(), index.clone()));
        ensure_database(&state, database)?;

        let key = (database.to_owned(), collection.to_owned());

        if !state.collections.contains_key(&key) {
            return Err(TransportError::data_source_not_found(collection));
        }

        let indexes = state.indexes.entry(key).or_default();

        if !indexes.contains(index) {
            indexes.push(index.clone());
        }

        Ok(())
    }

    async fn query(&self, database: &str, query: &AqlQuery) -> TransportResult<Vec<Value>> {
        {
            let mut state = self.state.lock();
            state.calls.push(TransportCall::Query(query.query.clone()));
            state.queries.push(query.clone());
            ensure_database(&state, database)?;
        }

        let reply = (self.handler)(query);

        if let Some(latency) = reply.latency {
            tokio::time::sleep(latency).await;
        }

        reply.result
    }
}
