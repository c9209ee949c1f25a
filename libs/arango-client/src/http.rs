use crate::{
    AqlQuery, ArangoConfig, ArangoTransport, CollectionKind, HostAddress, IndexSpec, LoadBalancingStrategy,
    SYSTEM_DATABASE, TransportError, TransportResult,
};
use async_trait::async_trait;
use rand::Rng;
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

const CURSOR_BATCH_SIZE: u64 = 1000;

/// ArangoDB over its HTTP/JSON API.
#[derive(Debug)]
pub struct HttpTransport {
    client: Client,
    endpoints: Vec<String>,
    strategy: LoadBalancingStrategy,
    /// Starting endpoint for `None` and `OneRandom`.
    primary: usize,
    next_endpoint: AtomicUsize,
    user: String,
    password: Option<String>,
    use_ssl: bool,
}

#[derive(Debug, Deserialize)]
struct CursorBatch {
    #[serde(default)]
    result: Vec<Value>,
    #[serde(rename = "hasMore", default)]
    has_more: bool,
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClusterEndpoints {
    endpoints: Vec<ClusterEndpoint>,
}

#[derive(Debug, Deserialize)]
struct ClusterEndpoint {
    endpoint: String,
}

impl HttpTransport {
    /// Builds the client. Validates the host list and never touches the network.
    pub fn new(config: &ArangoConfig) -> TransportResult<Self> {
        let hosts = config.host_addresses()?;
        let endpoints: Vec<String> = hosts.iter().map(|host| host.base_url(config.use_ssl)).collect();

        let mut builder = Client::builder()
            .pool_max_idle_per_host(config.max_connections)
            .pool_idle_timeout(config.connection_ttl());

        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout).connect_timeout(timeout);
        }

        let client = builder.build().map_err(|err| TransportError::Connection {
            endpoint: endpoints.join(","),
            message: err.to_string(),
        })?;

        let primary = match config.load_balancing_strategy {
            LoadBalancingStrategy::OneRandom => rand::thread_rng().gen_range(0..endpoints.len()),
            _ => 0,
        };

        Ok(Self {
            client,
            endpoints,
            strategy: config.load_balancing_strategy,
            primary,
            next_endpoint: AtomicUsize::new(0),
            user: config.user.clone(),
            password: config.password.clone(),
            use_ssl: config.use_ssl,
        })
    }

    /// Replaces the configured hosts with the coordinators the cluster reports.
    /// Single servers do not offer the endpoint list; the configured hosts stay in place.
    pub async fn acquire_host_list(&mut self) -> TransportResult<()> {
        let payload = match self.send(Method::GET, "/_api/cluster/endpoints", None).await {
            Ok((_, payload)) => payload,
            Err(err @ TransportError::Server { .. }) => {
                debug!("Not acquiring host list: {err}");
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        let reported: ClusterEndpoints =
            serde_json::from_value(payload).map_err(|err| TransportError::InvalidResponse(err.to_string()))?;

        let endpoints: Vec<String> = reported
            .endpoints
            .iter()
            .filter_map(|endpoint| {
                let address = endpoint
                    .endpoint
                    .trim_start_matches("tcp://")
                    .trim_start_matches("ssl://")
                    .trim_start_matches("http://")
                    .trim_start_matches("https://");

                match address.parse::<HostAddress>() {
                    Ok(host) => Some(host.base_url(self.use_ssl)),
                    Err(_) => {
                        warn!("Ignoring unsupported endpoint `{}` reported by the cluster", endpoint.endpoint);
                        None
                    }
                }
            })
            .collect();

        if !endpoints.is_empty() {
            info!("Acquired {} coordinator endpoints", endpoints.len());
            self.endpoints = endpoints;
            self.primary = 0;
        }

        Ok(())
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    fn first_endpoint(&self) -> usize {
        match self.strategy {
            LoadBalancingStrategy::RoundRobin => self.next_endpoint.fetch_add(1, Ordering::Relaxed) % self.endpoints.len(),
            LoadBalancingStrategy::None | LoadBalancingStrategy::OneRandom => self.primary,
        }
    }

    /// Sends to the selected endpoint, failing over to the next ones on connection errors.
    /// Returns the endpoint that answered.
    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> TransportResult<(&str, Value)> {
        let first = self.first_endpoint();
        let mut last_error = None;

        for attempt in 0..self.endpoints.len() {
            let endpoint = &self.endpoints[(first + attempt) % self.endpoints.len()];

            match self.send_to(endpoint, method.clone(), path, body).await {
                Ok(payload) => return Ok((endpoint.as_str(), payload)),
                Err(err @ TransportError::Connection { .. }) => {
                    debug!("Request to {endpoint} failed, trying next host: {err}");
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_error.unwrap_or_else(|| TransportError::InvalidResponse("no endpoints configured".to_owned())))
    }

    async fn send_to(&self, endpoint: &str, method: Method, path: &str, body: Option<&Value>) -> TransportResult<Value> {
        let url = format!("{endpoint}{path}");
        debug!(target: "arango_client::http", method = %method, url = %url);

        let mut request = self
            .client
            .request(method, &url)
            .basic_auth(&self.user, self.password.as_ref());

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|err| TransportError::Connection {
            endpoint: endpoint.to_owned(),
            message: err.to_string(),
        })?;

        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|err| TransportError::InvalidResponse(err.to_string()))?;

        if status.is_success() {
            Ok(payload)
        } else {
            Err(server_error(status, &payload))
        }
    }
}

fn server_error(status: StatusCode, payload: &Value) -> TransportError {
    let error_num = payload.get("errorNum").and_then(Value::as_i64).unwrap_or_default();
    let message = payload
        .get("errorMessage")
        .and_then(Value::as_str)
        .or_else(|| status.canonical_reason())
        .unwrap_or("unknown error");

    TransportError::server(status.as_u16(), error_num, message)
}

#[async_trait]
impl ArangoTransport for HttpTransport {
    async fn create_database(&self, name: &str) -> TransportResult<()> {
        let path = format!("/_db/{SYSTEM_DATABASE}/_api/database");
        self.send(Method::POST, &path, Some(&json!({ "name": name }))).await?;

        Ok(())
    }

    async fn collection_kind(&self, database: &str, name: &str) -> TransportResult<Option<CollectionKind>> {
        let path = format!("/_db/{database}/_api/collection/{name}");

        match self.send(Method::GET, &path, None).await {
            Ok((_, payload)) => {
                let code = payload.get("type").and_then(Value::as_u64).unwrap_or_default();

                CollectionKind::from_type_code(code)
                    .map(Some)
                    .ok_or_else(|| TransportError::InvalidResponse(format!("unknown collection type {code} for `{name}`")))
            }
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn create_collection(&self, database: &str, name: &str, kind: CollectionKind) -> TransportResult<()> {
        let path = format!("/_db/{database}/_api/collection");
        let body = json!({ "name": name, "type": kind.type_code() });
        self.send(Method::POST, &path, Some(&body)).await?;

        Ok(())
    }

    async fn ensure_index(&self, database: &str, collection: &str, index: &IndexSpec) -> TransportResult<()> {
        let path = format!("/_db/{database}/_api/index?collection={collection}");
        let body = json!({
            "type": index.kind,
            "fields": index.fields,
            "unique": index.unique,
            "sparse": index.sparse,
        });

        self.send(Method::POST, &path, Some(&body)).await?;

        Ok(())
    }

    async fn query(&self, database: &str, query: &AqlQuery) -> TransportResult<Vec<Value>> {
        let path = format!("/_db/{database}/_api/cursor");
        let body = json!({
            "query": query.query,
            "bindVars": query.bind_vars,
            "batchSize": CURSOR_BATCH_SIZE,
        });

        // Cursor continuations must be sent to the coordinator holding the cursor.
        let (endpoint, payload) = self.send(Method::POST, &path, Some(&body)).await?;
        let mut batch = parse_batch(payload)?;
        let mut records = std::mem::take(&mut batch.result);

        while batch.has_more {
            let id = batch
                .id
                .take()
                .ok_or_else(|| TransportError::InvalidResponse("cursor has more results but no id".to_owned()))?;

            let next_path = format!("/_db/{database}/_api/cursor/{id}");
            batch = parse_batch(self.send_to(endpoint, Method::PUT, &next_path, None).await?)?;
            records.append(&mut batch.result);
        }

        Ok(records)
    }
}

fn parse_batch(payload: Value) -> TransportResult<CursorBatch> {
    serde_json::from_value(payload).map_err(|err| TransportError::InvalidResponse(err.to_string()))
}
