use crate::{ConfigError, HostAddress, SYSTEM_DATABASE, parse_hosts};
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8529;
const DEFAULT_USER: &str = "root";
const DEFAULT_MAX_CONNECTIONS: usize = 20;

/// How requests are spread over the configured hosts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadBalancingStrategy {
    /// Always use the first host, others are fallbacks.
    #[default]
    None,
    RoundRobin,
    OneRandom,
}

/// Connection settings for ArangoDB.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ArangoConfig {
    /// Database name.
    pub database: String,

    /// Hosts to connect to. Multiple hosts can be added to provide fallbacks in a
    /// single server with active failover or load balancing in a cluster setup.
    pub hosts: Vec<String>,

    /// Username to use for authentication.
    pub user: String,

    /// Password for the user for authentication.
    pub password: Option<String>,

    /// Connection and request timeout in milliseconds. Zero disables it.
    pub timeout_ms: u64,

    /// Use https instead of http.
    pub use_ssl: bool,

    /// Maximum number of idle connections kept per host.
    pub max_connections: usize,

    /// Maximum time to live of an idle connection.
    pub connection_ttl_ms: Option<u64>,

    /// Ask the server for the list of available coordinators on startup.
    pub acquire_host_list: bool,

    pub load_balancing_strategy: LoadBalancingStrategy,
}

impl Default for ArangoConfig {
    fn default() -> Self {
        Self {
            database: SYSTEM_DATABASE.to_owned(),
            hosts: Vec::new(),
            user: DEFAULT_USER.to_owned(),
            password: None,
            timeout_ms: 0,
            use_ssl: false,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connection_ttl_ms: None,
            acquire_host_list: false,
            load_balancing_strategy: LoadBalancingStrategy::default(),
        }
    }
}

impl ArangoConfig {
    /// The validated host list, falling back to the local default server.
    pub fn host_addresses(&self) -> Result<Vec<HostAddress>, ConfigError> {
        if self.hosts.is_empty() {
            return Ok(vec![HostAddress::new(DEFAULT_HOST, DEFAULT_PORT)]);
        }

        parse_hosts(&self.hosts)
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    pub fn connection_ttl(&self) -> Option<Duration> {
        self.connection_ttl_ms.map(Duration::from_millis)
    }
}
