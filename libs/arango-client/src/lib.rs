#![deny(rust_2018_idioms, unsafe_code)]

//! The storage side of the engine: how to reach ArangoDB and what can be asked
//! of it. The query and schema engines only ever talk to the database through
//! the [ArangoTransport](trait.ArangoTransport.html) trait.

mod config;
mod error;
mod host;
mod http;
mod query;
mod transport;

pub use config::{ArangoConfig, LoadBalancingStrategy};
pub use error::{ConfigError, TransportError, TransportResult};
pub use host::{HostAddress, parse_hosts};
pub use http::HttpTransport;
pub use query::{AqlQuery, CollectionKind, IndexKind, IndexSpec};
pub use transport::ArangoTransport;

/// The database every ArangoDB deployment has, and the default target.
pub const SYSTEM_DATABASE: &str = "_system";
