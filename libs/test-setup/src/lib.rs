#![deny(unsafe_code, rust_2018_idioms)]

//! Utilities for testing the engines without a running ArangoDB.

mod logging;
mod transport;

pub use logging::init_logger;
pub use transport::{InMemoryTransport, QueryReply, TransportCall};
