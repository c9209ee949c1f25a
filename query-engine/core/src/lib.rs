#![deny(rust_2018_idioms, unsafe_code)]

//! Compiles GraphQL field selections into ArangoDB traversal queries, runs them and
//! shapes the records into type tagged result trees.

pub mod generator;

mod error;
mod executor;
mod fetcher;
mod fragment;
mod path;
mod request;
mod response;
mod selection;

pub use error::*;
pub use executor::TraversalQueryExecutor;
pub use fetcher::{DataFetcher, FetchParent, FetchResult, PreparedField, ResolvedRecord};
pub use fragment::*;
pub use generator::QueryGeneratorChain;
pub use path::{FieldPath, PathSegment};
pub use request::{GraphQLError, GraphQLRequest, GraphQLResponse, RequestHandler};
pub use response::{ResultNode, ResultObject};
pub use selection::{FieldSelection, SelectionArgument};
