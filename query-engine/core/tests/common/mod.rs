use arango_client::{ArangoTransport, SYSTEM_DATABASE};
use graph_schema::{TypeDiscriminatorRegistry, parse_schema};
use indoc::indoc;
use query_core::{DataFetcher, DocumentsFragment, QueryGeneratorChain, RequestHandler, TraversalQueryExecutor};
use serde_json::{Value, json};
use std::{sync::Arc, time::Duration};
use test_setup::InMemoryTransport;

pub(crate) const ZOO: &str = indoc! {r#"
    interface Animal @vertex(collection: "animals") @discriminator(property: "kind") {
      name: String!
      friends: [Animal!]! @edge(collection: "friendships")
    }

    type Dog implements Animal @vertex(collection: "animals") @alias(name: "dog") {
      name: String!
      friends: [Animal!]! @edge(collection: "friendships")
      barks: Boolean
    }

    type Cat implements Animal @vertex(collection: "animals") @alias(name: "cat") {
      name: String!
      friends: [Animal!]! @edge(collection: "friendships")
      keeper: Keeper @edge(collection: "keeps", direction: INBOUND)
      lives: Int
    }

    type Keeper @vertex(collection: "keepers") {
      name: String!
      address: Address
      mentor: Keeper
      pets: [Animal]! @edge(collection: "keeps")
    }

    type Address {
      street: String
      city: String
      neighbours: [Keeper] @edge(collection: "neighbours")
    }

    type Query {
      animals(limit: Int, offset: Int, name: String): [Animal!]!
      favourite: Animal
      keepers(name: String): [Keeper!]!
      keeper(name: String): Keeper
      strays: [Animal!] @edge(collection: "friendships")
      version: String
    }
"#};

pub(crate) fn fetcher(transport: Arc<InMemoryTransport>) -> DataFetcher {
    fetcher_with_timeout(transport, None)
}

pub(crate) fn fetcher_with_timeout(transport: Arc<InMemoryTransport>, timeout: Option<Duration>) -> DataFetcher {
    fetcher_for(ZOO, transport, timeout)
}

pub(crate) fn fetcher_for(schema: &str, transport: Arc<InMemoryTransport>, timeout: Option<Duration>) -> DataFetcher {
    test_setup::init_logger();

    let model = parse_schema(schema).unwrap();
    let registry = TypeDiscriminatorRegistry::new(&model).unwrap();
    let transport: Arc<dyn ArangoTransport> = transport;

    DataFetcher::new(
        Arc::new(model),
        Arc::new(registry),
        QueryGeneratorChain::default(),
        TraversalQueryExecutor::new(transport).with_timeout(timeout),
        SYSTEM_DATABASE,
    )
}

pub(crate) fn handler(transport: Arc<InMemoryTransport>) -> RequestHandler {
    RequestHandler::new(Arc::new(fetcher(transport)))
}

pub(crate) fn handler_for(schema: &str, transport: Arc<InMemoryTransport>) -> RequestHandler {
    RequestHandler::new(Arc::new(fetcher_for(schema, transport, None)))
}

/// The query text followed by the bind variables, for snapshotting.
pub(crate) fn render(fragment: &DocumentsFragment) -> String {
    let query = fragment.render();
    format!(
        "{}\n{}\n",
        query.query,
        serde_json::to_string_pretty(&query.bind_vars).unwrap()
    )
}

/// A projected animal document as the database would return it.
pub(crate) fn animal(key: &str, kind: Option<&str>, fields: Value) -> Value {
    let mut meta = json!({ "_id": format!("animals/{key}") });

    if let Some(kind) = kind {
        meta["kind"] = json!(kind);
    }

    let mut record = json!({ "__meta": meta });

    if let (Some(record), Value::Object(fields)) = (record.as_object_mut(), fields) {
        record.extend(fields);
    }

    record
}
