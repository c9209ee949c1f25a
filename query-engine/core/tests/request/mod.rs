use crate::common::*;
use indoc::indoc;
use pretty_assertions::assert_eq;
use query_core::GraphQLRequest;
use serde_json::{Map, Value, json};
use std::{sync::Arc, time::Duration};
use test_setup::{InMemoryTransport, QueryReply};

fn keepers_and_animals() -> Arc<InMemoryTransport> {
    Arc::new(InMemoryTransport::new().with_query_handler(|query| {
        if query.query.starts_with("FOR v_keepers ") {
            QueryReply::records(vec![json!({ "__meta": { "_id": "keepers/ada" }, "name": "Ada" })])
        } else if query.query.starts_with("FOR v_favourite ") {
            QueryReply::records(vec![animal("x", None, json!({ "name": "Nobody" }))])
        } else if query.query.starts_with("FOR v_slow ") {
            QueryReply::records(Vec::new()).delayed(Duration::from_secs(5))
        } else {
            QueryReply::records(vec![animal("rex", Some("dog"), json!({ "name": "Rex", "barks": true }))])
        }
    }))
}

#[tokio::test]
async fn fields_resolve_independently() {
    let handler = handler(keepers_and_animals());
    let query = "{ favourite { name } keepers { name } }";

    let response = handler.handle(GraphQLRequest::new(query)).await;

    let expected = json!({
        "data": {
            "favourite": null,
            "keepers": [{ "name": "Ada" }],
        },
        "errors": [{
            "message": "Could not resolve the concrete type of \"Animal\": the record has no \"kind\" property.",
            "path": ["favourite"],
        }],
    });

    assert_eq!(expected, response.to_json());
}

#[tokio::test(start_paused = true)]
async fn a_timeout_does_not_affect_sibling_fields() {
    let transport = keepers_and_animals();
    let fetcher = fetcher_with_timeout(transport, Some(Duration::from_millis(100)));
    let handler = query_core::RequestHandler::new(Arc::new(fetcher));

    let response = handler
        .handle(GraphQLRequest::new("{ slow: keeper { name } keepers { name } }"))
        .await;

    let expected = json!({
        "data": {
            "slow": null,
            "keepers": [{ "name": "Ada" }],
        },
        "errors": [{
            "message": "Query for field `slow` failed: timed out after 100 ms",
            "path": ["slow"],
        }],
    });

    assert_eq!(expected, response.to_json());
}

#[tokio::test]
async fn fragments_variables_and_directives() {
    let transport = keepers_and_animals();
    let handler = handler(transport.clone());

    let query = indoc! {r#"
        query Zoo($name: String, $withBarks: Boolean = false) {
          animals(name: $name) {
            ...AnimalFields
            ... on Dog {
              barks @include(if: $withBarks)
            }
          }
        }

        fragment AnimalFields on Animal {
          __typename
          name
        }
    "#};

    let mut variables = Map::new();
    variables.insert("name".to_owned(), json!("Rex"));

    let response = handler
        .handle(GraphQLRequest::new(query).with_variables(variables))
        .await;

    assert_eq!(
        json!({ "data": { "animals": [{ "__typename": "Dog", "name": "Rex" }] } }),
        response.to_json()
    );

    let queries = transport.queries();
    assert_eq!(json!("Rex"), queries[0].bind_vars["v_animals_arg_name"]);
    assert!(!queries[0].query.contains("barks"));
}

#[tokio::test]
async fn skipped_fields_are_not_queried() {
    let transport = keepers_and_animals();
    let handler = handler(transport.clone());

    let response = handler
        .handle(GraphQLRequest::new(
            "{ keepers { name address @skip(if: true) { city } } }",
        ))
        .await;

    assert!(response.errors.is_empty());
    assert!(!transport.queries()[0].query.contains("address"));
}

#[tokio::test]
async fn duplicate_fields_are_merged() {
    let transport = keepers_and_animals();
    let handler = handler(transport.clone());

    let response = handler
        .handle(GraphQLRequest::new("{ animals { name } animals { __typename } }"))
        .await;

    assert_eq!(
        json!({ "data": { "animals": [{ "name": "Rex", "__typename": "Dog" }] } }),
        response.to_json()
    );
    assert_eq!(1, transport.queries().len());
}

#[tokio::test]
async fn typename_of_the_query_type() {
    let handler = handler(keepers_and_animals());

    let response = handler.handle(GraphQLRequest::new("{ __typename }")).await;

    assert_eq!(json!({ "data": { "__typename": "Query" } }), response.to_json());
}

#[tokio::test]
async fn mutations_are_rejected() {
    let transport = keepers_and_animals();
    let handler = handler(transport.clone());

    let response = handler
        .handle(GraphQLRequest::new("mutation { addKeeper(name: \"Bob\") { name } }"))
        .await;

    assert_eq!(
        json!({
            "data": null,
            "errors": [{ "message": "Only query operations are supported, got a mutation." }],
        }),
        response.to_json()
    );
    assert!(transport.queries().is_empty());
}

#[tokio::test]
async fn unsupported_selections_fail_the_request() {
    let transport = keepers_and_animals();
    let handler = handler(transport.clone());

    let response = handler
        .handle(GraphQLRequest::new("{ keepers { name } strays { name } }"))
        .await;

    assert_eq!(Value::Null, response.to_json()["data"]);
    assert_eq!(1, response.errors.len());
    assert!(transport.queries().is_empty());
}

const PETS: &str = indoc! {r#"
    union Pet @discriminator(property: "kind") = Dog | Cat

    type Dog @vertex(collection: "pets") @alias(name: "dog") {
      name: String!
      barks: Boolean
      owner: String
    }

    type Cat @vertex(collection: "pets") @alias(name: "cat") {
      name: String!
      lives: Int
      owner: Int
    }

    type Query {
      pets: [Pet!]!
    }
"#};

fn dog_and_cat() -> Arc<InMemoryTransport> {
    Arc::new(InMemoryTransport::new().with_query_handler(|_| {
        QueryReply::records(vec![
            json!({ "__meta": { "_id": "pets/rex", "kind": "dog" }, "name": "Rex", "barks": true }),
            json!({ "__meta": { "_id": "pets/tom", "kind": "cat" }, "name": "Tom", "lives": 9 }),
        ])
    }))
}

#[tokio::test]
async fn union_members_selecting_the_same_field() {
    let handler = handler_for(PETS, dog_and_cat());
    let query = "{ pets { ... on Dog { name barks } ... on Cat { name lives } } }";

    let response = handler.handle(GraphQLRequest::new(query)).await;

    let expected = json!({
        "data": {
            "pets": [
                { "name": "Rex", "barks": true },
                { "name": "Tom", "lives": 9 },
            ],
        },
    });

    assert_eq!(expected, response.to_json());
}

#[tokio::test]
async fn union_members_declaring_a_field_differently() {
    let transport = dog_and_cat();
    let handler = handler_for(PETS, transport.clone());
    let query = "{ pets { ... on Dog { owner } ... on Cat { owner } } }";

    let response = handler.handle(GraphQLRequest::new(query)).await;

    assert_eq!(Value::Null, response.to_json()["data"]);
    assert_eq!(
        "Cannot select field \"owner\" on type \"Pet\": the field is declared differently on \"Dog\" and \"Cat\"",
        response.errors[0].message
    );
    assert!(transport.queries().is_empty());
}

#[tokio::test]
async fn malformed_documents() {
    let handler = handler(keepers_and_animals());

    let response = handler.handle(GraphQLRequest::new("{ keepers { name }")).await;
    assert!(response.errors[0].message.starts_with("Error parsing GraphQL query:"));

    let response = handler.handle(GraphQLRequest::new("{ keepers { ...Missing } }")).await;
    assert_eq!("Unknown fragment \"Missing\".", response.errors[0].message);

    let query = "query A { keepers { name } } query B { keepers { name } }";
    let response = handler.handle(GraphQLRequest::new(query)).await;
    assert_eq!(
        "Must provide operation name if query contains multiple operations.",
        response.errors[0].message
    );
}

#[tokio::test]
async fn requests_deserialize_from_json() {
    let request: GraphQLRequest = serde_json::from_value(json!({
        "query": "query Named { keepers { name } }",
        "operationName": "Named",
    }))
    .unwrap();

    let response = handler(keepers_and_animals()).handle(request).await;

    assert_eq!(json!({ "data": { "keepers": [{ "name": "Ada" }] } }), response.to_json());
}
