use crate::common::*;
use arango_client::TransportError;
use pretty_assertions::assert_eq;
use query_core::{FetchParent, FieldPath, FieldSelection, ResultNode};
use serde_json::json;
use std::{sync::Arc, time::Duration};
use test_setup::{InMemoryTransport, QueryReply};

fn field(name: &str) -> FieldSelection {
    FieldSelection::with_name(name)
}

fn polymorphic_selection() -> FieldSelection {
    field("animals")
        .nested(field("__typename"))
        .nested(field("name"))
        .nested(field("barks").on_type("Dog"))
        .nested(field("lives").on_type("Cat"))
}

#[tokio::test]
async fn records_are_tagged_with_their_concrete_type() {
    let transport = Arc::new(InMemoryTransport::new().with_query_handler(|_| {
        QueryReply::records(vec![
            animal("rex", Some("dog"), json!({ "name": "Rex", "barks": true, "lives": null })),
            animal("tom", Some("Cat"), json!({ "name": "Tom", "barks": null, "lives": 9 })),
        ])
    }));

    let result = fetcher(transport.clone())
        .fetch(&polymorphic_selection(), &FetchParent::Root)
        .await;

    assert_eq!(Vec::<query_core::FieldError>::new(), result.errors);

    let data = result.data.unwrap();
    let items = data.as_list().unwrap();

    assert_eq!("Dog", items[0].as_object().unwrap().type_name);
    assert_eq!("Cat", items[1].as_object().unwrap().type_name);

    assert_eq!(
        json!([
            { "__typename": "Dog", "name": "Rex", "barks": true },
            { "__typename": "Cat", "name": "Tom", "lives": 9 },
        ]),
        data.to_json()
    );

    assert_eq!(1, transport.queries().len());
}

#[tokio::test]
async fn empty_traversals_yield_empty_lists() {
    let transport = Arc::new(InMemoryTransport::new());
    let parent = FetchParent::Record {
        type_name: "Keeper".to_owned(),
        id: "keepers/ada".to_owned(),
    };

    let result = fetcher(transport.clone())
        .fetch(&field("pets").nested(field("name")), &parent)
        .await;

    assert!(result.errors.is_empty());
    assert_eq!(Some(ResultNode::List(Vec::new())), result.data);

    let queries = transport.queries();
    assert_eq!(json!("keepers/ada"), queries[0].bind_vars["start"]);
}

#[tokio::test]
async fn nested_relations_are_shaped_from_the_projection() {
    let transport = Arc::new(InMemoryTransport::new().with_query_handler(|_| {
        QueryReply::records(vec![json!({
            "__meta": { "_id": "keepers/ada" },
            "name": "Ada",
            "address": { "street": "Main St 1", "city": "Springfield" },
            "pets": [animal("rex", Some("Dog"), json!({ "name": "Rex", "friends": [] }))],
        })])
    }));

    let selection = field("keeper")
        .argument("name", "Ada")
        .nested(field("name"))
        .nested(field("address").nested(field("city")))
        .nested(
            field("pets")
                .nested(field("__typename"))
                .nested(field("name"))
                .nested(field("friends").nested(field("name"))),
        );

    let result = fetcher(transport).fetch(&selection, &FetchParent::Root).await;

    assert!(result.errors.is_empty());
    assert_eq!(
        json!({
            "name": "Ada",
            "address": { "city": "Springfield" },
            "pets": [{ "__typename": "Dog", "name": "Rex", "friends": [] }],
        }),
        result.data.unwrap().to_json()
    );
}

#[tokio::test]
async fn missing_discriminator_on_a_nullable_field_yields_null() {
    let transport = Arc::new(
        InMemoryTransport::new()
            .with_query_handler(|_| QueryReply::records(vec![animal("x", None, json!({ "name": "Nobody" }))])),
    );

    let result = fetcher(transport)
        .fetch(&field("favourite").nested(field("name")), &FetchParent::Root)
        .await;

    assert_eq!(Some(ResultNode::Null), result.data);
    assert_eq!(1, result.errors.len());
    assert_eq!(FieldPath::root().key("favourite"), result.errors[0].path);
    assert_eq!(
        "Could not resolve the concrete type of \"Animal\": the record has no \"kind\" property.",
        result.errors[0].message
    );
}

#[tokio::test]
async fn unresolved_items_of_nullable_lists_are_null() {
    let transport = Arc::new(InMemoryTransport::new().with_query_handler(|_| {
        QueryReply::records(vec![
            animal("x", Some("bird"), json!({ "name": "Tweety" })),
            animal("rex", Some("dog"), json!({ "name": "Rex" })),
        ])
    }));

    let parent = FetchParent::Record {
        type_name: "Keeper".to_owned(),
        id: "keepers/ada".to_owned(),
    };

    let result = fetcher(transport)
        .fetch(&field("pets").nested(field("name")), &parent)
        .await;

    assert_eq!(json!([null, { "name": "Rex" }]), result.data.unwrap().to_json());
    assert_eq!(1, result.errors.len());
    assert_eq!("pets.0", result.errors[0].path.to_string());
}

#[tokio::test]
async fn errors_at_non_null_positions_propagate_to_the_parent() {
    let transport = Arc::new(InMemoryTransport::new().with_query_handler(|_| {
        QueryReply::records(vec![
            animal("rex", Some("dog"), json!({ "name": "Rex" })),
            animal("x", None, json!({ "name": "Nobody" })),
        ])
    }));

    let result = fetcher(transport)
        .fetch(&field("animals").nested(field("name")), &FetchParent::Root)
        .await;

    // `animals: [Animal!]!` cannot be null, so the parent has to be.
    assert_eq!(None, result.data);
    assert_eq!(1, result.errors.len());
    assert_eq!("animals.1", result.errors[0].path.to_string());
}

#[tokio::test]
async fn null_for_a_required_scalar_nulls_the_object() {
    let transport = Arc::new(InMemoryTransport::new().with_query_handler(|_| {
        QueryReply::records(vec![json!({ "__meta": { "_id": "keepers/x" }, "name": null })])
    }));

    let result = fetcher(transport)
        .fetch(&field("keeper").nested(field("name")), &FetchParent::Root)
        .await;

    assert_eq!(Some(ResultNode::Null), result.data);
    assert_eq!(
        "Inconsistent query result: Field name is required to return data, got `null` instead.",
        result.errors[0].message
    );
    assert_eq!("keeper.name", result.errors[0].path.to_string());
}

#[tokio::test]
async fn transport_errors_are_reported_with_the_field_path() {
    let transport = Arc::new(InMemoryTransport::new().with_query_handler(|_| {
        QueryReply::error(TransportError::server(400, 1501, "syntax error, unexpected FOR"))
    }));

    let result = fetcher(transport)
        .fetch(&field("keeper").nested(field("name")), &FetchParent::Root)
        .await;

    assert_eq!(Some(ResultNode::Null), result.data);
    assert_eq!(
        "Query for field `keeper` failed: ArangoDB returned error 1501 (HTTP 400): syntax error, unexpected FOR",
        result.errors[0].message
    );
}

#[tokio::test(start_paused = true)]
async fn slow_queries_time_out() {
    let transport = Arc::new(InMemoryTransport::new().with_query_handler(|_| {
        QueryReply::records(Vec::new()).delayed(Duration::from_secs(5))
    }));

    let fetcher = fetcher_with_timeout(transport, Some(Duration::from_millis(50)));
    let result = fetcher.fetch(&field("keeper").nested(field("name")), &FetchParent::Root).await;

    assert_eq!(Some(ResultNode::Null), result.data);
    assert_eq!(
        "Query for field `keeper` failed: timed out after 50 ms",
        result.errors[0].message
    );
}

#[tokio::test]
async fn typename_of_the_parent_needs_no_query() {
    let transport = Arc::new(InMemoryTransport::new());

    let result = fetcher(transport.clone())
        .fetch(&field("__typename"), &FetchParent::Root)
        .await;

    assert_eq!(Some(ResultNode::Scalar(json!("Query"))), result.data);
    assert!(transport.queries().is_empty());
}

#[tokio::test]
async fn unsupported_selections_are_reported_without_a_query() {
    let transport = Arc::new(InMemoryTransport::new());

    let result = fetcher(transport.clone())
        .fetch(&field("version"), &FetchParent::Root)
        .await;

    assert_eq!(None, result.data);
    assert_eq!(1, result.errors.len());
    assert!(transport.queries().is_empty());
}
