use crate::common::*;
use expect_test::expect;
use graph_schema::Direction;
use pretty_assertions::assert_eq;
use query_core::{
    Cardinality, DocumentSource, FetchParent, FieldSelection, QueryGeneratorChain, TraversalStart,
};
use std::sync::Arc;
use test_setup::InMemoryTransport;

fn field(name: &str) -> FieldSelection {
    FieldSelection::with_name(name)
}

fn compile_error(selection: FieldSelection) -> String {
    let fetcher = fetcher(Arc::new(InMemoryTransport::new()));
    fetcher.compile(&selection, &FetchParent::Root).unwrap_err().to_string()
}

#[test]
fn generators_run_in_a_fixed_order() {
    let chain = QueryGeneratorChain::default();

    assert_eq!(
        vec!["edge_traversal", "discriminated_vertex", "vertex_lookup", "attribute"],
        chain.names().collect::<Vec<_>>()
    );
}

#[test]
fn polymorphic_root_field_with_nested_traversal() {
    let fetcher = fetcher(Arc::new(InMemoryTransport::new()));
    let selection = field("animals")
        .argument("limit", 10)
        .nested(field("__typename"))
        .nested(field("name"))
        .nested(field("barks").on_type("Dog"))
        .nested(field("friends").nested(field("name")));

    let fragment = fetcher.compile(&selection, &FetchParent::Root).unwrap();

    assert_eq!(DocumentSource::Collection("animals".to_owned()), fragment.source);
    assert_eq!(Some("kind"), fragment.discriminator.as_deref());
    assert_eq!(Cardinality::Many, fragment.cardinality);

    let expected = expect![[r#"
        FOR v_animals IN @@v_animals_collection
          LIMIT @v_animals_limit
          RETURN {"__meta": {"_id": v_animals._id, "kind": v_animals.`kind`}, "name": v_animals.`name`, "barks": v_animals.`barks`, "friends": (FOR v_animals_friends IN 1..1 OUTBOUND v_animals @@v_animals_friends_edges RETURN {"__meta": {"_id": v_animals_friends._id, "kind": v_animals_friends.`kind`}, "name": v_animals_friends.`name`})}
        {
          "@v_animals_collection": "animals",
          "v_animals_limit": 10,
          "@v_animals_friends_edges": "friendships"
        }
    "#]];

    expected.assert_eq(&render(&fragment));
}

#[test]
fn single_vertex_lookup_with_filter_and_embedded_object() {
    let fetcher = fetcher(Arc::new(InMemoryTransport::new()));
    let selection = field("keeper")
        .argument("name", "Ada")
        .nested(field("name"))
        .nested(field("address").nested(field("city")))
        .nested(field("pets").argument("limit", 2).nested(field("name")));

    let fragment = fetcher.compile(&selection, &FetchParent::Root).unwrap();

    assert_eq!(Cardinality::One, fragment.cardinality);
    assert_eq!(None, fragment.discriminator);

    let expected = expect![[r#"
        FOR v_keeper IN @@v_keeper_collection
          FILTER v_keeper.`name` == @v_keeper_arg_name
          LIMIT 1
          RETURN {"__meta": {"_id": v_keeper._id}, "name": v_keeper.`name`, "address": v_keeper.`address`, "pets": (FOR v_keeper_pets IN 1..1 OUTBOUND v_keeper @@v_keeper_pets_edges LIMIT @v_keeper_pets_limit RETURN {"__meta": {"_id": v_keeper_pets._id, "kind": v_keeper_pets.`kind`}, "name": v_keeper_pets.`name`})}
        {
          "@v_keeper_collection": "keepers",
          "v_keeper_arg_name": "Ada",
          "@v_keeper_pets_edges": "keeps",
          "v_keeper_pets_limit": 2
        }
    "#]];

    expected.assert_eq(&render(&fragment));
}

#[test]
fn single_relation_is_wrapped_in_first() {
    let fetcher = fetcher(Arc::new(InMemoryTransport::new()));
    let selection = field("animals")
        .nested(field("keeper").on_type("Cat").nested(field("name")));

    let fragment = fetcher.compile(&selection, &FetchParent::Root).unwrap();

    let expected = expect![[r#"
        FOR v_animals IN @@v_animals_collection
          RETURN {"__meta": {"_id": v_animals._id, "kind": v_animals.`kind`}, "keeper": FIRST(FOR v_animals_keeper IN 1..1 INBOUND v_animals @@v_animals_keeper_edges LIMIT 1 RETURN {"__meta": {"_id": v_animals_keeper._id}, "name": v_animals_keeper.`name`})}
        {
          "@v_animals_collection": "animals",
          "@v_animals_keeper_edges": "keeps"
        }
    "#]];

    expected.assert_eq(&render(&fragment));
}

#[test]
fn offset_without_limit() {
    let fetcher = fetcher(Arc::new(InMemoryTransport::new()));
    let selection = field("animals").argument("offset", 20).nested(field("name"));

    let fragment = fetcher.compile(&selection, &FetchParent::Root).unwrap();

    let expected = expect![[r#"
        FOR v_animals IN @@v_animals_collection
          LIMIT @v_animals_offset, @v_animals_limit
          RETURN {"__meta": {"_id": v_animals._id, "kind": v_animals.`kind`}, "name": v_animals.`name`}
        {
          "@v_animals_collection": "animals",
          "v_animals_offset": 20,
          "v_animals_limit": 9007199254740991
        }
    "#]];

    expected.assert_eq(&render(&fragment));
}

#[test]
fn fields_of_a_fetched_record_traverse_from_the_start_vertex() {
    let fetcher = fetcher(Arc::new(InMemoryTransport::new()));
    let parent = FetchParent::Record {
        type_name: "cat".to_owned(),
        id: "animals/tom".to_owned(),
    };

    let fragment = fetcher
        .compile(&field("keeper").nested(field("name")), &parent)
        .unwrap();

    assert!(fragment.traverses_from_start());

    let expected = expect![[r#"
        FOR v_keeper IN 1..1 INBOUND @start @@v_keeper_edges
          LIMIT 1
          RETURN {"__meta": {"_id": v_keeper._id}, "name": v_keeper.`name`}
        {
          "@v_keeper_edges": "keeps"
        }
    "#]];

    expected.assert_eq(&render(&fragment));
}

#[test]
fn relation_decides_the_query_shape_over_the_discriminator() {
    let fetcher = fetcher(Arc::new(InMemoryTransport::new()));
    let parent = FetchParent::Record {
        type_name: "Keeper".to_owned(),
        id: "keepers/ada".to_owned(),
    };

    let fragment = fetcher
        .compile(&field("pets").nested(field("name")), &parent)
        .unwrap();

    assert_eq!(
        DocumentSource::Traversal {
            start: TraversalStart::BindParameter,
            direction: Direction::Outbound,
            edge_collection: "keeps".to_owned(),
        },
        fragment.source
    );

    // The discriminator is still read, for resolving the records afterwards.
    assert_eq!(Some("kind"), fragment.discriminator.as_deref());
}

#[test]
fn compilation_is_deterministic() {
    let fetcher = fetcher(Arc::new(InMemoryTransport::new()));
    let selection = field("keepers")
        .nested(field("name"))
        .nested(field("pets").nested(field("__typename")).nested(field("friends").nested(field("name"))));

    let first = fetcher.compile(&selection, &FetchParent::Root).unwrap();
    let second = fetcher.compile(&selection, &FetchParent::Root).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.render(), second.render());
}

#[test]
fn aliases_name_the_variables() {
    let fetcher = fetcher(Arc::new(InMemoryTransport::new()));
    let selection = field("keepers")
        .alias("staff")
        .nested(field("pets").alias("animals").nested(field("name")));

    let fragment = fetcher.compile(&selection, &FetchParent::Root).unwrap();
    let nested = fragment.projection["animals"].as_documents().unwrap();

    assert_eq!("v_staff", fragment.variable);
    assert_eq!("v_staff_animals", nested.variable);
}

#[test]
fn underscores_in_aliases_keep_variables_apart() {
    let fetcher = fetcher(Arc::new(InMemoryTransport::new()));
    let selection = field("keepers")
        .nested(
            field("pets")
                .alias("x")
                .nested(field("friends").alias("y_z").nested(field("name"))),
        )
        .nested(
            field("pets")
                .alias("x_y")
                .nested(field("keeper").alias("z").on_type("Cat").nested(field("name"))),
        );

    let fragment = fetcher.compile(&selection, &FetchParent::Root).unwrap();
    let friends = fragment.projection["x"].as_documents().unwrap().projection["y_z"]
        .as_documents()
        .unwrap();
    let keeper = fragment.projection["x_y"].as_documents().unwrap().projection["z"]
        .as_documents()
        .unwrap();

    assert_eq!("v_keepers_x_y_0z", friends.variable);
    assert_eq!("v_keepers_x_0y_z", keeper.variable);

    let query = fragment.render();
    let bind_vars = query
        .bind_vars
        .iter()
        .map(|(name, value)| format!("{name} = {value}"))
        .collect::<Vec<_>>()
        .join("\n");

    let expected = expect![[r#"
        @v_keepers_collection = "keepers"
        @v_keepers_x_edges = "keeps"
        @v_keepers_x_y_0z_edges = "friendships"
        @v_keepers_x_0y_edges = "keeps"
        @v_keepers_x_0y_z_edges = "keeps""#]];

    expected.assert_eq(&bind_vars);
}

#[test]
fn unknown_fields_are_unsupported() {
    let expected = expect![[r#"Cannot select field "unicorns" on type "Query": the type has no such field"#]];
    expected.assert_eq(&compile_error(field("unicorns").nested(field("name"))));
}

#[test]
fn relations_on_the_query_type_are_unsupported() {
    let expected = expect![[
        r#"Cannot select field "strays" on type "Query": the field is a relation, but there is no document to traverse from"#
    ]];
    expected.assert_eq(&compile_error(field("strays").nested(field("name"))));
}

#[test]
fn scalars_on_the_query_type_are_unsupported() {
    let expected = expect![[
        r#"Cannot select field "version" on type "Query": only fields returning stored documents can be fetched here"#
    ]];
    expected.assert_eq(&compile_error(field("version")));
}

#[test]
fn selection_sets_must_match_the_type() {
    let expected = expect![[r#"Cannot select field "version" on type "Query": "String" has no fields to select"#]];
    expected.assert_eq(&compile_error(field("version").nested(field("length"))));

    let expected = expect![[
        r#"Cannot select field "keepers" on type "Query": a selection of the fields of "Keeper" is required"#
    ]];
    expected.assert_eq(&compile_error(field("keepers")));
}

#[test]
fn relations_inside_embedded_objects_are_unsupported() {
    let selection = field("keepers").nested(field("address").nested(field("neighbours").nested(field("name"))));

    let expected = expect![[
        r#"Cannot select field "neighbours" on type "Address": relations of embedded objects cannot be traversed"#
    ]];
    expected.assert_eq(&compile_error(selection));
}

#[test]
fn stored_types_need_a_relation() {
    let selection = field("keepers").nested(field("mentor").nested(field("name")));

    let expected = expect![[
        r#"Cannot select field "mentor" on type "Keeper": the field returns the stored type "Keeper", but has no @edge directive"#
    ]];
    expected.assert_eq(&compile_error(selection));
}

#[test]
fn pagination_arguments_are_validated() {
    let selection = field("animals").argument("limit", -1).nested(field("name"));

    let expected = expect![[
        r#"Cannot select field "animals" on type "Query": argument `limit` must be a non-negative integer, got `-1`"#
    ]];
    expected.assert_eq(&compile_error(selection));
}

#[test]
fn type_conditions_must_apply() {
    let selection = field("keepers").nested(field("name").on_type("Dog"));

    let expected = expect![[r#"Cannot select field "name" on type "Keeper": the type condition "Dog" can never apply to "Keeper""#]];
    expected.assert_eq(&compile_error(selection));
}
