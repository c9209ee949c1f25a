use query_engine::context::load_schema;
use std::fs;

#[test]
fn schema_files_of_a_directory_are_merged() {
    let dir = tempfile::tempdir().unwrap();

    fs::write(
        dir.path().join("a.graphqls"),
        r#"type Keeper @vertex(collection: "keepers") { name: String }"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("b.graphqls"),
        "extend type Keeper { age: Int }\ntype Query { keepers: [Keeper!]! }",
    )
    .unwrap();
    fs::write(dir.path().join("notes.txt"), "not a schema").unwrap();

    let model = load_schema(dir.path()).unwrap();

    assert!(model.get_type("Keeper").unwrap().field("age").is_some());
    assert_eq!(Some("keepers"), model.collection_for("Keeper"));
}

#[test]
fn a_single_file_is_a_schema() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("zoo.graphqls");

    fs::write(&file, "type Query { version: String }").unwrap();

    let model = load_schema(&file).unwrap();

    assert_eq!("Query", model.query_type().unwrap().name);
}

#[test]
fn directories_without_schema_files_are_rejected() {
    let dir = tempfile::tempdir().unwrap();

    let err = load_schema(dir.path()).unwrap_err();

    assert_eq!(
        format!("No `*.graphqls` files found in {}", dir.path().display()),
        err.to_string()
    );
}
