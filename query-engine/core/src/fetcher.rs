use crate::{
    Cardinality, DocumentsFragment, FetchError, FieldError, FieldPath, FieldSelection, META_KEY, QueryFragment,
    QueryGeneratorChain, ResultNode, ResultObject, TraversalQueryExecutor, UnsupportedSelectionError,
    generator::{Compiler, Scope},
};
use graph_schema::{DirectiveModel, FieldDeclaration, TypeDiscriminatorRegistry, TypeRef};
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;

/// What a field is fetched for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchParent {
    /// A field of the query type.
    Root,
    /// A field of a record the caller already holds.
    Record { type_name: String, id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult {
    /// `None` when a non-null field failed, so its parent has to be null.
    pub data: Option<ResultNode>,
    pub errors: Vec<FieldError>,
}

/// A stored document with its resolved concrete type and the selection it answers.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedRecord<'a> {
    pub record: &'a Value,
    pub type_name: &'a str,
    pub selection: &'a FieldSelection,
}

/// A field compiled and ready to run.
#[derive(Debug, Clone)]
pub enum PreparedField<'a> {
    /// `__typename`, answered without a query.
    TypeName(String),
    Query {
        field: &'a FieldDeclaration,
        selection: &'a FieldSelection,
        fragment: DocumentsFragment,
        start: Option<String>,
    },
}

/// Entry point for resolving one field selection: compiles it, runs the query and
/// shapes the records into a type tagged result tree. Shares the read-only schema
/// state, so one instance serves concurrent requests.
#[derive(Debug, Clone)]
pub struct DataFetcher {
    model: Arc<DirectiveModel>,
    registry: Arc<TypeDiscriminatorRegistry>,
    chain: QueryGeneratorChain,
    executor: TraversalQueryExecutor,
    database: String,
}

impl DataFetcher {
    pub fn new(
        model: Arc<DirectiveModel>,
        registry: Arc<TypeDiscriminatorRegistry>,
        chain: QueryGeneratorChain,
        executor: TraversalQueryExecutor,
        database: impl Into<String>,
    ) -> Self {
        Self {
            model,
            registry,
            chain,
            executor,
            database: database.into(),
        }
    }

    pub fn model(&self) -> &DirectiveModel {
        &self.model
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Resolves `selection` for `parent`. Errors are reported in the result.
    pub async fn fetch(&self, selection: &FieldSelection, parent: &FetchParent) -> FetchResult {
        let path = FieldPath::root().key(selection.response_key());

        match self.prepare(selection, parent) {
            Ok(prepared) => self.execute_prepared(&prepared, &path).await,
            Err(err) => {
                let error = FieldError::new(&FetchError::from(err), path);

                FetchResult {
                    data: None,
                    errors: vec![error],
                }
            }
        }
    }

    /// Compiles the selection into the documents fragment that answers it.
    pub fn compile(
        &self,
        selection: &FieldSelection,
        parent: &FetchParent,
    ) -> Result<DocumentsFragment, UnsupportedSelectionError> {
        match self.prepare(selection, parent)? {
            PreparedField::Query { fragment, .. } => Ok(fragment),
            PreparedField::TypeName(type_name) => Err(UnsupportedSelectionError::new(
                type_name,
                selection.name(),
                "`__typename` is answered without a query",
            )),
        }
    }

    pub fn prepare<'a>(
        &'a self,
        selection: &'a FieldSelection,
        parent: &FetchParent,
    ) -> Result<PreparedField<'a>, UnsupportedSelectionError> {
        let model = self.model.as_ref();

        let (parent_type, scope, start) = match parent {
            FetchParent::Root => {
                let query_type = model.query_type().ok_or_else(|| {
                    UnsupportedSelectionError::new("Query", selection.name(), "the schema declares no query type")
                })?;

                (query_type.name.as_str(), Scope::Root, None)
            }
            FetchParent::Record { type_name, id } => {
                let declaration = model
                    .canonical_type(type_name)
                    .and_then(|name| model.get_type(name))
                    .ok_or_else(|| {
                        UnsupportedSelectionError::new(type_name.as_str(), selection.name(), "unknown parent type")
                    })?;

                (declaration.name.as_str(), Scope::StartVertex, Some(id.clone()))
            }
        };

        if selection.is_typename() {
            return Ok(PreparedField::TypeName(parent_type.to_owned()));
        }

        let compiler = Compiler {
            model,
            registry: &self.registry,
            chain: &self.chain,
        };

        let fragment = match compiler.compile_field(parent_type, selection, scope, &[])? {
            QueryFragment::Documents(documents) => *documents,
            QueryFragment::Attribute(_) => {
                return Err(UnsupportedSelectionError::new(
                    parent_type,
                    selection.name(),
                    "only fields returning stored documents can be fetched here",
                ));
            }
        };

        let field = model
            .get_type(parent_type)
            .and_then(|t| t.field(selection.name()))
            .ok_or_else(|| UnsupportedSelectionError::new(parent_type, selection.name(), "the type has no such field"))?;

        Ok(PreparedField::Query {
            field,
            selection,
            fragment,
            start,
        })
    }

    /// Runs a prepared field and shapes its records. `path` is the response path of the field.
    pub async fn execute_prepared(&self, prepared: &PreparedField<'_>, path: &FieldPath) -> FetchResult {
        let (field, selection, fragment, start) = match prepared {
            PreparedField::TypeName(type_name) => {
                return FetchResult {
                    data: Some(ResultNode::Scalar(Value::String(type_name.clone()))),
                    errors: Vec::new(),
                };
            }
            PreparedField::Query {
                field,
                selection,
                fragment,
                start,
            } => (*field, *selection, fragment, start.as_deref()),
        };

        let mut shaper = Shaper {
            model: &self.model,
            registry: &self.registry,
            errors: Vec::new(),
        };

        let data = match self.executor.execute(fragment, &self.database, start, path).await {
            Ok(records) => {
                let value = match fragment.cardinality {
                    Cardinality::Many => Value::Array(records),
                    Cardinality::One => records.into_iter().next().unwrap_or(Value::Null),
                };

                shaper
                    .complete(&field.field_type, &value, selection, Source::Document, path)
                    .ok()
            }
            Err(err) => {
                shaper.error(FetchError::from(err), path);

                if field.field_type.is_non_null() {
                    None
                } else {
                    Some(ResultNode::Null)
                }
            }
        };

        FetchResult {
            data,
            errors: shaper.errors,
        }
    }
}

/// Marks a null that has to propagate to the nearest nullable ancestor. The error
/// causing it is already recorded.
struct Bubble;

type Completion = Result<ResultNode, Bubble>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    /// A projected document: fields are keyed by response key.
    Document,
    /// A raw object stored inside a document: fields are keyed by field name.
    Embedded,
}

struct Shaper<'a> {
    model: &'a DirectiveModel,
    registry: &'a TypeDiscriminatorRegistry,
    errors: Vec<FieldError>,
}

impl<'a> Shaper<'a> {
    fn error(&mut self, error: FetchError, path: &FieldPath) {
        self.errors.push(FieldError::new(&error, path.clone()));
    }

    fn complete(
        &mut self,
        field_type: &'a TypeRef,
        value: &Value,
        selection: &FieldSelection,
        source: Source,
        path: &FieldPath,
    ) -> Completion {
        match field_type {
            TypeRef::NonNull(inner) => {
                let node = self.complete_nullable(inner, value, selection, source, path)?;

                if node.is_null() {
                    self.error(FetchError::null_value(selection.name()), path);
                    return Err(Bubble);
                }

                Ok(node)
            }
            nullable => Ok(self
                .complete_nullable(nullable, value, selection, source, path)
                .unwrap_or(ResultNode::Null)),
        }
    }

    fn complete_nullable(
        &mut self,
        field_type: &'a TypeRef,
        value: &Value,
        selection: &FieldSelection,
        source: Source,
        path: &FieldPath,
    ) -> Completion {
        if value.is_null() {
            return Ok(ResultNode::Null);
        }

        match field_type {
            TypeRef::NonNull(_) => self.complete(field_type, value, selection, source, path),
            TypeRef::List(item_type) => {
                let Value::Array(items) = value else {
                    return Err(self.invalid_value(selection, "a list", value, path));
                };

                let mut nodes = Vec::with_capacity(items.len());

                for (index, item) in items.iter().enumerate() {
                    nodes.push(self.complete(item_type, item, selection, source, &path.index(index))?);
                }

                Ok(ResultNode::List(nodes))
            }
            TypeRef::Named(type_name) => self.complete_named(type_name, value, selection, source, path),
        }
    }

    fn complete_named(
        &mut self,
        type_name: &'a str,
        value: &Value,
        selection: &FieldSelection,
        source: Source,
        path: &FieldPath,
    ) -> Completion {
        let registry = self.registry;

        if self.model.is_leaf_type(type_name) {
            return Ok(ResultNode::Scalar(value.clone()));
        }

        if !value.is_object() {
            return Err(self.invalid_value(selection, "an object", value, path));
        }

        let meta = match source {
            Source::Document => value.get(META_KEY).unwrap_or(value),
            Source::Embedded => value,
        };

        let concrete = match registry.resolve_concrete_type(type_name, meta) {
            Ok(concrete) => concrete,
            Err(err) => {
                self.error(err.into(), path);
                return Err(Bubble);
            }
        };

        let record = ResolvedRecord {
            record: value,
            type_name: concrete,
            selection,
        };

        self.complete_object(record, type_name, source, path)
    }

    fn complete_object(
        &mut self,
        record: ResolvedRecord<'_>,
        declared_type: &'a str,
        source: Source,
        path: &FieldPath,
    ) -> Completion {
        let model = self.model;
        let concrete = record.type_name;
        let mut fields = IndexMap::new();

        for nested in record.selection.nested_selections() {
            if !nested.applies_to(concrete, |concrete, condition| model.is_subtype(concrete, condition)) {
                continue;
            }

            let key = nested.response_key();

            if fields.contains_key(key) {
                continue;
            }

            if nested.is_typename() {
                fields.insert(key.to_owned(), ResultNode::Scalar(Value::String(concrete.to_owned())));
                continue;
            }

            let field_path = path.key(key);

            let Some(field) = std::iter::once(concrete)
                .chain(nested.type_conditions().iter().map(String::as_str))
                .chain(std::iter::once(declared_type))
                .find_map(|owner| model.get_type(owner).and_then(|t| t.field(nested.name())))
            else {
                let error = UnsupportedSelectionError::new(concrete, nested.name(), "the type has no such field");
                self.error(error.into(), &field_path);
                fields.insert(key.to_owned(), ResultNode::Null);
                continue;
            };

            let (value, nested_source) = match source {
                Source::Document if field.directives.relation.is_some() => (record.record.get(key), Source::Document),
                Source::Document => (record.record.get(key), Source::Embedded),
                Source::Embedded => (record.record.get(&field.name), Source::Embedded),
            };

            let node = self.complete(
                &field.field_type,
                value.unwrap_or(&Value::Null),
                nested,
                nested_source,
                &field_path,
            )?;

            fields.insert(key.to_owned(), node);
        }

        Ok(ResultNode::Object(ResultObject {
            type_name: concrete.to_owned(),
            fields,
        }))
    }

    fn invalid_value(&mut self, selection: &FieldSelection, expected: &str, found: &Value, path: &FieldPath) -> Bubble {
        let error = FetchError::InvalidValue {
            field: selection.name().to_owned(),
            expected: expected.to_owned(),
            found: found.to_string(),
        };

        self.error(error, path);

        Bubble
    }
}
