//! The query generator chain.
//!
//! Every generator is a plain function from a [CompileContext] to an optional fragment.
//! They are tried in a fixed order and the first that produces a fragment owns the
//! node. Relation traversal comes first, so a relation directive always decides the
//! shape of the query and discriminators only matter once records are fetched.

mod attribute;
mod traversal;
mod vertex;

use crate::{
    Cardinality, DocumentSource, DocumentsFragment, FieldSelection, Filter, Pagination, QueryFragment,
    UnsupportedSelectionError, variable_name,
};
use graph_schema::{DirectiveModel, FieldDeclaration, TypeDiscriminatorRegistry};
use itertools::Itertools;
use serde_json::Value;

pub use attribute::attribute;
pub use traversal::edge_traversal;
pub use vertex::{discriminated_vertex, vertex_lookup};

pub type Generator = fn(&CompileContext<'_>) -> Option<QueryFragment>;

/// Where the selected field is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope<'a> {
    /// A field of the query type.
    Root,
    /// A field of a record fetched earlier, whose id is bound to `@start`.
    StartVertex,
    /// A field of the documents bound to this loop variable.
    Document(&'a str),
    /// A field of an embedded object inside a document.
    Embedded(&'a str),
}

/// Everything a generator may inspect about a node.
#[derive(Debug)]
pub struct CompileContext<'a> {
    pub model: &'a DirectiveModel,
    pub registry: &'a TypeDiscriminatorRegistry,
    pub parent_type: &'a str,
    pub field: &'a FieldDeclaration,
    pub selection: &'a FieldSelection,
    pub scope: Scope<'a>,
    /// The loop variable a documents fragment for this node binds.
    pub variable: String,
    pub arguments: CompiledArguments,
}

impl CompileContext<'_> {
    /// The innermost declared result type.
    pub fn result_type(&self) -> &str {
        self.field.field_type.named_type()
    }

    pub fn is_relation(&self) -> bool {
        self.field.directives.relation.is_some()
    }

    pub fn cardinality(&self) -> Cardinality {
        if self.field.field_type.is_list() {
            Cardinality::Many
        } else {
            Cardinality::One
        }
    }

    /// A documents fragment for this node reading from `source`.
    pub fn documents(&self, source: DocumentSource) -> QueryFragment {
        let mut fragment = DocumentsFragment::new(self.variable.clone(), source, self.cardinality());

        fragment.filters = self.arguments.filters.clone();
        fragment.pagination = self.arguments.pagination;
        fragment.discriminator = self
            .registry
            .mapping(self.result_type())
            .map(|mapping| mapping.property.clone());

        QueryFragment::Documents(Box::new(fragment))
    }
}

/// Field arguments split into pagination and equality filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledArguments {
    pub filters: Vec<Filter>,
    pub pagination: Pagination,
}

impl CompiledArguments {
    pub const LIMIT: &'static str = "limit";
    pub const OFFSET: &'static str = "offset";

    pub fn parse(parent_type: &str, selection: &FieldSelection) -> Result<Self, UnsupportedSelectionError> {
        let mut arguments = Self::default();

        for (name, value) in selection.arguments() {
            match name.as_str() {
                Self::LIMIT | Self::OFFSET => {
                    let number = match value {
                        Value::Null => None,
                        other => Some(other.as_u64().ok_or_else(|| {
                            UnsupportedSelectionError::new(
                                parent_type,
                                selection.name(),
                                format!("argument `{name}` must be a non-negative integer, got `{other}`"),
                            )
                        })?),
                    };

                    if name == Self::LIMIT {
                        arguments.pagination.limit = number;
                    } else {
                        arguments.pagination.offset = number;
                    }
                }
                _ => arguments.filters.push(Filter {
                    attribute: name.clone(),
                    value: value.clone(),
                }),
            }
        }

        Ok(arguments)
    }
}

#[derive(Debug, Clone)]
pub struct QueryGeneratorChain {
    generators: Vec<(&'static str, Generator)>,
}

impl Default for QueryGeneratorChain {
    fn default() -> Self {
        Self::new(vec![
            ("edge_traversal", edge_traversal as Generator),
            ("discriminated_vertex", discriminated_vertex),
            ("vertex_lookup", vertex_lookup),
            ("attribute", attribute),
        ])
    }
}

impl QueryGeneratorChain {
    pub fn new(generators: Vec<(&'static str, Generator)>) -> Self {
        Self { generators }
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.generators.iter().map(|(name, _)| *name)
    }

    /// Compiles a single node. Nested selections are the caller's business.
    pub fn compile(&self, ctx: &CompileContext<'_>) -> Result<QueryFragment, UnsupportedSelectionError> {
        for (name, generator) in &self.generators {
            if let Some(fragment) = generator(ctx) {
                tracing::trace!(
                    generator = *name,
                    parent_type = ctx.parent_type,
                    field = ctx.selection.name(),
                    "Compiled selection"
                );

                return Ok(fragment);
            }
        }

        Err(UnsupportedSelectionError::new(
            ctx.parent_type,
            ctx.selection.name(),
            self.explain(ctx),
        ))
    }

    fn explain(&self, ctx: &CompileContext<'_>) -> String {
        let result_type = ctx.result_type();

        match ctx.scope {
            Scope::Root | Scope::StartVertex if ctx.is_relation() => {
                "the field is a relation, but there is no document to traverse from".to_owned()
            }
            Scope::Embedded(_) if ctx.is_relation() => {
                "relations of embedded objects cannot be traversed".to_owned()
            }
            Scope::Root | Scope::StartVertex if ctx.model.is_leaf_type(result_type) => {
                "only fields returning stored documents can be fetched here".to_owned()
            }
            Scope::Root if ctx.model.is_abstract(result_type) && !ctx.registry.is_discriminated(result_type) => {
                format!("the abstract type \"{result_type}\" declares no @discriminator")
            }
            Scope::Root | Scope::StartVertex => {
                format!("the type \"{result_type}\" is not stored in a collection")
            }
            Scope::Document(_) | Scope::Embedded(_) if ctx.model.collection_for(result_type).is_some() => {
                format!("the field returns the stored type \"{result_type}\", but has no @edge directive")
            }
            _ => format!(
                "no query generator applies (tried {})",
                self.names().join(", ")
            ),
        }
    }
}

/// Compiles a selection together with everything nested in it.
pub(crate) struct Compiler<'a> {
    pub(crate) model: &'a DirectiveModel,
    pub(crate) registry: &'a TypeDiscriminatorRegistry,
    pub(crate) chain: &'a QueryGeneratorChain,
}

impl<'a> Compiler<'a> {
    pub(crate) fn compile_field(
        &self,
        parent_type: &'a str,
        selection: &'a FieldSelection,
        scope: Scope<'_>,
        keys: &[&str],
    ) -> Result<QueryFragment, UnsupportedSelectionError> {
        let unsupported = |reason: String| UnsupportedSelectionError::new(parent_type, selection.name(), reason);

        let field = self
            .model
            .get_type(parent_type)
            .and_then(|t| t.field(selection.name()))
            .ok_or_else(|| unsupported("the type has no such field".to_owned()))?;

        let result_type = field.field_type.named_type();
        let is_leaf = self.model.is_leaf_type(result_type);

        match (is_leaf, selection.nested_selections().is_empty()) {
            (true, false) => return Err(unsupported(format!("\"{result_type}\" has no fields to select"))),
            (false, true) => return Err(unsupported(format!("a selection of the fields of \"{result_type}\" is required"))),
            _ => (),
        }

        let mut path = keys.to_vec();
        path.push(selection.response_key());

        let ctx = CompileContext {
            model: self.model,
            registry: self.registry,
            parent_type,
            field,
            selection,
            scope,
            variable: variable_name(&path),
            arguments: CompiledArguments::parse(parent_type, selection)?,
        };

        let mut fragment = self.chain.compile(&ctx)?;

        match &mut fragment {
            QueryFragment::Documents(documents) => {
                for nested in selection.nested_selections() {
                    if nested.is_typename() || documents.projection.contains_key(nested.response_key()) {
                        continue;
                    }

                    let owner = self.owner_type(result_type, nested)?;
                    let compiled = self.compile_field(owner, nested, Scope::Document(&documents.variable), &path)?;

                    documents.projection.insert(nested.response_key().to_owned(), compiled);
                }
            }
            QueryFragment::Attribute(attribute) => {
                let prefix = format!("{}.`{}`", attribute.variable, attribute.attribute);

                for nested in selection.nested_selections().iter().filter(|s| !s.is_typename()) {
                    let owner = self.owner_type(result_type, nested)?;
                    self.compile_field(owner, nested, Scope::Embedded(&prefix), &path)?;
                }
            }
        }

        Ok(fragment)
    }

    /// The type declaring a nested field: the first of its type conditions declaring it,
    /// or the result type itself. All conditions declaring the field must agree on it.
    fn owner_type(&self, result_type: &'a str, nested: &'a FieldSelection) -> Result<&'a str, UnsupportedSelectionError> {
        let conditions = nested.type_conditions();

        let Some(first) = conditions.first() else {
            return Ok(result_type);
        };

        for condition in conditions {
            if !self.model.is_subtype(condition, result_type) && !self.model.is_subtype(result_type, condition) {
                return Err(UnsupportedSelectionError::new(
                    result_type,
                    nested.name(),
                    format!("the type condition \"{condition}\" can never apply to \"{result_type}\""),
                ));
            }
        }

        let mut declaring = conditions.iter().filter_map(|condition| {
            self.model
                .get_type(condition)
                .and_then(|t| t.field(nested.name()))
                .map(|field| (condition.as_str(), field))
        });

        let Some((owner, field)) = declaring.next() else {
            return Ok(first.as_str());
        };

        if let Some((other, _)) =
            declaring.find(|(_, other)| other.field_type != field.field_type || other.directives != field.directives)
        {
            return Err(UnsupportedSelectionError::new(
                result_type,
                nested.name(),
                format!("the field is declared differently on \"{owner}\" and \"{other}\""),
            ));
        }

        Ok(owner)
    }
}
