//! Query fragments and their rendering to AQL.
//!
//! A fragment tree compiles to exactly one AQL query. Fragments of nested relation
//! fields become sub-queries inside the `RETURN` projection of their parent and
//! traverse from the parent's loop variable.

use arango_client::AqlQuery;
use graph_schema::Direction;
use indexmap::IndexMap;
use itertools::Itertools;
use serde_json::Value;

/// Key of the metadata object every document projection carries.
pub const META_KEY: &str = "__meta";

/// Bind parameter of the start vertex id when fetching for an already resolved record.
pub const START_PARAMETER: &str = "start";

/// Stands in for "no limit" when only an offset is given.
const UNBOUNDED_LIMIT: u64 = 9_007_199_254_740_991;

#[derive(Debug, Clone, PartialEq)]
pub enum QueryFragment {
    /// A value read straight off the enclosing document.
    Attribute(AttributeFragment),
    /// Documents looked up in a collection or reached by a traversal.
    Documents(Box<DocumentsFragment>),
}

impl QueryFragment {
    pub fn as_documents(&self) -> Option<&DocumentsFragment> {
        match self {
            QueryFragment::Documents(documents) => Some(documents),
            QueryFragment::Attribute(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeFragment {
    pub variable: String,
    pub attribute: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentsFragment {
    /// The loop variable the documents are bound to.
    pub variable: String,
    pub source: DocumentSource,
    pub filters: Vec<Filter>,
    pub pagination: Pagination,
    /// Read into the metadata so the concrete type can be resolved.
    pub discriminator: Option<String>,
    /// Response key to fragment.
    pub projection: IndexMap<String, QueryFragment>,
    pub cardinality: Cardinality,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Collection(String),
    Traversal {
        start: TraversalStart,
        direction: Direction,
        edge_collection: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraversalStart {
    /// The loop variable of the enclosing documents.
    Variable(String),
    /// The `@start` bind parameter, bound at execution time.
    BindParameter,
}

/// `attribute == value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub attribute: String,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl Pagination {
    pub fn is_empty(&self) -> bool {
        self.offset.is_none() && self.limit.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Many,
}

impl DocumentsFragment {
    pub fn new(variable: impl Into<String>, source: DocumentSource, cardinality: Cardinality) -> Self {
        Self {
            variable: variable.into(),
            source,
            filters: Vec::new(),
            pagination: Pagination::default(),
            discriminator: None,
            projection: IndexMap::new(),
            cardinality,
        }
    }

    /// Whether this tree expects the `@start` bind parameter.
    pub fn traverses_from_start(&self) -> bool {
        matches!(
            self.source,
            DocumentSource::Traversal {
                start: TraversalStart::BindParameter,
                ..
            }
        )
    }

    /// Renders the tree as a single query.
    pub fn render(&self) -> AqlQuery {
        let mut query = AqlQuery::default();
        let text = self.render_into(&mut query, "\n  ");
        query.query = text;
        query
    }

    fn render_into(&self, query: &mut AqlQuery, separator: &str) -> String {
        let var = &self.variable;
        let mut clauses = Vec::with_capacity(4);

        match &self.source {
            DocumentSource::Collection(collection) => {
                let parameter = format!("{var}_collection");
                clauses.push(format!("FOR {var} IN @@{parameter}"));
                query.bind_collection(parameter, collection.clone());
            }
            DocumentSource::Traversal {
                start,
                direction,
                edge_collection,
            } => {
                let start = match start {
                    TraversalStart::Variable(parent) => parent.clone(),
                    TraversalStart::BindParameter => format!("@{START_PARAMETER}"),
                };

                let parameter = format!("{var}_edges");
                clauses.push(format!("FOR {var} IN 1..1 {direction} {start} @@{parameter}"));
                query.bind_collection(parameter, edge_collection.clone());
            }
        }

        for filter in &self.filters {
            let parameter = format!("{var}_arg_{}", escape_name(&filter.attribute));
            clauses.push(format!("FILTER {var}.`{}` == @{parameter}", filter.attribute));
            query.bind(parameter, filter.value.clone());
        }

        if let Some(limit) = self.render_limit(query) {
            clauses.push(limit);
        }

        let projection = self.render_projection(query);
        clauses.push(format!("RETURN {projection}"));

        clauses.join(separator)
    }

    fn render_limit(&self, query: &mut AqlQuery) -> Option<String> {
        let var = &self.variable;
        let default_limit = match self.cardinality {
            Cardinality::One => 1,
            Cardinality::Many => UNBOUNDED_LIMIT,
        };

        match (self.pagination.offset, self.pagination.limit) {
            (None, None) if self.cardinality == Cardinality::Many => None,
            (None, None) => Some("LIMIT 1".to_owned()),
            (None, Some(limit)) => {
                query.bind(format!("{var}_limit"), limit);
                Some(format!("LIMIT @{var}_limit"))
            }
            (Some(offset), limit) => {
                query.bind(format!("{var}_offset"), offset);
                query.bind(format!("{var}_limit"), limit.unwrap_or(default_limit));
                Some(format!("LIMIT @{var}_offset, @{var}_limit"))
            }
        }
    }

    fn render_projection(&self, query: &mut AqlQuery) -> String {
        let var = &self.variable;
        let mut meta = vec![format!("\"_id\": {var}._id")];

        if let Some(property) = &self.discriminator {
            meta.push(format!("{}: {var}.`{property}`", quote(property)));
        }

        let mut entries = vec![format!("{}: {{{}}}", quote(META_KEY), meta.join(", "))];

        for (key, fragment) in &self.projection {
            let value = match fragment {
                QueryFragment::Attribute(attribute) => format!("{}.`{}`", attribute.variable, attribute.attribute),
                QueryFragment::Documents(documents) => {
                    let subquery = documents.render_into(query, " ");

                    match documents.cardinality {
                        Cardinality::One => format!("FIRST({subquery})"),
                        Cardinality::Many => format!("({subquery})"),
                    }
                }
            };

            entries.push(format!("{}: {value}", quote(key)));
        }

        format!("{{{}}}", entries.iter().join(", "))
    }
}

fn quote(key: &str) -> String {
    Value::String(key.to_owned()).to_string()
}

/// Loop variable for the field at `keys` (response keys from the root field down).
/// Keys are joined with `_`, and an `_` inside a key becomes `_0`. GraphQL names never
/// start with a digit, so distinct paths always get distinct names.
pub fn variable_name<S: AsRef<str>>(keys: &[S]) -> String {
    let path = keys.iter().map(|key| escape_name(key.as_ref())).join("_");

    format!("v_{path}")
}

fn escape_name(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            escaped.push(c);
        } else {
            escaped.push_str("_0");
        }
    }

    escaped
}
