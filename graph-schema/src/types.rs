use arango_client::{CollectionKind, IndexKind};
use indexmap::IndexMap;
use std::fmt;

/// The scalars every GraphQL schema knows without declaring them.
pub const BUILTIN_SCALARS: &[&str] = &["Int", "Float", "String", "Boolean", "ID"];

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Object { interfaces: Vec<String> },
    Interface,
    Union { members: Vec<String> },
    Scalar,
    Enum,
}

impl TypeKind {
    pub fn is_abstract(&self) -> bool {
        matches!(self, TypeKind::Interface | TypeKind::Union { .. })
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, TypeKind::Scalar | TypeKind::Enum)
    }

    pub(crate) fn describe(&self) -> &'static str {
        match self {
            TypeKind::Object { .. } => "object type",
            TypeKind::Interface => "interface",
            TypeKind::Union { .. } => "union",
            TypeKind::Scalar => "scalar",
            TypeKind::Enum => "enum",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDeclaration {
    pub name: String,
    pub kind: TypeKind,
    pub fields: IndexMap<String, FieldDeclaration>,
    pub directives: TypeDirectives,
}

impl TypeDeclaration {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            fields: IndexMap::new(),
            directives: TypeDirectives::default(),
        }
    }

    pub fn with_field(mut self, field: FieldDeclaration) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    pub fn with_directives(mut self, directives: TypeDirectives) -> Self {
        self.directives = directives;
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldDeclaration> {
        self.fields.get(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDeclaration {
    pub name: String,
    pub field_type: TypeRef,
    pub directives: FieldDirectives,
}

impl FieldDeclaration {
    pub fn new(name: impl Into<String>, field_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            field_type,
            directives: FieldDirectives::default(),
        }
    }

    pub fn with_directives(mut self, directives: FieldDirectives) -> Self {
        self.directives = directives;
        self
    }
}

/// A declared result type, e.g. `[Animal!]!`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn list(inner: TypeRef) -> Self {
        TypeRef::List(Box::new(inner))
    }

    pub fn non_null(inner: TypeRef) -> Self {
        TypeRef::NonNull(Box::new(inner))
    }

    /// The innermost type name.
    pub fn named_type(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.named_type(),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeRef::NonNull(_))
    }

    /// The type without its outer non-null wrapper.
    pub fn nullable(&self) -> &TypeRef {
        match self {
            TypeRef::NonNull(inner) => inner,
            other => other,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self.nullable(), TypeRef::List(_))
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => f.write_str(name),
            TypeRef::List(inner) => write!(f, "[{inner}]"),
            TypeRef::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}

/// Storage metadata of a type. Types without directives share [TypeDirectives::NONE].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeDirectives {
    pub vertex: Option<CollectionDirective>,
    pub discriminator: Option<String>,
    pub aliases: Vec<String>,
}

impl TypeDirectives {
    pub const NONE: TypeDirectives = TypeDirectives {
        vertex: None,
        discriminator: None,
        aliases: Vec::new(),
    };

    pub fn is_none(&self) -> bool {
        self == &Self::NONE
    }

    pub fn collection(&self) -> Option<&str> {
        self.vertex.as_ref().map(|v| v.collection.as_str())
    }
}

/// `@vertex` (document collection) or `@edge` (edge collection) on a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionDirective {
    pub collection: String,
    pub kind: CollectionKind,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldDirectives {
    pub relation: Option<RelationDirective>,
    pub index: Option<IndexDirective>,
}

impl FieldDirectives {
    pub const NONE: FieldDirectives = FieldDirectives {
        relation: None,
        index: None,
    };

    pub fn is_none(&self) -> bool {
        self == &Self::NONE
    }
}

/// A field resolved by a one step traversal over an edge collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDirective {
    pub collection: String,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    Outbound,
    Inbound,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Outbound => f.write_str("OUTBOUND"),
            Direction::Inbound => f.write_str("INBOUND"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDirective {
    pub kind: IndexKind,
    pub unique: bool,
    pub sparse: bool,
}

impl Default for IndexDirective {
    fn default() -> Self {
        Self {
            kind: IndexKind::Persistent,
            unique: false,
            sparse: false,
        }
    }
}
