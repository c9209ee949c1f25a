use arango_client::CollectionKind;
use thiserror::Error;

/// A defect in the type declarations. Detected while loading, never at request time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("Could not parse schema file '{file}': {message}")]
    Parse { file: String, message: String },

    #[error("The type \"{name}\" cannot be defined because a type with that name already exists.")]
    DuplicateType { name: String },

    #[error("The field \"{type_name}.{field}\" is declared more than once.")]
    DuplicateField { type_name: String, field: String },

    #[error("Error parsing directive @{directive} on {target}: {message}")]
    InvalidDirective {
        directive: String,
        target: String,
        message: String,
    },

    #[error(
        "The collection \"{collection}\" is used as {first_kind} collection by {first_owner} and as {second_kind} collection by {second_owner}."
    )]
    CollectionKindConflict {
        collection: String,
        first_owner: String,
        first_kind: CollectionKind,
        second_owner: String,
        second_kind: CollectionKind,
    },

    #[error("The alias \"{alias}\" points to the undeclared type \"{canonical}\".")]
    UndeclaredAliasTarget { alias: String, canonical: String },

    #[error("The alias \"{alias}\" of \"{canonical}\" clashes with {existing}.")]
    AliasConflict {
        alias: String,
        canonical: String,
        existing: String,
    },

    #[error("Type \"{name}\" referenced by {referenced_by} is neither a built-in type nor declared in the schema.")]
    UnknownType { name: String, referenced_by: String },

    #[error("The field \"{type_name}.{field}\" has an @index directive, but \"{type_name}\" is not stored in a collection.")]
    IndexWithoutCollection { type_name: String, field: String },

    #[error(
        "The discriminator value \"{value}\" of \"{abstract_type}\" is used by both \"{first}\" and \"{second}\"."
    )]
    DuplicateDiscriminatorValue {
        abstract_type: String,
        value: String,
        first: String,
        second: String,
    },
}

impl SchemaError {
    pub(crate) fn invalid_directive(directive: &str, target: impl Into<String>, message: impl Into<String>) -> Self {
        SchemaError::InvalidDirective {
            directive: directive.to_owned(),
            target: target.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedTypeKind {
    /// The type is abstract but declares no discriminator.
    NoDiscriminator,
    MissingProperty,
    UnmappedValue(String),
}

/// The concrete type of a record could not be determined.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", self.render())]
pub struct UnresolvedTypeError {
    pub abstract_type: String,
    pub property: Option<String>,
    pub kind: UnresolvedTypeKind,
}

impl UnresolvedTypeError {
    fn render(&self) -> String {
        let property = self.property.as_deref().unwrap_or_default();

        match &self.kind {
            UnresolvedTypeKind::NoDiscriminator => format!(
                "Could not resolve the concrete type of \"{}\": the type declares no @discriminator.",
                self.abstract_type
            ),
            UnresolvedTypeKind::MissingProperty => format!(
                "Could not resolve the concrete type of \"{}\": the record has no \"{}\" property.",
                self.abstract_type, property
            ),
            UnresolvedTypeKind::UnmappedValue(value) => format!(
                "Could not resolve the concrete type of \"{}\": the value {} of \"{}\" maps to no type.",
                self.abstract_type, value, property
            ),
        }
    }
}
