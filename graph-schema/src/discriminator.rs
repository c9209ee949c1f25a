use crate::{DirectiveModel, SchemaError, UnresolvedTypeError, UnresolvedTypeKind};
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

/// How the records of one abstract type name their concrete type.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscriminatorMapping {
    pub property: String,
    /// Raw property value to concrete type name.
    pub values: IndexMap<String, String>,
}

impl DiscriminatorMapping {
    pub fn concrete_type(&self, value: &str) -> Option<&str> {
        self.values.get(value).map(String::as_str)
    }
}

/// Maps (abstract type, discriminator value) to concrete types. Built once from the
/// model and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct TypeDiscriminatorRegistry {
    mappings: IndexMap<String, DiscriminatorMapping>,
    abstract_types: IndexSet<String>,
}

impl TypeDiscriminatorRegistry {
    pub fn new(model: &DirectiveModel) -> Result<Self, SchemaError> {
        let mut mappings = IndexMap::new();
        let mut abstract_types = IndexSet::new();

        for declaration in model.types().filter(|t| t.kind.is_abstract()) {
            abstract_types.insert(declaration.name.clone());

            let Some(property) = &declaration.directives.discriminator else {
                continue;
            };

            let mut values: IndexMap<String, String> = IndexMap::new();

            for concrete in model.possible_types(&declaration.name) {
                let names = std::iter::once(&concrete.name).chain(model.aliases_of(&concrete.name));

                for value in names {
                    if let Some(first) = values.get(value) {
                        return Err(SchemaError::DuplicateDiscriminatorValue {
                            abstract_type: declaration.name.clone(),
                            value: value.clone(),
                            first: first.clone(),
                            second: concrete.name.clone(),
                        });
                    }

                    values.insert(value.clone(), concrete.name.clone());
                }
            }

            tracing::trace!(
                abstract_type = declaration.name.as_str(),
                property = property.as_str(),
                values = values.len(),
                "Registered discriminator mapping"
            );

            mappings.insert(
                declaration.name.clone(),
                DiscriminatorMapping {
                    property: property.clone(),
                    values,
                },
            );
        }

        Ok(Self {
            mappings,
            abstract_types,
        })
    }

    pub fn mapping(&self, abstract_type: &str) -> Option<&DiscriminatorMapping> {
        self.mappings.get(abstract_type)
    }

    pub fn is_discriminated(&self, type_name: &str) -> bool {
        self.mappings.contains_key(type_name)
    }

    /// Reads the discriminator property of `record` and looks its value up. Types that
    /// are not abstract resolve to themselves.
    pub fn resolve_concrete_type<'a>(
        &'a self,
        abstract_type: &'a str,
        record: &Value,
    ) -> Result<&'a str, UnresolvedTypeError> {
        let Some(mapping) = self.mappings.get(abstract_type) else {
            if self.abstract_types.contains(abstract_type) {
                return Err(UnresolvedTypeError {
                    abstract_type: abstract_type.to_owned(),
                    property: None,
                    kind: UnresolvedTypeKind::NoDiscriminator,
                });
            }

            return Ok(abstract_type);
        };

        let error = |kind| UnresolvedTypeError {
            abstract_type: abstract_type.to_owned(),
            property: Some(mapping.property.clone()),
            kind,
        };

        match record.get(&mapping.property) {
            None | Some(Value::Null) => Err(error(UnresolvedTypeKind::MissingProperty)),
            Some(Value::String(value)) => mapping
                .concrete_type(value)
                .ok_or_else(|| error(UnresolvedTypeKind::UnmappedValue(Value::String(value.clone()).to_string()))),
            Some(other) => Err(error(UnresolvedTypeKind::UnmappedValue(other.to_string()))),
        }
    }
}
