use crate::{
    SchemaError,
    types::{BUILTIN_SCALARS, FieldDeclaration, FieldDirectives, TypeDeclaration, TypeDirectives, TypeKind},
};
use arango_client::CollectionKind;
use indexmap::IndexMap;

/// The default name of the root query type.
pub const DEFAULT_QUERY_TYPE: &str = "Query";

static NO_TYPE_DIRECTIVES: TypeDirectives = TypeDirectives::NONE;
static NO_FIELD_DIRECTIVES: FieldDirectives = FieldDirectives::NONE;

/// Collects type declarations and validates them into a [DirectiveModel].
#[derive(Debug, Default)]
pub struct DirectiveModelBuilder {
    types: IndexMap<String, TypeDeclaration>,
    aliases: Vec<(String, String)>,
    extensions: Vec<TypeExtension>,
    query_type: Option<String>,
}

#[derive(Debug)]
struct TypeExtension {
    name: String,
    interfaces: Vec<String>,
    fields: Vec<FieldDeclaration>,
}

impl DirectiveModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare_type(&mut self, declaration: TypeDeclaration) -> Result<(), SchemaError> {
        if self.types.contains_key(&declaration.name) || BUILTIN_SCALARS.contains(&declaration.name.as_str()) {
            return Err(SchemaError::DuplicateType { name: declaration.name });
        }

        self.types.insert(declaration.name.clone(), declaration);

        Ok(())
    }

    /// Registers `alias` as another name of `canonical`, next to the `@alias` directives.
    pub fn declare_alias(&mut self, alias: impl Into<String>, canonical: impl Into<String>) {
        self.aliases.push((alias.into(), canonical.into()));
    }

    /// Adds fields and interfaces to a type declared in this or any other file.
    pub fn extend_type(&mut self, name: impl Into<String>, interfaces: Vec<String>, fields: Vec<FieldDeclaration>) {
        self.extensions.push(TypeExtension {
            name: name.into(),
            interfaces,
            fields,
        });
    }

    pub fn set_query_type(&mut self, name: impl Into<String>) {
        self.query_type = Some(name.into());
    }

    pub fn build(mut self) -> Result<DirectiveModel, SchemaError> {
        self.apply_extensions()?;

        let aliases = self.collect_aliases()?;
        let query_type = self.resolve_query_type()?;
        let model = DirectiveModel {
            types: self.types,
            aliases,
            query_type,
        };

        model.validate_directive_targets()?;
        model.validate_type_references()?;
        model.validate_collections()?;

        tracing::debug!(
            types = model.types.len(),
            aliases = model.aliases.len(),
            "Loaded directive model"
        );

        Ok(model)
    }

    fn apply_extensions(&mut self) -> Result<(), SchemaError> {
        for extension in std::mem::take(&mut self.extensions) {
            let Some(declaration) = self.types.get_mut(&extension.name) else {
                return Err(SchemaError::UnknownType {
                    name: extension.name,
                    referenced_by: "a type extension".to_owned(),
                });
            };

            for field in extension.fields {
                if declaration.fields.contains_key(&field.name) {
                    return Err(SchemaError::DuplicateField {
                        type_name: declaration.name.clone(),
                        field: field.name,
                    });
                }

                declaration.fields.insert(field.name.clone(), field);
            }

            if let TypeKind::Object { interfaces } = &mut declaration.kind {
                interfaces.extend(extension.interfaces);
            }
        }

        Ok(())
    }

    fn collect_aliases(&mut self) -> Result<IndexMap<String, String>, SchemaError> {
        let mut pairs: Vec<(String, String)> = self
            .types
            .values()
            .flat_map(|t| t.directives.aliases.iter().map(|alias| (alias.clone(), t.name.clone())))
            .collect();

        for (alias, canonical) in std::mem::take(&mut self.aliases) {
            let Some(declaration) = self.types.get_mut(&canonical) else {
                return Err(SchemaError::UndeclaredAliasTarget { alias, canonical });
            };

            if !declaration.directives.aliases.contains(&alias) {
                declaration.directives.aliases.push(alias.clone());
            }

            pairs.push((alias, canonical));
        }

        let mut aliases: IndexMap<String, String> = IndexMap::new();

        for (alias, canonical) in pairs {
            if self.types.contains_key(&alias) || BUILTIN_SCALARS.contains(&alias.as_str()) {
                return Err(SchemaError::AliasConflict {
                    existing: format!("the type \"{alias}\""),
                    alias,
                    canonical,
                });
            }

            match aliases.get(&alias) {
                Some(existing) if existing != &canonical => {
                    return Err(SchemaError::AliasConflict {
                        existing: format!("an alias of \"{existing}\""),
                        alias,
                        canonical,
                    });
                }
                _ => {
                    aliases.insert(alias, canonical);
                }
            }
        }

        Ok(aliases)
    }

    fn resolve_query_type(&self) -> Result<Option<String>, SchemaError> {
        match &self.query_type {
            Some(name) if self.types.contains_key(name) => Ok(Some(name.clone())),
            Some(name) => Err(SchemaError::UnknownType {
                name: name.clone(),
                referenced_by: "the schema definition".to_owned(),
            }),
            None if self.types.contains_key(DEFAULT_QUERY_TYPE) => Ok(Some(DEFAULT_QUERY_TYPE.to_owned())),
            None => Ok(None),
        }
    }
}

/// Read-only structural metadata of every declared type. Built once and shared.
#[derive(Debug, Clone)]
pub struct DirectiveModel {
    types: IndexMap<String, TypeDeclaration>,
    aliases: IndexMap<String, String>,
    query_type: Option<String>,
}

impl DirectiveModel {
    /// All declared types, in declaration order.
    pub fn types(&self) -> impl Iterator<Item = &TypeDeclaration> + '_ {
        self.types.values()
    }

    pub fn get_type(&self, name: &str) -> Option<&TypeDeclaration> {
        self.types.get(name)
    }

    pub fn query_type(&self) -> Option<&TypeDeclaration> {
        self.query_type.as_deref().and_then(|name| self.get_type(name))
    }

    /// The directives of a type, or [TypeDirectives::NONE].
    pub fn directives_for(&self, type_name: &str) -> &TypeDirectives {
        self.get_type(type_name)
            .map(|t| &t.directives)
            .unwrap_or(&NO_TYPE_DIRECTIVES)
    }

    /// The directives of a field, or [FieldDirectives::NONE].
    pub fn field_directives(&self, type_name: &str, field_name: &str) -> &FieldDirectives {
        self.get_type(type_name)
            .and_then(|t| t.field(field_name))
            .map(|f| &f.directives)
            .unwrap_or(&NO_FIELD_DIRECTIVES)
    }

    pub fn is_abstract(&self, type_name: &str) -> bool {
        self.get_type(type_name).is_some_and(|t| t.kind.is_abstract())
    }

    /// Built-in scalars, declared scalars and enums.
    pub fn is_leaf_type(&self, type_name: &str) -> bool {
        BUILTIN_SCALARS.contains(&type_name) || self.get_type(type_name).is_some_and(|t| t.kind.is_leaf())
    }

    /// The object types a value of `type_name` can have at runtime.
    pub fn possible_types(&self, type_name: &str) -> Vec<&TypeDeclaration> {
        let Some(declaration) = self.get_type(type_name) else {
            return Vec::new();
        };

        match &declaration.kind {
            TypeKind::Object { .. } => vec![declaration],
            TypeKind::Union { members } => members.iter().filter_map(|m| self.get_type(m)).collect(),
            TypeKind::Interface => self.types().filter(|t| self.implements(&t.name, type_name)).collect(),
            TypeKind::Scalar | TypeKind::Enum => Vec::new(),
        }
    }

    pub fn implements(&self, object: &str, interface: &str) -> bool {
        match self.get_type(object).map(|t| &t.kind) {
            Some(TypeKind::Object { interfaces }) => interfaces.iter().any(|i| i == interface),
            _ => false,
        }
    }

    /// Whether a value of `concrete` is acceptable where `declared` is expected.
    pub fn is_subtype(&self, concrete: &str, declared: &str) -> bool {
        concrete == declared || self.possible_types(declared).iter().any(|t| t.name == concrete)
    }

    /// Resolves an alias to its canonical type name. Type names resolve to themselves.
    pub fn canonical_type<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        if self.types.contains_key(name) {
            Some(name)
        } else {
            self.aliases.get(name).map(String::as_str)
        }
    }

    pub fn aliases_of(&self, type_name: &str) -> &[String] {
        &self.directives_for(type_name).aliases
    }

    /// The collection records of this type are stored in. Abstract types without their
    /// own `@vertex` use the collection shared by all possible types, if there is one.
    pub fn collection_for(&self, type_name: &str) -> Option<&str> {
        if let Some(collection) = self.directives_for(type_name).collection() {
            return Some(collection);
        }

        if !self.is_abstract(type_name) {
            return None;
        }

        let mut collections = self
            .possible_types(type_name)
            .into_iter()
            .map(|t| t.directives.collection());

        let first = collections.next()??;

        collections.all(|c| c == Some(first)).then_some(first)
    }

    /// Object types stored in a document collection, and the fields that are relations.
    fn collection_usages(&self) -> impl Iterator<Item = (String, &str, CollectionKind)> + '_ {
        let declared = self.types().filter_map(|t| {
            t.directives
                .vertex
                .as_ref()
                .map(|v| (format!("type \"{}\"", t.name), v.collection.as_str(), v.kind))
        });

        let relations = self.types().flat_map(|t| {
            t.fields.values().filter_map(move |f| {
                f.directives.relation.as_ref().map(|r| {
                    (
                        format!("field \"{}.{}\"", t.name, f.name),
                        r.collection.as_str(),
                        CollectionKind::Edge,
                    )
                })
            })
        });

        declared.chain(relations)
    }

    fn validate_directive_targets(&self) -> Result<(), SchemaError> {
        for declaration in self.types() {
            let directives = &declaration.directives;
            let target = || format!("{} \"{}\"", declaration.kind.describe(), declaration.name);

            if let Some(vertex) = &directives.vertex {
                let allowed = match (&declaration.kind, vertex.kind) {
                    (TypeKind::Object { .. }, _) => true,
                    (TypeKind::Interface, CollectionKind::Document) => true,
                    _ => false,
                };

                if !allowed {
                    let directive = match vertex.kind {
                        CollectionKind::Document => crate::directives::VERTEX,
                        CollectionKind::Edge => crate::directives::EDGE,
                    };

                    return Err(SchemaError::invalid_directive(
                        directive,
                        target(),
                        "the directive is not allowed here",
                    ));
                }
            }

            if directives.discriminator.is_some() && !declaration.kind.is_abstract() {
                return Err(SchemaError::invalid_directive(
                    crate::directives::DISCRIMINATOR,
                    target(),
                    "only interfaces and unions can declare a discriminator",
                ));
            }

            if !directives.aliases.is_empty() && !matches!(declaration.kind, TypeKind::Object { .. }) {
                return Err(SchemaError::invalid_directive(
                    crate::directives::ALIAS,
                    target(),
                    "only object types can have aliases",
                ));
            }

            for field in declaration.fields.values() {
                if field.directives.index.is_some() && directives.vertex.is_none() {
                    return Err(SchemaError::IndexWithoutCollection {
                        type_name: declaration.name.clone(),
                        field: field.name.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    fn validate_type_references(&self) -> Result<(), SchemaError> {
        let known = |name: &str| BUILTIN_SCALARS.contains(&name) || self.types.contains_key(name);

        for declaration in self.types() {
            for field in declaration.fields.values() {
                let name = field.field_type.named_type();

                if !known(name) {
                    return Err(SchemaError::UnknownType {
                        name: name.to_owned(),
                        referenced_by: format!("field \"{}.{}\"", declaration.name, field.name),
                    });
                }
            }

            match &declaration.kind {
                TypeKind::Object { interfaces } => {
                    for interface in interfaces {
                        if !matches!(self.get_type(interface).map(|t| &t.kind), Some(TypeKind::Interface)) {
                            return Err(SchemaError::UnknownType {
                                name: interface.clone(),
                                referenced_by: format!("the interfaces of \"{}\"", declaration.name),
                            });
                        }
                    }
                }
                TypeKind::Union { members } => {
                    for member in members {
                        if !matches!(self.get_type(member).map(|t| &t.kind), Some(TypeKind::Object { .. })) {
                            return Err(SchemaError::UnknownType {
                                name: member.clone(),
                                referenced_by: format!("the members of union \"{}\"", declaration.name),
                            });
                        }
                    }
                }
                _ => (),
            }
        }

        Ok(())
    }

    fn validate_collections(&self) -> Result<(), SchemaError> {
        let mut seen: IndexMap<&str, (String, CollectionKind)> = IndexMap::new();

        for (owner, collection, kind) in self.collection_usages() {
            match seen.get(collection) {
                Some((first_owner, first_kind)) if *first_kind != kind => {
                    return Err(SchemaError::CollectionKindConflict {
                        collection: collection.to_owned(),
                        first_owner: first_owner.clone(),
                        first_kind: *first_kind,
                        second_owner: owner,
                        second_kind: kind,
                    });
                }
                Some(_) => (),
                None => {
                    seen.insert(collection, (owner, kind));
                }
            }
        }

        Ok(())
    }

    /// Every collection the schema needs, with its kind, in declaration order.
    pub fn collections(&self) -> IndexMap<&str, CollectionKind> {
        let mut collections = IndexMap::new();

        for (_, collection, kind) in self.collection_usages() {
            collections.entry(collection).or_insert(kind);
        }

        collections
    }
}
