use crate::{
    DirectiveModelBuilder, SchemaError,
    directives::{field_directives, type_directives},
    types::{FieldDeclaration, TypeDeclaration, TypeKind, TypeRef},
};
use graphql_parser::schema::{self, Definition, Type, TypeDefinition, TypeExtension};
use indexmap::IndexMap;

/// Feeds the type declarations of one SDL file into the builder.
pub(crate) fn load_file(builder: &mut DirectiveModelBuilder, file: &str, sdl: &str) -> Result<(), SchemaError> {
    let document = schema::parse_schema::<String>(sdl).map_err(|err| SchemaError::Parse {
        file: file.to_owned(),
        message: err.to_string(),
    })?;

    for definition in document.definitions {
        match definition {
            Definition::SchemaDefinition(schema) => {
                if let Some(query) = schema.query {
                    builder.set_query_type(query);
                }
            }
            Definition::TypeDefinition(definition) => {
                if let Some(declaration) = type_declaration(definition)? {
                    builder.declare_type(declaration)?;
                }
            }
            Definition::TypeExtension(TypeExtension::Object(extension)) => {
                let fields = fields(&extension.name, extension.fields)?;
                builder.extend_type(extension.name, extension.implements_interfaces, fields.into_values().collect());
            }
            Definition::TypeExtension(TypeExtension::Interface(extension)) => {
                let fields = fields(&extension.name, extension.fields)?;
                builder.extend_type(extension.name, Vec::new(), fields.into_values().collect());
            }
            Definition::TypeExtension(_) | Definition::DirectiveDefinition(_) => (),
        }
    }

    Ok(())
}

fn type_declaration(definition: TypeDefinition<'_, String>) -> Result<Option<TypeDeclaration>, SchemaError> {
    let declaration = match definition {
        TypeDefinition::Object(object) => TypeDeclaration {
            directives: type_directives(&object.name, &object.directives)?,
            fields: fields(&object.name, object.fields)?,
            kind: TypeKind::Object {
                interfaces: object.implements_interfaces,
            },
            name: object.name,
        },
        TypeDefinition::Interface(interface) => TypeDeclaration {
            directives: type_directives(&interface.name, &interface.directives)?,
            fields: fields(&interface.name, interface.fields)?,
            kind: TypeKind::Interface,
            name: interface.name,
        },
        TypeDefinition::Union(union) => TypeDeclaration {
            directives: type_directives(&union.name, &union.directives)?,
            fields: IndexMap::new(),
            kind: TypeKind::Union { members: union.types },
            name: union.name,
        },
        TypeDefinition::Scalar(scalar) => TypeDeclaration::new(scalar.name, TypeKind::Scalar),
        TypeDefinition::Enum(enum_type) => TypeDeclaration::new(enum_type.name, TypeKind::Enum),
        // Input objects only appear in arguments, which are passed through as JSON.
        TypeDefinition::InputObject(_) => return Ok(None),
    };

    Ok(Some(declaration))
}

fn fields(
    type_name: &str,
    fields: Vec<schema::Field<'_, String>>,
) -> Result<IndexMap<String, FieldDeclaration>, SchemaError> {
    let mut result = IndexMap::with_capacity(fields.len());

    for field in fields {
        let declaration = FieldDeclaration {
            directives: field_directives(type_name, &field.name, &field.directives)?,
            field_type: type_ref(&field.field_type),
            name: field.name,
        };

        if result.contains_key(&declaration.name) {
            return Err(SchemaError::DuplicateField {
                type_name: type_name.to_owned(),
                field: declaration.name,
            });
        }

        result.insert(declaration.name.clone(), declaration);
    }

    Ok(result)
}

fn type_ref(field_type: &Type<'_, String>) -> TypeRef {
    match field_type {
        Type::NamedType(name) => TypeRef::named(name.as_str()),
        Type::ListType(inner) => TypeRef::list(type_ref(inner)),
        Type::NonNullType(inner) => TypeRef::non_null(type_ref(inner)),
    }
}
