//! Reading the storage directives out of SDL directive applications.

use crate::{
    SchemaError,
    types::{CollectionDirective, Direction, FieldDirectives, IndexDirective, RelationDirective, TypeDirectives},
};
use arango_client::{CollectionKind, IndexKind};
use graphql_parser::schema::{Directive, Value};

pub(crate) const VERTEX: &str = "vertex";
pub(crate) const EDGE: &str = "edge";
pub(crate) const DISCRIMINATOR: &str = "discriminator";
pub(crate) const ALIAS: &str = "alias";
pub(crate) const INDEX: &str = "index";

pub(crate) fn type_directives(type_name: &str, directives: &[Directive<'_, String>]) -> Result<TypeDirectives, SchemaError> {
    let target = format!("type \"{type_name}\"");
    let mut result = TypeDirectives::default();

    for directive in directives {
        let args = Arguments::new(directive, &target);

        match directive.name.as_str() {
            VERTEX | EDGE => {
                args.allow_only(&["collection"])?;

                if result.vertex.is_some() {
                    return Err(args.error("a type can only be stored in one collection"));
                }

                let kind = if directive.name == VERTEX {
                    CollectionKind::Document
                } else {
                    CollectionKind::Edge
                };

                result.vertex = Some(CollectionDirective {
                    collection: args.required_string("collection")?,
                    kind,
                });
            }
            DISCRIMINATOR => {
                args.allow_only(&["property"])?;

                if result.discriminator.is_some() {
                    return Err(args.error("the directive can only be used once"));
                }

                result.discriminator = Some(args.required_string("property")?);
            }
            ALIAS => {
                args.allow_only(&["name"])?;
                result.aliases.push(args.required_string("name")?);
            }
            _ => (),
        }
    }

    Ok(result)
}

pub(crate) fn field_directives(
    type_name: &str,
    field_name: &str,
    directives: &[Directive<'_, String>],
) -> Result<FieldDirectives, SchemaError> {
    let target = format!("field \"{type_name}.{field_name}\"");
    let mut result = FieldDirectives::default();

    for directive in directives {
        let args = Arguments::new(directive, &target);

        match directive.name.as_str() {
            EDGE => {
                args.allow_only(&["collection", "direction"])?;

                if result.relation.is_some() {
                    return Err(args.error("the directive can only be used once"));
                }

                let direction = match args.optional_enum("direction")? {
                    None | Some("OUTBOUND") => Direction::Outbound,
                    Some("INBOUND") => Direction::Inbound,
                    Some(other) => {
                        return Err(args.error(format!(
                            "unknown direction `{other}`, expected OUTBOUND or INBOUND"
                        )));
                    }
                };

                result.relation = Some(RelationDirective {
                    collection: args.required_string("collection")?,
                    direction,
                });
            }
            INDEX => {
                args.allow_only(&["type", "unique", "sparse"])?;

                if result.index.is_some() {
                    return Err(args.error("the directive can only be used once"));
                }

                let kind = match args.optional_enum("type")? {
                    None | Some("PERSISTENT") => IndexKind::Persistent,
                    Some("FULLTEXT") => IndexKind::Fulltext,
                    Some("GEO") => IndexKind::Geo,
                    Some(other) => {
                        return Err(args.error(format!(
                            "unknown index type `{other}`, expected PERSISTENT, FULLTEXT or GEO"
                        )));
                    }
                };

                result.index = Some(IndexDirective {
                    kind,
                    unique: args.optional_bool("unique")?.unwrap_or(false),
                    sparse: args.optional_bool("sparse")?.unwrap_or(false),
                });
            }
            VERTEX | DISCRIMINATOR | ALIAS => {
                return Err(args.error("the directive is only allowed on types"));
            }
            _ => (),
        }
    }

    Ok(result)
}

struct Arguments<'a, 'b> {
    directive: &'a Directive<'b, String>,
    target: &'a str,
}

impl<'a, 'b> Arguments<'a, 'b> {
    fn new(directive: &'a Directive<'b, String>, target: &'a str) -> Self {
        Self { directive, target }
    }

    fn error(&self, message: impl Into<String>) -> SchemaError {
        SchemaError::invalid_directive(&self.directive.name, self.target, message)
    }

    fn get(&self, name: &str) -> Option<&'a Value<'b, String>> {
        self.directive
            .arguments
            .iter()
            .find(|(arg, _)| arg == name)
            .map(|(_, value)| value)
    }

    fn allow_only(&self, allowed: &[&str]) -> Result<(), SchemaError> {
        match self
            .directive
            .arguments
            .iter()
            .find(|(arg, _)| !allowed.contains(&arg.as_str()))
        {
            Some((arg, _)) => Err(self.error(format!("unknown argument `{arg}`"))),
            None => Ok(()),
        }
    }

    fn required_string(&self, name: &str) -> Result<String, SchemaError> {
        match self.get(name) {
            Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
            Some(Value::String(_)) => Err(self.error(format!("argument `{name}` must not be empty"))),
            Some(_) => Err(self.error(format!("argument `{name}` must be a string"))),
            None => Err(self.error(format!("missing required argument `{name}`"))),
        }
    }

    fn optional_enum(&self, name: &str) -> Result<Option<&'a str>, SchemaError> {
        match self.get(name) {
            Some(Value::Enum(value)) => Ok(Some(value.as_str())),
            Some(_) => Err(self.error(format!("argument `{name}` must be an enum value"))),
            None => Ok(None),
        }
    }

    fn optional_bool(&self, name: &str) -> Result<Option<bool>, SchemaError> {
        match self.get(name) {
            Some(Value::Boolean(value)) => Ok(Some(*value)),
            Some(_) => Err(self.error(format!("argument `{name}` must be a boolean"))),
            None => Ok(None),
        }
    }
}
