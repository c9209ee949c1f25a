#![deny(rust_2018_idioms, unsafe_code)]

//! The directive model: which declared GraphQL types live in which ArangoDB collections,
//! which fields are edge traversals, and how records of abstract types name their
//! concrete type.

mod directives;
mod discriminator;
mod error;
mod model;
mod sdl;
mod types;

pub use discriminator::{DiscriminatorMapping, TypeDiscriminatorRegistry};
pub use error::{SchemaError, UnresolvedTypeError, UnresolvedTypeKind};
pub use model::{DEFAULT_QUERY_TYPE, DirectiveModel, DirectiveModelBuilder};
pub use types::*;

/// Loads a single SDL document.
pub fn parse_schema(sdl: &str) -> Result<DirectiveModel, SchemaError> {
    parse_schema_files(&[("schema.graphqls", sdl)])
}

/// Loads several SDL files as one schema. Types may be extended across files.
pub fn parse_schema_files<N, S>(files: &[(N, S)]) -> Result<DirectiveModel, SchemaError>
where
    N: AsRef<str>,
    S: AsRef<str>,
{
    let mut builder = DirectiveModelBuilder::new();

    for (name, content) in files {
        sdl::load_file(&mut builder, name.as_ref(), content.as_ref())?;
    }

    builder.build()
}
