use super::{CompileContext, Scope};
use crate::{DocumentSource, QueryFragment};

/// Root fields of an abstract type with a discriminator, scanning the collection its
/// concrete types share.
pub fn discriminated_vertex(ctx: &CompileContext<'_>) -> Option<QueryFragment> {
    if ctx.scope != Scope::Root || ctx.is_relation() {
        return None;
    }

    let type_name = ctx.result_type();

    if !ctx.model.is_abstract(type_name) || !ctx.registry.is_discriminated(type_name) {
        return None;
    }

    let collection = ctx.model.collection_for(type_name)?;

    Some(ctx.documents(DocumentSource::Collection(collection.to_owned())))
}

/// Root fields of a concrete type stored in a collection.
pub fn vertex_lookup(ctx: &CompileContext<'_>) -> Option<QueryFragment> {
    if ctx.scope != Scope::Root || ctx.is_relation() {
        return None;
    }

    let type_name = ctx.result_type();

    if ctx.model.is_abstract(type_name) {
        return None;
    }

    let collection = ctx.model.directives_for(type_name).collection()?;

    Some(ctx.documents(DocumentSource::Collection(collection.to_owned())))
}
