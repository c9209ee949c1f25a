use super::{CompileContext, Scope};
use crate::{DocumentSource, QueryFragment, TraversalStart};

/// Fields with an `@edge` directive: one traversal step from the enclosing document,
/// or from the `@start` vertex when fetching for an already resolved record.
pub fn edge_traversal(ctx: &CompileContext<'_>) -> Option<QueryFragment> {
    let relation = ctx.field.directives.relation.as_ref()?;

    let start = match ctx.scope {
        Scope::Document(variable) => TraversalStart::Variable(variable.to_owned()),
        Scope::StartVertex => TraversalStart::BindParameter,
        Scope::Root | Scope::Embedded(_) => return None,
    };

    Some(ctx.documents(DocumentSource::Traversal {
        start,
        direction: relation.direction,
        edge_collection: relation.collection.clone(),
    }))
}
