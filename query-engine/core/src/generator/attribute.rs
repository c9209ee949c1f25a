use super::{CompileContext, Scope};
use crate::{AttributeFragment, QueryFragment};

/// Scalars, enums and embedded objects read off the enclosing document.
pub fn attribute(ctx: &CompileContext<'_>) -> Option<QueryFragment> {
    let variable = match ctx.scope {
        Scope::Document(variable) | Scope::Embedded(variable) => variable,
        Scope::Root | Scope::StartVertex => return None,
    };

    if ctx.is_relation() || ctx.model.collection_for(ctx.result_type()).is_some() {
        return None;
    }

    Some(QueryFragment::Attribute(AttributeFragment {
        variable: variable.to_owned(),
        attribute: ctx.field.name.clone(),
    }))
}
