use arango_client::{CollectionKind, IndexSpec};
use graph_schema::DirectiveModel;
use serde::Serialize;

/// Everything the database needs for a schema, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProvisioningPlan {
    pub collections: Vec<CollectionPlan>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionPlan {
    pub name: String,
    pub kind: CollectionKind,
    pub indexes: Vec<IndexSpec>,
}

impl ProvisioningPlan {
    /// Collections come in declaration order. Each collection gets a persistent
    /// index on the discriminator property of the abstract types stored in it,
    /// followed by the `@index` fields of the types stored in it. An abstract type
    /// spread over several collections indexes its discriminator in each of them.
    pub fn calculate(model: &DirectiveModel) -> Self {
        let mut plan = ProvisioningPlan {
            collections: model
                .collections()
                .into_iter()
                .map(|(name, kind)| CollectionPlan {
                    name: name.to_owned(),
                    kind,
                    indexes: Vec::new(),
                })
                .collect(),
        };

        for declaration in model.types() {
            let Some(property) = &declaration.directives.discriminator else {
                continue;
            };

            let collections = match model.collection_for(&declaration.name) {
                Some(collection) => vec![collection],
                None => model
                    .possible_types(&declaration.name)
                    .into_iter()
                    .filter_map(|t| t.directives.collection())
                    .collect(),
            };

            for collection in collections {
                plan.add_index(collection, IndexSpec::persistent(vec![property.clone()]));
            }
        }

        for declaration in model.types() {
            let Some(collection) = model.collection_for(&declaration.name) else {
                continue;
            };

            for field in declaration.fields.values() {
                let Some(index) = &field.directives.index else {
                    continue;
                };

                let spec = IndexSpec {
                    kind: index.kind,
                    fields: vec![field.name.clone()],
                    unique: index.unique,
                    sparse: index.sparse,
                };

                plan.add_index(collection, spec);
            }
        }

        plan
    }

    pub fn collection(&self, name: &str) -> Option<&CollectionPlan> {
        self.collections.iter().find(|c| c.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    fn add_index(&mut self, collection: &str, index: IndexSpec) {
        if let Some(plan) = self.collections.iter_mut().find(|c| c.name == collection) {
            if !plan.indexes.contains(&index) {
                plan.indexes.push(index);
            }
        }
    }
}
