use indexmap::IndexMap;
use serde_json::Value;

pub type SelectionArgument = (String, Value);

/// A requested field with its arguments and sub-selections, after fragments, variables
/// and `@skip`/`@include` have been applied.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSelection {
    name: String,
    alias: Option<String>,
    arguments: Vec<SelectionArgument>,
    /// The `... on Type` conditions the field was selected under. Empty for every type.
    type_conditions: Vec<String>,
    nested_selections: Vec<FieldSelection>,
}

impl FieldSelection {
    pub fn with_name(name: impl Into<String>) -> Self {
        Self::new(name, None, Vec::new(), Vec::new())
    }

    pub fn new<T, A, N>(name: T, alias: Option<String>, arguments: A, nested_selections: N) -> Self
    where
        T: Into<String>,
        A: Into<Vec<SelectionArgument>>,
        N: Into<Vec<FieldSelection>>,
    {
        Self {
            name: name.into(),
            alias,
            arguments: arguments.into(),
            type_conditions: Vec::new(),
            nested_selections: nested_selections.into(),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn argument(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.push((name.into(), value.into()));
        self
    }

    pub fn on_type(mut self, type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();

        if !self.type_conditions.contains(&type_name) {
            self.type_conditions.push(type_name);
        }

        self
    }

    pub fn nested(mut self, selection: FieldSelection) -> Self {
        self.nested_selections.push(selection);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The key this field appears under in the response.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn arguments(&self) -> &[SelectionArgument] {
        &self.arguments
    }

    pub fn type_conditions(&self) -> &[String] {
        &self.type_conditions
    }

    /// Whether the field is selected on records of `concrete`, given a subtype check.
    pub fn applies_to(&self, concrete: &str, is_subtype: impl Fn(&str, &str) -> bool) -> bool {
        self.type_conditions.is_empty() || self.type_conditions.iter().any(|c| is_subtype(concrete, c))
    }

    pub(crate) fn set_type_condition(&mut self, type_condition: Option<String>) {
        self.type_conditions = type_condition.into_iter().collect();
    }

    fn merge_type_conditions(&mut self, other: Vec<String>) {
        if self.type_conditions.is_empty() || other.is_empty() {
            self.type_conditions.clear();
            return;
        }

        for condition in other {
            if !self.type_conditions.contains(&condition) {
                self.type_conditions.push(condition);
            }
        }
    }

    pub fn nested_selections(&self) -> &[FieldSelection] {
        &self.nested_selections
    }

    pub fn is_typename(&self) -> bool {
        self.name == "__typename"
    }

    /// Folds selections sharing a response key into one, merging their sub-selections.
    /// The merged field keeps the union of the type conditions, unless one of the
    /// selections had none.
    pub fn merge_duplicates(selections: Vec<FieldSelection>) -> Vec<FieldSelection> {
        let mut merged: IndexMap<String, FieldSelection> = IndexMap::new();

        for selection in selections {
            match merged.get_mut(selection.response_key()) {
                Some(existing) => {
                    existing.merge_type_conditions(selection.type_conditions);
                    existing.nested_selections.extend(selection.nested_selections);
                }
                None => {
                    merged.insert(selection.response_key().to_owned(), selection);
                }
            }
        }

        merged
            .into_values()
            .map(|mut selection| {
                selection.nested_selections = Self::merge_duplicates(std::mem::take(&mut selection.nested_selections));
                selection
            })
            .collect()
    }
}
