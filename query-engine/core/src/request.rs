//! Answers whole GraphQL query documents.

use crate::{DataFetcher, FetchError, FetchParent, FieldPath, FieldSelection, RequestError, ResultNode};
use graphql_parser::query::{
    self, Definition, Directive, FragmentDefinition, OperationDefinition, Selection, SelectionSet, TypeCondition,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::{collections::HashMap, sync::Arc};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLRequest {
    pub query: String,
    #[serde(default)]
    pub operation_name: Option<String>,
    #[serde(default)]
    pub variables: Map<String, Value>,
}

impl GraphQLRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_variables(mut self, variables: Map<String, Value>) -> Self {
        self.variables = variables;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQLResponse {
    pub data: Option<IndexMap<String, ResultNode>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQLError>,
}

impl GraphQLResponse {
    fn request_error(message: String) -> Self {
        Self {
            data: None,
            errors: vec![GraphQLError { message, path: None }],
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQLError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<FieldPath>,
}

/// Resolves the top-level fields of a query concurrently through the [DataFetcher].
#[derive(Debug, Clone)]
pub struct RequestHandler {
    fetcher: Arc<DataFetcher>,
}

impl RequestHandler {
    pub fn new(fetcher: Arc<DataFetcher>) -> Self {
        Self { fetcher }
    }

    pub async fn handle(&self, request: GraphQLRequest) -> GraphQLResponse {
        let selections = match parse_request(&request) {
            Ok(selections) => selections,
            Err(err) => return GraphQLResponse::request_error(err.to_string()),
        };

        let mut prepared = Vec::with_capacity(selections.len());

        for selection in &selections {
            match self.fetcher.prepare(selection, &FetchParent::Root) {
                Ok(field) => prepared.push((selection.response_key(), field)),
                Err(err) => {
                    let error = FetchError::from(err);
                    return GraphQLResponse::request_error(error.to_string());
                }
            }
        }

        let results = futures::future::join_all(prepared.iter().map(|(key, field)| async move {
            let path = FieldPath::root().key(*key);
            self.fetcher.execute_prepared(field, &path).await
        }))
        .await;

        let mut data = Some(IndexMap::with_capacity(results.len()));
        let mut errors = Vec::new();

        for ((key, _), result) in prepared.iter().zip(results) {
            errors.extend(result.errors.into_iter().map(|err| GraphQLError {
                message: err.message,
                path: Some(err.path),
            }));

            match result.data {
                Some(node) => {
                    if let Some(data) = data.as_mut() {
                        data.insert((*key).to_owned(), node);
                    }
                }
                // A non-null top-level field failed.
                None => data = None,
            }
        }

        GraphQLResponse { data, errors }
    }
}

fn parse_request(request: &GraphQLRequest) -> Result<Vec<FieldSelection>, RequestError> {
    let document = query::parse_query::<String>(&request.query).map_err(|err| RequestError::Parse(err.to_string()))?;

    let mut operations = Vec::new();
    let mut fragments = HashMap::new();

    for definition in &document.definitions {
        match definition {
            Definition::Operation(operation) => operations.push(operation),
            Definition::Fragment(fragment) => {
                fragments.insert(fragment.name.as_str(), fragment);
            }
        }
    }

    let operation = select_operation(&operations, request.operation_name.as_deref())?;

    let (variable_definitions, selection_set) = match operation {
        OperationDefinition::SelectionSet(selection_set) => (&[][..], selection_set),
        OperationDefinition::Query(query) => (query.variable_definitions.as_slice(), &query.selection_set),
        OperationDefinition::Mutation(_) => return Err(RequestError::UnsupportedOperation("mutation")),
        OperationDefinition::Subscription(_) => return Err(RequestError::UnsupportedOperation("subscription")),
    };

    let mut variables = Map::new();

    for definition in variable_definitions {
        let value = match request.variables.get(&definition.name) {
            Some(value) => value.clone(),
            None => definition
                .default_value
                .as_ref()
                .map(|value| to_json(value, &Map::new()))
                .unwrap_or(Value::Null),
        };

        variables.insert(definition.name.clone(), value);
    }

    let collector = FieldCollector {
        fragments: &fragments,
        variables: &variables,
    };

    let mut selections = Vec::new();
    collector.collect(selection_set, None, &mut Vec::new(), &mut selections)?;

    Ok(FieldSelection::merge_duplicates(selections))
}

fn select_operation<'a, 'b>(
    operations: &[&'a OperationDefinition<'b, String>],
    name: Option<&str>,
) -> Result<&'a OperationDefinition<'b, String>, RequestError> {
    let operation_name = |operation: &OperationDefinition<'b, String>| match operation {
        OperationDefinition::SelectionSet(_) => None,
        OperationDefinition::Query(query) => query.name.clone(),
        OperationDefinition::Mutation(mutation) => mutation.name.clone(),
        OperationDefinition::Subscription(subscription) => subscription.name.clone(),
    };

    match (name, operations) {
        (Some(name), _) => operations
            .iter()
            .find(|operation| operation_name(**operation).as_deref() == Some(name))
            .copied()
            .ok_or_else(|| RequestError::UnknownOperation(name.to_owned())),
        (None, [operation]) => Ok(*operation),
        (None, []) => Err(RequestError::Parse("the document contains no operation".to_owned())),
        (None, _) => Err(RequestError::AmbiguousOperation),
    }
}

struct FieldCollector<'a, 'b> {
    fragments: &'a HashMap<&'a str, &'a FragmentDefinition<'b, String>>,
    variables: &'a Map<String, Value>,
}

impl<'a, 'b> FieldCollector<'a, 'b> {
    fn collect(
        &self,
        selection_set: &'a SelectionSet<'b, String>,
        type_condition: Option<&str>,
        visiting: &mut Vec<&'a str>,
        out: &mut Vec<FieldSelection>,
    ) -> Result<(), RequestError> {
        for item in &selection_set.items {
            match item {
                Selection::Field(field) => {
                    if !self.included(&field.directives) {
                        continue;
                    }

                    let arguments: Vec<_> = field
                        .arguments
                        .iter()
                        .map(|(name, value)| (name.clone(), to_json(value, self.variables)))
                        .collect();

                    let mut nested = Vec::new();
                    self.collect(&field.selection_set, None, visiting, &mut nested)?;

                    let mut selection = FieldSelection::new(field.name.clone(), field.alias.clone(), arguments, nested);
                    selection.set_type_condition(type_condition.map(str::to_owned));

                    out.push(selection);
                }
                Selection::InlineFragment(fragment) => {
                    if !self.included(&fragment.directives) {
                        continue;
                    }

                    let condition = match &fragment.type_condition {
                        Some(TypeCondition::On(name)) => Some(name.as_str()),
                        None => type_condition,
                    };

                    self.collect(&fragment.selection_set, condition, visiting, out)?;
                }
                Selection::FragmentSpread(spread) => {
                    if !self.included(&spread.directives) {
                        continue;
                    }

                    let name = spread.fragment_name.as_str();

                    let fragment = self
                        .fragments
                        .get(name)
                        .ok_or_else(|| RequestError::UnknownFragment(name.to_owned()))?;

                    if visiting.contains(&fragment.name.as_str()) {
                        return Err(RequestError::FragmentCycle(name.to_owned()));
                    }

                    let TypeCondition::On(condition) = &fragment.type_condition;

                    visiting.push(fragment.name.as_str());
                    self.collect(&fragment.selection_set, Some(condition.as_str()), visiting, out)?;
                    visiting.pop();
                }
            }
        }

        Ok(())
    }

    /// Evaluates `@skip(if:)` and `@include(if:)`.
    fn included(&self, directives: &[Directive<'b, String>]) -> bool {
        directives.iter().all(|directive| {
            let condition = directive
                .arguments
                .iter()
                .find(|(name, _)| name == "if")
                .map(|(_, value)| to_json(value, self.variables))
                .and_then(|value| value.as_bool());

            match (directive.name.as_str(), condition) {
                ("skip", Some(skip)) => !skip,
                ("include", Some(include)) => include,
                _ => true,
            }
        })
    }
}

fn to_json(value: &query::Value<'_, String>, variables: &Map<String, Value>) -> Value {
    match value {
        query::Value::Variable(name) => variables.get(name).cloned().unwrap_or(Value::Null),
        query::Value::Int(number) => number.as_i64().map(Value::from).unwrap_or(Value::Null),
        query::Value::Float(number) => Number::from_f64(*number).map(Value::Number).unwrap_or(Value::Null),
        query::Value::String(string) => Value::String(string.clone()),
        query::Value::Boolean(boolean) => Value::Bool(*boolean),
        query::Value::Null => Value::Null,
        query::Value::Enum(name) => Value::String(name.clone()),
        query::Value::List(items) => Value::Array(items.iter().map(|item| to_json(item, variables)).collect()),
        query::Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(key, value)| (key.clone(), to_json(value, variables)))
                .collect(),
        ),
    }
}
