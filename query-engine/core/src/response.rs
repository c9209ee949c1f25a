//! The shaped result tree of a fetch.

use indexmap::IndexMap;
use serde::{Serialize, Serializer, ser::SerializeMap};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum ResultNode {
    Null,
    Scalar(Value),
    Object(ResultObject),
    List(Vec<ResultNode>),
}

/// An object tagged with its resolved concrete type.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultObject {
    pub type_name: String,
    pub fields: IndexMap<String, ResultNode>,
}

impl ResultNode {
    pub fn is_null(&self) -> bool {
        matches!(self, ResultNode::Null)
    }

    pub fn as_object(&self) -> Option<&ResultObject> {
        match self {
            ResultNode::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ResultNode]> {
        match self {
            ResultNode::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ResultNode::Null => Value::Null,
            ResultNode::Scalar(value) => value.clone(),
            ResultNode::Object(object) => Value::Object(
                object
                    .fields
                    .iter()
                    .map(|(key, node)| (key.clone(), node.to_json()))
                    .collect(),
            ),
            ResultNode::List(items) => Value::Array(items.iter().map(ResultNode::to_json).collect()),
        }
    }
}

impl ResultObject {
    pub fn get(&self, key: &str) -> Option<&ResultNode> {
        self.fields.get(key)
    }
}

impl Serialize for ResultNode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ResultNode::Null => serializer.serialize_none(),
            ResultNode::Scalar(value) => value.serialize(serializer),
            ResultNode::Object(object) => {
                let mut map = serializer.serialize_map(Some(object.fields.len()))?;

                for (key, node) in &object.fields {
                    map.serialize_entry(key, node)?;
                }

                map.end()
            }
            ResultNode::List(items) => items.serialize(serializer),
        }
    }
}
