use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// An AQL query string together with its bind parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AqlQuery {
    pub query: String,
    #[serde(rename = "bindVars")]
    pub bind_vars: Map<String, Value>,
}

impl AqlQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            bind_vars: Map::new(),
        }
    }

    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.bind_vars.insert(name.into(), value.into());
    }

    /// Collection bind parameters are stored with an extra `@` prefix.
    pub fn bind_collection(&mut self, name: impl AsRef<str>, collection: impl Into<String>) {
        self.bind_vars
            .insert(format!("@{}", name.as_ref()), Value::String(collection.into()));
    }
}

impl fmt::Display for AqlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.query)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Document,
    Edge,
}

impl CollectionKind {
    /// The numeric collection type of the HTTP API.
    pub fn type_code(self) -> u8 {
        match self {
            CollectionKind::Document => 2,
            CollectionKind::Edge => 3,
        }
    }

    pub fn from_type_code(code: u64) -> Option<Self> {
        match code {
            2 => Some(CollectionKind::Document),
            3 => Some(CollectionKind::Edge),
            _ => None,
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionKind::Document => f.write_str("document"),
            CollectionKind::Edge => f.write_str("edge"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    Persistent,
    Fulltext,
    Geo,
}

/// An index definition as accepted by `POST /_api/index`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexSpec {
    #[serde(rename = "type")]
    pub kind: IndexKind,
    pub fields: Vec<String>,
    pub unique: bool,
    pub sparse: bool,
}

impl IndexSpec {
    pub fn persistent(fields: Vec<String>) -> Self {
        Self {
            kind: IndexKind::Persistent,
            fields,
            unique: false,
            sparse: false,
        }
    }
}
