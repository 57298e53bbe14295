use serde_json::{Map, Value};

use crate::error::RemapError;

pub type Record = Map<String, Value>;

/// top-level keys that may hold the record list, in lookup order
const RECORD_KEYS: [&str; 2] = ["stops", "route"];

/// A route file split into its record list and whatever surrounds it, so the
/// converted records can be put back in the same shape.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteDocument {
    /// the root value is the record list itself
    Bare(Vec<Record>),
    /// the record list sits under `key` in the root object
    Keyed {
        root: Map<String, Value>,
        key: &'static str,
        records: Vec<Record>,
    },
}

impl RouteDocument {
    pub fn records(&self) -> &[Record] {
        match self {
            RouteDocument::Bare(records) => records,
            RouteDocument::Keyed { records, .. } => records,
        }
    }

    pub fn records_mut(&mut self) -> &mut Vec<Record> {
        match self {
            RouteDocument::Bare(records) => records,
            RouteDocument::Keyed { records, .. } => records,
        }
    }

    pub fn shape(&self) -> &'static str {
        match self {
            RouteDocument::Bare(_) => "list",
            RouteDocument::Keyed { key, .. } => *key,
        }
    }
}

impl TryFrom<Value> for RouteDocument {
    type Error = RemapError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Array(items) => Ok(RouteDocument::Bare(into_records(items)?)),
            Value::Object(mut root) => {
                let key = RECORD_KEYS
                    .into_iter()
                    .find(|key| matches!(root.get(*key), Some(Value::Array(_))))
                    .ok_or(RemapError::UnsupportedShape)?;
                // leave a placeholder so the key keeps its position in the root
                let items = match root.get_mut(key).map(Value::take) {
                    Some(Value::Array(items)) => items,
                    _ => return Err(RemapError::UnsupportedShape),
                };
                Ok(RouteDocument::Keyed {
                    root,
                    key,
                    records: into_records(items)?,
                })
            }
            _ => Err(RemapError::UnsupportedShape),
        }
    }
}

impl From<RouteDocument> for Value {
    fn from(document: RouteDocument) -> Self {
        match document {
            RouteDocument::Bare(records) => from_records(records),
            RouteDocument::Keyed {
                mut root,
                key,
                records,
            } => {
                root.insert(key.to_owned(), from_records(records));
                Value::Object(root)
            }
        }
    }
}

fn into_records(items: Vec<Value>) -> Result<Vec<Record>, RemapError> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(record) => Ok(record),
            _ => Err(RemapError::RecordNotObject { index }),
        })
        .collect()
}

fn from_records(records: Vec<Record>) -> Value {
    Value::Array(records.into_iter().map(Value::Object).collect())
}
