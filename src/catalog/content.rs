/*!
 * Content blocks: the nested source-language text of one page section.
 *
 * A block maps string keys to strings, arrays of strings, or nested
 * blocks. Key order is preserved so that prompts and exports reproduce
 * the catalog exactly as written.
 */

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::InputError;

/// Nested content tree for one section
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct ContentBlock(Map<String, Value>);

impl ContentBlock {
    /// Create an empty block
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Parse and validate a block from JSON text
    pub fn from_json_str(text: &str) -> Result<Self, InputError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| InputError::InvalidJson(e.to_string()))?;
        Self::from_value(value)
    }

    /// Validate a JSON value as a content block
    pub fn from_value(value: Value) -> Result<Self, InputError> {
        match value {
            Value::Object(map) => {
                validate_map(&map, "")?;
                Ok(Self(map))
            }
            _ => Err(InputError::NotAnObject),
        }
    }

    /// Add a text value
    pub fn text(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.0.insert(key.into(), Value::String(text.into()));
        self
    }

    /// Add a list of strings
    pub fn list<S: AsRef<str>>(mut self, key: impl Into<String>, items: &[S]) -> Self {
        let items = items
            .iter()
            .map(|s| Value::String(s.as_ref().to_string()))
            .collect();
        self.0.insert(key.into(), Value::Array(items));
        self
    }

    /// Add a nested block
    pub fn block(mut self, key: impl Into<String>, block: ContentBlock) -> Self {
        self.0.insert(key.into(), Value::Object(block.0));
        self
    }

    /// Look up a top-level value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Number of top-level keys
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the block has no keys
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying map
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Compact JSON text of the block
    pub fn to_json_string(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }

    /// All string leaf values in document order, keys excluded
    pub fn string_leaves(&self) -> Vec<&str> {
        let mut leaves = Vec::new();
        for value in self.0.values() {
            collect_leaves(value, &mut leaves);
        }
        leaves
    }

    /// Whether `other` has the same key structure and value kinds
    pub fn mirrors(&self, other: &ContentBlock) -> bool {
        maps_mirror(&self.0, &other.0)
    }
}

impl TryFrom<Value> for ContentBlock {
    type Error = InputError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<ContentBlock> for Value {
    fn from(block: ContentBlock) -> Self {
        Value::Object(block.0)
    }
}

fn validate_map(map: &Map<String, Value>, prefix: &str) -> Result<(), InputError> {
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            Value::String(_) => {}
            Value::Object(nested) => validate_map(nested, &path)?,
            Value::Array(items) => {
                if let Some(index) = items.iter().position(|item| !item.is_string()) {
                    return Err(InputError::InvalidValue {
                        path: format!("{}[{}]", path, index),
                        reason: "arrays may only contain strings".to_string(),
                    });
                }
            }
            other => {
                return Err(InputError::InvalidValue {
                    path,
                    reason: format!("expected text, list or object, found {}", kind_name(other)),
                });
            }
        }
    }
    Ok(())
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn collect_leaves<'a>(value: &'a Value, leaves: &mut Vec<&'a str>) {
    match value {
        Value::String(s) => leaves.push(s),
        Value::Array(items) => items.iter().for_each(|item| collect_leaves(item, leaves)),
        Value::Object(map) => map.values().for_each(|item| collect_leaves(item, leaves)),
        _ => {}
    }
}

fn maps_mirror(left: &Map<String, Value>, right: &Map<String, Value>) -> bool {
    if left.len() != right.len() {
        return false;
    }

    left.iter().all(|(key, value)| match right.get(key) {
        Some(other) => values_mirror(value, other),
        None => false,
    })
}

fn values_mirror(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::String(_), Value::String(_)) => true,
        (Value::Array(a), Value::Array(b)) => a.len() == b.len(),
        (Value::Object(a), Value::Object(b)) => maps_mirror(a, b),
        _ => false,
    }
}
