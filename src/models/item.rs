//! Content item record
//!
//! Items are exchanged with the content service as JSON objects. The admin
//! tool only interprets the identity and the parent reference fields; all
//! other fields travel through to the templates untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ContentType;

/// A content item as returned by the content service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Identity assigned by the content service
    pub id: i64,
    /// Remaining fields of the record
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Item {
    pub fn new(id: i64, fields: Map<String, Value>) -> Self {
        Self { id, fields }
    }

    /// Build an item from a JSON object literal, ignoring any `id` field in it
    pub fn from_value(id: i64, value: Value) -> Self {
        let mut fields = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        fields.remove("id");
        Self { id, fields }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Integer field; numeric strings are accepted as well
    pub fn get_i64(&self, field: &str) -> Option<i64> {
        match self.fields.get(field)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    pub fn get_bool(&self, field: &str) -> Option<bool> {
        self.fields.get(field).and_then(Value::as_bool)
    }

    /// Resolve the declared parent reference of this item
    ///
    /// Returns the first parent field of the type's descriptor that is set on
    /// the item, as `(parent type, parent id)`.
    pub fn parent_ref(&self, kind: ContentType) -> Option<(ContentType, i64)> {
        kind.descriptor()
            .parents
            .iter()
            .find_map(|p| self.get_i64(p.field).map(|id| (p.kind, id)))
    }

    /// Whether this item belongs to the given parent
    pub fn belongs_to(&self, kind: ContentType, parent: ContentType, parent_id: i64) -> bool {
        self.parent_ref(kind) == Some((parent, parent_id))
    }

    /// Human readable label used in lists and confirmation pages
    pub fn label(&self) -> String {
        ["name", "title"]
            .iter()
            .find_map(|f| self.get_str(f).filter(|s| !s.trim().is_empty()))
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{}", self.id))
    }

    /// Merge patch fields over the current ones
    pub fn apply_patch(&mut self, patch: Map<String, Value>) {
        for (key, value) in patch {
            if key != "id" {
                self.fields.insert(key, value);
            }
        }
    }
}
