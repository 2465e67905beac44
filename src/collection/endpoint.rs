//! Nested endpoint records
//!
//! An endpoint is either an item list (an object with an `items` array,
//! plus any sibling fields) or whatever other value a full replace wrote
//! over it.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::fields::{generate_id, normalize_id, object_id, ID_FIELD};

/// Field holding an endpoint's item list
pub const ITEMS_FIELD: &str = "items";

pub const CREATED_AT_FIELD: &str = "createdAt";
pub const UPDATED_AT_FIELD: &str = "updatedAt";
pub const DATA_FIELD: &str = "data";

/// Value stored under one storage key of a nested collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Endpoint {
    /// An item list; the only shape append and merge operate on
    Items(ItemList),

    /// Arbitrary value without an `items` array, written by a full replace
    ///
    /// Appending or merging into a replaced endpoint discards this value
    /// and starts a fresh item list.
    Replaced(Value),
}

/// `{"items": [...], ...}`
///
/// Sibling fields (`total`, `page`, ...) ride along untouched when items
/// are appended or merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemList {
    pub items: Vec<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ItemList {
    pub fn into_value(self) -> Value {
        let mut map = Map::new();
        map.insert(ITEMS_FIELD.to_string(), Value::Array(self.items));
        map.extend(self.extra);
        Value::Object(map)
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Endpoint::Items(ItemList::default())
    }
}

impl Endpoint {
    /// Classify a caller-supplied value
    ///
    /// An object whose `items` field is an array becomes an item list,
    /// anything else is stored verbatim as a replaced value.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(mut map) if map.get(ITEMS_FIELD).is_some_and(Value::is_array) => {
                match map.shift_remove(ITEMS_FIELD) {
                    Some(Value::Array(items)) => Endpoint::Items(ItemList { items, extra: map }),
                    _ => Endpoint::Replaced(Value::Object(map)),
                }
            }
            other => Endpoint::Replaced(other),
        }
    }

    /// JSON body for this endpoint
    pub fn to_value(&self) -> Value {
        self.clone().into_value()
    }

    pub fn into_value(self) -> Value {
        match self {
            Endpoint::Items(list) => list.into_value(),
            Endpoint::Replaced(value) => value,
        }
    }

    pub fn has_item_list(&self) -> bool {
        matches!(self, Endpoint::Items(_))
    }

    /// Items of an item-list endpoint
    pub fn items(&self) -> Option<&[Value]> {
        match self {
            Endpoint::Items(list) => Some(&list.items),
            Endpoint::Replaced(_) => None,
        }
    }

    /// Mutable item list, resetting a replaced endpoint to an empty list
    pub fn items_mut(&mut self) -> &mut Vec<Value> {
        if !self.has_item_list() {
            *self = Endpoint::default();
        }
        match self {
            Endpoint::Items(list) => &mut list.items,
            Endpoint::Replaced(_) => unreachable!("endpoint was reset to an item list"),
        }
    }

    /// Position of the item whose normalized id equals `id`
    pub fn position(&self, id: &str) -> Option<usize> {
        item_position(self.items()?, id)
    }
}

/// Position of the item in `items` whose normalized id equals `id`
pub fn item_position(items: &[Value], id: &str) -> Option<usize> {
    items
        .iter()
        .position(|item| item.as_object().and_then(object_id).is_some_and(|item_id| item_id == id))
}

/// Envelope wrapped around every appended payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredItem {
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
    pub data: Map<String, Value>,
}

impl StructuredItem {
    /// Wrap a payload: its `id` is popped (or generated) and the remaining
    /// fields become `data`
    pub fn wrap(mut payload: Map<String, Value>, now: &str) -> Self {
        let id = payload
            .shift_remove(ID_FIELD)
            .and_then(|id| normalize_id(&id))
            .unwrap_or_else(generate_id);

        Self {
            id,
            created_at: now.to_string(),
            updated_at: now.to_string(),
            data: payload,
        }
    }

    pub fn into_value(self) -> Value {
        json!({
            ID_FIELD: self.id,
            CREATED_AT_FIELD: self.created_at,
            UPDATED_AT_FIELD: self.updated_at,
            DATA_FIELD: self.data,
        })
    }
}
