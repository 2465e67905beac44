//! Nested Endpoint Store (catch-all)
//!
//! Arbitrarily deep paths addressed without any declared structure.
//!
//! ## Path Resolution
//! ```text
//! /shop/orders/42/lines
//!  │
//!  ├─ root collection:  "shop"
//!  └─ storage key:      "shop-orders-42-lines"
//! ```
//!
//! Reads of unknown paths answer an empty item list. Every mutation
//! rewrites all collection files, not just the touched one.

use parking_lot::RwLockUpgradableReadGuard;
use serde_json::{json, Map, Value};

use crate::collection::{
    item_position, now_timestamp, object_id, Endpoint, Endpoints, StructuredItem,
    CREATED_AT_FIELD, DATA_FIELD, ID_FIELD, ITEMS_FIELD, UPDATED_AT_FIELD,
};
use crate::error::{CrudrexError, Resource, Result};
use crate::storage::validate_collection_name;

use super::{collection_entry, require_object, Engine};

/// Separator joining path segments into a storage key
const KEY_JOINER: &str = "-";

/// A nested path split into root collection and storage key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointPath {
    /// First segment; names the root collection
    pub root: String,

    /// All segments joined by `-`
    pub key: String,
}

impl EndpointPath {
    /// Parse a slash-separated path; empty segments are dropped
    pub fn parse(path: &str) -> Result<Self> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let Some(root) = segments.first() else {
            return Err(CrudrexError::bad_request("Invalid path"));
        };
        validate_collection_name(root)?;

        Ok(Self {
            root: root.to_string(),
            key: segments.join(KEY_JOINER),
        })
    }
}

impl Engine {
    /// Stored endpoint, or `{"items": []}` for a path never written
    pub fn read_endpoint(&self, path: &str) -> Result<Value> {
        let path = EndpointPath::parse(path)?;

        let catalog = self.catalog.upgradable_read();
        if let Some(collection) = catalog.get(&path.root) {
            let stored = collection
                .endpoints(&path.root)?
                .and_then(|endpoints| endpoints.get(&path.key));
            return Ok(stored.map(Endpoint::to_value).unwrap_or_else(empty_endpoint));
        }

        let mut catalog = RwLockUpgradableReadGuard::upgrade(catalog);
        collection_entry(&mut catalog, &path.root)?;
        Ok(empty_endpoint())
    }

    /// Append one object, or every object of an array, as structured items
    ///
    /// Returns the created item for an object payload and
    /// `{"items": [...]}` for an array payload. Non-object array elements
    /// are skipped.
    pub fn append(&self, path: &str, payload: Value) -> Result<Value> {
        let path = EndpointPath::parse(path)?;
        let now = now_timestamp();

        let (created, body) = match payload {
            Value::Array(entries) if !entries.is_empty() => {
                let created: Vec<Value> = entries
                    .into_iter()
                    .filter_map(|entry| match entry {
                        Value::Object(fields) => Some(StructuredItem::wrap(fields, &now).into_value()),
                        _ => None,
                    })
                    .collect();
                let body = json!({ ITEMS_FIELD: created.clone() });
                (created, body)
            }
            Value::Array(_) => return Err(CrudrexError::bad_request("JSON data required")),
            payload => {
                let fields = require_object(payload)?;
                let item = StructuredItem::wrap(fields, &now).into_value();
                (vec![item.clone()], item)
            }
        };

        let count = created.len();
        self.write_nested(&path, |endpoints| {
            item_list(endpoints, &path).extend(created);
            Ok(())
        })?;

        tracing::debug!(key = %path.key, count, "Appended items");
        Ok(body)
    }

    /// Overwrite an endpoint with an arbitrary value
    ///
    /// A payload with an `items` array stays an item list, sibling fields
    /// included. Anything else is stored verbatim, and the next append or
    /// merge on this path discards it and starts a fresh item list.
    pub fn replace_endpoint(&self, path: &str, payload: Value) -> Result<Value> {
        let path = EndpointPath::parse(path)?;

        let stored = payload.clone();
        self.write_nested(&path, |endpoints| {
            endpoints.insert(path.key.clone(), Endpoint::from_value(stored));
            Ok(())
        })?;

        tracing::debug!(key = %path.key, "Replaced endpoint");
        Ok(payload)
    }

    /// Upsert items by id from `{"items": [...]}`
    ///
    /// An entry whose id matches an existing item replaces it wholesale,
    /// keeping that item's `createdAt` and refreshing `updatedAt`; an entry
    /// with an unknown id is appended with both timestamps defaulted.
    /// Entries without an id are ignored. Returns the whole endpoint,
    /// sibling fields of the item list included.
    pub fn merge_endpoint(&self, path: &str, payload: Value) -> Result<Value> {
        let path = EndpointPath::parse(path)?;

        let entries = match payload {
            Value::Object(mut fields) => match fields.shift_remove(ITEMS_FIELD) {
                Some(Value::Array(entries)) => entries,
                _ => return Err(CrudrexError::bad_request("Field 'items' must be an array")),
            },
            _ => return Err(CrudrexError::bad_request("Field 'items' must be an array")),
        };
        let now = now_timestamp();

        let endpoint = self.write_nested(&path, |endpoints| {
            let items = item_list(endpoints, &path);

            for entry in entries {
                let Value::Object(mut fields) = entry else {
                    continue;
                };
                let Some(id) = object_id(&fields) else {
                    continue;
                };

                match item_position(items, &id) {
                    Some(index) => {
                        if let Some(created_at) = items[index].get(CREATED_AT_FIELD) {
                            fields.insert(CREATED_AT_FIELD.to_string(), created_at.clone());
                        }
                        fields.insert(UPDATED_AT_FIELD.to_string(), Value::String(now.clone()));
                        items[index] = Value::Object(fields);
                    }
                    None => {
                        fields
                            .entry(CREATED_AT_FIELD)
                            .or_insert_with(|| Value::String(now.clone()));
                        fields
                            .entry(UPDATED_AT_FIELD)
                            .or_insert_with(|| Value::String(now.clone()));
                        items.push(Value::Object(fields));
                    }
                }
            }

            Ok(endpoints
                .get(&path.key)
                .map(Endpoint::to_value)
                .unwrap_or_else(empty_endpoint))
        })?;

        tracing::debug!(key = %path.key, "Merged endpoint items");
        Ok(endpoint)
    }

    /// Delete a whole endpoint, returning its prior value
    pub fn remove_endpoint(&self, path: &str) -> Result<Value> {
        let path = EndpointPath::parse(path)?;

        let removed = self.write_nested(&path, |endpoints| {
            endpoints
                .remove(&path.key)
                .ok_or(CrudrexError::NotFound(Resource::Endpoint))
        })?;

        tracing::debug!(key = %path.key, "Removed endpoint");
        Ok(removed.into_value())
    }

    // =========================================================================
    // Item-level Operations
    // =========================================================================

    /// One item of the endpoint at `path`
    pub fn get_endpoint_item(&self, path: &str, id: &str) -> Result<Value> {
        let path = EndpointPath::parse(path)?;

        let catalog = self.catalog.read();
        let Some(collection) = catalog.get(&path.root) else {
            return Err(CrudrexError::NotFound(Resource::Item));
        };

        collection
            .endpoints(&path.root)?
            .and_then(|endpoints| endpoints.get(&path.key))
            .and_then(|endpoint| {
                let index = endpoint.position(id)?;
                endpoint.items()?.get(index).cloned()
            })
            .ok_or(CrudrexError::NotFound(Resource::Item))
    }

    /// Replace one item's data, or append it if the id is new
    ///
    /// `data` is the payload's `data` field when present, else the whole
    /// payload. Returns the item and whether it was created.
    pub fn put_endpoint_item(&self, path: &str, id: &str, payload: Value) -> Result<(Value, bool)> {
        let path = EndpointPath::parse(path)?;
        let now = now_timestamp();

        let data = match payload {
            Value::Object(mut fields) if fields.contains_key(DATA_FIELD) => {
                fields.shift_remove(DATA_FIELD).unwrap_or(Value::Null)
            }
            other => other,
        };

        let outcome = self.write_nested(&path, |endpoints| {
            let endpoint = endpoints
                .get_mut(&path.key)
                .ok_or(CrudrexError::NotFound(Resource::Endpoint))?;
            let existing = endpoint.position(id);
            let items = writable_items(endpoint, &path.key);

            let created_at = existing
                .and_then(|index| items[index].get(CREATED_AT_FIELD).cloned())
                .unwrap_or_else(|| Value::String(now.clone()));
            let item = json!({
                ID_FIELD: id,
                CREATED_AT_FIELD: created_at,
                UPDATED_AT_FIELD: now,
                DATA_FIELD: data,
            });

            match existing {
                Some(index) => {
                    items[index] = item.clone();
                    Ok((item, false))
                }
                None => {
                    items.push(item.clone());
                    Ok((item, true))
                }
            }
        })?;

        tracing::debug!(key = %path.key, id = %id, created = outcome.1, "Put endpoint item");
        Ok(outcome)
    }

    /// Shallow-merge into one item
    ///
    /// A payload `data` object merges into the item's `data`; every other
    /// top-level field merges into the item itself. `id` and `createdAt` are
    /// kept, `updatedAt` is refreshed.
    pub fn patch_endpoint_item(&self, path: &str, id: &str, payload: Value) -> Result<Value> {
        let path = EndpointPath::parse(path)?;
        let mut patch = require_object(payload)?;
        let now = now_timestamp();

        let item = self.write_nested(&path, |endpoints| {
            let endpoint = endpoints
                .get_mut(&path.key)
                .ok_or(CrudrexError::NotFound(Resource::Endpoint))?;
            let index = endpoint
                .position(id)
                .ok_or(CrudrexError::NotFound(Resource::Item))?;

            let Some(fields) = endpoint.items_mut()[index].as_object_mut() else {
                return Err(CrudrexError::NotFound(Resource::Item));
            };

            match patch.shift_remove(DATA_FIELD) {
                Some(Value::Object(data_patch)) => {
                    let data = fields
                        .entry(DATA_FIELD)
                        .or_insert_with(|| Value::Object(Map::new()));
                    match data {
                        Value::Object(data) => data.extend(data_patch),
                        other => *other = Value::Object(data_patch),
                    }
                    merge_preserving(fields, patch);
                }
                Some(other) => {
                    patch.insert(DATA_FIELD.to_string(), other);
                    merge_preserving(fields, patch);
                }
                None => merge_preserving(fields, patch),
            }
            fields.insert(UPDATED_AT_FIELD.to_string(), Value::String(now));

            Ok(Value::Object(fields.clone()))
        })?;

        tracing::debug!(key = %path.key, id = %id, "Patched endpoint item");
        Ok(item)
    }

    /// Remove one item, returning it
    pub fn delete_endpoint_item(&self, path: &str, id: &str) -> Result<Value> {
        let path = EndpointPath::parse(path)?;

        let deleted = self.write_nested(&path, |endpoints| {
            let endpoint = endpoints
                .get_mut(&path.key)
                .ok_or(CrudrexError::NotFound(Resource::Endpoint))?;
            let index = endpoint
                .position(id)
                .ok_or(CrudrexError::NotFound(Resource::Item))?;
            Ok(endpoint.items_mut().remove(index))
        })?;

        tracing::debug!(key = %path.key, id = %id, "Deleted endpoint item");
        Ok(deleted)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Run a mutation on the root collection's endpoints, then mirror the
    /// whole catalog. Nothing is mirrored when the mutation fails.
    fn write_nested<T>(
        &self,
        path: &EndpointPath,
        mutate: impl FnOnce(&mut Endpoints) -> Result<T>,
    ) -> Result<T> {
        let mut catalog = self.catalog.write();
        let endpoints = collection_entry(&mut catalog, &path.root)?.endpoints_or_init(&path.root)?;

        let result = mutate(endpoints)?;
        self.persist_all(&catalog)?;
        Ok(result)
    }
}

fn empty_endpoint() -> Value {
    Endpoint::default().into_value()
}

/// Item list of the endpoint at `path`, created if absent
fn item_list<'a>(endpoints: &'a mut Endpoints, path: &EndpointPath) -> &'a mut Vec<Value> {
    let endpoint = endpoints.entry(path.key.clone()).or_default();
    writable_items(endpoint, &path.key)
}

/// Item list of `endpoint`; a replaced value stored there is discarded
fn writable_items<'a>(endpoint: &'a mut Endpoint, key: &str) -> &'a mut Vec<Value> {
    if !endpoint.has_item_list() {
        tracing::warn!(key = %key, "Discarding replaced endpoint value to start an item list");
    }
    endpoint.items_mut()
}

/// Shallow merge that never changes the item's `id` or `createdAt`
fn merge_preserving(fields: &mut Map<String, Value>, patch: Map<String, Value>) {
    let id = fields.get(ID_FIELD).cloned();
    let created_at = fields.get(CREATED_AT_FIELD).cloned();

    fields.extend(patch);

    if let Some(id) = id {
        fields.insert(ID_FIELD.to_string(), id);
    }
    if let Some(created_at) = created_at {
        fields.insert(CREATED_AT_FIELD.to_string(), created_at);
    }
}
