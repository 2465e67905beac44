//! Flat Collection Store
//!
//! Collections as `id → record` maps. Every mutation rewrites the owning
//! collection's mirror file.

use std::collections::HashMap;

use serde_json::Value;

use crate::collection::{
    generate_id, matches_filters, object_id, Catalog, Collection, Records, ID_FIELD,
};
use crate::error::{CrudrexError, Resource, Result};
use crate::storage::validate_collection_name;

use super::{collection_entry, require_object, Engine};

impl Engine {
    /// Names of every collection, sorted
    pub fn list_collections(&self) -> Vec<String> {
        self.catalog.read().keys().cloned().collect()
    }

    /// Create an empty collection and mirror it immediately
    pub fn create_collection(&self, name: &str) -> Result<()> {
        validate_collection_name(name)?;

        let mut catalog = self.catalog.write();
        if catalog.contains_key(name) {
            return Err(CrudrexError::AlreadyExists(name.to_string()));
        }

        catalog.insert(name.to_string(), Collection::Empty);
        self.persist(&catalog, name)?;

        tracing::info!(collection = %name, "Created collection");
        Ok(())
    }

    /// Records of a collection, in insertion order, filtered by equality
    ///
    /// See [`matches_filters`]: a filter key the record lacks does not
    /// exclude it.
    pub fn list_items(&self, name: &str, filters: &HashMap<String, String>) -> Result<Vec<Value>> {
        let catalog = self.catalog.read();
        let collection = catalog
            .get(name)
            .ok_or(CrudrexError::NotFound(Resource::Collection))?;

        let Some(records) = collection.records(name)? else {
            return Ok(Vec::new());
        };

        Ok(records
            .values()
            .filter(|record| matches_filters(record, filters))
            .cloned()
            .collect())
    }

    /// Store a new record, generating its id if the payload has none
    ///
    /// Creates the collection if it does not exist yet.
    pub fn create_item(&self, name: &str, payload: Value) -> Result<Value> {
        let mut record = require_object(payload)?;

        let mut catalog = self.catalog.write();
        let records = collection_entry(&mut catalog, name)?.records_or_init(name)?;

        let id = match object_id(&record) {
            Some(id) => id,
            None => {
                let id = fresh_id(records);
                record.insert(ID_FIELD.to_string(), Value::String(id.clone()));
                id
            }
        };

        let record = Value::Object(record);
        records.insert(id.clone(), record.clone());
        self.persist(&catalog, name)?;

        tracing::debug!(collection = %name, id = %id, "Created item");
        Ok(record)
    }

    /// Store a record under an explicit id, inserting or overwriting
    ///
    /// Creates the collection if it does not exist yet.
    pub fn put_item(&self, name: &str, id: &str, payload: Value) -> Result<Value> {
        let mut record = require_object(payload)?;
        record.insert(ID_FIELD.to_string(), Value::String(id.to_string()));

        let mut catalog = self.catalog.write();
        let records = collection_entry(&mut catalog, name)?.records_or_init(name)?;

        let record = Value::Object(record);
        records.insert(id.to_string(), record.clone());
        self.persist(&catalog, name)?;

        tracing::debug!(collection = %name, id = %id, "Put item");
        Ok(record)
    }

    pub fn get_item(&self, name: &str, id: &str) -> Result<Value> {
        let catalog = self.catalog.read();
        let collection = catalog
            .get(name)
            .ok_or(CrudrexError::NotFound(Resource::Collection))?;

        collection
            .records(name)?
            .and_then(|records| records.get(id))
            .cloned()
            .ok_or(CrudrexError::NotFound(Resource::Item))
    }

    /// Overwrite an existing record; its id is forced to `id`
    pub fn replace_item(&self, name: &str, id: &str, payload: Value) -> Result<Value> {
        let mut record = require_object(payload)?;
        record.insert(ID_FIELD.to_string(), Value::String(id.to_string()));

        let mut catalog = self.catalog.write();
        let existing = existing_record(&mut catalog, name, id)?;

        *existing = Value::Object(record);
        let record = existing.clone();
        self.persist(&catalog, name)?;

        tracing::debug!(collection = %name, id = %id, "Replaced item");
        Ok(record)
    }

    /// Shallow merge: top-level keys of the patch overwrite the record's
    ///
    /// Nested objects are replaced, not merged. The record keeps its id.
    pub fn merge_item(&self, name: &str, id: &str, patch: Value) -> Result<Value> {
        let patch = require_object(patch)?;

        let mut catalog = self.catalog.write();
        let existing = existing_record(&mut catalog, name, id)?;

        if let Value::Object(fields) = existing {
            let own_id = fields.get(ID_FIELD).cloned();
            fields.extend(patch);
            if let Some(own_id) = own_id {
                fields.insert(ID_FIELD.to_string(), own_id);
            }
        }
        let record = existing.clone();
        self.persist(&catalog, name)?;

        tracing::debug!(collection = %name, id = %id, "Merged item");
        Ok(record)
    }

    /// Remove a record, returning it
    pub fn delete_item(&self, name: &str, id: &str) -> Result<Value> {
        let mut catalog = self.catalog.write();
        let collection = catalog
            .get_mut(name)
            .ok_or(CrudrexError::NotFound(Resource::Collection))?;

        let deleted = collection
            .records_mut(name)?
            .and_then(|records| records.shift_remove(id))
            .ok_or(CrudrexError::NotFound(Resource::Item))?;
        self.persist(&catalog, name)?;

        tracing::debug!(collection = %name, id = %id, "Deleted item");
        Ok(deleted)
    }
}

/// Mutable reference to an existing record
fn existing_record<'a>(catalog: &'a mut Catalog, name: &str, id: &str) -> Result<&'a mut Value> {
    let collection = catalog
        .get_mut(name)
        .ok_or(CrudrexError::NotFound(Resource::Collection))?;

    collection
        .records_mut(name)?
        .and_then(|records| records.get_mut(id))
        .ok_or(CrudrexError::NotFound(Resource::Item))
}

/// A generated id not yet used in `records`
fn fresh_id(records: &Records) -> String {
    loop {
        let id = generate_id();
        if !records.contains_key(&id) {
            return id;
        }
    }
}
