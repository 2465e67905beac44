//! Collection Module
//!
//! In-memory representation of one named collection.
//!
//! ## Shapes
//! A collection is either flat (record id → JSON object) or nested
//! (storage key → [`Endpoint`]). The shape is fixed by the first write
//! that leaves data in it; a freshly created collection stays
//! [`Collection::Empty`] until then, and a shaped collection with nothing
//! left in it may be reshaped. Touching a populated collection through the
//! other access style is a [`CrudrexError::ShapeConflict`], never a silent
//! reinterpretation.
//!
//! On load the shape is read from the keys alone: a file whose keys are
//! all storage keys of the collection is nested, anything else is flat.
//!
//! ## Data Structure Choice
//! - Flat records live in a `serde_json::Map` (insertion ordered), so
//!   listings come back in creation order.
//! - Nested endpoints live in a `BTreeMap` keyed by storage key.

mod endpoint;
mod fields;

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::Serializer;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{CrudrexError, Result};

pub use endpoint::{
    item_position, Endpoint, ItemList, StructuredItem, CREATED_AT_FIELD, DATA_FIELD, ITEMS_FIELD,
    UPDATED_AT_FIELD,
};
pub use fields::{
    display_value, generate_id, is_blank, matches_filters, normalize_id, now_timestamp, object_id,
    ID_FIELD,
};

/// Flat records: normalized id → record
pub type Records = Map<String, Value>;

/// Nested endpoints: storage key → endpoint
pub type Endpoints = BTreeMap<String, Endpoint>;

/// Every collection, by name
pub type Catalog = BTreeMap<String, Collection>;

/// Which access style a collection has been shaped by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Empty,
    Flat,
    Nested,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Empty => f.write_str("nothing"),
            Shape::Flat => f.write_str("flat records"),
            Shape::Nested => f.write_str("nested endpoints"),
        }
    }
}

/// One named collection
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Collection {
    /// Created but not yet written to
    #[default]
    Empty,

    Flat(Records),

    Nested(Endpoints),
}

impl Collection {
    /// Rebuild the collection `name` from its persisted JSON value
    ///
    /// Nested writes only ever create storage keys that are `name` itself
    /// or start with `name-`, so an object whose keys all have that form
    /// is nested. Any other object of objects is flat; a record without a
    /// usable id takes its key as id. `{}` is empty.
    pub fn from_value(name: &str, value: Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(CrudrexError::Serialization(
                "collection file must hold a JSON object".to_string(),
            ));
        };

        if map.is_empty() {
            return Ok(Collection::Empty);
        }

        if map.keys().all(|key| is_storage_key(name, key)) {
            let endpoints = map
                .into_iter()
                .map(|(key, value)| (key, Endpoint::from_value(value)))
                .collect();
            return Ok(Collection::Nested(endpoints));
        }

        let mut records = Records::new();
        for (key, record) in map {
            let Value::Object(mut fields) = record else {
                return Err(CrudrexError::Serialization(format!(
                    "record '{}' is not a JSON object",
                    key
                )));
            };
            if object_id(&fields).is_none() {
                fields.insert(ID_FIELD.to_string(), Value::String(key.clone()));
            }
            records.insert(key, Value::Object(fields));
        }
        Ok(Collection::Flat(records))
    }

    pub fn shape(&self) -> Shape {
        match self {
            Collection::Empty => Shape::Empty,
            Collection::Flat(_) => Shape::Flat,
            Collection::Nested(_) => Shape::Nested,
        }
    }

    /// Number of records or endpoints
    pub fn len(&self) -> usize {
        match self {
            Collection::Empty => 0,
            Collection::Flat(records) => records.len(),
            Collection::Nested(endpoints) => endpoints.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // =========================================================================
    // Flat Access
    // =========================================================================

    /// Flat records, `None` while the collection holds nothing
    pub fn records(&self, name: &str) -> Result<Option<&Records>> {
        match self {
            Collection::Flat(records) => Ok(Some(records)),
            other if other.is_empty() => Ok(None),
            other => Err(CrudrexError::shape_conflict(name, Shape::Flat, other.shape())),
        }
    }

    pub fn records_mut(&mut self, name: &str) -> Result<Option<&mut Records>> {
        if self.is_empty() && !matches!(self, Collection::Flat(_)) {
            return Ok(None);
        }
        let found = self.shape();
        match self {
            Collection::Flat(records) => Ok(Some(records)),
            _ => Err(CrudrexError::shape_conflict(name, Shape::Flat, found)),
        }
    }

    /// Flat records, shaping an empty collection as flat
    pub fn records_or_init(&mut self, name: &str) -> Result<&mut Records> {
        if !matches!(self, Collection::Flat(_)) && self.is_empty() {
            *self = Collection::Flat(Records::new());
        }
        let found = self.shape();
        match self {
            Collection::Flat(records) => Ok(records),
            _ => Err(CrudrexError::shape_conflict(name, Shape::Flat, found)),
        }
    }

    // =========================================================================
    // Nested Access
    // =========================================================================

    /// Nested endpoints, `None` while the collection holds nothing
    pub fn endpoints(&self, name: &str) -> Result<Option<&Endpoints>> {
        match self {
            Collection::Nested(endpoints) => Ok(Some(endpoints)),
            other if other.is_empty() => Ok(None),
            other => Err(CrudrexError::shape_conflict(name, Shape::Nested, other.shape())),
        }
    }

    pub fn endpoints_mut(&mut self, name: &str) -> Result<Option<&mut Endpoints>> {
        if self.is_empty() && !matches!(self, Collection::Nested(_)) {
            return Ok(None);
        }
        let found = self.shape();
        match self {
            Collection::Nested(endpoints) => Ok(Some(endpoints)),
            _ => Err(CrudrexError::shape_conflict(name, Shape::Nested, found)),
        }
    }

    /// Nested endpoints, shaping an empty collection as nested
    pub fn endpoints_or_init(&mut self, name: &str) -> Result<&mut Endpoints> {
        if !matches!(self, Collection::Nested(_)) && self.is_empty() {
            *self = Collection::Nested(Endpoints::new());
        }
        let found = self.shape();
        match self {
            Collection::Nested(endpoints) => Ok(endpoints),
            _ => Err(CrudrexError::shape_conflict(name, Shape::Nested, found)),
        }
    }
}

impl Serialize for Collection {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Collection::Empty => Records::new().serialize(serializer),
            Collection::Flat(records) => records.serialize(serializer),
            Collection::Nested(endpoints) => endpoints.serialize(serializer),
        }
    }
}

/// `name` or `name-...`: a key the nested store can produce under `name`
fn is_storage_key(name: &str, key: &str) -> bool {
    key.strip_prefix(name)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('-'))
}
