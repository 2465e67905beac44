//! Tests for Collection
//!
//! These tests verify:
//! - Shape detection from persisted values
//! - Reshaping of empty collections
//! - Shape conflicts on populated collections
//! - Serialization of each shape

use crudrex::collection::{Collection, Endpoint, Shape};
use crudrex::error::CrudrexError;
use serde_json::json;

// =============================================================================
// Shape Detection Tests
// =============================================================================

#[test]
fn test_empty_object_is_empty_collection() {
    let collection = Collection::from_value("c", json!({})).unwrap();

    assert_eq!(collection, Collection::Empty);
    assert_eq!(collection.shape(), Shape::Empty);
}

#[test]
fn test_records_keyed_by_id_are_flat() {
    let collection = Collection::from_value(
        "products",
        json!({
            "a1": {"id": "a1", "name": "A"},
            "42": {"id": 42, "name": "B"},
        }),
    )
    .unwrap();

    assert_eq!(collection.shape(), Shape::Flat);
    assert_eq!(collection.len(), 2);
}

#[test]
fn test_records_without_id_are_flat_and_take_their_key() {
    let collection = Collection::from_value(
        "products",
        json!({"p1": {"name": "A"}, "p2": {"name": "B"}}),
    )
    .unwrap();

    let records = collection.records("products").unwrap().unwrap();
    assert_eq!(records["p1"], json!({"name": "A", "id": "p1"}));
    assert_eq!(records["p2"]["id"], "p2");
}

#[test]
fn test_storage_keys_are_nested() {
    let collection = Collection::from_value(
        "shop",
        json!({
            "shop-orders": {"items": [{"id": "x", "data": {}}]},
            "shop-config": {"theme": "dark"},
        }),
    )
    .unwrap();

    let Collection::Nested(endpoints) = &collection else {
        panic!("expected nested, got {:?}", collection.shape());
    };
    assert!(endpoints["shop-orders"].has_item_list());
    assert_eq!(endpoints["shop-config"], Endpoint::Replaced(json!({"theme": "dark"})));
}

#[test]
fn test_root_endpoint_carrying_its_key_as_id_is_nested() {
    let collection = Collection::from_value(
        "users",
        json!({"users": {"id": "users", "name": "x"}}),
    )
    .unwrap();

    assert_eq!(collection.shape(), Shape::Nested);
}

#[test]
fn test_key_sharing_only_a_prefix_is_not_a_storage_key() {
    let collection = Collection::from_value("user", json!({"users": {"id": "users"}})).unwrap();

    assert_eq!(collection.shape(), Shape::Flat);
}

#[test]
fn test_invalid_values_are_rejected() {
    let err = Collection::from_value("c", json!([1, 2])).unwrap_err();
    assert!(matches!(err, CrudrexError::Serialization(_)));

    let err = Collection::from_value("c", json!({"a": 1})).unwrap_err();
    assert!(matches!(err, CrudrexError::Serialization(_)));
}

// =============================================================================
// Access Style Tests
// =============================================================================

#[test]
fn test_empty_collection_takes_either_shape() {
    let mut flat = Collection::Empty;
    flat.records_or_init("c").unwrap();
    assert_eq!(flat.shape(), Shape::Flat);

    let mut nested = Collection::Empty;
    nested.endpoints_or_init("c").unwrap();
    assert_eq!(nested.shape(), Shape::Nested);
}

#[test]
fn test_empty_readers_answer_none() {
    let collection = Collection::Empty;

    assert!(collection.records("c").unwrap().is_none());
    assert!(collection.endpoints("c").unwrap().is_none());
}

#[test]
fn test_populated_collection_refuses_other_style() {
    let mut collection = Collection::from_value("c", json!({"a": {"id": "a"}})).unwrap();

    let err = collection.endpoints_or_init("c").unwrap_err();
    assert!(matches!(
        err,
        CrudrexError::ShapeConflict {
            expected: Shape::Nested,
            found: Shape::Flat,
            ..
        }
    ));
    assert!(collection.endpoints("c").is_err());
    assert!(collection.endpoints_mut("c").is_err());
    assert_eq!(collection.shape(), Shape::Flat);
}

#[test]
fn test_drained_collection_can_reshape() {
    let mut collection = Collection::from_value("c", json!({"a": {"id": "a"}})).unwrap();
    collection.records_mut("c").unwrap().unwrap().clear();

    collection.endpoints_or_init("c").unwrap();

    assert_eq!(collection.shape(), Shape::Nested);
}

// =============================================================================
// Serialization Tests
// =============================================================================

#[test]
fn test_serialize_each_shape() {
    assert_eq!(serde_json::to_value(Collection::Empty).unwrap(), json!({}));

    let flat = json!({"a": {"id": "a", "n": 1}});
    let collection = Collection::from_value("c", flat.clone()).unwrap();
    assert_eq!(serde_json::to_value(&collection).unwrap(), flat);

    let nested = json!({
        "s-x": {"items": []},
        "s-y": [1, 2],
        "s-z": {"items": [{"id": "1"}], "total": 1},
    });
    let collection = Collection::from_value("s", nested.clone()).unwrap();
    assert_eq!(serde_json::to_value(&collection).unwrap(), nested);
}
