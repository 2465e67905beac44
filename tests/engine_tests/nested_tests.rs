//! Tests for the nested endpoint store
//!
//! These tests verify:
//! - Path flattening into root collection + storage key
//! - Reads of unknown paths
//! - Append of objects and arrays as structured items
//! - Full replace and merge-upsert by id
//! - Endpoint and item-level deletes

use crudrex::collection::Collection;
use crudrex::engine::{Engine, EndpointPath};
use crudrex::error::{CrudrexError, Resource};
use serde_json::{json, Value};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_engine() -> (TempDir, Engine) {
    let temp_dir = TempDir::new().unwrap();
    let engine = Engine::open_path(temp_dir.path()).unwrap();
    (temp_dir, engine)
}

fn items(endpoint: &Value) -> &Vec<Value> {
    endpoint["items"].as_array().unwrap()
}

// =============================================================================
// Path Tests
// =============================================================================

#[test]
fn test_path_flattening() {
    let path = EndpointPath::parse("/users/42/orders/").unwrap();

    assert_eq!(path.root, "users");
    assert_eq!(path.key, "users-42-orders");
}

#[test]
fn test_path_single_segment() {
    let path = EndpointPath::parse("settings").unwrap();

    assert_eq!(path.root, "settings");
    assert_eq!(path.key, "settings");
}

#[test]
fn test_path_empty_is_invalid() {
    for path in ["", "/", "//"] {
        let err = EndpointPath::parse(path).unwrap_err();
        assert_eq!(err.to_string(), "Invalid path");
    }
}

// =============================================================================
// Read Tests
// =============================================================================

#[test]
fn test_read_unknown_path_is_empty_list() {
    let (_temp, engine) = setup_temp_engine();

    let read = engine.read_endpoint("a/b/c").unwrap();

    assert_eq!(read, json!({"items": []}));
}

#[test]
fn test_read_auto_creates_root_without_mirroring() {
    let (temp, engine) = setup_temp_engine();

    engine.read_endpoint("a/b/c").unwrap();

    assert_eq!(engine.list_collections(), vec!["a"]);
    assert!(!temp.path().join("a.json").exists());
}

// =============================================================================
// Append Tests
// =============================================================================

#[test]
fn test_append_object_wraps_item() {
    let (_temp, engine) = setup_temp_engine();

    let item = engine.append("a/b/c", json!({"x": 1})).unwrap();

    assert!(!item["id"].as_str().unwrap().is_empty());
    assert_eq!(item["data"], json!({"x": 1}));
    assert_eq!(item["createdAt"], item["updatedAt"]);

    let read = engine.read_endpoint("a/b/c").unwrap();
    assert_eq!(items(&read), &vec![item]);
}

#[test]
fn test_append_pops_supplied_id_out_of_data() {
    let (_temp, engine) = setup_temp_engine();

    let item = engine.append("shop/orders", json!({"id": 7, "total": 3})).unwrap();

    assert_eq!(item["id"], "7");
    assert_eq!(item["data"], json!({"total": 3}));
}

#[test]
fn test_append_assigns_distinct_ids() {
    let (_temp, engine) = setup_temp_engine();

    let first = engine.append("shop/orders", json!({"n": 1})).unwrap();
    let second = engine.append("shop/orders", json!({"n": 2})).unwrap();

    assert_ne!(first["id"], second["id"]);
    assert_eq!(items(&engine.read_endpoint("shop/orders").unwrap()).len(), 2);
}

#[test]
fn test_append_array_skips_non_objects() {
    let (_temp, engine) = setup_temp_engine();

    let body = engine
        .append("shop/orders", json!([{"n": 1}, 5, "x", {"n": 2}]))
        .unwrap();

    let created = items(&body);
    assert_eq!(created.len(), 2);
    assert_eq!(created[0]["data"], json!({"n": 1}));
    assert_eq!(created[1]["data"], json!({"n": 2}));
    assert_eq!(items(&engine.read_endpoint("shop/orders").unwrap()), created);
}

#[test]
fn test_append_rejects_blank_and_scalars() {
    let (_temp, engine) = setup_temp_engine();

    for body in [json!([]), json!({}), json!(null)] {
        let err = engine.append("shop/orders", body).unwrap_err();
        assert_eq!(err.to_string(), "JSON data required");
    }
    let err = engine.append("shop/orders", json!(5)).unwrap_err();
    assert!(matches!(err, CrudrexError::BadRequest(_)));
}

#[test]
fn test_paths_are_independent() {
    let (_temp, engine) = setup_temp_engine();

    engine.append("shop/orders", json!({"n": 1})).unwrap();
    engine.append("shop/customers", json!({"n": 2})).unwrap();

    assert_eq!(items(&engine.read_endpoint("shop/orders").unwrap()).len(), 1);
    assert_eq!(items(&engine.read_endpoint("shop/customers").unwrap()).len(), 1);
    assert_eq!(engine.snapshot("shop").unwrap().len(), 2);
}

// =============================================================================
// Replace Tests
// =============================================================================

#[test]
fn test_replace_stores_value_verbatim() {
    let (_temp, engine) = setup_temp_engine();

    engine.replace_endpoint("site/config", json!({"theme": "dark"})).unwrap();

    assert_eq!(engine.read_endpoint("site/config").unwrap(), json!({"theme": "dark"}));
}

#[test]
fn test_append_after_replace_starts_fresh_list() {
    let (_temp, engine) = setup_temp_engine();
    engine.replace_endpoint("site/config", json!({"theme": "dark"})).unwrap();

    engine.append("site/config", json!({"n": 1})).unwrap();

    let read = engine.read_endpoint("site/config").unwrap();
    assert_eq!(items(&read).len(), 1);
    assert!(read.get("theme").is_none());
}

#[test]
fn test_replace_with_item_list_keeps_list() {
    let (_temp, engine) = setup_temp_engine();
    engine
        .replace_endpoint("shop/orders", json!({"items": [{"id": "a", "data": {}}]}))
        .unwrap();

    engine.append("shop/orders", json!({"n": 1})).unwrap();

    assert_eq!(items(&engine.read_endpoint("shop/orders").unwrap()).len(), 2);
}

#[test]
fn test_append_keeps_existing_items_and_sibling_fields() {
    let (_temp, engine) = setup_temp_engine();
    engine
        .replace_endpoint("shop/orders", json!({"items": [{"id": "keep"}], "total": 1}))
        .unwrap();

    engine.append("shop/orders", json!({"x": 1})).unwrap();

    let read = engine.read_endpoint("shop/orders").unwrap();
    assert_eq!(items(&read).len(), 2);
    assert_eq!(items(&read)[0]["id"], "keep");
    assert_eq!(items(&read)[1]["data"], json!({"x": 1}));
    assert_eq!(read["total"], 1);
}

// =============================================================================
// Merge Tests
// =============================================================================

#[test]
fn test_merge_upserts_by_id() {
    let (_temp, engine) = setup_temp_engine();
    let stamp = "2000-01-01T00:00:00.000Z";
    engine
        .replace_endpoint(
            "a/b/c",
            json!({"items": [{"id": "i1", "createdAt": stamp, "updatedAt": stamp, "data": {"x": 1}}]}),
        )
        .unwrap();

    let merged = engine
        .merge_endpoint(
            "a/b/c",
            json!({"items": [{"id": "i1", "data": {"x": 2}}, {"id": "i2", "data": {"y": 1}}]}),
        )
        .unwrap();

    let merged = items(&merged);
    assert_eq!(merged.len(), 2);

    assert_eq!(merged[0]["id"], "i1");
    assert_eq!(merged[0]["data"], json!({"x": 2}));
    assert_eq!(merged[0]["createdAt"], stamp);
    assert!(merged[0]["updatedAt"].as_str().unwrap() > stamp);

    assert_eq!(merged[1]["id"], "i2");
    assert!(merged[1]["createdAt"].is_string());
    assert!(merged[1]["updatedAt"].is_string());
}

#[test]
fn test_merge_keeps_sibling_fields() {
    let (_temp, engine) = setup_temp_engine();
    engine
        .replace_endpoint("shop/orders", json!({"items": [{"id": "keep"}], "total": 1}))
        .unwrap();

    let merged = engine
        .merge_endpoint("shop/orders", json!({"items": [{"id": "new"}]}))
        .unwrap();

    assert_eq!(items(&merged).len(), 2);
    assert_eq!(merged["total"], 1);
    assert_eq!(engine.read_endpoint("shop/orders").unwrap(), merged);
}

#[test]
fn test_merge_replaces_item_wholesale() {
    let (_temp, engine) = setup_temp_engine();
    engine.append("a/b", json!({"id": "i1", "x": 1, "y": 2})).unwrap();

    engine
        .merge_endpoint("a/b", json!({"items": [{"id": "i1", "data": {"x": 9}}]}))
        .unwrap();

    let read = engine.read_endpoint("a/b").unwrap();
    assert_eq!(items(&read)[0]["data"], json!({"x": 9}));
}

#[test]
fn test_merge_ignores_entries_without_id() {
    let (_temp, engine) = setup_temp_engine();

    let merged = engine
        .merge_endpoint("a/b", json!({"items": [{"data": {}}, 3, {"id": "k"}]}))
        .unwrap();

    assert_eq!(items(&merged).len(), 1);
    assert_eq!(items(&merged)[0]["id"], "k");
}

#[test]
fn test_merge_requires_items_array() {
    let (_temp, engine) = setup_temp_engine();

    for body in [json!({"x": 1}), json!({"items": "nope"}), json!([1])] {
        let err = engine.merge_endpoint("a/b", body).unwrap_err();
        assert!(matches!(err, CrudrexError::BadRequest(_)));
    }
}

// =============================================================================
// Remove Tests
// =============================================================================

#[test]
fn test_remove_endpoint_returns_prior_value() {
    let (_temp, engine) = setup_temp_engine();
    let item = engine.append("a/b/c", json!({"x": 1})).unwrap();

    let removed = engine.remove_endpoint("a/b/c").unwrap();

    assert_eq!(removed, json!({"items": [item]}));
    assert_eq!(engine.read_endpoint("a/b/c").unwrap(), json!({"items": []}));
}

#[test]
fn test_remove_missing_endpoint() {
    let (_temp, engine) = setup_temp_engine();

    let err = engine.remove_endpoint("a/b/c").unwrap_err();

    assert!(matches!(err, CrudrexError::NotFound(Resource::Endpoint)));
    assert_eq!(err.to_string(), "Endpoint not found");
}

// =============================================================================
// Item-level Tests
// =============================================================================

#[test]
fn test_get_endpoint_item() {
    let (_temp, engine) = setup_temp_engine();
    let item = engine.append("users/42/orders", json!({"id": 1234, "total": 5})).unwrap();

    assert_eq!(engine.get_endpoint_item("users/42/orders", "1234").unwrap(), item);

    let err = engine.get_endpoint_item("users/42/orders", "999").unwrap_err();
    assert!(matches!(err, CrudrexError::NotFound(Resource::Item)));
    let err = engine.get_endpoint_item("nowhere/x", "1").unwrap_err();
    assert!(matches!(err, CrudrexError::NotFound(Resource::Item)));
}

#[test]
fn test_put_endpoint_item_replaces_data() {
    let (_temp, engine) = setup_temp_engine();
    let item = engine.append("users/42/orders", json!({"id": 1, "total": 5})).unwrap();

    let (updated, created) = engine
        .put_endpoint_item("users/42/orders", "1", json!({"data": {"total": 6}}))
        .unwrap();

    assert!(!created);
    assert_eq!(updated["id"], "1");
    assert_eq!(updated["data"], json!({"total": 6}));
    assert_eq!(updated["createdAt"], item["createdAt"]);
}

#[test]
fn test_put_endpoint_item_appends_new_id() {
    let (_temp, engine) = setup_temp_engine();
    engine.append("users/42/orders", json!({"total": 5})).unwrap();

    let (item, created) = engine
        .put_endpoint_item("users/42/orders", "77", json!({"total": 1}))
        .unwrap();

    assert!(created);
    assert_eq!(item["data"], json!({"total": 1}));
    assert_eq!(items(&engine.read_endpoint("users/42/orders").unwrap()).len(), 2);
}

#[test]
fn test_put_endpoint_item_over_replaced_value_starts_list() {
    let (_temp, engine) = setup_temp_engine();
    engine.replace_endpoint("site/config", json!({"theme": "dark"})).unwrap();

    let (item, created) = engine
        .put_endpoint_item("site/config", "1", json!({"theme": "light"}))
        .unwrap();

    assert!(created);
    let read = engine.read_endpoint("site/config").unwrap();
    assert_eq!(read, json!({"items": [item]}));
}

#[test]
fn test_put_endpoint_item_needs_parent() {
    let (_temp, engine) = setup_temp_engine();

    let err = engine
        .put_endpoint_item("users/42/orders", "1", json!({"total": 1}))
        .unwrap_err();

    assert!(matches!(err, CrudrexError::NotFound(Resource::Endpoint)));
}

#[test]
fn test_patch_endpoint_item_merges_data() {
    let (_temp, engine) = setup_temp_engine();
    let item = engine.append("a/b", json!({"id": "i1", "x": 1, "y": 2})).unwrap();

    let patched = engine
        .patch_endpoint_item("a/b", "i1", json!({"data": {"y": 3}, "id": "zzz"}))
        .unwrap();

    assert_eq!(patched["id"], "i1");
    assert_eq!(patched["data"], json!({"x": 1, "y": 3}));
    assert_eq!(patched["createdAt"], item["createdAt"]);
}

#[test]
fn test_patch_endpoint_item_merges_top_level_without_data() {
    let (_temp, engine) = setup_temp_engine();
    engine.append("a/b", json!({"id": "i1", "x": 1})).unwrap();

    let patched = engine
        .patch_endpoint_item("a/b", "i1", json!({"status": "done"}))
        .unwrap();

    assert_eq!(patched["status"], "done");
    assert_eq!(patched["data"], json!({"x": 1}));
}

#[test]
fn test_delete_endpoint_item() {
    let (_temp, engine) = setup_temp_engine();
    let first = engine.append("a/b", json!({"id": "i1"})).unwrap();
    engine.append("a/b", json!({"id": "i2"})).unwrap();

    let deleted = engine.delete_endpoint_item("a/b", "i1").unwrap();

    assert_eq!(deleted, first);
    let remaining = engine.read_endpoint("a/b").unwrap();
    assert_eq!(items(&remaining).len(), 1);
    assert_eq!(items(&remaining)[0]["id"], "i2");
}

// =============================================================================
// Shape Tests
// =============================================================================

#[test]
fn test_nested_access_to_flat_collection_conflicts() {
    let (_temp, engine) = setup_temp_engine();
    engine.create_item("products", json!({"name": "A"})).unwrap();

    let err = engine.read_endpoint("products/featured").unwrap_err();
    assert!(matches!(err, CrudrexError::ShapeConflict { .. }));

    let err = engine.append("products/featured", json!({"a": 1})).unwrap_err();
    assert!(matches!(err, CrudrexError::ShapeConflict { .. }));

    assert!(matches!(engine.snapshot("products"), Some(Collection::Flat(_))));
}
