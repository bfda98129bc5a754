use serde_json::{Map, Value};

use crate::codec;
use crate::error::StoreError;
use crate::id;
use crate::memstore::DocumentStore;
use crate::tracker::ObjectTracker;
use scigraph_path::PathEntry;

/// Creates a tree of objects from `data`, depth-first, post-order: children
/// are inserted (and so have ids) before their parent is. Returns the
/// top-level object's id.
pub fn post(store: &dyn DocumentStore, db: &str, type_name: &str, data: Value) -> Result<String, StoreError> {
    let mut tracker = ObjectTracker::new();
    let data = as_object(data)?;
    let id = new_object(store, db, type_name, data, &[], &mut tracker)?;
    tracing::debug!(db, type_name, id, "posted object tree");
    Ok(id)
}

fn as_object(v: Value) -> Result<Map<String, Value>, StoreError> {
    match v {
        Value::Object(m) => Ok(m),
        other => Err(StoreError::InvalidInput(format!(
            "expected an object, got {other}"
        ))),
    }
}

fn new_object(
    store: &dyn DocumentStore,
    db: &str,
    klass: &str,
    mut data: Map<String, Value>,
    path: &[PathEntry],
    tracker: &mut ObjectTracker,
) -> Result<String, StoreError> {
    let schema = store.schema_get(db)?;
    let klass_schema = schema.type_(klass)?.clone();
    let mut rec = codec::obj_api_to_db(&mut data);

    for (key, val) in data {
        let attr = klass_schema.get(&key).ok_or_else(|| StoreError::UnknownAttribute {
            type_name: klass.to_string(),
            attr_name: key.clone(),
            valid: klass_schema.keys().cloned().collect::<Vec<_>>().join(", "),
        })?;

        if let Some(target) = attr.link.clone() {
            let is_list = !attr.shape.is_empty();
            if is_list && !val.is_array() {
                return Err(StoreError::InvalidInput(format!(
                    "{klass}.{key} should be a list"
                )));
            }
            let stored = if is_list {
                let items = val.as_array().expect("checked above").clone();
                let mut ids = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    let mut child_path = path.to_vec();
                    child_path.push(PathEntry::indexed(key.clone(), index as i64));
                    ids.push(Value::String(resolve_link_value(
                        store, db, &target, item, &child_path, path, tracker,
                    )?));
                }
                Value::Array(ids)
            } else {
                let mut child_path = path.to_vec();
                child_path.push(PathEntry::plain(key.clone()));
                Value::String(resolve_link_value(store, db, &target, val, &child_path, path, tracker)?)
            };
            rec.insert(key, stored);
        } else {
            rec.insert(key.clone(), codec::attr_api_to_db(attr, val)?);
        }
    }

    let new_id = store.insert_one(db, klass, rec)?;
    tracker.add_tracked_object(path, &new_id);
    Ok(new_id)
}

fn resolve_link_value(
    store: &dyn DocumentStore,
    db: &str,
    target_type: &str,
    val: Value,
    child_path: &[PathEntry],
    curr: &[PathEntry],
    tracker: &mut ObjectTracker,
) -> Result<String, StoreError> {
    match val {
        Value::String(s) if id::is_object_id(&s) => Ok(s),
        Value::String(relpath) => tracker.resolve_relpath_to_id(&relpath, curr),
        Value::Object(obj) => new_object(store, db, target_type, obj, child_path, tracker),
        other => Err(StoreError::InvalidInput(format!(
            "link value must be an object, object id or relative path, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memstore::InMemoryStore;

    fn beam_schema() -> Value {
        serde_json::json!({
            "Beam": {
                "length": {"dtype": "f", "unit": "m", "shape": []},
                "cs": {"dtype": "object", "shape": [], "link": "CrossSection"},
                "ends": {"dtype": "object", "shape": [-1], "link": "CrossSection"}
            },
            "CrossSection": {
                "area": {"dtype": "f", "unit": "m2", "shape": []}
            }
        })
    }

    #[test]
    fn posts_nested_tree_depth_first() {
        let store = InMemoryStore::new();
        store.schema_set("dms0", beam_schema(), false).unwrap();

        let data = serde_json::json!({
            "length": {"value": 2.5, "unit": "m"},
            "cs": {"area": {"value": 0.01, "unit": "m2"}}
        });
        let id = post(&store, "dms0", "Beam", data).unwrap();
        let stored = store.find_one("dms0", "Beam", &id).unwrap();
        assert!(crate::id::is_object_id(stored["cs"].as_str().unwrap()));
    }

    #[test]
    fn posts_array_of_links() {
        let store = InMemoryStore::new();
        store.schema_set("dms0", beam_schema(), false).unwrap();

        let data = serde_json::json!({
            "length": {"value": 1.0, "unit": "m"},
            "ends": [
                {"area": {"value": 0.01, "unit": "m2"}},
                {"area": {"value": 0.02, "unit": "m2"}}
            ]
        });
        let id = post(&store, "dms0", "Beam", data).unwrap();
        let stored = store.find_one("dms0", "Beam", &id).unwrap();
        assert_eq!(stored["ends"].as_array().unwrap().len(), 2);
    }

    /// Scenario S2: a relative-path string in link position resolves
    /// against a sibling that was created earlier in the same POST, by
    /// virtue of the input being walked in the order its keys were
    /// declared rather than alphabetically. The attribute names are
    /// chosen so the two orders disagree (`zBeam` is declared, and
    /// therefore tracked, before `aRef` even though it sorts after it) —
    /// this would fail to resolve if the input were walked key-sorted.
    #[test]
    fn resolves_relative_path_to_an_earlier_sibling_in_declaration_order() {
        let store = InMemoryStore::new();
        let schema = serde_json::json!({
            "BeamState": {
                "zBeam": {"dtype": "object", "shape": [], "link": "Beam"},
                "aRef": {"dtype": "object", "shape": [], "link": "CrossSection"}
            },
            "Beam": {
                "cs": {"dtype": "object", "shape": [], "link": "CrossSection"}
            },
            "CrossSection": {
                "area": {"dtype": "f", "unit": "m2", "shape": []}
            }
        });
        store.schema_set("dms0", schema, false).unwrap();

        let data = serde_json::json!({
            "zBeam": {"cs": {"area": {"value": 0.01, "unit": "m2"}}},
            "aRef": ".zBeam.cs"
        });
        let id = post(&store, "dms0", "BeamState", data).unwrap();

        let stored = store.find_one("dms0", "BeamState", &id).unwrap();
        let beam_id = stored["zBeam"].as_str().unwrap();
        let beam = store.find_one("dms0", "Beam", beam_id).unwrap();
        assert_eq!(
            stored["aRef"], beam["cs"],
            "the relative reference must resolve to zBeam's cs, not fail or point elsewhere"
        );
    }

    #[test]
    fn posts_existing_id_link_directly() {
        let store = InMemoryStore::new();
        store.schema_set("dms0", beam_schema(), false).unwrap();
        let mut cs_rec = Map::new();
        cs_rec.insert("area".to_string(), serde_json::json!({"value": 0.01, "unit": "m2"}));
        let cs_id = store.insert_one("dms0", "CrossSection", cs_rec).unwrap();

        let data = serde_json::json!({
            "length": {"value": 1.0, "unit": "m"},
            "cs": cs_id.clone()
        });
        let id = post(&store, "dms0", "Beam", data).unwrap();
        let stored = store.find_one("dms0", "Beam", &id).unwrap();
        assert_eq!(stored["cs"], Value::String(cs_id));
    }
}
