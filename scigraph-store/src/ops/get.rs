use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::codec;
use crate::error::StoreError;
use crate::memstore::DocumentStore;
use crate::resolver::resolve_path_head;
use crate::tracker::ObjectTracker;
use scigraph_path::PathEntry;

/// Materializes the subtree rooted at `(type_name, id)`, optionally
/// narrowed by `path`. See the module-level docs on each parameter's
/// semantics: `max_level` bounds recursion depth (negative = unbounded),
/// `tracking` turns on shared-reference detection (repeated objects come
/// back as relative-path strings instead of being re-expanded), `meta`
/// controls whether `_meta` is included, and `shallow` is the set of ids
/// that should stop recursion and be returned as bare id strings.
pub fn get(
    store: &dyn DocumentStore,
    db: &str,
    type_name: &str,
    id: &str,
    path: Option<&str>,
    max_level: i64,
    tracking: bool,
    meta: bool,
    shallow: &HashSet<String>,
) -> Result<Value, StoreError> {
    let rr = resolve_path_head(store, db, type_name, id, path)?;

    for r in &rr.paths {
        if r.tail.is_empty() {
            let mut tracker = tracking.then(ObjectTracker::new);
            return get_object(
                store,
                db,
                &r.type_name,
                &r.id,
                r.parent.as_deref(),
                &[],
                tracker.as_mut(),
                max_level,
                meta,
                shallow,
            );
        }
    }

    let mut values = Vec::with_capacity(rr.len());
    for r in &rr.paths {
        if r.tail.len() > 1 {
            return Err(StoreError::TooLongTail(scigraph_path::unparse(&r.tail)));
        }
        let entry = &r.tail[0];
        if entry.has_subscript() {
            return Err(StoreError::InvalidInput(format!(
                "path indexes attribute '{}' (indexing is only allowed within a link array)",
                entry.attr
            )));
        }
        let schema = store.schema_get(db)?;
        let attr = schema.attr(&r.type_name, &entry.attr)?;
        let val = r.obj.get(&entry.attr).cloned().unwrap_or(Value::Null);
        values.push(codec::attr_db_to_api(attr, val));
    }

    if rr.is_plain {
        Ok(values.into_iter().next().unwrap_or(Value::Null))
    } else {
        Ok(Value::Array(values))
    }
}

#[allow(clippy::too_many_arguments)]
fn get_object(
    store: &dyn DocumentStore,
    db: &str,
    klass: &str,
    db_id: &str,
    parent_id: Option<&str>,
    path: &[PathEntry],
    mut tracker: Option<&mut ObjectTracker>,
    max_level: i64,
    meta: bool,
    shallow: &HashSet<String>,
) -> Result<Value, StoreError> {
    if let Some(t) = tracker.as_deref() {
        if let Some(relpath) = t.resolve_id_to_relpath(db_id, path) {
            return Ok(Value::String(relpath));
        }
    }
    if max_level >= 0 && path.len() as i64 > max_level {
        return Ok(Value::Object(Map::new()));
    }

    let schema = store.schema_get(db)?;
    let klass_schema = schema.type_(klass)?.clone();
    let mut obj = store.find_one(db, klass, db_id)?;
    let mut ret = codec::obj_db_to_api(klass, db_id, &mut obj, parent_id, meta);

    for (key, val) in obj {
        if key == "_meta" {
            continue;
        }
        let attr = klass_schema.get(&key).ok_or_else(|| StoreError::UnknownAttribute {
            type_name: klass.to_string(),
            attr_name: key.clone(),
            valid: klass_schema.keys().cloned().collect::<Vec<_>>().join(", "),
        })?;

        if let Some(target) = &attr.link {
            if path.len() as i64 == max_level {
                continue;
            }
            let is_list = !attr.shape.is_empty();
            let resolved = if is_list {
                let ids = val.as_array().cloned().unwrap_or_default();
                let mut out = Vec::with_capacity(ids.len());
                for (index, link_id) in ids.into_iter().enumerate() {
                    let mut child_path = path.to_vec();
                    child_path.push(PathEntry::indexed(key.clone(), index as i64));
                    out.push(resolve_link(
                        store, db, target, &link_id, db_id, &child_path, tracker.as_deref_mut(), max_level, meta, shallow,
                    )?);
                }
                Value::Array(out)
            } else {
                let mut child_path = path.to_vec();
                child_path.push(PathEntry::plain(key.clone()));
                resolve_link(
                    store, db, target, &val, db_id, &child_path, tracker.as_deref_mut(), max_level, meta, shallow,
                )?
            };
            ret.insert(key, resolved);
        } else {
            ret.insert(key.clone(), codec::attr_db_to_api(attr, val));
        }
    }

    if let Some(t) = tracker.as_deref_mut() {
        t.add_tracked_object(path, db_id);
    }
    Ok(Value::Object(ret))
}

#[allow(clippy::too_many_arguments)]
fn resolve_link(
    store: &dyn DocumentStore,
    db: &str,
    target: &str,
    link_id: &Value,
    parent_id: &str,
    child_path: &[PathEntry],
    tracker: Option<&mut ObjectTracker>,
    max_level: i64,
    meta: bool,
    shallow: &HashSet<String>,
) -> Result<Value, StoreError> {
    let id_str = link_id
        .as_str()
        .ok_or_else(|| StoreError::InvalidInput("link value is not an id".to_string()))?;
    if shallow.contains(id_str) {
        return Ok(link_id.clone());
    }
    get_object(store, db, target, id_str, Some(parent_id), child_path, tracker, max_level, meta, shallow)
}
