use serde_json::Value;

use crate::codec;
use crate::error::StoreError;
use crate::memstore::DocumentStore;
use crate::resolver::resolve_path_head;

/// Replaces one or more attributes reached via `path`. Plain paths take a
/// single object of patch data; paths that fan out (multi-index or slice
/// subscripts) take a list, one entry per resolved leaf, in the same order.
pub fn patch(
    store: &dyn DocumentStore,
    db: &str,
    type_name: &str,
    id: &str,
    path: &str,
    data: Value,
) -> Result<(), StoreError> {
    let rr = resolve_path_head(store, db, type_name, id, Some(path))?;

    let items: Vec<Value> = if rr.is_plain {
        match data {
            Value::Object(_) => vec![data],
            other => {
                return Err(StoreError::InvalidInput(format!(
                    "patch data must be an object for a plain path, got {other}"
                )))
            }
        }
    } else {
        match data {
            Value::Array(items) => items,
            other => {
                return Err(StoreError::InvalidInput(format!(
                    "patch data must be a list for a wildcard path, got {other}"
                )))
            }
        }
    };

    if rr.len() != items.len() {
        return Err(StoreError::PatchLengthMismatch {
            paths: rr.len(),
            data: items.len(),
        });
    }

    for (r, dat) in rr.paths.iter().zip(items) {
        if r.tail.is_empty() {
            return Err(StoreError::PatchOnObject);
        }
        if r.tail.len() > 1 {
            return Err(StoreError::TooLongTail(scigraph_path::unparse(&r.tail)));
        }
        let entry = &r.tail[0];
        if entry.has_subscript() {
            return Err(StoreError::PatchIndexedAttribute);
        }
        let schema = store.schema_get(db)?;
        let attr = schema.attr(&r.type_name, &entry.attr)?;
        debug_assert!(!attr.is_link(), "path resolution never leaves a link in the tail");
        let rec = codec::attr_api_to_db(attr, dat)?;
        store.update_one_set(db, &r.type_name, &r.id, &entry.attr, rec)?;
    }
    Ok(())
}
