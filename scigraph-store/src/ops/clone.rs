use std::collections::HashSet;

use crate::error::StoreError;
use crate::memstore::DocumentStore;
use crate::ops::{get, post};

/// Deep-clones the subtree rooted at `(type_name, id)`: materializes it
/// with a GET (tracking on, so shared references come back relative rather
/// than duplicated) and re-POSTs the dump as a brand new tree. Each cloned
/// object's `_meta.upstream` records the id it was cloned from.
pub fn clone(
    store: &dyn DocumentStore,
    db: &str,
    type_name: &str,
    id: &str,
    shallow: &HashSet<String>,
) -> Result<String, StoreError> {
    let dump = get::get(store, db, type_name, id, None, -1, true, true, shallow)?;
    let cloned_id = post::post(store, db, type_name, dump)?;
    tracing::debug!(db, type_name, source = id, cloned = cloned_id, "cloned object tree");
    Ok(cloned_id)
}
