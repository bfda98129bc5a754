use scigraph_path::PathEntry;
use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::memstore::DocumentStore;

/// One leaf of a resolved path: the object it bottomed out at, plus
/// whatever attribute-only tail (if any) remains to be read or written.
pub struct ResolvedPath {
    pub obj: Map<String, Value>,
    pub type_name: String,
    pub id: String,
    pub tail: Vec<PathEntry>,
    pub parent: Option<String>,
}

/// The result of resolving a path, which may fan out into more than one
/// leaf when it passes through a multi-index or slice subscript.
pub struct ResolvedPaths {
    pub paths: Vec<ResolvedPath>,
    /// True when every segment was unsubscripted or plainly indexed: such
    /// a path can never resolve to more than one leaf.
    pub is_plain: bool,
}

impl ResolvedPaths {
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Resolves `path` starting at `(type_name, id)`, descending through link
/// attributes as far as it can get.
pub fn resolve_path_head(
    store: &dyn DocumentStore,
    db: &str,
    type_name: &str,
    id: &str,
    path: Option<&str>,
) -> Result<ResolvedPaths, StoreError> {
    let parsed = scigraph_path::parse(path.unwrap_or(""))?;
    let is_plain = parsed.iter().all(|e| e.is_plain());
    let mut resolved = Vec::new();
    descend(store, db, type_name, id, &parsed, 0, None, &mut resolved)?;
    Ok(ResolvedPaths {
        paths: resolved,
        is_plain,
    })
}

fn descend(
    store: &dyn DocumentStore,
    db: &str,
    klass: &str,
    db_id: &str,
    path: &[PathEntry],
    level: usize,
    parent_id: Option<&str>,
    resolved: &mut Vec<ResolvedPath>,
) -> Result<(), StoreError> {
    let schema = store.schema_get(db)?;
    let klass_schema = schema.type_(klass)?;
    let obj = store.find_one(db, klass, db_id)?;

    if path.is_empty() {
        resolved.push(ResolvedPath {
            obj,
            type_name: klass.to_string(),
            id: db_id.to_string(),
            tail: Vec::new(),
            parent: if level == 0 {
                None
            } else {
                parent_id.map(|s| s.to_string())
            },
        });
        return Ok(());
    }

    let entry = &path[0];
    let attr = klass_schema.get(&entry.attr).ok_or_else(|| StoreError::UnknownAttribute {
        type_name: klass.to_string(),
        attr_name: entry.attr.clone(),
        valid: klass_schema.keys().cloned().collect::<Vec<_>>().join(", "),
    })?;

    if let Some(target) = &attr.link {
        let value = obj.get(&entry.attr).cloned().unwrap_or(Value::Null);
        let links = scigraph_path::apply_indexing(entry, &value)?;
        for link in links {
            let link_id = link
                .as_str()
                .ok_or_else(|| StoreError::InvalidInput(format!("{klass}.{} is not an id", entry.attr)))?;
            descend(store, db, target, link_id, &path[1..], level + 1, Some(db_id), resolved)?;
        }
    } else {
        resolved.push(ResolvedPath {
            obj,
            type_name: klass.to_string(),
            id: db_id.to_string(),
            tail: path.to_vec(),
            parent: parent_id.map(|s| s.to_string()),
        });
    }
    Ok(())
}
