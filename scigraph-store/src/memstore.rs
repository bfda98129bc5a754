use std::collections::HashMap;

use parking_lot::RwLock;
use scigraph_schema::{Schema, SchemaCache};
use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::id;

/// The collaborator every document operation is written against. Each
/// method is atomic with respect to a single object: operations that touch
/// several objects (POST of a tree, GET materializing a subtree, ...) call
/// it once per object rather than holding a lock across the whole walk.
pub trait DocumentStore: Send + Sync {
    fn insert_one(
        &self,
        db: &str,
        type_name: &str,
        rec: Map<String, Value>,
    ) -> Result<String, StoreError>;

    fn find_one(&self, db: &str, type_name: &str, id: &str) -> Result<Map<String, Value>, StoreError>;

    fn update_one_set(
        &self,
        db: &str,
        type_name: &str,
        id: &str,
        attr: &str,
        value: Value,
    ) -> Result<(), StoreError>;

    fn iterate_collection(&self, db: &str, type_name: &str) -> Result<Vec<String>, StoreError>;

    fn schema_get(&self, db: &str) -> Result<std::sync::Arc<Schema>, StoreError>;

    fn schema_set(&self, db: &str, raw: Value, force: bool) -> Result<(), StoreError>;

    fn schema_get_raw(&self, db: &str) -> Result<Value, StoreError>;

    fn types_list(&self, db: &str) -> Result<Vec<String>, StoreError> {
        let schema = self.schema_get(db)?;
        Ok(schema.types().map(|s| s.to_string()).collect())
    }
}

type Collection = HashMap<String, Map<String, Value>>;
type Database = HashMap<String, Collection>;

/// A process-local, in-memory reference implementation of [`DocumentStore`].
/// Concurrent readers never block each other; writes take the lock just
/// long enough to mutate one collection.
#[derive(Default)]
pub struct InMemoryStore {
    schema_cache: SchemaCache,
    schema_raw: RwLock<HashMap<String, Value>>,
    data: RwLock<HashMap<String, Database>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for InMemoryStore {
    fn insert_one(
        &self,
        db: &str,
        type_name: &str,
        rec: Map<String, Value>,
    ) -> Result<String, StoreError> {
        let new_id = id::generate();
        let mut data = self.data.write();
        data.entry(db.to_string())
            .or_default()
            .entry(type_name.to_string())
            .or_default()
            .insert(new_id.clone(), rec);
        Ok(new_id)
    }

    fn find_one(&self, db: &str, type_name: &str, id: &str) -> Result<Map<String, Value>, StoreError> {
        self.data
            .read()
            .get(db)
            .and_then(|d| d.get(type_name))
            .and_then(|c| c.get(id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                db: db.to_string(),
                type_name: type_name.to_string(),
                id: id.to_string(),
            })
    }

    fn update_one_set(
        &self,
        db: &str,
        type_name: &str,
        id: &str,
        attr: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        let mut data = self.data.write();
        let rec = data
            .get_mut(db)
            .and_then(|d| d.get_mut(type_name))
            .and_then(|c| c.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                db: db.to_string(),
                type_name: type_name.to_string(),
                id: id.to_string(),
            })?;
        rec.insert(attr.to_string(), value);
        Ok(())
    }

    fn iterate_collection(&self, db: &str, type_name: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .data
            .read()
            .get(db)
            .and_then(|d| d.get(type_name))
            .map(|c| c.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn schema_get(&self, db: &str) -> Result<std::sync::Arc<Schema>, StoreError> {
        self.schema_cache
            .get(db)
            .ok_or_else(|| StoreError::NoSchema(db.to_string()))
    }

    fn schema_set(&self, db: &str, raw: Value, force: bool) -> Result<(), StoreError> {
        if !force && self.schema_raw.read().contains_key(db) {
            return Err(StoreError::SchemaAlreadyDefined(db.to_string()));
        }
        let schema = Schema::parse(raw.clone())?;
        self.schema_raw.write().insert(db.to_string(), raw);
        self.schema_cache.insert(db, schema);
        Ok(())
    }

    fn schema_get_raw(&self, db: &str) -> Result<Value, StoreError> {
        self.schema_raw
            .read()
            .get(db)
            .cloned()
            .ok_or_else(|| StoreError::NoSchema(db.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beam_schema() -> Value {
        serde_json::json!({
            "Beam": {
                "length": {"dtype": "f", "unit": "m", "shape": []},
                "cs": {"dtype": "object", "shape": [], "link": "CrossSection"}
            },
            "CrossSection": {
                "area": {"dtype": "f", "unit": "m2", "shape": []}
            }
        })
    }

    #[test]
    fn insert_find_and_update_round_trip() {
        let store = InMemoryStore::new();
        store.schema_set("dms0", beam_schema(), false).unwrap();

        let mut rec = Map::new();
        rec.insert("length".to_string(), serde_json::json!({"value": 2.5, "unit": "m"}));
        let id = store.insert_one("dms0", "Beam", rec).unwrap();

        let found = store.find_one("dms0", "Beam", &id).unwrap();
        assert_eq!(found["length"]["value"], 2.5);

        store
            .update_one_set("dms0", "Beam", &id, "length", serde_json::json!({"value": 3.0, "unit": "m"}))
            .unwrap();
        let updated = store.find_one("dms0", "Beam", &id).unwrap();
        assert_eq!(updated["length"]["value"], 3.0);
    }

    #[test]
    fn schema_cannot_be_overwritten_without_force() {
        let store = InMemoryStore::new();
        store.schema_set("dms0", beam_schema(), false).unwrap();
        assert!(matches!(
            store.schema_set("dms0", beam_schema(), false).unwrap_err(),
            StoreError::SchemaAlreadyDefined(_)
        ));
        assert!(store.schema_set("dms0", beam_schema(), true).is_ok());
    }

    #[test]
    fn unknown_object_is_not_found() {
        let store = InMemoryStore::new();
        store.schema_set("dms0", beam_schema(), false).unwrap();
        assert!(matches!(
            store.find_one("dms0", "Beam", "nosuchid").unwrap_err(),
            StoreError::NotFound { .. }
        ));
    }
}
