use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::Schema;

/// Per-database parsed-schema cache. Readers never block each other; a
/// schema (re-)import takes the write lock just long enough to swap the
/// entry in.
#[derive(Default)]
pub struct SchemaCache {
    inner: RwLock<HashMap<String, Arc<Schema>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, db: &str) -> Option<Arc<Schema>> {
        self.inner.read().get(db).cloned()
    }

    pub fn insert(&self, db: impl Into<String>, schema: Schema) -> Arc<Schema> {
        let schema = Arc::new(schema);
        self.inner.write().insert(db.into(), schema.clone());
        schema
    }

    pub fn invalidate(&self, db: &str) {
        self.inner.write().remove(db);
    }
}
