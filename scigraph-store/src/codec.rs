//! Conversion between the JSON shape the API speaks and the JSON shape the
//! store persists, attribute by attribute and object by object.

use scigraph_schema::{AttrDescriptor, Dtype};
use serde_json::{Map, Value};

use crate::error::StoreError;

/// Converts one non-link attribute's API-facing value into its stored
/// form, validating it against `attr` along the way.
pub fn attr_api_to_db(attr: &AttrDescriptor, val: Value) -> Result<Value, StoreError> {
    debug_assert!(!attr.is_link());
    match attr.dtype {
        Dtype::Str => match val {
            Value::String(_) => Ok(val),
            other => Err(StoreError::InvalidInput(format!(
                "expected a string, got {other}"
            ))),
        },
        Dtype::Bytes => match val {
            Value::String(_) => Ok(val),
            other => Err(StoreError::InvalidInput(format!(
                "expected a base64-encoded string, got {other}"
            ))),
        },
        Dtype::Object => Ok(val),
        Dtype::Float | Dtype::Int | Dtype::Bool => {
            let canon = scigraph_quantity::validate(attr, val)?;
            let mut rec = Map::new();
            rec.insert("value".to_string(), canon.value);
            if let Some(unit) = canon.unit {
                rec.insert("unit".to_string(), Value::String(unit));
            }
            Ok(Value::Object(rec))
        }
    }
}

/// Converts one non-link attribute's stored value back to its API-facing
/// form. Identity for every dtype: the engine stores canonical values.
pub fn attr_db_to_api(attr: &AttrDescriptor, dbrec: Value) -> Value {
    if attr.dtype.is_quantity() {
        scigraph_quantity::read(attr, dbrec)
    } else {
        dbrec
    }
}

/// Builds the object-level portion of an API response: `_meta` (id, type,
/// optional parent) merged with whatever `_meta` was already stored.
pub fn obj_db_to_api(
    type_name: &str,
    id: &str,
    rec: &mut Map<String, Value>,
    parent: Option<&str>,
    include_meta: bool,
) -> Map<String, Value> {
    let mut ret = Map::new();
    let mut meta = match rec.remove("_meta") {
        Some(Value::Object(m)) => m,
        _ => Map::new(),
    };
    meta.insert("id".to_string(), Value::String(id.to_string()));
    meta.insert("type".to_string(), Value::String(type_name.to_string()));
    if let Some(parent) = parent {
        meta.insert("parent".to_string(), Value::String(parent.to_string()));
    }
    if include_meta {
        ret.insert("_meta".to_string(), Value::Object(meta));
    }
    ret
}

/// Strips an inbound object's `_meta` block (if any, recording where it
/// came from as `_meta.upstream`) for storage. Used when the caller posts
/// the output of a prior GET (e.g. cloning).
pub fn obj_api_to_db(data: &mut Map<String, Value>) -> Map<String, Value> {
    let mut ret = Map::new();
    if let Some(Value::Object(meta)) = data.remove("_meta") {
        if let Some(upstream_id) = meta.get("id") {
            let mut m = Map::new();
            m.insert("upstream".to_string(), upstream_id.clone());
            ret.insert("_meta".to_string(), Value::Object(m));
        }
    }
    ret
}

#[cfg(test)]
mod tests {
    use super::*;
    use scigraph_schema::Dtype;

    fn attr(dtype: Dtype, unit: Option<&str>) -> AttrDescriptor {
        AttrDescriptor {
            dtype,
            unit: unit.map(|s| s.to_string()),
            shape: vec![],
            link: None,
        }
    }

    #[test]
    fn quantity_round_trips_through_codec() {
        let a = attr(Dtype::Float, Some("m"));
        let db = attr_api_to_db(&a, serde_json::json!({"value": 200, "unit": "cm"})).unwrap();
        assert_eq!(db["value"], 2.0);
        assert_eq!(db["unit"], "m");
        assert_eq!(attr_db_to_api(&a, db.clone()), db);
    }

    #[test]
    fn str_attribute_rejects_non_string() {
        let a = attr(Dtype::Str, None);
        assert!(attr_api_to_db(&a, serde_json::json!(5)).is_err());
    }

    #[test]
    fn meta_round_trip_records_upstream() {
        let mut api_obj = Map::new();
        api_obj.insert(
            "_meta".to_string(),
            serde_json::json!({"id": "abc123abc123abc123abc123", "type": "Beam"}),
        );
        let db_rec = obj_api_to_db(&mut api_obj);
        assert_eq!(db_rec["_meta"]["upstream"], "abc123abc123abc123abc123");
    }
}
