//! The quantity engine: validates raw JSON input against a schema
//! attribute's `{dtype, shape, unit}` and returns the canonical
//! `{value, unit}` pair, converting to the schema's declared unit along the
//! way.

use scigraph_schema::{AttrDescriptor, Dtype};
use serde_json::{Number, Value};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum QuantityError {
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    #[error("shape mismatch at axis {axis}: expected {expected}, got {actual}")]
    ShapeMismatch {
        axis: usize,
        expected: i64,
        actual: usize,
    },
    #[error("dimension mismatch: expected {expected} dimensions, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("unit is required for this attribute")]
    UnitMissing,
    #[error("unit is not permitted for this attribute")]
    UnitExtra,
    #[error("unit '{from}' is not compatible with schema unit '{to}'")]
    UnitIncompatible { from: String, to: String },
    #[error("unexpected keys in quantity input: {0:?}")]
    ExtraKeys(Vec<String>),
}

/// The stored/returned canonical form of a quantity attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Canonical {
    pub value: Value,
    pub unit: Option<String>,
}

/// Validates `input` against `attr` and returns the canonical, schema-unit
/// form. `attr.dtype` must be a quantity dtype (`f`/`i`/`?`); this is the
/// caller's responsibility to check (schema validation already guarantees
/// any attribute reaching here is well-formed).
pub fn validate(attr: &AttrDescriptor, input: Value) -> Result<Canonical, QuantityError> {
    debug_assert!(attr.dtype.is_quantity());

    let (raw_value, input_unit) = match input {
        Value::Object(mut map) => {
            let extra: Vec<String> = map
                .keys()
                .filter(|k| *k != "value" && *k != "unit")
                .cloned()
                .collect();
            if !extra.is_empty() {
                return Err(QuantityError::ExtraKeys(extra));
            }
            let value = map
                .remove("value")
                .ok_or_else(|| QuantityError::TypeMismatch("missing 'value' key".to_string()))?;
            let unit = match map.remove("unit") {
                Some(Value::String(s)) => Some(s),
                Some(_) => {
                    return Err(QuantityError::TypeMismatch(
                        "'unit' must be a string".to_string(),
                    ))
                }
                None => None,
            };
            (value, unit)
        }
        other => (other, None),
    };

    match (&input_unit, &attr.unit) {
        (None, Some(_)) => return Err(QuantityError::UnitMissing),
        (Some(_), None) => return Err(QuantityError::UnitExtra),
        _ => {}
    }

    let converted = validate_shape_and_dtype(&raw_value, &attr.shape, attr.dtype, 0)?;

    let factor = match (&input_unit, &attr.unit) {
        (Some(from_s), Some(to_s)) => {
            let from = scigraph_units::parse(from_s)
                .map_err(|_| QuantityError::TypeMismatch(format!("bad unit '{from_s}'")))?;
            let to = scigraph_units::parse(to_s)
                .map_err(|_| QuantityError::TypeMismatch(format!("bad unit '{to_s}'")))?;
            Some(scigraph_units::convert(1.0, &from, &to).map_err(|_| {
                QuantityError::UnitIncompatible {
                    from: from_s.clone(),
                    to: to_s.clone(),
                }
            })?)
        }
        _ => None,
    };

    let value = match factor {
        Some(factor) => scale_leaves(converted, attr.dtype, factor),
        None => converted,
    };

    Ok(Canonical {
        value,
        unit: attr.unit.clone(),
    })
}

/// On read, the stored record is already canonical: identity mapping.
pub fn read(_attr: &AttrDescriptor, stored: Value) -> Value {
    stored
}

fn validate_shape_and_dtype(
    value: &Value,
    shape: &[i64],
    dtype: Dtype,
    axis: usize,
) -> Result<Value, QuantityError> {
    if axis == shape.len() {
        if value.is_array() {
            return Err(QuantityError::DimensionMismatch {
                expected: shape.len(),
                actual: axis + array_nesting_depth(value),
            });
        }
        check_leaf(value, dtype)?;
        return Ok(value.clone());
    }
    let Value::Array(items) = value else {
        return Err(QuantityError::DimensionMismatch {
            expected: shape.len(),
            actual: axis,
        });
    };
    let expected = shape[axis];
    if expected > 0 && items.len() as i64 != expected {
        return Err(QuantityError::ShapeMismatch {
            axis,
            expected,
            actual: items.len(),
        });
    }
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        out.push(validate_shape_and_dtype(item, shape, dtype, axis + 1)?);
    }
    Ok(Value::Array(out))
}

/// Counts how many further array levels `value` nests, following the first
/// element of each level (mirrors `np.array(...).ndim`'s regular-shape
/// assumption: the input is expected to already be rectangular by the time
/// it reaches here).
fn array_nesting_depth(value: &Value) -> usize {
    match value {
        Value::Array(items) => 1 + items.first().map_or(0, array_nesting_depth),
        _ => 0,
    }
}

fn check_leaf(value: &Value, dtype: Dtype) -> Result<(), QuantityError> {
    match dtype {
        Dtype::Float => match value {
            Value::Number(_) => Ok(()),
            other => Err(QuantityError::TypeMismatch(format!(
                "expected float-castable number, got {other}"
            ))),
        },
        Dtype::Int => match value {
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(()),
            Value::Number(_) => Err(QuantityError::TypeMismatch(
                "floating-point value cannot be cast to an integer dtype".to_string(),
            )),
            other => Err(QuantityError::TypeMismatch(format!(
                "expected integer, got {other}"
            ))),
        },
        Dtype::Bool => match value {
            Value::Bool(_) => Ok(()),
            other => Err(QuantityError::TypeMismatch(format!(
                "expected boolean, got {other}"
            ))),
        },
        _ => unreachable!("non-quantity dtype passed to the quantity engine"),
    }
}

fn scale_leaves(value: Value, dtype: Dtype, factor: f64) -> Value {
    match value {
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|v| scale_leaves(v, dtype, factor)).collect())
        }
        Value::Number(n) => match dtype {
            Dtype::Bool => Value::Number(n),
            Dtype::Int => {
                let scaled = (n.as_f64().unwrap_or(0.0) * factor).round() as i64;
                Value::Number(Number::from(scaled))
            }
            _ => {
                let scaled = n.as_f64().unwrap_or(0.0) * factor;
                Number::from_f64(scaled)
                    .map(Value::Number)
                    .unwrap_or(Value::Number(n))
            }
        },
        other => other,
    }
}
