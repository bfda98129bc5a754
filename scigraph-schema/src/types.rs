use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::SchemaError;

/// The primitive kind a non-link attribute stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dtype {
    #[serde(rename = "f")]
    Float,
    #[serde(rename = "i")]
    Int,
    #[serde(rename = "?")]
    Bool,
    #[serde(rename = "str")]
    Str,
    #[serde(rename = "bytes")]
    Bytes,
    #[serde(rename = "object")]
    Object,
}

impl Dtype {
    /// `f` / `i` / `?` are "quantity" dtypes: they may carry a unit and are
    /// validated by the quantity engine.
    pub fn is_quantity(self) -> bool {
        matches!(self, Dtype::Float | Dtype::Int | Dtype::Bool)
    }
}

/// One declared attribute of one declared type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttrDescriptor {
    pub dtype: Dtype,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default)]
    pub shape: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl AttrDescriptor {
    pub fn is_link(&self) -> bool {
        self.link.is_some()
    }
}

pub type TypeName = String;
pub type AttrName = String;

/// A fully validated schema: every link target exists, every link's shape
/// and unit are legal, and every declared unit parses.
#[derive(Debug, Clone)]
pub struct Schema {
    types: HashMap<TypeName, HashMap<AttrName, AttrDescriptor>>,
}

impl Schema {
    pub fn parse(raw: serde_json::Value) -> Result<Self, SchemaError> {
        let types: HashMap<TypeName, HashMap<AttrName, AttrDescriptor>> =
            serde_json::from_value(raw).map_err(|e| SchemaError::Invalid(e.to_string()))?;

        for (type_name, attrs) in &types {
            for (attr_name, desc) in attrs {
                if let Some(unit) = &desc.unit {
                    if !desc.dtype.is_quantity() {
                        return Err(SchemaError::UnitNotAllowed {
                            type_name: type_name.clone(),
                            attr_name: attr_name.clone(),
                        });
                    }
                    scigraph_units::parse(unit).map_err(|_| SchemaError::UnitInvalid {
                        type_name: type_name.clone(),
                        attr_name: attr_name.clone(),
                        unit: unit.clone(),
                    })?;
                }
                if let Some(target) = &desc.link {
                    if desc.unit.is_some() {
                        return Err(SchemaError::LinkShapeInvalid {
                            type_name: type_name.clone(),
                            attr_name: attr_name.clone(),
                            reason: "link attribute cannot declare a unit".to_string(),
                        });
                    }
                    if desc.shape.len() > 1 {
                        return Err(SchemaError::LinkShapeInvalid {
                            type_name: type_name.clone(),
                            attr_name: attr_name.clone(),
                            reason: "link attribute shape must have length 0 or 1".to_string(),
                        });
                    }
                    if !types.contains_key(target) {
                        return Err(SchemaError::LinkTargetUndefined {
                            type_name: type_name.clone(),
                            attr_name: attr_name.clone(),
                            target: target.clone(),
                        });
                    }
                }
                if desc.shape.len() > 5 {
                    return Err(SchemaError::LinkShapeInvalid {
                        type_name: type_name.clone(),
                        attr_name: attr_name.clone(),
                        reason: "shape must have length 0..=5".to_string(),
                    });
                }
            }
        }

        Ok(Schema { types })
    }

    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(|s| s.as_str())
    }

    pub fn type_(&self, name: &str) -> Result<&HashMap<AttrName, AttrDescriptor>, SchemaError> {
        self.types
            .get(name)
            .ok_or_else(|| SchemaError::UnknownType(name.to_string()))
    }

    pub fn attr(&self, type_name: &str, attr_name: &str) -> Result<&AttrDescriptor, SchemaError> {
        self.type_(type_name)?
            .get(attr_name)
            .ok_or_else(|| SchemaError::UnknownAttr {
                type_name: type_name.to_string(),
                attr_name: attr_name.to_string(),
            })
    }
}
