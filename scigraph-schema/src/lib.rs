//! Schema-of-schemas: parsing and validating the per-database schema
//! document, and a process-wide cache of parsed schemas keyed by database
//! name.

mod cache;
mod types;

pub use cache::SchemaCache;
pub use types::{AttrDescriptor, AttrName, Dtype, Schema, TypeName};

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("schema is invalid: {0}")]
    Invalid(String),
    #[error("unknown type '{0}'")]
    UnknownType(String),
    #[error("unknown attribute '{type_name}.{attr_name}'")]
    UnknownAttr { type_name: String, attr_name: String },
    #[error("{type_name}.{attr_name} links to undefined type '{target}'")]
    LinkTargetUndefined {
        type_name: String,
        attr_name: String,
        target: String,
    },
    #[error("{type_name}.{attr_name}: {reason}")]
    LinkShapeInvalid {
        type_name: String,
        attr_name: String,
        reason: String,
    },
    #[error("{type_name}.{attr_name}: unit '{unit}' does not parse")]
    UnitInvalid {
        type_name: String,
        attr_name: String,
        unit: String,
    },
    #[error("{type_name}.{attr_name}: unit not permitted on this dtype")]
    UnitNotAllowed { type_name: String, attr_name: String },
}
