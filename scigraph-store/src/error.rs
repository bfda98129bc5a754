use scigraph_path::PathError;
use scigraph_quantity::QuantityError;
use scigraph_schema::SchemaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no object {type_name} with id={id} in database {db}")]
    NotFound {
        db: String,
        type_name: String,
        id: String,
    },
    #[error("no schema defined in database {0}")]
    NoSchema(String),
    #[error("schema already defined in database {0} (use force=true if you are sure)")]
    SchemaAlreadyDefined(String),
    #[error("invalid attribute {type_name}.{attr_name} (hint: valid attributes are: {valid})")]
    UnknownAttribute {
        type_name: String,
        attr_name: String,
        valid: String,
    },
    #[error("{type_name}.{attr_name}: must be dict, object id or relative path")]
    BadLinkValue { type_name: String, attr_name: String },
    #[error("{0}")]
    Schema(#[from] SchemaError),
    #[error("{0}")]
    Quantity(#[from] QuantityError),
    #[error("{0}")]
    Path(#[from] PathError),
    #[error("{0}")]
    InvalidInput(String),
    #[error("resolved patch paths and data length mismatch: {paths} paths, {data} data")]
    PatchLengthMismatch { paths: usize, data: usize },
    #[error("objects cannot be patched (only attributes can)")]
    PatchOnObject,
    #[error("path indexes an attribute (only a whole attribute can be set, not its components)")]
    PatchIndexedAttribute,
    #[error("path has too long a tail: {0}")]
    TooLongTail(String),
    #[error("unable to resolve relative path '{0}'")]
    RelpathUnresolved(String),
    #[error("internal invariant violated: {0}")]
    Internal(String),
}
