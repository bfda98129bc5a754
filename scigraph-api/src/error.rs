//! Maps every failure the store/schema/path/quantity layers can raise onto
//! a single HTTP shape: 400, with `{type, message, url, method}` naming the
//! error kind the way the reference service's exception handler does.

use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Request, Response};
use scigraph_path::PathError;
use scigraph_schema::SchemaError;
use scigraph_store::StoreError;
use serde::Serialize;

pub struct ApiError(pub StoreError);

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError(e)
    }
}

impl From<SchemaError> for ApiError {
    fn from(e: SchemaError) -> Self {
        ApiError(StoreError::Schema(e))
    }
}

impl From<PathError> for ApiError {
    fn from(e: PathError) -> Self {
        ApiError(StoreError::Path(e))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    kind: &'static str,
    message: String,
    url: String,
    method: String,
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match &self.0 {
            StoreError::NotFound { .. } => "UnknownId",
            StoreError::NoSchema(_) => "UnknownType",
            StoreError::SchemaAlreadyDefined(_) => "SchemaError",
            StoreError::UnknownAttribute { .. } => "UnknownAttr",
            StoreError::BadLinkValue { .. } => "LinkShapeMismatch",
            StoreError::Schema(schema_err) => match schema_err {
                SchemaError::UnknownType(_) => "UnknownType",
                SchemaError::UnknownAttr { .. } => "UnknownAttr",
                _ => "SchemaError",
            },
            StoreError::Quantity(q) => quantity_kind(q),
            StoreError::Path(p) => path_kind(p),
            StoreError::InvalidInput(_) => "PathParseError",
            StoreError::PatchLengthMismatch { .. } => "LinkShapeMismatch",
            StoreError::PatchOnObject => "IndexedAttribute",
            StoreError::PatchIndexedAttribute => "IndexedAttribute",
            StoreError::TooLongTail(_) => "PathTooLong",
            StoreError::RelpathUnresolved(_) => "RelativeRefUnresolved",
            StoreError::Internal(_) => "SchemaError",
        }
    }
}

fn quantity_kind(e: &scigraph_quantity::QuantityError) -> &'static str {
    use scigraph_quantity::QuantityError::*;
    match e {
        TypeMismatch(_) => "TypeMismatch",
        ShapeMismatch { .. } => "ShapeMismatch",
        DimensionMismatch { .. } => "DimensionMismatch",
        UnitMissing => "UnitMissing",
        UnitExtra => "UnitExtra",
        UnitIncompatible { .. } => "UnitIncompatible",
        ExtraKeys(_) => "ExtraKeys",
    }
}

fn path_kind(e: &PathError) -> &'static str {
    match e {
        PathError::Parse(_) => "PathParseError",
        PathError::IndexOutOfRange { .. } => "IndexOutOfRange",
        PathError::IndexedScalar { .. } => "IndexedScalar",
        PathError::UnindexedList { .. } => "UnindexedList",
        PathError::ZeroStep => "PathParseError",
    }
}

/// Renders an error the way the reference service's global exception
/// handler does: HTTP 400, body `{type, message, url, method}`.
pub fn respond(res: &mut Response, req: &Request, err: ApiError) {
    tracing::debug!(kind = err.kind(), error = %err.0, "request failed");
    res.status_code(StatusCode::BAD_REQUEST);
    res.render(Json(ErrorBody {
        kind: err.kind(),
        message: err.0.to_string(),
        url: req.uri().to_string(),
        method: req.method().to_string(),
    }));
}
