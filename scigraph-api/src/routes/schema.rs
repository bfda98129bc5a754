use salvo::prelude::*;
use serde_json::Value;

use crate::error::respond;
use crate::state::AppState;

#[handler]
pub async fn post_schema(req: &mut Request, res: &mut Response, depot: &Depot) {
    let db = req.param::<String>("db").unwrap_or_default();
    let force = req.query::<bool>("force").unwrap_or(false);
    let body: Value = match req.parse_json().await {
        Ok(v) => v,
        Err(e) => {
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(serde_json::json!({"type": "PathParseError", "message": e.to_string()})));
            return;
        }
    };

    let state = depot.obtain::<AppState>().ok().expect("AppState is always injected");
    if let Err(e) = state.store.schema_set(&db, body, force) {
        respond(res, req, e.into());
    }
}

#[handler]
pub async fn get_schema(req: &mut Request, res: &mut Response, depot: &Depot) {
    let db = req.param::<String>("db").unwrap_or_default();
    // `include_id` exists for compatibility with the original interface;
    // this store keeps no internal document id on the schema record.
    let _include_id = req.query::<bool>("include_id").unwrap_or(false);

    let state = depot.obtain::<AppState>().ok().expect("AppState is always injected");
    match state.store.schema_get_raw(&db) {
        Ok(schema) => res.render(Json(schema)),
        Err(e) => respond(res, req, e.into()),
    }
}
