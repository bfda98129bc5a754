use std::collections::HashSet;

use salvo::prelude::*;
use serde_json::Value;

use crate::error::respond;
use crate::state::AppState;

fn state<'a>(depot: &'a Depot) -> &'a AppState {
    depot.obtain::<AppState>().ok().expect("AppState is always injected")
}

fn shallow_set(req: &Request) -> HashSet<String> {
    req.query::<String>("shallow")
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

#[handler]
pub async fn types_list(req: &mut Request, res: &mut Response, depot: &Depot) {
    let db = req.param::<String>("db").unwrap_or_default();
    match state(depot).store.types_list(&db) {
        Ok(types) => res.render(Json(types)),
        Err(e) => respond(res, req, e.into()),
    }
}

#[handler]
pub async fn object_list(req: &mut Request, res: &mut Response, depot: &Depot) {
    let db = req.param::<String>("db").unwrap_or_default();
    let type_name = req.param::<String>("type").unwrap_or_default();
    match state(depot).store.iterate_collection(&db, &type_name) {
        Ok(ids) => res.render(Json(ids)),
        Err(e) => respond(res, req, e.into()),
    }
}

#[handler]
pub async fn object_post(req: &mut Request, res: &mut Response, depot: &Depot) {
    let db = req.param::<String>("db").unwrap_or_default();
    let type_name = req.param::<String>("type").unwrap_or_default();
    let body: Value = match req.parse_json().await {
        Ok(v) => v,
        Err(e) => {
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(serde_json::json!({"type": "PathParseError", "message": e.to_string()})));
            return;
        }
    };

    let store = state(depot).store.as_ref();
    match scigraph_store::post(store, &db, &type_name, body) {
        Ok(id) => res.render(Json(id)),
        Err(e) => respond(res, req, e.into()),
    }
}

#[handler]
pub async fn object_get(req: &mut Request, res: &mut Response, depot: &Depot) {
    let db = req.param::<String>("db").unwrap_or_default();
    let type_name = req.param::<String>("type").unwrap_or_default();
    let id = req.param::<String>("id").unwrap_or_default();
    let path = req.query::<String>("path");
    let max_level = req.query::<i64>("max_level").unwrap_or(-1);
    let tracking = req.query::<bool>("tracking").unwrap_or(false);
    let meta = req.query::<bool>("meta").unwrap_or(true);
    let shallow = shallow_set(req);

    let store = state(depot).store.as_ref();
    match scigraph_store::get(store, &db, &type_name, &id, path.as_deref(), max_level, tracking, meta, &shallow) {
        Ok(value) => res.render(Json(value)),
        Err(e) => respond(res, req, e.into()),
    }
}

#[derive(serde::Deserialize)]
struct PatchBody {
    path: String,
    data: Value,
}

#[handler]
pub async fn object_patch(req: &mut Request, res: &mut Response, depot: &Depot) {
    let db = req.param::<String>("db").unwrap_or_default();
    let type_name = req.param::<String>("type").unwrap_or_default();
    let id = req.param::<String>("id").unwrap_or_default();
    let body: PatchBody = match req.parse_json().await {
        Ok(v) => v,
        Err(e) => {
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(serde_json::json!({"type": "PathParseError", "message": e.to_string()})));
            return;
        }
    };

    let store = state(depot).store.as_ref();
    match scigraph_store::patch(store, &db, &type_name, &id, &body.path, body.data) {
        Ok(()) => {}
        Err(e) => respond(res, req, e.into()),
    }
}

#[handler]
pub async fn object_clone(req: &mut Request, res: &mut Response, depot: &Depot) {
    let db = req.param::<String>("db").unwrap_or_default();
    let type_name = req.param::<String>("type").unwrap_or_default();
    let id = req.param::<String>("id").unwrap_or_default();
    let shallow = shallow_set(req);

    let store = state(depot).store.as_ref();
    match scigraph_store::clone(store, &db, &type_name, &id, &shallow) {
        Ok(new_id) => res.render(Json(new_id)),
        Err(e) => respond(res, req, e.into()),
    }
}

#[handler]
pub async fn object_safe_links(req: &mut Request, res: &mut Response, depot: &Depot) {
    let db = req.param::<String>("db").unwrap_or_default();
    let type_name = req.param::<String>("type").unwrap_or_default();
    let id = req.param::<String>("id").unwrap_or_default();
    let paths: Vec<String> = req
        .query::<String>("paths")
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_string)
        .collect();
    let debug = req.query::<bool>("debug").unwrap_or(false);

    let store = state(depot).store.as_ref();
    match scigraph_store::safe_links(store, &db, &type_name, &id, &paths, debug) {
        Ok(ids) => res.render(Json(ids)),
        Err(e) => respond(res, req, e.into()),
    }
}

#[handler]
pub async fn object_graph(req: &mut Request, res: &mut Response, depot: &Depot) {
    let db = req.param::<String>("db").unwrap_or_default();
    let type_name = req.param::<String>("type").unwrap_or_default();
    let id = req.param::<String>("id").unwrap_or_default();
    let debug = req.query::<bool>("debug").unwrap_or(false);

    let store = state(depot).store.as_ref();
    match scigraph_store::make_link_digraph(store, &db, &type_name, &id, debug) {
        Ok(graph) => res.render(Json(serde_json::json!({
            "nodes": graph.nodes,
            "edges": graph.edges.into_iter().collect::<Vec<_>>(),
        }))),
        Err(e) => respond(res, req, e.into()),
    }
}
