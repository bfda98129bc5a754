use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::StoreError;
use crate::memstore::DocumentStore;
use crate::resolver::resolve_path_head;

/// The directed link graph rooted at one object: every object reachable by
/// following link attributes, and every edge walked to reach it.
pub struct LinkGraph {
    pub nodes: HashSet<String>,
    pub edges: HashSet<(String, String)>,
}

pub fn make_link_digraph(
    store: &dyn DocumentStore,
    db: &str,
    type_name: &str,
    id: &str,
    debug: bool,
) -> Result<LinkGraph, StoreError> {
    let mut graph = LinkGraph {
        nodes: HashSet::new(),
        edges: HashSet::new(),
    };
    descend(store, db, type_name, id, debug, &mut graph)?;
    Ok(graph)
}

fn node_label(klass: &str, id: &str, debug: bool) -> String {
    if debug {
        format!("{klass}\n{id}")
    } else {
        id.to_string()
    }
}

fn descend(
    store: &dyn DocumentStore,
    db: &str,
    klass: &str,
    db_id: &str,
    debug: bool,
    graph: &mut LinkGraph,
) -> Result<(), StoreError> {
    graph.nodes.insert(node_label(klass, db_id, debug));
    let schema = store.schema_get(db)?;
    let klass_schema = schema.type_(klass)?.clone();
    let obj = store.find_one(db, klass, db_id)?;

    for (key, val) in &obj {
        if key == "_id" || key == "_meta" {
            continue;
        }
        let Some(attr) = klass_schema.get(key) else { continue };
        let Some(target) = &attr.link else { continue };
        let ids: Vec<String> = if attr.shape.is_empty() {
            val.as_str().map(|s| vec![s.to_string()]).unwrap_or_default()
        } else {
            val.as_array()
                .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
                .unwrap_or_default()
        };
        for linked_id in ids {
            graph
                .edges
                .insert((node_label(klass, db_id, debug), node_label(target, &linked_id, debug)));
            descend(store, db, target, &linked_id, debug, graph)?;
        }
    }
    Ok(())
}

/// Returns the ids reachable from `(type_name, id)` that are *not* on any
/// path toward one of the objects named by `paths` — i.e. objects that are
/// safe to modify without disturbing anything reachable through them.
pub fn safe_links(
    store: &dyn DocumentStore,
    db: &str,
    type_name: &str,
    id: &str,
    paths: &[String],
    debug: bool,
) -> Result<Vec<String>, StoreError> {
    let mut mod_ids = HashSet::new();
    for p in paths {
        let rr = resolve_path_head(store, db, type_name, id, Some(p))?;
        for r in &rr.paths {
            mod_ids.insert(node_label(&r.type_name, &r.id, debug));
        }
    }

    let graph = make_link_digraph(store, db, type_name, id, debug)?;
    if !is_weakly_connected(&graph) {
        return Err(StoreError::Internal(
            "link graph is not weakly connected".to_string(),
        ));
    }

    let root = node_label(type_name, id, debug);
    let mut via_ids = HashSet::new();
    for mod_id in &mod_ids {
        for path in all_simple_paths(&graph, &root, mod_id) {
            via_ids.extend(path);
        }
    }

    Ok(graph.nodes.difference(&via_ids).cloned().collect())
}

fn is_weakly_connected(graph: &LinkGraph) -> bool {
    let Some(start) = graph.nodes.iter().next() else {
        return true;
    };
    let adjacency = undirected_adjacency(graph);
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([start.clone()]);
    seen.insert(start.clone());
    while let Some(node) = queue.pop_front() {
        for neighbor in adjacency.get(&node).into_iter().flatten() {
            if seen.insert(neighbor.clone()) {
                queue.push_back(neighbor.clone());
            }
        }
    }
    seen.len() == graph.nodes.len()
}

fn undirected_adjacency(graph: &LinkGraph) -> HashMap<String, Vec<String>> {
    let mut adjacency: HashMap<String, Vec<String>> = HashMap::new();
    for (a, b) in &graph.edges {
        adjacency.entry(a.clone()).or_default().push(b.clone());
        adjacency.entry(b.clone()).or_default().push(a.clone());
    }
    adjacency
}

fn all_simple_paths(graph: &LinkGraph, from: &str, to: &str) -> Vec<Vec<String>> {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for (a, b) in &graph.edges {
        adjacency.entry(a.as_str()).or_default().push(b.as_str());
    }
    let mut paths = Vec::new();
    let mut visited = HashSet::new();
    let mut stack = vec![from.to_string()];
    visited.insert(from.to_string());
    walk(from, to, &adjacency, &mut visited, &mut stack, &mut paths);
    paths
}

fn walk<'a>(
    current: &'a str,
    target: &str,
    adjacency: &HashMap<&'a str, Vec<&'a str>>,
    visited: &mut HashSet<String>,
    stack: &mut Vec<String>,
    paths: &mut Vec<Vec<String>>,
) {
    if current == target {
        paths.push(stack.clone());
        return;
    }
    for &next in adjacency.get(current).into_iter().flatten() {
        if visited.insert(next.to_string()) {
            stack.push(next.to_string());
            walk(next, target, adjacency, visited, stack, paths);
            stack.pop();
            visited.remove(next);
        }
    }
}
