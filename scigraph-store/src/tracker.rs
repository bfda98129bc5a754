use std::collections::HashMap;

use scigraph_path::PathEntry;

use crate::error::StoreError;

/// Tracks the path⟷id correspondence for the objects visited during a
/// single POST or GET, so that shared references can be expressed as
/// relative paths instead of duplicated subtrees.
#[derive(Default)]
pub struct ObjectTracker {
    path2id: HashMap<Vec<PathEntry>, String>,
    id2path: HashMap<String, Vec<PathEntry>>,
}

impl ObjectTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_tracked_object(&mut self, path: &[PathEntry], id: &str) {
        self.path2id.insert(path.to_vec(), id.to_string());
        self.id2path.insert(id.to_string(), path.to_vec());
    }

    /// Resolves a relative path (leading dots ascend from `curr`) to the id
    /// it was tracked under during this same request.
    pub fn resolve_relpath_to_id(&self, relpath: &str, curr: &[PathEntry]) -> Result<String, StoreError> {
        let mut tail = relpath;
        let mut where_ = curr.to_vec();
        loop {
            if let Some(rest) = tail.strip_prefix('.') {
                tail = rest;
                where_.pop();
                continue;
            }
            let (head, rest) = match tail.find('.') {
                Some(dot) => (&tail[..dot], &tail[dot + 1..]),
                None => (tail, ""),
            };
            where_.push(scigraph_path::parse_segment(head)?);
            if rest.is_empty() {
                break;
            }
            tail = rest;
        }
        self.path2id
            .get(&where_)
            .cloned()
            .ok_or_else(|| StoreError::RelpathUnresolved(relpath.to_string()))
    }

    /// Resolves an id to the shortest relative path from `curr`, if that id
    /// was already visited earlier in this same request.
    pub fn resolve_id_to_relpath(&self, id: &str, curr: &[PathEntry]) -> Option<String> {
        let abspath = self.id2path.get(id)?;
        let mut common = 0;
        while common < curr.len() && common < abspath.len() && curr[common] == abspath[common] {
            common += 1;
        }
        let dots = ".".repeat(curr.len().saturating_sub(common));
        Some(format!("{}{}", dots, scigraph_path::unparse(&abspath[common..])))
    }
}
