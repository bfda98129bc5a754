//! The dotted-segment path grammar used to address attributes and, via
//! link traversal, nested objects: `dot[1].not.ation[::-1]`.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PathError {
    #[error("failed to parse path '{0}'")]
    Parse(String),
    #[error("index {index} out of range for '{attr}'")]
    IndexOutOfRange { attr: String, index: i64 },
    #[error("'{attr}' is scalar but is indexed with {subscript}")]
    IndexedScalar { attr: String, subscript: String },
    #[error("'{attr}' is a list, but was not subscripted (slice with [:] to select the entire list)")]
    UnindexedList { attr: String },
    #[error("slice step cannot be zero")]
    ZeroStep,
}

/// The subscript attached to one path segment, if any.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Subscript {
    Index(i64),
    MultiIndex(Vec<i64>),
    Slice {
        start: Option<i64>,
        stop: Option<i64>,
        step: Option<i64>,
    },
}

/// One dot-separated segment of a path: an attribute name plus an optional
/// subscript.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathEntry {
    pub attr: String,
    pub subscript: Option<Subscript>,
}

impl PathEntry {
    pub fn plain(attr: impl Into<String>) -> Self {
        PathEntry {
            attr: attr.into(),
            subscript: None,
        }
    }

    pub fn indexed(attr: impl Into<String>, index: i64) -> Self {
        PathEntry {
            attr: attr.into(),
            subscript: Some(Subscript::Index(index)),
        }
    }

    /// Whether this segment carries no subscript or a single plain index:
    /// segments like this can never expand a path into more than one.
    pub fn is_plain(&self) -> bool {
        !matches!(self.subscript, Some(Subscript::MultiIndex(_)) | Some(Subscript::Slice { .. }))
    }

    pub fn has_subscript(&self) -> bool {
        self.subscript.is_some()
    }

    fn subscript_str(&self) -> String {
        match &self.subscript {
            None => String::new(),
            Some(Subscript::Index(i)) => format!("[{i}]"),
            Some(Subscript::MultiIndex(ixs)) if ixs.len() == 1 => format!("[{},]", ixs[0]),
            Some(Subscript::MultiIndex(ixs)) => {
                format!("[{}]", ixs.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(","))
            }
            Some(Subscript::Slice { start, stop, step }) => {
                let s0 = start.map(|v| v.to_string()).unwrap_or_default();
                let s1 = stop.map(|v| v.to_string()).unwrap_or_default();
                let s2 = step.map(|v| format!(":{v}")).unwrap_or_default();
                format!("[{s0}:{s1}{s2}]")
            }
        }
    }

    pub fn to_str(&self) -> String {
        format!("{}{}", self.attr, self.subscript_str())
    }
}

/// Parses a dotted path into its segments. An empty string parses to an
/// empty path (the root object itself).
pub fn parse(path: &str) -> Result<Vec<PathEntry>, PathError> {
    if path.is_empty() {
        return Ok(Vec::new());
    }
    path.split('.').map(parse_segment).collect()
}

/// Parses a single dot-free segment, e.g. `"ation[::-1]"`.
pub fn parse_segment(segment: &str) -> Result<PathEntry, PathError> {
    let (attr, suffix) = match segment.strip_suffix(']') {
        Some(rest) => {
            let bracket = rest
                .rfind('[')
                .ok_or_else(|| PathError::Parse(segment.to_string()))?;
            (&rest[..bracket], Some(&rest[bracket + 1..]))
        }
        None => (segment, None),
    };
    validate_attr(attr, segment)?;
    let subscript = match suffix {
        None => None,
        Some(s) => Some(parse_suffix(s, segment)?),
    };
    Ok(PathEntry {
        attr: attr.to_string(),
        subscript,
    })
}

fn validate_attr(attr: &str, whole: &str) -> Result<(), PathError> {
    let mut chars = attr.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return Err(PathError::Parse(whole.to_string())),
    }
    if !chars.clone().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(PathError::Parse(whole.to_string()));
    }
    Ok(())
}

fn parse_opt_int(s: &str, whole: &str) -> Result<Option<i64>, PathError> {
    if s.is_empty() {
        Ok(None)
    } else {
        s.parse::<i64>().map(Some).map_err(|_| PathError::Parse(whole.to_string()))
    }
}

fn parse_suffix(suffix: &str, whole: &str) -> Result<Subscript, PathError> {
    if suffix.contains(':') {
        let mut parts = suffix.splitn(2, ':');
        let s0 = parse_opt_int(parts.next().unwrap_or(""), whole)?;
        let rest = parts.next().unwrap_or("");
        let (s1_str, s2_str) = match rest.split_once(':') {
            Some((a, b)) => (a, b),
            None => (rest, ""),
        };
        let s1 = parse_opt_int(s1_str, whole)?;
        let s2 = parse_opt_int(s2_str, whole)?;
        Ok(Subscript::Slice {
            start: s0,
            stop: s1,
            step: s2,
        })
    } else if suffix.contains(',') {
        let idxs: Result<Vec<i64>, _> = suffix
            .split(',')
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<i64>())
            .collect();
        idxs.map(Subscript::MultiIndex)
            .map_err(|_| PathError::Parse(whole.to_string()))
    } else {
        suffix
            .parse::<i64>()
            .map(Subscript::Index)
            .map_err(|_| PathError::Parse(whole.to_string()))
    }
}

/// Renders a parsed path back to its dotted string form.
pub fn unparse(path: &[PathEntry]) -> String {
    path.iter().map(PathEntry::to_str).collect::<Vec<_>>().join(".")
}

/// Applies one segment's subscript to a link attribute's value, returning
/// the list of referenced ids it selects. `value` is either a bare id
/// string (a scalar link) or an array of ids (a list link), mirroring the
/// attribute's declared shape.
pub fn apply_indexing<'a>(entry: &PathEntry, value: &'a Value) -> Result<Vec<&'a Value>, PathError> {
    let scalar = !value.is_array();
    if !entry.has_subscript() {
        if !scalar {
            return Err(PathError::UnindexedList {
                attr: entry.attr.clone(),
            });
        }
        return Ok(vec![value]);
    }
    if scalar {
        return Err(PathError::IndexedScalar {
            attr: entry.attr.clone(),
            subscript: entry.subscript_str(),
        });
    }
    let items = value.as_array().expect("checked non-scalar above");
    match entry.subscript.as_ref().unwrap() {
        Subscript::Index(i) => Ok(vec![index_one(items, *i, &entry.attr)?]),
        Subscript::MultiIndex(ixs) => ixs
            .iter()
            .map(|i| index_one(items, *i, &entry.attr))
            .collect(),
        Subscript::Slice { start, stop, step } => {
            let indices = python_slice(items.len(), *start, *stop, *step)?;
            Ok(indices.into_iter().map(|i| &items[i]).collect())
        }
    }
}

fn index_one<'a>(items: &'a [Value], i: i64, attr: &str) -> Result<&'a Value, PathError> {
    let len = items.len() as i64;
    let real = if i < 0 { i + len } else { i };
    items
        .get(real as usize)
        .filter(|_| real >= 0)
        .ok_or_else(|| PathError::IndexOutOfRange {
            attr: attr.to_string(),
            index: i,
        })
}

/// Reimplements CPython's `slice.indices(len)` normalization.
fn python_slice(
    len: usize,
    start: Option<i64>,
    stop: Option<i64>,
    step: Option<i64>,
) -> Result<Vec<usize>, PathError> {
    let len_i = len as i64;
    let step = step.unwrap_or(1);
    if step == 0 {
        return Err(PathError::ZeroStep);
    }
    let clamp = |v: i64, lo: i64, hi: i64| v.max(lo).min(hi);
    let normalize = |v: i64| if v < 0 { v + len_i } else { v };

    let (default_start, default_stop) = if step > 0 { (0, len_i) } else { (len_i - 1, -1) };
    let start_v = match start {
        Some(s) => {
            let s = normalize(s);
            if step > 0 {
                clamp(s, 0, len_i)
            } else {
                clamp(s, -1, len_i - 1)
            }
        }
        None => default_start,
    };
    let stop_v = match stop {
        Some(s) => {
            let s = normalize(s);
            if step > 0 {
                clamp(s, 0, len_i)
            } else {
                clamp(s, -1, len_i - 1)
            }
        }
        None => default_stop,
    };

    let mut out = Vec::new();
    let mut i = start_v;
    if step > 0 {
        while i < stop_v {
            out.push(i as usize);
            i += step;
        }
    } else {
        while i > stop_v {
            out.push(i as usize);
            i += step;
        }
    }
    Ok(out)
}
