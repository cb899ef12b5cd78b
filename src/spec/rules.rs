//! Fixed per-kind schema rules.
//!
//! Each kind gets one check function over the parsed `serde_json::Value`.
//! Checks collect *all* violations rather than stopping at the first; the
//! caller sorts them by field path (done here) and joins them into a single
//! fatal message. The schemas are not user-configurable.

use crate::spec::DocKind;
use serde_json::Value;
use std::fmt;

/// One step into a document: an object key or an array index.
///
/// Index sorts before Key so error ordering is total and deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum PathSeg {
    Index(usize),
    Key(String),
}

impl fmt::Display for PathSeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSeg::Index(i) => write!(f, "{}", i),
            PathSeg::Key(k) => write!(f, "{}", k),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ValidationError {
    pub path: Vec<PathSeg>,
    pub message: String,
}

impl ValidationError {
    fn at(path: Vec<PathSeg>, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }

    fn root(message: impl Into<String>) -> Self {
        Self::at(Vec::new(), message)
    }
}

impl fmt::Display for ValidationError {
    /// Dot-joined field path, then the message; root errors have no prefix.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            return write!(f, "{}", self.message);
        }
        let joined = self
            .path
            .iter()
            .map(|seg| seg.to_string())
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "{}: {}", joined, self.message)
    }
}

/// Run the schema rules for `kind` over `value`.
///
/// Returns every violation found, sorted by field path. Empty means valid.
pub fn check(kind: DocKind, value: &Value) -> Vec<ValidationError> {
    let mut errors = match kind {
        DocKind::Meta => check_meta(value),
        DocKind::Node => check_node(value),
        DocKind::Edge => check_edge(value),
        DocKind::Variables => check_variables(value),
    };
    errors.sort();
    errors
}

fn check_meta(value: &Value) -> Vec<ValidationError> {
    let Some(obj) = value.as_object() else {
        return vec![ValidationError::root("expected an object")];
    };
    let mut errors = Vec::new();
    require_string(obj, "name", &mut errors);
    require_integer(obj, "version", &mut errors);
    require_string(obj, "updatedAt", &mut errors);
    match obj.get("format") {
        None => errors.push(ValidationError::root("'format' is a required property")),
        Some(v) if !is_integer(v) => {
            errors.push(ValidationError::at(key_path("format"), "expected an integer"))
        }
        Some(v) if v.as_f64() != Some(2.0) => {
            errors.push(ValidationError::at(key_path("format"), "must be one of: 2"))
        }
        Some(_) => {}
    }
    errors
}

fn check_node(value: &Value) -> Vec<ValidationError> {
    let Some(obj) = value.as_object() else {
        return vec![ValidationError::root("expected an object")];
    };
    let mut errors = Vec::new();
    require_string(obj, "id", &mut errors);
    require_string(obj, "template", &mut errors);
    optional_object(obj, "config", &mut errors);
    optional_object(obj, "state", &mut errors);
    if let Some(position) = obj.get("position") {
        match position.as_object() {
            None => errors.push(ValidationError::at(key_path("position"), "expected an object")),
            Some(pos) => {
                for axis in ["x", "y"] {
                    if let Some(v) = pos.get(axis) {
                        if !v.is_number() {
                            errors.push(ValidationError::at(
                                vec![PathSeg::Key("position".into()), PathSeg::Key(axis.into())],
                                "expected a number",
                            ));
                        }
                    }
                }
            }
        }
    }
    errors
}

fn check_edge(value: &Value) -> Vec<ValidationError> {
    let Some(obj) = value.as_object() else {
        return vec![ValidationError::root("expected an object")];
    };
    let mut errors = Vec::new();
    for field in ["source", "sourceHandle", "target", "targetHandle"] {
        require_string(obj, field, &mut errors);
    }
    if let Some(id) = obj.get("id") {
        if !id.is_string() {
            errors.push(ValidationError::at(key_path("id"), "expected a string"));
        }
    }
    errors
}

fn check_variables(value: &Value) -> Vec<ValidationError> {
    let Some(entries) = value.as_array() else {
        return vec![ValidationError::root("expected an array")];
    };
    let mut errors = Vec::new();
    for (idx, entry) in entries.iter().enumerate() {
        let Some(obj) = entry.as_object() else {
            errors.push(ValidationError::at(
                vec![PathSeg::Index(idx)],
                "expected an object",
            ));
            continue;
        };
        for field in ["key", "value"] {
            match obj.get(field) {
                None => errors.push(ValidationError::at(
                    vec![PathSeg::Index(idx)],
                    format!("'{}' is a required property", field),
                )),
                Some(v) if !v.is_string() => errors.push(ValidationError::at(
                    vec![PathSeg::Index(idx), PathSeg::Key(field.into())],
                    "expected a string",
                )),
                Some(_) => {}
            }
        }
        // Entries are closed: anything beyond key/value is rejected.
        for extra in obj.keys().filter(|k| *k != "key" && *k != "value") {
            errors.push(ValidationError::at(
                vec![PathSeg::Index(idx), PathSeg::Key(extra.clone())],
                "additional property is not permitted",
            ));
        }
    }
    errors
}

fn key_path(key: &str) -> Vec<PathSeg> {
    vec![PathSeg::Key(key.to_string())]
}

fn optional_object(
    obj: &serde_json::Map<String, Value>,
    field: &str,
    errors: &mut Vec<ValidationError>,
) {
    if let Some(v) = obj.get(field) {
        if !v.is_object() {
            errors.push(ValidationError::at(key_path(field), "expected an object"));
        }
    }
}

fn require_string(
    obj: &serde_json::Map<String, Value>,
    field: &str,
    errors: &mut Vec<ValidationError>,
) {
    match obj.get(field) {
        None => errors.push(ValidationError::root(format!(
            "'{}' is a required property",
            field
        ))),
        Some(v) if !v.is_string() => {
            errors.push(ValidationError::at(key_path(field), "expected a string"))
        }
        Some(_) => {}
    }
}

fn require_integer(
    obj: &serde_json::Map<String, Value>,
    field: &str,
    errors: &mut Vec<ValidationError>,
) {
    match obj.get(field) {
        None => errors.push(ValidationError::root(format!(
            "'{}' is a required property",
            field
        ))),
        Some(v) if !is_integer(v) => {
            errors.push(ValidationError::at(key_path(field), "expected an integer"))
        }
        Some(_) => {}
    }
}

/// Integer in the JSON Schema sense: any number with a zero fraction.
fn is_integer(value: &Value) -> bool {
    if value.is_i64() || value.is_u64() {
        return true;
    }
    value.as_f64().map(|f| f.fract() == 0.0).unwrap_or(false)
}
