//! Document kinds recognized by the converter.
//!
//! The kind set is closed: a graph store consists of one metadata file,
//! node files, edge files, and one variables file. Each kind selects the
//! schema rules applied in `spec::rules`.

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocKind {
    Meta,
    Node,
    Edge,
    Variables,
}

impl DocKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocKind::Meta => "meta",
            DocKind::Node => "node",
            DocKind::Edge => "edge",
            DocKind::Variables => "variables",
        }
    }
}

/// Classify an explicitly-listed file by naming convention.
///
/// The filename match is case-insensitive; directory segments are not.
/// Files discovered under a root are typed by directory role instead and
/// never pass through here.
pub fn classify(path: &Path) -> Option<DocKind> {
    let name = path.file_name()?.to_string_lossy().to_lowercase();
    if name == "graph.meta.json" {
        return Some(DocKind::Meta);
    }
    if name == "variables.json" {
        return Some(DocKind::Variables);
    }
    if has_dir_segment(path, "nodes") {
        return Some(DocKind::Node);
    }
    if has_dir_segment(path, "edges") {
        return Some(DocKind::Edge);
    }
    None
}

fn has_dir_segment(path: &Path, segment: &str) -> bool {
    path.parent()
        .map(|parent| parent.components().any(|c| c.as_os_str() == segment))
        .unwrap_or(false)
}
