//! Validation pipeline: parse, normalize, schema-check, render, and the
//! cross-document integrity checks that only make sense over a whole root.
//!
//! Everything in this module is fatal on failure: a malformed or invalid
//! document aborts the run before any file is written.

use crate::Result;
use crate::render::{self, RenderOptions};
use crate::spec::{self, DocKind};
use crate::task::ConversionTask;

use anyhow::{anyhow, bail};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// Parse and validate every task, filling in payload, rendered text, and
/// target path. Stops at the first invalid document.
pub fn load_tasks(tasks: &mut [ConversionTask], render_opts: &RenderOptions) -> Result<()> {
    for task in tasks.iter_mut() {
        let text = fs::read_to_string(&task.source)
            .map_err(|e| anyhow!("Failed to read {}: {}", task.source.display(), e))?;
        let mut data: Value = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON {}: {}", task.source.display(), e))?;

        if task.schema_migrate {
            normalize(task, &mut data);
        }

        let errors = spec::check(task.kind, &data);
        if !errors.is_empty() {
            let joined = errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            bail!("Validation failed for {}: {}", task.source.display(), joined);
        }

        if task.kind == DocKind::Variables {
            check_unique_variable_keys(&task.source, &data)?;
        }

        task.yaml_text = Some(render::render(&data, render_opts));
        task.target = Some(task.derive_target());
        task.data = Some(data);
    }
    Ok(())
}

/// Backfill a missing node/edge `id` from the percent-decoded file stem.
/// An existing non-empty `id` is never overwritten.
fn normalize(task: &ConversionTask, data: &mut Value) {
    if !matches!(task.kind, DocKind::Node | DocKind::Edge) {
        return;
    }
    let Some(obj) = data.as_object_mut() else {
        return;
    };
    let Some(decoded) = task.decode_id() else {
        return;
    };
    if decoded.is_empty() {
        return;
    }
    let missing = match obj.get("id") {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        // Non-string ids are left alone for schema validation to reject.
        Some(_) => false,
    };
    if missing {
        obj.insert("id".to_string(), Value::String(decoded));
    }
}

/// Variables carry invariants beyond the schema shape: every key must be
/// non-empty after trimming and unique within the document.
fn check_unique_variable_keys(source: &Path, data: &Value) -> Result<()> {
    let Some(entries) = data.as_array() else {
        bail!("Variables file is not an array: {}", source.display());
    };
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    for (idx, entry) in entries.iter().enumerate() {
        let Some(obj) = entry.as_object() else {
            bail!("Invalid variable entry at index {} in {}", idx, source.display());
        };
        let key = obj
            .get("key")
            .and_then(Value::as_str)
            .unwrap_or("")
            .trim()
            .to_string();
        if key.is_empty() {
            bail!("Variable at index {} missing key in {}", idx, source.display());
        }
        if let Some(prev) = seen.get(&key) {
            bail!(
                "Duplicate variable key '{}' in {} (indexes {} and {})",
                key,
                source.display(),
                prev,
                idx
            );
        }
        seen.insert(key, idx);
    }
    Ok(())
}

/// Root-mode referential integrity: node ids unique, edge endpoints resolve.
pub fn cross_validate(tasks: &[ConversionTask]) -> Result<()> {
    let node_count = tasks.iter().filter(|t| t.kind == DocKind::Node).count();
    let node_ids: BTreeSet<&str> = tasks
        .iter()
        .filter(|t| t.kind == DocKind::Node)
        .filter_map(|t| t.data.as_ref()?.get("id")?.as_str())
        .collect();
    if node_ids.len() != node_count {
        bail!("Duplicate node IDs detected during validation");
    }

    for task in tasks.iter().filter(|t| t.kind == DocKind::Edge) {
        let data = task.data.as_ref();
        let endpoint = |field: &str| -> String {
            data.and_then(|d| d.get(field))
                .and_then(Value::as_str)
                .unwrap_or("")
                .trim()
                .to_string()
        };
        let missing: Vec<String> = [endpoint("source"), endpoint("target")]
            .into_iter()
            .filter(|id| !id.is_empty() && !node_ids.contains(id.as_str()))
            .collect();
        if !missing.is_empty() {
            bail!(
                "Edge {} references missing nodes: {}",
                task.source.display(),
                missing.join(", ")
            );
        }
    }
    Ok(())
}
