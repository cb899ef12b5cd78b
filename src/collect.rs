//! Task collection: root-layout discovery + explicit file lists.
//!
//! Root mode walks the fixed convention (`graph.meta.json`, `nodes/*.json`,
//! `edges/*.json`, `variables.json`); missing optional pieces are silently
//! skipped. Explicitly-listed files must exist and are typed by the
//! classifier; unclassifiable files are fatal under `--strict`, otherwise
//! warned and dropped. Root results come first, then the file list in
//! argument order.

use crate::Result;
use crate::diagnostics;
use crate::spec::{DocKind, classify};
use crate::task::ConversionTask;

use anyhow::{Context, bail};
use std::fs;
use std::path::{Path, PathBuf};

pub struct CollectOptions<'a> {
    pub root: Option<&'a Path>,
    pub files: &'a [PathBuf],
    pub output_ext: &'a str,
    pub schema_migrate: bool,
    pub strict: bool,
}

pub fn collect_tasks(opts: &CollectOptions<'_>) -> Result<Vec<ConversionTask>> {
    let mut tasks = Vec::new();

    if let Some(root) = opts.root {
        let meta = root.join("graph.meta.json");
        if meta.exists() {
            tasks.push(make_task(meta, DocKind::Meta, root, opts));
        }
        for node_file in json_files_in(&root.join("nodes"))? {
            tasks.push(make_task(node_file, DocKind::Node, root, opts));
        }
        for edge_file in json_files_in(&root.join("edges"))? {
            tasks.push(make_task(edge_file, DocKind::Edge, root, opts));
        }
        let variables = root.join("variables.json");
        if variables.exists() {
            tasks.push(make_task(variables, DocKind::Variables, root, opts));
        }
    }

    for file in opts.files {
        if !file.exists() {
            bail!("File not found: {}", file.display());
        }
        match classify(file) {
            Some(kind) => {
                let root = opts
                    .root
                    .map(Path::to_path_buf)
                    .or_else(|| file.parent().map(Path::to_path_buf))
                    .unwrap_or_default();
                tasks.push(make_task(file.clone(), kind, &root, opts));
            }
            None if opts.strict => bail!("Unknown file type for {}", file.display()),
            None => diagnostics::warn(format!(
                "Unknown file type for {}; skipping",
                file.display()
            )),
        }
    }

    Ok(tasks)
}

/// `*.json` files directly under `dir`, sorted lexicographically by name.
/// A missing directory yields nothing; that is not an error.
fn json_files_in(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    let entries =
        fs::read_dir(dir).with_context(|| format!("read directory {}", dir.display()))?;
    for entry in entries {
        let path = entry
            .with_context(|| format!("read directory {}", dir.display()))?
            .path();
        if path.is_file() && path.extension().is_some_and(|e| e == "json") {
            files.push(path);
        }
    }
    files.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));
    Ok(files)
}

fn make_task(
    source: PathBuf,
    kind: DocKind,
    root: &Path,
    opts: &CollectOptions<'_>,
) -> ConversionTask {
    let encoded_id = match kind {
        DocKind::Node | DocKind::Edge => source
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned()),
        DocKind::Meta | DocKind::Variables => None,
    };
    ConversionTask {
        source,
        kind,
        output_ext: opts.output_ext.to_string(),
        root: root.to_path_buf(),
        schema_migrate: opts.schema_migrate,
        encoded_id,
        data: None,
        yaml_text: None,
        target: None,
    }
}
