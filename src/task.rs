//! Per-file conversion state.

use crate::spec::DocKind;
use serde_json::Value;
use std::path::PathBuf;

/// One source file moving through the pipeline.
///
/// Created by the collector; the pipeline fills in `data`, `yaml_text`, and
/// `target`; the writer consumes them. A task lives until its outcome lands
/// in the report.
#[derive(Debug, Clone)]
pub struct ConversionTask {
    pub source: PathBuf,
    pub kind: DocKind,
    pub output_ext: String,
    pub root: PathBuf,
    pub schema_migrate: bool,
    /// File stem of node/edge sources, captured eagerly at collection time.
    /// Percent-decoded by `decode_id` when normalization needs it.
    pub encoded_id: Option<String>,
    pub data: Option<Value>,
    pub yaml_text: Option<String>,
    pub target: Option<PathBuf>,
}

impl ConversionTask {
    /// Target path: the source with its extension swapped for `output_ext`.
    pub fn derive_target(&self) -> PathBuf {
        let ext = self.output_ext.trim_start_matches('.');
        self.source.with_extension(ext)
    }

    /// One round of percent-decoding over the encoded identifier.
    ///
    /// Input that decodes to invalid UTF-8 falls back to the raw stem; we
    /// deliberately never attempt further unescaping layers.
    pub fn decode_id(&self) -> Option<String> {
        let raw = self.encoded_id.as_deref()?;
        Some(match urlencoding::decode(raw) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => raw.to_string(),
        })
    }
}
