//! Block-style YAML emission for parsed JSON trees.
//!
//! Output contract:
//! - two-space indent for mappings and sequences (dashes indented under
//!   their parent key)
//! - key order preserved exactly as parsed (never alphabetized)
//! - no line wrapping, no flow collections except empty `{}` / `[]`
//! - exactly one trailing newline
//!
//! Rendering is a pure function of the value: the same tree always yields
//! byte-identical text.

use serde_json::Value;

/// Process-wide rendering style. Constructed once at startup and passed by
/// reference; never mutated.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub indent: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

/// Render `value` as a block-style YAML document.
pub fn render(value: &Value, opts: &RenderOptions) -> String {
    let mut out = String::new();
    match value {
        Value::Object(map) if !map.is_empty() => write_mapping(map, 0, opts, &mut out),
        Value::Array(seq) if !seq.is_empty() => write_sequence(seq, 0, opts, &mut out),
        other => {
            out.push_str(&inline(other).unwrap_or_default());
            out.push('\n');
        }
    }
    out
}

/// Inline form for scalars and empty collections; None for anything that
/// needs a nested block.
fn inline(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some("null".to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(quote_str(s)),
        Value::Object(map) if map.is_empty() => Some("{}".to_string()),
        Value::Array(seq) if seq.is_empty() => Some("[]".to_string()),
        Value::Object(_) | Value::Array(_) => None,
    }
}

fn pad(level: usize, opts: &RenderOptions) -> String {
    " ".repeat(level * opts.indent)
}

fn write_mapping(
    map: &serde_json::Map<String, Value>,
    level: usize,
    opts: &RenderOptions,
    out: &mut String,
) {
    let indent = pad(level, opts);
    for (key, value) in map {
        out.push_str(&indent);
        out.push_str(&quote_str(key));
        out.push(':');
        match inline(value) {
            Some(text) => {
                out.push(' ');
                out.push_str(&text);
                out.push('\n');
            }
            None => {
                out.push('\n');
                match value {
                    Value::Object(m) => write_mapping(m, level + 1, opts, out),
                    Value::Array(s) => write_sequence(s, level + 1, opts, out),
                    _ => unreachable!("inline covers scalars"),
                }
            }
        }
    }
}

fn write_sequence(seq: &[Value], level: usize, opts: &RenderOptions, out: &mut String) {
    let indent = pad(level, opts);
    for item in seq {
        if let Some(text) = inline(item) {
            out.push_str(&indent);
            out.push_str("- ");
            out.push_str(&text);
            out.push('\n');
            continue;
        }
        // Render the nested block one level deeper, then fold the dash into
        // its first line. "- " is exactly one indent step wide, so the
        // continuation lines stay aligned.
        let mut block = String::new();
        match item {
            Value::Object(m) => write_mapping(m, level + 1, opts, &mut block),
            Value::Array(s) => write_sequence(s, level + 1, opts, &mut block),
            _ => unreachable!("inline covers scalars"),
        }
        let child_indent = pad(level + 1, opts);
        out.push_str(&indent);
        out.push_str("- ");
        out.push_str(&block[child_indent.len()..]);
    }
}

fn quote_str(s: &str) -> String {
    if s.chars().any(|c| c.is_control()) {
        return double_quoted(s);
    }
    if needs_quoting(s) {
        return format!("'{}'", s.replace('\'', "''"));
    }
    s.to_string()
}

/// Whether a string would be misread if emitted plain.
fn needs_quoting(s: &str) -> bool {
    if s.is_empty() || s.trim() != s {
        return true;
    }
    let first = s.chars().next().unwrap_or(' ');
    if "-?:,[]{}#&*!|>'\"%@`".contains(first) {
        return true;
    }
    if s.contains(": ") || s.ends_with(':') || s.contains(" #") {
        return true;
    }
    let lower = s.to_ascii_lowercase();
    if matches!(
        lower.as_str(),
        "true" | "false" | "null" | "~" | "yes" | "no" | "on" | "off"
    ) {
        return true;
    }
    // Anything that parses as a number must stay a string.
    s.parse::<f64>().is_ok()
}

fn double_quoted(s: &str) -> String {
    let mut out = String::from("\"");
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
