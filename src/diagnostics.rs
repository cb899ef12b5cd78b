//! Console output contract.
//!
//! All user-visible lines go through here: `[warn]` / `[error]` prefixes,
//! per-task status lines, and verbose-only notes. Everything, errors
//! included, goes to stdout: the contract is a single ordered stream, with
//! `[error]` lines interleaved in sequence with the statuses and summary.

pub fn warn(message: impl AsRef<str>) {
    println!("[warn] {}", message.as_ref());
}

pub fn error(message: impl AsRef<str>) {
    println!("[error] {}", message.as_ref());
}

/// Per-task status line (`ok:`, `skip:`, `dry-run:`, `stdout:`) or summary.
pub fn status(line: impl AsRef<str>) {
    println!("{}", line.as_ref());
}

/// Printed only when verbose logging is enabled.
pub fn verbose(enabled: bool, message: impl AsRef<str>) {
    if enabled {
        println!("{}", message.as_ref());
    }
}
