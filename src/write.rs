//! Write policy + run report.
//!
//! Each rendered task goes through a small state machine: print to stdout,
//! skip (target already up to date, or dry-run/validate-only), or write for
//! real with optional backup and atomic replace. Write-stage I/O failures
//! are per-task: they are recorded in the report and the run keeps going.

use crate::Result;
use crate::diagnostics;
use crate::task::ConversionTask;

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

/// Run-level write flags, fixed for the whole run.
#[derive(Debug, Clone)]
pub struct WritePolicy {
    pub in_place: bool,
    pub dry_run: bool,
    pub validate_only: bool,
    pub atomic: bool,
    pub backup: bool,
    pub verbose: bool,
}

/// Accumulated per-task outcomes.
#[derive(Debug, Default)]
pub struct Report {
    pub converted: usize,
    pub skipped: usize,
    pub failures: Vec<String>,
}

impl Report {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// One-line summary, then any recorded failures.
    pub fn print_summary(&self) {
        diagnostics::status(format!(
            "Summary: converted={}, skipped={}, failed={}",
            self.converted,
            self.skipped,
            self.failures.len()
        ));
        for failure in &self.failures {
            diagnostics::error(failure);
        }
    }
}

pub fn handle_task(task: &ConversionTask, policy: &WritePolicy, report: &mut Report) {
    let (Some(yaml), Some(target)) = (task.yaml_text.as_deref(), task.target.as_deref()) else {
        report
            .failures
            .push(format!("Task {} was never rendered", task.source.display()));
        return;
    };
    let status = format!("{} -> {}", task.source.display(), target.display());

    if !policy.in_place && !(policy.dry_run || policy.validate_only) {
        diagnostics::status(format!("stdout: {}", task.source.display()));
        print!("{yaml}");
        report.converted += 1;
        return;
    }

    if target.exists() {
        match fs::read_to_string(target) {
            Ok(existing) if existing == yaml => {
                diagnostics::status(format!("skip: {status} (up-to-date)"));
                report.skipped += 1;
                return;
            }
            Ok(_) => {}
            Err(e) => {
                report
                    .failures
                    .push(format!("Failed to read existing {}: {}", target.display(), e));
                return;
            }
        }
    }

    if policy.validate_only || policy.dry_run {
        diagnostics::status(format!("dry-run: {status}"));
        report.skipped += 1;
        return;
    }

    if let Err(e) = write_output(task, yaml, target, policy) {
        report
            .failures
            .push(format!("Failed to write {}: {}", target.display(), e));
        return;
    }
    diagnostics::status(format!("ok: {status}"));
    report.converted += 1;
}

fn write_output(
    task: &ConversionTask,
    yaml: &str,
    target: &Path,
    policy: &WritePolicy,
) -> Result<()> {
    let parent = target.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(parent)?;

    if policy.backup && task.source.exists() {
        let backup = backup_path(&task.source);
        fs::copy(&task.source, &backup)?;
        copy_times(&task.source, &backup)?;
        diagnostics::verbose(
            policy.verbose,
            format!("Backup created at {}", backup.display()),
        );
    }

    if policy.atomic {
        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        tmp.write_all(yaml.as_bytes())?;
        tmp.persist(target)?;
    } else {
        fs::write(target, yaml)?;
    }
    Ok(())
}

/// `fs::copy` carries permissions but not timestamps; the backup must keep
/// the source's mtime as well.
fn copy_times(source: &Path, backup: &Path) -> Result<()> {
    let meta = fs::metadata(source)?;
    let mut times = fs::FileTimes::new();
    if let Ok(modified) = meta.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = meta.accessed() {
        times = times.set_accessed(accessed);
    }
    fs::File::options()
        .write(true)
        .open(backup)?
        .set_times(times)?;
    Ok(())
}

/// `<name>.<ext>` becomes `<name>.<ext>.bak`, next to the source.
fn backup_path(source: &Path) -> PathBuf {
    let mut name = source.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".bak");
    source.with_file_name(name)
}
