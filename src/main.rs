use clap::{ArgAction, ArgGroup, Parser};
use std::path::PathBuf;
use std::process::ExitCode;

mod collect;
mod diagnostics;
mod pipeline;
mod render;
mod spec;
mod task;
mod write;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "graph2yaml")]
#[command(about = "Convert graph store JSON files to YAML", long_about = None)]
#[command(group(ArgGroup::new("input").required(true).multiple(true).args(["root", "files"])))]
struct Cli {
    /// Graph repository root directory.
    #[arg(long)]
    root: Option<PathBuf>,

    /// Explicit JSON files to convert.
    #[arg(long, num_args = 1..)]
    files: Vec<PathBuf>,

    /// Output extension.
    #[arg(long, default_value = ".yaml")]
    output_ext: String,

    /// Print conversions to stdout instead of writing next to the sources.
    #[arg(long = "no-in-place", action = ArgAction::SetFalse)]
    in_place: bool,

    /// Create a .bak backup of each source JSON file.
    #[arg(long)]
    backup: bool,

    /// Validate and report without writing files.
    #[arg(long)]
    dry_run: bool,

    /// Write via temporary file and atomic rename.
    #[arg(long)]
    atomic: bool,

    /// Only run validation, no writes.
    #[arg(long)]
    validate_only: bool,

    /// Backfill missing node/edge ids from file names during conversion.
    #[arg(long)]
    schema_migrate: bool,

    /// Fail on unknown file types.
    #[arg(long)]
    strict: bool,

    /// Enable verbose logging.
    #[arg(long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if !cli.in_place && !cli.dry_run && !cli.validate_only {
        diagnostics::warn("--no-in-place set, conversion results will be printed to stdout");
    }

    match run(&cli) {
        Ok(report) if report.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(err) => {
            diagnostics::error(format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<write::Report> {
    // 1) Collect tasks from the root layout and/or the explicit file list.
    let mut tasks = collect::collect_tasks(&collect::CollectOptions {
        root: cli.root.as_deref(),
        files: &cli.files,
        output_ext: &cli.output_ext,
        schema_migrate: cli.schema_migrate,
        strict: cli.strict,
    })?;
    if tasks.is_empty() {
        diagnostics::warn("No files matched input arguments; nothing to do");
        return Ok(write::Report::default());
    }
    for task in &tasks {
        let shown = task.source.strip_prefix(&task.root).unwrap_or(&task.source);
        diagnostics::verbose(
            cli.verbose,
            format!("queued {}: {}", task.kind.as_str(), shown.display()),
        );
    }

    // 2) Parse, normalize, validate, and render every document. Any invalid
    //    document aborts here, before a single file is touched.
    let render_opts = render::RenderOptions::default();
    pipeline::load_tasks(&mut tasks, &render_opts)?;

    // 3) Referential integrity across the whole root.
    if cli.root.is_some() {
        pipeline::cross_validate(&tasks)?;
    }

    // 4) Write (or skip) each task; write failures are per-task.
    let policy = write::WritePolicy {
        in_place: cli.in_place,
        dry_run: cli.dry_run,
        validate_only: cli.validate_only,
        atomic: cli.atomic,
        backup: cli.backup,
        verbose: cli.verbose,
    };
    let mut report = write::Report::default();
    for task in &tasks {
        write::handle_task(task, &policy, &mut report);
    }
    report.print_summary();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("graph2yaml").chain(args.iter().copied()))
    }

    fn write_json(path: &Path, value: &serde_json::Value) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    }

    /// The reference layout: meta, two nodes, one edge, one variable.
    fn seed_graph(root: &Path) {
        write_json(
            &root.join("graph.meta.json"),
            &json!({
                "name": "main",
                "version": 1,
                "updatedAt": "2024-01-01T00:00:00Z",
                "format": 2
            }),
        );
        write_json(
            &root.join("nodes/trigger.json"),
            &json!({"id": "trigger", "template": "webhook"}),
        );
        write_json(
            &root.join("nodes/agent.json"),
            &json!({"id": "agent", "template": "llm"}),
        );
        write_json(
            &root.join("edges/e1.json"),
            &json!({
                "source": "trigger",
                "sourceHandle": "out",
                "target": "agent",
                "targetHandle": "in"
            }),
        );
        write_json(
            &root.join("variables.json"),
            &json!([{"key": "env", "value": "prod"}]),
        );
    }

    #[test]
    fn root_run_converts_all_then_skips_on_rerun() {
        let tmp = TempDir::new().unwrap();
        seed_graph(tmp.path());
        let root = tmp.path().to_str().unwrap().to_string();

        let report = run(&cli(&["--root", &root])).unwrap();
        assert_eq!(report.converted, 5);
        assert_eq!(report.skipped, 0);
        assert!(report.is_success());
        for rel in [
            "graph.meta.yaml",
            "nodes/trigger.yaml",
            "nodes/agent.yaml",
            "edges/e1.yaml",
            "variables.yaml",
        ] {
            assert!(tmp.path().join(rel).exists(), "missing {rel}");
        }

        // Idempotence: a second run changes nothing and reports skips.
        let report = run(&cli(&["--root", &root])).unwrap();
        assert_eq!(report.converted, 0);
        assert_eq!(report.skipped, 5);
        assert!(report.is_success());
    }

    #[test]
    fn dry_run_creates_no_files() {
        let tmp = TempDir::new().unwrap();
        seed_graph(tmp.path());
        let root = tmp.path().to_str().unwrap().to_string();

        let report = run(&cli(&["--root", &root, "--dry-run"])).unwrap();
        assert_eq!(report.converted, 0);
        assert_eq!(report.skipped, 5);
        assert!(!tmp.path().join("graph.meta.yaml").exists());
        assert!(!tmp.path().join("nodes/agent.yaml").exists());
    }

    #[test]
    fn validate_only_creates_no_files() {
        let tmp = TempDir::new().unwrap();
        seed_graph(tmp.path());
        let root = tmp.path().to_str().unwrap().to_string();

        let report = run(&cli(&["--root", &root, "--validate-only"])).unwrap();
        assert_eq!(report.converted, 0);
        assert_eq!(report.skipped, 5);
        for rel in [
            "graph.meta.yaml",
            "nodes/trigger.yaml",
            "nodes/agent.yaml",
            "edges/e1.yaml",
            "variables.yaml",
        ] {
            assert!(!tmp.path().join(rel).exists(), "unexpected {rel}");
        }
    }

    #[test]
    fn backup_run_copies_sources_once() {
        let tmp = TempDir::new().unwrap();
        seed_graph(tmp.path());
        let root = tmp.path().to_str().unwrap().to_string();

        run(&cli(&["--root", &root, "--backup", "--atomic"])).unwrap();
        let backup = tmp.path().join("nodes/agent.json.bak");
        assert_eq!(
            fs::read_to_string(&backup).unwrap(),
            fs::read_to_string(tmp.path().join("nodes/agent.json")).unwrap()
        );
        let before = fs::read_to_string(&backup).unwrap();

        // Second run: targets are up to date, backups untouched.
        let report = run(&cli(&["--root", &root, "--backup", "--atomic"])).unwrap();
        assert_eq!(report.converted, 0);
        assert_eq!(fs::read_to_string(&backup).unwrap(), before);
    }

    #[test]
    fn duplicate_variable_keys_abort_before_writing() {
        let tmp = TempDir::new().unwrap();
        seed_graph(tmp.path());
        write_json(
            &tmp.path().join("variables.json"),
            &json!([
                {"key": "env", "value": "prod"},
                {"key": "env", "value": "dev"}
            ]),
        );
        let root = tmp.path().to_str().unwrap().to_string();

        let err = run(&cli(&["--root", &root])).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Duplicate variable key 'env'"));
        assert!(msg.contains("(indexes 0 and 1)"));
        assert!(!tmp.path().join("graph.meta.yaml").exists());
    }

    #[test]
    fn dangling_edge_fails_cross_validation() {
        let tmp = TempDir::new().unwrap();
        seed_graph(tmp.path());
        write_json(
            &tmp.path().join("edges/e1.json"),
            &json!({
                "source": "trigger",
                "sourceHandle": "out",
                "target": "ghost",
                "targetHandle": "in"
            }),
        );
        let root = tmp.path().to_str().unwrap().to_string();

        let err = run(&cli(&["--root", &root])).unwrap_err();
        assert!(err.to_string().contains("references missing nodes: ghost"));
        assert!(!tmp.path().join("graph.meta.yaml").exists());
    }

    #[test]
    fn explicit_files_combine_with_root() {
        let tmp = TempDir::new().unwrap();
        seed_graph(tmp.path());
        let extra_dir = TempDir::new().unwrap();
        let extra = extra_dir.path().join("nodes/solo.json");
        write_json(&extra, &json!({"id": "solo", "template": "llm"}));

        let root = tmp.path().to_str().unwrap().to_string();
        let report = run(&cli(&[
            "--root",
            &root,
            "--files",
            extra.to_str().unwrap(),
        ]))
        .unwrap();
        assert_eq!(report.converted, 6);
        assert!(extra_dir.path().join("nodes/solo.yaml").exists());
    }

    #[test]
    fn empty_inputs_succeed_with_nothing_to_do() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().to_str().unwrap().to_string();
        let report = run(&cli(&["--root", &root])).unwrap();
        assert_eq!(report.converted + report.skipped, 0);
        assert!(report.is_success());
    }

    #[test]
    fn no_in_place_flag_defaults_on() {
        let c = cli(&["--root", "/tmp/x"]);
        assert!(c.in_place);
        let c = cli(&["--root", "/tmp/x", "--no-in-place"]);
        assert!(!c.in_place);
    }
}
