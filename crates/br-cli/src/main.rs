//! CLI entry point for batch report inspection.
//!
//! This binary opens a report directory written by a scanner and either
//! summarizes it, renders it in full, or checks it for consistency.
//!
//! # Usage
//!
//! ```bash
//! batch-report [OPTIONS] <COMMAND>
//!
//! # Metadata and counts
//! batch-report inspect ./report
//!
//! # Full rendering as JSON
//! batch-report dump ./report --format json --output report.json
//!
//! # Consistency check (non-zero exit on failure)
//! batch-report validate ./report
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod tree;

use std::fmt::Write as _;
use std::io::Write;

use br_core::{Component, ComponentType, FxHashMap, Issue, Issues, Metadata, Severity, StoreConfig};
use br_store::ReportReader;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::tree::{ComponentEntry, ReportTree};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Inspect, dump and validate batch analysis report directories.
#[derive(Parser)]
#[command(name = "batch-report", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// JSON store configuration file.
    #[arg(short, long, global = true, env = "BATCH_REPORT_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Show metadata and record counts.
    Inspect {
        /// Report directory.
        dir: Utf8PathBuf,
    },

    /// Render the whole report.
    Dump {
        /// Report directory.
        dir: Utf8PathBuf,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = DumpFormat::Text)]
        format: DumpFormat,

        /// Output file (defaults to stdout).
        #[arg(short, long)]
        output: Option<Utf8PathBuf>,
    },

    /// Check that the component tree and deleted records are consistent.
    Validate {
        /// Report directory.
        dir: Utf8PathBuf,
    },
}

/// Dump output format.
#[derive(Clone, Copy, ValueEnum)]
enum DumpFormat {
    /// Indented tree.
    Text,
    /// JSON format.
    Json,
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `warn` level by default so that
/// command output is not interleaved with store logs.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "warn" };
        EnvFilter::new(level)
    });

    // Check if colors should be disabled (flag or NO_COLOR env var)
    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(use_ansi)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Loads the store configuration, falling back to defaults.
fn load_config(path: Option<&Utf8Path>) -> color_eyre::Result<StoreConfig> {
    match path {
        Some(path) => {
            let config = StoreConfig::from_json_file(path)?;
            debug!(path = %path, ?config, "Loaded configuration");
            Ok(config)
        }
        None => Ok(StoreConfig::default()),
    }
}

/// Opens the report at `dir` and walks it.
fn load_tree(dir: &Utf8Path, config: &StoreConfig) -> color_eyre::Result<ReportTree> {
    let reader = ReportReader::open_with_config(dir, config.reader)?;
    Ok(ReportTree::load(&reader)?)
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Prints the metadata summary and record counts.
fn run_inspect(dir: &Utf8Path, config: &StoreConfig) -> color_eyre::Result<()> {
    info!(dir = %dir, "Inspecting report");

    let tree = load_tree(dir, config)?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    write!(handle, "{}", render_inspect(&tree))?;
    Ok(())
}

/// Renders the whole report in the requested format.
fn run_dump(
    dir: &Utf8Path,
    config: &StoreConfig,
    format: DumpFormat,
    output: Option<&Utf8Path>,
) -> color_eyre::Result<()> {
    info!(dir = %dir, "Dumping report");

    let tree = load_tree(dir, config)?;
    let content = match format {
        DumpFormat::Text => render_dump_text(&tree),
        DumpFormat::Json => render_dump_json(&tree)?,
    };

    if let Some(output_path) = output {
        std::fs::write(output_path.as_std_path(), &content)?;
        info!(path = %output_path, "Dump written");
    } else {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        write!(handle, "{content}")?;
    }

    Ok(())
}

/// Validates the report, failing with a non-zero exit if problems are found.
fn run_validate(dir: &Utf8Path, config: &StoreConfig) -> color_eyre::Result<()> {
    info!(dir = %dir, "Validating report");

    let tree = load_tree(dir, config)?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    write!(handle, "{}", render_validation(&tree))?;

    if tree.is_valid() {
        Ok(())
    } else {
        Err(color_eyre::eyre::eyre!(
            "report is invalid: {} problem(s)",
            tree.problems.len()
        ))
    }
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

/// Renders the `inspect` summary.
fn render_inspect(tree: &ReportTree) -> String {
    let metadata = &tree.metadata;
    let mut out = String::new();

    let root = metadata
        .root_ref()
        .map_or_else(|| "-".to_owned(), |root| root.to_string());
    let types = histogram_summary(tree.type_histogram(), ComponentType::label);
    let severities = histogram_summary(tree.severity_histogram(), Severity::label);

    let _ = writeln!(out, "{:<20}{}", "Project:", or_dash(metadata.project_key()));
    let _ = writeln!(out, "{:<20}{}", "Branch:", or_dash(metadata.branch()));
    let _ = writeln!(out, "{:<20}{}", "Analysis date:", metadata.analysis_date());
    let _ = writeln!(out, "{:<20}{root}", "Root component:");
    let _ = writeln!(out, "{:<20}{}{types}", "Components:", tree.components.len());
    let _ = writeln!(out, "{:<20}{}{severities}", "Issues:", tree.issue_count());
    let _ = writeln!(
        out,
        "{:<20}{} ({} issues)",
        "Deleted components:",
        tree.deleted.len(),
        tree.deleted_issue_count()
    );
    let _ = writeln!(out, "{:<20}{}", "Problems:", tree.problems.len());

    out
}

/// Renders the indented text dump.
fn render_dump_text(tree: &ReportTree) -> String {
    let metadata = &tree.metadata;
    let mut out = String::new();

    let _ = write!(out, "{}", or_dash(metadata.project_key()));
    if !metadata.branch().is_empty() {
        let _ = write!(out, " @ {}", metadata.branch());
    }
    let _ = writeln!(out, " (analysis date {})", metadata.analysis_date());

    for entry in &tree.components {
        let indent = "  ".repeat(entry.depth);
        let _ = writeln!(out, "{indent}{}", component_line(&entry.component));
        write_issues(&mut out, &indent, &entry.issues);
    }

    if !tree.deleted.is_empty() {
        let _ = writeln!(out, "Deleted components:");
        for deleted in &tree.deleted {
            let _ = writeln!(
                out,
                "  #{} [{}]",
                deleted.component_ref(),
                deleted.component_uuid()
            );
            write_issues(&mut out, "  ", &deleted.issues);
        }
    }

    for problem in &tree.problems {
        let _ = writeln!(out, "problem: {problem}");
    }

    out
}

/// Renders the JSON dump.
fn render_dump_json(tree: &ReportTree) -> color_eyre::Result<String> {
    #[derive(serde::Serialize)]
    struct Dump<'a> {
        metadata: &'a Metadata,
        components: &'a [ComponentEntry],
        deleted: &'a [Issues],
        problems: Vec<String>,
    }

    let dump = Dump {
        metadata: &tree.metadata,
        components: &tree.components,
        deleted: &tree.deleted,
        problems: tree.problems.iter().map(ToString::to_string).collect(),
    };
    serde_json::to_string_pretty(&dump)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to serialize JSON: {}", e))
}

/// Renders the `validate` report.
fn render_validation(tree: &ReportTree) -> String {
    let mut out = String::new();
    if tree.is_valid() {
        let _ = writeln!(
            out,
            "OK: {} components, {} deleted components",
            tree.components.len(),
            tree.deleted.len()
        );
    } else {
        for problem in &tree.problems {
            let _ = writeln!(out, "problem: {problem}");
        }
    }
    out
}

fn component_line(component: &Component) -> String {
    let name = [component.name(), component.key(), component.path()]
        .into_iter()
        .find(|name| !name.is_empty())
        .unwrap_or("-");
    format!(
        "#{} {} {name} [{}]",
        component.reference(),
        component.component_type().label(),
        component.uuid()
    )
}

fn write_issues(out: &mut String, indent: &str, issues: &[Issue]) {
    for issue in issues {
        let location = if issue.is_file_level() {
            "file".to_owned()
        } else {
            format!("line {}", issue.line())
        };
        let _ = writeln!(
            out,
            "{indent}  - {} {location} {}: {}",
            issue.severity().label(),
            issue.uuid(),
            issue.message()
        );
    }
}

/// Formats non-empty histogram buckets as ` (a 1, b 2)`, ordered by key.
fn histogram_summary<K: Ord + Copy>(
    histogram: FxHashMap<K, usize>,
    label: impl Fn(K) -> &'static str,
) -> String {
    let mut buckets: Vec<(K, usize)> = histogram.into_iter().collect();
    if buckets.is_empty() {
        return String::new();
    }
    buckets.sort_unstable();
    let parts: Vec<String> = buckets
        .into_iter()
        .map(|(key, count)| format!("{} {count}", label(key)))
        .collect();
    format!(" ({})", parts.join(", "))
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
fn main() -> color_eyre::Result<()> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.verbose, cli.no_color);

    // 4. Load configuration
    let config = load_config(cli.config.as_deref())?;

    // 5. Route to appropriate command
    match &cli.command {
        Commands::Inspect { dir } => run_inspect(dir, &config),
        Commands::Dump {
            dir,
            format,
            output,
        } => run_dump(dir, &config, *format, output.as_deref()),
        Commands::Validate { dir } => run_validate(dir, &config),
    }
}
