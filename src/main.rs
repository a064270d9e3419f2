use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, ValueEnum, ValueHint};
use log::{info, warn};
use prism_lib::batch::run_batch;
use prism_lib::config::{Settings, SettingsOverrides};
use prism_lib::discovery::resolve_targets;
use prism_lib::logging::{self, LogSettings};
use prism_lib::IndexKind;

/// Probably Repairs Inconsistent Semi-transparency
#[derive(Parser, Debug)]
#[command(name = "prism", author, version, about)]
struct Cli {
    /// PNG images to process
    #[arg(value_hint = ValueHint::FilePath, required_unless_present = "folder")]
    files: Vec<PathBuf>,
    /// Process all .png files in the specified folder
    #[arg(short, long, value_hint = ValueHint::DirPath)]
    folder: Option<PathBuf>,
    /// Scan folders recursively (requires --folder)
    #[arg(short, long)]
    recursive: bool,
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
    /// Only log errors
    #[arg(short, long, conflicts_with = "debug")]
    quiet: bool,
    /// Worker threads for the batch (0 = one per core)
    #[arg(short, long)]
    jobs: Option<usize>,
    /// Nearest-seed index implementation
    #[arg(long, value_enum)]
    index: Option<IndexArg>,
    /// Diagnostic: make repaired pixels opaque so their new colour is visible
    #[arg(long)]
    reveal: bool,
    /// Repair in memory but do not write any file
    #[arg(long)]
    dry_run: bool,
    /// JSON settings file
    #[arg(long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,
    /// Write a JSON summary of the run to this path
    #[arg(long, value_hint = ValueHint::FilePath)]
    report: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum IndexArg {
    KdTree,
    Linear,
}

impl From<IndexArg> for IndexKind {
    fn from(value: IndexArg) -> Self {
        match value {
            IndexArg::KdTree => IndexKind::KdTree,
            IndexArg::Linear => IndexKind::Linear,
        }
    }
}

impl Cli {
    /// `-r` only means something together with `--folder`
    fn recursive_without_folder(&self) -> bool {
        self.recursive && self.folder.is_none()
    }

    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            recursive: self.recursive.then_some(true),
            jobs: self.jobs,
            dry_run: self.dry_run.then_some(true),
            index: self.index.map(IndexKind::from),
            reveal_filled: self.reveal.then_some(true),
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(&LogSettings::from_flags(cli.debug, cli.quiet));
    info!("Running prism v{}", env!("CARGO_PKG_VERSION"));

    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    settings.apply_overrides(&cli.overrides());

    match &cli.folder {
        Some(folder) if settings.recursive => {
            info!("Collecting PNG files recursively from: {}", folder.display())
        }
        Some(folder) => info!("Collecting PNG files from: {}", folder.display()),
        None if cli.recursive_without_folder() => {
            warn!("The --recursive flag is ignored when not using --folder.")
        }
        None => {}
    }

    let targets = resolve_targets(&cli.files, cli.folder.as_deref(), settings.recursive)
        .context("Failed to collect input files")?;

    if targets.is_empty() && targets.rejected.is_empty() {
        warn!("No PNG files found.");
        return Ok(ExitCode::SUCCESS);
    }

    info!("Processing {} PNG file(s)...", targets.paths.len());
    let summary = run_batch(targets, &settings);

    println!(
        "Processing complete. Repaired: {}  Unchanged: {}  Failed: {}  Pixels replaced: {}",
        summary.repaired(),
        summary.unchanged(),
        summary.failed(),
        summary.pixels_modified(),
    );

    if let Some(report) = &cli.report {
        summary
            .write_report(report)
            .with_context(|| format!("Failed to write report to {}", report.display()))?;
        info!("Report written to {}", report.display());
    }

    Ok(if summary.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
