//! CLI binary for the email archive converter.
//!
//! Maps CLI flags to `ArchiveConfig`, runs the conversion and prints a
//! one-line summary.

use anyhow::{Context, Result};
use clap::Parser;
use docbatch::{convert_archive, ArchiveConfig, BatchProgressCallback, ProgressCallback};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Progress bar showing `Progress: x/y`; failed messages get their own line.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> std::sync::Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold} {pos}/{len}  [{bar:42.green/238}]  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
        bar.set_style(style);
        bar.set_prefix("Progress:");
        bar.enable_steady_tick(Duration::from_millis(80));
        std::sync::Arc::new(Self { bar })
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn on_item_start(&self, _index: usize, _total: usize, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn on_item_complete(&self, _index: usize, _total: usize, _name: &str) {
        self.bar.inc(1);
    }

    fn on_item_error(&self, _index: usize, _total: usize, name: &str, error: &str) {
        self.bar
            .println(format!("  {} Error processing {}: {}", red("✗"), name, error));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, _total: usize, _success_count: usize) {
        self.bar.finish_and_clear();
    }
}

/// Convert a directory of .eml files to PDFs with a date-sorted index.
#[derive(Parser, Debug)]
#[command(
    name = "eml2pdf",
    version,
    about = "Convert a directory of .eml files to PDFs with a date-sorted index",
    color = clap::ColorChoice::Auto
)]
struct Cli {
    /// Directory containing the .eml files (not searched recursively).
    input_directory: PathBuf,

    /// Directory for the generated PDFs; created if missing.
    output_directory: PathBuf,

    /// TrueType font to embed instead of built-in Helvetica (keeps accents
    /// and non-Latin text).
    #[arg(long, env = "EML2PDF_FONT")]
    font: Option<PathBuf>,

    /// Disable progress bar.
    #[arg(long, env = "EML2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "EML2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "EML2PDF_QUIET")]
    quiet: bool,
}

/// Parse arguments; usage errors exit with status 1, help and version with 0.
fn parse_cli() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => e.exit(),
            _ => {
                let _ = e.print();
                std::process::exit(1);
            }
        },
    }
}

fn main() -> Result<()> {
    let cli = parse_cli();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let mut builder = ArchiveConfig::builder();
    if let Some(ref font) = cli.font {
        builder = builder.font_path(font);
    }
    if show_progress {
        let cb: ProgressCallback = CliProgressCallback::new();
        builder = builder.progress_callback(cb);
    }
    let config = builder.build();

    // ── Run ──────────────────────────────────────────────────────────────
    let stats = convert_archive(&cli.input_directory, &cli.output_directory, &config)
        .context("Email archive conversion failed")?;

    if !cli.quiet {
        let summary = format!(
            "Successfully converted {} out of {} files",
            stats.converted, stats.total_messages
        );
        if stats.failed == 0 {
            println!("{} {}", green("✔"), bold(&summary));
        } else {
            println!("{} {}", red("⚠"), bold(&summary));
        }
        if let Some(ref index) = stats.index_path {
            println!("Created index at {}", index.display());
        }
    }

    Ok(())
}
