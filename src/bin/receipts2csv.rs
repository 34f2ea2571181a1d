//! CLI binary for the receipt indexer.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `IndexConfig` and prints the result.

use anyhow::{Context, Result};
use clap::Parser;
use docbatch::{build_index, BatchProgressCallback, IndexConfig, ProgressCallback};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a progress bar plus one log line per receipt.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Start time of the receipt currently in flight.
    started: Mutex<Option<Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} receipts  \
             ⏱ {elapsed_precise}  ETA {eta_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Indexing");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            started: Mutex::new(None),
            errors: AtomicUsize::new(0),
        })
    }

    fn elapsed_secs(&self) -> f64 {
        self.started
            .lock()
            .ok()
            .and_then(|mut s| s.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.reset_eta();
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Found {total} PDF files. Processing…"))
        ));
    }

    fn on_item_start(&self, index: usize, total: usize, name: &str) {
        if let Ok(mut s) = self.started.lock() {
            *s = Some(Instant::now());
        }
        self.bar
            .set_message(format!("Processing ({index}/{total}): {name}"));
    }

    fn on_item_complete(&self, index: usize, total: usize, name: &str) {
        let secs = self.elapsed_secs();
        self.bar.println(format!(
            "  {} ({:>3}/{:<3})  {}  {}",
            green("✓"),
            index,
            total,
            name,
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_item_error(&self, index: usize, total: usize, name: &str, error: &str) {
        let secs = self.elapsed_secs();
        self.errors.fetch_add(1, Ordering::SeqCst);

        let msg: String = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} ({:>3}/{:<3})  {}  {}  {}",
            red("✗"),
            index,
            total,
            name,
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total: usize, success_count: usize) {
        let failed = total.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} receipts parsed",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} receipts parsed  ({} written as N/A)",
                if failed == total { red("✘") } else { cyan("⚠") },
                bold(&success_count.to_string()),
                total,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Index a folder of receipts
  receipts2csv ./receipts index.csv

  # Use a different model
  receipts2csv --model gpt-4o ./receipts index.csv

  # Anthropic instead of OpenAI
  receipts2csv --provider anthropic --model claude-3-5-haiku-latest ./receipts index.csv

OUTPUT:
  A CSV file with the header
    File Name,Total Amount,Currency,Transaction Date,Descriptive Details
  and one row per PDF. Fields that could not be read are written as N/A.
  An existing destination file is overwritten.

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key (default provider; also read from ./.env)
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  MISTRAL_API_KEY         Mistral API key
  EDGEQUAKE_PROVIDER      Override provider (openai, anthropic, gemini, mistral, ollama)
  EDGEQUAKE_MODEL         Override model ID
  RUST_LOG                Override the log filter (e.g. docbatch=debug)
"#;

/// Build a CSV index of PDF receipts using an LLM.
#[derive(Parser, Debug)]
#[command(
    name = "receipts2csv",
    version,
    about = "Build a CSV index of PDF receipts using an LLM",
    long_about = "Extract the text of every PDF receipt in a directory, ask an LLM for the total \
amount, currency, transaction date and a short description, and write one CSV row per receipt.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory containing the PDF receipts (not searched recursively).
    source_directory: PathBuf,

    /// CSV file to create or overwrite.
    destination_file: PathBuf,

    /// LLM model ID (e.g. gpt-4o-mini, gpt-4o, claude-3-5-haiku-latest).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, mistral, ollama.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "RECEIPTS2CSV_TEMPERATURE", default_value_t = 0.2)]
    temperature: f32,

    /// Maximum tokens in the model's reply.
    #[arg(long, env = "RECEIPTS2CSV_MAX_TOKENS", default_value_t = 150)]
    max_tokens: usize,

    /// Per-receipt LLM call timeout in seconds.
    #[arg(long, env = "RECEIPTS2CSV_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Disable progress bar.
    #[arg(long, env = "RECEIPTS2CSV_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "RECEIPTS2CSV_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "RECEIPTS2CSV_QUIET")]
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

#[tokio::main]
async fn main() -> Result<()> {
    let cli = parse_cli();

    // ── Logging setup ────────────────────────────────────────────────────
    // INFO-level library logs are suppressed while the progress bar is
    // active; the bar prints the per-receipt lines instead.
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

    // ── Credentials ──────────────────────────────────────────────────────
    // A `.env` in the working directory may hold the API key; variables
    // already set in the environment win.
    dotenvy::dotenv().ok();

    // ── Build config ─────────────────────────────────────────────────────
    let config = build_config(&cli)?;

    // ── Run ──────────────────────────────────────────────────────────────
    let stats = build_index(&cli.source_directory, &cli.destination_file, &config)
        .await
        .context("Receipt indexing failed")?;

    if !cli.quiet {
        println!(
            "Index file '{}' has been created successfully.",
            stats.output_path.display()
        );
    }

    Ok(())
}

fn build_config(cli: &Cli) -> Result<IndexConfig> {
    let mut builder = IndexConfig::builder()
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .api_timeout_secs(cli.api_timeout);

    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if !cli.quiet && !cli.no_progress {
        let cb: ProgressCallback = CliProgressCallback::new();
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
