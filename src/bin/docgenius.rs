//! CLI binary for docgenius-client.
//!
//! A thin shim over the library crate that maps CLI flags onto controller
//! events, submits once, and prints the rendered view.

use anyhow::{Context, Result};
use clap::Parser;
use docgenius_client::{
    document, ClientConfig, Controller, FileSource, HttpTransport, OperationKind, RenderSink,
    ResultView, SubOperation, TriggerState, UiEvent,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
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

// ── CLI sink using indicatif ─────────────────────────────────────────────────

/// Terminal sink: a spinner while the request is in flight, red notices for
/// input problems. Results are printed by `main` so `--json` can take over.
struct CliSink {
    bar: Mutex<Option<ProgressBar>>,
    label: String,
    show_progress: bool,
}

impl CliSink {
    fn new(label: String, show_progress: bool) -> Arc<Self> {
        Arc::new(Self {
            bar: Mutex::new(None),
            label,
            show_progress,
        })
    }
}

impl RenderSink for CliSink {
    fn set_trigger(&self, state: TriggerState) {
        let mut slot = self.bar.lock().unwrap();
        match state {
            TriggerState::Processing if self.show_progress => {
                let bar = ProgressBar::new_spinner();
                bar.set_style(
                    ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner())
                        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
                );
                bar.set_prefix("Processing");
                bar.set_message(self.label.clone());
                bar.enable_steady_tick(Duration::from_millis(80));
                *slot = Some(bar);
            }
            TriggerState::Processing => {}
            TriggerState::Ready => {
                if let Some(bar) = slot.take() {
                    bar.finish_and_clear();
                }
            }
        }
    }

    fn notify(&self, message: &str) {
        eprintln!("{} {}", red("✘"), message);
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Summarise a document
  docgenius summarize report.txt

  # Translate into French
  docgenius translate report.txt --target-language fr

  # Convert to docx, saving into ./out
  docgenius convert notes.md --output-format docx --output-dir out

  # Batch: summarise and analyse several files, JSON report
  docgenius batch a.txt b.txt --ops summarize,analyze

  # Batch with translation, zipped results
  docgenius batch *.md --ops translate,convert --target-language de --output-format html --zip

  # Service information
  docgenius --health
  docgenius --list-formats
  docgenius --list-languages

ENVIRONMENT VARIABLES:
  DOCGENIUS_SERVER        Service base URL (default http://127.0.0.1:8000)
  DOCGENIUS_TIMEOUT       Request timeout in seconds (default: none)
  RUST_LOG                Override log filter (e.g. docgenius_client=debug)
"#;

/// Submit documents to a document-processing service.
#[derive(Parser, Debug)]
#[command(
    name = "docgenius",
    version,
    about = "Summarize, translate, analyze and convert documents via a processing service",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Operation: summarize, translate, analyze, convert, batch.
    #[arg(required_unless_present_any = ["health", "list_formats", "list_languages"])]
    operation: Option<OperationKind>,

    /// Documents to submit. Only batch uses more than the first.
    files: Vec<PathBuf>,

    /// Service base URL.
    #[arg(long, env = "DOCGENIUS_SERVER", default_value = docgenius_client::config::DEFAULT_BASE_URL)]
    server: String,

    /// Request timeout in seconds (none by default).
    #[arg(long, env = "DOCGENIUS_TIMEOUT")]
    timeout: Option<u64>,

    /// Target language for translate (and batch with translate).
    #[arg(short = 't', long, env = "DOCGENIUS_TARGET_LANGUAGE", default_value = docgenius_client::config::DEFAULT_TARGET_LANGUAGE)]
    target_language: String,

    /// Output format for convert (and batch with convert).
    #[arg(short = 'f', long, env = "DOCGENIUS_OUTPUT_FORMAT", default_value = docgenius_client::config::DEFAULT_OUTPUT_FORMAT)]
    output_format: String,

    /// Batch steps: comma-separated subset of summarize,translate,analyze,convert.
    #[arg(long, default_value = "summarize")]
    ops: String,

    /// Ask the batch endpoint for a zip archive instead of a JSON report.
    #[arg(long)]
    zip: bool,

    /// Directory where downloaded artifacts are saved.
    #[arg(short, long, env = "DOCGENIUS_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Print the rendered view as JSON.
    #[arg(long)]
    json: bool,

    /// Disable the spinner.
    #[arg(long, env = "DOCGENIUS_NO_PROGRESS")]
    no_progress: bool,

    /// Check service health and exit.
    #[arg(long)]
    health: bool,

    /// List output formats the service supports and exit.
    #[arg(long)]
    list_formats: bool,

    /// List languages the service supports and exit.
    #[arg(long)]
    list_languages: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCGENIUS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except the result and errors.
    #[arg(short, long, env = "DOCGENIUS_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
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

    let config = build_config(&cli)?;
    let transport = Arc::new(HttpTransport::new(&config).context("Failed to set up HTTP client")?);

    // ── Service info mode ────────────────────────────────────────────────
    if cli.health || cli.list_formats || cli.list_languages {
        return service_info(&cli, &transport).await;
    }

    let Some(operation) = cli.operation else {
        anyhow::bail!("An operation is required");
    };

    let files = document::load_all(&cli.files)
        .await
        .context("Failed to read input documents")?;

    let sink = CliSink::new(
        format!("{} · {} file(s)", operation, files.len()),
        show_progress,
    );
    let controller = Controller::new(&config, transport, sink);

    controller.dispatch(UiEvent::OperationChanged(operation));
    controller.dispatch(UiEvent::TargetLanguageChanged(cli.target_language.clone()));
    controller.dispatch(UiEvent::OutputFormatChanged(cli.output_format.clone()));
    if operation == OperationKind::Batch {
        let steps = docgenius_client::BatchSelection::parse_csv(&cli.ops)
            .map_err(anyhow::Error::msg)
            .context("Invalid --ops")?;
        for sub in SubOperation::ALL {
            controller.dispatch(UiEvent::BatchStepToggled(sub, steps.contains(sub)));
        }
        controller.dispatch(UiEvent::ZipOutputToggled(cli.zip));
    }
    controller.dispatch(UiEvent::FilesSelected {
        source: FileSource::Picker,
        files,
    });

    // Validation problems were already printed by the sink.
    let view = match controller.submit().await {
        Ok(view) => view,
        Err(_) => std::process::exit(2),
    };

    print_view(&cli, &view).await?;

    if view.is_error() {
        std::process::exit(1);
    }
    Ok(())
}

/// Map CLI args to `ClientConfig`.
fn build_config(cli: &Cli) -> Result<ClientConfig> {
    let mut builder = ClientConfig::builder()
        .base_url(cli.server.clone())
        .default_target_language(cli.target_language.clone())
        .default_output_format(cli.output_format.clone());
    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }
    builder.build().context("Invalid configuration")
}

async fn print_view(cli: &Cli, view: &ResultView) -> Result<()> {
    let saved = match view.artifact() {
        Some(artifact) => {
            tokio::fs::create_dir_all(&cli.output_dir)
                .await
                .with_context(|| format!("Failed to create {}", cli.output_dir.display()))?;
            Some(
                artifact
                    .save_to_dir(&cli.output_dir)
                    .await
                    .context("Failed to save artifact")?,
            )
        }
        None => None,
    };

    if cli.json {
        let json = json_output(view, saved.as_deref())?;
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    let mark = if view.is_error() { red("✘") } else { green("✔") };
    let body = view.to_plain_text();
    let mut lines = body.lines();
    if let Some(title) = lines.next() {
        println!("{} {}", mark, bold(title));
    }
    for line in lines {
        if line.starts_with("request_id: ") {
            println!("{}", dim(line));
        } else {
            println!("{line}");
        }
    }
    if let Some(path) = saved {
        if !cli.quiet {
            eprintln!("   saved → {}", bold(&path.display().to_string()));
        }
    }
    Ok(())
}

/// The rendered view as JSON, plus `saved_to` when an artifact was written.
fn json_output(view: &ResultView, saved: Option<&Path>) -> Result<serde_json::Value> {
    let mut json = serde_json::to_value(view).context("Failed to serialise view")?;
    if let (Some(path), Some(obj)) = (saved, json.as_object_mut()) {
        obj.insert(
            "saved_to".to_string(),
            serde_json::Value::String(path.display().to_string()),
        );
    }
    Ok(json)
}

async fn service_info(cli: &Cli, transport: &HttpTransport) -> Result<()> {
    if cli.health {
        let health = transport.health().await.context("Health check failed")?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&health)?);
        } else {
            println!(
                "{} {}  {}",
                green("✔"),
                health.status,
                dim(health.version.as_deref().unwrap_or("unknown version"))
            );
        }
    }
    if cli.list_formats {
        let formats = transport
            .supported_formats()
            .await
            .context("Failed to list formats")?;
        print_list(cli.json, "Formats", &formats)?;
    }
    if cli.list_languages {
        let languages = transport
            .supported_languages()
            .await
            .context("Failed to list languages")?;
        print_list(cli.json, "Languages", &languages)?;
    }
    Ok(())
}

fn print_list(json: bool, title: &str, items: &[String]) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
    } else {
        println!("{}", bold(&format!("{title}:")));
        for item in items {
            println!("  {item}");
        }
    }
    Ok(())
}
