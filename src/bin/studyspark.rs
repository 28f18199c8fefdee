//! CLI binary for studyspark.
//!
//! A thin shim over the library crate that maps CLI flags to `NotesConfig`
//! and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use studyspark::{
    generate, generate_to_file, CancelToken, DocumentSink, GraphvizLayout, JsonSink,
    LlamaServerModel, MarkdownSink, MethodKind, NoteProgressCallback, NotesConfig, PipelineStage,
    ProgressCallback,
};
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

/// Terminal progress callback: renders a live progress bar over chunks and
/// per-chunk log lines using [indicatif].
struct CliProgressCallback {
    /// The single progress bar anchored at the bottom of the terminal.
    bar: ProgressBar,
    /// Count of chunks that errored out (at most 1 — the run aborts).
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Create a callback whose progress-bar length is set dynamically by the
    /// first `on_chunk_start` (the chunk count is only known after chunking).
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        // Initial style: spinner only (no counter until we know the total).
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }

    /// Switch to the full progress-bar style once we know `total`.
    fn activate_bar(&self, total: usize) {
        if self.bar.length().unwrap_or(0) == total as u64 {
            return;
        }
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} chunks  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Generating");
        self.bar.reset_eta();
    }
}

impl NoteProgressCallback for CliProgressCallback {
    fn on_stage(&self, stage: PipelineStage) {
        self.bar.set_message(stage.to_string());
    }

    fn on_chunk_start(&self, chunk: usize, total: usize) {
        self.activate_bar(total);
        self.bar.set_message(format!("chunk {chunk}"));
    }

    fn on_chunk_complete(&self, chunk: usize, total: usize, output_chars: usize) {
        self.bar.println(format!(
            "  {} Chunk {:>3}/{:<3}  {}",
            green("✓"),
            chunk,
            total,
            dim(&format!("{output_chars:>5} chars")),
        ));
        self.bar.inc(1);
    }

    fn on_chunk_error(&self, chunk: usize, total: usize, error: String) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg = if error.len() > 80 {
            format!("{}\u{2026}", &error[..79])
        } else {
            error
        };

        self.bar.println(format!(
            "  {} Chunk {:>3}/{:<3}  {}",
            red("✗"),
            chunk,
            total,
            red(&msg),
        ));
        self.bar.inc(1);
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Cornell notes to stdout
  studyspark lecture.txt --method cornell

  # Outline notes to a file
  studyspark lecture.txt --method outline -o notes.md

  # Mind maps (requires Graphviz and an output path for the images)
  studyspark lecture.txt --method mapping -o notes.md

  # Read from stdin, JSON output
  cat lecture.txt | studyspark - --method charting --format json -o notes.json

  # Custom model server and chunk size
  studyspark lecture.txt --method boxing --server-url http://localhost:9090 --chunk-chars 2000

NOTE-TAKING METHODS:
  outline    Hierarchical plain-text outline
  cornell    Two-column cue/note table with summary rows
  boxing     One-column table of labelled boxes
  charting   Three-column topic/definition/example table
  mapping    Mind-map diagrams rendered via Graphviz

SETUP:
  1. Start a llama.cpp server:  llama-server -m model.gguf --port 8080
  2. (Mapping only) install Graphviz so `dot` is on PATH
  3. Generate:                  studyspark lecture.txt --method cornell -o notes.md
"#;

/// Generate structured study notes from text using a local LLM.
#[derive(Parser, Debug)]
#[command(
    name = "studyspark",
    version,
    about = "Generate structured study notes from text using a local LLM",
    long_about = "Turn long-form study text into structured notes using a locally-hosted \
language model (llama.cpp server). Supports five note-taking methods: Outline, Cornell, \
Boxing, Charting, and Mapping (Graphviz mind maps).",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input text file, or '-' to read from stdin.
    input: String,

    /// Note-taking method: outline, cornell, boxing, charting, mapping.
    #[arg(short, long, env = "STUDYSPARK_METHOD")]
    method: String,

    /// Write notes to this file instead of stdout.
    #[arg(short, long, env = "STUDYSPARK_OUTPUT")]
    output: Option<PathBuf>,

    /// Output format: md or json.
    #[arg(long, env = "STUDYSPARK_FORMAT", value_enum, default_value = "md")]
    format: FormatArg,

    /// Maximum chunk length in characters.
    #[arg(long, env = "STUDYSPARK_CHUNK_CHARS", default_value_t = 3600)]
    chunk_chars: usize,

    /// Base URL of the llama.cpp server.
    #[arg(
        long,
        env = "STUDYSPARK_SERVER_URL",
        default_value = "http://localhost:8080"
    )]
    server_url: String,

    /// Path to the Graphviz `dot` binary (mapping method only).
    #[arg(long, env = "STUDYSPARK_DOT")]
    dot: Option<PathBuf>,

    /// Retries per chunk on model failure.
    #[arg(long, env = "STUDYSPARK_MAX_RETRIES", default_value_t = 2)]
    max_retries: u32,

    /// Disable progress bar.
    #[arg(long, env = "STUDYSPARK_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "STUDYSPARK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "STUDYSPARK_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum FormatArg {
    Md,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
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

    let method: MethodKind = cli
        .method
        .parse()
        .map_err(|e: studyspark::NotesError| anyhow::anyhow!(e))?;

    // Mapping writes sibling PNG files, so it needs a real output path.
    if method == MethodKind::Mapping && cli.output.is_none() {
        anyhow::bail!("the mapping method writes image files; use -o/--output");
    }

    // ── Read input ───────────────────────────────────────────────────────
    let text = if cli.input == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read from stdin")?;
        buf
    } else {
        tokio::fs::read_to_string(&cli.input)
            .await
            .with_context(|| format!("Failed to read input file '{}'", cli.input))?
    };
    if text.trim().is_empty() {
        anyhow::bail!("input is empty");
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn NoteProgressCallback>)
    } else {
        None
    };

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        ctrlc_handler(move || cancel.cancel());
    }

    let mut builder = NotesConfig::builder()
        .model(Arc::new(LlamaServerModel::new(&cli.server_url)))
        .chunk_chars(cli.chunk_chars)
        .max_retries(cli.max_retries)
        .cancel_token(cancel);

    if let Some(dot) = &cli.dot {
        builder = builder.graph(Arc::new(GraphvizLayout::with_binary(dot)));
    }
    if let Some(cb) = progress_cb {
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run generation ───────────────────────────────────────────────────
    if let Some(output_path) = &cli.output {
        let sink: Box<dyn DocumentSink> = match cli.format {
            FormatArg::Md => Box::new(MarkdownSink),
            FormatArg::Json => Box::new(JsonSink),
        };
        let stats = generate_to_file(&text, method, output_path, sink.as_ref(), &config)
            .await
            .context("Note generation failed")?;

        if !cli.quiet {
            eprintln!(
                "{}  {} chunks  {}ms  →  {}",
                green("✔"),
                stats.chunks,
                stats.total_duration_ms,
                bold(&output_path.display().to_string()),
            );
            eprintln!(
                "   {} chars of model output",
                dim(&stats.output_chars.to_string()),
            );
        }
    } else {
        let output = generate(&text, method, &config)
            .await
            .context("Note generation failed")?;

        let rendered = match cli.format {
            FormatArg::Md => MarkdownSink::render_to_string(&output.document),
            FormatArg::Json => serde_json::to_string_pretty(&output.document)
                .context("Failed to serialise document")?,
        };
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(rendered.as_bytes())
            .context("Failed to write to stdout")?;
        if !rendered.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }

        if !cli.quiet {
            eprintln!(
                "{}  {} — {} chunks in {}ms",
                cyan("◆"),
                bold(method.label()),
                output.stats.chunks,
                output.stats.total_duration_ms,
            );
        }
    }

    Ok(())
}

/// Trigger `f` on SIGINT so a long run can be cancelled between chunks.
fn ctrlc_handler<F: Fn() + Send + 'static>(f: F) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n{} cancelling after the current chunk…", cyan("⚠"));
            f();
        }
    });
}
