use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use prosemark::{MarkdownService, Options};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Convert ProseMirror JSON documents to Markdown
#[derive(Parser, Debug)]
#[command(name = "prosemark")]
#[command(version)]
struct Args {
    /// Document JSON file; reads stdin when absent or "-"
    input: Option<PathBuf>,

    /// JSON file with rendering options
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum document nesting depth
    #[arg(long)]
    max_depth: Option<usize>,

    /// Fail instead of printing a plain JSON string payload verbatim
    #[arg(long)]
    no_plain_fallback: bool,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Enable JSON logging
    #[arg(long)]
    json_logs: bool,
}

fn setup_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    setup_logging(&args.log_level, args.json_logs);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let options = load_options(args.config.as_deref(), args.max_depth)?;
    let service = MarkdownService::with_options(options);

    let payload = read_input(args.input.as_deref())?;
    let mut markdown = markdown_from_payload(&service, &payload, !args.no_plain_fallback)?;
    if !markdown.ends_with('\n') {
        markdown.push('\n');
    }

    io::stdout()
        .lock()
        .write_all(markdown.as_bytes())
        .context("Failed to write Markdown to stdout")?;
    Ok(())
}

fn load_options(config: Option<&Path>, max_depth: Option<usize>) -> Result<Options> {
    let mut options = match config {
        Some(path) => {
            let raw = fs::read(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_slice(&raw)
                .with_context(|| format!("Invalid config file {}", path.display()))?
        }
        None => Options::default(),
    };

    if let Some(depth) = max_depth {
        options.max_depth = depth;
    }

    debug!(?options, "rendering options");
    Ok(options)
}

fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) if path != Path::new("-") => {
            fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
        }
        _ => {
            let mut buf = Vec::new();
            io::stdin()
                .lock()
                .read_to_end(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

/// Render a payload, falling back to a plain JSON string when it is not a
/// document tree.
///
/// Only decode failures trigger the fallback; any other conversion error is
/// reported as is.
fn markdown_from_payload(
    service: &MarkdownService,
    payload: &[u8],
    allow_plain: bool,
) -> Result<String> {
    match service.convert(payload) {
        Ok(markdown) => Ok(markdown),
        Err(err) if allow_plain && err.is_decode() => match serde_json::from_slice::<String>(payload) {
            Ok(plain) => {
                info!("payload is a plain string, printing it verbatim");
                Ok(plain)
            }
            Err(_) => Err(err).context("Failed to convert document to Markdown"),
        },
        Err(err) => Err(err).context("Failed to convert document to Markdown"),
    }
}
