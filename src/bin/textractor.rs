use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use textractor::{Error, ExtractOptions, Extractor, FormatTag, TextFallback};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(name = "textractor")]
#[command(about = "Extract plain text from PDF, Office, OpenDocument, EPUB, RTF and text files")]
#[command(version)]
struct Cli {
    /// Files to extract
    #[arg(value_name = "PATH", required = true)]
    paths: Vec<PathBuf>,

    /// Print one JSON object per file
    #[arg(long)]
    json: bool,

    /// Print the detected format instead of the text
    #[arg(long)]
    detect: bool,

    /// Treat invalid UTF-8 in text files as an error
    #[arg(long)]
    strict: bool,

    /// Largest accepted input in bytes
    #[arg(long, value_name = "BYTES")]
    max_size: Option<usize>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Outcome of one file, as printed by `--json`.
#[derive(Debug, Serialize)]
struct ExtractionResult {
    name: String,
    format: String,
    mime_type: String,
    success: bool,
    text: String,
    error: Option<String>,
    extraction_time_ms: u64,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }

    let mut options = ExtractOptions::new();
    if cli.strict {
        options = options.with_text_fallback(TextFallback::Reject);
    }
    if let Some(bytes) = cli.max_size {
        options = options.with_max_input_size(bytes);
    }
    let extractor = Extractor::new(options);

    let results: Vec<ExtractionResult> = cli
        .paths
        .par_iter()
        .map(|path| process(&extractor, path, cli.detect))
        .collect();

    match report(&cli, &results) {
        Ok(()) if results.iter().all(|r| r.success) => ExitCode::SUCCESS,
        Ok(()) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        },
    }
}

fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))
}

fn process(extractor: &Extractor, path: &Path, detect_only: bool) -> ExtractionResult {
    let started = Instant::now();
    let name = path.display().to_string();

    let outcome = read_input(path, extractor.options().max_input_size).map(|data| {
        let format = extractor.detect(&data).unwrap_or_else(|_| textractor::sniff(&data));
        let text = if detect_only {
            Ok(String::new())
        } else {
            extractor.extract(&data)
        };
        (format, text)
    });

    let elapsed = started.elapsed().as_millis() as u64;
    debug!(file = %name, elapsed_ms = elapsed, "processed");

    match outcome {
        Ok((format, Ok(text))) => ExtractionResult {
            name,
            format: format.name().to_string(),
            mime_type: format.mime_type().to_string(),
            success: true,
            text,
            error: None,
            extraction_time_ms: elapsed,
        },
        Ok((format, Err(e))) => ExtractionResult {
            name,
            format: format.name().to_string(),
            mime_type: format.mime_type().to_string(),
            success: false,
            text: String::new(),
            error: Some(describe(&e)),
            extraction_time_ms: elapsed,
        },
        Err(e) => ExtractionResult {
            name,
            format: FormatTag::Unknown.name().to_string(),
            mime_type: FormatTag::Unknown.mime_type().to_string(),
            success: false,
            text: String::new(),
            error: Some(format!("{:#}", e)),
            extraction_time_ms: elapsed,
        },
    }
}

/// Read `path`, refusing files larger than `limit` before loading them.
fn read_input(path: &Path, limit: usize) -> Result<Vec<u8>> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    if metadata.len() > limit as u64 {
        return Err(Error::limit("input size", limit).into());
    }
    std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn describe(error: &Error) -> String {
    if error.is_unsupported() {
        "Unsupported file type".to_string()
    } else {
        error.to_string()
    }
}

fn report(cli: &Cli, results: &[ExtractionResult]) -> Result<()> {
    let mut printed = false;
    for result in results {
        if let Some(error) = &result.error {
            eprintln!("{}: {}", result.name, error);
        }

        if cli.json {
            let line = serde_json::to_string(result).context("Failed to serialize result")?;
            println!("{}", line);
        } else if cli.detect {
            if result.success {
                println!("{}: {} ({})", result.name, result.format, result.mime_type);
            }
        } else if result.success {
            if printed {
                println!();
            }
            println!("{}", result.text);
            printed = true;
        }
    }
    Ok(())
}
