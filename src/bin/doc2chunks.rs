use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use doc_chunker::{
    ChunkReport, DirStorage, DocumentChunker, LayoutDocument, PipelineConfig, RetryPolicy,
    Retrying, TableUnderstandingConfig,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "doc2chunks",
    version,
    about = "Split a layout-analysis result into retrieval chunks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Chunk one layout JSON document and write the chunk list.
    Chunk(ChunkArgs),
}

#[derive(Debug, Args)]
struct ChunkArgs {
    /// Layout JSON path (`content` plus optional `tables`).
    #[arg(short, long)]
    input: PathBuf,

    /// Output JSON path.
    #[arg(short, long)]
    output: PathBuf,

    /// Directory used as artifact storage; enables the HTML table dump.
    #[arg(long)]
    storage_dir: Option<PathBuf>,

    /// Source document name or URL. Defaults to the input file name
    /// without its trailing `.json`, e.g. `report.pdf.json` -> `report.pdf`.
    #[arg(long)]
    document_url: Option<String>,

    /// Token budget per chunk (overrides NUM_TOKENS).
    #[arg(long)]
    max_tokens: Option<usize>,

    /// Minimum chunk size (overrides MIN_CHUNK_SIZE).
    #[arg(long)]
    min_tokens: Option<usize>,

    /// Drop chunks below the minimum size.
    #[arg(long)]
    discard_small: bool,
}

fn default_document_url(input: &Path) -> Result<String> {
    let name = input
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("'{}' has no usable file name", input.display()))?;
    Ok(name.strip_suffix(".json").unwrap_or(name).to_string())
}

fn build_config(args: &ChunkArgs) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::from_env().context("failed to read configuration")?;
    if let Some(max_tokens) = args.max_tokens {
        if max_tokens == 0 {
            bail!("--max-tokens must be at least 1");
        }
        config.chunking.max_chunk_tokens = max_tokens;
    }
    if let Some(min_tokens) = args.min_tokens {
        config.chunking.min_chunk_tokens = min_tokens;
    }
    config.chunking.discard_below_min |= args.discard_small;
    config.tables = TableUnderstandingConfig::default();
    Ok(config)
}

fn run_chunk(args: &ChunkArgs) -> Result<ChunkReport> {
    let payload = std::fs::read(&args.input)
        .with_context(|| format!("failed to read '{}'", args.input.display()))?;
    let document: LayoutDocument = serde_json::from_slice(&payload)
        .with_context(|| format!("failed to parse layout JSON '{}'", args.input.display()))?;
    let document_url = match &args.document_url {
        Some(url) => url.clone(),
        None => default_document_url(&args.input)?,
    };

    let config = build_config(args)?;
    let storage = args
        .storage_dir
        .as_deref()
        .map(DirStorage::new)
        .transpose()
        .context("failed to open storage directory")?
        .map(|storage| Retrying::new(storage, RetryPolicy::default()));
    let mut chunker = DocumentChunker::new(config);
    if let Some(storage) = &storage {
        chunker = chunker.with_storage(storage);
    }

    let report = chunker
        .chunk_document(&document_url, &document)
        .with_context(|| format!("failed to chunk '{document_url}'"))?;

    let json = serde_json::to_string_pretty(&report.chunks)?;
    std::fs::write(&args.output, json)
        .with_context(|| format!("failed to write '{}'", args.output.display()))?;
    Ok(report)
}

fn main() -> ExitCode {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("doc_chunker=info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Chunk(args) => match run_chunk(&args) {
            Ok(report) => {
                for warning in &report.warnings {
                    eprintln!("warning: {:?}: {}", warning.code, warning.message);
                }
                if report.chunks.is_empty() {
                    ExitCode::from(2)
                } else {
                    ExitCode::SUCCESS
                }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::from(1)
            }
        },
    }
}
