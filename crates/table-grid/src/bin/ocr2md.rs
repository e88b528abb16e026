use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use table_grid::{TableUnderstanding, understand_json};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "ocr2md",
    version,
    about = "Render a saved OCR table payload as markdown, CSV or schema"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Rebuild the table grid and print one rendering of it.
    Render(RenderArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Markdown,
    Csv,
    Schema,
    Hierarchy,
}

#[derive(Debug, Args)]
struct RenderArgs {
    /// Input OCR JSON path.
    #[arg(short, long)]
    input: PathBuf,

    /// Rendering to print.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Markdown)]
    format: OutputFormat,

    /// Print grid warnings to stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn render(understood: &TableUnderstanding, format: OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Markdown => understood.markdown.clone(),
        OutputFormat::Csv => understood.csv.clone(),
        OutputFormat::Schema => serde_json::to_string_pretty(&understood.schema)?,
        OutputFormat::Hierarchy => serde_json::to_string_pretty(&understood.header_hierarchy)?,
    };
    Ok(rendered)
}

fn log_warnings(understood: &TableUnderstanding, verbose: bool) {
    if understood.warnings.is_empty() {
        return;
    }

    eprintln!("warning: {} issue(s) detected", understood.warnings.len());
    if verbose {
        for warning in &understood.warnings {
            eprintln!(
                "  - {:?} row={:?} col={:?}: {}",
                warning.code, warning.row, warning.col, warning.message
            );
        }
    }
}

fn run_render(args: &RenderArgs) -> Result<TableUnderstanding> {
    let payload = std::fs::read(&args.input)
        .with_context(|| format!("failed to read '{}'", args.input.display()))?;
    let understood = understand_json(&payload)
        .with_context(|| format!("failed to rebuild table from '{}'", args.input.display()))?;

    let rendered = render(&understood, args.format)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{rendered}")?;
    Ok(understood)
}

fn main() -> ExitCode {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("table_grid=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Render(args) => match run_render(&args) {
            Ok(understood) => {
                log_warnings(&understood, args.verbose);
                if understood.grid.is_empty() {
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
