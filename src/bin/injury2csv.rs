use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use chrono::{Local, NaiveDateTime, Utc};
use clap::{Args, Parser, Subcommand};
use nba_injury_report::config::{ReportConfig, add_date_to_file_name};
use nba_injury_report::report_source::{
    csv_file_name, download_report, fetch_report_bytes, latest_report_time, report_url,
};
use nba_injury_report::{
    GridScope, OutputFormat, PageSelection, ParseOptions, QualityMode, Reconstruction,
    parse_report_pdf, parse_report_pdf_bytes, render_records, write_records,
};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

#[derive(Debug, Parser)]
#[command(
    name = "injury2csv",
    version,
    about = "Rebuild the NBA injury report table from its PDF"
)]
struct Cli {
    /// Log level for this tool (overrides RUST_LOG), e.g. debug or info.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also log to this file; today's date is inserted before the extension.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Parse a local injury report PDF.
    Parse(ParseArgs),
    /// Download a published injury report and parse it.
    Fetch(FetchArgs),
}

#[derive(Debug, Args)]
struct OutputArgs {
    /// Output delimiter character.
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Fail on the first malformed row or page instead of skipping it.
    #[arg(long)]
    strict: bool,

    /// Derive column positions per page or once for the whole document.
    #[arg(long, default_value = "document")]
    grid: String,

    /// Enable verbose warning output.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Input PDF path.
    #[arg(short, long)]
    input: PathBuf,

    /// Output path; records go to stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Page selection like 1-3,5.
    #[arg(long)]
    pages: Option<String>,

    /// Output format: csv or json.
    #[arg(long, default_value = "csv")]
    format: String,

    #[command(flatten)]
    common: OutputArgs,
}

#[derive(Debug, Args)]
struct FetchArgs {
    /// Eastern report time like "2024-03-10 19:00"; defaults to the latest report.
    #[arg(long)]
    at: Option<String>,

    /// TOML file with [dirs] and [paths] sections.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep the downloaded PDF next to the CSV export.
    #[arg(long)]
    save_pdf: bool,

    /// Output CSV path; defaults to the configured report directory.
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    common: OutputArgs,
}

fn init_logging(log_level: Option<&str>, log_file: Option<&Path>) -> Result<()> {
    let filter = || match log_level {
        Some(level) => EnvFilter::try_new(format!("nba_injury_report={level},injury2csv={level}"))
            .with_context(|| format!("invalid --log-level '{level}'")),
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("nba_injury_report=warn,injury2csv=warn"))),
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_filter(filter()?);

    let file_layer = match log_file {
        Some(path) => {
            let file_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| anyhow!("invalid --log-file '{}'", path.display()))?;
            let dated = path.with_file_name(add_date_to_file_name(file_name, Local::now().date_naive()));
            let file = File::options()
                .create(true)
                .append(true)
                .open(&dated)
                .with_context(|| format!("failed to open log file '{}'", dated.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_filter(filter()?),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("failed to install logger")
}

fn parse_options(common: &OutputArgs, pages: Option<&str>) -> Result<ParseOptions> {
    let pages = pages
        .map(PageSelection::parse)
        .transpose()
        .context("failed to parse --pages")?;

    if !common.delimiter.is_ascii() {
        anyhow::bail!("delimiter must be a single ASCII character");
    }

    let grid_scope = GridScope::from_str(&common.grid)
        .map_err(|error| anyhow!(error))
        .context("failed to parse --grid")?;

    Ok(ParseOptions {
        pages,
        delimiter: common.delimiter as u8,
        quality_mode: if common.strict {
            QualityMode::Strict
        } else {
            QualityMode::BestEffort
        },
        grid_scope,
    })
}

fn log_report(report: &Reconstruction, verbose: bool) {
    if report.warnings.is_empty() {
        return;
    }

    eprintln!(
        "warning: {} issue(s) detected, {} row(s) dropped",
        report.warnings.len(),
        report.dropped_rows
    );
    if verbose {
        for warning in &report.warnings {
            eprintln!(
                "  - {:?} page={:?} row={:?}: {}",
                warning.code, warning.page, warning.row, warning.message
            );
        }
    }
}

fn emit(
    reconstruction: &Reconstruction,
    output: Option<&Path>,
    format: OutputFormat,
    delimiter: u8,
) -> Result<()> {
    match output {
        Some(path) => {
            write_records(path, &reconstruction.records, format, delimiter)
                .with_context(|| format!("failed to write '{}'", path.display()))?;
            info!(path = %path.display(), records = reconstruction.records.len(), "wrote records");
        }
        None => print!(
            "{}",
            render_records(&reconstruction.records, format, delimiter)?
        ),
    }
    Ok(())
}

fn run_parse(args: &ParseArgs) -> Result<Reconstruction> {
    let options = parse_options(&args.common, args.pages.as_deref())?;
    let format = OutputFormat::from_str(&args.format)
        .map_err(|error| anyhow!(error))
        .context("failed to parse --format")?;

    let reconstruction = parse_report_pdf(&args.input, &options)
        .with_context(|| format!("failed to parse injury report '{}'", args.input.display()))?;
    emit(&reconstruction, args.output.as_deref(), format, options.delimiter)?;
    Ok(reconstruction)
}

fn report_time(at: Option<&str>) -> Result<NaiveDateTime> {
    match at {
        Some(value) => NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M")
            .with_context(|| format!("invalid --at '{value}', expected YYYY-MM-DD HH:MM")),
        None => latest_report_time(Utc::now()).context("failed to resolve latest report time"),
    }
}

fn run_fetch(args: &FetchArgs) -> Result<Reconstruction> {
    let options = parse_options(&args.common, None)?;
    let report_time = report_time(args.at.as_deref())?;
    let config = args
        .config
        .as_deref()
        .map(ReportConfig::load)
        .transpose()
        .context("failed to load config")?;

    let reconstruction = if args.save_pdf {
        let dir = config
            .as_ref()
            .map_or_else(|| PathBuf::from("."), |config| config.injury_report_dir.clone());
        let pdf = download_report(&dir, &report_time).context("failed to download report")?;
        parse_report_pdf(&pdf, &options)
    } else {
        let url = report_url(&report_time);
        let bytes = fetch_report_bytes(&url).with_context(|| format!("failed to fetch '{url}'"))?;
        parse_report_pdf_bytes(&bytes, &options)
    }
    .context("failed to parse injury report")?;

    let output = args.output.clone().or_else(|| {
        config
            .as_ref()
            .map(|config| config.injury_report_dir.join(csv_file_name(&report_time)))
    });
    if let Some(parent) = output.as_deref().and_then(Path::parent)
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create '{}'", parent.display()))?;
    }
    emit(&reconstruction, output.as_deref(), OutputFormat::Csv, options.delimiter)?;

    if let Some(latest) = config.as_ref().and_then(|config| config.latest_report_path.as_deref()) {
        write_records(latest, &reconstruction.records, OutputFormat::Csv, options.delimiter)
            .with_context(|| format!("failed to write '{}'", latest.display()))?;
    }

    Ok(reconstruction)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(error) = init_logging(cli.log_level.as_deref(), cli.log_file.as_deref()) {
        eprintln!("error: {error:#}");
        return ExitCode::from(1);
    }

    let (result, verbose) = match &cli.command {
        Commands::Parse(args) => (run_parse(args), args.common.verbose),
        Commands::Fetch(args) => (run_fetch(args), args.common.verbose),
    };

    match result {
        Ok(report) => {
            log_report(&report, verbose);
            if report.records.is_empty() {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(1)
        }
    }
}
