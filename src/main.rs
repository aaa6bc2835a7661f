use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use sheetchart::profile::profile_sheet;
use sheetchart::retry::{parse_sheet, FileSource, InputFormat, RetryingSource, SheetSource};
use sheetchart::runtime::generate_chart;
use sheetchart::validate::validate_chart_spec;
use sheetchart::{ChartError, ChartSpecInput, Settings, Sheet};

#[derive(Parser, Debug)]
#[command(name = "sheetchart")]
#[command(
    about = "Profile spreadsheet columns and turn chart specs into chart data",
    long_about = None
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Settings file (JSON); every field is optional
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Log pipeline stages to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Infer a type profile for every column of the sheet
    Profile(InputArgs),
    /// Check a chart spec against the sheet's columns
    Validate {
        #[command(flatten)]
        input: InputArgs,
        /// Chart spec file (JSON)
        #[arg(long)]
        spec: PathBuf,
    },
    /// Produce renderer-ready chart data for a chart spec
    Chart {
        #[command(flatten)]
        input: InputArgs,
        /// Chart spec file (JSON)
        #[arg(long)]
        spec: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct InputArgs {
    /// Sheet file (.csv or .json); reads stdin when omitted
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Input format; guessed from the file extension, CSV for stdin
    #[arg(long, value_enum)]
    format: Option<Format>,

    /// Sheet to use when the input is a workbook with several sheets
    #[arg(long)]
    sheet: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Csv,
    Json,
}

impl From<Format> for InputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Csv => InputFormat::Csv,
            Format::Json => InputFormat::Json,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(args: &Args) -> Result<ExitCode> {
    let settings = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            Settings::from_json_str(&text)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => Settings::default(),
    };

    let input = match &args.command {
        Command::Profile(input)
        | Command::Validate { input, .. }
        | Command::Chart { input, .. } => input,
    };

    let sheet = match load_sheet(input, &settings) {
        Ok(sheet) => sheet,
        Err(LoadError::Chart(e)) => return report_error(&e, args.pretty),
        Err(LoadError::Other(e)) => return Err(e),
    };
    debug!(sheet = %sheet.name, rows = sheet.rows.len(), "loaded sheet");

    let columns = profile_sheet(&sheet, &settings.profile);
    let result = match &args.command {
        Command::Profile(_) => to_json(&columns, args.pretty)?,
        Command::Validate { spec, .. } => {
            let spec = read_spec(spec)?;
            match validate_chart_spec(&spec, &columns) {
                Ok(valid) => to_json(&valid, args.pretty)?,
                Err(e) => return report_error(&e, args.pretty),
            }
        }
        Command::Chart { spec, .. } => {
            let spec = read_spec(spec)?;
            match generate_chart(&sheet, &columns, &spec, &settings.chart) {
                Ok(chart) => to_json(&chart, args.pretty)?,
                Err(e) => return report_error(&e, args.pretty),
            }
        }
    };

    write_stdout(&result)?;
    Ok(ExitCode::SUCCESS)
}

enum LoadError {
    Chart(ChartError),
    Other(anyhow::Error),
}

fn load_sheet(input: &InputArgs, settings: &Settings) -> Result<Sheet, LoadError> {
    match &input.input {
        Some(path) => {
            let source = FileSource::new(".")
                .with_format(input.format.map(InputFormat::from))
                .with_sheet(input.sheet.clone());
            let source = RetryingSource::new(source, settings.retry.clone());
            source
                .fetch(&path.to_string_lossy())
                .map_err(LoadError::Chart)
        }
        None => {
            let mut bytes = Vec::new();
            io::stdin()
                .read_to_end(&mut bytes)
                .context("Failed to read sheet from stdin")
                .map_err(LoadError::Other)?;
            let format = input.format.map(InputFormat::from).unwrap_or(InputFormat::Csv);
            parse_sheet(&bytes, format, "stdin", input.sheet.as_deref())
                .context("Failed to parse sheet from stdin")
                .map_err(LoadError::Other)
        }
    }
}

fn read_spec(path: &Path) -> Result<ChartSpecInput> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read chart spec {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid chart spec {}", path.display()))
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.context("Failed to serialize output")
}

/// Pipeline errors go to stdout as `{"error": {...}}` so callers can show them per field
fn report_error(error: &ChartError, pretty: bool) -> Result<ExitCode> {
    #[derive(Serialize)]
    struct Envelope<'a> {
        error: &'a sheetchart::error::ErrorReport,
    }

    let report = error.report();
    write_stdout(&to_json(&Envelope { error: &report }, pretty)?)?;
    Ok(ExitCode::from(2))
}

fn write_stdout(text: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", text).context("Failed to write to stdout")?;
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}
