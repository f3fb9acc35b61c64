//! Regula CLI binary.
//!
//! Fits an OLS regression described by a formula to the rows of a CSV file
//! and prints the summary report.

use clap::{Parser, Subcommand};
use indexmap::IndexMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use regula_models::{ModelError, OlsModel, SummaryOptions};

/// A CSV row keyed by column header
type Row = IndexMap<String, String>;

#[derive(Debug, Error)]
enum CliError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}

#[derive(Parser)]
#[command(name = "regula")]
#[command(about = "Formula-driven ordinary least squares regression", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit a model and print its summary
    Fit {
        /// Model formula, e.g. "Lottery ~ Literacy + LogPopulation"
        #[arg(short, long)]
        formula: String,

        /// CSV file with a header row
        #[arg(short, long)]
        data: PathBuf,

        /// Summary options as JSON; flags below override it
        #[arg(long)]
        options: Option<PathBuf>,

        /// Report title
        #[arg(long)]
        title: Option<String>,

        /// Significance level of the confidence intervals
        #[arg(long)]
        alpha: Option<f64>,

        /// Omit detail rows and diagnostics
        #[arg(long)]
        compact: bool,

        /// Displayed response name
        #[arg(long)]
        response_label: Option<String>,

        /// Displayed predictor names, comma separated
        #[arg(long, value_delimiter = ',')]
        predictor_labels: Option<Vec<String>>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Fit {
            formula,
            data,
            options,
            title,
            alpha,
            compact,
            response_label,
            predictor_labels,
        } => {
            let mut summary_options = match options {
                Some(path) => load_options(&path)?,
                None => SummaryOptions::default(),
            };
            if let Some(title) = title {
                summary_options.title = title;
            }
            if let Some(alpha) = alpha {
                summary_options.alpha = alpha;
            }
            if compact {
                summary_options.compact = true;
            }
            if let Some(label) = response_label {
                summary_options.response_label = Some(label);
            }
            if let Some(labels) = predictor_labels {
                summary_options.predictor_labels = Some(labels);
            }

            let rows = read_rows(&data)?;
            tracing::info!(path = %data.display(), rows = rows.len(), "loaded data");

            let model = OlsModel::new(&formula, &rows)?;
            let result = model.fit()?;
            println!("{}", result.summary(&summary_options)?);
        }
    }

    Ok(())
}

fn load_options(path: &Path) -> Result<SummaryOptions, CliError> {
    let file = File::open(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(file).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn read_rows(path: &Path) -> Result<Vec<Row>, CliError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    let headers = reader.headers()?.clone();

    reader
        .records()
        .map(|record| {
            let record = record?;
            Ok(headers
                .iter()
                .zip(record.iter())
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect())
        })
        .collect()
}
