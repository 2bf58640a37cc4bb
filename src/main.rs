//! UTMi - interaction valuation engine
//!
//! Command-line entry point: values single exchanges, scores CVs, projects
//! income and aggregates interaction logs into dashboard snapshots.

mod cli;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;
use utmi_core::{CoefficientTable, CvLevel};

use cli::coefficients::CoefficientsCommand;
use cli::valuate::ValuateArgs;

#[derive(Parser)]
#[command(name = "utmi")]
#[command(about = "Value assistant interactions in monetizable units", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Set log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Coefficient file layered over the built-in defaults
    #[arg(short, long, env = "UTMI_COEFFICIENTS", global = true)]
    coefficients: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Value one prompt/response exchange
    Valuate(ValuateArgs),

    /// Score a CV document (JSON)
    Cv {
        /// Path to the structured CV
        path: PathBuf,
    },

    /// Project a capped monthly income
    Income {
        /// CV capital score
        #[arg(long)]
        cv_score: f64,

        /// Cumulative valuation units
        #[arg(long, default_value = "0")]
        units: f64,

        /// Tier (derived from the score when omitted)
        #[arg(long)]
        level: Option<CvLevel>,
    },

    /// Aggregate an interaction log (JSON array of records)
    Dashboard {
        /// Path to the records
        records: PathBuf,

        /// Optional CV to include
        #[arg(long)]
        cv: Option<PathBuf>,

        /// Current treasury balance
        #[arg(long)]
        treasury: Option<f64>,

        /// Date ongoing CV experiences run to (YYYY-MM-DD, default today)
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },

    /// Coefficient table operations
    Coefficients {
        #[command(subcommand)]
        command: CoefficientsCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::new(format!(
        "utmi={level},utmi_core={level}",
        level = level.as_str().to_lowercase()
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    debug!("UTMi v{} starting...", env!("CARGO_PKG_VERSION"));

    let coefficients = cli.coefficients.as_deref();

    match cli.command {
        Commands::Valuate(args) => cli::valuate::handle(args, load_table(coefficients)?).await,
        Commands::Cv { path } => cli::cv::handle(path, load_table(coefficients)?).await,
        Commands::Income {
            cv_score,
            units,
            level,
        } => cli::income::handle(cv_score, units, level, load_table(coefficients)?).await,
        Commands::Dashboard {
            records,
            cv,
            treasury,
            as_of,
        } => {
            cli::dashboard::handle(records, cv, treasury, as_of, load_table(coefficients)?).await
        }
        Commands::Coefficients { command } => cli::coefficients::handle(command, coefficients).await,
    }
}

fn load_table(path: Option<&Path>) -> Result<CoefficientTable> {
    CoefficientTable::load(path).context("Failed to load coefficient table")
}
