//! `vial-plan`: command-line presenter for vial cost plans.

mod logging;
mod requests;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use vial_plan_core::{
    compare_by_labels, CatalogProvider, CatalogVial, Database, DoseCoverageOptimizer,
    OptimizerConfig, PlanReport, RequestList,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "vial-plan",
    about = "Cheapest vial combinations, all brands vs originator only"
)]
struct Cli {
    /// Catalog database file
    #[arg(long, global = true, default_value = "vial_catalog.sqlite")]
    db: PathBuf,
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load catalog vials from a JSON array into the database
    Import {
        /// JSON file with an array of catalog vials
        file: PathBuf,
    },
    /// List drugs in the catalog
    Drugs,
    /// Compare Plan A (cheapest) with Plan B (originator only)
    Compare {
        /// Patient market: Thai or International
        #[arg(short, long)]
        market: String,
        /// Care setting: OPD or IPD
        #[arg(short, long)]
        setting: String,
        /// Drug request as DRUG=DOSE_MG (repeatable)
        #[arg(short = 'r', long = "request", value_name = "DRUG=DOSE")]
        request_args: Vec<String>,
        /// TOML file of [[request]] entries
        #[arg(long = "requests")]
        request_file: Option<PathBuf>,
        /// Optimizer configuration TOML
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    match cli.command {
        Commands::Import { file } => import(&cli.db, &file),
        Commands::Drugs => list_drugs(&cli.db),
        Commands::Compare {
            market,
            setting,
            request_args,
            request_file,
            config,
            format,
        } => {
            let mut list = RequestList::new();
            if let Some(path) = &request_file {
                requests::load_request_file(&mut list, path)?;
            }
            for arg in &request_args {
                let (drug, dose) = requests::parse_request_arg(arg)?;
                list.add(drug, dose);
            }
            if list.is_empty() {
                warn!("No drug requests given; nothing to compare");
            }

            let config = match &config {
                Some(path) => OptimizerConfig::load(path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => OptimizerConfig::default(),
            };

            let db = Database::open(&cli.db)
                .with_context(|| format!("opening catalog {}", cli.db.display()))?;
            let comparison = compare_by_labels(
                &list.snapshot(),
                &db,
                DoseCoverageOptimizer::new(config),
                &market,
                &setting,
            )?;

            let report = PlanReport::from_comparison(&comparison);
            let rendered = match format {
                OutputFormat::Text => report.to_text(),
                OutputFormat::Json => report.to_json()?,
                OutputFormat::Csv => report.to_csv(),
            };
            print!("{}", rendered);
            Ok(())
        }
    }
}

fn import(db_path: &Path, file: &Path) -> Result<()> {
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let vials: Vec<CatalogVial> =
        serde_json::from_str(&contents).with_context(|| format!("parsing {}", file.display()))?;

    let mut db = Database::open(db_path)
        .with_context(|| format!("opening catalog {}", db_path.display()))?;
    let count = db.import_vials(&vials)?;
    info!(count, db = %db_path.display(), "Imported catalog vials");
    Ok(())
}

fn list_drugs(db_path: &Path) -> Result<()> {
    let db = Database::open(db_path)
        .with_context(|| format!("opening catalog {}", db_path.display()))?;
    for drug in db.drugs()? {
        println!("{}", drug);
    }
    Ok(())
}
