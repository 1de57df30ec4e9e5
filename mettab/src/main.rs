use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use metscore::pipeline::config::{PipelineConfig, SelectionThresholds};
use metscore::pipeline::rollup::build_overview;
use metscore::pipeline::run::{run_pipeline, PipelineInput};
use metscore::pipeline::selection::build_selections;

use mettab::export::{
    write_feature_table, write_overview_table, write_peak_tables_json, write_records_json,
};
use mettab::io::annotations::read_external_annotations;
use mettab::io::bioactivity::{read_bioactivity, BioactivityFormat};
use mettab::io::cliques::read_similarity_cliques;
use mettab::io::matrix::read_peak_matrix;
use mettab::io::metadata::read_group_metadata;
use mettab::io::mgf::read_fragments;
use mettab::io::msp::read_spectral_library;

#[derive(Parser, Debug)]
#[command(author, version, about = "Annotate and score a metabolomics peak matrix", long_about = None)]
struct Cli {
    /// The path to the wide peak matrix CSV.
    #[arg(short, long)]
    matrix: PathBuf,

    /// The path to the MGF fragment file.
    #[arg(long)]
    fragments: Option<PathBuf>,

    /// The path to the group metadata CSV (sample_name, attribute).
    #[arg(long)]
    metadata: Option<PathBuf>,

    /// The path to the bioactivity CSV (sample_name, quant_data).
    #[arg(long)]
    bioactivity: Option<PathBuf>,

    /// How to read the bioactivity values.
    #[arg(long, default_value_t, value_enum)]
    bioactivity_format: BioactivityFormat,

    /// The path to the reference spectral library (MSP).
    #[arg(long)]
    library: Option<PathBuf>,

    /// The path to the external annotation CSV.
    #[arg(long)]
    annotations: Option<PathBuf>,

    /// The path to the similarity clique JSON.
    #[arg(long)]
    cliques: Option<PathBuf>,

    /// The path to a JSON run configuration.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// The directory the result tables are written to.
    #[arg(short, long, default_value = "results")]
    output: PathBuf,

    /// Override for the mass deviation tolerance in ppm.
    #[arg(long)]
    mass_deviation_ppm: Option<f64>,

    /// Override for the blank retention factor.
    #[arg(long)]
    blank_factor: Option<f64>,

    /// Override for the bioactivity factor.
    #[arg(long)]
    bioactivity_factor: Option<f64>,
}

/// Run configuration file: pipeline settings plus selection thresholds.
/// Partial files are fine, missing sections fall back to their defaults.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct RunConfig {
    pipeline: PipelineConfig,
    thresholds: SelectionThresholds,
}

#[derive(Debug)]
enum CliError {
    Io(std::io::Error),
    Config(String),
    Table(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(source) => write!(f, "I/O error: {}", source),
            CliError::Config(msg) => write!(f, "Error interpreting the config: {}", msg),
            CliError::Table(msg) => write!(f, "Error reading input table: {}", msg),
        }
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(source: std::io::Error) -> Self {
        CliError::Io(source)
    }
}

fn table_error(err: Box<dyn Error>) -> CliError {
    CliError::Table(err.to_string())
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let args = Cli::parse();

    let mut run_config: RunConfig = match &args.config {
        Some(path) => {
            let file = File::open(path)?;
            serde_json::from_reader(file).map_err(|e| CliError::Config(e.to_string()))?
        }
        None => RunConfig::default(),
    };
    if let Some(ppm) = args.mass_deviation_ppm {
        run_config.pipeline.mass_deviation_ppm = ppm;
    }
    if let Some(factor) = args.blank_factor {
        run_config.pipeline.blank_factor = factor;
    }
    if let Some(factor) = args.bioactivity_factor {
        run_config.pipeline.bioactivity_factor = factor;
    }

    let matrix = read_peak_matrix(&args.matrix).map_err(table_error)?;
    info!(
        "Read {} matrix rows over {} samples",
        matrix.len(),
        matrix.samples.len()
    );

    let fragments = match &args.fragments {
        Some(path) => read_fragments(path).map_err(table_error)?,
        None => BTreeMap::new(),
    };
    let group_metadata = match &args.metadata {
        Some(path) => Some(read_group_metadata(path).map_err(table_error)?),
        None => None,
    };
    let bioactivity = match &args.bioactivity {
        Some(path) => Some(read_bioactivity(path, args.bioactivity_format).map_err(table_error)?),
        None => None,
    };
    let library = match &args.library {
        Some(path) => read_spectral_library(path).map_err(table_error)?,
        None => Vec::new(),
    };
    let external_annotations = match &args.annotations {
        Some(path) => read_external_annotations(path).map_err(table_error)?,
        None => BTreeMap::new(),
    };
    let cliques = match &args.cliques {
        Some(path) => read_similarity_cliques(path).map_err(table_error)?,
        None => BTreeMap::new(),
    };
    info!(
        "Read {} fragment spectra, {} library entries, {} cliques",
        fragments.len(),
        library.len(),
        cliques.len()
    );

    let input = PipelineInput {
        matrix,
        fragments,
        group_metadata,
        bioactivity,
        library,
        external_annotations,
        cliques,
    };
    let output = run_pipeline(input, &run_config.pipeline);

    let selections = build_selections(&output.tables, &output.records, &run_config.thresholds);
    let overview = build_overview(&selections, &output.records, &output.stats);

    std::fs::create_dir_all(&args.output)?;
    write_feature_table(args.output.join("features.csv"), &output.records).map_err(table_error)?;
    write_overview_table(args.output.join("overview.csv"), &overview).map_err(table_error)?;
    write_records_json(args.output.join("records.json"), &output.records).map_err(table_error)?;
    write_peak_tables_json(args.output.join("peak_tables.json"), &output.tables)
        .map_err(table_error)?;
    info!("Wrote result tables to {}", args.output.display());

    Ok(())
}
