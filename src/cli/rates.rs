
use clap::Args;
use indexmap::IndexMap;
use log::info;
use serde::Serialize;
use std::path::PathBuf;
use strum::IntoEnumIterator;

use crate::cli::core::{check_required_filename, resolve_candidates, AFTER_HELP, FULL_VERSION};
use crate::correctness::DEFAULT_ALLOWED_MISMATCH;
use crate::data_types::read_category::ReadCategory;
use crate::util::json_io::resolve_stored_path;

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct RatesSettings {
    #[clap(default_value = "")]
    #[clap(hide = true)]
    mapq_eval_version: String,

    /// Truth alignment file created with `store`
    #[clap(required = true)]
    #[clap(short = 't')]
    #[clap(long = "truth")]
    #[clap(value_name = "FILE")]
    #[clap(help_heading = Some("Input/Output"))]
    pub truth_filename: PathBuf,

    /// Candidate alignment file created with `store`, optionally as LABEL=FILE; may be repeated
    #[clap(required = true)]
    #[clap(short = 'c')]
    #[clap(long = "candidate")]
    #[clap(value_name = "FILE")]
    #[clap(help_heading = Some("Input/Output"))]
    pub candidates: Vec<String>,

    /// Optional output summary file (CSV/TSV)
    #[clap(short = 'o')]
    #[clap(long = "output-summary")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_summary_filename: Option<PathBuf>,

    /// Only reads with at least this MAPQ are selected
    #[clap(long = "min-mapq")]
    #[clap(value_name = "MAPQ")]
    #[clap(help_heading = Some("Compare parameters"))]
    #[clap(default_value = "0")]
    pub min_mapq: u8,

    /// Maximum position difference (bp) for a read to count as correctly placed
    #[clap(long = "allowed-mismatch")]
    #[clap(value_name = "BP")]
    #[clap(help_heading = Some("Compare parameters"))]
    #[clap(default_value_t = DEFAULT_ALLOWED_MISMATCH)]
    pub allowed_mismatch: u64,

    /// Read categories to report; may be repeated [default: all]
    #[clap(long = "category")]
    #[clap(value_name = "CATEGORY")]
    #[clap(help_heading = Some("Compare parameters"))]
    pub categories: Vec<ReadCategory>,

    /// Re-classifies candidates even if they already store correctness
    #[clap(long = "force-classification")]
    #[clap(help_heading = Some("Compare parameters"))]
    pub force_classification: bool,

    /// Number of threads used to classify candidates
    #[clap(long = "threads")]
    #[clap(value_name = "THREADS")]
    #[clap(default_value = "1")]
    pub threads: usize,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Resolved candidate label -> file, filled in by `check_rates_settings`
    #[clap(skip)]
    pub candidate_files: IndexMap<String, PathBuf>,
}

pub fn check_rates_settings(mut settings: RatesSettings) -> anyhow::Result<RatesSettings> {
    // hard code the version in
    settings.mapq_eval_version = FULL_VERSION.clone();
    info!("mapq_eval version: {:?}", &settings.mapq_eval_version);
    info!("Sub-command: rates");
    info!("Inputs:");

    settings.truth_filename = resolve_stored_path(&settings.truth_filename)?;
    check_required_filename(&settings.truth_filename, "Truth alignments")?;
    info!("\tTruth: {:?}", &settings.truth_filename);

    settings.candidate_files = resolve_candidates(&settings.candidates)?;
    for (label, filename) in settings.candidate_files.iter() {
        info!("\tCandidate {label:?}: {filename:?}");
    }

    info!("Outputs:");
    if let Some(filename) = settings.output_summary_filename.as_deref() {
        info!("\tSummary: {filename:?}");
    } else {
        info!("\tSummary: None");
    }

    info!("Compare parameters:");
    info!("\tMinimum MAPQ: {}", settings.min_mapq);
    info!("\tAllowed mismatch: {} bp", settings.allowed_mismatch);
    if settings.categories.is_empty() {
        settings.categories = ReadCategory::iter().collect();
    }
    info!("\tCategories: {}", settings.categories.iter().map(|c| c.to_string()).collect::<Vec<String>>().join(", "));
    info!("\tForce classification: {}", if settings.force_classification { "ENABLED" } else { "DISABLED" });

    if settings.threads == 0 {
        settings.threads = 1;
    }
    info!("Processing threads: {}", settings.threads);

    Ok(settings)
}
