
use anyhow::{bail, ensure};
use clap::Args;
use indexmap::IndexMap;
use log::info;
use serde::Serialize;
use std::path::PathBuf;
use strum::IntoEnumIterator;

use crate::cli::core::{check_required_filename, resolve_candidates, AFTER_HELP, FULL_VERSION};
use crate::correctness::DEFAULT_ALLOWED_MISMATCH;
use crate::data_types::mapq_breakpoints::{MapqBreakpoints, DEFAULT_MAPQ_BREAKPOINTS};
use crate::data_types::read_category::ReadCategory;
use crate::metric_aggregator::DEFAULT_DISCORDANT_MIN_MAPQ;
use crate::util::json_io::resolve_stored_path;

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct CompareSettings {
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

    /// Output directory for the ROC tables
    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output-dir")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_folder: PathBuf,

    /// Optional output debug folder
    #[clap(long = "output-debug")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Input/Output"))]
    pub debug_folder: Option<PathBuf>,

    /// Saves each classified candidate next to the ROC tables for faster re-runs
    #[clap(long = "save-classified")]
    #[clap(help_heading = Some("Input/Output"))]
    pub save_classified: bool,

    /// Maximum position difference (bp) for a read to count as correctly placed
    #[clap(long = "allowed-mismatch")]
    #[clap(value_name = "BP")]
    #[clap(help_heading = Some("Compare parameters"))]
    #[clap(default_value_t = DEFAULT_ALLOWED_MISMATCH)]
    pub allowed_mismatch: u64,

    /// Comma-separated, strictly descending MAPQ cutoffs ending at 0 [default: 60,58,...,1,0]
    #[clap(long = "mapq-breakpoints")]
    #[clap(value_name = "MAPQ")]
    #[clap(value_delimiter = ',')]
    #[clap(help_heading = Some("Compare parameters"))]
    pub mapq_breakpoints: Vec<u8>,

    /// Read categories to report; may be repeated [default: all categories]
    #[clap(long = "category")]
    #[clap(value_name = "CATEGORY")]
    #[clap(help_heading = Some("Compare parameters"))]
    pub categories: Vec<ReadCategory>,

    /// Re-classifies candidates even if they already store correctness
    #[clap(long = "force-classification")]
    #[clap(help_heading = Some("Compare parameters"))]
    pub force_classification: bool,

    /// Reports reads the first candidate placed wrong that the second placed right, as WRONG_BY,CORRECT_BY
    #[clap(long = "discordant")]
    #[clap(value_name = "LABELS")]
    #[clap(help_heading = Some("Optional outputs"))]
    pub discordant: Option<String>,

    /// Minimum MAPQ of the wrong placement for --discordant
    #[clap(long = "discordant-min-mapq")]
    #[clap(value_name = "MAPQ")]
    #[clap(help_heading = Some("Optional outputs"))]
    #[clap(default_value_t = DEFAULT_DISCORDANT_MIN_MAPQ)]
    pub discordant_min_mapq: u8,

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

    /// Resolved candidate label -> file, filled in by `check_compare_settings`
    #[clap(skip)]
    pub candidate_files: IndexMap<String, PathBuf>,
}

impl CompareSettings {
    /// Splits --discordant into (wrong_by, correct_by)
    pub fn discordant_pair(&self) -> Option<(String, String)> {
        self.discordant.as_deref()
            .and_then(|d| d.split_once(','))
            .map(|(w, c)| (w.to_string(), c.to_string()))
    }
}

pub fn check_compare_settings(mut settings: CompareSettings) -> anyhow::Result<CompareSettings> {
    // hard code the version in
    settings.mapq_eval_version = FULL_VERSION.clone();
    info!("mapq_eval version: {:?}", &settings.mapq_eval_version);
    info!("Sub-command: compare");
    info!("Inputs:");

    settings.truth_filename = resolve_stored_path(&settings.truth_filename)?;
    check_required_filename(&settings.truth_filename, "Truth alignments")?;
    info!("\tTruth: {:?}", &settings.truth_filename);

    settings.candidate_files = resolve_candidates(&settings.candidates)?;
    for (label, filename) in settings.candidate_files.iter() {
        info!("\tCandidate {label:?}: {filename:?}");
    }

    // outputs
    info!("Outputs:");
    info!("\tOutput folder: {:?}", &settings.output_folder);
    if let Some(debug_folder) = settings.debug_folder.as_ref() {
        info!("\tDebug folder: {debug_folder:?}");
    }
    info!("\tSave classified: {}", if settings.save_classified { "ENABLED" } else { "DISABLED" });

    info!("Compare parameters:");
    info!("\tAllowed mismatch: {} bp", settings.allowed_mismatch);
    if settings.mapq_breakpoints.is_empty() {
        settings.mapq_breakpoints = DEFAULT_MAPQ_BREAKPOINTS.to_vec();
    }
    MapqBreakpoints::new(settings.mapq_breakpoints.clone())?;
    info!("\tMAPQ breakpoints: {:?}", settings.mapq_breakpoints);

    // empty means everything
    if settings.categories.is_empty() {
        settings.categories = ReadCategory::iter().collect();
    }
    info!("\tCategories: {}", settings.categories.iter().map(|c| c.to_string()).collect::<Vec<String>>().join(", "));
    info!("\tForce classification: {}", if settings.force_classification { "ENABLED" } else { "DISABLED" });

    if settings.discordant.is_some() {
        let Some((wrong_by, correct_by)) = settings.discordant_pair() else {
            bail!("--discordant must be formatted as WRONG_BY,CORRECT_BY");
        };
        for label in [&wrong_by, &correct_by] {
            ensure!(settings.candidate_files.contains_key(label), "--discordant label is not a candidate: {label:?}");
        }
        info!("\tDiscordant reads: wrong by {wrong_by:?} (mapq >= {}), correct by {correct_by:?}", settings.discordant_min_mapq);
    }

    if settings.threads == 0 {
        settings.threads = 1;
    }
    info!("Processing threads: {}", settings.threads);

    Ok(settings)
}
