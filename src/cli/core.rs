
use anyhow::{bail, ensure};
use clap::{Parser, Subcommand};
use chrono::Datelike;
use indexmap::IndexMap;
use lazy_static::lazy_static;
use std::path::{Path, PathBuf};

use crate::cli::compare::CompareSettings;
use crate::cli::rates::RatesSettings;
use crate::cli::store::StoreSettings;
use crate::util::json_io::resolve_stored_path;

lazy_static! {
    /// Stores the full version string we plan to use, which is generated in build.rs
    /// # Examples
    /// * `0.3.1-6bb9635-dirty` - while on a dirty branch
    /// * `0.3.1-6bb9635` - with a fresh commit
    pub static ref FULL_VERSION: String = format!("{}-{}", env!("CARGO_PKG_VERSION"), env!("VERGEN_GIT_DESCRIBE"));

    /// Shared after help string containing the legalese.
    pub static ref AFTER_HELP: String = format!("Copyright (C) 2019-{}     mapq_eval contributors
This program comes with ABSOLUTELY NO WARRANTY; it is intended for
benchmarking read aligners on simulated data.", chrono::Utc::now().year());
}

#[derive(Parser)]
#[clap(author,
    version = &**FULL_VERSION,
    about,
    after_help = &**AFTER_HELP)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands
}

/// mapq_eval, scores aligner output against a simulated truth set.
/// Select a subcommand to see more usage information:
#[derive(Subcommand)]
pub enum Commands {
    /// Parses alignments (SAM, BED, pos, truth) into a stored alignment file
    Store(Box<StoreSettings>),
    /// Builds MAPQ-stratified recall / precision curves for one or more candidates
    Compare(Box<CompareSettings>),
    /// Reports a single recall / 1-precision pair per candidate at a MAPQ cutoff
    Rates(Box<RatesSettings>)
}

pub fn get_cli() -> Cli {
    Cli::parse()
}

/// Checks if a file exists and will otherwise exit
/// # Arguments
/// * `filename` - the file path to check for
/// * `label` - the label to use for error messages
pub fn check_required_filename(filename: &Path, label: &str) -> anyhow::Result<()> {
    if !filename.exists() {
        bail!("{} does not exist: \"{}\"", label, filename.display());
    }

    // file exists
    Ok(())
}

/// Splits a candidate argument into a label and path.
/// `label=path` sets the label explicitly, otherwise the file name minus any `.json` / `.json.gz` suffix is used.
pub fn parse_candidate(raw: &str) -> (String, PathBuf) {
    if let Some((label, path)) = raw.split_once('=') {
        if !label.is_empty() {
            return (label.to_string(), PathBuf::from(path));
        }
    }

    let path = PathBuf::from(raw);
    let file_name = path.file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_else(|| raw.to_string());
    let label = file_name.strip_suffix(".gz").unwrap_or(&file_name);
    let label = label.strip_suffix(".json").unwrap_or(label);
    (label.to_string(), path)
}

/// Resolves all candidate arguments into label -> stored file, checking that each exists and labels are unique
/// # Errors
/// * if no candidates are provided
/// * if a label is duplicated
/// * if a stored file cannot be found
pub fn resolve_candidates(raw_candidates: &[String]) -> anyhow::Result<IndexMap<String, PathBuf>> {
    ensure!(!raw_candidates.is_empty(), "At least one candidate must be provided");
    let mut resolved: IndexMap<String, PathBuf> = Default::default();
    for raw in raw_candidates.iter() {
        let (label, path) = parse_candidate(raw);
        let full_path = resolve_stored_path(&path)?;
        if resolved.insert(label.clone(), full_path).is_some() {
            bail!("Duplicate candidate label: {label:?}");
        }
    }
    Ok(resolved)
}
