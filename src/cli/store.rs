
use anyhow::ensure;
use clap::Args;
use log::{info, warn};
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::core::{check_required_filename, AFTER_HELP, FULL_VERSION};
use crate::parsing::alignment_formats::AlignmentFormat;

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct StoreSettings {
    // skipped so that FORMAT stays the first positional
    #[clap(skip)]
    mapq_eval_version: String,

    /// Input line format
    #[clap(required = true)]
    #[clap(value_name = "FORMAT")]
    pub format: AlignmentFormat,

    /// Input alignments, "-" for stdin; .gz is decompressed
    #[clap(short = 'i')]
    #[clap(long = "input")]
    #[clap(value_name = "FILE")]
    #[clap(help_heading = Some("Input/Output"))]
    #[clap(default_value = "-")]
    pub input_filename: PathBuf,

    /// Output alignment file (.json or .json.gz)
    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output")]
    #[clap(value_name = "FILE")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_filename: PathBuf,

    /// Number of read slots, must be >= the number of reads (both mates for paired data)
    #[clap(required = true)]
    #[clap(short = 'n')]
    #[clap(long = "n-alignments")]
    #[clap(value_name = "INT")]
    #[clap(help_heading = Some("Parsing"))]
    pub n_alignments: usize,

    /// Orders reads by name instead of numeric identifier and keeps the names; truth and every candidate must then be stored this way
    #[clap(long = "canonical-order")]
    #[clap(help_heading = Some("Parsing"))]
    pub canonical_order: bool,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn check_store_settings(mut settings: StoreSettings) -> anyhow::Result<StoreSettings> {
    // hard code the version in
    settings.mapq_eval_version = FULL_VERSION.clone();
    info!("mapq_eval version: {:?}", &settings.mapq_eval_version);
    info!("Sub-command: store");
    info!("Inputs:");

    if settings.input_filename.as_os_str() != "-" {
        check_required_filename(&settings.input_filename, "Input alignments")?;
    }
    info!("\tInput: {:?}", &settings.input_filename);
    info!("\tFormat: {}", settings.format);

    info!("Parsing parameters:");
    ensure!(settings.n_alignments > 0, "--n-alignments must be >0");
    info!("\tAlignment slots: {}", settings.n_alignments);
    info!("\tRead order: {}", if settings.canonical_order { "CANONICAL NAME" } else { "NUMERIC ID" });
    if settings.canonical_order {
        warn!("Canonical ordering requires truth and every candidate to be stored with --canonical-order; reads are matched by name before comparison.");
    }

    info!("Outputs:");
    info!("\tOutput: {:?}", &settings.output_filename);

    Ok(settings)
}
