
use indexmap::IndexMap;
use log::{LevelFilter, error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

use mapq_eval::cli::compare::{CompareSettings, check_compare_settings};
use mapq_eval::cli::core::{Commands, get_cli};
use mapq_eval::cli::rates::{RatesSettings, check_rates_settings};
use mapq_eval::cli::store::{StoreSettings, check_store_settings};
use mapq_eval::data_types::alignment_set::{AlignmentSet, Alignments};
use mapq_eval::data_types::mapq_breakpoints::MapqBreakpoints;
use mapq_eval::metric_aggregator::{EvaluationConfigBuilder, MetricAggregator};
use mapq_eval::parsing::alignment_formats::{read_alignment_set, read_keyed_alignment_set};
use mapq_eval::util::input::open_text_reader;
use mapq_eval::util::json_io::{save_json, save_json_pretty};
use mapq_eval::writers::rate_summary::RateSummaryWriter;
use mapq_eval::writers::roc_table::RocTableWriter;

/// Sets up env_logger from the -v count
fn init_logging(verbosity: u8) {
    let filter_level: LevelFilter = match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace
    };
    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(filter_level)
        .init();
}

fn init_thread_pool(threads: usize) {
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build_global() {
        Ok(()) => {},
        Err(e) => {
            error!("Error while building thread pool: {e}");
            std::process::exit(exitcode::OSERR);
        }
    };
}

/// Loads the truth, exiting on failure
fn load_truth(filename: &Path) -> AlignmentSet {
    info!("Loading truth alignments from {filename:?}...");
    match AlignmentSet::load(filename) {
        Ok(truth) => {
            info!("\tLoaded {} truth alignments", truth.len());
            truth
        },
        Err(e) => {
            error!("Error while loading truth alignments: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    }
}

/// Loads every candidate; failures are logged and the candidate is dropped.
/// Exits if nothing could be loaded.
fn load_candidates(candidate_files: &IndexMap<String, PathBuf>) -> IndexMap<String, AlignmentSet> {
    let mut candidates: IndexMap<String, AlignmentSet> = Default::default();
    for (label, filename) in candidate_files.iter() {
        info!("Loading candidate {label:?} from {filename:?}...");
        match AlignmentSet::load(filename) {
            Ok(c) => {
                candidates.insert(label.clone(), c);
            },
            Err(e) => {
                error!("Error while loading candidate {label:?}, skipping: {e:#}");
            }
        }
    }

    if candidates.is_empty() {
        error!("No candidates could be loaded.");
        std::process::exit(exitcode::IOERR);
    }
    candidates
}

/// Aligns candidates to the truth read order and classifies them.
/// Failed candidates are dropped; exits if none is left to report.
fn prepare_candidates(aggregator: &MetricAggregator, truth: &AlignmentSet, candidates: &mut IndexMap<String, AlignmentSet>) {
    let mut failed = match aggregator.align_candidates(truth, candidates) {
        Ok(f) => f,
        Err(e) => {
            error!("Error while indexing truth read names: {e}");
            std::process::exit(exitcode::DATAERR);
        }
    };

    info!("Classifying {} candidates...", candidates.len());
    failed.extend(aggregator.classify_candidates(truth, candidates));
    if !failed.is_empty() {
        warn!("Candidates that could not be evaluated: {}", failed.join(", "));
    }
    if candidates.is_empty() {
        error!("No candidate could be classified against the truth set.");
        std::process::exit(exitcode::DATAERR);
    }
}

fn run_store(settings: StoreSettings) {
    let start_time = Instant::now();
    init_logging(settings.verbosity);

    let settings = match check_store_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    let reader = match open_text_reader(&settings.input_filename) {
        Ok(r) => r,
        Err(e) => {
            error!("Error while opening input: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    };

    info!("Parsing {} alignments...", settings.format);
    let parse_result = if settings.canonical_order {
        read_keyed_alignment_set(reader, settings.format, settings.n_alignments)
            .and_then(|mut keyed| {
                keyed.sort_canonical();
                Ok(keyed.to_alignment_set()?)
            })
    } else {
        read_alignment_set(reader, settings.format, settings.n_alignments)
    };
    let alignments = match parse_result {
        Ok(a) => a,
        Err(e) => {
            error!("Error while parsing alignments: {e:#}");
            std::process::exit(exitcode::DATAERR);
        }
    };

    if let Some(parent) = settings.output_filename.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                error!("Error while creating output folder: {e}");
                std::process::exit(exitcode::IOERR);
            }
        }
    }

    info!("Saving {} alignments to {:?}...", alignments.len(), settings.output_filename);
    if let Err(e) = alignments.save(&settings.output_filename) {
        error!("Error while saving alignments: {e:#}");
        std::process::exit(exitcode::IOERR);
    }

    info!("Store completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn run_compare(settings: CompareSettings) {
    // start the timer
    let start_time = Instant::now();

    // set up logging before we check the other settings
    init_logging(settings.verbosity);

    let settings = match check_compare_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };
    init_thread_pool(settings.threads);

    // create the primary output folder
    info!("Creating output folder at {:?}...", settings.output_folder);
    if let Err(e) = std::fs::create_dir_all(&settings.output_folder) {
        error!("Error while creating output folder: {e}");
        std::process::exit(exitcode::IOERR);
    }

    if let Some(debug_folder) = settings.debug_folder.as_ref() {
        info!("Creating debug folder at {debug_folder:?}...");
        if let Err(e) = std::fs::create_dir_all(debug_folder) {
            error!("Error while creating debug folder: {e}");
            std::process::exit(exitcode::IOERR);
        }

        // save the CLI options
        let cli_json = debug_folder.join("cli_settings.json");
        info!("Saving CLI options to {cli_json:?}...");
        if let Err(e) = save_json(&settings, &cli_json) {
            error!("Error while saving CLI options: {e}");
            std::process::exit(exitcode::IOERR);
        }
    }

    // settings were already validated, this only fails on a programming error
    let breakpoints = match MapqBreakpoints::new(settings.mapq_breakpoints.clone()) {
        Ok(b) => b,
        Err(e) => {
            error!("Error while building MAPQ breakpoints: {e}");
            std::process::exit(exitcode::SOFTWARE);
        }
    };
    let config = match EvaluationConfigBuilder::default()
        .allowed_mismatch(settings.allowed_mismatch)
        .mapq_breakpoints(breakpoints)
        .force_classification(settings.force_classification)
        .build() {
        Ok(c) => c,
        Err(e) => {
            error!("Error while building evaluation config: {e:?}");
            std::process::exit(exitcode::SOFTWARE);
        }
    };
    let aggregator = MetricAggregator::new(config);

    let truth = load_truth(&settings.truth_filename);
    let mut candidates = load_candidates(&settings.candidate_files);

    prepare_candidates(&aggregator, &truth, &mut candidates);

    if settings.save_classified {
        for (label, candidate) in candidates.iter() {
            let out_fn = settings.output_folder.join(format!("{label}.classified.json.gz"));
            info!("Saving classified {label:?} to {out_fn:?}...");
            if let Err(e) = candidate.save(&out_fn) {
                error!("Error while saving classified candidate: {e:#}");
                std::process::exit(exitcode::IOERR);
            }
        }
    }

    let mut all_curves = vec![];
    for &category in settings.categories.iter() {
        let category_curves = aggregator.compute_curves(&candidates, category);

        let table_fn = settings.output_folder.join(format!("roc_{category}.tsv"));
        info!("Saving {category} ROC table to {table_fn:?}...");
        let write_result = RocTableWriter::new(&table_fn)
            .and_then(|mut writer| {
                writer.write_curves(&category_curves)?;
                writer.finish()
            });
        if let Err(e) = write_result {
            error!("Error while saving ROC table: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
        all_curves.push(category_curves);
    }

    let curves_fn = settings.output_folder.join("roc_curves.json");
    info!("Saving all ROC curves to {curves_fn:?}...");
    if let Err(e) = save_json_pretty(&all_curves, &curves_fn) {
        error!("Error while saving ROC curves: {e:#}");
        std::process::exit(exitcode::IOERR);
    }

    if let Some((wrong_by, correct_by)) = settings.discordant_pair() {
        match aggregator.discordant_reads(&candidates, &wrong_by, &correct_by, settings.discordant_min_mapq) {
            Ok(indices) => {
                let out_fn = settings.output_folder.join("discordant_reads.json");
                info!("Saving discordant reads to {out_fn:?}...");
                if let Err(e) = save_json_pretty(&indices, &out_fn) {
                    error!("Error while saving discordant reads: {e:#}");
                    std::process::exit(exitcode::IOERR);
                }
            },
            Err(e) => {
                error!("Error while selecting discordant reads: {e}");
            }
        }
    }

    info!("Comparisons completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn run_rates(settings: RatesSettings) {
    let start_time = Instant::now();
    init_logging(settings.verbosity);

    let settings = match check_rates_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };
    init_thread_pool(settings.threads);

    let config = match EvaluationConfigBuilder::default()
        .allowed_mismatch(settings.allowed_mismatch)
        .force_classification(settings.force_classification)
        .build() {
        Ok(c) => c,
        Err(e) => {
            error!("Error while building evaluation config: {e:?}");
            std::process::exit(exitcode::SOFTWARE);
        }
    };
    let aggregator = MetricAggregator::new(config);

    let truth = load_truth(&settings.truth_filename);
    let mut candidates = load_candidates(&settings.candidate_files);
    prepare_candidates(&aggregator, &truth, &mut candidates);

    let mut summary_writer = RateSummaryWriter::new();
    for &category in settings.categories.iter() {
        let rates = aggregator.rates_at_threshold(&candidates, category, settings.min_mapq);
        for (label, rate) in rates.iter() {
            info!("{label} ({category}, mapq >= {}):", settings.min_mapq);
            info!("\tRecall: {}", rate.recall);
            info!("\t1 - Precision: {}", rate.one_minus_precision);
        }
        summary_writer.add_rates(category, settings.min_mapq, rates);
    }

    if let Some(summary_fn) = settings.output_summary_filename.as_deref() {
        info!("Saving rate summary to {summary_fn:?}...");
        if let Err(e) = summary_writer.write_summary(summary_fn) {
            error!("Error while saving summary file: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    }

    info!("Rates completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn main() {
    let cli = get_cli();
    match cli.command {
        Commands::Store(settings) => {
            run_store(*settings);
        },
        Commands::Compare(settings) => {
            run_compare(*settings);
        },
        Commands::Rates(settings) => {
            run_rates(*settings);
        }
    }

    info!("Process finished successfully.");
}
