
/// Command line interface functionality
pub mod cli;
/// Per-read placement correctness relative to a truth set
pub mod correctness;
/// Contains various shared data types
pub mod data_types;
/// MAPQ-stratified ROC curves and single-threshold rates across candidates
pub mod metric_aggregator;
/// Tooling for parsing input files into meaningful structs / data
pub mod parsing;
/// Various utility functions that tend to be very generic
pub mod util;
/// All output writers
pub mod writers;
