/*!
# Writers module
Contains the logic for writing the tabular outputs consumed by plotting and report layers.
*/
/// Single-threshold (recall, 1-precision) summary table
pub mod rate_summary;
/// Per-cutoff ROC table for each candidate
pub mod roc_table;
