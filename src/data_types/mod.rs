
/// Columnar alignment sets and the shared `Alignments` capability trait
pub mod alignment_set;
/// Record-backed alignment sets keyed by read name
pub mod keyed_alignments;
/// Validated, descending MAPQ cutoffs
pub mod mapq_breakpoints;
/// Variant-based read filters
pub mod read_category;
/// Correct / wrong tallies and the rates derived from them
pub mod read_counts;
/// Cumulative recall / precision-complement curves
pub mod roc_curve;
