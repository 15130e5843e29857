
use indexmap::IndexMap;
use serde::Serialize;

use crate::data_types::read_category::ReadCategory;
use crate::data_types::read_counts::ReadCounts;

/// Cumulative recall / precision-complement series for one candidate.
/// Point `k` summarizes every read with MAPQ >= `breakpoints[k]`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RocCurve {
    /// The MAPQ cutoffs, one per point
    breakpoints: Vec<u8>,
    /// recalled_total / total at each cutoff
    recall: Vec<f64>,
    /// (wrong_total + 1) / (wrong_total + recalled_total) at each cutoff
    precision_complement: Vec<f64>,
    /// Number of reads in the category
    total: u64,
    /// Cumulative counts after the final cutoff
    final_counts: ReadCounts,
}

impl RocCurve {
    /// Creates an empty curve for a category with `total` reads
    pub fn new(total: u64) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    /// Appends the point for `mapq` from the cumulative counts so far
    pub fn push_point(&mut self, mapq: u8, cumulative: ReadCounts) {
        self.breakpoints.push(mapq);
        self.recall.push(cumulative.recall(self.total).unwrap_or(0.0));
        self.precision_complement.push(cumulative.smoothed_precision_complement());
        self.final_counts = cumulative;
    }

    // getters
    pub fn breakpoints(&self) -> &[u8] {
        &self.breakpoints
    }

    pub fn recall(&self) -> &[f64] {
        &self.recall
    }

    pub fn precision_complement(&self) -> &[f64] {
        &self.precision_complement
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn final_counts(&self) -> ReadCounts {
        self.final_counts
    }

    pub fn len(&self) -> usize {
        self.breakpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breakpoints.is_empty()
    }
}

/// All candidate curves for one category filter
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CategoryCurves {
    /// The category these curves were computed for
    pub category: ReadCategory,
    /// The MAPQ cutoffs shared by all curves
    pub breakpoints: Vec<u8>,
    /// Candidate name to curve, in candidate input order
    pub curves: IndexMap<String, RocCurve>,
    /// Candidates that could not be evaluated
    pub failed: Vec<String>,
}
