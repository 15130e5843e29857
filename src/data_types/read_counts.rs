
use serde::Serialize;
use std::ops::AddAssign;

/// Correct/wrong tallies for a set of selected reads
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReadCounts {
    /// Number of selected reads that were placed correctly
    pub correct: u64,
    /// Number of selected reads that were placed incorrectly
    pub wrong: u64,
}

impl AddAssign for ReadCounts {
    // Enables += with counts
    fn add_assign(&mut self, rhs: Self) {
        self.correct += rhs.correct;
        self.wrong += rhs.wrong;
    }
}

impl ReadCounts {
    /// Constructor
    pub fn new(correct: u64, wrong: u64) -> Self {
        Self {
            correct, wrong
        }
    }

    /// Tallies one read
    #[inline]
    pub fn add_read(&mut self, is_correct: bool) {
        if is_correct {
            self.correct += 1;
        } else {
            self.wrong += 1;
        }
    }

    /// Total number of selected reads
    pub fn selected(&self) -> u64 {
        self.correct + self.wrong
    }

    /// Fraction of `total` reads that were recalled, None if `total` is 0
    pub fn recall(&self, total: u64) -> Option<f64> {
        if total > 0 {
            Some(self.correct as f64 / total as f64)
        } else {
            None
        }
    }

    /// Fraction of selected reads that are wrong, None if nothing was selected
    pub fn one_minus_precision(&self) -> Option<f64> {
        let denom = self.selected();
        if denom > 0 {
            Some(self.wrong as f64 / denom as f64)
        } else {
            None
        }
    }

    /// Wrong fraction with +1 smoothing on the numerator so the value is never 0 on a log axis.
    /// Before any read is selected the denominator is taken as 1.
    pub fn smoothed_precision_complement(&self) -> f64 {
        let denom = self.selected().max(1);
        (self.wrong + 1) as f64 / denom as f64
    }
}

/// Single-threshold summary for one candidate, see `MetricAggregator::rates_at_threshold(...)`
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct CorrectRate {
    /// Reads in the category with MAPQ >= the threshold
    pub counts: ReadCounts,
    /// Reads in the category regardless of MAPQ
    pub total: u64,
    /// correct / total
    pub recall: f64,
    /// wrong / selected
    pub one_minus_precision: f64,
}

impl CorrectRate {
    /// Builds the rate pair; an empty selection or category gives (0, 0)
    pub fn from_counts(counts: ReadCounts, total: u64) -> Self {
        match (counts.recall(total), counts.one_minus_precision()) {
            (Some(recall), Some(one_minus_precision)) => Self {
                counts, total, recall, one_minus_precision
            },
            _ => Self {
                counts, total, recall: 0.0, one_minus_precision: 0.0
            }
        }
    }

    /// Returns true if the selection was empty and the (0, 0) fallback was used
    pub fn is_empty_selection(&self) -> bool {
        self.counts.selected() == 0 || self.total == 0
    }
}
