
use itertools::Itertools;
use serde::Serialize;

use crate::data_types::alignment_set::AlignmentError;

/// The default MAPQ sweep, denser near the top of the typical 0-60 range
pub const DEFAULT_MAPQ_BREAKPOINTS: [u8; 32] = [
    60, 58, 57, 56, 55, 54, 53, 52, 51, 50, 49, 48, 46, 44, 42, 40,
    37, 34, 31, 27, 25, 23, 20, 17, 14, 11, 7, 5, 3, 2, 1, 0
];

/// A strictly descending list of MAPQ cutoffs that ends at 0, so every read is counted by the final cutoff
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MapqBreakpoints(Vec<u8>);

impl Default for MapqBreakpoints {
    fn default() -> Self {
        Self(DEFAULT_MAPQ_BREAKPOINTS.to_vec())
    }
}

impl MapqBreakpoints {
    /// Constructor with validation
    /// # Errors
    /// * if `breakpoints` is empty, not strictly descending, or does not end at 0
    pub fn new(breakpoints: Vec<u8>) -> Result<Self, AlignmentError> {
        let last = *breakpoints.last().ok_or(AlignmentError::EmptyBreakpoints)?;
        if let Some((&previous, &next)) = breakpoints.iter().tuple_windows().find(|(p, n)| p <= n) {
            return Err(AlignmentError::UnsortedBreakpoints { previous, next });
        }
        if last != 0 {
            return Err(AlignmentError::MissingZeroBreakpoint(last));
        }
        Ok(Self(breakpoints))
    }

    pub fn values(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
