
use anyhow::Context;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::correctness::classify_alignments;
use crate::util::json_io::{load_json, resolve_stored_path, save_json};

/// Chromosome code for a read that was never placed (default, untouched slot)
pub const CHROM_UNKNOWN: i8 = 0;
/// Chromosome code for a read the aligner explicitly reported as unmapped
pub const CHROM_UNMAPPED: i8 = -1;
/// Chromosome code for X
pub const CHROM_X: i8 = 23;
/// Chromosome code for Y
pub const CHROM_Y: i8 = 24;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AlignmentError {
    #[error("field {field} has length {found}, expected {expected}")]
    ShapeMismatch { field: &'static str, expected: usize, found: usize },
    #[error("read index {index} is out of range for {len} reads")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("unknown read category: {0:?}")]
    UnknownCategory(String),
    #[error("alignments have not been classified against a truth set")]
    Unclassified,
    #[error("no candidate named {0:?}")]
    UnknownCandidate(String),
    #[error("MAPQ breakpoints must not be empty")]
    EmptyBreakpoints,
    #[error("MAPQ breakpoints must be strictly descending, found {previous} followed by {next}")]
    UnsortedBreakpoints { previous: u8, next: u8 },
    #[error("MAPQ breakpoints must end at 0, last value is {0}")]
    MissingZeroBreakpoint(u8),
    #[error("read key {0} occurs more than once")]
    DuplicateReadKey(String),
    #[error("read key {0} is missing from one of the alignment sets")]
    MissingReadKey(String),
    #[error("{0} alignments were stored without read names, re-run `store --canonical-order` on every input")]
    MissingReadNames(&'static str),
}

/// Structured view of a single read, see `AlignmentSet::get(...)`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AlignmentView {
    pub chromosome: i8,
    pub position: i64,
    /// None when the source format has no alignment scores
    pub score: Option<u32>,
    pub mapq: u8,
    pub n_variants: u32,
    /// None until the set has been classified
    pub is_correct: Option<bool>,
}

/// Capability set shared by every alignment-set backing.
/// Index `i` must refer to the same underlying read in every set that gets compared; nothing here can verify that
/// beyond equal lengths, so mis-ordered inputs silently produce wrong metrics.
pub trait Alignments {
    /// Number of read slots
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn chromosome(&self, index: usize) -> i8;
    fn position(&self, index: usize) -> i64;
    fn mapq(&self, index: usize) -> u8;
    fn score(&self, index: usize) -> Option<u32>;
    fn n_variants(&self, index: usize) -> u32;

    /// Correctness of read `index`, None if the set is unclassified
    fn correctness(&self, index: usize) -> Option<bool>;

    /// True if a full-length correctness vector is present
    fn is_classified(&self) -> bool;

    /// Stores the output of classification.
    /// # Arguments
    /// * `is_correct` - per-read correctness flags, must match `len()`
    /// * `n_variants` - per-read variant counts copied from the truth set, must match `len()`
    /// # Errors
    /// * if either vector has the wrong length
    fn store_classification(&mut self, is_correct: Vec<bool>, n_variants: Vec<u32>) -> Result<(), AlignmentError>;

    /// Classifies every read relative to `truth`, see `correctness::classify_alignments(...)`.
    /// Returns true if classification was computed, false if a cached result was kept.
    fn classify<T: Alignments + ?Sized>(&mut self, truth: &T, allowed_mismatch: u64, force: bool) -> Result<bool, AlignmentError>
    where Self: Sized {
        classify_alignments(truth, self, allowed_mismatch, force)
    }
}

/// Columnar alignment set indexed by a dense read identifier.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AlignmentSet {
    /// Chromosome codes; 0 = untouched, -1 = unmapped, 23 = X, 24 = Y
    chromosomes: Vec<i8>,
    /// Signed so that position deltas can be computed directly
    positions: Vec<i64>,
    /// Alignment scores if the source format provides them
    scores: Option<Vec<u32>>,
    /// Mapping qualities
    mapqs: Vec<u8>,
    /// Number of known variants overlapping each read
    n_variants: Vec<u32>,
    /// Correctness relative to a truth set; None until classified
    is_correct: Option<Vec<bool>>,
    /// Read names in slot order, only kept for canonically ordered sets
    read_names: Option<Vec<String>>,
}

/// On-disk columnar layout; `is_correct` is empty when unset
#[derive(Deserialize, Serialize)]
struct StoredAlignments {
    chromosomes: Vec<i8>,
    positions: Vec<i64>,
    scores: Option<Vec<u32>>,
    mapqs: Vec<u8>,
    n_variants: Vec<u32>,
    #[serde(default)]
    is_correct: Vec<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    read_names: Option<Vec<String>>,
}

impl AlignmentSet {
    /// Constructor from parallel columns.
    /// An empty `is_correct` is treated the same as None.
    /// # Arguments
    /// * `chromosomes` - the chromosome codes, defines the read count
    /// * `positions` - aligned positions
    /// * `n_variants` - variant overlap counts
    /// * `scores` - optional alignment scores
    /// * `mapqs` - mapping qualities
    /// * `is_correct` - optional correctness flags
    /// # Errors
    /// * `ShapeMismatch` if any provided column length differs from `chromosomes.len()`
    pub fn new(
        chromosomes: Vec<i8>, positions: Vec<i64>, n_variants: Vec<u32>,
        scores: Option<Vec<u32>>, mapqs: Vec<u8>, is_correct: Option<Vec<bool>>
    ) -> Result<Self, AlignmentError> {
        let expected = chromosomes.len();
        check_length("positions", expected, positions.len())?;
        check_length("n_variants", expected, n_variants.len())?;
        check_length("mapqs", expected, mapqs.len())?;
        if let Some(s) = scores.as_ref() {
            check_length("scores", expected, s.len())?;
        }

        let is_correct = match is_correct {
            Some(ic) if ic.is_empty() => None,
            Some(ic) => {
                check_length("is_correct", expected, ic.len())?;
                Some(ic)
            },
            None => None
        };

        Ok(Self {
            chromosomes, positions, scores, mapqs, n_variants, is_correct,
            read_names: None
        })
    }

    /// Attaches the read name of every slot
    /// # Errors
    /// * `ShapeMismatch` if `read_names` does not have one entry per slot
    pub fn with_read_names(mut self, read_names: Vec<String>) -> Result<Self, AlignmentError> {
        check_length("read_names", self.len(), read_names.len())?;
        self.read_names = Some(read_names);
        Ok(self)
    }

    /// Creates `n` zero-initialized slots, which is the state ingestion starts from.
    /// # Arguments
    /// * `n` - number of read slots
    /// * `has_scores` - if false, scores are marked as unavailable for this set
    pub fn zeroed(n: usize, has_scores: bool) -> Self {
        Self {
            chromosomes: vec![CHROM_UNKNOWN; n],
            positions: vec![0; n],
            scores: if has_scores { Some(vec![0; n]) } else { None },
            mapqs: vec![0; n],
            n_variants: vec![0; n],
            is_correct: None,
            read_names: None
        }
    }

    /// Returns a structured view of read `index`
    /// # Errors
    /// * `IndexOutOfRange` if `index >= len()`
    pub fn get(&self, index: usize) -> Result<AlignmentView, AlignmentError> {
        if index >= self.len() {
            return Err(AlignmentError::IndexOutOfRange { index, len: self.len() });
        }
        Ok(AlignmentView {
            chromosome: self.chromosomes[index],
            position: self.positions[index],
            score: self.scores.as_ref().map(|s| s[index]),
            mapq: self.mapqs[index],
            n_variants: self.n_variants[index],
            is_correct: self.is_correct.as_ref().map(|ic| ic[index])
        })
    }

    /// Writes one read into its slot. Fields left as None keep their current value.
    /// # Errors
    /// * `IndexOutOfRange` if `index >= len()`
    pub fn place(
        &mut self, index: usize, chromosome: i8, position: i64,
        mapq: Option<u8>, score: Option<u32>, n_variants: Option<u32>
    ) -> Result<(), AlignmentError> {
        if index >= self.len() {
            return Err(AlignmentError::IndexOutOfRange { index, len: self.len() });
        }
        self.chromosomes[index] = chromosome;
        self.positions[index] = position;
        if let Some(m) = mapq {
            self.mapqs[index] = m;
        }
        if let (Some(s), Some(scores)) = (score, self.scores.as_mut()) {
            scores[index] = s;
        }
        if let Some(nv) = n_variants {
            self.n_variants[index] = nv;
        }
        Ok(())
    }

    /// Saves all columns to a JSON container (gzip if the path ends in .gz).
    /// An unset `is_correct` is written as an empty list.
    pub fn save(&self, filename: &Path) -> anyhow::Result<()> {
        info!("Saving {} alignments to {filename:?}...", self.len());
        let stored = StoredAlignments {
            chromosomes: self.chromosomes.clone(),
            positions: self.positions.clone(),
            scores: self.scores.clone(),
            mapqs: self.mapqs.clone(),
            n_variants: self.n_variants.clone(),
            is_correct: self.is_correct.clone().unwrap_or_default(),
            read_names: self.read_names.clone()
        };
        save_json(&stored, filename)
    }

    /// Loads a set written by `save(...)`. If `filename` does not exist, `.json` and `.json.gz` are tried.
    /// An empty stored `is_correct` loads as unclassified.
    pub fn load(filename: &Path) -> anyhow::Result<Self> {
        let full_path = resolve_stored_path(filename)?;
        let stored: StoredAlignments = load_json(&full_path)?;
        let mut alignments = Self::new(
            stored.chromosomes, stored.positions, stored.n_variants,
            stored.scores, stored.mapqs, Some(stored.is_correct)
        ).with_context(|| format!("Malformed alignment columns in {full_path:?}"))?;
        if let Some(read_names) = stored.read_names {
            alignments = alignments.with_read_names(read_names)
                .with_context(|| format!("Malformed read names in {full_path:?}"))?;
        }
        info!("Loaded {} alignments from {full_path:?}", alignments.len());
        Ok(alignments)
    }

    // getters
    pub fn chromosomes(&self) -> &[i8] {
        &self.chromosomes
    }

    pub fn positions(&self) -> &[i64] {
        &self.positions
    }

    pub fn scores(&self) -> Option<&[u32]> {
        self.scores.as_deref()
    }

    pub fn mapqs(&self) -> &[u8] {
        &self.mapqs
    }

    pub fn n_variants_column(&self) -> &[u32] {
        &self.n_variants
    }

    pub fn is_correct(&self) -> Option<&[bool]> {
        self.is_correct.as_deref()
    }

    pub fn read_names(&self) -> Option<&[String]> {
        self.read_names.as_deref()
    }
}

impl Alignments for AlignmentSet {
    fn len(&self) -> usize {
        self.chromosomes.len()
    }

    fn chromosome(&self, index: usize) -> i8 {
        self.chromosomes[index]
    }

    fn position(&self, index: usize) -> i64 {
        self.positions[index]
    }

    fn mapq(&self, index: usize) -> u8 {
        self.mapqs[index]
    }

    fn score(&self, index: usize) -> Option<u32> {
        self.scores.as_ref().map(|s| s[index])
    }

    fn n_variants(&self, index: usize) -> u32 {
        self.n_variants[index]
    }

    fn correctness(&self, index: usize) -> Option<bool> {
        self.is_correct.as_ref().map(|ic| ic[index])
    }

    fn is_classified(&self) -> bool {
        self.is_correct.as_ref()
            .map(|ic| !ic.is_empty() && ic.len() == self.len())
            .unwrap_or(false)
    }

    fn store_classification(&mut self, is_correct: Vec<bool>, n_variants: Vec<u32>) -> Result<(), AlignmentError> {
        check_length("is_correct", self.len(), is_correct.len())?;
        check_length("n_variants", self.len(), n_variants.len())?;
        self.is_correct = Some(is_correct);
        self.n_variants = n_variants;
        Ok(())
    }
}

/// Shared length check for the columns
pub(crate) fn check_length(field: &'static str, expected: usize, found: usize) -> Result<(), AlignmentError> {
    if expected != found {
        Err(AlignmentError::ShapeMismatch { field, expected, found })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_set() -> AlignmentSet {
        AlignmentSet::new(
            vec![1, 23, -1],
            vec![100, 2000, 0],
            vec![0, 2, 0],
            Some(vec![150, 120, 0]),
            vec![60, 12, 0],
            None
        ).unwrap()
    }

    fn temp_path(label: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("mapq_eval_{label}_{}.json", std::process::id()))
    }

    #[test]
    fn test_shape_mismatch() {
        let result = AlignmentSet::new(
            vec![1, 1], vec![100], vec![0, 0], None, vec![0, 0], None
        );
        assert_eq!(result, Err(AlignmentError::ShapeMismatch { field: "positions", expected: 2, found: 1 }));

        let result = AlignmentSet::new(
            vec![1, 1], vec![100, 200], vec![0, 0], Some(vec![1, 2, 3]), vec![0, 0], None
        );
        assert_eq!(result, Err(AlignmentError::ShapeMismatch { field: "scores", expected: 2, found: 3 }));

        let result = AlignmentSet::new(
            vec![1, 1], vec![100, 200], vec![0, 0], None, vec![0, 0], Some(vec![true])
        );
        assert_eq!(result, Err(AlignmentError::ShapeMismatch { field: "is_correct", expected: 2, found: 1 }));
    }

    #[test]
    fn test_empty_is_correct_is_unset() {
        let alignments = AlignmentSet::new(
            vec![1], vec![100], vec![0], None, vec![0], Some(vec![])
        ).unwrap();
        assert!(alignments.is_correct().is_none());
        assert!(!alignments.is_classified());
    }

    #[test]
    fn test_get() {
        let alignments = example_set();
        assert_eq!(alignments.get(1).unwrap(), AlignmentView {
            chromosome: 23, position: 2000, score: Some(120), mapq: 12, n_variants: 2, is_correct: None
        });
        assert_eq!(alignments.get(3), Err(AlignmentError::IndexOutOfRange { index: 3, len: 3 }));
    }

    #[test]
    fn test_place() {
        let mut alignments = AlignmentSet::zeroed(4, false);
        alignments.place(2, 5, 12345, Some(40), Some(99), Some(1)).unwrap();
        let view = alignments.get(2).unwrap();
        assert_eq!(view.chromosome, 5);
        assert_eq!(view.position, 12345);
        assert_eq!(view.mapq, 40);
        assert_eq!(view.score, None); // scores are not available for this set
        assert_eq!(view.n_variants, 1);

        // untouched slots stay at the default
        assert_eq!(alignments.get(0).unwrap().chromosome, CHROM_UNKNOWN);
        assert!(alignments.place(4, 1, 1, None, None, None).is_err());
    }

    #[test]
    fn test_save_load_unclassified() {
        let alignments = example_set();
        let filename = temp_path("unclassified");
        alignments.save(&filename).unwrap();
        let loaded = AlignmentSet::load(&filename).unwrap();
        std::fs::remove_file(&filename).unwrap();
        assert_eq!(loaded, alignments);
        assert!(loaded.is_correct().is_none());
    }

    #[test]
    fn test_read_names_persist() {
        let alignments = example_set()
            .with_read_names(vec!["a/1".to_string(), "a/2".to_string(), "b".to_string()])
            .unwrap();
        let filename = temp_path("named");
        alignments.save(&filename).unwrap();
        let loaded = AlignmentSet::load(&filename).unwrap();
        std::fs::remove_file(&filename).unwrap();
        assert_eq!(loaded.read_names(), Some(&["a/1".to_string(), "a/2".to_string(), "b".to_string()][..]));

        assert_eq!(
            example_set().with_read_names(vec!["a".to_string()]),
            Err(AlignmentError::ShapeMismatch { field: "read_names", expected: 3, found: 1 })
        );
    }

    #[test]
    fn test_save_load_classified_gz() {
        let mut alignments = example_set();
        alignments.store_classification(vec![true, false, false], vec![0, 3, 0]).unwrap();
        let filename = std::env::temp_dir().join(format!("mapq_eval_classified_{}.json.gz", std::process::id()));
        alignments.save(&filename).unwrap();

        // the extension fallback should find the .json.gz file
        let stem = std::env::temp_dir().join(format!("mapq_eval_classified_{}", std::process::id()));
        let loaded = AlignmentSet::load(&stem).unwrap();
        std::fs::remove_file(&filename).unwrap();
        assert_eq!(loaded, alignments);
        assert_eq!(loaded.is_correct(), Some(&[true, false, false][..]));
        assert_eq!(loaded.n_variants_column(), &[0, 3, 0]);
    }

    #[test]
    fn test_store_classification_length() {
        let mut alignments = example_set();
        assert!(alignments.store_classification(vec![true], vec![0, 0, 0]).is_err());
        assert!(alignments.store_classification(vec![true, true, true], vec![0]).is_err());
        assert!(!alignments.is_classified());
    }
}
