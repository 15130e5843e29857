
use log::debug;
use rustc_hash::FxHashMap as HashMap;

use crate::data_types::alignment_set::{check_length, AlignmentError, AlignmentSet, Alignments};
use crate::parsing::read_identity::ReadKey;

/// A single alignment that carries its own read identity
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyedRecord {
    /// Canonical identity of the read
    key: ReadKey,
    chromosome: i8,
    position: i64,
    mapq: u8,
    score: Option<u32>,
    n_variants: u32,
    /// Correctness relative to truth, None until classified
    is_correct: Option<bool>,
}

impl KeyedRecord {
    /// Constructor
    pub fn new(key: ReadKey, chromosome: i8, position: i64, mapq: u8, score: Option<u32>, n_variants: u32) -> Self {
        Self {
            key, chromosome, position, mapq, score, n_variants,
            is_correct: None
        }
    }

    pub fn key(&self) -> &ReadKey {
        &self.key
    }
}

/// Record-backed alignment set, used when read names cannot be turned into dense identifiers.
/// Slot order is the record order, so sets must be put into a common order (`sort_canonical` or `align_to`) before
/// they are compared.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyedAlignmentSet {
    records: Vec<KeyedRecord>,
    /// Set once every record carries a correctness flag
    classified: bool,
}

impl KeyedAlignmentSet {
    /// Constructor
    /// # Errors
    /// * `DuplicateReadKey` if two records share a key
    pub fn new(records: Vec<KeyedRecord>) -> Result<Self, AlignmentError> {
        {
            let mut seen: HashMap<&ReadKey, usize> = Default::default();
            for (i, record) in records.iter().enumerate() {
                if seen.insert(&record.key, i).is_some() {
                    return Err(AlignmentError::DuplicateReadKey(record.key.to_string()));
                }
            }
        }
        let classified = !records.is_empty() && records.iter().all(|r| r.is_correct.is_some());
        Ok(Self {
            records, classified
        })
    }

    /// Sorts the records by (base name, mate)
    pub fn sort_canonical(&mut self) {
        debug!("Sorting {} keyed records into canonical order", self.records.len());
        self.records.sort_by(|a, b| a.key.cmp(&b.key));
    }

    /// Re-orders these records to match the key order of `reference`.
    /// # Errors
    /// * `ShapeMismatch` if the sets differ in size
    /// * `MissingReadKey` if a reference key is not present here
    pub fn align_to(self, reference: &Self) -> Result<Self, AlignmentError> {
        check_length("records", reference.len(), self.len())?;
        let classified = self.classified;
        let mut lookup: HashMap<ReadKey, KeyedRecord> = self.records.into_iter()
            .map(|r| (r.key.clone(), r))
            .collect();

        let records = reference.records.iter()
            .map(|r| {
                lookup.remove(&r.key)
                    .ok_or_else(|| AlignmentError::MissingReadKey(r.key.to_string()))
            })
            .collect::<Result<Vec<KeyedRecord>, AlignmentError>>()?;
        Ok(Self {
            records, classified
        })
    }

    /// Rebuilds the keyed form of a columnar set that was stored with read names
    /// # Errors
    /// * `MissingReadNames` if `alignments` has no read names
    /// * `DuplicateReadKey` if a name occurs twice
    pub fn from_alignment_set(alignments: &AlignmentSet, label: &'static str) -> Result<Self, AlignmentError> {
        let read_names = alignments.read_names()
            .ok_or(AlignmentError::MissingReadNames(label))?;
        let records: Vec<KeyedRecord> = read_names.iter().enumerate()
            .map(|(i, name)| KeyedRecord {
                key: ReadKey::from_name(name),
                chromosome: alignments.chromosome(i),
                position: alignments.position(i),
                mapq: alignments.mapq(i),
                score: alignments.score(i),
                n_variants: alignments.n_variants(i),
                is_correct: alignments.correctness(i)
            })
            .collect();
        Self::new(records)
    }

    /// Converts into the columnar form, slot `i` being record `i`.
    /// The read keys are kept as the `read_names` column.
    pub fn to_alignment_set(&self) -> Result<AlignmentSet, AlignmentError> {
        let has_scores = self.records.iter().all(|r| r.score.is_some());
        let scores = if has_scores {
            Some(self.records.iter().filter_map(|r| r.score).collect())
        } else {
            None
        };
        let is_correct = if self.classified {
            Some(self.records.iter().map(|r| r.is_correct.unwrap_or(false)).collect())
        } else {
            None
        };
        AlignmentSet::new(
            self.records.iter().map(|r| r.chromosome).collect(),
            self.records.iter().map(|r| r.position).collect(),
            self.records.iter().map(|r| r.n_variants).collect(),
            scores,
            self.records.iter().map(|r| r.mapq).collect(),
            is_correct
        )?.with_read_names(self.records.iter().map(|r| r.key.to_string()).collect())
    }

    pub fn records(&self) -> &[KeyedRecord] {
        &self.records
    }
}

impl Alignments for KeyedAlignmentSet {
    fn len(&self) -> usize {
        self.records.len()
    }

    fn chromosome(&self, index: usize) -> i8 {
        self.records[index].chromosome
    }

    fn position(&self, index: usize) -> i64 {
        self.records[index].position
    }

    fn mapq(&self, index: usize) -> u8 {
        self.records[index].mapq
    }

    fn score(&self, index: usize) -> Option<u32> {
        self.records[index].score
    }

    fn n_variants(&self, index: usize) -> u32 {
        self.records[index].n_variants
    }

    fn correctness(&self, index: usize) -> Option<bool> {
        self.records[index].is_correct
    }

    fn is_classified(&self) -> bool {
        self.classified
    }

    fn store_classification(&mut self, is_correct: Vec<bool>, n_variants: Vec<u32>) -> Result<(), AlignmentError> {
        check_length("is_correct", self.len(), is_correct.len())?;
        check_length("n_variants", self.len(), n_variants.len())?;
        for ((record, c), nv) in self.records.iter_mut().zip(is_correct).zip(n_variants) {
            record.is_correct = Some(c);
            record.n_variants = nv;
        }
        self.classified = !self.records.is_empty();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, chromosome: i8, position: i64, mapq: u8, n_variants: u32) -> KeyedRecord {
        KeyedRecord::new(ReadKey::from_name(name), chromosome, position, mapq, None, n_variants)
    }

    #[test]
    fn test_duplicate_key() {
        let result = KeyedAlignmentSet::new(vec![
            record("r1", 1, 10, 60, 0),
            record("r1", 1, 20, 60, 0),
        ]);
        assert_eq!(result, Err(AlignmentError::DuplicateReadKey("r1".to_string())));
    }

    #[test]
    fn test_sort_canonical() {
        let mut keyed = KeyedAlignmentSet::new(vec![
            record("r2/1", 1, 30, 60, 0),
            record("r1/2", 1, 20, 60, 0),
            record("r1/1", 1, 10, 60, 0),
        ]).unwrap();
        keyed.sort_canonical();
        let positions: Vec<i64> = (0..keyed.len()).map(|i| keyed.position(i)).collect();
        assert_eq!(positions, vec![10, 20, 30]);
    }

    #[test]
    fn test_align_and_classify() {
        let truth = KeyedAlignmentSet::new(vec![
            record("readA", 1, 100, 0, 1),
            record("readB", 2, 500, 0, 0),
            record("readC", 3, 900, 0, 0),
        ]).unwrap();

        // candidate arrives in a different order with one misplaced read
        let candidate = KeyedAlignmentSet::new(vec![
            record("readC", 3, 905, 30, 0),
            record("readA", 1, 104, 60, 0),
            record("readB", 2, 5000, 10, 0),
        ]).unwrap();

        let mut aligned = candidate.align_to(&truth).unwrap();
        assert!(aligned.classify(&truth, 10, false).unwrap());
        let flags: Vec<Option<bool>> = (0..aligned.len()).map(|i| aligned.correctness(i)).collect();
        assert_eq!(flags, vec![Some(true), Some(false), Some(true)]);
        assert_eq!(aligned.n_variants(0), 1);
        assert!(aligned.is_classified());

        // columnar conversion preserves the classification
        let columnar = aligned.to_alignment_set().unwrap();
        assert_eq!(columnar.is_correct(), Some(&[true, false, true][..]));
        assert_eq!(columnar.mapqs(), &[60, 10, 30]);
        assert!(columnar.scores().is_none());

        // and the names, so the keyed form can be rebuilt
        let rebuilt = KeyedAlignmentSet::from_alignment_set(&columnar, "candidate").unwrap();
        assert_eq!(rebuilt, aligned);
    }

    #[test]
    fn test_from_unnamed_set() {
        let unnamed = AlignmentSet::zeroed(2, false);
        assert_eq!(
            KeyedAlignmentSet::from_alignment_set(&unnamed, "truth"),
            Err(AlignmentError::MissingReadNames("truth"))
        );
    }

    #[test]
    fn test_align_missing_key() {
        let truth = KeyedAlignmentSet::new(vec![record("a", 1, 1, 0, 0), record("b", 1, 2, 0, 0)]).unwrap();
        let candidate = KeyedAlignmentSet::new(vec![record("a", 1, 1, 0, 0), record("c", 1, 2, 0, 0)]).unwrap();
        assert_eq!(candidate.align_to(&truth), Err(AlignmentError::MissingReadKey("b".to_string())));

        let short = KeyedAlignmentSet::new(vec![record("a", 1, 1, 0, 0)]).unwrap();
        assert!(short.align_to(&truth).is_err());
    }
}
