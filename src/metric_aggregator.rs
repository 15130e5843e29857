
use derive_builder::Builder;
use indexmap::IndexMap;
use indicatif::ParallelProgressIterator;
use log::{debug, error, info, warn};
use rayon::prelude::*;

use crate::correctness::{classify_alignments, DEFAULT_ALLOWED_MISMATCH};
use crate::data_types::alignment_set::{AlignmentError, AlignmentSet, Alignments};
use crate::data_types::keyed_alignments::KeyedAlignmentSet;
use crate::data_types::mapq_breakpoints::MapqBreakpoints;
use crate::data_types::read_category::ReadCategory;
use crate::data_types::read_counts::{CorrectRate, ReadCounts};
use crate::data_types::roc_curve::{CategoryCurves, RocCurve};
use crate::util::progress_bar::get_progress_style;

/// Upper bound of the first MAPQ bucket; every u8 MAPQ is below it
const FIRST_UPPER_LIMIT: u16 = 256;

/// Default MAPQ cutoff for `discordant_reads(...)`
pub const DEFAULT_DISCORDANT_MIN_MAPQ: u8 = 30;

/// Controls classification and the MAPQ sweep
#[derive(Builder, Clone, Debug)]
#[builder(default)]
pub struct EvaluationConfig {
    /// Maximum absolute position difference (bp) that still counts as correct
    allowed_mismatch: u64,
    /// Descending MAPQ cutoffs for the ROC sweep
    mapq_breakpoints: MapqBreakpoints,
    /// if True, candidates are re-classified even if correctness is already stored
    force_classification: bool,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            allowed_mismatch: DEFAULT_ALLOWED_MISMATCH,
            mapq_breakpoints: MapqBreakpoints::default(),
            force_classification: false
        }
    }
}

impl EvaluationConfig {
    // getters
    pub fn allowed_mismatch(&self) -> u64 {
        self.allowed_mismatch
    }

    pub fn mapq_breakpoints(&self) -> &MapqBreakpoints {
        &self.mapq_breakpoints
    }

    pub fn force_classification(&self) -> bool {
        self.force_classification
    }
}

/// Number of reads in `category`, based on the candidate's own (truth-copied) variant counts
fn category_total<A: Alignments + ?Sized>(alignments: &A, category: ReadCategory) -> u64 {
    (0..alignments.len())
        .filter(|&i| category.includes(alignments.n_variants(i)))
        .count() as u64
}

/// Tallies the reads in `category` with `lower <= mapq < upper`
fn bucket_counts<A: Alignments + ?Sized>(alignments: &A, category: ReadCategory, lower: u16, upper: u16) -> Result<ReadCounts, AlignmentError> {
    let mut counts = ReadCounts::default();
    for i in 0..alignments.len() {
        let mapq = alignments.mapq(i) as u16;
        if mapq >= lower && mapq < upper && category.includes(alignments.n_variants(i)) {
            let is_correct = alignments.correctness(i).ok_or(AlignmentError::Unclassified)?;
            counts.add_read(is_correct);
        }
    }
    Ok(counts)
}

/// Sweeps the MAPQ breakpoints from high to low and accumulates the recall / precision-complement series.
/// # Arguments
/// * `alignments` - a classified candidate
/// * `category` - the read filter
/// * `breakpoints` - descending MAPQ cutoffs
/// # Errors
/// * `Unclassified` if the candidate has no correctness flags
pub fn compute_roc_curve<A: Alignments + ?Sized>(alignments: &A, category: ReadCategory, breakpoints: &MapqBreakpoints) -> Result<RocCurve, AlignmentError> {
    if !alignments.is_classified() {
        return Err(AlignmentError::Unclassified);
    }

    let total = category_total(alignments, category);
    if total == 0 {
        warn!("No reads in category {category}, recall will be reported as 0");
    }

    let mut curve = RocCurve::new(total);
    let mut cumulative = ReadCounts::default();
    let mut upper_limit = FIRST_UPPER_LIMIT;
    for &mapq in breakpoints.values() {
        let lower_limit = mapq as u16;
        let bucket = bucket_counts(alignments, category, lower_limit, upper_limit)?;
        debug!("N with mapq >= {lower_limit} and < {upper_limit}: {} ({} correct)", bucket.selected(), bucket.correct);

        cumulative += bucket;
        curve.push_point(mapq, cumulative);
        upper_limit = lower_limit;
    }
    Ok(curve)
}

/// Computes the (recall, 1-precision) pair over reads with `mapq >= min_mapq`.
/// An empty selection gives (0, 0), see `CorrectRate::from_counts(...)`.
/// # Errors
/// * `Unclassified` if the candidate has no correctness flags
pub fn compute_rate<A: Alignments + ?Sized>(alignments: &A, category: ReadCategory, min_mapq: u8) -> Result<CorrectRate, AlignmentError> {
    if !alignments.is_classified() {
        return Err(AlignmentError::Unclassified);
    }
    let total = category_total(alignments, category);
    let counts = bucket_counts(alignments, category, min_mapq as u16, FIRST_UPPER_LIMIT)?;
    Ok(CorrectRate::from_counts(counts, total))
}

/// Stateless driver that applies one `EvaluationConfig` to a truth set and a collection of named candidates
#[derive(Clone, Debug, Default)]
pub struct MetricAggregator {
    config: EvaluationConfig,
}

impl MetricAggregator {
    /// Constructor
    pub fn new(config: EvaluationConfig) -> Self {
        Self {
            config
        }
    }

    /// Puts every candidate into the slot order of `truth` by read name.
    /// Sets stored without read names are left in place when `truth` has none either.
    /// Candidates that cannot be aligned are logged, removed from `candidates`, and their names returned.
    /// # Errors
    /// * `DuplicateReadKey` if the truth read names are not unique
    pub fn align_candidates(&self, truth: &AlignmentSet, candidates: &mut IndexMap<String, AlignmentSet>) -> Result<Vec<String>, AlignmentError> {
        let keyed_truth = match truth.read_names() {
            Some(_) => Some(KeyedAlignmentSet::from_alignment_set(truth, "truth")?),
            None => None
        };

        let mut failed = vec![];
        let mut aligned: IndexMap<String, AlignmentSet> = Default::default();
        for (name, candidate) in std::mem::take(candidates).into_iter() {
            let outcome = match (keyed_truth.as_ref(), candidate.read_names().is_some()) {
                (None, false) => Ok(candidate),
                (None, true) => Err(AlignmentError::MissingReadNames("truth")),
                (Some(reference), _) => {
                    debug!("Aligning {name} to the truth read order");
                    KeyedAlignmentSet::from_alignment_set(&candidate, "candidate")
                        .and_then(|keyed| keyed.align_to(reference))
                        .and_then(|keyed| keyed.to_alignment_set())
                }
            };
            match outcome {
                Ok(c) => {
                    aligned.insert(name, c);
                },
                Err(e) => {
                    error!("Error while aligning {name} to the truth reads: {e}");
                    failed.push(name);
                }
            }
        }
        *candidates = aligned;
        Ok(failed)
    }

    /// Classifies every candidate against `truth` in parallel; each candidate only mutates itself.
    /// Candidates that fail are logged and removed from `candidates`, so any correctness they were loaded with
    /// never reaches the curves. Returns their names.
    /// # Arguments
    /// * `truth` - the truth alignments, shared read-only
    /// * `candidates` - named candidate alignments
    pub fn classify_candidates<T, C>(&self, truth: &T, candidates: &mut IndexMap<String, C>) -> Vec<String>
    where
        T: Alignments + Sync + ?Sized,
        C: Alignments + Send
    {
        let allowed_mismatch = self.config.allowed_mismatch;
        let force = self.config.force_classification;
        let style = get_progress_style();

        let outcomes: Vec<(String, Result<bool, AlignmentError>)> = candidates.iter_mut()
            .collect::<Vec<(&String, &mut C)>>()
            .into_par_iter()
            .map(|(name, candidate)| {
                info!("Setting correctness for {name}");
                let outcome = classify_alignments(truth, candidate, allowed_mismatch, force);
                (name.clone(), outcome)
            })
            .progress_with_style(style)
            .collect();

        let mut failed = vec![];
        for (name, outcome) in outcomes.into_iter() {
            if let Err(e) = outcome {
                let found = candidates.shift_remove(&name).map(|c| c.len()).unwrap_or_default();
                error!("Error while classifying {name} ({found} reads vs. {} truth reads): {e}", truth.len());
                failed.push(name);
            }
        }
        failed
    }

    /// Computes the ROC curve of every candidate for one category.
    /// Candidates that cannot be evaluated are reported in `failed` and do not affect the others.
    /// # Arguments
    /// * `candidates` - named, classified candidate alignments
    /// * `category` - the read filter
    pub fn compute_curves<C: Alignments>(&self, candidates: &IndexMap<String, C>, category: ReadCategory) -> CategoryCurves {
        let breakpoints = &self.config.mapq_breakpoints;
        let mut category_curves = CategoryCurves {
            category,
            breakpoints: breakpoints.values().to_vec(),
            ..Default::default()
        };

        for (name, candidate) in candidates.iter() {
            info!("Processing {name} for category {category}");
            match compute_roc_curve(candidate, category, breakpoints) {
                Ok(curve) => {
                    let counts = curve.final_counts();
                    info!("\t{name}: {} correct, {} wrong, {} in category", counts.correct, counts.wrong, curve.total());
                    category_curves.curves.insert(name.clone(), curve);
                },
                Err(e) => {
                    error!("Error while computing {category} curve for {name} ({} reads): {e}", candidate.len());
                    category_curves.failed.push(name.clone());
                }
            }
        }
        category_curves
    }

    /// Computes a single (recall, 1-precision) pair per candidate over reads with `mapq >= min_mapq`.
    /// Empty selections are recovered as (0, 0) with a warning; unclassified candidates are skipped with an error.
    pub fn rates_at_threshold<C: Alignments>(&self, candidates: &IndexMap<String, C>, category: ReadCategory, min_mapq: u8) -> IndexMap<String, CorrectRate> {
        candidates.iter()
            .filter_map(|(name, candidate)| {
                match compute_rate(candidate, category, min_mapq) {
                    Ok(rate) => {
                        if rate.is_empty_selection() {
                            warn!("No {category} reads with mapq >= {min_mapq} for {name} ({} in category), reporting (0, 0)", rate.total);
                        }
                        Some((name.clone(), rate))
                    },
                    Err(e) => {
                        error!("Error while computing rates for {name}: {e}");
                        None
                    }
                }
            })
            .collect()
    }

    /// Returns the reads that `wrong_by` placed incorrectly with `mapq >= min_mapq` while `correct_by` placed them correctly.
    /// # Errors
    /// * `UnknownCandidate` if either name is missing
    /// * `ShapeMismatch` if the candidates differ in length
    /// * `Unclassified` if either candidate has no correctness flags
    pub fn discordant_reads<C: Alignments>(&self, candidates: &IndexMap<String, C>, wrong_by: &str, correct_by: &str, min_mapq: u8) -> Result<Vec<usize>, AlignmentError> {
        let wrong = candidates.get(wrong_by)
            .ok_or_else(|| AlignmentError::UnknownCandidate(wrong_by.to_string()))?;
        let correct = candidates.get(correct_by)
            .ok_or_else(|| AlignmentError::UnknownCandidate(correct_by.to_string()))?;
        if wrong.len() != correct.len() {
            return Err(AlignmentError::ShapeMismatch { field: "candidate", expected: wrong.len(), found: correct.len() });
        }
        if !wrong.is_classified() || !correct.is_classified() {
            return Err(AlignmentError::Unclassified);
        }

        let selection: Vec<usize> = (0..wrong.len())
            .filter(|&i| {
                wrong.mapq(i) >= min_mapq &&
                    wrong.correctness(i) == Some(false) &&
                    correct.correctness(i) == Some(true)
            })
            .collect();
        info!("{} reads wrong by {wrong_by} (mapq >= {min_mapq}) and correct by {correct_by}", selection.len());
        Ok(selection)
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;
    use crate::data_types::alignment_set::AlignmentSet;

    fn truth_set(positions: Vec<i64>, n_variants: Vec<u32>) -> AlignmentSet {
        let n = positions.len();
        AlignmentSet::new(vec![1; n], positions, n_variants, None, vec![0; n], None).unwrap()
    }

    fn candidate_set(positions: Vec<i64>, mapqs: Vec<u8>) -> AlignmentSet {
        let n = positions.len();
        AlignmentSet::new(vec![1; n], positions, vec![0; n], Some(vec![0; n]), mapqs, None).unwrap()
    }

    fn scenario_aggregator() -> MetricAggregator {
        let config = EvaluationConfigBuilder::default()
            .allowed_mismatch(10)
            .mapq_breakpoints(MapqBreakpoints::new(vec![60, 40, 10, 0]).unwrap())
            .build()
            .unwrap();
        MetricAggregator::new(config)
    }

    #[test]
    fn test_end_to_end_scenario() {
        let truth = truth_set(vec![100, 200, 300, 400], vec![0; 4]);
        let mut candidates: IndexMap<String, AlignmentSet> = [
            ("mapper".to_string(), candidate_set(vec![100, 205, 500, 400], vec![60, 40, 40, 10]))
        ].into_iter().collect();

        let aggregator = scenario_aggregator();
        assert!(aggregator.classify_candidates(&truth, &mut candidates).is_empty());
        // 205 is within 10 bp of 200
        assert_eq!(candidates["mapper"].is_correct(), Some(&[true, true, false, true][..]));

        let curves = aggregator.compute_curves(&candidates, ReadCategory::All);
        assert!(curves.failed.is_empty());
        assert_eq!(curves.breakpoints, vec![60, 40, 10, 0]);
        let curve = &curves.curves["mapper"];

        // buckets are [60, 256), [40, 60), [10, 40), [0, 10); the mapq=10 read lands in [10, 40)
        let expected_recall = [0.25, 0.5, 0.75, 0.75];
        for (&observed, expected) in curve.recall().iter().zip(expected_recall) {
            assert_approx_eq!(observed, expected);
        }
        let expected_pc = [1.0, 2.0 / 3.0, 2.0 / 4.0, 2.0 / 4.0];
        for (&observed, expected) in curve.precision_complement().iter().zip(expected_pc) {
            assert_approx_eq!(observed, expected);
        }
        assert_eq!(curve.final_counts(), ReadCounts::new(3, 1));
    }

    #[test]
    fn test_recall_monotone_and_sum_check() {
        let n = 200;
        let truth_positions: Vec<i64> = (0..n).map(|i| 1000 * i as i64).collect();
        let n_variants: Vec<u32> = (0..n).map(|i| (i % 3 == 0) as u32).collect();
        let truth = truth_set(truth_positions.clone(), n_variants);

        // every fourth read is misplaced, mapqs cycle through the full range
        let cand_positions: Vec<i64> = truth_positions.iter().enumerate()
            .map(|(i, &p)| if i % 4 == 0 { p + 5000 } else { p + 3 })
            .collect();
        let mapqs: Vec<u8> = (0..n).map(|i| (i * 7 % 61) as u8).collect();
        let mut candidates: IndexMap<String, AlignmentSet> = [
            ("a".to_string(), candidate_set(cand_positions, mapqs))
        ].into_iter().collect();

        let aggregator = MetricAggregator::default();
        assert!(aggregator.classify_candidates(&truth, &mut candidates).is_empty());

        for category in [ReadCategory::All, ReadCategory::HasVariant, ReadCategory::NoVariant] {
            let curves = aggregator.compute_curves(&candidates, category);
            let curve = &curves.curves["a"];
            assert_eq!(curve.len(), aggregator.config().mapq_breakpoints().len());
            assert!(curve.recall().windows(2).all(|w| w[0] <= w[1]));

            // the last point covers every read in the category
            let candidate = &candidates["a"];
            let in_category: Vec<usize> = (0..n).filter(|&i| category.includes(candidate.n_variants(i))).collect();
            let expected_correct = in_category.iter().filter(|&&i| candidate.correctness(i) == Some(true)).count();
            assert_eq!(curve.final_counts().correct, expected_correct as u64);
            assert_eq!(curve.final_counts().selected(), in_category.len() as u64);
            assert_approx_eq!(*curve.recall().last().unwrap(), expected_correct as f64 / in_category.len() as f64);
        }
    }

    #[test]
    fn test_categories_do_not_interfere() {
        let truth = truth_set(vec![100, 200, 300, 400], vec![0, 2, 0, 1]);
        let mut candidates: IndexMap<String, AlignmentSet> = [
            ("m".to_string(), candidate_set(vec![100, 200, 999, 999], vec![60, 60, 60, 60]))
        ].into_iter().collect();
        let aggregator = scenario_aggregator();
        aggregator.classify_candidates(&truth, &mut candidates);

        let variants = aggregator.compute_curves(&candidates, ReadCategory::HasVariant);
        let all = aggregator.compute_curves(&candidates, ReadCategory::All);
        let variants_again = aggregator.compute_curves(&candidates, ReadCategory::HasVariant);
        assert_eq!(variants, variants_again);
        assert_eq!(variants.curves["m"].recall(), &[0.5, 0.5, 0.5, 0.5]);
        assert_eq!(all.curves["m"].recall(), &[0.5, 0.5, 0.5, 0.5]);
        assert_eq!(all.curves["m"].total(), 4);
        assert_eq!(variants.curves["m"].total(), 2);
    }

    #[test]
    fn test_failed_candidate_is_isolated() {
        let truth = truth_set(vec![100, 200], vec![0, 0]);
        let mut candidates: IndexMap<String, AlignmentSet> = [
            ("good".to_string(), candidate_set(vec![100, 200], vec![60, 0])),
            ("short".to_string(), candidate_set(vec![100], vec![60])),
        ].into_iter().collect();

        let aggregator = scenario_aggregator();
        let failed = aggregator.classify_candidates(&truth, &mut candidates);
        assert_eq!(failed, vec!["short".to_string()]);
        assert_eq!(candidates.keys().collect::<Vec<&String>>(), vec!["good"]);

        let curves = aggregator.compute_curves(&candidates, ReadCategory::All);
        assert!(curves.failed.is_empty());
        assert_eq!(curves.curves.len(), 1);
        assert_eq!(curves.curves["good"].recall().last(), Some(&1.0));
    }

    #[test]
    fn test_stale_classification_is_dropped() {
        let truth = truth_set(vec![100, 200], vec![0, 0]);
        let stale = AlignmentSet::new(vec![1], vec![100], vec![0], None, vec![60], Some(vec![true])).unwrap();
        assert!(stale.is_classified());
        let mut candidates: IndexMap<String, AlignmentSet> = [
            ("stale".to_string(), stale),
            ("good".to_string(), candidate_set(vec![100, 999], vec![60, 60])),
        ].into_iter().collect();

        let aggregator = scenario_aggregator();
        let failed = aggregator.classify_candidates(&truth, &mut candidates);
        assert_eq!(failed, vec!["stale".to_string()]);

        let curves = aggregator.compute_curves(&candidates, ReadCategory::All);
        assert!(!curves.curves.contains_key("stale"));
        assert_eq!(curves.curves["good"].recall().last(), Some(&0.5));
        let rates = aggregator.rates_at_threshold(&candidates, ReadCategory::All, 0);
        assert!(!rates.contains_key("stale"));
        assert_eq!(rates.len(), 1);
    }

    fn named_set(names: &[&str], positions: Vec<i64>, n_variants: Vec<u32>) -> AlignmentSet {
        let n = positions.len();
        AlignmentSet::new(vec![1; n], positions, n_variants, None, vec![60; n], None).unwrap()
            .with_read_names(names.iter().map(|n| n.to_string()).collect()).unwrap()
    }

    #[test]
    fn test_align_candidates_by_name() {
        let truth = named_set(&["readA", "readB", "readC"], vec![100, 200, 300], vec![1, 0, 0]);
        let mut candidates: IndexMap<String, AlignmentSet> = [
            // same reads, different slot order
            ("shuffled".to_string(), named_set(&["readC", "readA", "readB"], vec![300, 100, 5000], vec![0; 3])),
            // readA is missing
            ("other_reads".to_string(), named_set(&["readB", "readC", "readD"], vec![200, 300, 400], vec![0; 3])),
            // stored by numeric slot
            ("unnamed".to_string(), candidate_set(vec![100, 200, 300], vec![60; 3])),
        ].into_iter().collect();

        let aggregator = scenario_aggregator();
        let failed = aggregator.align_candidates(&truth, &mut candidates).unwrap();
        assert_eq!(failed, vec!["other_reads".to_string(), "unnamed".to_string()]);
        assert_eq!(candidates.len(), 1);

        let shuffled = &candidates["shuffled"];
        assert_eq!(shuffled.positions(), &[100, 5000, 300]);
        assert_eq!(shuffled.read_names(), truth.read_names());

        assert!(aggregator.classify_candidates(&truth, &mut candidates).is_empty());
        assert_eq!(candidates["shuffled"].is_correct(), Some(&[true, false, true][..]));
        assert_eq!(candidates["shuffled"].n_variants_column(), &[1, 0, 0]);
    }

    #[test]
    fn test_align_candidates_different_reads() {
        let truth = named_set(&["readA", "readB"], vec![100, 200], vec![0, 0]);
        let mut candidates: IndexMap<String, AlignmentSet> = [
            ("c".to_string(), named_set(&["readB", "readC"], vec![200, 300], vec![0, 0])),
        ].into_iter().collect();
        let aggregator = scenario_aggregator();
        assert_eq!(aggregator.align_candidates(&truth, &mut candidates).unwrap(), vec!["c".to_string()]);
        assert!(candidates.is_empty());

        // also caught directly at the keyed level
        let keyed_truth = KeyedAlignmentSet::from_alignment_set(&truth, "truth").unwrap();
        let keyed = KeyedAlignmentSet::from_alignment_set(
            &named_set(&["readB", "readC"], vec![200, 300], vec![0, 0]), "candidate"
        ).unwrap();
        assert_eq!(keyed.align_to(&keyed_truth), Err(AlignmentError::MissingReadKey("readA".to_string())));
    }

    #[test]
    fn test_align_candidates_unnamed_truth() {
        let truth = truth_set(vec![100, 200], vec![0, 0]);
        let mut candidates: IndexMap<String, AlignmentSet> = [
            ("numeric".to_string(), candidate_set(vec![100, 200], vec![60, 60])),
            ("named".to_string(), named_set(&["a", "b"], vec![100, 200], vec![0, 0])),
        ].into_iter().collect();
        let aggregator = scenario_aggregator();
        assert_eq!(aggregator.align_candidates(&truth, &mut candidates).unwrap(), vec!["named".to_string()]);
        assert!(candidates.contains_key("numeric"));
    }

    #[test]
    fn test_rates_at_threshold() {
        let truth = truth_set(vec![100, 200, 300, 400], vec![0; 4]);
        let mut candidates: IndexMap<String, AlignmentSet> = [
            ("a".to_string(), candidate_set(vec![100, 205, 500, 400], vec![60, 40, 40, 10])),
            ("b".to_string(), candidate_set(vec![100, 200, 300, 400], vec![5, 5, 5, 5])),
        ].into_iter().collect();
        let aggregator = scenario_aggregator();
        aggregator.classify_candidates(&truth, &mut candidates);

        let rates = aggregator.rates_at_threshold(&candidates, ReadCategory::All, 40);
        let a = rates["a"];
        assert_approx_eq!(a.recall, 0.5);
        assert_approx_eq!(a.one_minus_precision, 1.0 / 3.0);
        let b = rates["b"];
        assert!(b.is_empty_selection());
        assert_eq!((b.recall, b.one_minus_precision), (0.0, 0.0));

        // nothing reaches this cutoff
        let rates = aggregator.rates_at_threshold(&candidates, ReadCategory::All, 61);
        for rate in rates.values() {
            assert_eq!((rate.recall, rate.one_minus_precision), (0.0, 0.0));
        }
        assert_eq!(rates.len(), 2);
    }

    #[test]
    fn test_unclassified_errors() {
        let candidate = candidate_set(vec![1, 2], vec![0, 0]);
        assert_eq!(compute_roc_curve(&candidate, ReadCategory::All, &MapqBreakpoints::default()), Err(AlignmentError::Unclassified));
        assert_eq!(compute_rate(&candidate, ReadCategory::All, 0), Err(AlignmentError::Unclassified));
    }

    #[test]
    fn test_discordant_reads() {
        let truth = truth_set(vec![100, 200, 300, 400], vec![0; 4]);
        let mut candidates: IndexMap<String, AlignmentSet> = [
            ("a".to_string(), candidate_set(vec![900, 900, 300, 900], vec![60, 10, 60, 30])),
            ("b".to_string(), candidate_set(vec![100, 200, 300, 900], vec![60, 60, 60, 60])),
        ].into_iter().collect();
        let aggregator = scenario_aggregator();
        aggregator.classify_candidates(&truth, &mut candidates);

        assert_eq!(aggregator.discordant_reads(&candidates, "a", "b", DEFAULT_DISCORDANT_MIN_MAPQ).unwrap(), vec![0]);
        assert_eq!(aggregator.discordant_reads(&candidates, "a", "b", 0).unwrap(), vec![0, 1]);
        assert!(aggregator.discordant_reads(&candidates, "b", "a", 0).unwrap().is_empty());
        assert_eq!(
            aggregator.discordant_reads(&candidates, "a", "missing", 0),
            Err(AlignmentError::UnknownCandidate("missing".to_string()))
        );
    }
}
