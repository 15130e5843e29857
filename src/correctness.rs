
use log::{debug, info};

use crate::data_types::alignment_set::{check_length, AlignmentError, Alignments};

/// Default tolerance (bp) between a candidate and truth position
pub const DEFAULT_ALLOWED_MISMATCH: u64 = 150;

/// Returns true if a candidate placement matches the truth placement.
/// Sentinel chromosomes (0, -1) only match the same sentinel.
#[inline]
pub fn is_correct_placement(truth_chrom: i8, truth_pos: i64, chrom: i8, pos: i64, allowed_mismatch: u64) -> bool {
    chrom == truth_chrom && truth_pos.abs_diff(pos) <= allowed_mismatch
}

/// Computes the correctness vector for `candidate` relative to `truth`.
/// # Arguments
/// * `truth` - the truth alignments
/// * `candidate` - the alignments being scored
/// * `allowed_mismatch` - maximum absolute position difference that still counts as correct
/// # Errors
/// * `ShapeMismatch` if the two sets have different lengths
pub fn compute_correctness<T, C>(truth: &T, candidate: &C, allowed_mismatch: u64) -> Result<Vec<bool>, AlignmentError>
where
    T: Alignments + ?Sized,
    C: Alignments + ?Sized
{
    check_length("truth", candidate.len(), truth.len())?;
    let is_correct = (0..candidate.len())
        .map(|i| {
            is_correct_placement(
                truth.chromosome(i), truth.position(i),
                candidate.chromosome(i), candidate.position(i),
                allowed_mismatch
            )
        })
        .collect();
    Ok(is_correct)
}

/// Classifies `candidate` against `truth`, storing the correctness flags and copying the truth variant counts.
/// If the candidate is already classified and `force` is false, nothing is recomputed.
/// Returns true if classification was performed.
/// # Arguments
/// * `truth` - the truth alignments
/// * `candidate` - the alignments being scored, mutated in place
/// * `allowed_mismatch` - maximum absolute position difference that still counts as correct
/// * `force` - if true, recomputes even when a cached result exists
/// # Errors
/// * `ShapeMismatch` if the two sets have different lengths
pub fn classify_alignments<T, C>(truth: &T, candidate: &mut C, allowed_mismatch: u64, force: bool) -> Result<bool, AlignmentError>
where
    T: Alignments + ?Sized,
    C: Alignments + ?Sized
{
    // a cached result is only trusted if the truth set could have produced it
    check_length("truth", candidate.len(), truth.len())?;
    if !force && candidate.is_classified() {
        info!("Correctness already set, skipping classification");
        return Ok(false);
    }

    info!("Allowing {allowed_mismatch} bp mismatch");
    let is_correct = compute_correctness(truth, candidate, allowed_mismatch)?;
    let num_correct = is_correct.iter().filter(|&&c| c).count();
    info!("Number of correct alignments: {num_correct} / {}", is_correct.len());

    let n_variants: Vec<u32> = (0..truth.len())
        .map(|i| truth.n_variants(i))
        .collect();
    debug!("Copied variant counts for {} reads from truth", n_variants.len());

    candidate.store_classification(is_correct, n_variants)?;
    Ok(true)
}
