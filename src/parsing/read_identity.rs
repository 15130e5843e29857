
use anyhow::{anyhow, bail, Context};
use std::fmt::Display;

use crate::data_types::alignment_set::{CHROM_UNKNOWN, CHROM_UNMAPPED, CHROM_X, CHROM_Y};

/// Encodes a chromosome name into the small integer code used by alignment sets.
/// A leading "chr" is ignored; X = 23, Y = 24, "*" = unmapped (-1).
/// # Errors
/// * if the name is not numeric and not one of the recognized labels
pub fn encode_chromosome(name: &str) -> anyhow::Result<i8> {
    let name = name.strip_prefix("chr").unwrap_or(name);
    match name {
        "X" => Ok(CHROM_X),
        "Y" => Ok(CHROM_Y),
        "*" => Ok(CHROM_UNMAPPED),
        other => other.parse::<i8>()
            .with_context(|| format!("Unrecognized chromosome: {other:?}"))
    }
}

/// Same as `encode_chromosome(...)`, but "null" (an unplaced read in position files) maps to 0
pub fn encode_nullable_chromosome(name: &str) -> anyhow::Result<i8> {
    if name == "null" {
        Ok(CHROM_UNKNOWN)
    } else {
        encode_chromosome(name)
    }
}

/// Converts a numeric read name into a dense identifier.
/// Names of the form `base/pair` map to `2 * base + pair - 1` so mates occupy adjacent slots.
/// # Errors
/// * if the base or pair is not numeric, or the pair is not 1 or 2
pub fn name_to_id(name: &str) -> anyhow::Result<usize> {
    match name.split_once('/') {
        Some((base, pair)) => {
            let base: usize = base.parse()
                .with_context(|| format!("Non-numeric read name: {name:?}"))?;
            let pair: usize = pair.parse()
                .with_context(|| format!("Non-numeric pair id: {name:?}"))?;
            if !(1..=2).contains(&pair) {
                bail!("Pair id must be 1 or 2: {name:?}");
            }
            mate_slot(base, pair)
                .ok_or_else(|| anyhow!("Read identifier is out of range: {name:?}"))
        },
        None => name.parse()
            .with_context(|| format!("Non-numeric read name: {name:?}"))
    }
}

/// Slot of mate `pair` (1 or 2) of read `base`, None on overflow
fn mate_slot(base: usize, pair: usize) -> Option<usize> {
    base.checked_mul(2)?.checked_add(pair - 1)
}

/// Canonical identity of a read that does not rely on numeric names.
/// Ordering is by base name, then mate (0 for unpaired reads).
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ReadKey {
    base_name: String,
    pair_id: u8,
}

impl ReadKey {
    /// Constructor
    pub fn new(base_name: String, pair_id: u8) -> Self {
        Self {
            base_name, pair_id
        }
    }

    /// Builds a key from a read name, treating a `/1` or `/2` suffix as the mate
    pub fn from_name(name: &str) -> Self {
        match name.rsplit_once('/') {
            Some((base, "1")) => Self::new(base.to_string(), 1),
            Some((base, "2")) => Self::new(base.to_string(), 2),
            _ => Self::new(name.to_string(), 0)
        }
    }

    /// Dense identifier for this key, if the base name is numeric
    pub fn numeric_id(&self) -> anyhow::Result<usize> {
        let base: usize = self.base_name.parse()
            .map_err(|_e| anyhow!("Non-numeric read name: {:?}", self.base_name))?;
        match self.pair_id {
            0 => Ok(base),
            p => mate_slot(base, p as usize)
                .ok_or_else(|| anyhow!("Read identifier is out of range: {self}"))
        }
    }

    // getters
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn pair_id(&self) -> u8 {
        self.pair_id
    }
}

impl Display for ReadKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.pair_id {
            0 => write!(f, "{}", self.base_name),
            p => write!(f, "{}/{p}", self.base_name)
        }
    }
}
