
use serde::Serialize;
use std::str::FromStr;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::data_types::alignment_set::AlignmentError;

/// Read-level stratification based on overlap with known variants
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, AsRefStr, Display, EnumIter, EnumString, Serialize, clap::ValueEnum)]
pub enum ReadCategory {
    /// Every read
    #[default]
    #[strum(ascii_case_insensitive, to_string = "all")]
    #[clap(name = "all")]
    #[serde(rename = "all")]
    All,
    /// Reads overlapping at least one known variant
    #[strum(ascii_case_insensitive, to_string = "variants", serialize = "has_variant")]
    #[clap(name = "variants")]
    #[serde(rename = "variants")]
    HasVariant,
    /// Reads overlapping no known variant
    #[strum(ascii_case_insensitive, to_string = "nonvariants", serialize = "no_variant")]
    #[clap(name = "nonvariants")]
    #[serde(rename = "nonvariants")]
    NoVariant,
}

impl ReadCategory {
    /// Parses a category label
    /// # Errors
    /// * `UnknownCategory` if the label is not recognized
    pub fn parse(label: &str) -> Result<Self, AlignmentError> {
        Self::from_str(label)
            .map_err(|_e: strum::ParseError| AlignmentError::UnknownCategory(label.to_string()))
    }

    /// Returns true if a read with `n_variants` overlapping variants belongs to this category
    #[inline]
    pub fn includes(&self, n_variants: u32) -> bool {
        match self {
            ReadCategory::All => true,
            ReadCategory::HasVariant => n_variants > 0,
            ReadCategory::NoVariant => n_variants == 0,
        }
    }
}
