/*!
# Parsing module
Contains the logic for parsing aligner and simulator outputs into alignment sets.
*/
/// Line parsers for the supported input formats
pub mod alignment_formats;
/// Chromosome codes and read identifiers
pub mod read_identity;
