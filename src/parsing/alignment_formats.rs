
use anyhow::{anyhow, bail, ensure, Context};
use log::{error, info, warn};
use noodles::bed::io::reader::Builder as BedBuilder;
use noodles::bed::Record as BedRecord;
use noodles::sam;
use noodles::sam::alignment::record::data::field::Tag;
use noodles::sam::alignment::record::Data as _;
use serde::Serialize;
use std::io::BufRead;
use strum_macros::EnumString;

use crate::data_types::alignment_set::{AlignmentSet, CHROM_UNKNOWN, CHROM_UNMAPPED};
use crate::data_types::keyed_alignments::{KeyedAlignmentSet, KeyedRecord};
use crate::parsing::read_identity::{encode_chromosome, encode_nullable_chromosome, ReadKey};
use crate::util::progress_bar::line_progress_bar;

/// Number of mandatory SAM columns
const SAM_MANDATORY_FIELDS: usize = 11;
/// Simulator annotation with the number of variants a read overlaps; not a two-letter SAM tag
const SAM_VARIANT_ANNOTATION: &str = "NVARIANTS:";
/// Full prefix of the only supported variant annotation type
const SAM_VARIANT_PREFIX: &str = "NVARIANTS:i:";

/// The line formats that can be ingested
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, strum_macros::Display, EnumString, Serialize, clap::ValueEnum)]
pub enum AlignmentFormat {
    /// Simulated truth: `name chrom pos ...`, with the variant count in column 8 if present
    #[strum(ascii_case_insensitive, serialize = "truth")]
    #[clap(name = "truth")]
    Truth,
    /// Position file: `name chrom pos [mapq score]`
    #[strum(ascii_case_insensitive, serialize = "pos")]
    #[clap(name = "pos")]
    Pos,
    /// Graph aligner positions: `_ _ chrom pos`, identified by line number
    #[strum(ascii_case_insensitive, serialize = "vgpos")]
    #[clap(name = "vgpos")]
    VgPos,
    /// BED: `chrom start end name`
    #[strum(ascii_case_insensitive, serialize = "bed")]
    #[clap(name = "bed")]
    Bed,
    /// SAM text, primary records only
    #[default]
    #[strum(ascii_case_insensitive, serialize = "sam")]
    #[clap(name = "sam")]
    Sam,
}

impl AlignmentFormat {
    /// Returns true if the format can carry alignment scores
    pub fn has_scores(&self) -> bool {
        match self {
            AlignmentFormat::Pos |
            AlignmentFormat::Sam => true,

            AlignmentFormat::Truth |
            AlignmentFormat::VgPos |
            AlignmentFormat::Bed => false,
        }
    }
}

/// One successfully parsed input line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedRead {
    /// Identity of the read, from which the dense identifier is derived
    pub key: ReadKey,
    pub chromosome: i8,
    pub position: i64,
    pub mapq: Option<u8>,
    pub score: Option<u32>,
    pub n_variants: Option<u32>,
}

impl ParsedRead {
    fn new(key: ReadKey, chromosome: i8, position: i64) -> Self {
        Self {
            key, chromosome, position,
            mapq: None,
            score: None,
            n_variants: None
        }
    }
}

/// Stateful line parser for everything except BED; SAM parsing needs to remember whether the input is paired-end
struct LineParser {
    format: AlignmentFormat,
    /// Number of lines seen so far, including skipped ones
    line_count: usize,
    /// Set once a SAM record with a mate reference is found
    is_paired_end: bool,
    /// Only report a missing score once
    missing_score_reported: bool,
    /// Reused SAM record buffer
    sam_record: sam::Record,
}

impl LineParser {
    /// Constructor
    fn new(format: AlignmentFormat) -> Self {
        Self {
            format,
            line_count: 0,
            is_paired_end: false,
            missing_score_reported: false,
            sam_record: Default::default()
        }
    }

    /// Parses one line. Returns None for lines that intentionally carry no read (headers, secondary records, blanks).
    /// # Errors
    /// * if the line is malformed for the selected format
    fn parse_line(&mut self, line: &str) -> anyhow::Result<Option<ParsedRead>> {
        let line_index = self.line_count;
        self.line_count += 1;

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            return Ok(None);
        }

        match self.format {
            AlignmentFormat::Truth => parse_truth(&fields).map(Some),
            AlignmentFormat::Pos => parse_pos(&fields).map(Some),
            AlignmentFormat::VgPos => parse_vgpos(&fields, line_index).map(Some),
            AlignmentFormat::Sam => self.parse_sam(line),
            AlignmentFormat::Bed => bail!("BED input is read with parse_bed_records(...)")
        }
    }

    fn parse_sam(&mut self, line: &str) -> anyhow::Result<Option<ParsedRead>> {
        if line.starts_with('@') {
            return Ok(None);
        }

        let (annotations, fields): (Vec<&str>, Vec<&str>) = line.trim_end()
            .split('\t')
            .partition(|f| f.starts_with(SAM_VARIANT_ANNOTATION));
        ensure!(fields.len() >= SAM_MANDATORY_FIELDS, "Expected at least {SAM_MANDATORY_FIELDS} SAM columns, found {}", fields.len());

        let record_line = fields.join("\t");
        let mut sam_reader = sam::io::Reader::new(record_line.as_bytes());
        if sam_reader.read_record(&mut self.sam_record)? == 0 {
            bail!("Empty SAM record");
        }
        let record = &self.sam_record;

        let flags = record.flags()?;
        if flags.is_secondary() || flags.is_qc_fail() || flags.is_duplicate() || flags.is_supplementary() {
            return Ok(None);
        }

        if record.mate_reference_sequence_name().is_some() && !self.is_paired_end {
            info!("Assuming SAM is paired end, mate identifiers are derived from the flag");
            self.is_paired_end = true;
        }

        let name = record.name()
            .map(|n| n.to_string())
            .ok_or_else(|| anyhow!("SAM record without a read name"))?;
        let key = if self.is_paired_end && !name.contains('/') {
            let pair_id = if flags.is_last_segment() { 2 } else { 1 };
            ReadKey::new(name.clone(), pair_id)
        } else {
            ReadKey::from_name(&name)
        };

        let chromosome = match record.reference_sequence_name() {
            Some(reference_name) => encode_chromosome(&reference_name.to_string())?,
            None => CHROM_UNMAPPED
        };
        let position = match record.alignment_start() {
            Some(start) => usize::from(start?) as i64,
            None => 0
        };
        let mut read = ParsedRead::new(key, chromosome, position);

        // 255 (unavailable) is reported as the lowest confidence
        read.mapq = Some(record.mapping_quality()
            .transpose()?
            .map(|mq| mq.get())
            .unwrap_or(0));

        let score = match record.data().get(&Tag::ALIGNMENT_SCORE) {
            Some(Ok(value)) => value.as_int().and_then(|v| u32::try_from(v).ok()),
            _ => None
        };
        read.score = match score {
            Some(s) => Some(s),
            None => {
                if !self.missing_score_reported {
                    error!("Could not get score from SAM record {name:?}, setting score to 0");
                    self.missing_score_reported = true;
                }
                Some(0)
            }
        };

        read.n_variants = annotations.first()
            .map(|annotation| -> anyhow::Result<u32> {
                let value = annotation.strip_prefix(SAM_VARIANT_PREFIX)
                    .ok_or_else(|| anyhow!("Unsupported variant annotation: {annotation:?}"))?;
                let count: u32 = parse_field(value, "NVARIANTS")?;
                Ok((count > 0) as u32)
            })
            .transpose()?;
        Ok(Some(read))
    }
}

/// Parses a single numeric field with a descriptive error
fn parse_field<T>(value: &str, label: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static
{
    value.parse::<T>()
        .with_context(|| format!("Unparsable {label}: {value:?}"))
}

/// Parses a position that may be "null" for unplaced reads
fn parse_nullable_position(value: &str) -> anyhow::Result<i64> {
    if value == "null" {
        Ok(0)
    } else {
        parse_field(value, "position")
    }
}

fn parse_truth(fields: &[&str]) -> anyhow::Result<ParsedRead> {
    ensure!(fields.len() >= 3, "Expected at least 3 truth columns, found {}", fields.len());
    let chromosome = encode_chromosome(fields[1])?;
    let position = parse_field(fields[2], "position")?;
    let mut read = ParsedRead::new(ReadKey::from_name(fields[0]), chromosome, position);
    read.n_variants = Some(match fields.get(7) {
        Some(value) => parse_field(value, "variant count")?,
        None => 0
    });
    Ok(read)
}

fn parse_pos(fields: &[&str]) -> anyhow::Result<ParsedRead> {
    ensure!(fields.len() >= 3, "Expected at least 3 pos columns, found {}", fields.len());
    let chromosome = encode_nullable_chromosome(fields[1])?;
    let position = parse_nullable_position(fields[2])?;
    let mut read = ParsedRead::new(ReadKey::from_name(fields[0]), chromosome, position);
    if let Some(mapq) = fields.get(3) {
        read.mapq = Some(parse_field(mapq, "mapq")?);
    }
    if let Some(score) = fields.get(4) {
        read.score = Some(parse_field(score, "score")?);
    }
    if read.mapq.is_none() || read.score.is_none() {
        warn!("Could not get mapq or score for read {:?}", fields[0]);
    }
    Ok(read)
}

fn parse_vgpos(fields: &[&str], line_index: usize) -> anyhow::Result<ParsedRead> {
    ensure!(fields.len() >= 4, "Expected at least 4 vgpos columns, found {}", fields.len());
    let chromosome = match encode_nullable_chromosome(fields[2]) {
        Ok(c) => c,
        Err(e) => {
            error!("{e:#}; setting chromosome to {CHROM_UNKNOWN}");
            CHROM_UNKNOWN
        }
    };
    let position = parse_nullable_position(fields[3])?;
    Ok(ParsedRead::new(ReadKey::new(line_index.to_string(), 0), chromosome, position))
}

/// Converts a BED4 record; the name column is the read name and the 0-based start the position
fn parse_bed(record: &BedRecord<4>) -> anyhow::Result<ParsedRead> {
    let name = record.name()
        .map(|n| n.to_string())
        .ok_or_else(|| anyhow!("BED record is missing the read name"))?;
    let chromosome = encode_chromosome(&record.reference_sequence_name().to_string())?;
    let start = record.feature_start()
        .with_context(|| format!("Error while parsing start for record {name:?}"))?;
    let position = usize::from(start) as i64 - 1;
    Ok(ParsedRead::new(ReadKey::from_name(&name), chromosome, position))
}

/// Same as `parse_lines(...)` for BED input, which is read through noodles
fn parse_bed_records<R, F>(reader: R, expected_lines: usize, mut sink: F) -> anyhow::Result<()>
where
    R: BufRead,
    F: FnMut(ParsedRead) -> anyhow::Result<()>
{
    #[allow(clippy::default_constructed_unit_structs)]
    let mut bed_reader = BedBuilder::<4>::default()
        .build_from_reader(reader);
    let mut record = BedRecord::<4>::default();

    let progress = line_progress_bar(expected_lines, "Parsing bed records...");
    let mut accepted: u64 = 0;
    let mut skipped: u64 = 0;
    let mut record_number: u64 = 0;
    loop {
        record_number += 1;
        match bed_reader.read_record(&mut record) {
            Ok(0) => break,
            Ok(_) => {},
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                error!("Skipping BED record {record_number}: {e}");
                skipped += 1;
                continue;
            },
            Err(e) => {
                return Err(e).with_context(|| format!("Error while reading BED record {record_number}"));
            }
        }
        progress.inc(1);

        match parse_bed(&record).and_then(&mut sink) {
            Ok(()) => accepted += 1,
            Err(e) => {
                error!("Skipping BED record {record_number}: {e:#}");
                skipped += 1;
            }
        }
    }
    progress.finish_with_message(format!("Parsed {accepted} bed records."));

    info!("Parsed {accepted} bed records, skipped {skipped} malformed records");
    Ok(())
}

/// Routes `reader` to the parser for `format`
fn parse_reads<R, F>(reader: R, format: AlignmentFormat, expected_lines: usize, sink: F) -> anyhow::Result<()>
where
    R: BufRead,
    F: FnMut(ParsedRead) -> anyhow::Result<()>
{
    match format {
        AlignmentFormat::Bed => parse_bed_records(reader, expected_lines, sink),
        _ => parse_lines(reader, format, expected_lines, sink)
    }
}

/// Runs `parser` over every line of `reader`, handing each parsed read to `sink`.
/// Malformed lines are logged and skipped; I/O errors are fatal.
fn parse_lines<R, F>(reader: R, format: AlignmentFormat, expected_lines: usize, mut sink: F) -> anyhow::Result<()>
where
    R: BufRead,
    F: FnMut(ParsedRead) -> anyhow::Result<()>
{
    let mut parser = LineParser::new(format);
    let progress = line_progress_bar(expected_lines, &format!("Parsing {format} lines..."));
    let mut accepted: u64 = 0;
    let mut skipped: u64 = 0;
    for (line_index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Error while reading line {}", line_index + 1))?;
        progress.inc(1);

        let outcome = parser.parse_line(&line)
            .and_then(|opt_read| match opt_read {
                Some(read) => sink(read).map(|_| true),
                None => Ok(false)
            });
        match outcome {
            Ok(true) => accepted += 1,
            Ok(false) => {},
            Err(e) => {
                error!("Skipping line {}: {e:#}", line_index + 1);
                error!("\t{line}");
                skipped += 1;
            }
        }
    }
    progress.finish_with_message(format!("Parsed {accepted} {format} records."));

    info!("Parsed {accepted} {format} records, skipped {skipped} malformed lines");
    Ok(())
}

/// Parses `reader` into a columnar set with `n_alignments` slots, placing each read at its numeric identifier.
/// Slots that no line refers to stay zero-initialized.
/// # Arguments
/// * `reader` - the line source
/// * `format` - how lines are laid out
/// * `n_alignments` - number of slots, must be >= the largest identifier + 1
/// # Errors
/// * if reading from `reader` fails
pub fn read_alignment_set<R: BufRead>(reader: R, format: AlignmentFormat, n_alignments: usize) -> anyhow::Result<AlignmentSet> {
    let mut alignments = AlignmentSet::zeroed(n_alignments, format.has_scores());
    parse_reads(reader, format, n_alignments, |read| {
        let identifier = read.key.numeric_id()?;
        alignments.place(identifier, read.chromosome, read.position, read.mapq, read.score, read.n_variants)?;
        Ok(())
    })?;
    Ok(alignments)
}

/// Parses `reader` into a record-backed set that keeps read names instead of numeric slots
/// # Arguments
/// * `reader` - the line source
/// * `format` - how lines are laid out
/// * `expected_lines` - only used for progress reporting
/// # Errors
/// * if reading from `reader` fails
/// * if two records share a read key
pub fn read_keyed_alignment_set<R: BufRead>(reader: R, format: AlignmentFormat, expected_lines: usize) -> anyhow::Result<KeyedAlignmentSet> {
    let has_scores = format.has_scores();
    let mut records = vec![];
    parse_reads(reader, format, expected_lines, |read| {
        let score = if has_scores { Some(read.score.unwrap_or_default()) } else { None };
        records.push(KeyedRecord::new(
            read.key, read.chromosome, read.position,
            read.mapq.unwrap_or_default(), score, read.n_variants.unwrap_or_default()
        ));
        Ok(())
    })?;

    if records.is_empty() {
        bail!("No {format} records found in input");
    }
    let keyed = KeyedAlignmentSet::new(records)?;
    Ok(keyed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::alignment_set::Alignments;
    use std::io::Cursor;

    #[test]
    fn test_truth() {
        let data = "0 1 100 x x x x 2\n1 X 250\nbad_line\n3 chr2 400 x x x x 0\n";
        let alignments = read_alignment_set(Cursor::new(data), AlignmentFormat::Truth, 4).unwrap();
        assert_eq!(alignments.chromosomes(), &[1, 23, 0, 2]);
        assert_eq!(alignments.positions(), &[100, 250, 0, 400]);
        assert_eq!(alignments.n_variants_column(), &[2, 0, 0, 0]);
        assert!(alignments.scores().is_none());
    }

    #[test]
    fn test_pos() {
        let data = "1/1 5 1000 60 150\n1/2 null null 0 0\n0 3 77\n2 4 500 42\n";
        let alignments = read_alignment_set(Cursor::new(data), AlignmentFormat::Pos, 5).unwrap();
        assert_eq!(alignments.chromosomes(), &[3, 0, 5, 0, 4]);
        assert_eq!(alignments.positions(), &[77, 0, 1000, 0, 500]);
        // a mapq without a score is still kept
        assert_eq!(alignments.mapqs(), &[0, 0, 60, 0, 42]);
        assert_eq!(alignments.scores(), Some(&[0, 0, 150, 0, 0][..]));
    }

    #[test]
    fn test_vgpos() {
        let data = "a b 1 100\na b null null\na b chrM 300\n";
        let alignments = read_alignment_set(Cursor::new(data), AlignmentFormat::VgPos, 3).unwrap();
        assert_eq!(alignments.chromosomes(), &[1, 0, 0]);
        assert_eq!(alignments.positions(), &[100, 0, 300]);
    }

    #[test]
    fn test_bed() {
        let data = "chr1\t100\t250\t2\nchrX\t5\t10\t0\nchr1\tabc\t10\t1\n";
        let alignments = read_alignment_set(Cursor::new(data), AlignmentFormat::Bed, 3).unwrap();
        assert_eq!(alignments.chromosomes(), &[23, 0, 1]);
        assert_eq!(alignments.positions(), &[5, 0, 100]);
    }

    #[test]
    fn test_out_of_range_is_skipped() {
        let data = "0 1 100\n9 1 900\n";
        let alignments = read_alignment_set(Cursor::new(data), AlignmentFormat::Truth, 2).unwrap();
        assert_eq!(alignments.positions(), &[100, 0]);
    }

    #[test]
    fn test_sam_single_end() {
        let data = "\
@HD\tVN:1.6
0\t0\tchr1\t100\t60\t100M\t*\t0\t0\tACGT\tIIII\tNM:i:0\tAS:i:95\tNVARIANTS:i:2
1\t4\t*\t0\t0\t*\t*\t0\t0\tACGT\tIIII
1\t256\tchr2\t500\t0\t100M\t*\t0\t0\tACGT\tIIII\tAS:i:80
2\t16\tchrY\t300\t12\t100M\t*\t0\t0\tACGT\tIIII\tAS:i:x\tNVARIANTS:i:0
";
        let alignments = read_alignment_set(Cursor::new(data), AlignmentFormat::Sam, 3).unwrap();
        assert_eq!(alignments.chromosomes(), &[1, CHROM_UNMAPPED, 24]);
        assert_eq!(alignments.positions(), &[100, 0, 300]);
        assert_eq!(alignments.mapqs(), &[60, 0, 12]);
        assert_eq!(alignments.scores(), Some(&[95, 0, 0][..]));
        assert_eq!(alignments.n_variants_column(), &[1, 0, 0]);
    }

    #[test]
    fn test_sam_unavailable_mapq() {
        let data = "\
0\t0\tchr1\t100\t255\t100M\t*\t0\t0\tACGT\tIIII\tAS:i:95
1\t0\tchr1\t200\t254\t100M\t*\t0\t0\tACGT\tIIII\tAS:i:95
";
        let alignments = read_alignment_set(Cursor::new(data), AlignmentFormat::Sam, 2).unwrap();
        // 255 means unavailable and must not land in the most confident bucket
        assert_eq!(alignments.mapqs(), &[0, 254]);
    }

    #[test]
    fn test_sam_unsupported_annotation() {
        let data = "0\t0\tchr1\t100\t60\t100M\t*\t0\t0\tACGT\tIIII\tNVARIANTS:Z:two\n";
        let alignments = read_alignment_set(Cursor::new(data), AlignmentFormat::Sam, 1).unwrap();
        assert_eq!(alignments.positions(), &[0]);
    }

    #[test]
    fn test_sam_paired_end() {
        let data = "\
3\t99\tchr1\t100\t60\t100M\t=\t300\t300\tACGT\tIIII\tAS:i:100
3\t147\tchr1\t300\t50\t100M\t=\t100\t-300\tACGT\tIIII\tAS:i:90
1/2\t163\tchr1\t700\t40\t100M\t=\t500\t300\tACGT\tIIII\tAS:i:70
";
        let alignments = read_alignment_set(Cursor::new(data), AlignmentFormat::Sam, 8).unwrap();
        assert_eq!(alignments.positions(), &[0, 0, 0, 700, 0, 0, 100, 300]);
        assert_eq!(alignments.mapqs()[6], 60);
        assert_eq!(alignments.mapqs()[7], 50);
    }

    #[test]
    fn test_keyed_sam() {
        let data = "\
readB\t0\tchr1\t100\t60\t100M\t*\t0\t0\tACGT\tIIII\tAS:i:95
readA\t0\tchr2\t500\t30\t100M\t*\t0\t0\tACGT\tIIII\tAS:i:80
";
        let mut keyed = read_keyed_alignment_set(Cursor::new(data), AlignmentFormat::Sam, 2).unwrap();
        keyed.sort_canonical();
        assert_eq!(keyed.records()[0].key().base_name(), "readA");
        assert_eq!(keyed.chromosome(0), 2);
        assert_eq!(keyed.score(1), Some(95));

        // non-numeric names cannot be placed by identifier
        let alignments = read_alignment_set(Cursor::new(data), AlignmentFormat::Sam, 2).unwrap();
        assert_eq!(alignments.chromosomes(), &[0, 0]);
    }

    #[test]
    fn test_keyed_empty() {
        assert!(read_keyed_alignment_set(Cursor::new("@HD\n"), AlignmentFormat::Sam, 1).is_err());
    }

    #[test]
    fn test_format_labels() {
        use std::str::FromStr;
        assert_eq!(AlignmentFormat::from_str("VGPOS").unwrap(), AlignmentFormat::VgPos);
        assert_eq!(AlignmentFormat::Truth.to_string(), "truth");
        assert!(AlignmentFormat::Sam.has_scores());
        assert!(!AlignmentFormat::Bed.has_scores());
    }
}
