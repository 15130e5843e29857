
use indexmap::IndexMap;
use serde::Serialize;
use std::fs::File;
use std::path::Path;

use crate::data_types::read_category::ReadCategory;
use crate::data_types::read_counts::CorrectRate;

/// Accumulates single-threshold rates for several categories before writing them out
#[derive(Default)]
pub struct RateSummaryWriter {
    /// (category, min_mapq, candidate rates) in insertion order
    entries: Vec<(ReadCategory, u8, IndexMap<String, CorrectRate>)>,
}

/// Contains all the data written to each row of the rate summary
#[derive(Serialize)]
struct RateRow<'a> {
    candidate: &'a str,
    category: String,
    min_mapq: u8,
    /// Reads in the category at or above `min_mapq`
    selected: u64,
    /// Correct reads among `selected`
    correct: u64,
    /// Reads in the category regardless of MAPQ
    category_total: u64,
    /// correct / category_total
    recall: f64,
    /// (selected - correct) / selected
    one_minus_precision: f64,
}

impl RateSummaryWriter {
    /// Creates an empty summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the rates for one category and threshold
    pub fn add_rates(&mut self, category: ReadCategory, min_mapq: u8, rates: IndexMap<String, CorrectRate>) {
        self.entries.push((category, min_mapq, rates));
    }

    /// Will write the summary out to the given file path
    /// # Arguments
    /// * `filename` - the filename for the output (tsv/csv)
    pub fn write_summary(&self, filename: &Path) -> csv::Result<()> {
        // modify the delimiter to "," if it ends with .csv
        let is_csv: bool = filename.extension().unwrap_or_default() == "csv";
        let delimiter: u8 = if is_csv { b',' } else { b'\t' };
        let mut csv_writer: csv::Writer<File> = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_path(filename)?;

        for (category, min_mapq, rates) in self.entries.iter() {
            for (candidate, rate) in rates.iter() {
                let row = RateRow {
                    candidate: candidate.as_str(),
                    category: category.to_string(),
                    min_mapq: *min_mapq,
                    selected: rate.counts.selected(),
                    correct: rate.counts.correct,
                    category_total: rate.total,
                    recall: rate.recall,
                    one_minus_precision: rate.one_minus_precision
                };
                csv_writer.serialize(&row)?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }
}
