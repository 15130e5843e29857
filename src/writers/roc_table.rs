
use serde::Serialize;
use std::fs::File;
use std::path::Path;

use crate::data_types::roc_curve::CategoryCurves;

/// Writes the ROC sweep points, one row per candidate and MAPQ cutoff
pub struct RocTableWriter {
    /// Handle on the writer
    csv_writer: csv::Writer<File>,
}

/// Contains all the data written to each row of the ROC table
#[derive(Serialize)]
struct RocRow<'a> {
    /// Candidate label
    candidate: &'a str,
    /// Read category filter
    category: String,
    /// Reads with MAPQ >= this value are included in the row
    mapq_threshold: u8,
    /// Number of reads in the category
    category_total: u64,
    /// recalled / category_total
    recall: f64,
    /// (wrong + 1) / (wrong + recalled)
    precision_complement: f64,
}

impl RocTableWriter {
    /// Creates a new writer
    /// # Arguments
    /// * `filename` - path to the filename that will get opened, must be .csv/.tsv
    pub fn new(filename: &Path) -> csv::Result<Self> {
        // modify the delimiter to "," if it ends with .csv
        let is_csv: bool = filename.extension().unwrap_or_default() == "csv";
        let delimiter: u8 = if is_csv { b',' } else { b'\t' };
        let csv_writer: csv::Writer<File> = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_path(filename)?;
        Ok(Self {
            csv_writer
        })
    }

    /// Writes every point of every curve in `category_curves`
    pub fn write_curves(&mut self, category_curves: &CategoryCurves) -> csv::Result<()> {
        let category = category_curves.category.to_string();
        for (candidate, curve) in category_curves.curves.iter() {
            let points = curve.breakpoints().iter()
                .zip(curve.recall())
                .zip(curve.precision_complement());
            for ((&mapq_threshold, &recall), &precision_complement) in points {
                let row = RocRow {
                    candidate: candidate.as_str(),
                    category: category.clone(),
                    mapq_threshold,
                    category_total: curve.total(),
                    recall,
                    precision_complement
                };
                self.csv_writer.serialize(&row)?;
            }
        }
        Ok(())
    }

    /// Flushes everything to disk
    pub fn finish(mut self) -> csv::Result<()> {
        self.csv_writer.flush()?;
        Ok(())
    }
}
