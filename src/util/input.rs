
use anyhow::Context;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Opens a text input for line-based parsing.
/// `-` reads from stdin, paths ending in `.gz` are decompressed on the fly.
/// # Errors
/// * if the file cannot be opened
pub fn open_text_reader(filename: &Path) -> anyhow::Result<Box<dyn BufRead>> {
    if filename.as_os_str() == "-" {
        return Ok(Box::new(BufReader::new(std::io::stdin())));
    }

    let file = File::open(filename)
        .with_context(|| format!("Error while opening {filename:?}:"))?;
    let reader: Box<dyn BufRead> = if filename.extension().unwrap_or_default() == "gz" {
        Box::new(BufReader::new(flate2::read::MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(reader)
}
