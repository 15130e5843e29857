
use anyhow::{bail, Context};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Extensions tried by `resolve_stored_path(...)` when the literal path is missing
const STORED_EXTENSIONS: [&str; 2] = ["json", "json.gz"];

/// Returns true if the path should be treated as gzip compressed
fn is_gzipped(filename: &Path) -> bool {
    filename.extension().unwrap_or_default() == "gz"
}

/// Loads a JSON file (optionally .gz) into some deserializable type
/// # Arguments
/// * `filename` - the file path to open and parse
/// # Errors
/// * if the file does not open properly
/// * if the deserialization throws errors
pub fn load_json<T: serde::de::DeserializeOwned>(filename: &Path) -> anyhow::Result<T> {
    let file = File::open(filename)
        .with_context(|| format!("Error while opening {filename:?}:"))?;
    let fp: Box<dyn std::io::Read> = if is_gzipped(filename) {
        Box::new(flate2::read::MultiGzDecoder::new(file))
    } else {
        Box::new(file)
    };
    let result: T = serde_json::from_reader(BufReader::new(fp))
        .with_context(|| format!("Error while deserializing {filename:?}:"))?;
    Ok(result)
}

/// Saves a serializable struct to JSON, gzip compressed if the path ends in .gz.
/// The stored alignment columns are large, so output is compact rather than pretty-printed.
/// # Arguments
/// * `data` - the data in memory
/// * `out_filename` - user provided path to write to
/// # Errors
/// * if opening or writing to the file throw errors
/// * if JSON serialization throws errors
pub fn save_json<T: serde::Serialize>(data: &T, out_filename: &Path) -> anyhow::Result<()> {
    let file = File::create(out_filename)
        .with_context(|| format!("Error while creating {out_filename:?}:"))?;
    let file: Box<dyn std::io::Write> = if is_gzipped(out_filename) {
        Box::new(flate2::write::GzEncoder::new(file, flate2::Compression::default()))
    } else {
        Box::new(file)
    };
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, data)
        .with_context(|| format!("Error while serializing {out_filename:?}:"))?;
    writer.flush()
        .with_context(|| format!("Error while flushing output to {out_filename:?}:"))?;
    Ok(())
}

/// Same as `save_json(...)`, but human readable; used for settings and curve dumps
pub fn save_json_pretty<T: serde::Serialize>(data: &T, out_filename: &Path) -> anyhow::Result<()> {
    let file = File::create(out_filename)
        .with_context(|| format!("Error while creating {out_filename:?}:"))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .with_context(|| format!("Error while serializing {out_filename:?}:"))?;
    writer.flush()
        .with_context(|| format!("Error while flushing output to {out_filename:?}:"))?;
    Ok(())
}

/// Finds a stored alignment file, allowing the user to leave off the `.json` / `.json.gz` extension
/// # Errors
/// * if neither the literal path nor any extended path exists
pub fn resolve_stored_path(filename: &Path) -> anyhow::Result<PathBuf> {
    if filename.exists() {
        return Ok(filename.to_path_buf());
    }
    for extension in STORED_EXTENSIONS {
        let mut candidate = filename.as_os_str().to_owned();
        candidate.push(".");
        candidate.push(extension);
        let candidate = PathBuf::from(candidate);
        if candidate.exists() {
            return Ok(candidate);
        }
    }
    bail!("Alignment file does not exist: \"{}\"", filename.display());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_round_trip_and_resolve() {
        let data: BTreeMap<String, Vec<u32>> = [("a".to_string(), vec![1, 2, 3])].into_iter().collect();
        let stem = std::env::temp_dir().join(format!("mapq_eval_json_io_{}", std::process::id()));
        let full = PathBuf::from(format!("{}.json", stem.display()));
        save_json(&data, &full).unwrap();

        assert_eq!(resolve_stored_path(&stem).unwrap(), full);
        let loaded: BTreeMap<String, Vec<u32>> = load_json(&resolve_stored_path(&stem).unwrap()).unwrap();
        std::fs::remove_file(&full).unwrap();
        assert_eq!(loaded, data);
        assert!(resolve_stored_path(&stem).is_err());
    }
}
