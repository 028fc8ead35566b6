//! Shared helpers for the input parsers.

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::Result;

/// Creates a buffered reader that automatically handles gzip-compressed files.
///
/// Files whose path ends with ".gz" are wrapped in a GzDecoder.
pub fn create_buffered_reader(file: File, path: &Path) -> Box<dyn BufRead + Send> {
    if path.to_string_lossy().ends_with(".gz") {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    }
}

/// Open an input file for line-oriented reading (plain or gzip).
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    let file = File::open(path)?;
    Ok(create_buffered_reader(file, path))
}

/// File name without directories and without `.gz`, `.gmt`, `.txt` or `.tsv`
/// suffixes.
pub fn file_stem(path: &Path) -> String {
    let mut name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    for suffix in [".gz", ".gmt", ".txt", ".tsv"] {
        if let Some(stripped) = name.strip_suffix(suffix) {
            name = stripped.to_string();
        }
    }
    name
}
