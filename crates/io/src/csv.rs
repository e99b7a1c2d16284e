// Delimited text import

use std::io::Read;
use std::path::Path;

use log::{debug, info};

use gridex_core::GridAccessor;
use gridex_engine::{Matrix, Sheet};

use crate::{IoError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOptions {
    /// Field delimiter; sniffed from the content when `None`.
    pub delimiter: Option<u8>,
    /// Treat the first record as column titles (row 0).
    pub titles: bool,
}

pub fn import(path: &Path) -> Result<Sheet> {
    import_with_options(path, &ImportOptions::default())
}

pub fn import_with_options(path: &Path, options: &ImportOptions) -> Result<Sheet> {
    let content = read_file_as_utf8(path)?;
    let delimiter = options.delimiter.unwrap_or_else(|| sniff_delimiter(&content));
    let mut records = read_records(&content, delimiter)?;

    let titles = if options.titles && !records.is_empty() { Some(records.remove(0)) } else { None };
    let cols = records
        .iter()
        .chain(titles.iter())
        .map(Vec::len)
        .max()
        .unwrap_or(0);

    let mut sheet = Sheet::from_rows(&records);
    if sheet.cols() < cols as u32 {
        sheet.set_size(sheet.rows(), cols as u32);
    }
    if let Some(titles) = titles {
        for (c, title) in titles.iter().enumerate() {
            sheet.set_value(0, c as u32 + 1, title);
        }
    }
    sheet.name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| sheet.name.clone());
    info!("import: {} rows x {} cols from {}", sheet.rows(), sheet.cols(), path.display());
    Ok(sheet)
}

/// Read a file into a live grid as one undoable `IMPORT` operation, placed
/// like a paste. Returns false when the write was refused or cancelled.
pub fn import_into<G: GridAccessor>(matrix: &mut Matrix<G>, path: &Path, anchor: Option<(u32, u32)>) -> Result<bool> {
    let content = read_file_as_utf8(path)?;
    let records = read_records(&content, sniff_delimiter(&content))?;
    if matrix.import_rows(anchor, &records) {
        return Ok(true);
    }
    match matrix.take_last_error() {
        Some(err) => Err(err.into()),
        None => Ok(false),
    }
}

fn read_records(content: &str, delimiter: u8) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        records.push(record.iter().map(str::to_string).collect());
    }
    debug!("import: {} records, delimiter {:?}", records.len(), delimiter as char);
    Ok(records)
}

/// Guess the field delimiter from the first ten lines.
///
/// A candidate scores the number of lines whose field count equals the first
/// line's, times that count. Single-field candidates never win; comma is the
/// fallback.
pub fn sniff_delimiter(content: &str) -> u8 {
    const CANDIDATES: [u8; 4] = [b'\t', b';', b',', b'|'];
    let sample: Vec<&str> = content.lines().take(10).collect();
    if sample.is_empty() {
        return b',';
    }

    let mut best = (b',', 0u64);
    for delim in CANDIDATES {
        let counts: Vec<usize> = sample
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        let width = counts.first().copied().unwrap_or(0);
        if width <= 1 {
            continue;
        }
        let agreeing = counts.iter().filter(|&&c| c == width).count() as u64;
        let score = agreeing * width as u64;
        if score > best.1 {
            best = (delim, score);
        }
    }
    best.0
}

/// Read a file as UTF-8, falling back to Windows-1252 for legacy exports.
pub fn read_file_as_utf8(path: &Path) -> Result<String> {
    let mut file = std::fs::File::open(path).map_err(|e| IoError::open(path, e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| IoError::open(path, e))?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            debug!("import: {} is not UTF-8, decoded as Windows-1252", path.display());
            Ok(decoded.into_owned())
        }
    }
}
