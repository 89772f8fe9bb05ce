//! Upload parsing.
//!
//! Each source format is reduced to the same shape: a header list and a
//! sequence of rows holding raw string values. Row numbers are 1-based over
//! data rows and deterministic for a given upload, so a row keeps its number
//! between preview and commit.
//!
//! Anything wrong with the file as a whole (empty, broken header, malformed
//! row) is a [`ParseError`] and fails the job; per-row content problems are
//! the validator's business, not the parser's.

use std::collections::{BTreeMap, HashSet};

use sis_common::types::SourceFormat;

mod csv;
mod json;
mod xlsx;

/// One parsed data row. Blank cells are absent from `data`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub row_number: u32,
    pub data: BTreeMap<String, String>,
}

/// A fully parsed upload.
#[derive(Debug, Clone)]
pub struct ParsedUpload {
    pub headers: Vec<String>,
    pub rows: Vec<ParsedRow>,
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("file contains no data")]
    Empty,
    #[error("missing header row")]
    MissingHeader,
    #[error("column {0} in the header row is blank")]
    BlankColumn(usize),
    #[error("duplicate column '{0}' in the header row")]
    DuplicateColumn(String),
    #[error("workbook has no worksheets")]
    NoWorksheet,
    #[error("JSON root must be an array of objects")]
    JsonNotArray,
    #[error("JSON element {0} is not an object")]
    JsonRowNotObject(u32),
    #[error("malformed CSV: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed workbook: {0}")]
    Xlsx(#[from] calamine::XlsxError),
}

/// Parse an upload according to its declared source format.
pub fn parse(bytes: &[u8], format: SourceFormat) -> Result<ParsedUpload, ParseError> {
    match format {
        SourceFormat::Csv => self::csv::parse(bytes),
        SourceFormat::Json => self::json::parse(bytes),
        SourceFormat::Xlsx => self::xlsx::parse(bytes),
    }
}

/// Header sanity shared by all formats: at least one column, no blank names,
/// no duplicates.
fn check_headers(headers: &[String]) -> Result<(), ParseError> {
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ParseError::MissingHeader);
    }
    let mut seen = HashSet::new();
    for (index, name) in headers.iter().enumerate() {
        let name = name.trim();
        if name.is_empty() {
            return Err(ParseError::BlankColumn(index + 1));
        }
        if !seen.insert(name.to_string()) {
            return Err(ParseError::DuplicateColumn(name.to_string()));
        }
    }
    Ok(())
}
