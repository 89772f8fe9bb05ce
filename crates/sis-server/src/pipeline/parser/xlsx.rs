//! XLSX upload parsing.
//!
//! Reads the first worksheet. The first row is the header; numeric cells
//! holding whole numbers are rendered without a decimal point so codes and
//! years survive the spreadsheet round trip. Fully blank rows are dropped and
//! do not consume row numbers.

use std::collections::BTreeMap;
use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};

use super::{ParseError, ParsedRow, ParsedUpload};

pub(super) fn parse(bytes: &[u8]) -> Result<ParsedUpload, ParseError> {
    let mut workbook = Xlsx::new(Cursor::new(bytes))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ParseError::NoWorksheet)?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut row_iter = range.rows();
    let header_row = row_iter.next().ok_or(ParseError::Empty)?;
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| cell_to_string(cell).unwrap_or_default().trim().to_string())
        .collect();
    super::check_headers(&headers)?;

    let mut rows = Vec::new();
    for row in row_iter {
        let mut data = BTreeMap::new();
        for (header, cell) in headers.iter().zip(row.iter()) {
            if let Some(text) = cell_to_string(cell) {
                let text = text.trim();
                if !text.is_empty() {
                    data.insert(header.clone(), text.to_string());
                }
            }
        }
        if data.is_empty() {
            continue;
        }
        rows.push(ParsedRow { row_number: rows.len() as u32 + 1, data });
    }

    Ok(ParsedUpload { headers, rows })
}

fn cell_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                Some(format!("{}", *f as i64))
            } else {
                Some(f.to_string())
            }
        },
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => Some(dt.as_f64().to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
    }
}
