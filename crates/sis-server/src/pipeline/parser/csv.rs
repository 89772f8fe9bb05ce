//! CSV upload parsing.

use std::collections::BTreeMap;

use ::csv::{ReaderBuilder, Trim};

use super::{ParseError, ParsedRow, ParsedUpload};

pub(super) fn parse(bytes: &[u8]) -> Result<ParsedUpload, ParseError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ParseError::Empty);
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    super::check_headers(&headers)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        // A row with the wrong field count fails the whole parse; the error
        // carries the offending line number.
        let record = record?;
        let mut data = BTreeMap::new();
        for (header, value) in headers.iter().zip(record.iter()) {
            if !value.is_empty() {
                data.insert(header.clone(), value.to_string());
            }
        }
        rows.push(ParsedRow { row_number: rows.len() as u32 + 1, data });
    }

    Ok(ParsedUpload { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_with_one_based_numbering() {
        let upload = parse(b"student_code,first_name\nS001,Ana\nS002,Ben\n").unwrap();
        assert_eq!(upload.headers, vec!["student_code", "first_name"]);
        assert_eq!(upload.rows.len(), 2);
        assert_eq!(upload.rows[0].row_number, 1);
        assert_eq!(upload.rows[1].row_number, 2);
        assert_eq!(
            upload.rows[1].data.get("student_code").map(String::as_str),
            Some("S002")
        );
    }

    #[test]
    fn blank_cells_are_absent() {
        let upload = parse(b"a,b,c\n1,,3\n").unwrap();
        let data = &upload.rows[0].data;
        assert!(data.contains_key("a"));
        assert!(!data.contains_key("b"));
        assert!(data.contains_key("c"));
    }

    #[test]
    fn values_are_trimmed() {
        let upload = parse(b"a,b\n  1  , x \n").unwrap();
        assert_eq!(upload.rows[0].data.get("a").map(String::as_str), Some("1"));
        assert_eq!(upload.rows[0].data.get("b").map(String::as_str), Some("x"));
    }

    #[test]
    fn header_only_file_parses_with_zero_rows() {
        let upload = parse(b"a,b,c\n").unwrap();
        assert!(upload.rows.is_empty());
    }

    #[test]
    fn empty_file_is_a_parse_error() {
        assert!(matches!(parse(b""), Err(ParseError::Empty)));
        assert!(matches!(parse(b"  \n  "), Err(ParseError::Empty)));
    }

    #[test]
    fn duplicate_header_is_a_parse_error() {
        assert!(matches!(
            parse(b"a,b,a\n1,2,3\n"),
            Err(ParseError::DuplicateColumn(_))
        ));
    }

    #[test]
    fn ragged_row_is_a_parse_error() {
        let err = parse(b"a,b\n1,2,3\n").unwrap_err();
        assert!(matches!(err, ParseError::Csv(_)));
    }

    #[test]
    fn quoted_fields_keep_commas() {
        let upload = parse(b"a,b\n\"x, y\",2\n").unwrap();
        assert_eq!(upload.rows[0].data.get("a").map(String::as_str), Some("x, y"));
    }
}
