//! JSON upload parsing.
//!
//! The root must be an array of flat objects. The first object's keys define
//! the columns; scalar values are stringified, null and nested values are
//! treated as absent.

use std::collections::BTreeMap;

use serde_json::Value;

use super::{ParseError, ParsedRow, ParsedUpload};

pub(super) fn parse(bytes: &[u8]) -> Result<ParsedUpload, ParseError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ParseError::Empty);
    }

    let root: Value = serde_json::from_slice(bytes)?;
    let items = root.as_array().ok_or(ParseError::JsonNotArray)?;
    if items.is_empty() {
        return Err(ParseError::Empty);
    }

    let first = items[0].as_object().ok_or(ParseError::JsonRowNotObject(1))?;
    let headers: Vec<String> = first.keys().cloned().collect();
    super::check_headers(&headers)?;

    let mut rows = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let object = item
            .as_object()
            .ok_or(ParseError::JsonRowNotObject(index as u32 + 1))?;
        let mut data = BTreeMap::new();
        for (key, value) in object {
            if let Some(text) = scalar_to_string(value) {
                if !text.is_empty() {
                    data.insert(key.clone(), text);
                }
            }
        }
        rows.push(ParsedRow { row_number: index as u32 + 1, data });
    }

    Ok(ParsedUpload { headers, rows })
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
