//! Preview assembly.
//!
//! A preview is a pure projection of validated rows: aggregate counts over
//! the whole upload plus at most `display_cap` per-row entries. The counts
//! always reflect every row; only the row list is truncated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sis_common::types::{RowAction, ValidationIssue};

use crate::pipeline::validate::ValidatedRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowValidationStatus {
    Valid,
    Warning,
    Error,
}

/// One row as shown to the operator before committing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowPreview {
    pub row_number: u32,
    pub action: RowAction,
    pub validation_status: RowValidationStatus,
    pub data: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<ValidationIssue>,
}

/// How many rows resolved to each action, over the whole upload.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ActionSummary {
    pub create: u64,
    pub update: u64,
    pub skip: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportPreview {
    pub total_rows: u64,
    pub valid_rows: u64,
    pub rows_with_warnings: u64,
    pub rows_with_errors: u64,
    pub can_proceed: bool,
    pub summary: ActionSummary,
    pub rows: Vec<RowPreview>,
}

/// Build a preview from validated rows, truncating the row list to
/// `display_cap` entries.
pub fn build_preview(rows: &[ValidatedRow], display_cap: usize) -> ImportPreview {
    let mut valid_rows = 0u64;
    let mut rows_with_warnings = 0u64;
    let mut rows_with_errors = 0u64;
    let mut summary = ActionSummary::default();

    for row in rows {
        if row.has_errors() {
            rows_with_errors += 1;
        } else if row.has_warnings() {
            rows_with_warnings += 1;
        } else {
            valid_rows += 1;
        }
        match row.action {
            RowAction::Create => summary.create += 1,
            RowAction::Update => summary.update += 1,
            RowAction::Skip => summary.skip += 1,
        }
    }

    let previews = rows
        .iter()
        .take(display_cap)
        .map(|row| RowPreview {
            row_number: row.row_number,
            action: row.action,
            validation_status: if row.has_errors() {
                RowValidationStatus::Error
            } else if row.has_warnings() {
                RowValidationStatus::Warning
            } else {
                RowValidationStatus::Valid
            },
            data: row.data.clone(),
            issues: row.issues.clone(),
        })
        .collect();

    ImportPreview {
        total_rows: rows.len() as u64,
        valid_rows,
        rows_with_warnings,
        rows_with_errors,
        can_proceed: rows_with_errors == 0,
        summary,
        rows: previews,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sis_common::types::{IssueKind, ValidationIssue};

    fn row(number: u32, action: RowAction, issues: Vec<ValidationIssue>) -> ValidatedRow {
        ValidatedRow {
            row_number: number,
            data: BTreeMap::new(),
            action,
            natural_key: Some(format!("K{number}")),
            issues,
        }
    }

    #[test]
    fn counts_cover_all_rows_list_is_capped() {
        let rows: Vec<ValidatedRow> = (1..=250)
            .map(|n| row(n, RowAction::Create, Vec::new()))
            .collect();

        let preview = build_preview(&rows, 100);
        assert_eq!(preview.total_rows, 250);
        assert_eq!(preview.valid_rows, 250);
        assert_eq!(preview.summary.create, 250);
        assert_eq!(preview.rows.len(), 100);
        assert_eq!(preview.rows[99].row_number, 100);
    }

    #[test]
    fn can_proceed_iff_no_error_rows() {
        let warning = ValidationIssue::warning(IssueKind::Duplicate, "dup");
        let error = ValidationIssue::error(IssueKind::MissingField, "missing");

        let preview = build_preview(
            &[
                row(1, RowAction::Create, Vec::new()),
                row(2, RowAction::Skip, vec![warning.clone()]),
            ],
            100,
        );
        assert!(preview.can_proceed);
        assert_eq!(preview.rows_with_warnings, 1);

        let preview = build_preview(
            &[
                row(1, RowAction::Create, Vec::new()),
                row(2, RowAction::Skip, vec![error]),
            ],
            100,
        );
        assert!(!preview.can_proceed);
        assert_eq!(preview.rows_with_errors, 1);
    }

    #[test]
    fn error_takes_precedence_over_warning_per_row() {
        let issues = vec![
            ValidationIssue::warning(IssueKind::Duplicate, "dup"),
            ValidationIssue::error(IssueKind::InvalidValue, "bad"),
        ];
        let preview = build_preview(&[row(1, RowAction::Skip, issues)], 100);
        assert_eq!(preview.rows_with_errors, 1);
        assert_eq!(preview.rows_with_warnings, 0);
        assert_eq!(preview.rows[0].validation_status, RowValidationStatus::Error);
    }

    #[test]
    fn empty_upload_previews_as_proceedable() {
        let preview = build_preview(&[], 100);
        assert_eq!(preview.total_rows, 0);
        assert!(preview.can_proceed);
        assert!(preview.rows.is_empty());
    }
}
