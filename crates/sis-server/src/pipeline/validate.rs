//! Row validation and action resolution.
//!
//! Validation runs in a fixed order per row: structural checks, identity
//! resolution against the entity store, within-batch duplicate handling,
//! then business rules. The row's resolved action is downgraded to skip the
//! moment any error-severity issue appears, so preview and commit agree on
//! what would happen.
//!
//! The pass itself is pure. All entity store reads happen up front when the
//! [`ValidationContext`] is loaded, which is what lets preview run the exact
//! same code with no side effects.

use std::collections::{BTreeMap, HashMap, HashSet};

use sis_common::types::{ImportOptions, IssueKind, IssueSeverity, ResourceType, RowAction, ValidationIssue};

use crate::pipeline::parser::ParsedRow;
use crate::pipeline::schema::{FieldKind, FieldSpec, ResourceSchema};
use crate::store::{EntityStore, EntityStoreError};

/// Snapshot of the entity store state a validation pass runs against.
pub struct ValidationContext {
    /// Natural keys already stored for the resource being imported.
    pub existing_keys: HashSet<String>,
    /// Natural keys of referenced resource types, for reference checks.
    pub reference_keys: HashMap<ResourceType, HashSet<String>>,
}

impl ValidationContext {
    /// Load the keys a validation pass needs for `resource`.
    pub async fn load(
        store: &dyn EntityStore,
        resource: ResourceType,
    ) -> Result<Self, EntityStoreError> {
        let schema = ResourceSchema::for_resource(resource);
        let existing_keys = store.keys(resource).await?;

        let mut reference_keys = HashMap::new();
        for (_, target) in schema.references {
            if !reference_keys.contains_key(target) {
                reference_keys.insert(*target, store.keys(*target).await?);
            }
        }

        Ok(Self { existing_keys, reference_keys })
    }

    /// A context with no known records. Useful in tests.
    pub fn empty() -> Self {
        Self {
            existing_keys: HashSet::new(),
            reference_keys: HashMap::new(),
        }
    }
}

/// A parsed row plus everything validation decided about it.
#[derive(Debug, Clone)]
pub struct ValidatedRow {
    pub row_number: u32,
    pub data: BTreeMap<String, String>,
    pub action: RowAction,
    pub natural_key: Option<String>,
    pub issues: Vec<ValidationIssue>,
}

impl ValidatedRow {
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == IssueSeverity::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.issues.iter().any(|i| i.severity == IssueSeverity::Warning)
    }
}

/// Validate every row of an upload in order.
pub fn validate_rows(
    schema: &ResourceSchema,
    rows: &[ParsedRow],
    options: ImportOptions,
    ctx: &ValidationContext,
) -> Vec<ValidatedRow> {
    let mut seen_keys: HashSet<String> = HashSet::new();
    rows.iter()
        .map(|row| validate_row(schema, row, options, ctx, &mut seen_keys))
        .collect()
}

fn validate_row(
    schema: &ResourceSchema,
    row: &ParsedRow,
    options: ImportOptions,
    ctx: &ValidationContext,
    seen_keys: &mut HashSet<String>,
) -> ValidatedRow {
    let mut issues = Vec::new();

    // Structural: required fields present, typed fields coercible.
    for field in schema.fields {
        match field_value(&row.data, field.name) {
            None => {
                if field.required {
                    issues.push(ValidationIssue::error(
                        IssueKind::MissingField,
                        format!("required field '{}' is missing", field.name),
                    ));
                }
            },
            Some(raw) => {
                if let Some(issue) = coercion_issue(field, raw) {
                    issues.push(issue);
                }
            },
        }
    }

    // Identity resolution against the entity store snapshot.
    let natural_key = schema.natural_key(&row.data);
    let mut action = RowAction::Create;
    if let Some(key) = &natural_key {
        if ctx.existing_keys.contains(key) {
            if options.allow_updates {
                action = RowAction::Update;
            } else {
                action = RowAction::Skip;
                issues.push(ValidationIssue::warning(
                    IssueKind::Duplicate,
                    format!("'{key}' already exists and updates are not enabled"),
                ));
            }
        }

        // Within-batch duplicates: later occurrences lose.
        let first_occurrence = seen_keys.insert(key.clone());
        if !first_occurrence && options.skip_duplicates {
            action = RowAction::Skip;
            issues.push(ValidationIssue::warning(
                IssueKind::Duplicate,
                format!("'{key}' appears earlier in this upload"),
            ));
        }
    }

    // Business rules: value ranges and references.
    for field in schema.fields {
        if let Some(raw) = field_value(&row.data, field.name) {
            if let Some(issue) = business_issue(field, raw) {
                issues.push(issue);
            }
        }
    }
    for (field_name, target) in schema.references {
        if let Some(raw) = field_value(&row.data, field_name) {
            if let Some(known) = ctx.reference_keys.get(target) {
                if !known.contains(raw) {
                    issues.push(ValidationIssue::error(
                        IssueKind::UnknownReference,
                        format!("no {} record with key '{raw}'", target.as_str()),
                    ));
                }
            }
        }
    }

    // An error-severity issue means the row must not be written.
    if issues.iter().any(|i| i.severity == IssueSeverity::Error) {
        action = RowAction::Skip;
    }

    ValidatedRow {
        row_number: row.row_number,
        data: row.data.clone(),
        action,
        natural_key,
        issues,
    }
}

fn field_value<'a>(data: &'a BTreeMap<String, String>, name: &str) -> Option<&'a str> {
    data.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Structural typing: is the raw value the right shape at all?
fn coercion_issue(field: &FieldSpec, raw: &str) -> Option<ValidationIssue> {
    match field.kind {
        FieldKind::Text | FieldKind::Email | FieldKind::Grade => None,
        FieldKind::Integer { .. } => {
            if raw.parse::<i64>().is_err() {
                Some(ValidationIssue::error(
                    IssueKind::InvalidValue,
                    format!("field '{}' must be a whole number, got '{raw}'", field.name),
                ))
            } else {
                None
            }
        },
    }
}

/// Business rules: values that parse but are out of bounds or malformed.
fn business_issue(field: &FieldSpec, raw: &str) -> Option<ValidationIssue> {
    match field.kind {
        FieldKind::Text => None,
        FieldKind::Email => {
            if valid_email(raw) {
                None
            } else {
                Some(ValidationIssue::error(
                    IssueKind::InvalidValue,
                    format!("'{raw}' is not a valid email address"),
                ))
            }
        },
        FieldKind::Integer { min, max } => match raw.parse::<i64>() {
            Ok(value) if value < min || value > max => Some(ValidationIssue::error(
                IssueKind::InvalidValue,
                format!("field '{}' must be between {min} and {max}, got {value}", field.name),
            )),
            _ => None,
        },
        FieldKind::Grade => {
            if valid_grade(raw) {
                None
            } else {
                Some(ValidationIssue::error(
                    IssueKind::InvalidValue,
                    format!("'{raw}' is not a letter grade (A-F) or a score from 0 to 100"),
                ))
            }
        },
    }
}

fn valid_email(raw: &str) -> bool {
    match raw.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

fn valid_grade(raw: &str) -> bool {
    let upper = raw.to_ascii_uppercase();
    let letter = upper
        .strip_suffix('+')
        .or_else(|| upper.strip_suffix('-'))
        .unwrap_or(&upper);
    if matches!(letter, "A" | "B" | "C" | "D" | "F") {
        return true;
    }
    matches!(raw.parse::<i64>(), Ok(score) if (0..=100).contains(&score))
}
