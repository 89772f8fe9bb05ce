//! Resource schemas.
//!
//! Each importable resource type declares its columns, typing, natural key,
//! and references to other resources. The validator, commit executor, and
//! export serializers are all driven from these tables; adding a resource
//! type means adding a schema here.

use std::collections::BTreeMap;

use sis_common::types::ResourceType;

use crate::store::Record;

/// One column of a resource.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub required: bool,
    pub kind: FieldKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Integer { min: i64, max: i64 },
    Grade,
}

/// Schema for one resource type.
#[derive(Debug)]
pub struct ResourceSchema {
    pub resource_type: ResourceType,
    pub fields: &'static [FieldSpec],
    /// Fields whose values form the natural key, joined in order.
    pub key_fields: &'static [&'static str],
    /// Fields that must name an existing record of another resource type.
    pub references: &'static [(&'static str, ResourceType)],
}

static STUDENTS: ResourceSchema = ResourceSchema {
    resource_type: ResourceType::Students,
    fields: &[
        FieldSpec { name: "student_code", required: true, kind: FieldKind::Text },
        FieldSpec { name: "first_name", required: true, kind: FieldKind::Text },
        FieldSpec { name: "last_name", required: true, kind: FieldKind::Text },
        FieldSpec { name: "email", required: true, kind: FieldKind::Email },
        FieldSpec {
            name: "enrollment_year",
            required: false,
            kind: FieldKind::Integer { min: 1900, max: 2100 },
        },
        FieldSpec { name: "major", required: false, kind: FieldKind::Text },
    ],
    key_fields: &["student_code"],
    references: &[],
};

static COURSES: ResourceSchema = ResourceSchema {
    resource_type: ResourceType::Courses,
    fields: &[
        FieldSpec { name: "course_code", required: true, kind: FieldKind::Text },
        FieldSpec { name: "title", required: true, kind: FieldKind::Text },
        FieldSpec {
            name: "credits",
            required: true,
            kind: FieldKind::Integer { min: 0, max: 30 },
        },
        FieldSpec { name: "department", required: false, kind: FieldKind::Text },
        FieldSpec { name: "instructor", required: false, kind: FieldKind::Text },
    ],
    key_fields: &["course_code"],
    references: &[],
};

static GRADES: ResourceSchema = ResourceSchema {
    resource_type: ResourceType::Grades,
    fields: &[
        FieldSpec { name: "student_code", required: true, kind: FieldKind::Text },
        FieldSpec { name: "course_code", required: true, kind: FieldKind::Text },
        FieldSpec { name: "term", required: true, kind: FieldKind::Text },
        FieldSpec { name: "grade", required: true, kind: FieldKind::Grade },
    ],
    key_fields: &["student_code", "course_code", "term"],
    references: &[
        ("student_code", ResourceType::Students),
        ("course_code", ResourceType::Courses),
    ],
};

impl ResourceSchema {
    pub fn for_resource(resource: ResourceType) -> &'static ResourceSchema {
        match resource {
            ResourceType::Students => &STUDENTS,
            ResourceType::Courses => &COURSES,
            ResourceType::Grades => &GRADES,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Column names in declaration order. Exports use these as headers.
    pub fn headers(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.to_string()).collect()
    }

    /// The natural key of a row, or `None` when any key field is missing or
    /// blank. Composite keys join their parts with `:`.
    pub fn natural_key(&self, data: &BTreeMap<String, String>) -> Option<String> {
        let mut parts = Vec::with_capacity(self.key_fields.len());
        for field in self.key_fields {
            let value = data.get(*field).map(|v| v.trim()).filter(|v| !v.is_empty())?;
            parts.push(value);
        }
        Some(parts.join(":"))
    }

    /// Reduce a parsed row to the schema's columns, trimming values.
    /// Unknown columns are dropped; they never reach the entity store.
    pub fn project(&self, data: &BTreeMap<String, String>) -> Record {
        self.fields
            .iter()
            .filter_map(|field| {
                data.get(field.name)
                    .map(|v| v.trim())
                    .filter(|v| !v.is_empty())
                    .map(|v| (field.name.to_string(), v.to_string()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn natural_key_for_single_key_field() {
        let schema = ResourceSchema::for_resource(ResourceType::Students);
        let key = schema.natural_key(&row(&[("student_code", " S001 "), ("first_name", "Ana")]));
        assert_eq!(key.as_deref(), Some("S001"));
    }

    #[test]
    fn natural_key_joins_composite_parts_in_order() {
        let schema = ResourceSchema::for_resource(ResourceType::Grades);
        let key = schema.natural_key(&row(&[
            ("course_code", "CS101"),
            ("student_code", "S001"),
            ("term", "2026-spring"),
        ]));
        assert_eq!(key.as_deref(), Some("S001:CS101:2026-spring"));
    }

    #[test]
    fn natural_key_missing_when_key_field_blank() {
        let schema = ResourceSchema::for_resource(ResourceType::Students);
        assert!(schema.natural_key(&row(&[("first_name", "Ana")])).is_none());
        assert!(schema.natural_key(&row(&[("student_code", "  ")])).is_none());
    }

    #[test]
    fn project_drops_unknown_columns_and_blanks() {
        let schema = ResourceSchema::for_resource(ResourceType::Courses);
        let record = schema.project(&row(&[
            ("course_code", "CS101"),
            ("title", " Intro "),
            ("credits", "4"),
            ("instructor", ""),
            ("not_a_column", "x"),
        ]));
        assert_eq!(record.get("title").map(String::as_str), Some("Intro"));
        assert!(!record.contains_key("not_a_column"));
        assert!(!record.contains_key("instructor"));
    }
}
