//! Ordered field layouts per record type.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::field::FieldDefinition;

/// Structural role of a record type within a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Header,
    Detail,
    Footer,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Header => "header",
            RecordKind::Detail => "detail",
            RecordKind::Footer => "footer",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The ordered field layout for one record type, plus its exact expected
/// line length.
///
/// Construction enforces the layout invariants: the discriminator field
/// comes first, offsets tile the line contiguously with no overlap, field
/// names are unique, and the fields end exactly at the declared line
/// length. Violations are configuration bugs and fail loudly at load time.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    code: String,
    kind: RecordKind,
    line_length: usize,
    fields: Vec<FieldDefinition>,
}

impl RecordSchema {
    pub fn new(
        code: &str,
        kind: RecordKind,
        line_length: usize,
        fields: Vec<FieldDefinition>,
    ) -> Result<Self, SchemaError> {
        if fields.is_empty() {
            return Err(SchemaError::EmptyRecord {
                code: code.to_string(),
            });
        }

        let mut expected_start = 1;
        let mut seen = std::collections::BTreeSet::new();
        for field in &fields {
            if field.end() < field.start() {
                return Err(SchemaError::BadOffsets {
                    field: field.name().to_string(),
                    start: field.start(),
                    end: field.end(),
                });
            }
            if field.start() != expected_start {
                return Err(SchemaError::NotContiguous {
                    code: code.to_string(),
                    field: field.name().to_string(),
                    expected: expected_start,
                    actual: field.start(),
                });
            }
            if !seen.insert(field.name().to_string()) {
                return Err(SchemaError::DuplicateField {
                    code: code.to_string(),
                    field: field.name().to_string(),
                });
            }
            expected_start = field.end() + 1;
        }

        let derived = expected_start - 1;
        if derived != line_length {
            return Err(SchemaError::LineLengthMismatch {
                code: code.to_string(),
                declared: line_length,
                derived,
            });
        }

        Ok(Self {
            code: code.to_string(),
            kind,
            line_length,
            fields,
        })
    }

    /// Record-type discriminator value (e.g. `"01"`).
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Exact expected line length in characters.
    pub fn line_length(&self) -> usize {
        self.line_length
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    /// The discriminator's own field definition (always first).
    pub fn discriminator_field(&self) -> &FieldDefinition {
        &self.fields[0]
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name() == name)
    }
}
