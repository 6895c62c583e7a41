//! Parsed records and the violations attached to them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::FieldValue;

/// Severity of a recorded violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where in the pipeline a violation was detected.
///
/// Structural failures (line shape, discriminator) are recorded before any
/// field parsing; field failures during extraction; rule failures when a
/// validator rule's condition tree evaluates true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationKind {
    Structural,
    Field,
    Rule,
}

/// One recorded violation against a single line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub line_number: usize,
    pub rule_code: String,
    pub field: Option<String>,
    pub severity: Severity,
    pub kind: ViolationKind,
    pub message: String,
    pub observed: Option<String>,
    pub expected: Option<String>,
}

/// A fixed-width line after schema-driven extraction.
///
/// Produced by the line parser for every physical line and consumed
/// immediately by the validation engine; never persisted by the core.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRecord {
    /// 1-indexed physical line number.
    pub line_number: usize,
    /// Record-type discriminator as read from the line.
    pub record_type: String,
    /// Extracted values keyed by field name.
    pub fields: BTreeMap<String, FieldValue>,
    /// The raw line, kept only when requested.
    pub raw: Option<String>,
    /// Pre-trim field slices, kept only when requested.
    pub raw_fields: BTreeMap<String, String>,
    /// Structural, field and rule violations recorded so far.
    pub violations: Vec<Violation>,
}

impl ParsedRecord {
    pub fn new(line_number: usize, record_type: impl Into<String>) -> Self {
        Self {
            line_number,
            record_type: record_type.into(),
            fields: BTreeMap::new(),
            raw: None,
            raw_fields: BTreeMap::new(),
            violations: Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    pub fn push_violation(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// A record is valid while no error-severity violation is recorded.
    pub fn is_valid(&self) -> bool {
        self.error_count() == 0
    }

    pub fn error_count(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Warning)
            .count()
    }

    pub fn has_structural_violations(&self) -> bool {
        self.violations
            .iter()
            .any(|v| v.kind == ViolationKind::Structural)
    }
}
