//! Declarative description of one fixed-width field.

use regex::Regex;
use sua_model::FieldType;

use crate::error::SchemaError;

/// One field of a fixed-width record: a 1-indexed inclusive byte span, a
/// semantic type, and extraction constraints.
///
/// Offsets are immutable once defined; overlap and contiguity across the
/// fields of a record type are enforced by
/// [`RecordSchema::new`](crate::RecordSchema::new).
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    name: String,
    label: String,
    start: usize,
    end: usize,
    field_type: FieldType,
    required: bool,
    trim: bool,
    pad: Option<char>,
    pattern: Option<Regex>,
    /// Accepted spellings mapped to their canonical value. Two spellings
    /// may share one canonical code (alias enums).
    allowed: Option<Vec<(String, String)>>,
    no_future: bool,
}

impl FieldDefinition {
    /// A trimmed, optional field. Constraints attach via the `with_*`
    /// builders; offset invariants are checked when the record schema is
    /// assembled.
    pub fn new(name: &str, label: &str, start: usize, end: usize, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            start,
            end,
            field_type,
            required: false,
            trim: true,
            pad: None,
            pattern: None,
            allowed: None,
            no_future: false,
        }
    }

    /// Mark the field as required: an empty extraction is a field-level
    /// violation.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Keep surrounding whitespace on extraction.
    pub fn no_trim(mut self) -> Self {
        self.trim = false;
        self
    }

    /// Declare the pad character used on the wire (informational; numeric
    /// extraction already strips leading zeros).
    pub fn padded(mut self, pad: char) -> Self {
        self.pad = Some(pad);
        self
    }

    /// Constrain the trimmed payload to a regular expression.
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, SchemaError> {
        let compiled = Regex::new(pattern).map_err(|source| SchemaError::BadPattern {
            field: self.name.clone(),
            pattern: pattern.to_string(),
            source,
        })?;
        self.pattern = Some(compiled);
        Ok(self)
    }

    /// Constrain the trimmed payload to an enumerated set of
    /// (accepted spelling, canonical value) pairs.
    pub fn with_allowed(mut self, pairs: &[(&str, &str)]) -> Self {
        self.allowed = Some(
            pairs
                .iter()
                .map(|(accepted, canonical)| (accepted.to_string(), canonical.to_string()))
                .collect(),
        );
        self
    }

    /// Date fields only: the value must not lie after the evaluation date.
    pub fn reject_future(mut self) -> Self {
        self.no_future = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// 1-indexed inclusive start offset.
    pub fn start(&self) -> usize {
        self.start
    }

    /// 1-indexed inclusive end offset.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Field width in characters.
    pub fn width(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn trim(&self) -> bool {
        self.trim
    }

    pub fn pad(&self) -> Option<char> {
        self.pad
    }

    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    pub fn allowed(&self) -> Option<&[(String, String)]> {
        self.allowed.as_deref()
    }

    /// Resolve an accepted spelling to its canonical value.
    pub fn canonical_value(&self, observed: &str) -> Option<&str> {
        self.allowed.as_ref().and_then(|pairs| {
            pairs
                .iter()
                .find(|(accepted, _)| accepted == observed)
                .map(|(_, canonical)| canonical.as_str())
        })
    }

    pub fn rejects_future(&self) -> bool {
        self.no_future
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_from_inclusive_offsets() {
        let field = FieldDefinition::new("nss", "Social security number", 3, 13, FieldType::Text);
        assert_eq!(field.width(), 11);
        assert_eq!(field.start(), 3);
        assert_eq!(field.end(), 13);
    }

    #[test]
    fn bad_pattern_is_a_schema_error() {
        let result = FieldDefinition::new("x", "X", 1, 2, FieldType::Text).with_pattern("[");
        assert!(matches!(result, Err(SchemaError::BadPattern { .. })));
    }

    #[test]
    fn alias_spellings_share_a_canonical_value() {
        let field = FieldDefinition::new("worker_status", "Worker status", 40, 41, FieldType::Text)
            .with_allowed(&[("01", "01"), ("AC", "01"), ("02", "02"), ("BA", "02")]);
        assert_eq!(field.canonical_value("AC"), Some("01"));
        assert_eq!(field.canonical_value("01"), Some("01"));
        assert_eq!(field.canonical_value("ZZ"), None);
    }
}
