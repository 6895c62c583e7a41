//! Schema construction errors.
//!
//! Every variant here is a deployment/configuration defect, raised once at
//! schema-load time. Bad input data never produces a `SchemaError`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    /// A record type with no fields.
    #[error("record type {code:?} declares no fields")]
    EmptyRecord { code: String },

    /// A field whose end offset precedes its start.
    #[error("field {field:?}: end offset {end} precedes start offset {start}")]
    BadOffsets {
        field: String,
        start: usize,
        end: usize,
    },

    /// Fields must tile the line without gaps or overlap.
    #[error(
        "record type {code:?}: field {field:?} starts at {actual}, expected {expected} \
         (offsets must be contiguous and non-overlapping)"
    )]
    NotContiguous {
        code: String,
        field: String,
        expected: usize,
        actual: usize,
    },

    /// Sum of field lengths must equal the declared line length.
    #[error("record type {code:?}: fields end at {derived}, declared line length is {declared}")]
    LineLengthMismatch {
        code: String,
        declared: usize,
        derived: usize,
    },

    /// Field names are unique within a record type.
    #[error("record type {code:?}: duplicate field {field:?}")]
    DuplicateField { code: String, field: String },

    /// Record-type codes are unique within a file schema.
    #[error("duplicate record type {code:?}")]
    DuplicateRecordType { code: String },

    /// The discriminator field must be first and share one span across
    /// all record types of the file.
    #[error(
        "record type {code:?}: discriminator field spans {start}-{end}, \
         file declares {expected_start}-{expected_end}"
    )]
    DiscriminatorMismatch {
        code: String,
        start: usize,
        end: usize,
        expected_start: usize,
        expected_end: usize,
    },

    /// A field pattern that is not a valid regular expression.
    #[error("field {field:?}: invalid pattern {pattern:?}: {source}")]
    BadPattern {
        field: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// An aggregate referencing an unknown record type or field.
    #[error("aggregate {name:?} references unknown {what} {value:?}")]
    BadAggregate {
        name: String,
        what: &'static str,
        value: String,
    },

    /// A bundled rule referencing a record type the file does not define.
    #[error("rule {code:?} references unknown record type {record_type:?}")]
    UnknownRecordType { code: String, record_type: String },
}
