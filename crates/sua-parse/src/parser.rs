//! The fixed-width line parser.

use chrono::NaiveDate;
use tracing::debug;

use sua_model::{
    FieldType, FieldValue, Money, ParsedRecord, Severity, Violation, ViolationKind,
    parse_fixed_date, parse_fixed_date_not_after,
};
use sua_schema::{FieldDefinition, FileSchema, RecordSchema};

/// Structural violation: line length differs from the schema's declaration.
pub const STR_LINE_LENGTH: &str = "STR-LEN";
/// Structural violation: unreadable or unknown record-type discriminator.
pub const STR_RECORD_TYPE: &str = "STR-REC";
/// Field violation: required field extracted empty.
pub const FLD_REQUIRED: &str = "FLD-REQUIRED";
/// Field violation: numeric payload is not a zero-padded digit string.
pub const FLD_NUMERIC: &str = "FLD-NUMERIC";
/// Field violation: date payload is not a valid `YYYYMMDD` date.
pub const FLD_DATE: &str = "FLD-DATE";
/// Field violation: payload does not match the declared pattern.
pub const FLD_PATTERN: &str = "FLD-PATTERN";
/// Field violation: payload is outside the enumerated allowed values.
pub const FLD_ENUM: &str = "FLD-ENUM";
/// Field violation: flag payload is not a recognized boolean marker.
pub const FLD_FLAG: &str = "FLD-FLAG";

/// How to treat lines longer than the schema's declared length.
///
/// Observed feeds routinely carry trailing filler beyond the declared
/// layout, so the default tolerates excess; `Flag` records a structural
/// violation instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlengthPolicy {
    #[default]
    Tolerate,
    Flag,
}

/// Parser knobs. The evaluation date anchors every not-in-the-future
/// check so a run is reproducible regardless of wall-clock time.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    pub evaluation_date: NaiveDate,
    /// Keep the raw line and pre-trim field slices for diagnostics.
    pub keep_raw: bool,
    pub overlength: OverlengthPolicy,
}

impl ParseOptions {
    pub fn new(evaluation_date: NaiveDate) -> Self {
        Self {
            evaluation_date,
            keep_raw: false,
            overlength: OverlengthPolicy::default(),
        }
    }

    pub fn keep_raw(mut self) -> Self {
        self.keep_raw = true;
        self
    }

    pub fn strict_length(mut self) -> Self {
        self.overlength = OverlengthPolicy::Flag;
        self
    }
}

/// Parse one physical line against the file schema.
///
/// The discriminator field is read first, at the span the file schema
/// fixes across all of its record types, and routes the line to a record
/// layout. Everything after that is per-field extraction; a field beyond
/// the end of a short line extracts as empty while the short line itself
/// is reported once, as a structural violation.
pub fn parse_line(
    schema: &FileSchema,
    line_number: usize,
    line: &str,
    opts: &ParseOptions,
) -> ParsedRecord {
    let chars: Vec<char> = line.chars().collect();
    let (disc_start, disc_end) = schema.discriminator();
    let discriminator: String = slice(&chars, disc_start, disc_end).trim().to_string();

    let Some(record_schema) = schema.record(&discriminator) else {
        debug!(line_number, %discriminator, "unknown record type");
        let mut record = ParsedRecord::new(line_number, discriminator.clone());
        if opts.keep_raw {
            record.raw = Some(line.to_string());
        }
        record.push_violation(Violation {
            line_number,
            rule_code: STR_RECORD_TYPE.to_string(),
            field: None,
            severity: Severity::Error,
            kind: ViolationKind::Structural,
            message: if discriminator.is_empty() {
                "record-type discriminator is unreadable".to_string()
            } else {
                format!("unknown record type {discriminator:?}")
            },
            observed: Some(discriminator),
            expected: None,
        });
        return record;
    };

    let mut record = ParsedRecord::new(line_number, record_schema.code());
    if opts.keep_raw {
        record.raw = Some(line.to_string());
    }
    check_line_length(&mut record, record_schema, chars.len(), opts);

    for field in record_schema.fields() {
        extract_field(&mut record, field, &chars, schema, opts);
    }
    record
}

fn check_line_length(
    record: &mut ParsedRecord,
    record_schema: &RecordSchema,
    actual: usize,
    opts: &ParseOptions,
) {
    let declared = record_schema.line_length();
    let line_number = record.line_number;
    let violation = move |message: String| Violation {
        line_number,
        rule_code: STR_LINE_LENGTH.to_string(),
        field: None,
        severity: Severity::Error,
        kind: ViolationKind::Structural,
        message,
        observed: Some(actual.to_string()),
        expected: Some(declared.to_string()),
    };
    if actual < declared {
        debug!(line_number, actual, declared, "short line");
        record.push_violation(violation(format!(
            "line is {actual} characters, schema declares {declared}"
        )));
    } else if actual > declared && opts.overlength == OverlengthPolicy::Flag {
        record.push_violation(violation(format!(
            "line is {actual} characters with trailing excess, schema declares {declared}"
        )));
    }
}

fn extract_field(
    record: &mut ParsedRecord,
    field: &FieldDefinition,
    chars: &[char],
    schema: &FileSchema,
    opts: &ParseOptions,
) {
    let raw_slice = slice(chars, field.start(), field.end());
    if opts.keep_raw {
        record
            .raw_fields
            .insert(field.name().to_string(), raw_slice.clone());
    }
    // A field lying entirely beyond a short line extracts as empty; the
    // short line is already reported as one structural violation.
    let truncated = field.start() > chars.len();

    let payload = if field.trim() {
        raw_slice.trim().to_string()
    } else {
        raw_slice
    };

    if payload.is_empty() {
        if field.is_required() && !truncated {
            push_field_violation(
                record,
                field,
                FLD_REQUIRED,
                format!("{} is required but empty", field.label()),
                None,
                None,
            );
        }
        record.set_field(field.name(), FieldValue::Empty);
        return;
    }

    let value = match field.field_type() {
        FieldType::Text => extract_text(record, field, payload),
        FieldType::Integer => extract_integer(record, field, payload),
        FieldType::Currency => extract_currency(record, field, payload, schema),
        FieldType::Date => extract_date(record, field, payload, opts),
        FieldType::Flag => extract_flag(record, field, payload),
    };
    record.set_field(field.name(), value);
}

fn extract_text(record: &mut ParsedRecord, field: &FieldDefinition, payload: String) -> FieldValue {
    if let Some(pattern) = field.pattern()
        && !pattern.is_match(&payload)
    {
        push_field_violation(
            record,
            field,
            FLD_PATTERN,
            format!("{} does not match the required format", field.label()),
            Some(payload.clone()),
            Some(pattern.as_str().to_string()),
        );
    }
    if field.allowed().is_some() {
        return match field.canonical_value(&payload) {
            Some(canonical) => FieldValue::Text(canonical.to_string()),
            None => {
                let expected = field
                    .allowed()
                    .map(|pairs| {
                        pairs
                            .iter()
                            .map(|(accepted, _)| accepted.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    })
                    .unwrap_or_default();
                push_field_violation(
                    record,
                    field,
                    FLD_ENUM,
                    format!("{} is outside the allowed values", field.label()),
                    Some(payload.clone()),
                    Some(expected),
                );
                FieldValue::Unparsed(payload)
            }
        };
    }
    FieldValue::Text(payload)
}

fn extract_integer(
    record: &mut ParsedRecord,
    field: &FieldDefinition,
    payload: String,
) -> FieldValue {
    if !payload.bytes().all(|b| b.is_ascii_digit()) {
        push_field_violation(
            record,
            field,
            FLD_NUMERIC,
            format!("{} is not a zero-padded number", field.label()),
            Some(payload.clone()),
            None,
        );
        return FieldValue::Unparsed(payload);
    }
    match payload.parse::<i64>() {
        Ok(value) => FieldValue::Integer(value),
        Err(_) => {
            push_field_violation(
                record,
                field,
                FLD_NUMERIC,
                format!("{} overflows the numeric range", field.label()),
                Some(payload.clone()),
                None,
            );
            FieldValue::Unparsed(payload)
        }
    }
}

fn extract_currency(
    record: &mut ParsedRecord,
    field: &FieldDefinition,
    payload: String,
    schema: &FileSchema,
) -> FieldValue {
    match Money::decode_cents(&payload, schema.currency()) {
        Ok(money) => FieldValue::Amount(money),
        Err(_) => {
            push_field_violation(
                record,
                field,
                FLD_NUMERIC,
                format!("{} is not a fixed-width cents amount", field.label()),
                Some(payload.clone()),
                None,
            );
            FieldValue::Unparsed(payload)
        }
    }
}

fn extract_date(
    record: &mut ParsedRecord,
    field: &FieldDefinition,
    payload: String,
    opts: &ParseOptions,
) -> FieldValue {
    let parsed = if field.rejects_future() {
        parse_fixed_date_not_after(&payload, opts.evaluation_date)
    } else {
        parse_fixed_date(&payload)
    };
    match parsed {
        Ok(date) => FieldValue::Date(date),
        Err(error) => {
            push_field_violation(
                record,
                field,
                FLD_DATE,
                format!("{}: {error}", field.label()),
                Some(payload.clone()),
                Some("YYYYMMDD".to_string()),
            );
            FieldValue::Unparsed(payload)
        }
    }
}

fn extract_flag(record: &mut ParsedRecord, field: &FieldDefinition, payload: String) -> FieldValue {
    match payload.as_str() {
        "1" | "S" => FieldValue::Flag(true),
        "0" | "N" => FieldValue::Flag(false),
        _ => {
            push_field_violation(
                record,
                field,
                FLD_FLAG,
                format!("{} is not a recognized flag", field.label()),
                Some(payload.clone()),
                Some("1, 0, S, N".to_string()),
            );
            FieldValue::Unparsed(payload)
        }
    }
}

fn push_field_violation(
    record: &mut ParsedRecord,
    field: &FieldDefinition,
    code: &str,
    message: String,
    observed: Option<String>,
    expected: Option<String>,
) {
    record.push_violation(Violation {
        line_number: record.line_number,
        rule_code: code.to_string(),
        field: Some(field.name().to_string()),
        severity: Severity::Error,
        kind: ViolationKind::Field,
        message,
        observed,
        expected,
    });
}

/// Take the 1-indexed inclusive `[start, end]` character slice, clamped
/// to the end of the line.
fn slice(chars: &[char], start: usize, end: usize) -> String {
    if start > chars.len() {
        return String::new();
    }
    let hi = end.min(chars.len());
    chars[start - 1..hi].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_is_one_indexed_inclusive() {
        let chars: Vec<char> = "abcdef".chars().collect();
        assert_eq!(slice(&chars, 1, 2), "ab");
        assert_eq!(slice(&chars, 3, 6), "cdef");
        assert_eq!(slice(&chars, 5, 9), "ef");
        assert_eq!(slice(&chars, 7, 9), "");
    }
}
