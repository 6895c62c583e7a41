//! Integration tests for the fixed-width line parser, driven by the
//! built-in payroll contribution and worker registry schemas.

use chrono::NaiveDate;
use sua_model::{FieldValue, Money, ViolationKind};
use sua_parse::{
    FLD_DATE, FLD_ENUM, FLD_NUMERIC, FLD_REQUIRED, ParseOptions, STR_LINE_LENGTH, STR_RECORD_TYPE,
    parse_line,
};
use sua_schema::{FileSchema, FileType};

const NSS: &str = "12345678903";
const CURP: &str = "GOMA950115HDFRRL06";
const RFC: &str = "GOMA950115A10";

fn eval_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
}

fn opts() -> ParseOptions {
    ParseOptions::new(eval_date())
}

fn contribution_schema() -> FileSchema {
    FileSchema::builtin(FileType::PayrollContribution).unwrap()
}

fn detail_line(days: &str, wage_cents: i64, contribution_cents: i64) -> String {
    format!(
        "02{NSS:<11}{CURP:<18}{RFC:<13}{:<40}{days}{wage_cents:09}{contribution_cents:09}{:<2}{}{:<13}",
        "PEREZ LOPEZ JUAN", "01", "0", ""
    )
}

fn header_line(generation_date: &str) -> String {
    format!(
        "01{:<11}{RFC:<13}202406{generation_date}{:0>3}{:<77}",
        "B1234567890", 1, ""
    )
}

#[test]
fn exact_length_detail_parses_every_field() {
    let schema = contribution_schema();
    let line = detail_line("15", 52_050, 1_234_500);
    assert_eq!(line.chars().count(), 120);

    let record = parse_line(&schema, 2, &line, &opts());
    assert!(record.is_valid(), "violations: {:?}", record.violations);
    assert_eq!(record.record_type, "02");
    assert_eq!(record.field("nss"), Some(&FieldValue::Text(NSS.into())));
    assert_eq!(
        record.field("worker_name"),
        Some(&FieldValue::Text("PEREZ LOPEZ JUAN".into()))
    );
    assert_eq!(record.field("days_worked"), Some(&FieldValue::Integer(15)));
    assert_eq!(
        record.field("daily_wage"),
        Some(&FieldValue::Amount(Money::from_cents(
            52_050,
            schema.currency()
        )))
    );
    assert_eq!(record.field("incapacity_flag"), Some(&FieldValue::Flag(false)));
    assert_eq!(record.field("filler"), Some(&FieldValue::Empty));
}

#[test]
fn parsing_is_idempotent() {
    let schema = contribution_schema();
    let line = detail_line("15", 52_050, 1_234_500);
    let first = parse_line(&schema, 7, &line, &opts());
    let second = parse_line(&schema, 7, &line, &opts());
    assert_eq!(first, second);
}

#[test]
fn one_character_short_leaves_tail_empty_without_structural_panic() {
    let schema = contribution_schema();
    let mut line = detail_line("15", 52_050, 1_234_500);
    line.pop();

    let record = parse_line(&schema, 2, &line, &opts());
    // The short line is one structural violation; the truncated filler is
    // not additionally reported.
    let structural: Vec<_> = record
        .violations
        .iter()
        .filter(|v| v.kind == ViolationKind::Structural)
        .collect();
    assert_eq!(structural.len(), 1);
    assert_eq!(structural[0].rule_code, STR_LINE_LENGTH);
    assert_eq!(record.field("filler"), Some(&FieldValue::Empty));
    // Fields before the cut still parse.
    assert_eq!(record.field("days_worked"), Some(&FieldValue::Integer(15)));
}

#[test]
fn truncated_required_field_is_not_double_reported() {
    let schema = contribution_schema();
    let line = detail_line("15", 52_050, 1_234_500);
    // Cut inside the worker name: everything from days_worked on is gone.
    let cut: String = line.chars().take(60).collect();

    let record = parse_line(&schema, 2, &cut, &opts());
    assert!(record
        .violations
        .iter()
        .any(|v| v.rule_code == STR_LINE_LENGTH));
    // days_worked lies fully beyond the cut: empty, no FLD-REQUIRED.
    assert_eq!(record.field("days_worked"), Some(&FieldValue::Empty));
    assert!(!record
        .violations
        .iter()
        .any(|v| v.rule_code == FLD_REQUIRED && v.field.as_deref() == Some("days_worked")));
}

#[test]
fn overlength_is_tolerated_by_default_and_flagged_when_strict() {
    let schema = contribution_schema();
    let line = format!("{}XXXXX", detail_line("15", 52_050, 1_234_500));

    let tolerant = parse_line(&schema, 2, &line, &opts());
    assert!(tolerant.is_valid(), "violations: {:?}", tolerant.violations);

    let strict = parse_line(&schema, 2, &line, &opts().strict_length());
    assert!(strict
        .violations
        .iter()
        .any(|v| v.rule_code == STR_LINE_LENGTH && v.kind == ViolationKind::Structural));
}

#[test]
fn unknown_discriminator_is_a_structural_violation() {
    let schema = contribution_schema();
    let line = format!("99{:<118}", "");
    let record = parse_line(&schema, 5, &line, &opts());
    assert!(!record.is_valid());
    assert_eq!(record.violations.len(), 1);
    assert_eq!(record.violations[0].rule_code, STR_RECORD_TYPE);
    assert_eq!(record.violations[0].kind, ViolationKind::Structural);
    assert_eq!(record.record_type, "99");
}

#[test]
fn non_numeric_payload_is_unparsed_not_zero() {
    let schema = contribution_schema();
    let line = detail_line("X5", 52_050, 1_234_500);
    let record = parse_line(&schema, 2, &line, &opts());

    assert_eq!(
        record.field("days_worked"),
        Some(&FieldValue::Unparsed("X5".into()))
    );
    assert!(record
        .violations
        .iter()
        .any(|v| v.rule_code == FLD_NUMERIC && v.field.as_deref() == Some("days_worked")));
}

#[test]
fn required_empty_field_is_a_field_violation() {
    let schema = contribution_schema();
    let line = format!(
        "02{:<11}{CURP:<18}{RFC:<13}{:<40}15{:09}{:09}{:<2}{}{:<13}",
        "", "PEREZ LOPEZ JUAN", 52_050, 1_234_500, "01", "0", ""
    );
    let record = parse_line(&schema, 2, &line, &opts());
    assert_eq!(record.field("nss"), Some(&FieldValue::Empty));
    assert!(record
        .violations
        .iter()
        .any(|v| v.rule_code == FLD_REQUIRED && v.field.as_deref() == Some("nss")));
}

#[test]
fn invalid_and_future_dates_are_field_violations() {
    let schema = contribution_schema();

    let impossible = parse_line(&schema, 1, &header_line("20241332"), &opts());
    assert!(impossible
        .violations
        .iter()
        .any(|v| v.rule_code == FLD_DATE && v.field.as_deref() == Some("generation_date")));
    assert_eq!(
        impossible.field("generation_date"),
        Some(&FieldValue::Unparsed("20241332".into()))
    );

    // Generation date after the evaluation date is rejected for this field.
    let future = parse_line(&schema, 1, &header_line("20251231"), &opts());
    assert!(future
        .violations
        .iter()
        .any(|v| v.rule_code == FLD_DATE && v.field.as_deref() == Some("generation_date")));

    let fine = parse_line(&schema, 1, &header_line("20250601"), &opts());
    assert!(fine.is_valid(), "violations: {:?}", fine.violations);
    assert_eq!(
        fine.field("generation_date"),
        Some(&FieldValue::Date(
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
        ))
    );
}

#[test]
fn keep_raw_preserves_pre_trim_slices() {
    let schema = contribution_schema();
    let line = detail_line("15", 52_050, 1_234_500);
    let record = parse_line(&schema, 2, &line, &opts().keep_raw());

    assert_eq!(record.raw.as_deref(), Some(line.as_str()));
    let raw_name = record.raw_fields.get("worker_name").unwrap();
    assert_eq!(raw_name.chars().count(), 40);
    assert_eq!(raw_name.trim_end(), "PEREZ LOPEZ JUAN");
}

#[test]
fn alias_status_maps_to_canonical_value() {
    let schema = FileSchema::builtin(FileType::WorkerRegistry).unwrap();
    let line = |status: &str| {
        format!(
            "02{CURP:<18}{NSS:<11}20240115{status}{:09}{:<27}",
            45_000, "PEREZ LOPEZ JUAN"
        )
    };

    let aliased = parse_line(&schema, 2, &line("AC"), &opts());
    assert_eq!(
        aliased.field("worker_status"),
        Some(&FieldValue::Text("01".into()))
    );
    let canonical = parse_line(&schema, 2, &line("01"), &opts());
    assert_eq!(
        canonical.field("worker_status"),
        aliased.field("worker_status")
    );

    let unknown = parse_line(&schema, 2, &line("ZZ"), &opts());
    assert_eq!(
        unknown.field("worker_status"),
        Some(&FieldValue::Unparsed("ZZ".into()))
    );
    assert!(unknown
        .violations
        .iter()
        .any(|v| v.rule_code == FLD_ENUM && v.field.as_deref() == Some("worker_status")));
}
