//! The validation orchestrator.
//!
//! Rules are filtered once per file and grouped per record type, then run
//! in ascending run order over every parsed record. Cross-record checks
//! (footer totals against detail counts and sums) ride on a one-pass
//! streaming reduction: aggregates accumulate while records stream by and
//! are exposed to footer rules as `@`-prefixed pseudo-fields.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info};

use sua_model::{FieldValue, Money, ParsedRecord, Severity, Violation, ViolationKind};
use sua_parse::{ParseOptions, parse_line};
use sua_schema::{ActionKind, AggregateKind, FileSchema, RecordKind, ValidatorRule};

use crate::condition::{EvalContext, evaluate};
use crate::report::{FileTotals, FileValidationResult, RecordResult};

/// A rule set bound to one file schema, pre-filtered and ordered.
#[derive(Debug)]
pub struct ValidationEngine<'a> {
    schema: &'a FileSchema,
    rules_by_record: BTreeMap<String, Vec<&'a ValidatorRule>>,
}

impl<'a> ValidationEngine<'a> {
    pub fn new(schema: &'a FileSchema) -> Self {
        Self::with_extra_rules(schema, &[])
    }

    /// Bind the schema's built-in rules plus externally loaded ones.
    ///
    /// Filtering by file type and record type happens here, once per
    /// file, not per record.
    pub fn with_extra_rules(schema: &'a FileSchema, extra: &'a [ValidatorRule]) -> Self {
        let mut rules_by_record = BTreeMap::new();
        for record in schema.records() {
            let mut applicable: Vec<&ValidatorRule> = schema
                .rules()
                .iter()
                .chain(extra.iter())
                .filter(|rule| {
                    rule.applies_to_file(schema.file_type())
                        && rule.applies_to_record(record.code())
                })
                .collect();
            applicable.sort_by_key(|rule| rule.run_order);
            rules_by_record.insert(record.code().to_string(), applicable);
        }
        Self {
            schema,
            rules_by_record,
        }
    }

    pub fn rules_for_record(&self, record_code: &str) -> &[&'a ValidatorRule] {
        self.rules_by_record
            .get(record_code)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Run the bound rule set over parsed records, in file order.
    ///
    /// Structurally broken records (wrong length, unreadable
    /// discriminator) keep their distinguished structural violations and
    /// skip rule evaluation; the run always completes and returns a
    /// result, whatever the input looks like.
    pub fn validate_records(
        &self,
        records: Vec<ParsedRecord>,
        evaluation_date: NaiveDate,
    ) -> FileValidationResult {
        let ctx = EvalContext::new(evaluation_date);
        let mut aggregates = AggregateState::new(self.schema);
        let mut totals = FileTotals::default();
        let mut results = Vec::with_capacity(records.len());

        for mut record in records {
            aggregates.observe(&record);

            if let Some(record_schema) = self.schema.record(&record.record_type) {
                if record_schema.kind() == RecordKind::Footer {
                    aggregates.inject(&mut record);
                }
                if !record.has_structural_violations() {
                    for rule in self.rules_for_record(record_schema.code()) {
                        if evaluate(&rule.condition, &record, &ctx) {
                            fire(rule, &mut record, &mut totals);
                        }
                    }
                }
            }

            totals.observe(&record);
            results.push(RecordResult::from_record(record));
        }

        info!(
            file_type = %self.schema.file_type(),
            records = totals.records,
            invalid = totals.invalid_records,
            warnings = totals.warnings,
            "file validated"
        );
        FileValidationResult {
            file_type: self.schema.file_type(),
            records: results,
            totals,
        }
    }
}

/// Parse and validate raw lines in one call.
pub fn validate_lines<I>(
    schema: &FileSchema,
    lines: I,
    opts: &ParseOptions,
) -> FileValidationResult
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let engine = ValidationEngine::new(schema);
    let records = lines
        .into_iter()
        .enumerate()
        .map(|(index, line)| parse_line(schema, index + 1, line.as_ref(), opts))
        .collect();
    engine.validate_records(records, opts.evaluation_date)
}

/// Validate records that were parsed elsewhere.
pub fn validate_records(
    schema: &FileSchema,
    records: Vec<ParsedRecord>,
    evaluation_date: NaiveDate,
) -> FileValidationResult {
    ValidationEngine::new(schema).validate_records(records, evaluation_date)
}

fn fire(rule: &ValidatorRule, record: &mut ParsedRecord, totals: &mut FileTotals) {
    let severity = match rule.action.kind {
        ActionKind::Reject => Severity::Error,
        ActionKind::Warn => Severity::Warning,
        ActionKind::Log => Severity::Info,
    };
    let field = rule.violation_field().map(str::to_string);
    let observed = field
        .as_deref()
        .and_then(|name| record.field(name))
        .map(FieldValue::as_text);
    let message = render_template(
        &rule.action.message,
        field.as_deref(),
        observed.as_deref(),
        record.line_number,
    );

    debug!(
        rule = %rule.code,
        line = record.line_number,
        action = %rule.action.kind,
        "rule triggered"
    );
    let code = rule.violation_code().to_string();
    *totals.rule_triggers.entry(code.clone()).or_default() += 1;
    totals.violated_rule_codes.insert(code.clone());

    record.push_violation(Violation {
        line_number: record.line_number,
        rule_code: code,
        field,
        severity,
        kind: ViolationKind::Rule,
        message,
        observed,
        expected: rule.action.expected.clone(),
    });
}

/// Expand `{field}`, `{value}` and `{line}` in an action message.
fn render_template(
    template: &str,
    field: Option<&str>,
    observed: Option<&str>,
    line_number: usize,
) -> String {
    template
        .replace("{field}", field.unwrap_or(""))
        .replace("{value}", observed.unwrap_or(""))
        .replace("{line}", &line_number.to_string())
}

/// Running aggregates for the one-pass footer cross-checks.
struct AggregateState<'a> {
    schema: &'a FileSchema,
    counts: BTreeMap<&'a str, i64>,
    sums: BTreeMap<&'a str, Decimal>,
}

impl<'a> AggregateState<'a> {
    fn new(schema: &'a FileSchema) -> Self {
        Self {
            schema,
            counts: BTreeMap::new(),
            sums: BTreeMap::new(),
        }
    }

    fn observe(&mut self, record: &ParsedRecord) {
        for spec in self.schema.aggregates() {
            if spec.record_code != record.record_type {
                continue;
            }
            match spec.kind {
                AggregateKind::Count => {
                    *self.counts.entry(spec.name.as_str()).or_default() += 1;
                }
                AggregateKind::Sum => {
                    // Empty or unparsed source values contribute nothing;
                    // their own field violations already mark the record.
                    let contribution = spec
                        .field
                        .as_deref()
                        .and_then(|name| record.field(name))
                        .and_then(FieldValue::as_decimal);
                    if let Some(amount) = contribution {
                        *self.sums.entry(spec.name.as_str()).or_default() += amount;
                    }
                }
            }
        }
    }

    /// Expose accumulated aggregates to a footer record as pseudo-fields.
    fn inject(&self, record: &mut ParsedRecord) {
        for spec in self.schema.aggregates() {
            let value = match spec.kind {
                AggregateKind::Count => {
                    FieldValue::Integer(self.counts.get(spec.name.as_str()).copied().unwrap_or(0))
                }
                AggregateKind::Sum => {
                    let sum = self.sums.get(spec.name.as_str()).copied().unwrap_or_default();
                    FieldValue::Amount(Money::new(sum, self.schema.currency()))
                }
            };
            record.set_field(spec.pseudo_field(), value);
        }
    }
}
