//! Validation results and file-level aggregation.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;

use sua_model::{ParsedRecord, Severity, Violation};
use sua_schema::FileType;

/// Per-record outcome: validity plus the ordered violations recorded
/// against the line.
#[derive(Debug, Clone, Serialize)]
pub struct RecordResult {
    pub line_number: usize,
    pub record_type: String,
    pub valid: bool,
    pub violations: Vec<Violation>,
}

impl RecordResult {
    pub fn from_record(record: ParsedRecord) -> Self {
        let valid = record.is_valid();
        Self {
            line_number: record.line_number,
            record_type: record.record_type,
            valid,
            violations: record.violations,
        }
    }
}

/// File-level summary counters, accumulated in a single pass.
///
/// Partial totals from independent shards combine with [`FileTotals::merge`],
/// so parallel callers can map-then-reduce instead of sharing a mutable
/// accumulator.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FileTotals {
    pub records: u64,
    pub valid_records: u64,
    pub invalid_records: u64,
    pub structural_failures: u64,
    pub warnings: u64,
    pub by_record_type: BTreeMap<String, u64>,
    /// Trigger count per rule code.
    pub rule_triggers: BTreeMap<String, u64>,
    /// Distinct rule codes that triggered at least once.
    pub violated_rule_codes: BTreeSet<String>,
}

impl FileTotals {
    /// Fold one record's outcome into the totals.
    pub fn observe(&mut self, record: &ParsedRecord) {
        self.records += 1;
        if record.is_valid() {
            self.valid_records += 1;
        } else {
            self.invalid_records += 1;
        }
        if record.has_structural_violations() {
            self.structural_failures += 1;
        }
        self.warnings += record.warning_count() as u64;
        *self
            .by_record_type
            .entry(record.record_type.clone())
            .or_default() += 1;
    }

    /// Combine partial totals from another shard.
    pub fn merge(mut self, other: FileTotals) -> FileTotals {
        self.records += other.records;
        self.valid_records += other.valid_records;
        self.invalid_records += other.invalid_records;
        self.structural_failures += other.structural_failures;
        self.warnings += other.warnings;
        for (code, count) in other.by_record_type {
            *self.by_record_type.entry(code).or_default() += count;
        }
        for (code, count) in other.rule_triggers {
            *self.rule_triggers.entry(code).or_default() += count;
        }
        self.violated_rule_codes.extend(other.violated_rule_codes);
        self
    }
}

/// The outcome of validating one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileValidationResult {
    pub file_type: FileType,
    pub records: Vec<RecordResult>,
    pub totals: FileTotals,
}

impl FileValidationResult {
    pub fn has_errors(&self) -> bool {
        self.totals.invalid_records > 0
    }

    pub fn error_count(&self) -> usize {
        self.violations()
            .filter(|v| v.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.violations()
            .filter(|v| v.severity == Severity::Warning)
            .count()
    }

    /// All violations in file order.
    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        self.records.iter().flat_map(|r| r.violations.iter())
    }
}

#[derive(Debug, Serialize)]
struct ReportPayload<'a> {
    schema: &'static str,
    schema_version: u32,
    generated_at: String,
    file_type: FileType,
    totals: &'a FileTotals,
    records: &'a [RecordResult],
}

const REPORT_SCHEMA: &str = "sua-validator.validation-report";
const REPORT_SCHEMA_VERSION: u32 = 1;

/// Write the machine-readable validation report alongside other outputs.
pub fn write_validation_report_json(
    output_dir: &Path,
    result: &FileValidationResult,
) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let output_path = output_dir.join("validation_report.json");
    let payload = ReportPayload {
        schema: REPORT_SCHEMA,
        schema_version: REPORT_SCHEMA_VERSION,
        generated_at: Utc::now().to_rfc3339(),
        file_type: result.file_type,
        totals: &result.totals,
        records: &result.records,
    };
    let json = serde_json::to_string_pretty(&payload)?;
    std::fs::write(&output_path, format!("{json}\n"))?;
    Ok(output_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sua_model::ViolationKind;

    fn record(line: usize, valid: bool) -> ParsedRecord {
        let mut record = ParsedRecord::new(line, "02");
        if !valid {
            record.push_violation(Violation {
                line_number: line,
                rule_code: "AP-001".to_string(),
                field: None,
                severity: Severity::Error,
                kind: ViolationKind::Rule,
                message: String::new(),
                observed: None,
                expected: None,
            });
        }
        record
    }

    #[test]
    fn totals_accumulate_in_one_pass() {
        let mut totals = FileTotals::default();
        totals.observe(&record(1, true));
        totals.observe(&record(2, false));
        totals.observe(&record(3, true));
        assert_eq!(totals.records, 3);
        assert_eq!(totals.valid_records, 2);
        assert_eq!(totals.invalid_records, 1);
        assert_eq!(totals.by_record_type.get("02"), Some(&3));
    }

    #[test]
    fn shard_totals_merge() {
        let mut left = FileTotals::default();
        left.observe(&record(1, true));
        left.rule_triggers.insert("AP-001".to_string(), 2);
        left.violated_rule_codes.insert("AP-001".to_string());

        let mut right = FileTotals::default();
        right.observe(&record(2, false));
        right.rule_triggers.insert("AP-001".to_string(), 1);
        right.rule_triggers.insert("AP-004".to_string(), 1);
        right.violated_rule_codes.insert("AP-001".to_string());
        right.violated_rule_codes.insert("AP-004".to_string());

        let merged = left.merge(right);
        assert_eq!(merged.records, 2);
        assert_eq!(merged.rule_triggers.get("AP-001"), Some(&3));
        assert_eq!(merged.rule_triggers.get("AP-004"), Some(&1));
        assert_eq!(merged.violated_rule_codes.len(), 2);
    }
}
