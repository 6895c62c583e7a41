//! File schemas: the named bundle of record layouts, streaming aggregates
//! and rules for one regulated file type.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sua_model::Currency;

use crate::builtin;
use crate::error::SchemaError;
use crate::record::{RecordKind, RecordSchema};
use crate::rules::ValidatorRule;

/// The regulated file types this engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileType {
    /// Monthly payroll contribution determination file.
    PayrollContribution,
    /// Bank dispersion (payment order) file.
    BankDispersion,
    /// Worker affiliation movements file.
    WorkerRegistry,
}

impl FileType {
    pub fn all() -> [FileType; 3] {
        [
            FileType::PayrollContribution,
            FileType::BankDispersion,
            FileType::WorkerRegistry,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::PayrollContribution => "payroll-contribution",
            FileType::BankDispersion => "bank-dispersion",
            FileType::WorkerRegistry => "worker-registry",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "payroll-contribution" => Ok(FileType::PayrollContribution),
            "bank-dispersion" => Ok(FileType::BankDispersion),
            "worker-registry" => Ok(FileType::WorkerRegistry),
            _ => Err(format!("Unknown file type: {s}")),
        }
    }
}

/// How a streaming aggregate is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateKind {
    /// Number of records of the source record type.
    Count,
    /// Sum of a currency field across records of the source record type.
    Sum,
}

/// A running aggregate computed in one pass while records stream by, then
/// exposed to footer-scoped rules as the pseudo-field `@{name}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSpec {
    pub name: String,
    /// Record-type code the aggregate draws from.
    pub record_code: String,
    /// Source field for `Sum`; unused for `Count`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub kind: AggregateKind,
}

impl AggregateSpec {
    pub fn count(name: &str, record_code: &str) -> Self {
        Self {
            name: name.to_string(),
            record_code: record_code.to_string(),
            field: None,
            kind: AggregateKind::Count,
        }
    }

    pub fn sum(name: &str, record_code: &str, field: &str) -> Self {
        Self {
            name: name.to_string(),
            record_code: record_code.to_string(),
            field: Some(field.to_string()),
            kind: AggregateKind::Sum,
        }
    }

    /// Name under which footer rules see the aggregate.
    pub fn pseudo_field(&self) -> String {
        format!("@{}", self.name)
    }
}

/// A named bundle of record schemas, aggregates and rules for one file
/// type. Built once at process start from the static tables, never
/// mutated, shared read-only across all parsing operations.
#[derive(Debug, Clone)]
pub struct FileSchema {
    file_type: FileType,
    name: String,
    currency: Currency,
    discriminator: (usize, usize),
    records: BTreeMap<String, RecordSchema>,
    aggregates: Vec<AggregateSpec>,
    rules: Vec<ValidatorRule>,
}

impl FileSchema {
    pub fn new(
        file_type: FileType,
        name: &str,
        currency: Currency,
        discriminator: (usize, usize),
        records: Vec<RecordSchema>,
        aggregates: Vec<AggregateSpec>,
        rules: Vec<ValidatorRule>,
    ) -> Result<Self, SchemaError> {
        let mut by_code = BTreeMap::new();
        for record in records {
            let disc = record.discriminator_field();
            if disc.start() != discriminator.0 || disc.end() != discriminator.1 {
                return Err(SchemaError::DiscriminatorMismatch {
                    code: record.code().to_string(),
                    start: disc.start(),
                    end: disc.end(),
                    expected_start: discriminator.0,
                    expected_end: discriminator.1,
                });
            }
            let code = record.code().to_string();
            if by_code.insert(code.clone(), record).is_some() {
                return Err(SchemaError::DuplicateRecordType { code });
            }
        }

        for aggregate in &aggregates {
            let Some(record) = by_code.get(&aggregate.record_code) else {
                return Err(SchemaError::BadAggregate {
                    name: aggregate.name.clone(),
                    what: "record type",
                    value: aggregate.record_code.clone(),
                });
            };
            if let Some(field) = &aggregate.field
                && record.field(field).is_none()
            {
                return Err(SchemaError::BadAggregate {
                    name: aggregate.name.clone(),
                    what: "field",
                    value: field.clone(),
                });
            }
        }

        for rule in &rules {
            for record_type in &rule.record_types {
                if !by_code.contains_key(record_type) {
                    return Err(SchemaError::UnknownRecordType {
                        code: rule.code.clone(),
                        record_type: record_type.clone(),
                    });
                }
            }
        }

        Ok(Self {
            file_type,
            name: name.to_string(),
            currency,
            discriminator,
            records: by_code,
            aggregates,
            rules,
        })
    }

    /// The built-in schema for a file type.
    pub fn builtin(file_type: FileType) -> Result<Self, SchemaError> {
        match file_type {
            FileType::PayrollContribution => builtin::payroll_contribution(),
            FileType::BankDispersion => builtin::bank_dispersion(),
            FileType::WorkerRegistry => builtin::worker_registry(),
        }
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// 1-indexed inclusive span of the discriminator, shared by every
    /// record type of the file.
    pub fn discriminator(&self) -> (usize, usize) {
        self.discriminator
    }

    pub fn record(&self, code: &str) -> Option<&RecordSchema> {
        self.records.get(code)
    }

    pub fn records(&self) -> impl Iterator<Item = &RecordSchema> {
        self.records.values()
    }

    pub fn records_of_kind(&self, kind: RecordKind) -> impl Iterator<Item = &RecordSchema> {
        self.records.values().filter(move |r| r.kind() == kind)
    }

    pub fn aggregates(&self) -> &[AggregateSpec] {
        &self.aggregates
    }

    pub fn rules(&self) -> &[ValidatorRule] {
        &self.rules
    }
}

/// All built-in file schemas, keyed by file type.
///
/// Constructed once at startup and passed by reference wherever schemas
/// are needed; there is no ambient global registry.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: BTreeMap<FileType, FileSchema>,
}

impl SchemaRegistry {
    pub fn builtin() -> Result<Self, SchemaError> {
        let mut schemas = BTreeMap::new();
        for file_type in FileType::all() {
            schemas.insert(file_type, FileSchema::builtin(file_type)?);
        }
        Ok(Self { schemas })
    }

    pub fn schema(&self, file_type: FileType) -> Option<&FileSchema> {
        self.schemas.get(&file_type)
    }

    pub fn schemas(&self) -> impl Iterator<Item = &FileSchema> {
        self.schemas.values()
    }
}
