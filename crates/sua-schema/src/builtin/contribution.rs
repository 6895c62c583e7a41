//! Payroll contribution determination file: 120-character lines, record
//! types 01 (employer header), 02 (worker detail) and 09 (totals footer).

use sua_model::{Currency, FieldType};

use crate::error::SchemaError;
use crate::field::FieldDefinition;
use crate::file::{AggregateSpec, FileSchema, FileType};
use crate::record::{RecordKind, RecordSchema};
use crate::rules::{ComparisonOp, ConditionNode, DataType, Operand, RuleAction, ValidatorRule};

const LINE_LENGTH: usize = 120;

pub(crate) fn payroll_contribution() -> Result<FileSchema, SchemaError> {
    FileSchema::new(
        FileType::PayrollContribution,
        "payroll contribution determination",
        Currency::Mxn,
        (1, 2),
        vec![header()?, detail()?, footer()?],
        vec![
            AggregateSpec::count("detail_count", "02"),
            AggregateSpec::sum("detail_total", "02", "contribution_amount"),
        ],
        rules(),
    )
}

fn header() -> Result<RecordSchema, SchemaError> {
    RecordSchema::new(
        "01",
        RecordKind::Header,
        LINE_LENGTH,
        vec![
            FieldDefinition::new("record_type", "Record type", 1, 2, FieldType::Text).required(),
            FieldDefinition::new("employer_registry", "Employer registry number", 3, 13, FieldType::Text)
                .required()
                .with_pattern(r"^[A-Z0-9][0-9]{10}$")?,
            FieldDefinition::new("employer_rfc", "Employer taxpayer key", 14, 26, FieldType::Text)
                .required()
                .with_pattern(r"^[A-ZÑ&0-9]{12,13}$")?,
            FieldDefinition::new("period", "Contribution period (YYYYMM)", 27, 32, FieldType::Integer)
                .required()
                .padded('0'),
            FieldDefinition::new("generation_date", "File generation date", 33, 40, FieldType::Date)
                .required()
                .reject_future(),
            FieldDefinition::new("file_sequence", "File sequence in period", 41, 43, FieldType::Integer)
                .required()
                .padded('0'),
            FieldDefinition::new("filler", "Reserved", 44, 120, FieldType::Text),
        ],
    )
}

fn detail() -> Result<RecordSchema, SchemaError> {
    RecordSchema::new(
        "02",
        RecordKind::Detail,
        LINE_LENGTH,
        vec![
            FieldDefinition::new("record_type", "Record type", 1, 2, FieldType::Text).required(),
            FieldDefinition::new("nss", "Social security number", 3, 13, FieldType::Text)
                .required()
                .with_pattern(r"^[0-9]{11}$")?,
            FieldDefinition::new("curp", "Population registry key", 14, 31, FieldType::Text)
                .required(),
            FieldDefinition::new("rfc", "Worker taxpayer key", 32, 44, FieldType::Text),
            FieldDefinition::new("worker_name", "Worker name", 45, 84, FieldType::Text).required(),
            FieldDefinition::new("days_worked", "Days worked in period", 85, 86, FieldType::Integer)
                .required()
                .padded('0'),
            FieldDefinition::new("daily_wage", "Integrated daily wage", 87, 95, FieldType::Currency)
                .required()
                .padded('0'),
            FieldDefinition::new(
                "contribution_amount",
                "Contribution amount",
                96,
                104,
                FieldType::Currency,
            )
            .required()
            .padded('0'),
            FieldDefinition::new("movement_type", "Movement type", 105, 106, FieldType::Text)
                .with_allowed(&[
                    ("01", "01"),
                    ("02", "02"),
                    ("07", "07"),
                    ("08", "08"),
                    ("11", "11"),
                ]),
            FieldDefinition::new("incapacity_flag", "Incapacity in period", 107, 107, FieldType::Flag),
            FieldDefinition::new("filler", "Reserved", 108, 120, FieldType::Text),
        ],
    )
}

fn footer() -> Result<RecordSchema, SchemaError> {
    RecordSchema::new(
        "09",
        RecordKind::Footer,
        LINE_LENGTH,
        vec![
            FieldDefinition::new("record_type", "Record type", 1, 2, FieldType::Text).required(),
            FieldDefinition::new("detail_count", "Declared detail count", 3, 8, FieldType::Integer)
                .required()
                .padded('0'),
            FieldDefinition::new(
                "total_contribution",
                "Declared contribution total",
                9,
                20,
                FieldType::Currency,
            )
            .required()
            .padded('0'),
            FieldDefinition::new("filler", "Reserved", 21, 120, FieldType::Text),
        ],
    )
}

fn rules() -> Vec<ValidatorRule> {
    vec![
        ValidatorRule::new(
            "AP-001",
            "Worker NSS verification digit",
            &["02"],
            10,
            ConditionNode::leaf("nss", DataType::Nss, ComparisonOp::FailsChecksum, Operand::None),
            RuleAction::reject("social security number {value} failed its verification digit"),
        ),
        ValidatorRule::new(
            "AP-002",
            "Worker CURP verification digit",
            &["02"],
            20,
            ConditionNode::leaf("curp", DataType::Curp, ComparisonOp::FailsChecksum, Operand::None),
            RuleAction::reject("population registry key {value} is not valid"),
        ),
        ValidatorRule::new(
            "AP-003",
            "Worker RFC verification character",
            &["02"],
            30,
            ConditionNode::leaf("rfc", DataType::Rfc, ComparisonOp::FailsChecksum, Operand::None),
            RuleAction::warn("taxpayer key {value} is not valid"),
        ),
        ValidatorRule::new(
            "AP-004",
            "Days worked within period bounds",
            &["02"],
            40,
            ConditionNode::negate(ConditionNode::leaf(
                "days_worked",
                DataType::Integer,
                ComparisonOp::Between,
                Operand::Range {
                    low: "0".to_string(),
                    high: "31".to_string(),
                },
            )),
            RuleAction::reject("days worked {value} is outside the period bounds").expected("0..31"),
        ),
        ValidatorRule::new(
            "AP-005",
            "Daily wage below general minimum",
            &["02"],
            50,
            ConditionNode::all(vec![
                ConditionNode::leaf(
                    "daily_wage",
                    DataType::Decimal,
                    ComparisonOp::Lt,
                    Operand::Literal("278.80".to_string()),
                ),
                ConditionNode::leaf(
                    "days_worked",
                    DataType::Integer,
                    ComparisonOp::Gt,
                    Operand::Literal("0".to_string()),
                ),
            ]),
            RuleAction::warn("integrated daily wage {value} is below the general minimum")
                .expected(">= 278.80"),
        ),
        ValidatorRule::new(
            "AP-006",
            "Extended incapacity",
            &["02"],
            60,
            ConditionNode::all(vec![
                ConditionNode::leaf(
                    "incapacity_flag",
                    DataType::Flag,
                    ComparisonOp::Eq,
                    Operand::Literal("1".to_string()),
                ),
                ConditionNode::leaf(
                    "days_worked",
                    DataType::Integer,
                    ComparisonOp::Gt,
                    Operand::Literal("15".to_string()),
                ),
            ]),
            RuleAction::warn("incapacity flagged with {value} days worked in the period")
                .on_field("days_worked"),
        ),
        ValidatorRule::new(
            "AP-007",
            "Leave-without-pay movement",
            &["02"],
            70,
            ConditionNode::leaf(
                "movement_type",
                DataType::Text,
                ComparisonOp::Eq,
                Operand::Literal("08".to_string()),
            ),
            RuleAction::log("movement type 08 (leave without pay) on line {line}"),
        ),
        ValidatorRule::new(
            "AP-020",
            "Plausible contribution period",
            &["01"],
            80,
            ConditionNode::negate(ConditionNode::leaf(
                "period",
                DataType::Integer,
                ComparisonOp::Between,
                Operand::Range {
                    low: "190001".to_string(),
                    high: "210012".to_string(),
                },
            )),
            RuleAction::reject("contribution period {value} is not plausible")
                .expected("190001..210012"),
        ),
        ValidatorRule::new(
            "AP-030",
            "Footer detail count cross-check",
            &["09"],
            90,
            ConditionNode::leaf(
                "@detail_count",
                DataType::Integer,
                ComparisonOp::Ne,
                Operand::Field("detail_count".to_string()),
            ),
            RuleAction::reject("declared detail count does not match the {value} detail records")
                .on_field("detail_count"),
        ),
        ValidatorRule::new(
            "AP-031",
            "Footer contribution total cross-check",
            &["09"],
            100,
            ConditionNode::leaf(
                "@detail_total",
                DataType::Decimal,
                ComparisonOp::Ne,
                Operand::Field("total_contribution".to_string()),
            ),
            RuleAction::reject(
                "declared contribution total does not match the accumulated detail total {value}",
            )
            .on_field("total_contribution"),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::ActionKind;

    #[test]
    fn schema_loads() {
        let schema = payroll_contribution().expect("payroll contribution schema is valid");
        assert_eq!(schema.record("02").unwrap().line_length(), LINE_LENGTH);
        assert_eq!(schema.aggregates().len(), 2);
    }

    #[test]
    fn reject_rules_cover_both_identifier_checks_and_totals() {
        let schema = payroll_contribution().unwrap();
        let reject_codes: Vec<&str> = schema
            .rules()
            .iter()
            .filter(|r| r.action.kind == ActionKind::Reject)
            .map(|r| r.code.as_str())
            .collect();
        assert!(reject_codes.contains(&"AP-001"));
        assert!(reject_codes.contains(&"AP-030"));
        assert!(reject_codes.contains(&"AP-031"));
    }

    #[test]
    fn run_order_is_strictly_increasing() {
        let schema = payroll_contribution().unwrap();
        let orders: Vec<u32> = schema.rules().iter().map(|r| r.run_order).collect();
        let mut sorted = orders.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(orders, sorted);
    }
}
